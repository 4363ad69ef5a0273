//! Detail-link discovery on listing pages
//!
//! Anchors are matched by a substring of their `href`, resolved against the
//! listing URL and normalized before they enter a [`LinkSet`], so the same
//! posting reached through a relative and an absolute href is kept once.

use std::collections::BTreeSet;

use scraper::Html;

use crate::parser::sanitize::clean_text;
use crate::parser::selectors::LINKS;
use crate::utils::absolute_url;

/// Deduplicated set of absolute detail-page URLs for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    urls: BTreeSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a normalized URL; `false` when it was already present
    pub fn insert(&mut self, url: String) -> bool {
        self.urls.insert(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

/// Links found on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Anchors whose raw href contains the pattern
    pub matched_anchors: usize,
    /// Resolved URLs that still contain the pattern
    pub urls: Vec<String>,
}

/// Finds detail links by href substring
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: String,
}

impl LinkExtractor {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Collect detail links from a listing page
    ///
    /// # Examples
    ///
    /// ```
    /// use jobharvest::crawler::links::LinkExtractor;
    ///
    /// let html = r#"<a href="/job/Mainz-Scientist/1/">one</a><a href="/about">x</a>"#;
    /// let page = LinkExtractor::new("/job/").extract(html, "https://jobs.example.com/search/");
    /// assert_eq!(page.matched_anchors, 1);
    /// assert_eq!(page.urls, vec!["https://jobs.example.com/job/Mainz-Scientist/1/"]);
    /// ```
    pub fn extract(&self, html: &str, base_url: &str) -> PageLinks {
        let document = Html::parse_document(html);
        let mut page = PageLinks::default();

        for anchor in document.select(&LINKS) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.contains(&self.pattern) {
                continue;
            }
            page.matched_anchors += 1;

            if let Some(url) = absolute_url(base_url, href).filter(|u| u.contains(&self.pattern)) {
                page.urls.push(url);
            }
        }

        page
    }

    /// Matching anchors as `(url, visible text)` pairs, first occurrence wins
    pub fn extract_anchors(&self, html: &str, base_url: &str) -> Vec<(String, String)> {
        let document = Html::parse_document(html);
        let mut seen = LinkSet::new();
        let mut anchors = Vec::new();

        for anchor in document.select(&LINKS) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.contains(&self.pattern) {
                continue;
            }
            let Some(url) = absolute_url(base_url, href) else {
                continue;
            };
            if seen.insert(url.clone()) {
                let text = clean_text(&anchor.text().collect::<String>());
                anchors.push((url, text));
            }
        }

        anchors
    }
}
