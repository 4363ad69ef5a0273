//! Listing page crawler with offset pagination
//!
//! Walks a session-cookie-bound listing by substituting an offset into one
//! query parameter, merging cookies after every page and collecting detail
//! links until a page contributes nothing new.

use std::time::Duration;

use url::Url;

use crate::crawler::cookies::CookieJar;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::links::{LinkExtractor, LinkSet};
use crate::utils::error::{CrawlerError, FetchError};

/// Pagination bounds for a listing
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Offset step between pages
    pub page_size: usize,
    /// Hard ceiling on the offset; pages beyond it are never requested
    pub max_offset: usize,
    pub timeout: Duration,
}

/// Everything a listing walk produced
#[derive(Debug, Clone, Default)]
pub struct ListingHarvest {
    pub links: LinkSet,
    /// Jar after the last listing response
    pub jar: CookieJar,
    /// Listing requests issued
    pub pages: usize,
}

/// Build the listing URL for `offset`, replacing any existing value of `param`
///
/// # Examples
///
/// ```
/// use jobharvest::crawler::list::listing_page_url;
///
/// let url = listing_page_url("https://jobs.example.com/search/?q=&startrow=0", "startrow", 200).unwrap();
/// assert_eq!(url, "https://jobs.example.com/search/?q=&startrow=200");
/// ```
pub fn listing_page_url(base: &str, param: &str, offset: usize) -> Result<String, FetchError> {
    let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != param)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair(param, &offset.to_string());

    Ok(url.to_string())
}

/// Collects detail links from a paginated listing
pub struct ListingCrawler<'a> {
    fetcher: &'a HttpFetcher,
    extractor: LinkExtractor,
    page_param: String,
    pagination: Pagination,
}

impl<'a> ListingCrawler<'a> {
    pub fn new(
        fetcher: &'a HttpFetcher,
        extractor: LinkExtractor,
        page_param: impl Into<String>,
        pagination: Pagination,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            page_param: page_param.into(),
            pagination,
        }
    }

    /// Walk the listing starting from offset 0 with `jar`
    ///
    /// Stops when a page adds no new link, when a page has no matching
    /// anchor, or when the next offset would pass the ceiling. A failed
    /// listing request aborts the walk.
    pub async fn collect(
        &self,
        listing_url: &str,
        jar: CookieJar,
    ) -> Result<ListingHarvest, CrawlerError> {
        let step = self.pagination.page_size.max(1);
        let mut harvest = ListingHarvest {
            jar,
            ..Default::default()
        };

        for offset in (0..=self.pagination.max_offset).step_by(step) {
            let url = listing_page_url(listing_url, &self.page_param, offset)?;

            let response = self
                .fetcher
                .fetch_text_with_cookies(&url, &harvest.jar, self.pagination.timeout)
                .await?;
            harvest.pages += 1;
            harvest.jar = std::mem::take(&mut harvest.jar).merge(&response.cookies);

            let page = self.extractor.extract(&response.text, listing_url);
            let added = page
                .urls
                .into_iter()
                .filter(|u| harvest.links.insert(u.clone()))
                .count();

            tracing::debug!(
                offset,
                anchors = page.matched_anchors,
                added,
                total = harvest.links.len(),
                cookies = harvest.jar.len(),
                "Processed listing page"
            );

            if added == 0 {
                tracing::debug!(offset, "No new links on page, stopping pagination");
                break;
            }
            if page.matched_anchors == 0 {
                break;
            }
        }

        Ok(harvest)
    }
}
