//! Extraction rules for job detail pages
//!
//! Each heuristic is a separate function so that a markup change on a site
//! only touches one rule, and each rule can be tested against a fixture:
//!
//! - [`extract_title`]: text of the first `h1`
//! - [`extract_header_line`]: the element right after that heading
//! - [`extract_job_identifier`]: labeled id found in the raw page body
//! - [`extract_apply_href`]: call-to-action anchor located by its text
//! - [`extract_description`]: visible page text from the section marker on
//! - [`location_from_header`] / [`employment_type_from_header`]

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::config::CookieCrawlSpec;
use crate::parser::sanitize::{clean_optional, clean_text, find_ignore_case};
use crate::parser::selectors::{BLOCK_ELEMENTS, BODY, INVISIBLE_ELEMENTS, LINKS, PRIMARY_HEADING};
use crate::utils::error::ParseError;

lazy_static! {
    static ref FULL_TIME: Regex = Regex::new(r"(?i)full\s*-?\s*time").expect("Invalid regex pattern");
    static ref PART_TIME: Regex = Regex::new(r"(?i)part\s*-?\s*time").expect("Invalid regex pattern");
}

/// Site-specific knobs for the detail extraction rules
#[derive(Debug, Clone)]
pub struct DetailRules {
    job_id: Regex,
    apply_texts: Vec<String>,
    description_marker: String,
}

impl DetailRules {
    pub fn new(
        job_id_pattern: &str,
        apply_texts: Vec<String>,
        description_marker: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let job_id = Regex::new(job_id_pattern)
            .map_err(|e| ParseError::InvalidPattern(format!("{job_id_pattern}: {e}")))?;

        if job_id.captures_len() < 2 {
            return Err(ParseError::InvalidPattern(format!(
                "{job_id_pattern}: needs one capture group"
            )));
        }

        Ok(Self {
            job_id,
            apply_texts,
            description_marker: description_marker.into(),
        })
    }

    pub fn from_spec(spec: &CookieCrawlSpec) -> Result<Self, ParseError> {
        Self::new(
            &spec.job_id_pattern,
            spec.apply_link_texts.clone(),
            spec.description_marker.clone(),
        )
    }

    /// Apply every rule to one detail page
    pub fn extract(&self, html: &str) -> DetailFields {
        let document = Html::parse_document(html);
        let header_line = extract_header_line(&document);

        DetailFields {
            title: extract_title(&document),
            location: header_line.as_deref().and_then(location_from_header),
            employment_type: header_line
                .as_deref()
                .and_then(employment_type_from_header)
                .map(String::from),
            external_id: extract_job_identifier(html, &self.job_id),
            apply_href: extract_apply_href(&document, &self.apply_texts),
            description: extract_description(&document, &self.description_marker),
            header_line,
        }
    }
}

/// Fields pulled from one detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub title: Option<String>,
    pub header_line: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub external_id: Option<String>,
    pub apply_href: Option<String>,
    pub description: Option<String>,
}

/// Text of the first primary heading
pub fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&PRIMARY_HEADING)
        .next()
        .and_then(|h1| clean_optional(&h1.text().collect::<String>()))
}

/// Text of the first element following the primary heading
pub fn extract_header_line(document: &Html) -> Option<String> {
    let heading = document.select(&PRIMARY_HEADING).next()?;
    let next = heading.next_siblings().find_map(ElementRef::wrap)?;
    clean_optional(&next.text().collect::<String>())
}

/// First capture of the labeled id pattern in the raw page body
pub fn extract_job_identifier(raw_html: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(raw_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Href of the first anchor whose visible text contains one of `texts`
///
/// Texts are tried in order, so an earlier text wins even when a later one
/// appears first on the page.
pub fn extract_apply_href(document: &Html, texts: &[String]) -> Option<String> {
    texts.iter().find_map(|wanted| {
        document.select(&LINKS).find_map(|anchor| {
            let text = clean_text(&anchor.text().collect::<String>());
            if find_ignore_case(&text, wanted).is_some() {
                anchor.value().attr("href").map(|h| h.trim().to_string())
            } else {
                None
            }
        })
    })
}

/// Visible body text, trimmed to start at `marker` when present
pub fn extract_description(document: &Html, marker: &str) -> Option<String> {
    let body = document.select(&BODY).next()?;
    let text = clean_text(&visible_text(body));

    let trimmed = match find_ignore_case(&text, marker) {
        Some(idx) if !marker.is_empty() => text[idx..].to_string(),
        _ => text,
    };

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// First `|`-separated segment of the header line
pub fn location_from_header(header_line: &str) -> Option<String> {
    header_line.split('|').next().and_then(clean_optional)
}

/// Employment type hinted by the header line
pub fn employment_type_from_header(header_line: &str) -> Option<&'static str> {
    if FULL_TIME.is_match(header_line) {
        Some("full_time")
    } else if PART_TIME.is_match(header_line) {
        Some("part_time")
    } else {
        None
    }
}

/// Text nodes under `root` joined as rendered, skipping scripts and styles
///
/// Inline markup adds nothing between its text nodes; block elements are
/// padded with a space so paragraphs do not run together.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(root, &mut out);
    out
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if INVISIBLE_ELEMENTS.contains(&el.name()) => {}
            Node::Element(el) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    out.push(' ');
                }
                push_visible_text(child, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_HTML: &str = r#"
<html>
<head><title>Scientist</title><script>var tracking = "about the role";</script></head>
<body>
  <nav>Home | Jobs</nav>
  <div class="job">
    <h1> Senior  Scientist,
      Cell Therapy </h1>
    <p class="meta">Mainz, Germany; London, United Kingdom | full time | Job ID: 11010</p>
    <p>Intro paragraph</p>
    <a class="btn" href="/talentcommunity/apply/11010/?locale=en_US">Apply now</a>
    <h2>About the role</h2>
    <p>You will lead&nbsp;experiments.</p>
    <style>.x { color: red }</style>
  </div>
</body>
</html>"#;

    fn rules() -> DetailRules {
        DetailRules::from_spec(&CookieCrawlSpec::default()).unwrap()
    }

    #[test]
    fn test_title_rule() {
        let doc = Html::parse_document(DETAIL_HTML);
        assert_eq!(
            extract_title(&doc).as_deref(),
            Some("Senior Scientist, Cell Therapy")
        );
        assert_eq!(extract_title(&Html::parse_document("<p>none</p>")), None);
    }

    #[test]
    fn test_header_line_rule() {
        let doc = Html::parse_document(DETAIL_HTML);
        assert_eq!(
            extract_header_line(&doc).as_deref(),
            Some("Mainz, Germany; London, United Kingdom | full time | Job ID: 11010")
        );
    }

    #[test]
    fn test_job_identifier_rule() {
        let re = Regex::new(r"(?i)Job ID:\s*([0-9]+)").unwrap();
        assert_eq!(extract_job_identifier(DETAIL_HTML, &re).as_deref(), Some("11010"));
        assert_eq!(extract_job_identifier("<p>no id</p>", &re), None);
        assert_eq!(
            extract_job_identifier("<span>job id:   42</span>", &re).as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_apply_href_rule() {
        let doc = Html::parse_document(DETAIL_HTML);
        let texts = vec!["Apply now".to_string()];
        assert_eq!(
            extract_apply_href(&doc, &texts).as_deref(),
            Some("/talentcommunity/apply/11010/?locale=en_US")
        );

        let none = Html::parse_document(r#"<a href="/x">Share</a>"#);
        assert_eq!(extract_apply_href(&none, &texts), None);
    }

    #[test]
    fn test_description_rule_trims_to_marker() {
        let doc = Html::parse_document(DETAIL_HTML);
        let description = extract_description(&doc, "about the role").unwrap();
        assert!(description.starts_with("About the role"));
        assert!(description.contains("You will lead experiments."));
        assert!(!description.contains("color: red"));
        assert!(!description.contains("Intro paragraph"));
    }

    #[test]
    fn test_description_rule_without_marker_keeps_body() {
        let doc = Html::parse_document("<body><h1>T</h1><p>Just text</p></body>");
        assert_eq!(
            extract_description(&doc, "about the role").as_deref(),
            Some("T Just text")
        );
    }

    #[test]
    fn test_description_keeps_inline_markup_inside_words() {
        let doc = Html::parse_document(
            "<body><h2>About the role</h2><p>About the role: work with <b>mRNA</b>-based thera<em>pies</em>.</p><ul><li>Lab</li><li>Office</li></ul></body>",
        );
        let description = extract_description(&doc, "about the role: work").unwrap();
        assert_eq!(
            description,
            "About the role: work with mRNA-based therapies. Lab Office"
        );
    }

    #[test]
    fn test_header_hints() {
        let line = "Mainz, Germany | full time | Job ID: 1";
        assert_eq!(location_from_header(line).as_deref(), Some("Mainz, Germany"));
        assert_eq!(employment_type_from_header(line), Some("full_time"));
        assert_eq!(employment_type_from_header("Berlin | Part-Time"), Some("part_time"));
        assert_eq!(employment_type_from_header("Berlin"), None);
        assert_eq!(location_from_header(" | full time"), None);
    }

    #[test]
    fn test_extract_all_fields() {
        let fields = rules().extract(DETAIL_HTML);
        assert_eq!(fields.external_id.as_deref(), Some("11010"));
        assert_eq!(
            fields.location.as_deref(),
            Some("Mainz, Germany; London, United Kingdom")
        );
        assert_eq!(fields.employment_type.as_deref(), Some("full_time"));
        assert!(fields.apply_href.is_some());
    }

    #[test]
    fn test_pattern_without_group_rejected() {
        let err = DetailRules::new(r"Job ID:\s*\d+", vec![], "x").unwrap_err();
        assert!(matches!(err, ParseError::InvalidPattern(_)));
    }
}
