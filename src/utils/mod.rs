//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("Invalid regex pattern");
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").to_string()
}

/// Resolve `href` against `base`, returning `None` for unusable links
///
/// Fragments are dropped so that `/job/1#apply` and `/job/1` resolve to the
/// same URL. Only `http` and `https` results are accepted.
pub fn absolute_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let base = Url::parse(base).ok()?;
    let mut resolved = base.join(href).ok()?;

    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved.to_string())
}
