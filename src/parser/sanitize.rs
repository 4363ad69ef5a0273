//! Text cleanup for values scraped out of career pages
//!
//! Extracted strings go through [`clean_text`] before they land in a job:
//! invisible characters are dropped, entities decoded and whitespace
//! collapsed to single spaces.

use crate::utils::normalize_whitespace;

/// Clean a scraped text fragment into a single normalized line
///
/// # Examples
///
/// ```
/// use jobharvest::parser::sanitize::clean_text;
///
/// assert_eq!(clean_text("  Senior\u{200B}  Scientist &amp; Lead \n"), "Senior Scientist & Lead");
/// ```
pub fn clean_text(text: &str) -> String {
    let text = remove_zero_width(text);
    let text = remove_control_chars(&text);
    let text = html_escape::decode_html_entities(&text);
    normalize_whitespace(&text.replace('\u{00A0}', " "))
}

/// Like [`clean_text`] but `None` for empty results
pub fn clean_optional(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Remove zero-width spaces, direction marks and the BOM
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{2028}'..='\u{202F}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Remove control characters except newline and tab
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Byte offset of the first case-insensitive occurrence of `needle`
///
/// Works on characters rather than on a lowercased copy, so the returned
/// offset is always a valid index into `haystack`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    haystack.char_indices().map(|(i, _)| i).find(|&start| {
        let mut rest = haystack[start..].chars().flat_map(char::to_lowercase);
        needle
            .chars()
            .flat_map(char::to_lowercase)
            .all(|n| rest.next() == Some(n))
    })
}
