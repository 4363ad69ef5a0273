//! CSS selectors shared by the extraction rules
//!
//! Selectors are compiled once. Site-specific knobs (link patterns, apply
//! texts, id labels) live in the site configuration instead.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// Primary heading of a detail page
    pub static ref PRIMARY_HEADING: Selector = parse_selector!("h1");

    /// Any anchor carrying an href
    pub static ref LINKS: Selector = parse_selector!("a[href]");

    /// Document body
    pub static ref BODY: Selector = parse_selector!("body");
}

/// Elements whose text is never visible on the page
pub const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that break a line of text when rendered
pub const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "ul", "ol", "li", "h1", "h2", "h3",
    "h4", "h5", "h6", "br", "tr", "td", "th", "table", "blockquote", "pre", "dl", "dt", "dd",
];
