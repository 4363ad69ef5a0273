//! HTML parsing and data extraction
//!
//! This module holds the named extraction rules applied to job detail
//! pages, the shared selectors and the text cleanup helpers.

pub mod detail;
pub mod sanitize;
pub mod selectors;

pub use detail::{DetailFields, DetailRules};
pub use sanitize::clean_text;
