//! HTTP crawling for cookie-session career sites
//!
//! This module holds the rate-limited HTTP client shared by every adapter
//! and the generic crawler for listings that only paginate correctly inside
//! one session-cookie context.

pub mod cookies;
pub mod fetcher;
pub mod headers;
pub mod links;
pub mod list;
pub mod session;

pub use cookies::CookieJar;
pub use fetcher::{CookieResponse, FetchOptions, HttpFetcher};
pub use links::{LinkExtractor, LinkSet};
pub use session::{CookieJarCrawler, CrawlOutcome, CrawlReport, CrawlSettings, DetailFailure};
