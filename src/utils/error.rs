//! Error types for the jobharvest crawler
//!
//! This module defines the domain error types used by the fetcher, the
//! extraction rules and the site adapters.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Request timeout
    #[error("Request timeout after {timeout_ms}ms for {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// Body was not valid JSON
    #[error("Invalid JSON from {url}")]
    InvalidJson { url: String },

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Transport failures worth another attempt
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::InvalidJson { .. } | Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid regular expression in site configuration
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Feed payload did not have the expected shape
    #[error("Unexpected feed shape: {0}")]
    UnexpectedShape(String),
}

/// General crawler errors
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Rendered-page site configured without a renderer
    #[error("No page renderer configured for {0}")]
    NoRenderer(String),

    /// Renderer service failure
    #[error("Renderer failed: {0}")]
    Renderer(String),
}

impl CrawlerError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Renderer(_) => true,
            Self::Parse(_) | Self::NoRenderer(_) => false,
        }
    }
}
