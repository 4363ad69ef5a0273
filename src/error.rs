//! Unified error handling for the jobharvest crate
//!
//! Domain errors stay in [`crate::utils::error`] where a module only deals
//! with one concern. This module wraps them for the places that report
//! failures across concerns: site failures in the orchestrator and artifact
//! writes in storage.
//!
//! # Architecture
//!
//! - [`HarvestErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification used in failure reports and logs
//! - [`Error`] - Unified error enum wrapping the domain-specific errors

use std::fmt;
use std::io;
use thiserror::Error;

pub use crate::utils::error::{CrawlerError, FetchError, ParseError};

/// Common trait for jobharvest error types
pub trait HarvestErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later run may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for reporting
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP status, timeout, transport, renderer)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Output artifacts and I/O errors
    Storage,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unified error type for the jobharvest crate
#[derive(Error, Debug)]
pub enum Error {
    /// Adapter errors (fetch, parse, renderer)
    #[error("Crawler error: {0}")]
    Crawler(#[from] CrawlerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HarvestErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Crawler(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Json(_) | Self::Csv(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Crawler(CrawlerError::Parse(_))
            | Self::Crawler(CrawlerError::Fetch(FetchError::InvalidJson { .. })) => {
                ErrorCategory::Parsing
            }
            Self::Crawler(_) => ErrorCategory::Network,
            Self::Io(_) | Self::Json(_) | Self::Csv(_) => ErrorCategory::Storage,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
