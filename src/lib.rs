//! jobharvest - job posting harvester for employer career sites
//!
//! Collects postings from a fixed list of career sites that each expose a
//! different access pattern, normalizes them into one [`models::Job`] shape
//! and writes the combined batch as JSON and CSV.
//!
//! # Architecture
//!
//! - [`config`] - Settings, site definitions and environment overrides
//! - [`crawler`] - HTTP fetching, cookie jars and the paginated HTML crawler
//! - [`parser`] - Detail page extraction rules and text cleanup
//! - [`adapters`] - Structured feed and rendered page adapters
//! - [`scheduler`] - Bounded FIFO concurrency
//! - [`orchestrator`] - Per-site fallback, merge and sort
//! - [`storage`] - Atomic artifact output
//! - [`models`] - Core data structures
//! - [`utils`] - Error types and retry helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use jobharvest::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let adapters = HttpAdapters::from_config(&config)?;
//!     let orchestrator = Orchestrator::new(Arc::new(adapters), config.harvest.max_concurrent_sites);
//!     let outcome = orchestrator.run(&config.sites).await;
//!     OutputWriter::new(config.output).write(&outcome.result)?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod scheduler;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::adapters::{AdapterRunner, HttpAdapters};
    pub use crate::config::{Config, SiteConfig};
    pub use crate::error::{Error, ErrorCategory, HarvestErrorTrait, Result};
    pub use crate::models::{BatchResult, Company, Job};
    pub use crate::orchestrator::{Orchestrator, SiteFailure, SiteSummary};
    pub use crate::storage::OutputWriter;
}

pub use models::{BatchMeta, BatchResult, Company, Job};
