//! Configuration management for the jobharvest crawler
//!
//! This module handles loading and validating configuration from environment
//! variables, TOML files, and command-line overrides.

pub mod sites;

pub use sites::{
    default_sites, AdapterSpec, CookieCrawlSpec, FallbackSpec, FeedSpec, JobFilter, RenderSpec,
    SiteConfig, SiteKind,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Browser user agent sent by default
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Crawl behavior
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Artifact locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sites to harvest; empty means the built-in list
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

/// Crawl behavior shared by all sites
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Maximum number of site scrapes running at once
    pub max_concurrent_sites: usize,

    /// Default offset step for paginated listings
    pub page_size: usize,

    /// Highest listing offset ever requested
    pub max_offset: usize,

    /// Listing page timeout in seconds
    pub listing_timeout_secs: u64,

    /// Detail page timeout in seconds
    pub detail_timeout_secs: u64,

    /// Timeout for plain text and JSON fetches in seconds
    pub request_timeout_secs: u64,

    /// Requests per second across the whole batch
    pub rate_limit: u32,

    /// Extra attempts per detail page (0 = single attempt)
    pub detail_retries: u32,

    /// User agent string
    pub user_agent: String,

    /// Endpoint of the external page rendering service
    pub renderer_url: Option<String>,
}

/// Output artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub jobs_json: String,
    pub jobs_csv: String,
    pub meta_json: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sites: 2,
            page_size: 100,
            max_offset: 5000,
            listing_timeout_secs: 45,
            detail_timeout_secs: 45,
            request_timeout_secs: 30,
            rate_limit: 4,
            detail_retries: 0,
            user_agent: String::from(DEFAULT_USER_AGENT),
            renderer_url: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public"),
            jobs_json: String::from("jobs.json"),
            jobs_csv: String::from("jobs.csv"),
            meta_json: String::from("jobs-meta.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = HarvestConfig::default();

        let max_concurrent_sites = env_parse("JOBHARVEST_MAX_CONCURRENT_SITES")
            .unwrap_or(defaults.max_concurrent_sites);

        let listing_timeout_secs =
            env_parse("JOBHARVEST_LISTING_TIMEOUT").unwrap_or(defaults.listing_timeout_secs);

        let detail_timeout_secs =
            env_parse("JOBHARVEST_DETAIL_TIMEOUT").unwrap_or(defaults.detail_timeout_secs);

        let rate_limit = env_parse("JOBHARVEST_RATE_LIMIT").unwrap_or(defaults.rate_limit);

        let user_agent =
            std::env::var("JOBHARVEST_USER_AGENT").unwrap_or_else(|_| defaults.user_agent.clone());

        let renderer_url = std::env::var("JOBHARVEST_RENDERER_URL").ok();

        let output_dir = std::env::var("JOBHARVEST_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| OutputConfig::default().dir);

        let log_level = std::env::var("JOBHARVEST_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("JOBHARVEST_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            harvest: HarvestConfig {
                max_concurrent_sites,
                listing_timeout_secs,
                detail_timeout_secs,
                rate_limit,
                user_agent,
                renderer_url,
                ..defaults
            },
            output: OutputConfig {
                dir: output_dir,
                ..OutputConfig::default()
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
            sites: default_sites(),
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        if config.sites.is_empty() {
            config.sites = default_sites();
        }

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let harvest = &self.harvest;

        if harvest.max_concurrent_sites == 0 {
            anyhow::bail!("max_concurrent_sites must be greater than 0");
        }

        if harvest.page_size == 0 {
            anyhow::bail!("page_size must be greater than 0");
        }

        if harvest.listing_timeout_secs == 0
            || harvest.detail_timeout_secs == 0
            || harvest.request_timeout_secs == 0
        {
            anyhow::bail!("timeouts must be greater than 0");
        }

        if harvest.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        let mut seen = HashSet::new();
        for site in &self.sites {
            let id = site.company.id.trim();
            if id.is_empty() {
                anyhow::bail!("site '{}' has an empty company id", site.company.name);
            }
            if !seen.insert(id) {
                anyhow::bail!("duplicate company id: {id}");
            }
            Url::parse(&site.company.careers_url)
                .with_context(|| format!("careersUrl of '{id}' is not an absolute URL"))?;
        }

        Ok(())
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.harvest.listing_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.harvest.detail_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.harvest.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            harvest: HarvestConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            sites: default_sites(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
