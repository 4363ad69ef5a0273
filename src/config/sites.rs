//! Site definitions: which employer, which adapter, which fallback
//!
//! A site's adapter is a closed set of variants. Adding a new access pattern
//! means adding a variant here and a handler in [`crate::adapters`].

use serde::{Deserialize, Serialize};

use crate::models::{Company, Job};

/// One employer career site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub company: Company,

    /// Primary adapter
    pub adapter: AdapterSpec,

    /// Adapter invoked when the primary yields no valid jobs
    #[serde(default)]
    pub fallback: Option<FallbackSpec>,
}

impl SiteConfig {
    pub fn kind(&self) -> SiteKind {
        self.adapter.kind()
    }
}

/// Access pattern of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    HtmlCookiePaginated,
    StructuredFeed,
    RenderedPage,
}

impl SiteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HtmlCookiePaginated => "html_cookie_paginated",
            Self::StructuredFeed => "structured_feed",
            Self::RenderedPage => "rendered_page",
        }
    }
}

impl std::fmt::Display for SiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Adapter parameters, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdapterSpec {
    HtmlCookiePaginated(CookieCrawlSpec),
    StructuredFeed(FeedSpec),
    RenderedPage(RenderSpec),
}

impl AdapterSpec {
    pub fn kind(&self) -> SiteKind {
        match self {
            Self::HtmlCookiePaginated(_) => SiteKind::HtmlCookiePaginated,
            Self::StructuredFeed(_) => SiteKind::StructuredFeed,
            Self::RenderedPage(_) => SiteKind::RenderedPage,
        }
    }
}

/// Parameters for the session-cookie paginated HTML crawler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieCrawlSpec {
    /// Listing URL; defaults to the company's careers URL
    #[serde(default)]
    pub listing_url: Option<String>,

    /// Query parameter carrying the offset
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Offset step; defaults to `harvest.page_size`
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Substring an href must contain to count as a detail link
    #[serde(default = "default_link_pattern")]
    pub link_pattern: String,

    /// Visible texts identifying the apply call-to-action
    #[serde(default = "default_apply_texts")]
    pub apply_link_texts: Vec<String>,

    /// Phrase where the description starts (case-insensitive)
    #[serde(default = "default_description_marker")]
    pub description_marker: String,

    /// Regex with one capture group for the external job id
    #[serde(default = "default_job_id_pattern")]
    pub job_id_pattern: String,
}

impl Default for CookieCrawlSpec {
    fn default() -> Self {
        Self {
            listing_url: None,
            page_param: default_page_param(),
            page_size: None,
            link_pattern: default_link_pattern(),
            apply_link_texts: default_apply_texts(),
            description_marker: default_description_marker(),
            job_id_pattern: default_job_id_pattern(),
        }
    }
}

/// Parameters for a Workday-style CXS JSON feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSpec {
    pub host: String,
    pub tenant: String,
    pub site: String,

    #[serde(default = "default_feed_page_size")]
    pub page_size: usize,

    /// Scheme and authority serving the API, `https://{host}` when unset
    #[serde(default)]
    pub api_base: Option<String>,
}

impl FeedSpec {
    pub fn new(host: impl Into<String>, tenant: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            tenant: tenant.into(),
            site: site.into(),
            page_size: default_feed_page_size(),
            api_base: None,
        }
    }
}

/// Parameters for a JavaScript-rendered listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSpec {
    /// Page handed to the renderer; defaults to the careers URL
    #[serde(default)]
    pub start_url: Option<String>,

    #[serde(default = "default_link_pattern")]
    pub link_pattern: String,
}

/// Alternative adapter plus an optional scope-narrowing filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackSpec {
    pub adapter: AdapterSpec,

    #[serde(default)]
    pub filter: Option<JobFilter>,
}

/// Declarative post-filter for fallback results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobFilter {
    /// Keep jobs whose location contains the substring, ignoring case
    LocationContains(String),
}

impl JobFilter {
    pub fn predicate(&self, job: &Job) -> bool {
        match self {
            Self::LocationContains(needle) => job
                .location
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

fn default_page_param() -> String {
    String::from("startrow")
}

fn default_link_pattern() -> String {
    String::from("/job/")
}

fn default_apply_texts() -> Vec<String> {
    vec![String::from("Apply now"), String::from("Apply Now")]
}

fn default_description_marker() -> String {
    String::from("about the role")
}

fn default_job_id_pattern() -> String {
    String::from(r"(?i)Job ID:\s*([0-9]+)")
}

fn default_feed_page_size() -> usize {
    20
}

/// Built-in site list used when no configuration file names any sites
pub fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig {
            company: Company::new(
                "biontech",
                "BioNTech",
                "https://jobs.biontech.com/search/?createNewAlert=false&q=&optionsFacetsDD_location=&optionsFacetsDD_customfield1=&optionsFacetsDD_customfield2=",
            ),
            adapter: AdapterSpec::HtmlCookiePaginated(CookieCrawlSpec::default()),
            fallback: None,
        },
        SiteConfig {
            company: Company::new("gsk", "GSK", "https://jobs.gsk.com/en-gb/jobs?location=Germany"),
            adapter: AdapterSpec::RenderedPage(RenderSpec {
                start_url: None,
                link_pattern: String::from("/jobs/"),
            }),
            fallback: Some(FallbackSpec {
                adapter: AdapterSpec::StructuredFeed(FeedSpec::new(
                    "gsk.wd5.myworkdayjobs.com",
                    "gsk",
                    "GSKCareers",
                )),
                filter: Some(JobFilter::LocationContains(String::from("germany"))),
            }),
        },
        SiteConfig {
            company: Company::new(
                "immatics",
                "Immatics",
                "https://immatics.wd3.myworkdayjobs.com/Immatics_External",
            ),
            adapter: AdapterSpec::StructuredFeed(FeedSpec::new(
                "immatics.wd3.myworkdayjobs.com",
                "immatics",
                "Immatics_External",
            )),
            fallback: None,
        },
    ]
}
