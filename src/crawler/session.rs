//! Cookie-session crawler for paginated HTML career sites
//!
//! One crawl owns one [`CookieJar`]: the listing walk seeds it, every detail
//! fetch carries it and merges whatever the server sets. Detail pages are
//! fetched one at a time so cookie updates stay strictly ordered.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::config::{Config, CookieCrawlSpec};
use crate::crawler::cookies::CookieJar;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::links::LinkExtractor;
use crate::crawler::list::{ListingCrawler, Pagination};
use crate::models::{Company, Job, JobDescription, JobSource};
use crate::parser::detail::{DetailFields, DetailRules};
use crate::utils::absolute_url;
use crate::utils::error::{CrawlerError, FetchError};
use crate::utils::retry::{with_retry_if, RetryPolicy};

/// Source kind recorded on jobs from this crawler
pub const SOURCE_KIND: &str = "html_cookie_paginated";

const UNKNOWN_TITLE: &str = "Unknown title";

/// Crawl-wide knobs shared by every cookie-session site
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub page_size: usize,
    pub max_offset: usize,
    pub listing_timeout: Duration,
    pub detail_timeout: Duration,
    /// Timeout for feed and renderer requests
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.harvest.page_size,
            max_offset: config.harvest.max_offset,
            listing_timeout: config.listing_timeout(),
            detail_timeout: config.detail_timeout(),
            request_timeout: config.request_timeout(),
            retry: RetryPolicy::new(config.harvest.detail_retries),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A detail page that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFailure {
    pub url: String,
    pub error: String,
}

/// Diagnostics for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub listing_requests: usize,
    pub links: usize,
    pub jobs: usize,
    pub failures: Vec<DetailFailure>,
}

/// Jobs and diagnostics from one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    pub jobs: Vec<Job>,
    pub report: CrawlReport,
    /// Jar at the end of the crawl
    pub jar: CookieJar,
}

/// Generic cookie-session crawler
pub struct CookieJarCrawler<'a> {
    fetcher: &'a HttpFetcher,
    spec: &'a CookieCrawlSpec,
    rules: DetailRules,
    settings: CrawlSettings,
}

impl<'a> CookieJarCrawler<'a> {
    /// # Errors
    ///
    /// Returns `CrawlerError::Parse` when the site's job-id pattern is invalid
    pub fn new(
        fetcher: &'a HttpFetcher,
        spec: &'a CookieCrawlSpec,
        settings: CrawlSettings,
    ) -> Result<Self, CrawlerError> {
        let rules = DetailRules::from_spec(spec)?;
        Ok(Self {
            fetcher,
            spec,
            rules,
            settings,
        })
    }

    /// Crawl `company` starting with an empty jar
    pub async fn crawl(&self, company: &Company) -> Result<CrawlOutcome, CrawlerError> {
        self.crawl_with_jar(company, CookieJar::new()).await
    }

    /// Crawl `company` starting from `jar`, returning the evolved jar
    ///
    /// A listing failure fails the crawl. Detail failures are recorded in
    /// the report and the crawl moves on to the next link.
    pub async fn crawl_with_jar(
        &self,
        company: &Company,
        jar: CookieJar,
    ) -> Result<CrawlOutcome, CrawlerError> {
        let scraped_at = Utc::now();
        let listing_url = self
            .spec
            .listing_url
            .as_deref()
            .unwrap_or(&company.careers_url);

        let pagination = Pagination {
            page_size: self.spec.page_size.unwrap_or(self.settings.page_size),
            max_offset: self.settings.max_offset,
            timeout: self.settings.listing_timeout,
        };
        let listing = ListingCrawler::new(
            self.fetcher,
            LinkExtractor::new(self.spec.link_pattern.clone()),
            self.spec.page_param.clone(),
            pagination,
        )
        .collect(listing_url, jar)
        .await?;

        let mut jar = listing.jar;
        let mut outcome = CrawlOutcome {
            report: CrawlReport {
                listing_requests: listing.pages,
                links: listing.links.len(),
                ..Default::default()
            },
            ..Default::default()
        };

        for url in listing.links {
            match self.fetch_detail(&url, &jar).await {
                Ok((html, cookies)) => {
                    jar = jar.merge(cookies);
                    let fields = self.rules.extract(&html);
                    outcome.jobs.push(build_job(company, &url, fields, scraped_at));
                }
                Err(e) => {
                    tracing::warn!(company = %company.id, url = %url, error = %e, "Detail page failed");
                    outcome.report.failures.push(DetailFailure {
                        url,
                        error: e.to_string(),
                    });
                }
            }
        }

        outcome.report.jobs = outcome.jobs.len();
        outcome.jar = jar;

        tracing::info!(
            company = %company.id,
            pages = outcome.report.listing_requests,
            failures = outcome.report.failures.len(),
            "collected links={}, jobs={}",
            outcome.report.links,
            outcome.report.jobs
        );

        Ok(outcome)
    }

    async fn fetch_detail(
        &self,
        url: &str,
        jar: &CookieJar,
    ) -> Result<(String, Vec<String>), FetchError> {
        let fetcher = self.fetcher;
        let timeout = self.settings.detail_timeout;
        let response = with_retry_if(
            &self.settings.retry,
            move || fetcher.fetch_text_with_cookies(url, jar, timeout),
            FetchError::is_recoverable,
        )
        .await?;
        Ok((response.text, response.cookies))
    }
}

/// Assemble a job from the extracted detail fields
pub fn build_job(
    company: &Company,
    url: &str,
    fields: DetailFields,
    scraped_at: DateTime<Utc>,
) -> Job {
    let id = Job::identity(&company.id, fields.external_id.as_deref(), url);
    let title = fields.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let source = JobSource {
        kind: SOURCE_KIND.to_string(),
        raw: json!({ "headerLine": fields.header_line.unwrap_or_default() }),
    };

    let mut job = Job::new(id, company.clone(), title, url, source, scraped_at);
    job.location = fields.location;
    job.employment_type = fields.employment_type;
    if let Some(apply) = fields.apply_href.and_then(|href| absolute_url(url, &href)) {
        job.apply_url = apply;
    }
    job.description = JobDescription {
        text: fields.description,
        html: None,
    };
    job
}
