//! Workday-style CXS job feed
//!
//! The feed is paged with a JSON POST body. The first page reports the
//! total number of postings; later pages usually report zero, so only the
//! first non-zero total is kept.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FeedSpec;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::session::CrawlSettings;
use crate::models::{Company, Job, JobSource};
use crate::parser::sanitize::clean_optional;
use crate::utils::error::{CrawlerError, ParseError};

/// Source kind recorded on feed jobs
pub const SOURCE_KIND: &str = "structured_feed";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedRequest {
    applied_facets: serde_json::Map<String, Value>,
    limit: usize,
    offset: usize,
    search_text: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedPage {
    #[serde(default)]
    total: usize,
    job_postings: Option<Vec<Value>>,
}

/// Fields read from one posting; the full object is kept as raw provenance
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Posting {
    #[serde(default)]
    title: String,
    #[serde(default)]
    external_path: Option<String>,
    #[serde(default)]
    locations_text: Option<String>,
    #[serde(default)]
    posted_on: Option<String>,
    #[serde(default)]
    bullet_fields: Vec<String>,
}

/// Adapter for one Workday tenant
pub struct WorkdayFeedAdapter<'a> {
    fetcher: &'a HttpFetcher,
    spec: &'a FeedSpec,
    settings: &'a CrawlSettings,
}

impl<'a> WorkdayFeedAdapter<'a> {
    pub fn new(fetcher: &'a HttpFetcher, spec: &'a FeedSpec, settings: &'a CrawlSettings) -> Self {
        Self {
            fetcher,
            spec,
            settings,
        }
    }

    /// Endpoint receiving the paged POST requests
    pub fn endpoint(&self) -> String {
        let base = match &self.spec.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.spec.host),
        };
        format!("{base}/wday/cxs/{}/{}/jobs", self.spec.tenant, self.spec.site)
    }

    /// Fetch every page and map postings to jobs
    pub async fn fetch_jobs(&self, company: &Company) -> Result<Vec<Job>, CrawlerError> {
        let endpoint = self.endpoint();
        let limit = self.spec.page_size.max(1);
        let scraped_at = Utc::now();

        let mut jobs = Vec::new();
        let mut total = 0;
        let mut offset = 0;

        while offset <= self.settings.max_offset {
            let request = FeedRequest {
                applied_facets: serde_json::Map::new(),
                limit,
                offset,
                search_text: "",
            };
            let page: FeedPage = self
                .fetcher
                .post_json(&endpoint, &request, self.settings.request_timeout)
                .await?;

            let postings = page.job_postings.ok_or_else(|| {
                ParseError::UnexpectedShape(format!("{endpoint}: no jobPostings at offset {offset}"))
            })?;

            if total == 0 {
                total = page.total;
            }
            if postings.is_empty() {
                break;
            }

            let received = postings.len();
            jobs.extend(
                postings
                    .into_iter()
                    .filter_map(|raw| self.posting_to_job(company, raw, scraped_at)),
            );

            tracing::debug!(company = %company.id, offset, received, total, "Fetched feed page");

            offset += limit;
            if total > 0 && offset >= total {
                break;
            }
        }

        Ok(jobs)
    }

    fn posting_to_job(
        &self,
        company: &Company,
        raw: Value,
        scraped_at: chrono::DateTime<Utc>,
    ) -> Option<Job> {
        let posting: Posting = match serde_json::from_value(raw.clone()) {
            Ok(posting) => posting,
            Err(e) => {
                tracing::debug!(company = %company.id, error = %e, "Skipping malformed posting");
                return None;
            }
        };

        let path = posting.external_path.unwrap_or_default();
        let url = if path.is_empty() {
            String::new()
        } else {
            format!("https://{}/{}{}", self.spec.host, self.spec.site, path)
        };

        let ident = posting
            .bullet_fields
            .first()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(path.as_str());
        let id = if ident.is_empty() {
            Job::identity(&company.id, None, &url)
        } else {
            format!("{}:{ident}", company.id)
        };

        let source = JobSource {
            kind: SOURCE_KIND.to_string(),
            raw,
        };
        let mut job = Job::new(id, company.clone(), posting.title.trim(), url, source, scraped_at);
        job.location = posting.locations_text.as_deref().and_then(clean_optional);
        job.posted_at = posting.posted_on.filter(|p| !p.trim().is_empty());
        Some(job)
    }
}
