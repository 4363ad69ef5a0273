//! Listings that only exist after client-side rendering
//!
//! Rendering is delegated to a [`PageRenderer`]. The rendered HTML is then
//! scanned for detail anchors the same way a static listing is.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;

use crate::config::RenderSpec;
use crate::crawler::fetcher::{FetchOptions, HttpFetcher};
use crate::crawler::headers::json_body_headers;
use crate::crawler::links::LinkExtractor;
use crate::models::{Company, Job, JobSource};
use crate::utils::error::CrawlerError;

/// Source kind recorded on rendered-page jobs
pub const SOURCE_KIND: &str = "rendered_page";

/// Turns a URL into the HTML a browser would see
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, CrawlerError>;
}

/// Renderer backed by an HTTP rendering service
///
/// The service receives `{"url": ...}` as a JSON POST and answers with the
/// rendered document.
pub struct RemoteRenderer {
    fetcher: Arc<HttpFetcher>,
    endpoint: String,
    timeout: Duration,
}

impl RemoteRenderer {
    pub fn new(fetcher: Arc<HttpFetcher>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PageRenderer for RemoteRenderer {
    async fn render(&self, url: &str) -> Result<String, CrawlerError> {
        let opts = FetchOptions {
            timeout: self.timeout,
            headers: json_body_headers(),
            method: Method::POST,
            body: Some(json!({ "url": url }).to_string()),
        };

        self.fetcher
            .fetch_text(&self.endpoint, opts)
            .await
            .map_err(|e| CrawlerError::Renderer(format!("{url}: {e}")))
    }
}

/// Adapter for rendered listings
pub struct RenderedPageAdapter<'a> {
    renderer: Option<&'a dyn PageRenderer>,
    spec: &'a RenderSpec,
}

impl<'a> RenderedPageAdapter<'a> {
    pub fn new(renderer: Option<&'a dyn PageRenderer>, spec: &'a RenderSpec) -> Self {
        Self { renderer, spec }
    }

    /// Render the start page and turn each matching anchor into a job
    ///
    /// # Errors
    ///
    /// `CrawlerError::NoRenderer` when no renderer is configured
    pub async fn fetch_jobs(&self, company: &Company) -> Result<Vec<Job>, CrawlerError> {
        let renderer = self
            .renderer
            .ok_or_else(|| CrawlerError::NoRenderer(company.id.clone()))?;

        let start_url = self.spec.start_url.as_deref().unwrap_or(&company.careers_url);
        let html = renderer.render(start_url).await?;
        let scraped_at = Utc::now();

        let jobs: Vec<Job> = LinkExtractor::new(self.spec.link_pattern.clone())
            .extract_anchors(&html, start_url)
            .into_iter()
            .map(|(url, text)| {
                let source = JobSource {
                    kind: SOURCE_KIND.to_string(),
                    raw: json!({ "anchorText": text }),
                };
                Job::new(
                    Job::identity(&company.id, None, &url),
                    company.clone(),
                    text,
                    url,
                    source,
                    scraped_at,
                )
            })
            .collect();

        tracing::debug!(company = %company.id, url = %start_url, jobs = jobs.len(), "Scanned rendered page");

        Ok(jobs)
    }
}
