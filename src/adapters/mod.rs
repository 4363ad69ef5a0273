//! Site adapters
//!
//! Every access pattern in [`AdapterSpec`] has one handler. The orchestrator
//! only sees [`AdapterRunner`], so tests can swap the whole network layer
//! for a scripted runner.

pub mod feed;
pub mod rendered;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AdapterSpec, Config};
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::session::{CookieJarCrawler, CrawlSettings};
use crate::models::{Company, Job};
use crate::utils::error::CrawlerError;

pub use feed::WorkdayFeedAdapter;
pub use rendered::{PageRenderer, RemoteRenderer, RenderedPageAdapter};

/// Runs one adapter for one company
#[async_trait]
pub trait AdapterRunner: Send + Sync {
    async fn run(&self, spec: &AdapterSpec, company: &Company) -> Result<Vec<Job>, CrawlerError>;
}

/// Adapters backed by the shared HTTP fetcher
pub struct HttpAdapters {
    fetcher: Arc<HttpFetcher>,
    renderer: Option<Arc<dyn PageRenderer>>,
    settings: CrawlSettings,
}

impl HttpAdapters {
    pub fn new(
        fetcher: Arc<HttpFetcher>,
        renderer: Option<Arc<dyn PageRenderer>>,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            settings,
        }
    }

    /// Build the fetcher, and the remote renderer when one is configured
    ///
    /// # Errors
    ///
    /// Returns `CrawlerError::Fetch` if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, CrawlerError> {
        let fetcher = Arc::new(HttpFetcher::from_config(&config.harvest)?);
        let settings = CrawlSettings::from_config(config);

        let renderer = config.harvest.renderer_url.as_ref().map(|endpoint| {
            Arc::new(RemoteRenderer::new(
                Arc::clone(&fetcher),
                endpoint.clone(),
                settings.request_timeout,
            )) as Arc<dyn PageRenderer>
        });

        Ok(Self::new(fetcher, renderer, settings))
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }
}

#[async_trait]
impl AdapterRunner for HttpAdapters {
    async fn run(&self, spec: &AdapterSpec, company: &Company) -> Result<Vec<Job>, CrawlerError> {
        match spec {
            AdapterSpec::HtmlCookiePaginated(crawl) => {
                let crawler = CookieJarCrawler::new(&self.fetcher, crawl, self.settings.clone())?;
                Ok(crawler.crawl(company).await?.jobs)
            }
            AdapterSpec::StructuredFeed(feed) => {
                WorkdayFeedAdapter::new(&self.fetcher, feed, &self.settings)
                    .fetch_jobs(company)
                    .await
            }
            AdapterSpec::RenderedPage(render) => {
                RenderedPageAdapter::new(self.renderer.as_deref(), render)
                    .fetch_jobs(company)
                    .await
            }
        }
    }
}
