//! Batch orchestration across all configured sites
//!
//! Each site runs inside the [`ConcurrencyLimiter`]. A site's primary
//! adapter runs first; when it fails or yields no valid job, the configured
//! fallback runs once and its jobs pass through the fallback filter. Errors
//! never leave the site boundary. The surviving jobs are merged by id (later
//! wins), sorted by company name then title, and counted per company.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use feruca::Collator;

use crate::adapters::AdapterRunner;
use crate::config::{SiteConfig, SiteKind};
use crate::error::{Error, ErrorCategory, HarvestErrorTrait};
use crate::models::{BatchMeta, BatchResult, Job};
use crate::scheduler::ConcurrencyLimiter;

/// What happened for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    pub company_id: String,
    pub company_name: String,
    pub kind: SiteKind,
    /// Valid jobs contributed to the batch
    pub accepted: usize,
    /// Jobs dropped by validation or the fallback filter
    pub filtered: usize,
    pub fallback_used: bool,
    /// Set when the site produced nothing because of a failure
    pub error: Option<SiteFailure>,
}

/// Why a site produced no jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFailure {
    pub category: ErrorCategory,
    pub recoverable: bool,
    pub message: String,
}

impl From<Error> for SiteFailure {
    fn from(err: Error) -> Self {
        Self {
            category: err.category(),
            recoverable: err.is_recoverable(),
            message: err.to_string(),
        }
    }
}

impl SiteSummary {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of a whole batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub result: BatchResult,
    /// Per-site summaries in configuration order
    pub summaries: Vec<SiteSummary>,
}

struct SiteRun {
    summary: SiteSummary,
    jobs: Vec<Job>,
}

/// Drives every site through its adapters
pub struct Orchestrator<R> {
    runner: Arc<R>,
    limiter: ConcurrencyLimiter,
}

impl<R: AdapterRunner> Orchestrator<R> {
    pub fn new(runner: Arc<R>, max_concurrent_sites: usize) -> Self {
        Self {
            runner,
            limiter: ConcurrencyLimiter::new(max_concurrent_sites),
        }
    }

    /// Run every site and build the merged batch
    pub async fn run(&self, sites: &[SiteConfig]) -> BatchOutcome {
        let runs = futures::future::join_all(
            sites
                .iter()
                .map(|site| self.limiter.schedule(self.run_site(site))),
        )
        .await;

        let mut sources = BTreeMap::new();
        let mut accepted = Vec::new();
        let mut summaries = Vec::with_capacity(runs.len());

        for run in runs {
            sources.insert(run.summary.company_id.clone(), run.summary.accepted);
            accepted.extend(run.jobs);
            summaries.push(run.summary);
        }

        let jobs = merge_jobs(accepted);
        let meta = BatchMeta {
            scraped_at: Utc::now(),
            total: jobs.len(),
            sources,
        };

        tracing::info!(total = meta.total, sites = summaries.len(), "Batch complete");

        BatchOutcome {
            result: BatchResult { jobs, meta },
            summaries,
        }
    }

    async fn run_site(&self, site: &SiteConfig) -> SiteRun {
        let company = &site.company;
        let mut summary = SiteSummary {
            company_id: company.id.clone(),
            company_name: company.name.clone(),
            kind: site.kind(),
            accepted: 0,
            filtered: 0,
            fallback_used: false,
            error: None,
        };

        tracing::info!(company = %company.id, kind = %site.kind(), "Scraping site");

        let primary = match self.runner.run(&site.adapter, company).await {
            Ok(jobs) => {
                let (valid, dropped) = keep_acceptable(jobs);
                summary.filtered += dropped;
                Ok(valid)
            }
            Err(e) => Err(Error::from(e)),
        };

        let jobs = match (primary, &site.fallback) {
            (Ok(valid), _) if !valid.is_empty() => valid,
            (primary, Some(fallback)) => {
                match &primary {
                    Ok(_) => tracing::warn!(company = %company.id, "Primary adapter returned 0 jobs; running fallback"),
                    Err(e) => tracing::warn!(company = %company.id, error = %e, "Primary adapter failed; running fallback"),
                }
                summary.fallback_used = true;

                match self.runner.run(&fallback.adapter, company).await {
                    Ok(jobs) => {
                        let (valid, dropped) = keep_acceptable(jobs);
                        let before = valid.len();
                        let kept: Vec<Job> = match &fallback.filter {
                            Some(filter) => valid.into_iter().filter(|j| filter.predicate(j)).collect(),
                            None => valid,
                        };
                        summary.filtered += dropped + (before - kept.len());
                        kept
                    }
                    Err(e) => {
                        summary.error = Some(Error::from(e).into());
                        Vec::new()
                    }
                }
            }
            (Ok(valid), None) => valid,
            (Err(e), None) => {
                summary.error = Some(e.into());
                Vec::new()
            }
        };

        if let Some(failure) = &summary.error {
            tracing::error!(
                company = %company.id,
                category = failure.category.as_str(),
                recoverable = failure.recoverable,
                error = %failure.message,
                "Site failed"
            );
        }

        summary.accepted = jobs.len();
        tracing::info!(
            company = %company.id,
            accepted = summary.accepted,
            filtered = summary.filtered,
            fallback = summary.fallback_used,
            "Site finished"
        );

        SiteRun { summary, jobs }
    }
}

/// Split jobs into acceptable ones and the number dropped
fn keep_acceptable(jobs: Vec<Job>) -> (Vec<Job>, usize) {
    let total = jobs.len();
    let valid: Vec<Job> = jobs.into_iter().filter(Job::is_acceptable).collect();
    let dropped = total - valid.len();
    (valid, dropped)
}

/// Collapse jobs by id, later entries replacing earlier ones, then sort
pub fn merge_jobs(jobs: Vec<Job>) -> Vec<Job> {
    let mut by_id: HashMap<String, Job> = HashMap::with_capacity(jobs.len());
    for job in jobs {
        by_id.insert(job.id.clone(), job);
    }

    let mut merged: Vec<Job> = by_id.into_values().collect();
    let mut collator = Collator::default();
    merged.sort_by(|a, b| compare_jobs(&mut collator, a, b));
    merged
}

/// Company name, then title, then id as the final tie-break
pub fn compare_jobs(collator: &mut Collator, a: &Job, b: &Job) -> Ordering {
    locale_cmp(collator, &a.company.name, &b.company.name)
        .then_with(|| locale_cmp(collator, &a.title, &b.title))
        .then_with(|| a.id.cmp(&b.id))
}

/// Unicode collation (CLDR root order), lowercase before uppercase on ties
///
/// Accented letters sort with their base letter rather than after `z`.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use feruca::Collator;
/// use jobharvest::orchestrator::locale_cmp;
///
/// let mut collator = Collator::default();
/// assert_eq!(locale_cmp(&mut collator, "acme", "Zeta"), Ordering::Less);
/// assert_eq!(locale_cmp(&mut collator, "a", "A"), Ordering::Less);
/// assert_eq!(locale_cmp(&mut collator, "Ärztin", "Biologe"), Ordering::Less);
/// ```
pub fn locale_cmp(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdapterSpec, FallbackSpec, FeedSpec, JobFilter, RenderSpec};
    use crate::models::{Company, JobSource};
    use crate::utils::error::CrawlerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Mutex;

    fn job(company: &Company, id: &str, title: &str, location: Option<&str>) -> Job {
        let source = JobSource {
            kind: "test".into(),
            raw: serde_json::Value::Null,
        };
        let mut job = Job::new(
            format!("{}:{id}", company.id),
            company.clone(),
            title,
            format!("https://example.com/{}/{id}", company.id),
            source,
            Utc::now(),
        );
        job.location = location.map(String::from);
        job
    }

    /// Scripted runner: jobs or an error per (company, kind)
    #[derive(Default)]
    struct ScriptedRunner {
        scripts: Mutex<HashMap<(String, SiteKind), Result<Vec<Job>, String>>>,
        calls: AtomicUsize,
        fallback_calls: AtomicUsize,
    }

    impl ScriptedRunner {
        fn script(self, company: &str, kind: SiteKind, result: Result<Vec<Job>, String>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert((company.to_string(), kind), result);
            self
        }
    }

    #[async_trait]
    impl AdapterRunner for ScriptedRunner {
        async fn run(&self, spec: &AdapterSpec, company: &Company) -> Result<Vec<Job>, CrawlerError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            if spec.kind() == SiteKind::StructuredFeed {
                self.fallback_calls.fetch_add(1, AtomicOrdering::SeqCst);
            }
            let scripted = self
                .scripts
                .lock()
                .unwrap()
                .get(&(company.id.clone(), spec.kind()))
                .cloned()
                .unwrap_or(Ok(Vec::new()));
            scripted.map_err(CrawlerError::Renderer)
        }
    }

    fn rendered_site(company: &Company, fallback: Option<FallbackSpec>) -> SiteConfig {
        SiteConfig {
            company: company.clone(),
            adapter: AdapterSpec::RenderedPage(RenderSpec {
                start_url: None,
                link_pattern: "/jobs/".into(),
            }),
            fallback,
        }
    }

    fn feed_fallback(filter: Option<JobFilter>) -> FallbackSpec {
        FallbackSpec {
            adapter: AdapterSpec::StructuredFeed(FeedSpec::new("x.wd1.myworkdayjobs.com", "x", "X")),
            filter,
        }
    }

    #[tokio::test]
    async fn test_fallback_runs_once_on_empty_primary() {
        let gsk = Company::new("gsk", "GSK", "https://example.com");
        let runner = Arc::new(ScriptedRunner::default().script(
            "gsk",
            SiteKind::StructuredFeed,
            Ok(vec![
                job(&gsk, "1", "Scientist", Some("Munich, Germany")),
                job(&gsk, "2", "Analyst", Some("London, UK")),
            ]),
        ));
        let sites = vec![rendered_site(
            &gsk,
            Some(feed_fallback(Some(JobFilter::LocationContains("germany".into())))),
        )];

        let outcome = Orchestrator::new(Arc::clone(&runner), 2).run(&sites).await;

        assert_eq!(runner.fallback_calls.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(outcome.result.jobs.len(), 1);
        assert_eq!(outcome.result.jobs[0].id, "gsk:1");
        assert_eq!(outcome.result.meta.sources["gsk"], 1);
        assert!(outcome.summaries[0].fallback_used);
        assert_eq!(outcome.summaries[0].filtered, 1);
    }

    #[tokio::test]
    async fn test_fallback_runs_on_primary_error() {
        let gsk = Company::new("gsk", "GSK", "https://example.com");
        let runner = Arc::new(
            ScriptedRunner::default()
                .script("gsk", SiteKind::RenderedPage, Err("blocked".into()))
                .script("gsk", SiteKind::StructuredFeed, Ok(vec![job(&gsk, "1", "Scientist", None)])),
        );
        let sites = vec![rendered_site(&gsk, Some(feed_fallback(None)))];

        let outcome = Orchestrator::new(Arc::clone(&runner), 2).run(&sites).await;

        assert_eq!(runner.fallback_calls.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(outcome.result.meta.total, 1);
        assert!(!outcome.summaries[0].failed());
    }

    #[tokio::test]
    async fn test_valid_primary_skips_fallback() {
        let gsk = Company::new("gsk", "GSK", "https://example.com");
        let runner = Arc::new(ScriptedRunner::default().script(
            "gsk",
            SiteKind::RenderedPage,
            Ok(vec![job(&gsk, "1", "Scientist", None), job(&gsk, "2", "   ", None)]),
        ));
        let sites = vec![rendered_site(&gsk, Some(feed_fallback(None)))];

        let outcome = Orchestrator::new(Arc::clone(&runner), 2).run(&sites).await;

        assert_eq!(runner.fallback_calls.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(outcome.result.jobs.len(), 1);
        assert_eq!(outcome.summaries[0].filtered, 1);
        assert!(!outcome.summaries[0].fallback_used);
    }

    #[tokio::test]
    async fn test_invalid_only_primary_triggers_fallback() {
        let gsk = Company::new("gsk", "GSK", "https://example.com");
        let runner = Arc::new(
            ScriptedRunner::default()
                .script("gsk", SiteKind::RenderedPage, Ok(vec![job(&gsk, "1", "", None)]))
                .script("gsk", SiteKind::StructuredFeed, Ok(vec![job(&gsk, "2", "Chemist", None)])),
        );
        let sites = vec![rendered_site(&gsk, Some(feed_fallback(None)))];

        let outcome = Orchestrator::new(Arc::clone(&runner), 2).run(&sites).await;

        assert_eq!(runner.fallback_calls.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(outcome.result.jobs[0].title, "Chemist");
    }

    #[tokio::test]
    async fn test_failing_site_is_isolated() {
        let acme = Company::new("acme", "Acme", "https://example.com");
        let broken = Company::new("broken", "Broken", "https://example.com");
        let runner = Arc::new(
            ScriptedRunner::default()
                .script("acme", SiteKind::RenderedPage, Ok(vec![job(&acme, "1", "Engineer", None)]))
                .script("broken", SiteKind::RenderedPage, Err("HTTP 500".into())),
        );
        let sites = vec![rendered_site(&broken, None), rendered_site(&acme, None)];

        let outcome = Orchestrator::new(runner, 2).run(&sites).await;

        assert_eq!(outcome.result.meta.sources["broken"], 0);
        assert_eq!(outcome.result.meta.sources["acme"], 1);
        assert_eq!(outcome.result.meta.total, 1);
        assert!(outcome.summaries[0].failed());
        assert_eq!(outcome.summaries[0].company_id, "broken");
        assert!(!outcome.summaries[1].failed());
    }

    #[tokio::test]
    async fn test_site_failure_carries_category() {
        let broken = Company::new("broken", "Broken", "https://example.com");
        let runner = Arc::new(ScriptedRunner::default().script(
            "broken",
            SiteKind::RenderedPage,
            Err("HTTP 500".into()),
        ));
        let sites = vec![rendered_site(&broken, None)];

        let outcome = Orchestrator::new(runner, 1).run(&sites).await;

        let failure = outcome.summaries[0].error.as_ref().unwrap();
        assert_eq!(failure.category, ErrorCategory::Network);
        assert!(failure.recoverable);
        assert_eq!(failure.message, "Crawler error: Renderer failed: HTTP 500");
    }

    #[test]
    fn test_sort_order() {
        let acme = Company::new("acme", "Acme", "https://example.com");
        let zeta = Company::new("zeta", "Zeta", "https://example.com");
        let jobs = vec![
            job(&zeta, "c", "C", None),
            job(&acme, "b", "B", None),
            job(&acme, "a", "A", None),
        ];

        let merged = merge_jobs(jobs);
        let order: Vec<_> = merged
            .iter()
            .map(|j| format!("{}/{}", j.company.name, j.title))
            .collect();
        assert_eq!(order, vec!["Acme/A", "Acme/B", "Zeta/C"]);
    }

    #[test]
    fn test_same_id_later_wins() {
        let acme = Company::new("acme", "Acme", "https://example.com");
        let first = job(&acme, "11010", "Old title", None);
        let second = job(&acme, "11010", "New title", None);

        let merged = merge_jobs(vec![first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "New title");
    }

    #[test]
    fn test_accented_titles_sort_with_base_letter() {
        let biontech = Company::new("biontech", "BioNTech", "https://example.com");
        let jobs = vec![
            job(&biontech, "1", "Zahnarzt", None),
            job(&biontech, "2", "Ärztin", None),
            job(&biontech, "3", "Óptica", None),
            job(&biontech, "4", "Biologe", None),
        ];

        let titles: Vec<String> = merge_jobs(jobs).into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["Ärztin", "Biologe", "Óptica", "Zahnarzt"]);
    }

    #[test]
    fn test_locale_cmp_ignores_case_first() {
        let mut collator = Collator::default();
        assert_eq!(locale_cmp(&mut collator, "biontech", "GSK"), Ordering::Less);
        assert_eq!(locale_cmp(&mut collator, "Zeta", "acme"), Ordering::Greater);
        assert_eq!(locale_cmp(&mut collator, "same", "same"), Ordering::Equal);
        assert_eq!(locale_cmp(&mut collator, "B", "b"), Ordering::Greater);
        assert_eq!(locale_cmp(&mut collator, "Übersetzer", "Zoologe"), Ordering::Less);
    }
}
