use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use jobharvest::adapters::HttpAdapters;
use jobharvest::config::Config;
use jobharvest::error::HarvestErrorTrait;
use jobharvest::orchestrator::{Orchestrator, SiteSummary};
use jobharvest::storage::OutputWriter;

/// Command-line overrides for a run
#[derive(Debug, Default)]
pub struct RunOptions {
    pub output: Option<PathBuf>,
    pub concurrency: Option<usize>,
}

pub async fn run(mut config: Config, options: RunOptions) -> Result<()> {
    if let Some(dir) = options.output {
        config.output.dir = dir;
    }
    if let Some(n) = options.concurrency {
        config.harvest.max_concurrent_sites = n;
    }
    config.validate().context("Invalid configuration")?;

    let adapters = HttpAdapters::from_config(&config).context("Failed to create HTTP client")?;
    if !adapters.has_renderer() {
        tracing::debug!("No renderer configured; rendered-page sites rely on their fallback");
    }

    let orchestrator = Orchestrator::new(Arc::new(adapters), config.harvest.max_concurrent_sites);
    let outcome = orchestrator.run(&config.sites).await;

    for summary in &outcome.summaries {
        print_summary(summary);
    }

    let written = OutputWriter::new(config.output.clone())
        .write(&outcome.result)
        .inspect_err(|e| {
            tracing::error!(
                category = e.category().as_str(),
                recoverable = e.is_recoverable(),
                error = %e,
                "Artifact write failed"
            )
        })
        .with_context(|| format!("Failed to write artifacts to {}", config.output.dir.display()))?;

    tracing::debug!(
        jobs = %written.jobs_json.display(),
        csv = %written.jobs_csv.display(),
        meta = %written.meta_json.display(),
        "Artifacts in place"
    );

    println!("Done. Wrote {} total jobs.", outcome.result.meta.total);
    Ok(())
}

fn print_summary(summary: &SiteSummary) {
    println!("Scraping: {} ({})", summary.company_name, summary.kind);
    if summary.fallback_used {
        println!("  .. primary returned no jobs, used fallback");
    }
    match &summary.error {
        Some(failure) => eprintln!("  !! failed ({}): {}", failure.category, failure.message),
        None => println!("  -> {} jobs", summary.accepted),
    }
}
