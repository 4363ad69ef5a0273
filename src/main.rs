use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{load_config, RunOptions};

#[derive(Parser)]
#[command(
    name = "jobharvest",
    version,
    about = "Harvest job postings from employer career sites into one dataset",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured site and write the artifacts
    Run {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for the artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of sites scraped at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// List the configured sites
    Sites {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Run { config, .. } | Commands::Sites { config } => config.clone(),
    };
    let config = load_config(config_path.as_deref())?;

    let format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(format, &config.logging.level, cli.verbose)?;

    tracing::info!("jobharvest starting");

    match cli.command {
        Commands::Run {
            output,
            concurrency,
            ..
        } => {
            tracing::info!(output = ?output, concurrency = ?concurrency, "Starting run command");
            let options = RunOptions {
                output,
                concurrency,
            };
            if let Err(e) = commands::run(config, options).await {
                tracing::error!(error = %e, "Run failed");
                return Err(e);
            }
        }

        Commands::Sites { .. } => {
            commands::sites(&config);
        }
    }

    tracing::info!("jobharvest completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("jobharvest=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("jobharvest={level},warn"))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("jobharvest=info,warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
