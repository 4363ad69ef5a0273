pub mod run;
pub mod sites;

use std::path::Path;

use anyhow::{Context, Result};
use jobharvest::config::Config;

pub use run::{run, RunOptions};
pub use sites::sites;

/// Load the configuration file when given, otherwise the environment
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env().context("Failed to load configuration from environment"),
    }
}
