//! Batch artifact output
//!
//! A batch is written as three files in one directory: the job array as
//! pretty JSON, the same jobs as CSV, and the batch metadata. Each file is
//! written to a temporary sibling first and then renamed into place.

pub mod rows;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::Result;
use crate::models::BatchResult;

/// Paths of the artifacts that were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub jobs_json: PathBuf,
    pub jobs_csv: PathBuf,
    pub meta_json: PathBuf,
}

/// Writes batch results to the output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Write all three artifacts, creating the directory when needed
    pub fn write(&self, batch: &BatchResult) -> Result<WrittenArtifacts> {
        fs::create_dir_all(&self.config.dir)?;

        let jobs_json = self.config.dir.join(&self.config.jobs_json);
        let jobs_csv = self.config.dir.join(&self.config.jobs_csv);
        let meta_json = self.config.dir.join(&self.config.meta_json);

        write_atomic(&jobs_json, |w| {
            serde_json::to_writer_pretty(&mut *w, &batch.jobs)?;
            Ok(w.write_all(b"\n")?)
        })?;
        write_atomic(&jobs_csv, |w| rows::to_csv(&batch.jobs, w))?;
        write_atomic(&meta_json, |w| {
            serde_json::to_writer_pretty(&mut *w, &batch.meta)?;
            Ok(w.write_all(b"\n")?)
        })?;

        tracing::info!(
            dir = %self.config.dir.display(),
            jobs = batch.jobs.len(),
            "Artifacts written"
        );

        Ok(WrittenArtifacts {
            jobs_json,
            jobs_csv,
            meta_json,
        })
    }
}

/// Write through a temp file in the same directory, then rename over `path`
fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let result = write_file(&temp_path, fill).and_then(|()| Ok(fs::rename(&temp_path, path)?));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    tracing::debug!(path = %path.display(), ok = result.is_ok(), "Artifact write finished");
    result
}

fn write_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    fill(&mut writer)?;
    writer.flush()?;
    Ok(())
}
