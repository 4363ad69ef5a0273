//! Flat CSV rows for jobs

use serde::Serialize;

use crate::error::Result;
use crate::models::{iso_timestamp, Job};

/// One CSV row; nested job fields are flattened, `source_raw` is JSON text
#[derive(Debug, Serialize)]
pub struct CsvRow<'a> {
    pub id: &'a str,
    pub company_id: &'a str,
    pub company_name: &'a str,
    pub company_careers_url: &'a str,
    pub title: &'a str,
    pub location: Option<&'a str>,
    pub workplace: Option<&'a str>,
    pub employment_type: Option<&'a str>,
    pub department: Option<&'a str>,
    pub team: Option<&'a str>,
    pub url: &'a str,
    pub apply_url: &'a str,
    pub description_text: Option<&'a str>,
    pub description_html: Option<&'a str>,
    pub source_kind: &'a str,
    pub source_raw: String,
    pub posted_at: Option<&'a str>,
    pub scraped_at: String,
}

impl<'a> CsvRow<'a> {
    pub fn from_job(job: &'a Job) -> Result<Self> {
        Ok(Self {
            id: &job.id,
            company_id: &job.company.id,
            company_name: &job.company.name,
            company_careers_url: &job.company.careers_url,
            title: &job.title,
            location: job.location.as_deref(),
            workplace: job.workplace.as_deref(),
            employment_type: job.employment_type.as_deref(),
            department: job.department.as_deref(),
            team: job.team.as_deref(),
            url: &job.url,
            apply_url: &job.apply_url,
            description_text: job.description.text.as_deref(),
            description_html: job.description.html.as_deref(),
            source_kind: &job.source.kind,
            source_raw: serde_json::to_string(&job.source.raw)?,
            posted_at: job.posted_at.as_deref(),
            scraped_at: iso_timestamp(&job.scraped_at),
        })
    }
}

/// Render jobs as CSV with a header row
///
/// The header is written even when there are no jobs.
pub fn to_csv<W: std::io::Write>(jobs: &[Job], writer: W) -> Result<()> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    out.write_record(HEADER)?;
    for job in jobs {
        out.serialize(CsvRow::from_job(job)?)?;
    }
    out.flush()?;
    Ok(())
}

/// Column names in output order
pub const HEADER: [&str; 18] = [
    "id",
    "company_id",
    "company_name",
    "company_careers_url",
    "title",
    "location",
    "workplace",
    "employment_type",
    "department",
    "team",
    "url",
    "apply_url",
    "description_text",
    "description_html",
    "source_kind",
    "source_raw",
    "posted_at",
    "scraped_at",
];
