// Core data structures for the jobharvest crawler

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::normalize_whitespace;

/// Employer whose career site is harvested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Stable unique identifier, used to namespace job ids
    pub id: String,
    pub name: String,
    /// Absolute URL of the careers listing
    pub careers_url: String,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>, careers_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            careers_url: careers_url.into(),
        }
    }
}

/// Description body of a posting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub text: Option<String>,
    pub html: Option<String>,
}

/// Adapter-specific provenance, opaque to the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSource {
    pub kind: String,
    pub raw: serde_json::Value,
}

/// Canonical job posting produced by every adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub company: Company,
    pub title: String,
    pub location: Option<String>,
    pub workplace: Option<String>,
    pub employment_type: Option<String>,
    pub department: Option<String>,
    pub team: Option<String>,
    pub url: String,
    pub apply_url: String,
    pub description: JobDescription,
    pub source: JobSource,
    pub posted_at: Option<String>,
    #[serde(with = "iso_millis")]
    pub scraped_at: DateTime<Utc>,
}

impl Job {
    /// Start a job with the required fields; everything optional is empty
    /// and `apply_url` falls back to `url`.
    pub fn new(
        id: impl Into<String>,
        company: Company,
        title: impl Into<String>,
        url: impl Into<String>,
        source: JobSource,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            company,
            title: title.into(),
            location: None,
            workplace: None,
            employment_type: None,
            department: None,
            team: None,
            apply_url: url.clone(),
            url,
            description: JobDescription::default(),
            source,
            posted_at: None,
            scraped_at,
        }
    }

    /// Identity of a posting: `<company>:<external id>` when the source
    /// exposes one, otherwise `<company>_url:<url>`.
    pub fn identity(company_id: &str, external_id: Option<&str>, url: &str) -> String {
        match external_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => format!("{company_id}:{id}"),
            None => format!("{company_id}_url:{url}"),
        }
    }

    /// Acceptance check applied before a job enters the batch
    pub fn is_acceptable(&self) -> bool {
        !normalize_whitespace(&self.title).is_empty()
            && !self.url.trim().is_empty()
            && !self.company.id.trim().is_empty()
    }
}

/// Batch metadata artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeta {
    #[serde(with = "iso_millis")]
    pub scraped_at: DateTime<Utc>,
    pub total: usize,
    /// Accepted jobs per company id
    pub sources: BTreeMap<String, usize>,
}

/// Deduplicated, sorted jobs plus their metadata
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub jobs: Vec<Job>,
    pub meta: BatchMeta,
}

/// Format a timestamp the way the artifacts carry it
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter writing timestamps as `2024-01-15T14:30:00.000Z`
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::iso_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
