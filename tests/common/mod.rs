//! Common test utilities

#![allow(dead_code)]

use chrono::Utc;
use jobharvest::models::{Company, Job, JobSource};

/// Listing page linking to the given detail paths
pub fn listing_page(paths: &[&str]) -> String {
    let anchors: String = paths
        .iter()
        .map(|p| format!(r#"<li><a class="jobTitle-link" href="{p}">Open position</a></li>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Search results</title></head>
<body>
<nav><a href="/about">About us</a></nav>
<ul class="results">{anchors}</ul>
</body>
</html>"#
    )
}

/// Detail page with the usual heading, header line and apply button
pub fn detail_page(title: &str, location: &str, job_id: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title><style>.x {{ color: red; }}</style></head>
<body>
<h1>{title}</h1>
<p class="header">{location} | full time | Job ID: {job_id}</p>
<a class="btn" href="/talentcommunity/apply/{job_id}/">Apply now</a>
<div class="intro">Join a growing team.</div>
<div class="description">About the role: you will run assays and analyze data.</div>
<script>window.dataLayer = [];</script>
</body>
</html>"#
    )
}

pub fn company(id: &str, name: &str, careers_url: &str) -> Company {
    Company::new(id, name, careers_url)
}

/// Minimal valid job
pub fn job(company: &Company, id: &str, title: &str) -> Job {
    let source = JobSource {
        kind: "test".to_string(),
        raw: serde_json::Value::Null,
    };
    Job::new(
        format!("{}:{id}", company.id),
        company.clone(),
        title,
        format!("https://jobs.example.com/{}/{id}", company.id),
        source,
        Utc::now(),
    )
}

/// One Workday posting object
pub fn posting(title: &str, path: &str, location: &str, req_id: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "externalPath": path,
        "locationsText": location,
        "postedOn": "Posted Today",
        "bulletFields": [req_id],
    })
}
