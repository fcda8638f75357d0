// src/ingest/providers/remotive.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;

use super::{absolutize, Feed};
use crate::ingest::types::SourceAdapter;
use crate::listing::RawListing;

pub const NAME: &str = "Remotive";
pub const BASE_URL: &str = "https://remotive.com";
pub const API_URL: &str = "https://remotive.com/api/remote-jobs";

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct Job {
    title: Option<String>,
    company_name: Option<String>,
    candidate_required_location: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    url: Option<String>,
    publication_date: Option<String>,
}

pub struct RemotiveAdapter {
    feed: Feed,
}

impl RemotiveAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self::from_url(API_URL, client)
    }

    pub fn from_url(url: &str, client: reqwest::Client) -> Self {
        Self {
            feed: Feed::http(url, client),
        }
    }

    pub fn from_fixture(s: &str) -> Self {
        Self {
            feed: Feed::fixture(s),
        }
    }

    fn parse(body: &str) -> Result<Vec<RawListing>> {
        let t0 = std::time::Instant::now();
        let rsp: Response = serde_json::from_str(body).context("parsing remotive json")?;

        let mut out = Vec::with_capacity(rsp.jobs.len());
        for job in rsp.jobs {
            let mut raw = RawListing::new(NAME).with("tags", job.tags);
            if let Some(t) = job.title {
                raw.set("Title", t);
            }
            if let Some(c) = job.company_name {
                raw.set("company_name", c);
            }
            raw.set(
                "candidate_required_location",
                job.candidate_required_location
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "Remote".to_string()),
            );
            if let Some(u) = job.url {
                raw.set("url", absolutize(BASE_URL, &u));
            }
            if let Some(d) = job.publication_date {
                raw.set("publication_date", d);
            }
            out.push(raw);
        }

        histogram!("adapter_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for RemotiveAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let body = self.feed.body(NAME).await?;
        Self::parse(&body)
    }
}
