// src/ingest/providers/remoteok.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde_json::Value;

use super::{absolutize, Feed};
use crate::ingest::types::SourceAdapter;
use crate::listing::RawListing;

pub const NAME: &str = "RemoteOK";
pub const BASE_URL: &str = "https://remoteok.com";
pub const API_URL: &str = "https://remoteok.com/api";

/// RemoteOK public JSON feed. The first array element is a legal notice,
/// not a job.
pub struct RemoteOkAdapter {
    feed: Feed,
}

impl RemoteOkAdapter {
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
        let items: Vec<Value> = serde_json::from_str(body).context("parsing remoteok json")?;

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let Some(obj) = item.as_object() else {
                tracing::warn!(adapter = NAME, "skipping non-object row");
                continue;
            };
            let Some(position) = obj.get("position").and_then(Value::as_str) else {
                // legal notice / malformed row
                continue;
            };

            let location = obj
                .get("location")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("Remote");
            let link = obj
                .get("url")
                .or_else(|| obj.get("apply_url"))
                .and_then(Value::as_str)
                .map(|href| absolutize(BASE_URL, href))
                .unwrap_or_else(|| BASE_URL.to_string());

            let mut raw = RawListing::new(NAME)
                .with("position", position)
                .with("location", location)
                .with("url", link)
                .with("tags", obj.get("tags").cloned().unwrap_or(Value::Null));
            if let Some(company) = obj.get("company") {
                raw.set("company", company.clone());
            }
            if let Some(date) = obj.get("date") {
                raw.set("date", date.clone());
            }
            out.push(raw);
        }

        histogram!("adapter_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let body = self.feed.body(NAME).await?;
        Self::parse(&body)
    }
}
