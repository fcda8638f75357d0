// src/ingest/providers/mod.rs
//! Concrete job-board adapters.
//!
//! Every adapter reads either an in-memory fixture (tests) or a live URL.
pub mod remoteok;
pub mod remotive;
pub mod weworkremotely;
pub mod yc_jobs;

use crate::ingest::types::SourceAdapter;
use anyhow::{Context, Result};
use std::time::Duration;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

/// Where an adapter gets its document from.
pub(crate) enum Feed {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl Feed {
    pub(crate) fn fixture(s: &str) -> Self {
        Feed::Fixture(s.to_string())
    }

    pub(crate) fn http(url: impl Into<String>, client: reqwest::Client) -> Self {
        Feed::Http {
            url: url.into(),
            client,
        }
    }

    pub(crate) async fn body(&self, adapter: &str) -> Result<String> {
        match self {
            Feed::Fixture(s) => Ok(s.clone()),
            Feed::Http { url, client } => {
                tracing::debug!(adapter, %url, "fetching");
                client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{adapter} http get()"))?
                    .error_for_status()
                    .with_context(|| format!("{adapter} non-2xx"))?
                    .text()
                    .await
                    .with_context(|| format!("{adapter} http .text()"))
            }
        }
    }
}

/// Shared HTTP client for all adapters.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// Resolve `href` against `base` when it is site-relative.
pub fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = base.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

pub const ALL_SOURCES: [&str; 4] = [
    remoteok::NAME,
    remotive::NAME,
    weworkremotely::NAME,
    yc_jobs::NAME,
];

/// Build live adapters in declaration order. An empty `enabled` list means all.
/// Unknown names are logged and skipped.
pub fn build_adapters(enabled: &[String], client: reqwest::Client) -> Vec<Box<dyn SourceAdapter>> {
    let wanted: Vec<&str> = if enabled.is_empty() {
        ALL_SOURCES.to_vec()
    } else {
        enabled.iter().map(String::as_str).collect()
    };

    let mut out: Vec<Box<dyn SourceAdapter>> = Vec::with_capacity(wanted.len());
    for name in wanted {
        let adapter: Box<dyn SourceAdapter> = match name.to_ascii_lowercase().as_str() {
            "remoteok" => Box::new(remoteok::RemoteOkAdapter::new(client.clone())),
            "remotive" => Box::new(remotive::RemotiveAdapter::new(client.clone())),
            "weworkremotely" => Box::new(weworkremotely::WeWorkRemotelyAdapter::new(client.clone())),
            "yc jobs" | "yc_jobs" | "yc" => Box::new(yc_jobs::YcJobsAdapter::new(client.clone())),
            other => {
                tracing::warn!(source = other, "unknown source in ENABLED_SOURCES, skipping");
                continue;
            }
        };
        out.push(adapter);
    }
    out
}
