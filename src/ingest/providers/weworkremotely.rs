// src/ingest/providers/weworkremotely.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use super::{absolutize, Feed};
use crate::ingest::types::SourceAdapter;
use crate::listing::RawListing;

pub const NAME: &str = "WeWorkRemotely";
pub const BASE_URL: &str = "https://weworkremotely.com";
pub const FEED_URL: &str = "https://weworkremotely.com/remote-jobs.rss";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    region: Option<String>,
    category: Option<String>,
}

/// Feed titles read "Company: Role". Titles without a colon are all role.
fn split_title(title: &str) -> (Option<&str>, &str) {
    match title.split_once(": ") {
        Some((company, role)) if !company.trim().is_empty() => (Some(company.trim()), role.trim()),
        _ => (None, title.trim()),
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&rsquo;", "'")
}

pub struct WeWorkRemotelyAdapter {
    feed: Feed,
}

impl WeWorkRemotelyAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self::from_url(FEED_URL, client)
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
        let xml = scrub_html_entities_for_xml(body);
        let rss: Rss = from_str(&xml).context("parsing weworkremotely rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let Some(title) = it.title.as_deref() else {
                tracing::warn!(adapter = NAME, "item without title, skipping");
                continue;
            };
            let (company, role) = split_title(title);

            let mut raw = RawListing::new(NAME)
                .with("Job Title", role)
                .with(
                    "region",
                    it.region
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| "Remote".to_string()),
                )
                .with(
                    "Link",
                    it.link
                        .as_deref()
                        .map(|l| absolutize(BASE_URL, l))
                        .unwrap_or_else(|| BASE_URL.to_string()),
                );
            if let Some(c) = company {
                raw.set("Company", c);
            }
            if let Some(cat) = it.category {
                raw.set("category", cat);
            }
            if let Some(d) = it.pub_date {
                raw.set("pubDate", d);
            }
            out.push(raw);
        }

        histogram!("adapter_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for WeWorkRemotelyAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let body = self.feed.body(NAME).await?;
        Self::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_split() {
        assert_eq!(split_title("Acme: UX Lead"), (Some("Acme"), "UX Lead"));
        assert_eq!(split_title("UX Lead"), (None, "UX Lead"));
        assert_eq!(split_title(": UX Lead"), (None, ": UX Lead"));
    }

    #[tokio::test]
    async fn empty_channel_is_ok() {
        let xml = r#"<rss version="2.0"><channel><title>WWR</title></channel></rss>"#;
        let got = WeWorkRemotelyAdapter::from_fixture(xml).fetch().await.unwrap();
        assert!(got.is_empty());
    }
}
