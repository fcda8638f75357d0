// src/ingest/providers/yc_jobs.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use metrics::histogram;
use scraper::{ElementRef, Html, Selector};

use super::{absolutize, Feed};
use crate::ingest::types::SourceAdapter;
use crate::listing::RawListing;

pub const NAME: &str = "YC Jobs";
pub const BASE_URL: &str = "https://www.workatastartup.com";
pub const LISTING_URL: &str = "https://www.workatastartup.com/jobs?job_type=internship";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("bad selector {css:?}: {e:?}"))
}

fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Work at a Startup internship board. Server-rendered cards only; the page
/// changes markup from time to time, so two card selectors are tried.
pub struct YcJobsAdapter {
    feed: Feed,
}

impl YcJobsAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self::from_url(LISTING_URL, client)
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
        let doc = Html::parse_document(body);

        let card_sel = selector(".job-listing")?;
        let fallback_sel = selector("[class*=jobCard]")?;
        let company_sel = selector(".company-name")?;
        let role_sel = selector(".job-name a")?;
        let location_sel = selector(".job-location")?;

        let mut cards: Vec<ElementRef> = doc.select(&card_sel).collect();
        if cards.is_empty() {
            cards = doc.select(&fallback_sel).collect();
        }

        let mut out = Vec::with_capacity(cards.len());
        for card in cards {
            let Some(role_el) = card.select(&role_sel).next() else {
                tracing::warn!(adapter = NAME, "card without role link, skipping");
                continue;
            };
            let role = text_of(&role_el);
            let link = absolutize(BASE_URL, role_el.value().attr("href").unwrap_or_default());
            let company = card
                .select(&company_sel)
                .next()
                .map(|e| text_of(&e))
                .unwrap_or_default();
            let location = card
                .select(&location_sel)
                .next()
                .map(|e| text_of(&e))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Remote".to_string());
            let remote = if location.contains("Remote") {
                "Remote"
            } else {
                "On-site/Hybrid"
            };

            out.push(
                RawListing::new(NAME)
                    .with("Company", company)
                    .with("Role", role)
                    .with("Location", location)
                    .with("Remote/On-site", remote)
                    .with("Apply Link", link)
                    .with("Source", NAME),
            );
        }

        histogram!("adapter_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for YcJobsAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let body = self.feed.body(NAME).await?;
        Self::parse(&body)
    }
}
