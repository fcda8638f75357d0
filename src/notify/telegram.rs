// src/notify/telegram.rs
use super::{render_digest, split_message, Notifier, DEFAULT_TOP_K};
use crate::listing::ScoredListing;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const API_BASE: &str = "https://api.telegram.org";
/// Bot API hard limit for one message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Clone)]
pub struct TelegramNotifier {
    token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    client: Client,
    timeout: Duration,
    top_k: usize,
}

impl TelegramNotifier {
    /// Missing or blank credentials leave the notifier disabled.
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        let nonblank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            token: nonblank(token),
            chat_id: nonblank(chat_id),
            api_base: API_BASE.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Point at a different Bot API host (self-hosted API server, tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    async fn post(&self, token: &str, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            // the URL embeds the bot token; keep it out of error chains
            .map_err(|e| anyhow!("telegram request failed: {}", e.without_url()))?;

        if let Err(e) = rsp.error_for_status_ref() {
            return Err(anyhow!("telegram HTTP error: {}", e.without_url()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, scored: &[ScoredListing]) -> Result<()> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            tracing::info!("Telegram credentials not set, skipping notification");
            return Ok(());
        };

        let Some(message) = render_digest(scored, self.top_k) else {
            tracing::info!("no jobs to notify");
            return Ok(());
        };

        for chunk in split_message(&message, MAX_MESSAGE_CHARS) {
            self.post(token, chat_id, &chunk).await?;
        }
        tracing::info!(listings = scored.len().min(self.top_k), "telegram notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::NormalizedListing;

    fn one() -> Vec<ScoredListing> {
        vec![ScoredListing::new(NormalizedListing::default(), 3)]
    }

    #[tokio::test]
    async fn unconfigured_is_noop() {
        let n = TelegramNotifier::new(None, Some("42".into()));
        assert!(!n.is_configured());
        assert!(n.send(&one()).await.is_ok());

        let blank = TelegramNotifier::new(Some("  ".into()), Some("42".into()));
        assert!(!blank.is_configured());
    }

    #[tokio::test]
    async fn empty_input_does_not_touch_network() {
        // Unroutable base: any request would fail.
        let n = TelegramNotifier::new(Some("t".into()), Some("42".into()))
            .with_api_base("http://127.0.0.1:9");
        assert!(n.send(&[]).await.is_ok());
    }

    #[tokio::test]
    async fn transport_error_surfaces_without_token() {
        let n = TelegramNotifier::new(Some("secret-token".into()), Some("42".into()))
            .with_api_base("http://127.0.0.1:9")
            .with_timeout(2);
        let err = n.send(&one()).await.unwrap_err();
        assert!(!format!("{err:#}").contains("secret-token"));
    }
}
