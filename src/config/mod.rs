// src/config/mod.rs
//! Environment-sourced settings. `.env` is honoured through `dotenvy` in
//! `main` before this runs.

use crate::notify::DEFAULT_TOP_K;
use crate::scheduler::Schedule;
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveTime;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CREDENTIAL_FILE: &str = "config/credentials.json";
pub const DEFAULT_SHEET_NAME: &str = "Internship Tracker";
pub const DEFAULT_TRACKER_CSV: &str = "data/tracker.csv";
pub const DEFAULT_INTERVAL_MINUTES: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Where synced listings go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerTarget {
    Sheets {
        credential_file: PathBuf,
        spreadsheet_id: String,
        sheet_name: String,
    },
    CsvFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tracker: TrackerTarget,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub notify_top_k: usize,
    pub schedule: Schedule,
    pub run_once: bool,
    pub log_level: String,
    pub enabled_sources: Vec<String>,
    pub http_timeout: Duration,
    pub metrics_addr: Option<SocketAddr>,
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow!("{key} must be a non-negative integer, got {v:?}")),
    }
}

fn parse_flag(raw: Option<String>) -> bool {
    raw.map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True" | "yes"))
        .unwrap_or(false)
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from any key → value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let tracker = match get("SPREADSHEET_ID") {
            Some(id) => TrackerTarget::Sheets {
                credential_file: get("GOOGLE_SHEETS_CREDENTIAL_FILE")
                    .unwrap_or_else(|| DEFAULT_CREDENTIAL_FILE.to_string())
                    .into(),
                spreadsheet_id: id.trim().to_string(),
                sheet_name: get("TRACKER_SHEET_NAME")
                    .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            },
            None => TrackerTarget::CsvFile(
                get("TRACKER_CSV_PATH")
                    .unwrap_or_else(|| DEFAULT_TRACKER_CSV.to_string())
                    .into(),
            ),
        };

        let schedule = match get("SCRAPE_DAILY_AT") {
            Some(t) => {
                let at = NaiveTime::parse_from_str(t.trim(), "%H:%M")
                    .with_context(|| format!("SCRAPE_DAILY_AT must be HH:MM, got {t:?}"))?;
                Schedule::DailyAt(at)
            }
            None => {
                let minutes: u64 = parse_num(
                    "SCRAPE_INTERVAL_MINUTES",
                    get("SCRAPE_INTERVAL_MINUTES"),
                    DEFAULT_INTERVAL_MINUTES,
                )?;
                if minutes == 0 {
                    bail!("SCRAPE_INTERVAL_MINUTES must be at least 1");
                }
                Schedule::Interval(Duration::from_secs(minutes * 60))
            }
        };

        let metrics_addr = match get("METRICS_ADDR") {
            Some(a) => Some(
                a.trim()
                    .parse::<SocketAddr>()
                    .with_context(|| format!("METRICS_ADDR must be host:port, got {a:?}"))?,
            ),
            None => None,
        };

        let enabled_sources = get("ENABLED_SOURCES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            tracker,
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            notify_top_k: parse_num("NOTIFY_TOP_K", get("NOTIFY_TOP_K"), DEFAULT_TOP_K)?,
            schedule,
            run_once: parse_flag(get("RUN_ONCE")),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string()),
            enabled_sources,
            http_timeout: Duration::from_secs(parse_num(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            metrics_addr,
        })
    }
}
