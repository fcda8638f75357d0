//! job-radar binary entrypoint.
//! Loads settings, wires adapters, notifier and tracker into a pipeline,
//! then hands it to the scheduler.

use anyhow::{Context, Result};
use job_radar::config::{Settings, TrackerTarget};
use job_radar::ingest::providers::{build_adapters, http_client};
use job_radar::keywords::Keywords;
use job_radar::notify::telegram::TelegramNotifier;
use job_radar::notify::Notifier;
use job_radar::relevance::KeywordPolicy;
use job_radar::scoring::Scorer;
use job_radar::tracker::{csv_file::CsvFileTracker, sheets::SheetsTracker, Tracker};
use job_radar::{logging, metrics, scheduler, Pipeline};
use std::sync::Arc;
use tracing::{info, warn};

fn build_tracker(settings: &Settings, client: reqwest::Client) -> Arc<dyn Tracker> {
    match &settings.tracker {
        TrackerTarget::Sheets {
            credential_file,
            spreadsheet_id,
            sheet_name,
        } => Arc::new(SheetsTracker::new(
            credential_file.clone(),
            spreadsheet_id.clone(),
            sheet_name.clone(),
            client,
        )),
        TrackerTarget::CsvFile(path) => {
            info!(path = %path.display(), "SPREADSHEET_ID not set, tracking to local file");
            Arc::new(CsvFileTracker::new(path.clone()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let settings = Settings::from_env().context("invalid configuration")?;
    let _log_guard = logging::init(&settings.log_level, logging::LOG_DIR)?;
    info!("starting job-radar");

    if let Some(addr) = settings.metrics_addr {
        metrics::install_exporter(addr)?;
    }

    let keywords = Keywords::load_default()?;
    let client = http_client(settings.http_timeout)?;

    let adapters = build_adapters(&settings.enabled_sources, client.clone());
    if adapters.is_empty() {
        warn!("no source adapters enabled; cycles will find nothing");
    }

    let telegram = TelegramNotifier::new(
        settings.telegram_bot_token.clone(),
        settings.telegram_chat_id.clone(),
    )
    .with_timeout(settings.http_timeout.as_secs())
    .with_top_k(settings.notify_top_k);
    if !telegram.is_configured() {
        warn!("Telegram credentials missing; notifications disabled");
    }
    let notifier: Arc<dyn Notifier> = Arc::new(telegram);

    let pipeline = Arc::new(Pipeline::new(
        adapters,
        KeywordPolicy::from_keywords(&keywords),
        Scorer::from_keywords(&keywords),
        notifier,
        build_tracker(&settings, client),
    ));

    if settings.run_once {
        scheduler::run_guarded(pipeline).await;
        return Ok(());
    }

    scheduler::run_loop(pipeline, settings.schedule).await;
    Ok(())
}
