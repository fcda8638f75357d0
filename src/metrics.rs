// src/metrics.rs
use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;

/// Register metric descriptions once per process.
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("jobs_scraped_total", "Raw listings returned by adapters.");
        describe_counter!(
            "jobs_adapter_errors_total",
            "Adapter runs that failed and contributed nothing."
        );
        describe_counter!("jobs_filtered_total", "Listings dropped by the keyword filter.");
        describe_counter!("jobs_dedup_total", "In-cycle duplicates dropped.");
        describe_counter!("jobs_synced_total", "Rows appended to the tracker.");
        describe_counter!("notify_failures_total", "Digest deliveries that failed.");
        describe_counter!("sync_failures_total", "Tracker syncs aborted by a store error.");
        describe_counter!("cycles_total", "Scraping cycles started.");
        describe_counter!("cycle_failures_total", "Cycles that ended in a panic.");
        describe_histogram!("adapter_parse_ms", "Adapter payload parse time in milliseconds.");
        describe_gauge!("cycle_last_run_ts", "Unix timestamp of the last cycle start.");
    });
}

/// Serve `/metrics` in Prometheus text format on `addr`.
pub fn install_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("installing prometheus exporter")?;
    ensure_described();
    tracing::info!(%addr, "metrics exporter listening");
    Ok(())
}
