// src/logging.rs
//! Console + daily-rotated file logging.
use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "job-radar.log";

/// Map a `LOG_LEVEL` value (`INFO`, `debug`, `WARNING`, ...) to a filter
/// directive. Unknown values fall back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        "off" => "off",
        _ => "info",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `LOG_LEVEL` when set.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the life of the process.
pub fn init(level: &str, dir: impl AsRef<Path>) -> Result<WorkerGuard> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(fmt::layer().compact().with_writer(std::io::stdout))
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
