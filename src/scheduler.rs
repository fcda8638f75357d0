// src/scheduler.rs
//! Cycle trigger: one run at start, then either every N minutes or once a
//! day at a fixed local time. Cycles never overlap.

use crate::pipeline::Pipeline;
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, TimeZone};
use metrics::{counter, gauge};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Interval(Duration),
    DailyAt(NaiveTime),
}

impl Schedule {
    /// Time to wait from `now` until the next trigger.
    pub fn next_delay<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Duration {
        match self {
            Schedule::Interval(d) => *d,
            Schedule::DailyAt(at) => {
                let today = now.date_naive().and_time(*at);
                let mut next = today;
                if next <= now.naive_local() {
                    next += ChronoDuration::days(1);
                }
                (next - now.naive_local())
                    .to_std()
                    .unwrap_or(Duration::from_secs(0))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Schedule::Interval(d) => format!("every {} minutes", d.as_secs() / 60),
            Schedule::DailyAt(at) => format!("daily at {}", at.format("%H:%M")),
        }
    }
}

/// Run one cycle in its own task so a panic inside it is contained.
/// Returns `false` when the cycle did not complete.
pub async fn run_guarded(pipeline: Arc<Pipeline>) -> bool {
    let handle = tokio::spawn(async move { pipeline.run_cycle().await });
    gauge!("cycle_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
    match handle.await {
        Ok(_report) => true,
        Err(e) => {
            counter!("cycle_failures_total").increment(1);
            error!(critical = true, error = %e, "scraping cycle failed unexpectedly");
            false
        }
    }
}

/// Run immediately, then on every trigger until Ctrl-C.
pub async fn run_loop(pipeline: Arc<Pipeline>, schedule: Schedule) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl-C; stop the process externally");
            std::future::pending::<()>().await;
        }
    };
    run_until(pipeline, schedule, ctrl_c).await;
}

/// Scheduler loop that ends as soon as `shutdown` resolves, whether the loop
/// is waiting for the next trigger or in the middle of a cycle.
///
/// `shutdown` is created once and polled for the whole loop, so a signal
/// arriving at any point is seen.
pub async fn run_until<F>(pipeline: Arc<Pipeline>, schedule: Schedule, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    info!(schedule = %schedule.describe(), "scheduler started");

    let mut first = true;
    loop {
        if !first {
            let delay = schedule.next_delay(Local::now());
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => {
                    info!("system stopped by user");
                    return;
                }
            }
        }
        first = false;

        tokio::select! {
            _ = run_guarded(pipeline.clone()) => {}
            _ = &mut shutdown => {
                info!("system stopped by user during a cycle");
                return;
            }
        }
    }
}
