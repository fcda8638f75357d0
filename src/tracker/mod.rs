// src/tracker/mod.rs
//! Durable record of every listing ever synced.
//!
//! The store is append-only from the pipeline's point of view: rows are
//! matched on their apply link and never updated or deleted.
pub mod csv_file;
pub mod memory;
pub mod sheets;

use crate::listing::{ScoredListing, TrackerRecord};
use anyhow::{Context, Result};
use metrics::counter;
use std::collections::HashSet;

#[async_trait::async_trait]
pub trait Tracker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Every apply link currently persisted (full scan).
    async fn existing_keys(&self) -> Result<HashSet<String>>;

    /// Append all records in one batch, in the given order.
    async fn append(&self, records: &[TrackerRecord]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub appended: usize,
    pub already_tracked: usize,
}

/// Append the listings whose apply link the store has not seen yet.
///
/// Any store error aborts the whole call before anything is written, so a
/// failed sync leaves the store unchanged.
pub async fn sync(tracker: &dyn Tracker, listings: &[ScoredListing]) -> Result<SyncOutcome> {
    if listings.is_empty() {
        tracing::info!("no data to sync");
        return Ok(SyncOutcome::default());
    }

    let mut known = tracker
        .existing_keys()
        .await
        .with_context(|| format!("reading existing keys from {}", tracker.name()))?;

    let mut outcome = SyncOutcome::default();
    let mut fresh = Vec::new();
    for s in listings {
        // insert() also guards against two listings in this batch sharing a link
        if !known.insert(s.listing.apply_link.clone()) {
            outcome.already_tracked += 1;
            continue;
        }
        fresh.push(TrackerRecord::from(s));
    }

    if fresh.is_empty() {
        tracing::info!(tracker = tracker.name(), "no new unique jobs to append");
        return Ok(outcome);
    }

    tracker
        .append(&fresh)
        .await
        .with_context(|| format!("appending to {}", tracker.name()))?;
    outcome.appended = fresh.len();
    counter!("jobs_synced_total").increment(fresh.len() as u64);
    tracing::info!(
        tracker = tracker.name(),
        appended = outcome.appended,
        skipped = outcome.already_tracked,
        "added new unique jobs"
    );
    Ok(outcome)
}
