// src/pipeline.rs
//! One cycle: collect → normalize → filter → dedup/score → notify + sync.
//!
//! All collaborators are passed in at construction; nothing here reads
//! process-wide state.

use crate::ingest::{self, types::SourceAdapter};
use crate::listing::ScoredListing;
use crate::normalize::normalize;
use crate::notify::Notifier;
use crate::relevance::KeywordPolicy;
use crate::scoring::Scorer;
use crate::tracker::{self, Tracker};
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info};

/// What a cycle did, stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub per_adapter: Vec<(String, usize)>,
    pub raw: usize,
    pub relevant: usize,
    pub unique: usize,
    /// Listings handed to the notifier (before its own top-K cut).
    pub notified: usize,
    /// `None` when the sync step was skipped or aborted.
    pub synced: Option<usize>,
}

pub struct Pipeline {
    adapters: Vec<Box<dyn SourceAdapter>>,
    policy: KeywordPolicy,
    scorer: Scorer,
    notifier: Arc<dyn Notifier>,
    tracker: Arc<dyn Tracker>,
}

impl Pipeline {
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        policy: KeywordPolicy,
        scorer: Scorer,
        notifier: Arc<dyn Notifier>,
        tracker: Arc<dyn Tracker>,
    ) -> Self {
        Self {
            adapters,
            policy,
            scorer,
            notifier,
            tracker,
        }
    }

    /// Stages up to and including scoring. Pure apart from the adapters.
    pub async fn collect_and_score(&self, report: &mut CycleReport) -> Vec<ScoredListing> {
        let collected = ingest::run_cycle(&self.adapters).await;
        report.per_adapter = collected.per_adapter;
        report.raw = collected.listings.len();
        if collected.listings.is_empty() {
            return Vec::new();
        }

        let normalized = normalize(&collected.listings);
        let relevant = self.policy.filter(normalized);
        report.relevant = relevant.len();

        let scored = self.scorer.process(relevant);
        report.unique = scored.len();
        scored
    }

    /// Run a full cycle. Adapter, notifier and tracker failures are logged
    /// and absorbed here; they never end the cycle early.
    pub async fn run_cycle(&self) -> CycleReport {
        info!("initializing scraping cycle");
        counter!("cycles_total").increment(1);
        let mut report = CycleReport::default();

        let scored = self.collect_and_score(&mut report).await;
        if report.raw == 0 {
            info!("no jobs found");
            return report;
        }
        if scored.is_empty() {
            info!(raw = report.raw, "no relevant jobs this cycle");
            return report;
        }

        report.notified = scored.len();
        if let Err(e) = self.notifier.send(&scored).await {
            counter!("notify_failures_total").increment(1);
            error!(error = ?e, notifier = self.notifier.name(), "failed to send notification");
        }

        match tracker::sync(self.tracker.as_ref(), &scored).await {
            Ok(outcome) => report.synced = Some(outcome.appended),
            Err(e) => {
                counter!("sync_failures_total").increment(1);
                error!(
                    error = ?e,
                    tracker = self.tracker.name(),
                    dropped = scored.len(),
                    "tracker sync failed; this cycle's listings were not persisted"
                );
            }
        }

        info!(
            raw = report.raw,
            relevant = report.relevant,
            unique = report.unique,
            synced = ?report.synced,
            "scraping cycle completed"
        );
        report
    }
}
