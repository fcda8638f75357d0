// src/ingest/types.rs
use crate::listing::RawListing;
use anyhow::Result;
use metrics::counter;

/// One listing origin (a job board, a feed, a careers page).
///
/// Implementors only write `fetch`; the pipeline calls `run`, which never
/// fails and turns any error into an empty result plus a log line.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<RawListing>>;

    async fn run(&self) -> Vec<RawListing> {
        tracing::info!(adapter = self.name(), "starting adapter");
        match self.fetch().await {
            Ok(mut listings) => {
                for l in &mut listings {
                    if l.origin.is_empty() {
                        l.origin = self.name().to_string();
                    }
                }
                listings
            }
            Err(e) => {
                tracing::error!(error = ?e, adapter = self.name(), "adapter failed");
                counter!("jobs_adapter_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}
