// src/ingest/mod.rs
//! Orchestrator: runs every configured adapter once, in declaration order.
pub mod providers;
pub mod types;

use crate::listing::RawListing;
use crate::ingest::types::SourceAdapter;
use metrics::counter;

/// Everything one collection pass produced.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub listings: Vec<RawListing>,
    /// (adapter name, listings contributed), in declaration order.
    pub per_adapter: Vec<(String, usize)>,
}

impl Collected {
    pub fn total(&self) -> usize {
        self.listings.len()
    }
}

/// Invoke each adapter in turn and concatenate their output.
///
/// A failing adapter contributes nothing and does not stop the others.
pub async fn run_cycle(adapters: &[Box<dyn SourceAdapter>]) -> Collected {
    crate::metrics::ensure_described();
    let mut out = Collected::default();
    for a in adapters {
        let mut v = a.run().await;
        tracing::info!(adapter = a.name(), count = v.len(), "adapter finished");
        counter!("jobs_scraped_total").increment(v.len() as u64);
        out.per_adapter.push((a.name().to_string(), v.len()));
        out.listings.append(&mut v);
    }
    tracing::info!(total = out.total(), "collection finished");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};

    struct Fixed(&'static str, Vec<&'static str>);

    #[async_trait::async_trait]
    impl SourceAdapter for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        async fn fetch(&self) -> Result<Vec<RawListing>> {
            Ok(self
                .1
                .iter()
                .map(|r| RawListing::new("").with("Role", *r))
                .collect())
        }
    }

    struct Broken;

    #[async_trait::async_trait]
    impl SourceAdapter for Broken {
        fn name(&self) -> &'static str {
            "Broken"
        }
        async fn fetch(&self) -> Result<Vec<RawListing>> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn failing_adapter_is_isolated_and_order_kept() {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(Fixed("A", vec!["a1", "a2"])),
            Box::new(Broken),
            Box::new(Fixed("C", vec!["c1"])),
        ];
        let got = run_cycle(&adapters).await;
        let roles: Vec<&str> = got
            .listings
            .iter()
            .map(|l| l.fields["Role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["a1", "a2", "c1"]);
        assert_eq!(
            got.per_adapter,
            vec![("A".into(), 2), ("Broken".into(), 0), ("C".into(), 1)]
        );
        assert_eq!(got.listings[2].origin, "C");
    }

    #[tokio::test]
    async fn no_adapters_yields_empty() {
        let got = run_cycle(&[]).await;
        assert_eq!(got.total(), 0);
        assert!(got.per_adapter.is_empty());
    }
}
