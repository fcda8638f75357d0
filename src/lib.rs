// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod keywords;
pub mod listing;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod relevance;
pub mod scoring;

// Collection from job boards
pub mod ingest;

// Delivery: digest notifications and the application tracker
pub mod notify;
pub mod tracker;

pub mod pipeline;
pub mod scheduler;

// ---- Re-exports for stable public API ----
pub use crate::listing::{NormalizedListing, Priority, RawListing, ScoredListing, TrackerRecord};
pub use crate::pipeline::{CycleReport, Pipeline};
pub use crate::scheduler::Schedule;
