// src/tracker/memory.rs
use super::Tracker;
use crate::listing::TrackerRecord;
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-process tracker for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    rows: Mutex<Vec<TrackerRecord>>,
    unavailable: AtomicBool,
}

impl MemoryTracker {
    pub fn with_records(rows: Vec<TrackerRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn records(&self) -> Vec<TrackerRecord> {
        self.rows.lock().expect("tracker mutex poisoned").clone()
    }

    /// Simulate a store that cannot be reached.
    pub fn fail_next(&self, on: bool) {
        self.unavailable.store(on, Ordering::SeqCst);
    }

    /// Operator edit of an existing row, as someone would do in the sheet.
    pub fn set_status(&self, link: &str, status: &str) {
        let mut rows = self.rows.lock().expect("tracker mutex poisoned");
        for r in rows.iter_mut().filter(|r| r.apply_link == link) {
            r.status = status.to_string();
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("memory tracker marked unavailable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Tracker for MemoryTracker {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn existing_keys(&self) -> Result<HashSet<String>> {
        self.check_available()?;
        let rows = self.rows.lock().expect("tracker mutex poisoned");
        Ok(rows.iter().map(|r| r.apply_link.clone()).collect())
    }

    async fn append(&self, records: &[TrackerRecord]) -> Result<()> {
        self.check_available()?;
        let mut rows = self.rows.lock().expect("tracker mutex poisoned");
        rows.extend_from_slice(records);
        Ok(())
    }
}
