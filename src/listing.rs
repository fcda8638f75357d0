// src/listing.rs
//! Listing shapes as they move through one cycle:
//! `RawListing` (per adapter) → `NormalizedListing` → `ScoredListing` → `TrackerRecord`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder for any canonical text field the source did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// One listing exactly as an adapter produced it.
///
/// `origin` is the adapter name; `fields` is whatever key/value shape the
/// source happens to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub origin: String,
    pub fields: Map<String, Value>,
}

impl RawListing {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style insert, handy for adapters and tests.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }
}

/// Canonical listing. Every text field is whitespace-collapsed and trimmed;
/// missing fields hold [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedListing {
    pub role: String,
    pub company: String,
    pub location: String,
    pub tags: Vec<String>,
    pub apply_link: String,
    pub date_posted: String,
    pub source: String,
    /// Explicit "Remote" / "On-site/Hybrid" marker some boards carry.
    pub remote_flag: Option<String>,
}

impl Default for NormalizedListing {
    fn default() -> Self {
        Self {
            role: NOT_AVAILABLE.to_string(),
            company: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            tags: Vec::new(),
            apply_link: NOT_AVAILABLE.to_string(),
            date_posted: NOT_AVAILABLE.to_string(),
            source: NOT_AVAILABLE.to_string(),
            remote_flag: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const HIGH_MIN_SCORE: u32 = 4;
    pub const MEDIUM_MIN_SCORE: u32 = 2;

    /// Fixed tiering: 0..=1 Low, 2..=3 Medium, 4+ High.
    pub fn from_score(score: u32) -> Self {
        if score >= Self::HIGH_MIN_SCORE {
            Priority::High
        } else if score >= Self::MEDIUM_MIN_SCORE {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing with this cycle's score. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredListing {
    pub listing: NormalizedListing,
    pub score: u32,
    pub priority: Priority,
}

impl ScoredListing {
    pub fn new(listing: NormalizedListing, score: u32) -> Self {
        Self {
            listing,
            score,
            priority: Priority::from_score(score),
        }
    }
}

pub const DEFAULT_STATUS: &str = "Not Applied";

/// Column order of the tracker table.
pub const TRACKER_HEADER: [&str; 9] = [
    "Company",
    "Role",
    "Location",
    "Remote/Visa",
    "Link",
    "Date Posted",
    "Status",
    "Priority",
    "Notes",
];

/// Index of the `Link` column, the tracker's identity key.
pub const TRACKER_KEY_COLUMN: usize = 4;

/// One persisted tracker row. `status` and `notes` belong to the operator
/// once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerRecord {
    pub company: String,
    pub role: String,
    pub location: String,
    pub remote_or_visa_info: String,
    pub apply_link: String,
    pub date_posted: String,
    pub status: String,
    pub priority: String,
    pub notes: String,
}

impl TrackerRecord {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.company.clone(),
            self.role.clone(),
            self.location.clone(),
            self.remote_or_visa_info.clone(),
            self.apply_link.clone(),
            self.date_posted.clone(),
            self.status.clone(),
            self.priority.clone(),
            self.notes.clone(),
        ]
    }
}

impl From<&ScoredListing> for TrackerRecord {
    fn from(s: &ScoredListing) -> Self {
        let l = &s.listing;
        Self {
            company: l.company.clone(),
            role: l.role.clone(),
            location: l.location.clone(),
            remote_or_visa_info: format!("{} | {}", l.location, l.tags.join(", ")),
            apply_link: l.apply_link.clone(),
            date_posted: l.date_posted.clone(),
            status: DEFAULT_STATUS.to_string(),
            priority: s.priority.to_string(),
            notes: String::new(),
        }
    }
}
