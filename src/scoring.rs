// src/scoring.rs
//! Scorer / deduplicator.
//!
//! Order of operations is fixed: in-cycle dedup, per-listing score, priority
//! tier, then a stable sort by score (descending).
//!
//! Score = sum of independent bonuses, each awarded at most once:
//! - visa/sponsorship keyword in role or location: +3
//! - remote keyword in location, or remote flag == "Remote": +2
//! - startup keyword in source or role: +1
//! - preferred keyword in role: +1

use crate::keywords::Keywords;
use crate::listing::{NormalizedListing, ScoredListing};
use metrics::counter;
use std::collections::HashSet;
use tracing::info;

pub const VISA_BONUS: u32 = 3;
pub const REMOTE_BONUS: u32 = 2;
pub const STARTUP_BONUS: u32 = 1;
pub const PREFERRED_BONUS: u32 = 1;

#[derive(Debug, Clone)]
pub struct Scorer {
    visa: Vec<String>,
    remote: Vec<String>,
    startup: Vec<String>,
    preferred: Vec<String>,
}

fn contains_any(haystack_lower: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack_lower.contains(n.as_str()))
}

impl Scorer {
    pub fn from_keywords(kw: &Keywords) -> Self {
        let lower = |v: &[String]| -> Vec<String> {
            v.iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            visa: lower(&kw.visa),
            remote: lower(&kw.remote),
            startup: lower(&kw.startup),
            preferred: lower(&kw.preferred),
        }
    }

    pub fn score(&self, l: &NormalizedListing) -> u32 {
        let role = l.role.to_lowercase();
        let location = l.location.to_lowercase();
        let source = l.source.to_lowercase();

        let mut score = 0;
        if contains_any(&role, &self.visa) || contains_any(&location, &self.visa) {
            score += VISA_BONUS;
        }
        if contains_any(&location, &self.remote) || l.remote_flag.as_deref() == Some("Remote") {
            score += REMOTE_BONUS;
        }
        if contains_any(&source, &self.startup) || contains_any(&role, &self.startup) {
            score += STARTUP_BONUS;
        }
        if contains_any(&role, &self.preferred) {
            score += PREFERRED_BONUS;
        }
        score
    }

    /// Dedup, score, classify and order one cycle's listings.
    pub fn process(&self, listings: Vec<NormalizedListing>) -> Vec<ScoredListing> {
        let (unique, dropped) = dedup_in_cycle(listings);
        if dropped > 0 {
            counter!("jobs_dedup_total").increment(dropped as u64);
            info!(dropped, "removed duplicate listings");
        }

        let mut scored: Vec<ScoredListing> = unique
            .into_iter()
            .map(|l| {
                let s = self.score(&l);
                ScoredListing::new(l, s)
            })
            .collect();

        // sort_by is stable: equal scores keep post-dedup order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::from_keywords(&Keywords::default())
    }
}

/// Drop later listings sharing (company, role, apply_link) with an earlier one.
/// Returns the survivors and how many were dropped.
pub fn dedup_in_cycle(listings: Vec<NormalizedListing>) -> (Vec<NormalizedListing>, usize) {
    let before = listings.len();
    let mut seen: HashSet<(String, String, String)> = HashSet::with_capacity(before);
    let kept: Vec<NormalizedListing> = listings
        .into_iter()
        .filter(|l| seen.insert((l.company.clone(), l.role.clone(), l.apply_link.clone())))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
