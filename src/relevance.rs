// src/relevance.rs
//! Relevance gate: keeps listings whose role matches the target keywords.
//!
//! Matching is a case-insensitive substring test. Exclusion wins over
//! inclusion; an empty role never passes.

use crate::keywords::Keywords;
use crate::listing::{NormalizedListing, NOT_AVAILABLE};
use metrics::counter;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPolicy {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl KeywordPolicy {
    pub fn new<I, E, S>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fn lower<S: AsRef<str>>(it: impl IntoIterator<Item = S>) -> Vec<String> {
            it.into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        }
        Self {
            include: lower(include),
            exclude: lower(exclude),
        }
    }

    pub fn from_keywords(kw: &Keywords) -> Self {
        Self::new(&kw.include, &kw.exclude)
    }

    pub fn is_relevant(&self, role: &str) -> bool {
        let role = role.trim();
        if role.is_empty() || role == NOT_AVAILABLE {
            return false;
        }
        let role = role.to_lowercase();
        if self.exclude.iter().any(|ex| role.contains(ex.as_str())) {
            return false;
        }
        self.include.iter().any(|kw| role.contains(kw.as_str()))
    }

    /// Keep relevant listings in their original order.
    pub fn filter(&self, listings: Vec<NormalizedListing>) -> Vec<NormalizedListing> {
        let before = listings.len();
        let kept: Vec<NormalizedListing> = listings
            .into_iter()
            .filter(|l| self.is_relevant(&l.role))
            .collect();
        let removed = before - kept.len();
        counter!("jobs_filtered_total").increment(removed as u64);
        info!(removed, remaining = kept.len(), "filtered out irrelevant roles");
        kept
    }
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self::from_keywords(&Keywords::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(role: &str) -> NormalizedListing {
        NormalizedListing {
            role: role.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn include_match_is_case_insensitive() {
        let p = KeywordPolicy::default();
        assert!(p.is_relevant("Senior FRONTEND Engineer"));
        assert!(p.is_relevant("Product Designer"));
        assert!(!p.is_relevant("Backend Engineer"));
    }

    #[test]
    fn exclusion_beats_inclusion() {
        let p = KeywordPolicy::default();
        assert!(!p.is_relevant("Game UI Designer"));
        assert!(!p.is_relevant("Unity Frontend Developer"));
    }

    #[test]
    fn empty_or_missing_role_rejected() {
        let p = KeywordPolicy::default();
        assert!(!p.is_relevant(""));
        assert!(!p.is_relevant("   "));
        assert!(!p.is_relevant(NOT_AVAILABLE));
    }

    #[test]
    fn filter_preserves_order() {
        let p = KeywordPolicy::new(["ux"], ["game"]);
        let out = p.filter(vec![
            listing("UX Researcher"),
            listing("Game UX"),
            listing("Data Analyst"),
            listing("Lead UX Writer"),
        ]);
        let roles: Vec<&str> = out.iter().map(|l| l.role.as_str()).collect();
        assert_eq!(roles, vec!["UX Researcher", "Lead UX Writer"]);
    }
}
