// src/keywords.rs
//! Keyword sets used by the relevance filter and the scorer.
//!
//! Built-in defaults cover the usual UI/UX/product/frontend search. A TOML
//! file can override any subset:
//!
//! ```toml
//! [filter]
//! include = ["ui", "ux"]
//! exclude = ["game"]
//!
//! [scoring]
//! visa = ["visa", "h1b"]
//! remote = ["remote"]
//! startup = ["yc"]
//! preferred = ["product design"]
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_KEYWORDS_PATH: &str = "KEYWORDS_CONFIG_PATH";
pub const DEFAULT_KEYWORDS_PATH: &str = "config/keywords.toml";

/// All keyword lists, lower-cased and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub visa: Vec<String>,
    pub remote: Vec<String>,
    pub startup: Vec<String>,
    pub preferred: Vec<String>,
}

impl Default for Keywords {
    fn default() -> Self {
        fn v(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            include: v(&["ui", "ux", "product", "frontend"]),
            exclude: v(&["game", "gaming", "unity", "unreal"]),
            visa: v(&["visa", "sponsor", "sponsorship", "h1b"]),
            remote: v(&["remote", "work from home", "anywhere"]),
            startup: v(&["startup", "early stage", "series a", "wellfound", "yc"]),
            preferred: v(&["uiux", "product design", "senior frontend"]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct KeywordsFile {
    #[serde(default)]
    filter: FilterSection,
    #[serde(default)]
    scoring: ScoringSection,
}

#[derive(Debug, Default, Deserialize)]
struct FilterSection {
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringSection {
    visa: Option<Vec<String>>,
    remote: Option<Vec<String>>,
    startup: Option<Vec<String>>,
    preferred: Option<Vec<String>>,
}

impl Keywords {
    /// Parse a TOML override on top of the defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: KeywordsFile = toml::from_str(s).context("parsing keywords toml")?;
        let mut out = Self::default();
        let apply = |slot: &mut Vec<String>, v: Option<Vec<String>>| {
            if let Some(list) = v {
                *slot = clean_list(list);
            }
        };
        apply(&mut out.include, file.filter.include);
        apply(&mut out.exclude, file.filter.exclude);
        apply(&mut out.visa, file.scoring.visa);
        apply(&mut out.remote, file.scoring.remote);
        apply(&mut out.startup, file.scoring.startup);
        apply(&mut out.preferred, file.scoring.preferred);
        Ok(out)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading keywords from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve keywords:
    /// 1) $KEYWORDS_CONFIG_PATH (must exist)
    /// 2) config/keywords.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_KEYWORDS_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_KEYWORDS_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_KEYWORDS_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        Ok(Self::default())
    }
}

/// Trim, lower-case, drop empties and duplicates; keeps first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && seen.insert(t.clone()) {
            out.push(t);
        }
    }
    out
}
