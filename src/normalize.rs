// src/normalize.rs
//! Maps heterogeneous adapter output onto [`NormalizedListing`].
//!
//! Two passes per record: the rename pass resolves raw keys through a fixed
//! synonym table, then the cleaning pass collapses whitespace on every text
//! value. Fields nobody supplied keep the `N/A` default.

use crate::listing::{NormalizedListing, RawListing, NOT_AVAILABLE};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Role,
    Company,
    Location,
    Tags,
    ApplyLink,
    DatePosted,
    Source,
    RemoteFlag,
}

/// Raw key (lower-cased) → canonical field.
const SYNONYMS: &[(&str, Field)] = &[
    ("role", Field::Role),
    ("title", Field::Role),
    ("job title", Field::Role),
    ("job_title", Field::Role),
    ("position", Field::Role),
    ("company", Field::Company),
    ("company name", Field::Company),
    ("company_name", Field::Company),
    ("location", Field::Location),
    ("region", Field::Location),
    ("candidate_required_location", Field::Location),
    ("tags", Field::Tags),
    ("category", Field::Tags),
    ("apply link", Field::ApplyLink),
    ("apply_link", Field::ApplyLink),
    ("link", Field::ApplyLink),
    ("url", Field::ApplyLink),
    ("date posted", Field::DatePosted),
    ("date_posted", Field::DatePosted),
    ("date", Field::DatePosted),
    ("pubdate", Field::DatePosted),
    ("publication_date", Field::DatePosted),
    ("source", Field::Source),
    ("remote/on-site", Field::RemoteFlag),
    ("remote_flag", Field::RemoteFlag),
];

fn canonical_field(raw_key: &str) -> Option<Field> {
    let key = raw_key.trim().to_lowercase();
    SYNONYMS
        .iter()
        .find(|(syn, _)| *syn == key)
        .map(|(_, f)| *f)
}

/// Collapse whitespace runs to a single space and trim.
pub fn clean_text(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    re.replace_all(s, " ").trim().to_string()
}

/// Scalar value → text. Strings are cleaned, other scalars pass through verbatim.
/// `None` means "treat as absent".
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(clean_text(s)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            Some(parts.join(", "))
        }
        Value::Object(_) => Some(v.to_string()),
    }
}

fn tag_list(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_text)
            .filter(|t| !t.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(clean_text)
            .filter(|t| !t.is_empty())
            .collect(),
        Value::Null => Vec::new(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Normalize one record. Never fails: unknown keys are ignored and
/// unusable values fall back to the default.
pub fn normalize_one(raw: &RawListing) -> NormalizedListing {
    let mut out = NormalizedListing::default();
    let mut seen: Vec<Field> = Vec::with_capacity(8);

    for (key, value) in &raw.fields {
        let Some(field) = canonical_field(key) else {
            continue;
        };
        // First raw key mapping to a field wins.
        if seen.contains(&field) {
            continue;
        }

        if field == Field::Tags {
            out.tags = tag_list(value);
            seen.push(field);
            continue;
        }

        let Some(text) = scalar_text(value) else {
            continue;
        };
        seen.push(field);
        match field {
            Field::Role => out.role = text,
            Field::Company => out.company = text,
            Field::Location => out.location = text,
            Field::ApplyLink => out.apply_link = text,
            Field::DatePosted => out.date_posted = text,
            Field::Source => out.source = text,
            Field::RemoteFlag => out.remote_flag = Some(text),
            Field::Tags => {}
        }
    }

    if !seen.contains(&Field::Source) {
        let origin = clean_text(&raw.origin);
        if !origin.is_empty() {
            out.source = origin;
        }
    }

    // A field that cleaned down to nothing counts as missing.
    for slot in [
        &mut out.role,
        &mut out.company,
        &mut out.location,
        &mut out.apply_link,
        &mut out.date_posted,
        &mut out.source,
    ] {
        if slot.is_empty() {
            *slot = NOT_AVAILABLE.to_string();
        }
    }

    out
}

pub fn normalize(listings: &[RawListing]) -> Vec<NormalizedListing> {
    listings.iter().map(normalize_one).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_text_collapses_ws() {
        assert_eq!(clean_text("  Product \n\t Designer  "), "Product Designer");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn synonyms_are_resolved_case_insensitively() {
        let raw = RawListing::new("Board")
            .with("Job Title", "  UX   Intern ")
            .with("company_name", "Acme")
            .with("LINK", "https://acme.test/1")
            .with("region", "Anywhere");
        let n = normalize_one(&raw);
        assert_eq!(n.role, "UX Intern");
        assert_eq!(n.company, "Acme");
        assert_eq!(n.apply_link, "https://acme.test/1");
        assert_eq!(n.location, "Anywhere");
        assert_eq!(n.source, "Board");
    }

    #[test]
    fn missing_fields_get_sentinel() {
        let n = normalize_one(&RawListing::new("").with("Title", "Frontend Dev"));
        assert_eq!(n.company, NOT_AVAILABLE);
        assert_eq!(n.location, NOT_AVAILABLE);
        assert_eq!(n.apply_link, NOT_AVAILABLE);
        assert_eq!(n.date_posted, NOT_AVAILABLE);
        assert_eq!(n.source, NOT_AVAILABLE);
        assert!(n.tags.is_empty());
        assert_eq!(n.remote_flag, None);
    }

    #[test]
    fn explicit_source_beats_origin() {
        let raw = RawListing::new("YC")
            .with("Source", "YC Jobs")
            .with("Remote/On-site", "Remote");
        let n = normalize_one(&raw);
        assert_eq!(n.source, "YC Jobs");
        assert_eq!(n.remote_flag.as_deref(), Some("Remote"));
    }

    #[test]
    fn tags_from_array_or_string() {
        let a = normalize_one(&RawListing::new("x").with("tags", json!([" react ", "", "css"])));
        assert_eq!(a.tags, vec!["react", "css"]);
        let b = normalize_one(&RawListing::new("x").with("category", "Design, Product"));
        assert_eq!(b.tags, vec!["Design", "Product"]);
    }

    #[test]
    fn non_string_values_pass_through() {
        let raw = RawListing::new("x")
            .with("date", json!(1_700_000_000))
            .with("company", Value::Null);
        let n = normalize_one(&raw);
        assert_eq!(n.date_posted, "1700000000");
        assert_eq!(n.company, NOT_AVAILABLE);
    }
}
