// src/tracker/csv_file.rs
//! Local spreadsheet file (CSV) with the tracker header row.
use super::Tracker;
use crate::listing::{TrackerRecord, TRACKER_HEADER, TRACKER_KEY_COLUMN};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::mem::take;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct CsvFileTracker {
    path: PathBuf,
}

impl CsvFileTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with just the header row when it does not exist yet.
    async fn ensure_created(&self) -> Result<()> {
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let header: Vec<String> = TRACKER_HEADER.iter().map(|s| s.to_string()).collect();
        fs::write(&self.path, format_row(&header))
            .await
            .with_context(|| format!("creating tracker file {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "created new tracker file");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Tracker for CsvFileTracker {
    fn name(&self) -> &'static str {
        "csv-file"
    }

    async fn existing_keys(&self) -> Result<HashSet<String>> {
        self.ensure_created().await?;
        let text = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading tracker file {}", self.path.display()))?;
        let mut rows = parse_rows(&text).into_iter();

        let key_col = rows
            .next()
            .and_then(|h| h.iter().position(|c| c.trim() == TRACKER_HEADER[TRACKER_KEY_COLUMN]))
            .unwrap_or(TRACKER_KEY_COLUMN);

        Ok(rows
            .filter_map(|r| r.get(key_col).cloned())
            .filter(|k| !k.is_empty())
            .collect())
    }

    async fn append(&self, records: &[TrackerRecord]) -> Result<()> {
        self.ensure_created().await?;
        let mut buf = String::new();
        for r in records {
            buf.push_str(&format_row(&r.to_row()));
        }
        let mut f = fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening tracker file {}", self.path.display()))?;
        f.write_all(buf.as_bytes())
            .await
            .context("writing tracker rows")?;
        f.flush().await.context("flushing tracker file")?;
        Ok(())
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// One CSV line (RFC 4180 quoting) terminated by `\n`.
pub fn format_row(row: &[String]) -> String {
    let cells: Vec<String> = row
        .iter()
        .map(|cell| {
            if needs_quotes(cell) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect();
    format!("{}\n", cells.join(","))
}

/// Minimal CSV parser: quoted fields, doubled quotes, CRLF.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}
