// src/tracker/sheets.rs
//! Google Sheets backed tracker (Sheets API v4 over REST).
//!
//! Auth uses a service-account key file: a signed RS256 assertion is traded
//! for a short-lived bearer token, cached until shortly before expiry.
use super::Tracker;
use crate::listing::{TrackerRecord, TRACKER_HEADER, TRACKER_KEY_COLUMN};
use anyhow::{anyhow, Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OnceCell};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
/// Refresh this long before the token actually expires.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

pub struct SheetsTracker {
    credential_file: PathBuf,
    spreadsheet_id: String,
    sheet_name: String,
    api_base: String,
    client: Client,
    token: Mutex<Option<(String, Instant)>>,
    sheet_ready: OnceCell<()>,
}

impl SheetsTracker {
    pub fn new(
        credential_file: impl Into<PathBuf>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            credential_file: credential_file.into(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            api_base: SHEETS_API_BASE.to_string(),
            client,
            token: Mutex::new(None),
            sheet_ready: OnceCell::new(),
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// A1 range covering the tracker columns, sheet title quoted.
    pub fn full_range(&self) -> String {
        format!("{}!A:I", quote_sheet_name(&self.sheet_name))
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base).context("parsing sheets api base")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("sheets api base cannot be a base url"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    async fn access_token(&self) -> Result<String> {
        let mut slot = self.token.lock().await;
        if let Some((tok, expires_at)) = slot.as_ref() {
            if Instant::now() + TOKEN_SLACK < *expires_at {
                return Ok(tok.clone());
            }
        }

        let raw = tokio::fs::read_to_string(&self.credential_file)
            .await
            .with_context(|| format!("reading credentials {}", self.credential_file.display()))?;
        let key: ServiceAccountKey =
            serde_json::from_str(&raw).context("parsing service account key")?;
        let token_uri = key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SCOPE,
            aud: token_uri,
            iat: now,
            exp: now + 3600,
        };
        let signing_key =
            EncodingKey::from_rsa_pem(key.private_key.as_bytes()).context("loading private key")?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .context("signing token assertion")?;

        let rsp: TokenResponse = self
            .client
            .post(token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("token request")?
            .error_for_status()
            .context("token endpoint non-2xx")?
            .json()
            .await
            .context("parsing token response")?;

        let expires_at = Instant::now() + Duration::from_secs(rsp.expires_in);
        *slot = Some((rsp.access_token.clone(), expires_at));
        Ok(rsp.access_token)
    }

    /// Create the worksheet if it is missing and make sure row 1 holds the
    /// header. The header check runs on every first connect, so a sheet left
    /// without one by an earlier failed attempt gets repaired.
    async fn ensure_sheet(&self, token: &str) -> Result<()> {
        self.sheet_ready
            .get_or_try_init(|| async {
                let mut url = self.url(&[self.spreadsheet_id.as_str()])?;
                url.query_pairs_mut().append_pair("fields", "sheets.properties.title");
                let meta: SpreadsheetMeta = self
                    .client
                    .get(url)
                    .bearer_auth(token)
                    .send()
                    .await
                    .context("spreadsheet metadata request")?
                    .error_for_status()
                    .context("spreadsheet metadata non-2xx")?
                    .json()
                    .await
                    .context("parsing spreadsheet metadata")?;

                if meta.sheets.iter().any(|s| s.properties.title == self.sheet_name) {
                    tracing::info!(sheet = %self.sheet_name, "connected to existing sheet");
                } else {
                    self.add_sheet(token).await?;
                    tracing::info!(sheet = %self.sheet_name, "created new sheet");
                }

                let range = self.header_range();
                let url = self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
                let first: ValueRange = self
                    .client
                    .get(url)
                    .bearer_auth(token)
                    .send()
                    .await
                    .context("header row request")?
                    .error_for_status()
                    .context("header row non-2xx")?
                    .json()
                    .await
                    .context("parsing header row")?;
                if header_missing(&first.values) {
                    self.write_header(token).await?;
                    tracing::info!(sheet = %self.sheet_name, "wrote header row");
                }
                Ok::<(), anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    fn header_range(&self) -> String {
        format!("{}!A1:I1", quote_sheet_name(&self.sheet_name))
    }

    async fn add_sheet(&self, token: &str) -> Result<()> {
        let batch = format!("{}:batchUpdate", self.spreadsheet_id);
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": self.sheet_name,
                        "gridProperties": { "rowCount": 1000, "columnCount": TRACKER_HEADER.len() }
                    }
                }
            }]
        });
        self.client
            .post(self.url(&[batch.as_str()])?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("addSheet request")?
            .error_for_status()
            .context("addSheet non-2xx")?;
        Ok(())
    }

    /// Overwrite row 1 with the header.
    async fn write_header(&self, token: &str) -> Result<()> {
        let range = self.header_range();
        let mut url = self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let header: Vec<&str> = TRACKER_HEADER.to_vec();
        self.client
            .put(url)
            .bearer_auth(token)
            .json(&json!({ "values": [header] }))
            .send()
            .await
            .context("header update request")?
            .error_for_status()
            .context("header update non-2xx")?;
        Ok(())
    }

    async fn append_values(&self, token: &str, rows: &[Vec<String>]) -> Result<()> {
        let range = format!("{}:append", self.full_range());
        let mut url = self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        self.client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": rows }))
            .send()
            .await
            .context("values append request")?
            .error_for_status()
            .context("values append non-2xx")?;
        Ok(())
    }
}

/// Quote a sheet title for A1 notation ('It''s' style escaping).
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// True when row 1 is absent or has no non-blank cell.
fn header_missing(values: &[Vec<Value>]) -> bool {
    values
        .first()
        .map_or(true, |row| row.iter().all(|c| cell_text(c).trim().is_empty()))
}

/// Pull the apply-link column out of a values response; the first row is
/// the header and locates the column.
fn keys_from_values(values: &[Vec<Value>]) -> HashSet<String> {
    let mut rows = values.iter();
    let key_col = rows
        .next()
        .and_then(|h| {
            h.iter()
                .position(|c| cell_text(c).trim() == TRACKER_HEADER[TRACKER_KEY_COLUMN])
        })
        .unwrap_or(TRACKER_KEY_COLUMN);
    rows.filter_map(|r| r.get(key_col).map(cell_text))
        .filter(|k| !k.is_empty())
        .collect()
}

#[async_trait::async_trait]
impl Tracker for SheetsTracker {
    fn name(&self) -> &'static str {
        "google-sheets"
    }

    async fn existing_keys(&self) -> Result<HashSet<String>> {
        let token = self.access_token().await?;
        self.ensure_sheet(&token).await?;

        let range = self.full_range();
        let url = self.url(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        let vr: ValueRange = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .context("values get request")?
            .error_for_status()
            .context("values get non-2xx")?
            .json()
            .await
            .context("parsing values response")?;
        Ok(keys_from_values(&vr.values))
    }

    async fn append(&self, records: &[TrackerRecord]) -> Result<()> {
        let token = self.access_token().await?;
        self.ensure_sheet(&token).await?;
        let rows: Vec<Vec<String>> = records.iter().map(TrackerRecord::to_row).collect();
        self.append_values(&token, &rows).await
    }
}
