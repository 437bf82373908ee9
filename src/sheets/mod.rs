pub mod cache;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::try_join_all;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::records::LastUpdate;
use cache::RangeCache;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_REVALIDATE_SECONDS: u64 = 300;

pub type Rows = Vec<Vec<String>>;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("spreadsheet id is empty")]
    MissingSpreadsheetId,

    #[error("invalid API base URL: {base}")]
    InvalidBaseUrl { base: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request for range '{range}' failed: {source}")]
    Request {
        range: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("range '{range}' returned HTTP {status}")]
    Status { range: String, status: u16 },

    #[error("failed to decode range '{range}': {source}")]
    Decode {
        range: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read fixture {path}: {source}")]
    FixtureRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture {path}: {source}")]
    FixtureParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Body of a `values.get` response. `values` is omitted when the range is
/// empty.
#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => v.to_string(),
    }
}

fn to_rows(values: &[Vec<serde_json::Value>]) -> Rows {
    values
        .iter()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .collect()
}

#[derive(Clone, Debug)]
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    api_base: reqwest::Url,
    spreadsheet_id: String,
    api_key: Option<String>,
}

impl GoogleSheetsClient {
    pub fn new(
        api_base: &str,
        spreadsheet_id: &str,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self, SheetError> {
        let spreadsheet_id = spreadsheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(SheetError::MissingSpreadsheetId);
        }
        let api_base = reqwest::Url::parse(api_base).map_err(|_| SheetError::InvalidBaseUrl {
            base: api_base.to_string(),
        })?;
        if api_base.cannot_be_a_base() {
            return Err(SheetError::InvalidBaseUrl {
                base: api_base.to_string(),
            });
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "bpbd-board/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()
            .map_err(|source| SheetError::HttpClientBuild { source })?;

        Ok(Self {
            client,
            api_base,
            spreadsheet_id: spreadsheet_id.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}?key={api_key}`, with the
    /// range percent-encoded as one path segment.
    pub fn range_url(&self, range: &str) -> Result<reqwest::Url, SheetError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetError::InvalidBaseUrl {
                base: self.api_base.to_string(),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        if let Some(key) = self.api_key.as_deref() {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    async fn fetch(&self, range: &str) -> Result<Rows, SheetError> {
        let url = self.range_url(range)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SheetError::Request {
                range: range.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SheetError::Status {
                range: range.to_string(),
                status: status.as_u16(),
            });
        }
        let body: ValueRange = resp.json().await.map_err(|source| SheetError::Decode {
            range: range.to_string(),
            source,
        })?;
        Ok(to_rows(&body.values))
    }
}

/// Offline stand-in for the spreadsheet:
/// `{"ranges": {"<range>": [[...]]}, "last_update": [[...]]}`.
///
/// A top-level `last_update` block wins over the configured last-update range.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FixtureSheet {
    #[serde(default)]
    ranges: HashMap<String, Vec<Vec<serde_json::Value>>>,
    #[serde(default)]
    last_update: Option<Vec<Vec<serde_json::Value>>>,
}

impl FixtureSheet {
    pub fn from_json(path: &str, contents: &str) -> Result<Self, SheetError> {
        serde_json::from_str(contents).map_err(|source| SheetError::FixtureParse {
            path: path.to_string(),
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, SheetError> {
        let display = path.display().to_string();
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SheetError::FixtureRead {
                    path: display.clone(),
                    source,
                })?;
        Self::from_json(&display, &contents)
    }

    pub fn insert(&mut self, range: &str, rows: &[&[&str]]) {
        let values: Vec<Vec<serde_json::Value>> = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| serde_json::Value::String(c.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect();
        self.ranges.insert(range.to_string(), values);
    }

    pub fn set_last_update(&mut self, label: &str, value: &str) {
        self.last_update = Some(vec![vec![
            serde_json::Value::String(label.to_string()),
            serde_json::Value::String(value.to_string()),
        ]]);
    }

    fn fetch(&self, range: &str) -> Rows {
        match self.ranges.get(range) {
            Some(values) => to_rows(values),
            None => {
                warn!(range, "range not present in fixture, treating as empty");
                Vec::new()
            }
        }
    }
}

#[derive(Clone, Debug)]
enum Backend {
    Remote(GoogleSheetsClient),
    Fixture(FixtureSheet),
}

/// Read side of the shared spreadsheet with a per-range revalidation cache.
#[derive(Debug)]
pub struct SheetSource {
    backend: Backend,
    cache: RangeCache,
    fetches: AtomicUsize,
}

impl SheetSource {
    pub fn remote(client: GoogleSheetsClient, revalidate: Duration) -> Self {
        Self::with_backend(Backend::Remote(client), revalidate)
    }

    pub fn fixture(fixture: FixtureSheet, revalidate: Duration) -> Self {
        Self::with_backend(Backend::Fixture(fixture), revalidate)
    }

    fn with_backend(backend: Backend, revalidate: Duration) -> Self {
        Self {
            backend,
            cache: RangeCache::new(revalidate),
            fetches: AtomicUsize::new(0),
        }
    }

    pub async fn load_fixture(path: &Path, revalidate: Duration) -> Result<Self, SheetError> {
        Ok(Self::fixture(FixtureSheet::load(path).await?, revalidate))
    }

    /// Drops every cached range so the next read goes to the backend.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }

    pub fn revalidate_window(&self) -> Duration {
        self.cache.window()
    }

    /// Number of reads that actually went to the backend.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub async fn fetch_range(&self, range: &str) -> Result<Rows, SheetError> {
        if let Some(rows) = self.cache.get(range).await {
            debug!(range, rows = rows.len(), "range served from cache");
            return Ok(rows);
        }
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let rows = match &self.backend {
            Backend::Remote(client) => client.fetch(range).await?,
            Backend::Fixture(fixture) => fixture.fetch(range),
        };
        debug!(range, rows = rows.len(), "range fetched");
        self.cache.put(range, rows.clone()).await;
        Ok(rows)
    }

    /// Fetches several ranges concurrently, preserving input order.
    pub async fn fetch_ranges(&self, ranges: &[&str]) -> Result<Vec<Rows>, SheetError> {
        try_join_all(ranges.iter().map(|r| self.fetch_range(r))).await
    }

    /// A failed read degrades to "no date" instead of failing the page.
    pub async fn fetch_last_update(&self, range: Option<&str>) -> LastUpdate {
        if let Backend::Fixture(FixtureSheet {
            last_update: Some(values),
            ..
        }) = &self.backend
        {
            return LastUpdate::from_rows(&to_rows(values));
        }
        let Some(range) = range.filter(|r| !r.trim().is_empty()) else {
            return LastUpdate::default();
        };
        match self.fetch_range(range).await {
            Ok(rows) => LastUpdate::from_rows(&rows),
            Err(e) => {
                warn!(range, error = %e, "could not read last-update cell");
                LastUpdate::default()
            }
        }
    }
}
