pub mod normalize;

use serde::Serialize;

pub const MISSING_PLACEHOLDER: &str = "-";
pub const MISSING_DATE: &str = "Tanggal tidak tersedia";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EvacueeRecord {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

impl EvacueeRecord {
    pub fn location_or_placeholder(&self) -> &str {
        self.location.as_deref().unwrap_or(MISSING_PLACEHOLDER)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeceasedRecord {
    pub id: String,
    /// Sequence cell as written in the sheet.
    pub no: String,
    pub name: String,
    pub age: String,
    pub address: String,
    pub description: Option<String>,
}

impl DeceasedRecord {
    /// Description as used for category matching: trimmed and lower-cased.
    pub fn normalized_description(&self) -> String {
        self.description
            .as_deref()
            .map(|d| d.trim().to_lowercase())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HelipadRecord {
    pub id: String,
    pub no: String,
    pub district: String,
    pub village: String,
    pub latitude: String,
    pub longitude: String,
    pub remarks: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoskoEntry {
    pub no: u32,
    pub name: String,
    /// Headcount exactly as written in the sheet; not guaranteed numeric.
    pub headcount: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoskoGroup {
    pub district: String,
    pub entries: Vec<PoskoEntry>,
}

/// Shelter posts grouped by district plus the grand total taken at load time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PoskoBoard {
    pub groups: Vec<PoskoGroup>,
    pub total: u64,
}

/// Display-ready "last updated" marker.
///
/// Upstream delivers this as a two-dimensional cell range where the value
/// sits in the first row, second column. That shape is an implicit contract
/// with the spreadsheet owner; `from_rows` is the only place that reads it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LastUpdate(Option<String>);

impl LastUpdate {
    pub fn new(value: Option<String>) -> Self {
        Self(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    }

    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        Self::new(rows.first().and_then(|row| row.get(1)).cloned())
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn display(&self) -> &str {
        self.0.as_deref().unwrap_or(MISSING_DATE)
    }
}

/// Renders an empty cell as the placeholder dash.
pub fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING_PLACEHOLDER
    } else {
        value
    }
}
