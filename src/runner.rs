use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{self, EvacueeSource};
use crate::coords;
use crate::filter::{self, CategoryFilter, FilterSummary};
use crate::paginate::{self, ListView, Page};
use crate::posko::{self, DistrictToggles};
use crate::records::normalize;
use crate::records::{
    DeceasedRecord, EvacueeRecord, HelipadRecord, LastUpdate, PoskoBoard, PoskoEntry,
};
use crate::sheets::{self, GoogleSheetsClient, SheetError, SheetSource};
use crate::utils;

pub const EMPTY_STATE_TITLE: &str = "Tidak ada data yang sesuai dengan pencarian";
pub const EMPTY_STATE_HINT: &str = "Coba gunakan kata kunci lain.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Evacuees,
    Deceased,
    Helipads,
    Posko,
}

impl View {
    pub const ALL: [View; 4] = [View::Evacuees, View::Deceased, View::Helipads, View::Posko];

    /// Accepts the English view names and the Indonesian ones used on the site.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "evacuees" | "pengungsi" => Some(Self::Evacuees),
            "deceased" | "korban" | "meninggal" => Some(Self::Deceased),
            "helipads" | "helipad" => Some(Self::Helipads),
            "posko" => Some(Self::Posko),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Evacuees => "evacuees",
            Self::Deceased => "deceased",
            Self::Helipads => "helipads",
            Self::Posko => "posko",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Evacuees => "Daftar Pengungsi",
            Self::Deceased => "Daftar Korban Meninggal",
            Self::Helipads => "Titik Lokasi Helipad",
            Self::Posko => "Daftar Posko Pengungsi",
        }
    }

    /// Noun used in "N dari M ... ditampilkan" and range lines.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Evacuees => "pengungsi",
            Self::Deceased => "korban",
            Self::Helipads => "lokasi",
            Self::Posko => "posko",
        }
    }

    pub fn category_label(&self) -> Option<&'static str> {
        match self {
            Self::Evacuees => Some("Semua Lokasi"),
            Self::Deceased => Some("Semua Keterangan"),
            Self::Helipads | Self::Posko => None,
        }
    }

    /// Whether the list is paged when the caller does not ask for a page.
    pub fn paged_by_default(&self) -> bool {
        matches!(self, Self::Evacuees)
    }
}

#[derive(Clone, Debug)]
pub struct Options {
    pub spreadsheet_id: String,
    pub api_key: Option<String>,
    pub api_base: String,
    pub fixture: Option<String>,
    pub timeout_seconds: u64,
    pub revalidate_seconds: u64,
    pub evacuee_sources: Vec<EvacueeSource>,
    pub deceased_range: String,
    pub helipad_range: String,
    pub posko_range: String,
    pub posko_total_range: Option<String>,
    pub last_update_range: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            spreadsheet_id: config::DEFAULT_SPREADSHEET_ID.to_string(),
            api_key: None,
            api_base: sheets::DEFAULT_API_BASE.to_string(),
            fixture: None,
            timeout_seconds: 10,
            revalidate_seconds: sheets::DEFAULT_REVALIDATE_SECONDS,
            evacuee_sources: config::default_evacuee_sources(),
            deceased_range: config::DEFAULT_DECEASED_RANGE.to_string(),
            helipad_range: config::DEFAULT_HELIPAD_RANGE.to_string(),
            posko_range: config::DEFAULT_POSKO_RANGE.to_string(),
            posko_total_range: Some(config::DEFAULT_POSKO_TOTAL_RANGE.to_string()),
            last_update_range: Some(config::DEFAULT_LAST_UPDATE_RANGE.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no evacuee sources configured")]
    NoEvacueeSources,

    #[error("empty sheet range for {view}")]
    EmptyRange { view: &'static str },

    #[error("evacuee source #{index} has an empty range")]
    EmptyEvacueeRange { index: usize },

    #[error("failed to set up spreadsheet source: {source}")]
    SourceSetup {
        #[source]
        source: SheetError,
    },

    #[error("failed to load {view}: {source}")]
    Fetch {
        view: &'static str,
        #[source]
        source: SheetError,
    },
}

/// Normalized records of one view, as loaded from the sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Records {
    Evacuees(Vec<EvacueeRecord>),
    Deceased(Vec<DeceasedRecord>),
    Helipads(Vec<HelipadRecord>),
    Posko(PoskoBoard),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Self::Evacuees(v) => v.len(),
            Self::Deceased(v) => v.len(),
            Self::Helipads(v) => v.len(),
            Self::Posko(board) => board.groups.iter().map(|g| g.entries.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub view: View,
    pub last_update: LastUpdate,
    pub records: Records,
}

/// What the reader asked to see: search box, category selector, page and
/// collapsed posko districts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewRequest {
    pub view: View,
    pub state: ListView,
    pub paged: bool,
    pub collapsed: Vec<String>,
}

impl ViewRequest {
    pub fn new(view: View) -> Self {
        Self {
            view,
            state: ListView::new(),
            paged: view.paged_by_default(),
            collapsed: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.state.set_query(query);
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.state.set_category(category);
        self
    }

    /// Asking for a page turns paging on for views that are unpaged by default.
    pub fn with_page(mut self, page: usize) -> Self {
        self.state.set_page(page);
        self.paged = true;
        self
    }

    pub fn with_collapsed(mut self, districts: Vec<String>) -> Self {
        self.collapsed = districts;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub first_index: usize,
    pub last_index: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub range_text: String,
    pub page_text: String,
}

impl PageInfo {
    fn from_page<T>(page: &Page<T>, noun: &str) -> Self {
        Self {
            page: page.clamped_page,
            total_pages: page.total_pages,
            page_size: page.page_size,
            first_index: page.first_index(),
            last_index: page.last_index(),
            has_prev: page.has_prev(),
            has_next: page.has_next(),
            range_text: page.range_text(noun),
            page_text: page.page_text(),
        }
    }
}

/// A displayed row with its 1-based position in the filtered list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Numbered<T> {
    pub number: usize,
    #[serde(flatten)]
    pub record: T,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HelipadRow {
    #[serde(flatten)]
    pub record: HelipadRecord,
    pub map_link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoskoEntryRow {
    #[serde(flatten)]
    pub entry: PoskoEntry,
    pub clickable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoskoGroupRow {
    pub district: String,
    pub open: bool,
    pub entries: Vec<PoskoEntryRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoskoRows {
    pub groups: Vec<PoskoGroupRow>,
    pub total: u64,
    pub total_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "lowercase")]
pub enum ViewRows {
    Evacuees(Vec<Numbered<EvacueeRecord>>),
    Deceased(Vec<Numbered<DeceasedRecord>>),
    Helipads(Vec<Numbered<HelipadRow>>),
    Posko(PoskoRows),
}

impl ViewRows {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Evacuees(v) => v.is_empty(),
            Self::Deceased(v) => v.is_empty(),
            Self::Helipads(v) => v.is_empty(),
            Self::Posko(p) => p.groups.is_empty(),
        }
    }
}

/// Everything a renderer needs for one view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewOutput {
    pub view: View,
    pub title: &'static str,
    pub last_update: LastUpdate,
    pub query: String,
    pub category: CategoryFilter,
    pub category_label: Option<&'static str>,
    pub category_options: Vec<String>,
    pub summary: FilterSummary,
    pub summary_text: String,
    pub pagination: Option<PageInfo>,
    pub rows: ViewRows,
}

#[derive(Debug)]
pub struct Runner {
    options: Options,
    source: SheetSource,
}

impl Runner {
    pub async fn new(options: Options) -> Result<Self, RunnerError> {
        validate_options(&options)?;
        let revalidate = Duration::from_secs(options.revalidate_seconds);
        let source = match options.fixture.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(path) => SheetSource::load_fixture(Path::new(path), revalidate)
                .await
                .map_err(|source| RunnerError::SourceSetup { source })?,
            None => {
                let client = GoogleSheetsClient::new(
                    &options.api_base,
                    &options.spreadsheet_id,
                    options.api_key.clone(),
                    options.timeout_seconds,
                )
                .map_err(|source| RunnerError::SourceSetup { source })?;
                SheetSource::remote(client, revalidate)
            }
        };
        Ok(Self { options, source })
    }

    /// Builds a runner over an already constructed source.
    pub fn with_source(options: Options, source: SheetSource) -> Result<Self, RunnerError> {
        validate_options(&options)?;
        Ok(Self { options, source })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn source(&self) -> &SheetSource {
        &self.source
    }

    /// Forgets cached ranges; the next load reads the sheet again.
    pub async fn invalidate(&self) {
        self.source.invalidate().await;
    }

    pub async fn load(&self, view: View) -> Result<Dataset, RunnerError> {
        let fetch_err = |source: SheetError| RunnerError::Fetch {
            view: view.as_str(),
            source,
        };
        let last_update = self
            .source
            .fetch_last_update(self.options.last_update_range.as_deref());

        let (records, last_update) = match view {
            View::Evacuees => {
                let ranges: Vec<&str> = self
                    .options
                    .evacuee_sources
                    .iter()
                    .map(|s| s.range.as_str())
                    .collect();
                let (rows, last_update) =
                    tokio::join!(self.source.fetch_ranges(&ranges), last_update);
                let rows = rows.map_err(fetch_err)?;
                let records = rows
                    .iter()
                    .zip(self.options.evacuee_sources.iter())
                    .enumerate()
                    .flat_map(|(idx, (rows, src))| normalize::evacuees(rows, idx, &src.location))
                    .collect();
                (Records::Evacuees(records), last_update)
            }
            View::Deceased => {
                let (rows, last_update) = tokio::join!(
                    self.source.fetch_range(&self.options.deceased_range),
                    last_update
                );
                let rows = rows.map_err(fetch_err)?;
                (Records::Deceased(normalize::deceased(&rows)), last_update)
            }
            View::Helipads => {
                let (rows, last_update) = tokio::join!(
                    self.source.fetch_range(&self.options.helipad_range),
                    last_update
                );
                let rows = rows.map_err(fetch_err)?;
                (Records::Helipads(normalize::helipads(&rows)), last_update)
            }
            View::Posko => {
                let total = async {
                    match self.options.posko_total_range.as_deref() {
                        Some(range) if !range.trim().is_empty() => {
                            self.source.fetch_range(range).await.map(Some)
                        }
                        _ => Ok(None),
                    }
                };
                let (rows, total, last_update) = tokio::join!(
                    self.source.fetch_range(&self.options.posko_range),
                    total,
                    last_update
                );
                let rows = rows.map_err(fetch_err)?;
                let total = total.map_err(fetch_err)?;
                let board = normalize::posko(&rows, total.as_deref());
                (Records::Posko(board), last_update)
            }
        };

        info!(view = view.as_str(), records = records.len(), "view loaded");
        Ok(Dataset {
            view,
            last_update,
            records,
        })
    }

    pub async fn render_view(&self, request: &ViewRequest) -> Result<ViewOutput, RunnerError> {
        let dataset = self.load(request.view).await?;
        Ok(build_view(&dataset, request))
    }
}

fn validate_options(options: &Options) -> Result<(), RunnerError> {
    if options.evacuee_sources.is_empty() {
        return Err(RunnerError::NoEvacueeSources);
    }
    if let Some(index) = options
        .evacuee_sources
        .iter()
        .position(|s| s.range.trim().is_empty())
    {
        return Err(RunnerError::EmptyEvacueeRange { index });
    }
    for (view, range) in [
        (View::Deceased, &options.deceased_range),
        (View::Helipads, &options.helipad_range),
        (View::Posko, &options.posko_range),
    ] {
        if range.trim().is_empty() {
            return Err(RunnerError::EmptyRange {
                view: view.as_str(),
            });
        }
    }
    Ok(())
}

fn number_rows<T: Clone>(
    filtered: &[T],
    request: &ViewRequest,
    noun: &str,
) -> (Vec<Numbered<T>>, Option<PageInfo>) {
    if !request.paged {
        let rows = filtered
            .iter()
            .enumerate()
            .map(|(idx, record)| Numbered {
                number: idx + 1,
                record: record.clone(),
            })
            .collect();
        return (rows, None);
    }
    let page = paginate::paginate(filtered, request.state.page(), paginate::PAGE_SIZE);
    let rows = page
        .items
        .iter()
        .enumerate()
        .map(|(idx, record)| Numbered {
            number: page.row_number(idx),
            record: record.clone(),
        })
        .collect();
    (rows, Some(PageInfo::from_page(&page, noun)))
}

/// Filters, pages and groups a loaded dataset for display.
pub fn build_view(dataset: &Dataset, request: &ViewRequest) -> ViewOutput {
    let view = dataset.view;
    let query = request.state.query();
    let category = request.state.category();

    let (rows, summary, options, pagination) = match &dataset.records {
        Records::Evacuees(records) => {
            let filtered = filter::filter(records, query, category);
            let summary = FilterSummary::new(filtered.len(), records.len());
            let (rows, page) = number_rows(&filtered, request, view.noun());
            (
                ViewRows::Evacuees(rows),
                summary,
                filter::category_options(records),
                page,
            )
        }
        Records::Deceased(records) => {
            let filtered = filter::filter(records, query, category);
            let summary = FilterSummary::new(filtered.len(), records.len());
            let (rows, page) = number_rows(&filtered, request, view.noun());
            (
                ViewRows::Deceased(rows),
                summary,
                filter::category_options(records),
                page,
            )
        }
        Records::Helipads(records) => {
            let filtered: Vec<HelipadRow> = filter::filter(records, query, category)
                .into_iter()
                .map(|record| HelipadRow {
                    map_link: coords::to_map_link(&record.latitude, &record.longitude),
                    record,
                })
                .collect();
            let summary = FilterSummary::new(filtered.len(), records.len());
            let (rows, page) = number_rows(&filtered, request, view.noun());
            (ViewRows::Helipads(rows), summary, Vec::new(), page)
        }
        Records::Posko(board) => {
            let filtered = posko::filter_groups(&board.groups, query);
            let mut toggles = DistrictToggles::new(&board.groups);
            for district in &request.collapsed {
                if toggles.is_open(district) {
                    toggles.toggle(district);
                }
            }
            if !query.is_empty() {
                toggles.apply_query(query, &filtered);
            }
            let shown = filtered.iter().map(|g| g.entries.len()).sum();
            let summary = FilterSummary::new(shown, dataset.records.len());
            let groups = filtered
                .into_iter()
                .map(|group| PoskoGroupRow {
                    open: toggles.is_open(&group.district),
                    district: group.district,
                    entries: group
                        .entries
                        .into_iter()
                        .map(|entry| PoskoEntryRow {
                            clickable: posko::is_clickable(&entry),
                            entry,
                        })
                        .collect(),
                })
                .collect();
            let rows = ViewRows::Posko(PoskoRows {
                groups,
                total: board.total,
                total_text: utils::format_thousands(board.total),
            });
            (rows, summary, Vec::new(), None)
        }
    };

    debug!(
        view = view.as_str(),
        shown = summary.shown,
        total = summary.total,
        "view built"
    );

    ViewOutput {
        view,
        title: view.title(),
        last_update: dataset.last_update.clone(),
        query: query.to_string(),
        category: category.clone(),
        category_label: view.category_label(),
        category_options: options,
        summary,
        summary_text: summary.display(view.noun()),
        pagination,
        rows,
    }
}
