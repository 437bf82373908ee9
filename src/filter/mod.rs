use std::borrow::Cow;

use itertools::Itertools;
use serde::Serialize;

use crate::records::{DeceasedRecord, EvacueeRecord, HelipadRecord};
use crate::utils;

pub const ALL_CATEGORIES: &str = "all";

/// A record that can be narrowed by the free-text search box and, optionally,
/// by one categorical field.
pub trait Searchable {
    /// Whether the record type has a categorical field at all. Category
    /// filters are ignored for types that don't.
    const HAS_CATEGORY: bool = false;

    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Raw (trimmed, original case) value of the categorical field.
    fn category(&self) -> Option<&str> {
        None
    }
}

impl Searchable for EvacueeRecord {
    const HAS_CATEGORY: bool = true;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.location.as_deref().unwrap_or_default()),
        ]
    }

    fn category(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim)
    }
}

impl Searchable for DeceasedRecord {
    const HAS_CATEGORY: bool = true;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.no.as_str()),
            Cow::Borrowed(self.age.as_str()),
            Cow::Borrowed(self.address.as_str()),
            Cow::Owned(self.normalized_description()),
        ]
    }

    fn category(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim)
    }
}

impl Searchable for HelipadRecord {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.district.as_str()),
            Cow::Borrowed(self.village.as_str()),
            Cow::Borrowed(self.latitude.as_str()),
            Cow::Borrowed(self.longitude.as_str()),
            Cow::Borrowed(self.remarks.as_str()),
            Cow::Borrowed(self.no.as_str()),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum CategoryFilter {
    #[default]
    All,
    /// Lower-cased, trimmed category value.
    Exact(String),
}

impl CategoryFilter {
    /// `"all"` (any case) and blank both disable the filter.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Self::All
        } else {
            Self::Exact(trimmed.to_lowercase())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => category.unwrap_or_default().trim().to_lowercase() == *wanted,
        }
    }
}

fn matches_query<T: Searchable>(record: &T, needle: &str) -> bool {
    record
        .search_fields()
        .iter()
        .any(|field| utils::contains_lower(field, needle))
}

/// Stable filter over `records`. An empty query matches every record; the
/// category filter is ANDed on top when the record type has one.
pub fn filter<T: Searchable + Clone>(records: &[T], query: &str, category: &CategoryFilter) -> Vec<T> {
    let category_active = T::HAS_CATEGORY && !category.is_all();
    if query.is_empty() && !category_active {
        return records.to_vec();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| query.is_empty() || matches_query(*r, &needle))
        .filter(|r| !category_active || category.matches(r.category()))
        .cloned()
        .collect()
}

/// Distinct category values present in `records`, sorted for a selector.
pub fn category_options<T: Searchable>(records: &[T]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.category())
        .filter(|c| !c.is_empty())
        .unique()
        .sorted_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)))
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub shown: usize,
    pub total: usize,
}

impl FilterSummary {
    pub fn new(shown: usize, total: usize) -> Self {
        Self { shown, total }
    }

    /// e.g. `"12 dari 340 pengungsi ditampilkan"`.
    pub fn display(&self, noun: &str) -> String {
        format!("{} dari {} {} ditampilkan", self.shown, self.total, noun)
    }
}
