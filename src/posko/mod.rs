use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{PoskoEntry, PoskoGroup};
use crate::utils;

fn entry_matches(entry: &PoskoEntry, needle: &str) -> bool {
    utils::contains_lower(&entry.name, needle)
        || entry.no.to_string().contains(needle)
        || utils::contains_lower(&entry.headcount, needle)
}

/// Narrows posko groups by `query`.
///
/// A district whose own name matches keeps all of its entries. Otherwise only
/// matching entries are kept and the district is dropped when none survive.
pub fn filter_groups(groups: &[PoskoGroup], query: &str) -> Vec<PoskoGroup> {
    let needle = query.to_lowercase();
    groups
        .iter()
        .filter_map(|group| {
            if utils::contains_lower(&group.district, &needle) {
                return Some(group.clone());
            }
            let entries: Vec<PoskoEntry> = group
                .entries
                .iter()
                .filter(|e| entry_matches(e, &needle))
                .cloned()
                .collect();
            if entries.is_empty() {
                None
            } else {
                Some(PoskoGroup {
                    district: group.district.clone(),
                    entries,
                })
            }
        })
        .collect()
}

/// Entries link to the evacuee list only when their headcount reads as a
/// positive number.
pub fn is_clickable(entry: &PoskoEntry) -> bool {
    utils::parse_leading_int(&entry.headcount).is_some_and(|n| n > 0)
}

/// Expanded/collapsed state of each district section, keyed by district name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DistrictToggles {
    defaults: BTreeMap<String, bool>,
    open: BTreeMap<String, bool>,
}

impl DistrictToggles {
    /// All districts start expanded.
    pub fn new(groups: &[PoskoGroup]) -> Self {
        let defaults: BTreeMap<String, bool> = groups
            .iter()
            .map(|g| (g.district.clone(), true))
            .collect();
        Self {
            open: defaults.clone(),
            defaults,
        }
    }

    /// Applies a new query. Clearing it restores the all-expanded default;
    /// a non-empty query forces every surviving district open.
    pub fn apply_query(&mut self, query: &str, filtered: &[PoskoGroup]) {
        if query.is_empty() {
            self.open = self.defaults.clone();
            return;
        }
        self.open = filtered
            .iter()
            .map(|g| (g.district.clone(), true))
            .collect();
    }

    pub fn toggle(&mut self, district: &str) {
        let entry = self.open.entry(district.to_string()).or_insert(false);
        *entry = !*entry;
    }

    pub fn is_open(&self, district: &str) -> bool {
        self.open.get(district).copied().unwrap_or(false)
    }
}
