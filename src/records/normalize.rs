use tracing::debug;

use super::{DeceasedRecord, EvacueeRecord, HelipadRecord, PoskoBoard, PoskoEntry, PoskoGroup};
use crate::utils;

/// District label for posko rows that appear before any district header.
pub const UNGROUPED_DISTRICT: &str = "-";

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default()
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_sequence(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

/// One name column per sheet; the shelter label comes from the source config.
pub fn evacuees(rows: &[Vec<String>], source_index: usize, location: &str) -> Vec<EvacueeRecord> {
    let location = non_empty(location.trim().to_string());
    let out: Vec<EvacueeRecord> = rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let name = cell(row, 0);
            if name.is_empty() {
                return None;
            }
            Some(EvacueeRecord {
                id: format!("{source_index}-{idx}"),
                name,
                location: location.clone(),
            })
        })
        .collect();
    debug!(
        source_index,
        rows = rows.len(),
        records = out.len(),
        "normalized evacuee rows"
    );
    out
}

/// Columns: no, name, age, address, description.
pub fn deceased(rows: &[Vec<String>]) -> Vec<DeceasedRecord> {
    let out: Vec<DeceasedRecord> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !is_blank_row(row))
        .map(|(idx, row)| DeceasedRecord {
            id: idx.to_string(),
            no: cell(row, 0),
            name: cell(row, 1),
            age: cell(row, 2),
            address: cell(row, 3),
            description: non_empty(cell(row, 4)),
        })
        .collect();
    debug!(rows = rows.len(), records = out.len(), "normalized deceased rows");
    out
}

/// Columns: no, district, village, latitude, longitude, remarks.
pub fn helipads(rows: &[Vec<String>]) -> Vec<HelipadRecord> {
    let out: Vec<HelipadRecord> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !is_blank_row(row))
        .map(|(idx, row)| HelipadRecord {
            id: idx.to_string(),
            no: cell(row, 0),
            district: cell(row, 1),
            village: cell(row, 2),
            latitude: cell(row, 3),
            longitude: cell(row, 4),
            remarks: cell(row, 5),
        })
        .collect();
    debug!(rows = rows.len(), records = out.len(), "normalized helipad rows");
    out
}

fn is_district_header(row: &[String]) -> bool {
    let first = cell(row, 0);
    !first.is_empty() && parse_sequence(&first).is_none() && row.iter().skip(1).all(|c| c.trim().is_empty())
}

/// Columns: no, name, headcount. A row holding only a non-numeric first cell
/// opens a new district.
///
/// `total_rows` is the dedicated grand-total cell. When it is missing or not
/// a number, the total is summed from the entries once, here.
pub fn posko(rows: &[Vec<String>], total_rows: Option<&[Vec<String>]>) -> PoskoBoard {
    let mut groups: Vec<PoskoGroup> = Vec::new();
    for row in rows.iter().filter(|r| !is_blank_row(r)) {
        if is_district_header(row) {
            groups.push(PoskoGroup {
                district: cell(row, 0),
                entries: Vec::new(),
            });
            continue;
        }
        let entry = PoskoEntry {
            no: parse_sequence(&cell(row, 0)).unwrap_or(0),
            name: cell(row, 1),
            headcount: cell(row, 2),
        };
        match groups.last_mut() {
            Some(group) => group.entries.push(entry),
            None => groups.push(PoskoGroup {
                district: UNGROUPED_DISTRICT.to_string(),
                entries: vec![entry],
            }),
        }
    }

    let sheet_total = total_rows
        .and_then(|rows| rows.first())
        .and_then(|row| row.iter().rev().find(|c| !c.trim().is_empty()))
        .and_then(|c| utils::parse_grouped_number(c));
    let total = match sheet_total {
        Some(total) => total,
        None => groups
            .iter()
            .flat_map(|g| g.entries.iter())
            .filter_map(|e| utils::parse_leading_int(&e.headcount))
            .filter(|n| *n > 0)
            .map(|n| n as u64)
            .sum(),
    };
    debug!(
        districts = groups.len(),
        total,
        from_sheet = sheet_total.is_some(),
        "normalized posko rows"
    );

    PoskoBoard { groups, total }
}
