pub mod report;

use colored::Colorize;

use crate::records::{self, MISSING_PLACEHOLDER};
use crate::runner::{ViewOutput, ViewRows, EMPTY_STATE_HINT, EMPTY_STATE_TITLE};

pub const CALL_CENTER: &str = "0812-9090-0222";
pub const CALL_CENTER_NOTE: &str = "Tersedia 24 jam untuk laporan keadaan darurat.";
pub const AGENCY: &str = "BPBD Kabupaten Tapanuli Tengah";
/// Where clickable posko headcounts point in the HTML report, i.e. the file
/// written by `bpbd-board evacuees -o evacuees.html` next to it.
pub const EVACUEE_PAGE: &str = "evacuees.html";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn render(out: &ViewOutput, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(out),
        OutputFormat::Json => render_json(out),
        OutputFormat::Html => render_html(out),
    }
}

fn cell(value: &str) -> &str {
    records::or_placeholder(value)
}

fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, c) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(c.chars().count());
            }
        }
    }
    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let head = line(header.iter().map(|h| h.to_string()).collect());
    out.push_str(&format!("{}\n", head.bold()));
    for row in rows {
        out.push_str(&line(row.clone()));
        out.push('\n');
    }
    out
}

/// Terminal rendering. Colors follow the global `colored` override.
pub fn render_text(out: &ViewOutput) -> Vec<u8> {
    let mut s = String::new();
    s.push_str(&format!("{}\n", out.title.bold().cyan()));
    s.push_str(&format!(
        "{} {}\n",
        "Update terakhir:".dimmed(),
        out.last_update.display()
    ));
    s.push_str(&format!("{}\n\n", out.summary_text));

    if out.rows.is_empty() {
        s.push_str(&format!("{}\n", EMPTY_STATE_TITLE.yellow()));
        s.push_str(&format!("{}\n", EMPTY_STATE_HINT.dimmed()));
    } else {
        match &out.rows {
            ViewRows::Evacuees(rows) => {
                let data: Vec<Vec<String>> = rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.number.to_string(),
                            r.record.name.clone(),
                            r.record.location_or_placeholder().to_string(),
                        ]
                    })
                    .collect();
                s.push_str(&table(&["No", "Nama", "Lokasi"], &data));
            }
            ViewRows::Deceased(rows) => {
                let data: Vec<Vec<String>> = rows
                    .iter()
                    .map(|r| {
                        vec![
                            if r.record.no.is_empty() {
                                r.number.to_string()
                            } else {
                                r.record.no.clone()
                            },
                            cell(&r.record.name).to_string(),
                            cell(&r.record.age).to_string(),
                            cell(&r.record.address).to_string(),
                            r.record
                                .description
                                .as_deref()
                                .unwrap_or(MISSING_PLACEHOLDER)
                                .to_string(),
                        ]
                    })
                    .collect();
                s.push_str(&table(&["No", "Nama", "Umur", "Alamat", "Keterangan"], &data));
            }
            ViewRows::Helipads(rows) => {
                let data: Vec<Vec<String>> = rows
                    .iter()
                    .map(|r| {
                        let h = &r.record.record;
                        vec![
                            r.number.to_string(),
                            cell(&h.district).to_string(),
                            cell(&h.village).to_string(),
                            cell(&h.latitude).to_string(),
                            cell(&h.longitude).to_string(),
                            cell(&h.remarks).to_string(),
                            r.record
                                .map_link
                                .clone()
                                .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()),
                        ]
                    })
                    .collect();
                s.push_str(&table(
                    &["No", "Kecamatan", "Desa", "Lintang", "Bujur", "Keterangan", "Peta"],
                    &data,
                ));
            }
            ViewRows::Posko(posko) => {
                for group in &posko.groups {
                    let marker = if group.open { "▾" } else { "▸" };
                    s.push_str(&format!(
                        "{} {} ({} posko)\n",
                        marker,
                        group.district.bold(),
                        group.entries.len()
                    ));
                    if !group.open {
                        continue;
                    }
                    for e in &group.entries {
                        let headcount = cell(&e.entry.headcount);
                        let headcount = if e.clickable {
                            headcount.green().to_string()
                        } else {
                            headcount.dimmed().to_string()
                        };
                        s.push_str(&format!("  {:>3}. {}  {}\n", e.entry.no, e.entry.name, headcount));
                    }
                }
                s.push_str(&format!("\n{} {}\n", "Total:".bold(), posko.total_text.bold()));
            }
        }
    }

    if let Some(page) = &out.pagination {
        s.push('\n');
        s.push_str(&format!("{}  {}\n", page.range_text, page.page_text.dimmed()));
    }
    s.into_bytes()
}

pub fn render_json(out: &ViewOutput) -> Vec<u8> {
    serde_json::to_vec_pretty(out).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(out: &ViewOutput) -> Vec<u8> {
    report::render_html(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CategoryFilter, FilterSummary};
    use crate::records::{EvacueeRecord, LastUpdate};
    use crate::runner::{Numbered, View};

    fn sample(rows: Vec<Numbered<EvacueeRecord>>) -> ViewOutput {
        let summary = FilterSummary::new(rows.len(), 2);
        ViewOutput {
            view: View::Evacuees,
            title: View::Evacuees.title(),
            last_update: LastUpdate::default(),
            query: String::new(),
            category: CategoryFilter::All,
            category_label: View::Evacuees.category_label(),
            category_options: vec!["Tukka".to_string()],
            summary,
            summary_text: summary.display("pengungsi"),
            pagination: None,
            rows: ViewRows::Evacuees(rows),
        }
    }

    #[test]
    fn format_is_parsed_and_inferred() {
        assert_eq!(OutputFormat::parse(" HTML "), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(infer_format_from_path("out/posko.JSON"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("board.htm"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("board"), None);
    }

    #[test]
    fn text_lists_rows_and_missing_date() {
        colored::control::set_override(false);
        let out = sample(vec![Numbered {
            number: 1,
            record: EvacueeRecord {
                id: "0-0".to_string(),
                name: "Budi".to_string(),
                location: None,
            },
        }]);
        let text = String::from_utf8(render_text(&out)).unwrap();
        assert!(text.contains("Daftar Pengungsi"));
        assert!(text.contains("Tanggal tidak tersedia"));
        assert!(text.contains("1 dari 2 pengungsi ditampilkan"));
        assert!(text.lines().any(|l| l.starts_with("1   Budi  -")));
    }

    #[test]
    fn text_shows_empty_state() {
        colored::control::set_override(false);
        let text = String::from_utf8(render_text(&sample(Vec::new()))).unwrap();
        assert!(text.contains(EMPTY_STATE_TITLE));
        assert!(text.contains(EMPTY_STATE_HINT));
    }

    #[test]
    fn json_tags_rows_by_kind() {
        let out = sample(Vec::new());
        let value: serde_json::Value = serde_json::from_slice(&render_json(&out)).unwrap();
        assert_eq!(value["view"], "evacuees");
        assert_eq!(value["rows"]["kind"], "evacuees");
        assert_eq!(value["last_update"], serde_json::Value::Null);
        assert_eq!(value["category"]["kind"], "all");
    }
}
