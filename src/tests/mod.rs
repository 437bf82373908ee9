use std::time::Duration;

use crate::config::{self, EvacueeSource};
use crate::filter::CategoryFilter;
use crate::output::{self, OutputFormat};
use crate::records::MISSING_DATE;
use crate::runner::{Options, Runner, RunnerError, View, ViewRequest, ViewRows};
use crate::sheets::{FixtureSheet, SheetError, SheetSource};

const TUKKA: &str = "PENGUNSI-TUKKA!B7:B";
const GOR: &str = "PENGUNSI-GOR PANDAN!B6:B";

fn names(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix} {i}")).collect()
}

fn insert_column(fixture: &mut FixtureSheet, range: &str, values: &[String]) {
    let rows: Vec<[&str; 1]> = values.iter().map(|v| [v.as_str()]).collect();
    let rows: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
    fixture.insert(range, &rows);
}

fn options() -> Options {
    Options {
        evacuee_sources: vec![
            EvacueeSource {
                range: TUKKA.to_string(),
                location: "Kecamatan Tukka".to_string(),
            },
            EvacueeSource {
                range: GOR.to_string(),
                location: "Gedung Serba Guna Pandan".to_string(),
            },
        ],
        ..Options::default()
    }
}

fn board_fixture() -> FixtureSheet {
    let mut fixture = FixtureSheet::default();
    insert_column(&mut fixture, TUKKA, &names("Warga Tukka", 70));
    insert_column(&mut fixture, GOR, &names("Warga Pandan", 50));
    fixture.insert(
        config::DEFAULT_LAST_UPDATE_RANGE,
        &[&["Update", "12 Desember 2025 pukul 08.00 WIB"]],
    );
    fixture.insert(
        config::DEFAULT_DECEASED_RANGE,
        &[
            &["1", "Rudi", "45", "Desa Tukka", "Tertimbun longsor "],
            &["2", "Maria", "30", "Pandan", "tertimbun longsor"],
            &["3", "Hotma", "12", "Sibolga", "Hanyut"],
            &["4", "Leo", "60", "Pandan", ""],
        ],
    );
    fixture.insert(
        config::DEFAULT_HELIPAD_RANGE,
        &[
            &["1", "Tukka", "Aek Tolang", "1°40'39\"N", "98°50'0\"E", "lapangan bola"],
            &["2", "Pandan", "Sibuluan", "1.6821", "98.8234", ""],
            &["3", "Badiri", "Lumut", "belum ada", "", "akses terputus"],
        ],
    );
    fixture.insert(
        config::DEFAULT_POSKO_RANGE,
        &[
            &["A", "", ""],
            &["1", "Posko Gereja", "0"],
            &["2", "Posko Masjid", "25"],
            &["Kecamatan Pandan", "", ""],
            &["1", "GOR Pandan", "310"],
            &["2", "Balai Desa", "-"],
        ],
    );
    fixture.insert(config::DEFAULT_POSKO_TOTAL_RANGE, &[&["Total", "1.250"]]);
    fixture
}

fn runner() -> Runner {
    let source = SheetSource::fixture(board_fixture(), Duration::from_secs(300));
    Runner::with_source(options(), source).unwrap()
}

#[tokio::test]
async fn evacuees_merge_sources_in_order() {
    let dataset = runner().load(View::Evacuees).await.unwrap();
    let crate::runner::Records::Evacuees(records) = &dataset.records else {
        panic!("expected evacuees");
    };
    assert_eq!(records.len(), 120);
    assert_eq!(records[0].name, "Warga Tukka 1");
    assert_eq!(records[70].name, "Warga Pandan 1");
    assert_eq!(records[70].location.as_deref(), Some("Gedung Serba Guna Pandan"));
    assert_eq!(
        dataset.last_update.as_deref(),
        Some("12 Desember 2025 pukul 08.00 WIB")
    );
}

#[tokio::test]
async fn stale_page_clamps_to_last_page() {
    let out = runner()
        .render_view(&ViewRequest::new(View::Evacuees).with_page(5))
        .await
        .unwrap();
    let page = out.pagination.unwrap();
    assert_eq!(page.page, 3);
    assert_eq!(page.range_text, "Menampilkan 101 - 120 dari 120 pengungsi");
    assert_eq!(page.page_text, "Halaman 3 / 3");
    let ViewRows::Evacuees(rows) = &out.rows else {
        panic!("expected evacuee rows");
    };
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].number, 101);
}

#[tokio::test]
async fn location_category_and_query_are_anded() {
    let request = ViewRequest::new(View::Evacuees)
        .with_page(3)
        .with_category(CategoryFilter::parse("gedung serba guna pandan"))
        .with_query("pandan 1");
    assert_eq!(request.state.page(), 1);
    let out = runner().render_view(&request).await.unwrap();
    // "Pandan 1", "Pandan 10".."Pandan 19"
    assert_eq!(out.summary_text, "11 dari 120 pengungsi ditampilkan");
    assert_eq!(
        out.category_options,
        vec!["Gedung Serba Guna Pandan", "Kecamatan Tukka"]
    );
}

#[tokio::test]
async fn deceased_description_matches_ignoring_case_and_padding() {
    let request =
        ViewRequest::new(View::Deceased).with_category(CategoryFilter::parse(" TERTIMBUN LONGSOR"));
    let out = runner().render_view(&request).await.unwrap();
    assert!(out.pagination.is_none());
    let ViewRows::Deceased(rows) = &out.rows else {
        panic!("expected deceased rows");
    };
    let names: Vec<&str> = rows.iter().map(|r| r.record.name.as_str()).collect();
    assert_eq!(names, vec!["Rudi", "Maria"]);
    assert_eq!(out.summary_text, "2 dari 4 korban ditampilkan");
}

#[tokio::test]
async fn deceased_search_covers_sequence_and_age() {
    let out = runner()
        .render_view(&ViewRequest::new(View::Deceased).with_query("60"))
        .await
        .unwrap();
    let ViewRows::Deceased(rows) = &out.rows else {
        panic!("expected deceased rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.name, "Leo");
}

#[tokio::test]
async fn helipads_link_only_readable_coordinates() {
    let out = runner()
        .render_view(&ViewRequest::new(View::Helipads))
        .await
        .unwrap();
    let ViewRows::Helipads(rows) = &out.rows else {
        panic!("expected helipad rows");
    };
    assert_eq!(rows.len(), 3);
    let dms = rows[0].record.map_link.as_deref().unwrap();
    assert!(dms.starts_with("https://www.google.com/maps?q=1.677"));
    assert_eq!(
        rows[1].record.map_link.as_deref(),
        Some("https://www.google.com/maps?q=1.6821,98.8234")
    );
    assert_eq!(rows[2].record.map_link, None);
}

#[tokio::test]
async fn posko_district_match_keeps_zero_headcount_entries() {
    let out = runner()
        .render_view(&ViewRequest::new(View::Posko).with_query("a"))
        .await
        .unwrap();
    let ViewRows::Posko(posko) = &out.rows else {
        panic!("expected posko rows");
    };
    let a = posko.groups.iter().find(|g| g.district == "A").unwrap();
    assert_eq!(a.entries.len(), 2);
    assert!(a.open);
    let gereja = a.entries.iter().find(|e| e.entry.name == "Posko Gereja").unwrap();
    assert!(!gereja.clickable);
    assert_eq!(posko.total, 1250);
    assert_eq!(posko.total_text, "1.250");
}

#[tokio::test]
async fn posko_total_ignores_the_query() {
    let out = runner()
        .render_view(&ViewRequest::new(View::Posko).with_query("gor"))
        .await
        .unwrap();
    let ViewRows::Posko(posko) = &out.rows else {
        panic!("expected posko rows");
    };
    assert_eq!(posko.groups.len(), 1);
    assert_eq!(posko.groups[0].district, "Kecamatan Pandan");
    assert_eq!(posko.groups[0].entries.len(), 1);
    assert_eq!(posko.total, 1250);
    assert_eq!(out.summary_text, "1 dari 4 posko ditampilkan");
}

#[tokio::test]
async fn collapsed_districts_reopen_under_an_active_query() {
    let collapsed = vec!["Kecamatan Pandan".to_string()];
    let runner = runner();

    let out = runner
        .render_view(&ViewRequest::new(View::Posko).with_collapsed(collapsed.clone()))
        .await
        .unwrap();
    let ViewRows::Posko(posko) = &out.rows else {
        panic!("expected posko rows");
    };
    assert!(posko.groups.iter().any(|g| g.district == "Kecamatan Pandan" && !g.open));
    assert!(posko.groups.iter().any(|g| g.district == "A" && g.open));

    let out = runner
        .render_view(
            &ViewRequest::new(View::Posko)
                .with_collapsed(collapsed)
                .with_query("balai"),
        )
        .await
        .unwrap();
    let ViewRows::Posko(posko) = &out.rows else {
        panic!("expected posko rows");
    };
    assert!(posko.groups[0].open);
}

#[tokio::test]
async fn ranges_are_reused_within_the_window() {
    let runner = runner();
    runner.load(View::Deceased).await.unwrap();
    let after_first = runner.source().fetch_count();
    assert_eq!(after_first, 2);
    runner.load(View::Deceased).await.unwrap();
    assert_eq!(runner.source().fetch_count(), after_first);

    runner.invalidate().await;
    runner.load(View::Deceased).await.unwrap();
    assert_eq!(runner.source().fetch_count(), after_first * 2);
}

#[tokio::test]
async fn missing_ranges_degrade_to_empty_views() {
    let source = SheetSource::fixture(FixtureSheet::default(), Duration::ZERO);
    let runner = Runner::with_source(options(), source).unwrap();
    let out = runner
        .render_view(&ViewRequest::new(View::Posko))
        .await
        .unwrap();
    assert!(out.rows.is_empty());
    assert_eq!(out.last_update.display(), MISSING_DATE);
    let html = String::from_utf8(output::render(&out, OutputFormat::Html)).unwrap();
    assert!(html.contains("Tidak ada data yang sesuai dengan pencarian"));
    assert!(html.contains("Tanggal tidak tersedia"));
}

#[tokio::test]
async fn runner_reads_fixture_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");
    let json = format!(
        r#"{{"ranges": {{
            "{}": [["1", "Tukka", "Aek Tolang", "1.5", 98.25, ""]],
            "{}": [["Update", "kemarin"]]
        }}}}"#,
        config::DEFAULT_HELIPAD_RANGE,
        config::DEFAULT_LAST_UPDATE_RANGE
    );
    std::fs::write(&path, json).unwrap();

    let runner = Runner::new(Options {
        fixture: Some(path.to_string_lossy().to_string()),
        ..options()
    })
    .await
    .unwrap();
    let out = runner
        .render_view(&ViewRequest::new(View::Helipads))
        .await
        .unwrap();
    let ViewRows::Helipads(rows) = &out.rows else {
        panic!("expected helipad rows");
    };
    assert_eq!(rows[0].record.record.longitude, "98.25");
    assert_eq!(out.last_update.as_deref(), Some("kemarin"));
}

#[tokio::test]
async fn fixture_last_update_block_is_shown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");
    std::fs::write(&path, r#"{"ranges": {}, "last_update": [["Update", "kemarin"]]}"#).unwrap();

    let runner = Runner::new(Options {
        fixture: Some(path.to_string_lossy().to_string()),
        last_update_range: None,
        ..options()
    })
    .await
    .unwrap();
    let out = runner
        .render_view(&ViewRequest::new(View::Posko))
        .await
        .unwrap();
    assert_eq!(out.last_update.as_deref(), Some("kemarin"));
}

#[tokio::test]
async fn runner_rejects_missing_fixture_and_bad_base() {
    let err = Runner::new(Options {
        fixture: Some("/definitely/not/here.json".to_string()),
        ..options()
    })
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        RunnerError::SourceSetup {
            source: SheetError::FixtureRead { .. }
        }
    ));

    let err = Runner::new(Options {
        api_base: "not a url".to_string(),
        ..options()
    })
    .await
    .unwrap_err();
    assert!(matches!(err, RunnerError::SourceSetup { .. }));
}

#[tokio::test]
async fn remote_runner_builds_without_network() {
    let runner = Runner::new(Options {
        api_key: Some("k".to_string()),
        ..Options::default()
    })
    .await
    .unwrap();
    assert_eq!(runner.source().fetch_count(), 0);
    assert_eq!(runner.source().revalidate_window(), Duration::from_secs(300));
}
