// Tests for report formatting and saving

use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wikihop_core::report::{format_path_line, render, save_report, PathReport, ReportFormat};
use wikihop_core::run::SearchReport;

fn sample_search(found: bool) -> SearchReport {
    SearchReport {
        start: "Coffee".to_string(),
        dest: "Brazil".to_string(),
        path: if found {
            vec![
                "Coffee".to_string(),
                "Arabica".to_string(),
                "Brazil".to_string(),
            ]
        } else {
            Vec::new()
        },
        pages_visited: 42,
        elapsed: Duration::from_millis(1500),
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn report_format_from_str_parses_known_formats() {
    assert!(matches!(
        ReportFormat::from_str("text"),
        Some(ReportFormat::Text)
    ));
    assert!(matches!(
        ReportFormat::from_str("json"),
        Some(ReportFormat::Json)
    ));
    assert!(matches!(
        ReportFormat::from_str("JSON"),
        Some(ReportFormat::Json)
    ));
    assert!(ReportFormat::from_str("html").is_none());
}

// ============================================================================
// Path Report Tests
// ============================================================================

#[test]
fn from_search_counts_hops_and_flags_success() {
    let report = PathReport::from_search(&sample_search(true));
    assert!(report.found);
    assert_eq!(report.hops, 2);
    assert_eq!(report.pages_visited, 42);
    assert!((report.elapsed_secs - 1.5).abs() < 1e-6);
}

#[test]
fn from_search_of_an_empty_path_is_not_found() {
    let report = PathReport::from_search(&sample_search(false));
    assert!(!report.found);
    assert_eq!(report.hops, 0);
    assert!(report.path.is_empty());
}

#[test]
fn format_path_line_joins_with_arrows() {
    let path = vec![
        "Coffee".to_string(),
        "Arabica".to_string(),
        "Brazil".to_string(),
    ];
    assert_eq!(format_path_line(&path), "Coffee -> Arabica -> Brazil");
    assert_eq!(format_path_line(&[]), "");
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn text_report_carries_the_path_line() {
    let report = PathReport::from_search(&sample_search(true));
    let text = render(&report, ReportFormat::Text).unwrap();
    assert!(text.contains("Coffee -> Arabica -> Brazil"));
    assert!(text.contains("Found in 1.50 s"));
    assert!(text.contains("2 hops"));
}

#[test]
fn text_report_headline_is_the_first_line() {
    let found = render(&PathReport::from_search(&sample_search(true)), ReportFormat::Text).unwrap();
    assert_eq!(found.lines().next(), Some("Coffee -> Arabica -> Brazil"));

    let missed =
        render(&PathReport::from_search(&sample_search(false)), ReportFormat::Text).unwrap();
    assert_eq!(missed.lines().next(), Some("No path found from Coffee to Brazil"));
}

#[test]
fn text_report_for_a_failed_search() {
    let report = PathReport::from_search(&sample_search(false));
    let text = render(&report, ReportFormat::Text).unwrap();
    assert!(text.contains("No path found from Coffee to Brazil"));
    assert!(text.contains("42 pages visited"));
}

#[test]
fn json_report_round_trips_the_fields() {
    let report = PathReport::from_search(&sample_search(true));
    let json = render(&report, ReportFormat::Json).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["start"], "Coffee");
    assert_eq!(value["dest"], "Brazil");
    assert_eq!(value["found"], true);
    assert_eq!(value["hops"], 2);
    assert_eq!(value["path"][1], "Arabica");
    assert!(value["generated_at"].is_string());
}

// ============================================================================
// Saving Tests
// ============================================================================

#[test]
fn save_report_writes_the_rendered_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    let report = PathReport::from_search(&sample_search(true));
    let text = render(&report, ReportFormat::Text).unwrap();
    save_report(&text, &path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, text);
}

#[test]
fn save_report_to_a_bad_path_is_an_error() {
    let report = PathReport::from_search(&sample_search(true));
    let text = render(&report, ReportFormat::Text).unwrap();
    let err = save_report(&text, std::path::Path::new("/nonexistent/dir/report.txt")).unwrap_err();
    assert!(format!("{:#}", err).contains("creating"));
}
