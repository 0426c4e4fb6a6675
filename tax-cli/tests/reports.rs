//! Runs the fixture client files through the same steps the binary takes.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_cli::app::{apply_default_year, build_batch_report, build_report, load_tables};
use tax_cli::report::{render_batch_text, render_json, render_text};
use tax_core::TaxTables;
use tax_data::load_scenarios_from_file;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tax-data")
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn batch_over_csv_fixture_reports_every_client() {
    let mut scenarios = load_scenarios_from_file(&fixture("clients.csv")).unwrap();
    apply_default_year(&mut scenarios, 2030);

    let batch = build_batch_report(TaxTables::shared(), &scenarios, true).unwrap();

    let names: Vec<_> = batch.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Okafor", "Lindqvist", "Baseline"]);
    assert!(batch.failures.is_empty());

    let baseline = &batch.scenarios[2];
    assert_eq!(baseline.projection.years[0].tax_year, Some(2030));
    assert!(baseline.benefits.is_empty());

    let okafor = &batch.scenarios[0];
    assert_eq!(okafor.projection.years[0].tax_year, Some(2025));
    assert_eq!(okafor.benefits.len(), 5);
    assert!(okafor.benefits.iter().any(|b| b.tax_savings > dec!(0)));

    let text = render_batch_text(&batch).unwrap();
    assert!(text.contains("== Okafor ==\n"));
    assert!(text.contains("== Lindqvist ==\n"));
    assert!(!text.contains("FAILED"));
}

#[test]
fn single_project_matches_batch_entry() {
    let scenarios = load_scenarios_from_file(&fixture("scenarios.toml")).unwrap();

    let single = build_report(TaxTables::shared(), &scenarios[0]).unwrap();
    let batch = build_batch_report(TaxTables::shared(), &scenarios, false).unwrap();

    assert_eq!(single, batch.scenarios[0]);
    assert_eq!(render_text(&single).unwrap(), render_text(&batch.scenarios[0]).unwrap());
}

#[test]
fn bracket_override_changes_the_result() {
    let scenarios = load_scenarios_from_file(&fixture("clients.csv")).unwrap();
    let patched = load_tables(None, Some(&fixture("brackets_2026.csv"))).unwrap();

    let before = build_report(TaxTables::shared(), &scenarios[1]).unwrap();
    let after = build_report(&patched, &scenarios[1]).unwrap();

    assert!(after.projection.years[0].baseline.fed_tax < before.projection.years[0].baseline.fed_tax);
}

#[test]
fn json_output_parses_back() {
    let scenarios = load_scenarios_from_file(&fixture("clients.csv")).unwrap();
    let batch = build_batch_report(TaxTables::shared(), &scenarios, false).unwrap();

    let json = render_json(&batch).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["scenarios"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["failures"].as_array().map(Vec::len), Some(0));
    assert_eq!(value["scenarios"][1]["benefits"][0]["strategy"], "equipment_expensing");
}

#[test]
fn missing_tables_file_is_reported_with_its_path() {
    let err = load_tables(Some(Path::new("no-such-tables.toml")), None).unwrap_err();

    assert!(err.to_string().contains("no-such-tables.toml"), "got {err}");
}
