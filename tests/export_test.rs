use gridwise::export::{write_sheet, WORKBOOK_SHEET};
use gridwise::source::{self, LoadOptions};
use gridwise::{ExportFormat, RawCell, SortDirection, TableError};
use calamine::{open_workbook_auto, Reader};
use std::fs;
use tempfile::TempDir;

mod common;

fn strings(rows: Vec<Vec<RawCell>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|r| r.into_iter().map(RawCell::into_raw_string).collect())
        .collect()
}

#[test]
fn test_csv_export_reloads_to_same_sheet() {
    let dir = TempDir::new().unwrap();
    let mut session = common::scores_session();
    session.sort("Score%", SortDirection::Desc).unwrap();
    let sheet = session.export_view().unwrap();

    let path = dir.path().join("out.csv");
    write_sheet(&sheet, &path, ExportFormat::Csv).unwrap();

    let reloaded = strings(source::load(&path, &LoadOptions::default()).unwrap());
    assert_eq!(reloaded, sheet);
}

#[test]
fn test_tsv_export_uses_tabs() {
    let dir = TempDir::new().unwrap();
    let mut session = common::scores_session();
    session.set_filter("Name", ["A", "B"]).unwrap();

    let path = dir.path().join("out.tsv");
    write_sheet(&session.export_view().unwrap(), &path, ExportFormat::Tsv).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["Name\tScore%", "A\t95%", "B\t40"]);
}

#[test]
fn test_json_export_is_array_of_records() {
    let dir = TempDir::new().unwrap();
    let mut session = common::scores_session();
    session.set_filter("Score%", ["95%", "40"]).unwrap();

    let path = dir.path().join("out.json");
    write_sheet(&session.export_view().unwrap(), &path, ExportFormat::Json).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Name"], "A");
    assert_eq!(records[1]["Score%"], "40");
}

#[test]
fn test_empty_view_is_refused() {
    let mut session = common::scores_session();
    session.set_filter("Name", ["nobody"]).unwrap();
    assert_eq!(session.export_view().unwrap_err(), TableError::EmptyExport);
}

#[test]
fn test_deleted_columns_are_not_exported() {
    let dir = TempDir::new().unwrap();
    let mut session = common::scores_session();
    session.delete_columns(&["Name"]).unwrap();

    let path = dir.path().join("out.csv");
    write_sheet(&session.export_view().unwrap(), &path, ExportFormat::Csv).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().next(), Some("Score%"));
}

#[test]
fn test_xlsx_export_reloads_to_same_sheet() {
    let dir = TempDir::new().unwrap();
    let mut session = common::scores_session();
    session.sort("Name", SortDirection::Desc).unwrap();
    let sheet = session.export_view().unwrap();

    let path = dir.path().join("out.xlsx");
    write_sheet(&sheet, &path, ExportFormat::Xlsx).unwrap();

    let workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec![WORKBOOK_SHEET.to_string()]);

    let reloaded = strings(source::load(&path, &LoadOptions::default()).unwrap());
    assert_eq!(reloaded, sheet);
    assert_eq!(reloaded[1], vec!["C".to_string(), "".to_string()]);
}
