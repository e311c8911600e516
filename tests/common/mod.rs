#![allow(dead_code)]

use gridwise::config::ConfigManager;
use gridwise::TableSession;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SCORES_CSV: &str = "Name,Score%,Points\nA,95%,12\nB,40,7\nC,,30\nD,81.5%,\n";

/// Temporary config directory with a manager pointing at it
pub fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

/// Write `content` to `name` inside `dir` and return its path
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Write an `.xlsx` workbook with the given sheets. Cells that parse as
/// numbers are stored as numbers
pub fn write_workbook(dir: &TempDir, name: &str, sheets: &[(&str, &[&[&str]])]) -> PathBuf {
    let path = dir.path().join(name);
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    for (sheet_name, rows) in sheets {
        let sheet = book.new_sheet(*sheet_name).expect("Failed to add sheet");
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let cell = sheet.get_cell_mut((c as u32 + 1, r as u32 + 1));
                match value.parse::<f64>() {
                    Ok(n) => cell.set_value_number(n),
                    Err(_) => cell.set_value_string(*value),
                };
            }
        }
    }
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("Failed to write workbook");
    path
}

/// The small scores table used across tests, already ingested
pub fn scores_session() -> TableSession {
    let mut session = TableSession::default();
    session
        .ingest(vec![
            vec!["Name", "Score%"],
            vec!["A", "95%"],
            vec!["B", "40"],
            vec!["C", ""],
        ])
        .expect("scores ingest");
    session
}
