//! Serializing the active view back to a sheet and to files.

use chrono::NaiveDate;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::Row;
use crate::ExportFormat;

/// Default prefix for generated export file names.
pub const DEFAULT_FILE_PREFIX: &str = "table_data";

/// Header row followed by one row per entry in `rows`, in `columns` order.
pub fn to_sheet<'a, I>(rows: I, columns: &[String]) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut sheet = vec![columns.to_vec()];
    sheet.extend(rows.into_iter().map(|row| {
        columns
            .iter()
            .map(|col| row.get(col).to_string())
            .collect::<Vec<_>>()
    }));
    sheet
}

/// Build a string-typed frame from a sheet whose first row is the header.
pub fn sheet_to_frame(sheet: &[Vec<String>]) -> Result<DataFrame> {
    let Some((header, body)) = sheet.split_first() else {
        return Ok(DataFrame::empty());
    };
    let columns: Vec<Column> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<&str> = body
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect();
            Series::new(name.as_str().into(), values).into()
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Sheet name used for workbook exports.
pub const WORKBOOK_SHEET: &str = "Data";

/// Write `sheet` to `path` in `format`.
pub fn write_sheet(sheet: &[Vec<String>], path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv | ExportFormat::Tsv => {
            let separator = if format == ExportFormat::Tsv { b'\t' } else { b',' };
            let mut df = sheet_to_frame(sheet)?;
            CsvWriter::new(create(path)?)
                .with_separator(separator)
                .include_header(true)
                .finish(&mut df)?;
        }
        ExportFormat::Json => {
            let mut df = sheet_to_frame(sheet)?;
            JsonWriter::new(create(path)?)
                .with_json_format(JsonFormat::Json)
                .finish(&mut df)?;
        }
        ExportFormat::Xlsx => write_workbook(sheet, path)?,
    }
    info!(
        path = %path.display(),
        format = format.as_str(),
        rows = sheet.len().saturating_sub(1),
        "exported view"
    );
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path)
        .wrap_err_with(|| format!("Failed to create export file {}", path.display()))
}

/// Every cell is written as a string so values like `007` or `95%` survive.
fn write_workbook(sheet: &[Vec<String>], path: &Path) -> Result<()> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let worksheet = book
        .new_sheet(WORKBOOK_SHEET)
        .map_err(|e| eyre!("Failed to add worksheet {}: {}", WORKBOOK_SHEET, e))?;
    for (row_idx, row) in sheet.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            // (column, row), both 1-based
            worksheet
                .get_cell_mut((col_idx as u32 + 1, row_idx as u32 + 1))
                .set_value_string(value.as_str());
        }
    }
    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| eyre!("Failed to write export file {}: {}", path.display(), e))
}

/// `<prefix>_<YYYY-MM-DD>.<ext>` in the current directory.
pub fn default_export_path(prefix: &str, format: ExportFormat, date: NaiveDate) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}.{}",
        prefix,
        date.format("%Y-%m-%d"),
        format.extension()
    ))
}
