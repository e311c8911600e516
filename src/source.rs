//! Ingest adapters: turn files and pasted text into raw rows for a session.
//!
//! Every adapter returns the header row followed by data rows, with cells as
//! [`RawCell`]s. No type interpretation happens here; a delimited file is
//! read with every column as a string so the core sees the raw tokens.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveTime;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use polars::prelude::*;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::config::AppConfig;
use crate::dataset::RawCell;
use crate::{Args, FileFormat};

/// Path that means "read pasted text from stdin".
pub const STDIN_PATH: &str = "-";

pub type RawRows = Vec<Vec<RawCell>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub format: Option<FileFormat>,
    pub delimiter: Option<char>,
    pub sheet: Option<String>,
}

impl LoadOptions {
    /// CLI flags over `[file_loading]` config.
    pub fn from_args(args: &Args, config: &AppConfig) -> Self {
        Self {
            format: args.format,
            delimiter: args.delimiter.or(config.file_loading.delimiter),
            sheet: args
                .sheet
                .clone()
                .or_else(|| config.file_loading.sheet.clone()),
        }
    }
}

/// Read `path` (or stdin for `-`) into raw rows.
///
/// The format comes from `options.format`, then the file extension. Files
/// with an unknown extension are read as CSV.
pub fn load(path: &Path, options: &LoadOptions) -> Result<RawRows> {
    if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .wrap_err("Failed to read pasted data from stdin")?;
        let rows = parse_pasted(&text);
        info!(rows = rows.len(), "loaded pasted data from stdin");
        return Ok(rows);
    }

    let format = options
        .format
        .or_else(|| FileFormat::from_path(path))
        .unwrap_or(FileFormat::Csv);

    let rows = match format {
        FileFormat::Csv => read_delimited(path, delimiter_byte(options.delimiter, b',')?)?,
        FileFormat::Tsv => read_delimited(path, delimiter_byte(options.delimiter, b'\t')?)?,
        FileFormat::Text => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            parse_pasted(&text)
        }
        FileFormat::Excel => read_excel(path, options.sheet.as_deref())?,
    };
    info!(
        path = %path.display(),
        ?format,
        rows = rows.len(),
        "loaded data file"
    );
    Ok(rows)
}

fn delimiter_byte(delimiter: Option<char>, default: u8) -> Result<u8> {
    match delimiter {
        None => Ok(default),
        Some(c) => u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| eyre!("Delimiter must be a single ASCII character, got '{}'", c)),
    }
}

/// Split pasted text into rows: one row per non-blank line, cells split on
/// tab when the line has one, else on comma.
pub fn parse_pasted(text: &str) -> RawRows {
    text.lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let separator = if line.contains('\t') { '\t' } else { ',' };
            line.split(separator).map(RawCell::from).collect()
        })
        .collect()
}

/// Read a delimited text file with every column as a string.
///
/// The header row is read as data so header normalization stays with the
/// core. Ragged rows are padded with nulls or truncated by the reader.
pub fn read_delimited(path: &Path, separator: u8) -> Result<RawRows> {
    let metadata =
        std::fs::metadata(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    if metadata.len() == 0 {
        return Ok(Vec::new());
    }

    let mut read_options = CsvReadOptions::default();
    read_options.has_header = false;
    read_options.infer_schema_length = Some(0);
    read_options = read_options.map_parse_options(|opts| {
        opts.with_separator(separator)
            .with_truncate_ragged_lines(true)
    });
    let df = read_options
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()?;
    frame_to_rows(&df)
}

/// Transpose a string-typed frame into rows. Nulls become empty cells.
pub fn frame_to_rows(df: &DataFrame) -> Result<RawRows> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            let series = col.cast(&DataType::String)?;
            let values: Vec<Option<String>> = series
                .as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((0..df.height())
        .map(|idx| {
            columns
                .iter()
                .map(|col| RawCell::from(col.get(idx).cloned().flatten()))
                .collect()
        })
        .collect())
}

/// Read one worksheet: the sheet at a 0-based index or with the given name,
/// else the first.
pub fn read_excel(path: &Path, sheet: Option<&str>) -> Result<RawRows> {
    let mut workbook = open_workbook_auto(path).map_err(|e| eyre!("Excel: {}", e))?;
    if workbook.sheet_names().is_empty() {
        return Err(eyre!("Excel file has no worksheets"));
    }
    let range = match sheet {
        Some(sel) => match sel.parse::<usize>() {
            Ok(idx) => workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| eyre!("Excel: no sheet at index {}", idx))?
                .map_err(|e| eyre!("Excel: {}", e))?,
            Err(_) => workbook
                .worksheet_range(sel)
                .map_err(|e| eyre!("Excel: {}", e))?,
        },
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| eyre!("Excel: no first sheet"))?
            .map_err(|e| eyre!("Excel: {}", e))?,
    };
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_excel).collect())
        .collect())
}

/// Numbers stay numbers; dates render as ISO text; everything else is text.
pub fn cell_from_excel(cell: &Data) -> RawCell {
    use calamine::DataType;
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => {
                RawCell::Text(dt.format("%Y-%m-%d").to_string())
            }
            Some(dt) => RawCell::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => RawCell::Text(cell.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Text(e.to_string()),
    }
}
