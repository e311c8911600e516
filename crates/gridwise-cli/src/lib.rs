//! Shared CLI definitions for gridwise.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::Path;

/// Input format (used to bypass extension-based detection).
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Excel or OpenDocument spreadsheet (.xls, .xlsx, .xlsm, .xlsb, .ods)
    Excel,
    /// Pasted text: one row per line, tab-separated when a tab is present, else comma-separated
    Text,
}

impl FileFormat {
    /// Detect file format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "csv", "xlsx").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Output format for `--export`
#[derive(Debug, Default, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON array of row objects
    Json,
    /// Excel workbook with a single "Data" sheet
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [Self; 4] = [Self::Csv, Self::Tsv, Self::Json, Self::Xlsx];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Tsv => "TSV",
            Self::Json => "JSON",
            Self::Xlsx => "Excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// Detect export format from the output path. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Command-line arguments for gridwise
#[derive(Clone, Parser, Debug)]
#[command(
    name = "gridwise",
    version,
    about = "Spreadsheet-style table editing in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the data file to open. Use `-` to read pasted text from stdin
    /// (not required with --generate-config)
    #[arg(required_unless_present_any = ["generate_config"], value_name = "PATH")]
    pub path: Option<std::path::PathBuf>,

    /// Force input format (csv, tsv, excel, text).
    /// By default format is auto-detected from the file extension.
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Specify the delimiter to use when reading a delimited text file
    #[arg(long = "delimiter")]
    pub delimiter: Option<char>,

    /// Excel sheet to load: 0-based index (e.g. 0) or sheet name (e.g. "Sales")
    #[arg(long = "sheet", value_name = "SHEET")]
    pub sheet: Option<String>,

    /// Keep only rows whose COL value is VALUE. Repeat to allow several values for one column
    /// or to filter several columns, e.g. --filter Team=Red --filter Team=Blue --filter Year=2024
    #[arg(long = "filter", value_name = "COL=VALUE")]
    pub filter: Vec<String>,

    /// Sort the view by this column (type-aware; missing numbers always last)
    #[arg(long = "sort", value_name = "COL")]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long = "desc", requires = "sort", action)]
    pub desc: bool,

    /// Delete a column before viewing or exporting. Repeatable
    #[arg(long = "delete-column", value_name = "COL")]
    pub delete_column: Vec<String>,

    /// Delete a row by its id (shown with --row-numbers). Repeatable
    #[arg(long = "delete-row", value_name = "ID")]
    pub delete_row: Vec<usize>,

    /// Page to display (1-based). Out-of-range pages show the last page
    #[arg(long = "page", value_name = "N")]
    pub page: Option<usize>,

    /// Number of rows per page (default: 50)
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,

    /// Display row ids on the left side of the table
    #[arg(long = "row-numbers", action)]
    pub row_numbers: bool,

    /// Color numeric (non-percentage) columns relative to their min/max (default: true)
    #[arg(long = "numeric-colors", value_name = "BOOL", value_parser = clap::value_parser!(bool))]
    pub numeric_colors: Option<bool>,

    /// Disable colored output
    #[arg(long = "no-color", action)]
    pub no_color: bool,

    /// Print the inferred column types as JSON and exit
    #[arg(long = "types", action)]
    pub types: bool,

    /// Export the current view. Without a value, writes table_data_<date>.<ext> in the current directory
    #[arg(long = "export", value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    pub export: Option<std::path::PathBuf>,

    /// Export format (csv, tsv, json, xlsx). Defaults to the export path extension, then config
    #[arg(long = "export-format", value_enum)]
    pub export_format: Option<ExportFormat>,

    /// Enable debug logging on stderr
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/gridwise/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
