//! gridwise: a spreadsheet-style table engine with a terminal front end.
//!
//! The core is [`TableSession`], which owns one ingested [`Dataset`] and
//! derives its active view from filters and a sort. Ingest adapters live in
//! [`source`], export in [`export`], and terminal output in [`render`].

pub mod cli;
pub mod color;
pub mod config;
pub mod dataset;
pub mod error;
pub mod error_display;
pub mod export;
pub mod filter;
pub mod inference;
pub mod logging;
pub mod paginate;
pub mod render;
pub mod session;
pub mod sort;
pub mod source;
pub mod value;

pub use cli::{Args, ExportFormat, FileFormat};
pub use color::{ColorClassifier, NumericRange, SeverityBucket};
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use dataset::{Dataset, RawCell, Row, RowId};
pub use error::{Selection, TableError, TableResult};
pub use filter::FilterState;
pub use inference::{ColumnType, ColumnTypeInferer, HeaderOverride};
pub use paginate::PageState;
pub use session::{TableSession, TableStats};
pub use sort::{SortDirection, SortState};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "gridwise";
