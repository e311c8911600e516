//! Command-line definitions, shared with the build script through the
//! `gridwise-cli` crate.

pub use gridwise_cli::{render_options_markdown, Args, ExportFormat, FileFormat};
