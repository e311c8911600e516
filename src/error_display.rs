//! User-facing error message formatting.
//!
//! Uses typed error matching (TableError, PolarsError variants, io::ErrorKind)
//! rather than string parsing to produce short, actionable messages.

use polars::prelude::PolarsError;
use std::io;
use std::path::Path;

use crate::error::TableError;

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::ComputeError(msg) => format!("Could not parse the file: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::Duplicate(msg) => format!("Duplicate column: {}", msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check file access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("No space left") {
                return "No space left on device. Free up disk space and try again.".to_string();
            }
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find TableError, PolarsError or io::Error.
/// `path` names the input being loaded, when there is one.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let with_path = |msg: String| match path {
        Some(p) => format!("Failed to load {}: {}", p.display(), msg),
        None => msg,
    };

    for cause in report.chain() {
        if let Some(te) = cause.downcast_ref::<TableError>() {
            return with_path(te.to_string());
        }
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return with_path(user_message_from_polars(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return with_path(user_message_from_io(io_err, None));
        }
    }

    // Fallback: use first line of display to avoid long tracebacks
    let display = report.to_string();
    let first_line = display.lines().next().unwrap_or("An error occurred");
    with_path(first_line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::{eyre, WrapErr};

    #[test]
    fn test_user_message_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(
            msg.contains("not found"),
            "expected 'not found', got: {}",
            msg
        );
    }

    #[test]
    fn test_user_message_from_io_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied");
        let msg = user_message_from_io(&err, None);
        assert!(msg.to_lowercase().contains("permission"), "got: {}", msg);
    }

    #[test]
    fn test_user_message_from_polars_no_data() {
        let err = PolarsError::NoData("empty CSV".into());
        assert_eq!(user_message_from_polars(&err), "No data: empty CSV");
    }

    #[test]
    fn test_report_finds_table_error_in_chain() {
        let report = color_eyre::eyre::Report::new(TableError::EmptyExport)
            .wrap_err("while exporting");
        assert_eq!(user_message_from_report(&report, None), "No data to export");
    }

    #[test]
    fn test_report_mentions_path() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let report = color_eyre::eyre::Report::new(err);
        let msg = user_message_from_report(&report, Some(Path::new("missing.csv")));
        assert!(msg.starts_with("Failed to load missing.csv:"), "got: {}", msg);
    }

    #[test]
    fn test_report_fallback_first_line() {
        let report = eyre!("Excel: bad sheet\nmore detail");
        assert_eq!(user_message_from_report(&report, None), "Excel: bad sheet");
    }
}
