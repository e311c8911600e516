//! Errors raised by table operations.
//!
//! Every variant is recoverable: the session that returns one is left in its
//! last valid state.

use std::fmt;
use thiserror::Error;

use crate::dataset::RowId;

/// What a deletion request was asked to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Rows,
    Columns,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Rows => write!(f, "rows"),
            Selection::Columns => write!(f, "columns"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("The input appears to be empty or contains no rows below the header")]
    EmptyDataset,

    #[error("Select at least one of the {0} to delete")]
    NoSelection(Selection),

    #[error("No data to export")]
    EmptyExport,

    #[error("Column not found: {0}")]
    UnknownColumn(String),

    #[error("Row not found: #{0}")]
    UnknownRow(RowId),
}

pub type TableResult<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_subject() {
        assert_eq!(
            TableError::NoSelection(Selection::Columns).to_string(),
            "Select at least one of the columns to delete"
        );
        assert_eq!(
            TableError::UnknownColumn("Score%".into()).to_string(),
            "Column not found: Score%"
        );
        assert_eq!(
            TableError::UnknownRow(RowId(7)).to_string(),
            "Row not found: #7"
        );
    }
}
