//! Per-column allow-lists and the active view they select.

use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::Row;

/// Allowed raw values per column. A column without an entry is unfiltered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterState {
    allowed: BTreeMap<String, BTreeSet<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `column` to `allowed`. An empty set removes the filter.
    pub fn set_column_filter<I, S>(&mut self, column: &str, allowed: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: BTreeSet<String> = allowed.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            self.allowed.remove(column);
        } else {
            self.allowed.insert(column.to_string(), allowed);
        }
    }

    pub fn clear_column(&mut self, column: &str) {
        self.allowed.remove(column);
    }

    pub fn clear(&mut self) {
        self.allowed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn allowed(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.allowed.get(column)
    }

    pub fn filtered_columns(&self) -> impl Iterator<Item = &str> {
        self.allowed.keys().map(String::as_str)
    }

    /// A row passes when every filtered column holds an allowed value.
    pub fn passes(&self, row: &Row) -> bool {
        self.allowed
            .iter()
            .all(|(column, values)| values.contains(row.get(column)))
    }
}

/// Positions of the rows in `original` that pass `filters`, in original order.
pub fn compute_active(original: &[Row], filters: &FilterState) -> Vec<usize> {
    original
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.passes(row))
        .map(|(pos, _)| pos)
        .collect()
}

/// Distinct non-empty raw values of `column`, sorted.
pub fn filter_options(original: &[Row], column: &str) -> Vec<String> {
    original
        .iter()
        .map(|row| row.get(column))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
