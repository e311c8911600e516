//! The ingested row set and its derived view.
//!
//! A [`Dataset`] keeps the original rows exactly as ingested (apart from
//! explicit deletions), one [`ColumnType`] per column, and the active view as
//! an ordered list of positions into the original rows. The view is replaced
//! wholesale by the session; it is never edited in place.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::color::NumericRange;
use crate::error::{TableError, TableResult};
use crate::inference::{ColumnType, ColumnTypeInferer};
use crate::value::parse_numeric;

/// Stable row identity assigned at ingest. Survives filtering, sorting,
/// paging and deletion of other rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cell as handed over by an ingest adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Empty,
}

impl RawCell {
    pub fn into_raw_string(self) -> String {
        match self {
            RawCell::Text(s) => s,
            RawCell::Number(n) => n.to_string(),
            RawCell::Empty => String::new(),
        }
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        RawCell::Text(value)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<Option<String>> for RawCell {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawCell::Empty, RawCell::Text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: RowId,
    cells: IndexMap<String, String>,
}

impl Row {
    pub fn new(id: RowId, cells: IndexMap<String, String>) -> Self {
        Self { id, cells }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    /// Raw value of `column`; empty when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn cells(&self) -> &IndexMap<String, String> {
        &self.cells
    }

    fn remove_column(&mut self, column: &str) {
        self.cells.shift_remove(column);
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    column_types: HashMap<String, ColumnType>,
    original: Vec<Row>,
    active: Vec<usize>,
    numeric_ranges: HashMap<String, NumericRange>,
}

impl Dataset {
    /// Build a dataset from a header row followed by data rows.
    ///
    /// Fails with [`TableError::EmptyDataset`] when there is no header or no
    /// row below it. Short rows are padded with empty cells and cells beyond
    /// the header are dropped.
    pub fn from_raw<R, C>(raw_rows: R, inferer: &ColumnTypeInferer) -> TableResult<Self>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<RawCell>,
    {
        let mut rows = raw_rows.into_iter();
        let header: Vec<String> = match rows.next() {
            Some(header) => header
                .into_iter()
                .map(|c| Into::<RawCell>::into(c).into_raw_string())
                .collect(),
            None => return Err(TableError::EmptyDataset),
        };
        let columns = normalize_headers(header);

        let original: Vec<Row> = rows
            .enumerate()
            .map(|(idx, raw)| {
                let mut values = raw
                    .into_iter()
                    .map(|c| Into::<RawCell>::into(c).into_raw_string());
                let cells = columns
                    .iter()
                    .map(|col| (col.clone(), values.next().unwrap_or_default()))
                    .collect();
                Row::new(RowId(idx + 1), cells)
            })
            .collect();

        if columns.is_empty() || original.is_empty() {
            return Err(TableError::EmptyDataset);
        }

        let column_types = columns
            .iter()
            .map(|col| {
                let ty = inferer.infer_column(col, original.iter().map(|r| r.get(col)));
                (col.clone(), ty)
            })
            .collect();

        let active = (0..original.len()).collect();
        let mut dataset = Self {
            columns,
            column_types,
            original,
            active,
            numeric_ranges: HashMap::new(),
        };
        dataset.recompute_ranges();
        debug!(
            rows = dataset.original.len(),
            columns = dataset.columns.len(),
            "dataset built"
        );
        Ok(dataset)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_types.contains_key(column)
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    pub fn column_types(&self) -> &HashMap<String, ColumnType> {
        &self.column_types
    }

    /// Min/max over the parseable values of a numeric column in `original`.
    pub fn numeric_range(&self, column: &str) -> Option<&NumericRange> {
        self.numeric_ranges.get(column)
    }

    pub fn original(&self) -> &[Row] {
        &self.original
    }

    pub fn contains_row(&self, id: RowId) -> bool {
        self.original.iter().any(|r| r.id == id)
    }

    /// Rows of the active view, in view order.
    pub fn active_rows(&self) -> impl ExactSizeIterator<Item = &Row> + '_ {
        self.active.iter().map(move |&pos| &self.original[pos])
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Replace the active view. Positions index into `original`.
    pub(crate) fn set_active(&mut self, active: Vec<usize>) {
        debug_assert!(active.iter().all(|&pos| pos < self.original.len()));
        self.active = active;
    }

    /// Remove columns from every row. Callers validate the names first.
    pub(crate) fn remove_columns(&mut self, names: &HashSet<&str>) {
        self.columns.retain(|c| !names.contains(c.as_str()));
        self.column_types.retain(|c, _| !names.contains(c.as_str()));
        self.numeric_ranges.retain(|c, _| !names.contains(c.as_str()));
        for row in &mut self.original {
            for name in names {
                row.remove_column(name);
            }
        }
    }

    /// Remove rows by id. Callers validate the ids first.
    pub(crate) fn remove_rows(&mut self, ids: &HashSet<RowId>) {
        self.original.retain(|r| !ids.contains(&r.id));
        self.active = (0..self.original.len()).collect();
        self.recompute_ranges();
    }

    fn recompute_ranges(&mut self) {
        self.numeric_ranges = self
            .columns
            .iter()
            .filter(|col| self.column_types.get(*col).is_some_and(|t| t.is_numeric()))
            .filter_map(|col| {
                let values = self.original.iter().filter_map(|r| parse_numeric(r.get(col)));
                NumericRange::from_values(values).map(|range| (col.clone(), range))
            })
            .collect();
    }
}

/// Make header names non-empty and unique, keeping their order.
fn normalize_headers(header: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());
    for (idx, name) in header.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            trimmed.to_string()
        };
        let mut candidate = base.clone();
        let mut k = 2;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{k}");
            k += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> Dataset {
        Dataset::from_raw(
            vec![
                vec!["Name", "Score%"],
                vec!["A", "95%"],
                vec!["B", "40"],
                vec!["C", ""],
            ],
            &ColumnTypeInferer::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_raw_infers_types() {
        let ds = scores();
        assert_eq!(ds.columns(), ["Name", "Score%"]);
        assert_eq!(ds.column_type("Name"), Some(ColumnType::Text));
        assert_eq!(ds.column_type("Score%"), Some(ColumnType::Percentage));
        assert_eq!(ds.active_len(), 3);
    }

    #[test]
    fn test_row_ids_are_one_based_and_ordered() {
        let ds = scores();
        let ids: Vec<RowId> = ds.original().iter().map(Row::id).collect();
        assert_eq!(ids, vec![RowId(1), RowId(2), RowId(3)]);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let inferer = ColumnTypeInferer::default();
        let none: Vec<Vec<&str>> = Vec::new();
        assert_eq!(
            Dataset::from_raw(none, &inferer).unwrap_err(),
            TableError::EmptyDataset
        );
        assert_eq!(
            Dataset::from_raw(vec![vec!["a", "b"]], &inferer).unwrap_err(),
            TableError::EmptyDataset
        );
    }

    #[test]
    fn test_ragged_rows_are_padded_and_truncated() {
        let ds = Dataset::from_raw(
            vec![vec!["a", "b"], vec!["1"], vec!["2", "3", "4"]],
            &ColumnTypeInferer::default(),
        )
        .unwrap();
        assert_eq!(ds.original()[0].get("b"), "");
        assert_eq!(ds.original()[1].cells().len(), 2);
        assert_eq!(ds.original()[1].get("b"), "3");
    }

    #[test]
    fn test_headers_are_normalized() {
        let ds = Dataset::from_raw(
            vec![vec!["x", "", "x", "x"], vec!["1", "2", "3", "4"]],
            &ColumnTypeInferer::default(),
        )
        .unwrap();
        assert_eq!(ds.columns(), ["x", "column_2", "x_2", "x_3"]);
    }

    #[test]
    fn test_number_cells_become_raw_strings() {
        let rows: Vec<Vec<RawCell>> = vec![
            vec!["n".into()],
            vec![RawCell::Number(3.0)],
            vec![RawCell::Number(2.5)],
            vec![RawCell::Empty],
        ];
        let ds = Dataset::from_raw(rows, &ColumnTypeInferer::default()).unwrap();
        let values: Vec<&str> = ds.original().iter().map(|r| r.get("n")).collect();
        assert_eq!(values, vec!["3", "2.5", ""]);
        assert_eq!(ds.column_type("n"), Some(ColumnType::Numeric));
    }

    #[test]
    fn test_numeric_range_covers_original() {
        let ds = Dataset::from_raw(
            vec![vec!["v"], vec!["10"], vec!["x"], vec!["-2"], vec!["7"]],
            &ColumnTypeInferer::default(),
        )
        .unwrap();
        let range = ds.numeric_range("v").unwrap();
        assert_eq!((range.min(), range.max()), (-2.0, 10.0));
        assert!(ds.numeric_range("missing").is_none());
    }

    #[test]
    fn test_remove_columns_drops_types_and_cells() {
        let mut ds = scores();
        ds.remove_columns(&HashSet::from(["Score%"]));
        assert_eq!(ds.columns(), ["Name"]);
        assert!(ds.column_type("Score%").is_none());
        assert!(ds.original().iter().all(|r| r.cells().len() == 1));
    }

    #[test]
    fn test_remove_rows_keeps_other_ids() {
        let mut ds = scores();
        ds.remove_rows(&HashSet::from([RowId(2)]));
        let ids: Vec<RowId> = ds.active_rows().map(Row::id).collect();
        assert_eq!(ids, vec![RowId(1), RowId(3)]);
        assert!(!ds.contains_row(RowId(2)));
    }
}
