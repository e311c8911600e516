//! The table session: the single owner of dataset, filter, sort and page
//! state.
//!
//! Every mutating operation either succeeds completely or returns a
//! [`TableError`] and leaves the session untouched. After each successful
//! mutation the active view is rebuilt from scratch: filter the original
//! rows, sort the survivors, then clamp the current page.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::color::{ColorClassifier, SeverityBucket};
use crate::config::AppConfig;
use crate::dataset::{Dataset, RawCell, Row, RowId};
use crate::error::{Selection, TableError, TableResult};
use crate::export::to_sheet;
use crate::filter::{compute_active, filter_options, FilterState};
use crate::inference::{ColumnType, ColumnTypeInferer};
use crate::paginate::PageState;
use crate::sort::{sort_active, SortDirection, SortState};
use crate::value::display_value;

/// Row and column counts for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub active_rows: usize,
    pub total_rows: usize,
    pub columns: usize,
}

#[derive(Debug, Default)]
pub struct TableSession {
    dataset: Option<Dataset>,
    filters: FilterState,
    sort: SortState,
    page: PageState,
    inferer: ColumnTypeInferer,
    classifier: ColorClassifier,
}

impl TableSession {
    pub fn new(inferer: ColumnTypeInferer, classifier: ColorClassifier, page_size: usize) -> Self {
        Self {
            dataset: None,
            filters: FilterState::new(),
            sort: SortState::default(),
            page: PageState::new(page_size),
            inferer,
            classifier,
        }
    }

    /// Session configured from the `[inference]`, `[coloring]` and
    /// `[display]` sections.
    pub fn from_config(config: &AppConfig) -> color_eyre::Result<Self> {
        Ok(Self::new(
            config.inference.inferer()?,
            ColorClassifier::new(config.coloring.numeric),
            config.display.page_size,
        ))
    }

    /// Replace the whole state with a freshly ingested dataset.
    ///
    /// On [`TableError::EmptyDataset`] the previous dataset, filters, sort and
    /// page are kept.
    pub fn ingest<R, C>(&mut self, raw_rows: R) -> TableResult<()>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<RawCell>,
    {
        let dataset = Dataset::from_raw(raw_rows, &self.inferer)?;
        debug!(
            rows = dataset.original().len(),
            columns = ?dataset.columns(),
            types = ?dataset.column_types(),
            "ingested dataset"
        );
        self.dataset = Some(dataset);
        self.filters.clear();
        self.sort.clear();
        self.page.reset();
        self.refresh();
        Ok(())
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn columns(&self) -> &[String] {
        self.dataset.as_ref().map(Dataset::columns).unwrap_or(&[])
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.dataset.as_ref()?.column_type(column)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    /// Restrict `column` to the given raw values. An empty list clears the
    /// filter on that column.
    pub fn set_filter<I, S>(&mut self, column: &str, values: I) -> TableResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_column(column)?;
        self.filters.set_column_filter(column, values);
        debug!(column, allowed = ?self.filters.allowed(column), "filter changed");
        self.refresh();
        Ok(())
    }

    pub fn clear_filter(&mut self, column: &str) {
        self.filters.clear_column(column);
        debug!(column, "filter cleared");
        self.refresh();
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
        self.refresh();
    }

    /// Choices offered for filtering `column`: its distinct non-empty values.
    pub fn filter_options(&self, column: &str) -> TableResult<Vec<String>> {
        let dataset = self.require_column(column)?;
        Ok(filter_options(dataset.original(), column))
    }

    pub fn sort(&mut self, column: &str, direction: SortDirection) -> TableResult<()> {
        self.require_column(column)?;
        self.sort.set(column, direction);
        debug!(column, ?direction, "sort changed");
        self.refresh();
        Ok(())
    }

    /// Sort by `column`, flipping the direction when it is already the sort
    /// column.
    pub fn toggle_sort(&mut self, column: &str) -> TableResult<SortDirection> {
        self.require_column(column)?;
        let direction = self.sort.toggle(column);
        debug!(column, ?direction, "sort toggled");
        self.refresh();
        Ok(direction)
    }

    pub fn clear_sort(&mut self) {
        self.sort.clear();
        self.refresh();
    }

    /// Delete columns from the original rows. Any filter or sort on a deleted
    /// column is dropped with it.
    pub fn delete_columns<S: AsRef<str>>(&mut self, names: &[S]) -> TableResult<()> {
        if names.is_empty() {
            return Err(TableError::NoSelection(Selection::Columns));
        }
        let dataset = self
            .dataset
            .as_mut()
            .ok_or_else(|| TableError::UnknownColumn(names[0].as_ref().to_string()))?;
        if let Some(missing) = names.iter().find(|n| !dataset.has_column(n.as_ref())) {
            return Err(TableError::UnknownColumn(missing.as_ref().to_string()));
        }

        let names: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        dataset.remove_columns(&names);
        for name in &names {
            self.filters.clear_column(name);
        }
        if self.sort.column().is_some_and(|c| names.contains(c)) {
            self.sort.clear();
        }
        debug!(deleted = ?names, "columns deleted");
        self.refresh();
        Ok(())
    }

    /// Delete rows by id from the original rows.
    pub fn delete_rows(&mut self, ids: &[RowId]) -> TableResult<()> {
        if ids.is_empty() {
            return Err(TableError::NoSelection(Selection::Rows));
        }
        let dataset = self
            .dataset
            .as_mut()
            .ok_or(TableError::UnknownRow(ids[0]))?;
        if let Some(missing) = ids.iter().find(|id| !dataset.contains_row(**id)) {
            return Err(TableError::UnknownRow(*missing));
        }

        let ids: HashSet<RowId> = ids.iter().copied().collect();
        dataset.remove_rows(&ids);
        debug!(count = ids.len(), "rows deleted");
        self.refresh();
        Ok(())
    }

    /// Go to page `n`, clamped into the valid range. Returns the page now
    /// current.
    pub fn set_page(&mut self, n: usize) -> usize {
        let len = self.active_len();
        self.page.set_page(n, len)
    }

    pub fn total_pages(&self) -> usize {
        crate::paginate::total_pages(self.active_len(), self.page.page_size())
    }

    /// Rows of the current page, in view order.
    pub fn page_rows(&self) -> Vec<&Row> {
        let Some(dataset) = &self.dataset else {
            return Vec::new();
        };
        let range = self.page.range(dataset.active_len());
        dataset
            .active_rows()
            .skip(range.start)
            .take(range.len())
            .collect()
    }

    pub fn active_rows(&self) -> Vec<&Row> {
        self.dataset
            .as_ref()
            .map(|d| d.active_rows().collect())
            .unwrap_or_default()
    }

    pub fn active_len(&self) -> usize {
        self.dataset.as_ref().map_or(0, Dataset::active_len)
    }

    /// Header plus active rows as a sheet, ready for an export adapter.
    pub fn export_view(&self) -> TableResult<Vec<Vec<String>>> {
        let dataset = self.dataset.as_ref().ok_or(TableError::EmptyExport)?;
        if dataset.active_len() == 0 {
            return Err(TableError::EmptyExport);
        }
        Ok(to_sheet(dataset.active_rows(), dataset.columns()))
    }

    /// Severity of a raw value under `column`'s type and value range.
    pub fn classify_cell(&self, column: &str, raw: &str) -> Option<SeverityBucket> {
        let dataset = self.dataset.as_ref()?;
        let column_type = dataset.column_type(column)?;
        self.classifier
            .classify(raw, column_type, dataset.numeric_range(column))
    }

    /// Raw value formatted for display under `column`'s type.
    pub fn display_cell(&self, column: &str, raw: &str) -> String {
        display_value(raw, self.column_type(column).unwrap_or_default())
    }

    pub fn stats(&self) -> TableStats {
        match &self.dataset {
            Some(dataset) => TableStats {
                active_rows: dataset.active_len(),
                total_rows: dataset.original().len(),
                columns: dataset.columns().len(),
            },
            None => TableStats {
                active_rows: 0,
                total_rows: 0,
                columns: 0,
            },
        }
    }

    fn require_column(&self, column: &str) -> TableResult<&Dataset> {
        self.dataset
            .as_ref()
            .filter(|d| d.has_column(column))
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))
    }

    fn refresh(&mut self) {
        let Some(dataset) = self.dataset.as_mut() else {
            self.page.reset();
            return;
        };
        let mut active = compute_active(dataset.original(), &self.filters);
        if let Some(column) = self.sort.column() {
            if let Some(column_type) = dataset.column_type(column) {
                sort_active(
                    dataset.original(),
                    &mut active,
                    column,
                    self.sort.direction(),
                    column_type,
                );
            }
        }
        let len = active.len();
        dataset.set_active(active);
        self.page.clamp(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores_session() -> TableSession {
        let mut session = TableSession::default();
        session
            .ingest(vec![
                vec!["Name", "Score%"],
                vec!["A", "95%"],
                vec!["B", "40"],
                vec!["C", ""],
            ])
            .unwrap();
        session
    }

    fn names(session: &TableSession) -> Vec<String> {
        session
            .active_rows()
            .iter()
            .map(|r| r.get("Name").to_string())
            .collect()
    }

    #[test]
    fn test_scores_scenario() {
        let mut session = scores_session();
        assert_eq!(session.column_type("Name"), Some(ColumnType::Text));
        assert_eq!(session.column_type("Score%"), Some(ColumnType::Percentage));
        assert_eq!(
            session.classify_cell("Score%", "40"),
            Some(SeverityBucket::Bad)
        );
        assert_eq!(session.classify_cell("Score%", ""), None);

        session.set_filter("Score%", ["95%"]).unwrap();
        assert_eq!(names(&session), vec!["A"]);
        assert_eq!(
            session.export_view().unwrap(),
            vec![
                vec!["Name".to_string(), "Score%".to_string()],
                vec!["A".to_string(), "95%".to_string()],
            ]
        );
    }

    #[test]
    fn test_failed_ingest_keeps_previous_state() {
        let mut session = scores_session();
        session.set_filter("Name", ["A", "B"]).unwrap();
        let err = session.ingest(vec![vec!["only", "header"]]).unwrap_err();
        assert_eq!(err, TableError::EmptyDataset);
        assert_eq!(names(&session), vec!["A", "B"]);
    }

    #[test]
    fn test_ingest_resets_filters_sort_and_page() {
        let mut session = scores_session();
        session.set_filter("Name", ["A"]).unwrap();
        session.sort("Name", SortDirection::Desc).unwrap();
        session
            .ingest(vec![vec!["x"], vec!["1"], vec!["2"]])
            .unwrap();
        assert!(session.filters().is_empty());
        assert_eq!(session.sort_state().column(), None);
        assert_eq!(session.page_state().current_page(), 1);
        assert_eq!(session.active_len(), 2);
    }

    #[test]
    fn test_sort_applies_after_filter() {
        let mut session = scores_session();
        session.sort("Score%", SortDirection::Desc).unwrap();
        assert_eq!(names(&session), vec!["A", "B", "C"]);
        session.sort("Score%", SortDirection::Asc).unwrap();
        assert_eq!(names(&session), vec!["B", "A", "C"]);
        session.set_filter("Name", ["A", "C"]).unwrap();
        assert_eq!(names(&session), vec!["A", "C"]);
    }

    #[test]
    fn test_toggle_sort() {
        let mut session = scores_session();
        assert_eq!(session.toggle_sort("Name").unwrap(), SortDirection::Asc);
        assert_eq!(session.toggle_sort("Name").unwrap(), SortDirection::Desc);
        assert_eq!(names(&session), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let mut session = scores_session();
        assert_eq!(
            session.set_filter("Nope", ["x"]).unwrap_err(),
            TableError::UnknownColumn("Nope".into())
        );
        assert!(session.sort("Nope", SortDirection::Asc).is_err());
    }

    #[test]
    fn test_delete_columns() {
        let mut session = scores_session();
        session.set_filter("Score%", ["95%"]).unwrap();
        session.sort("Score%", SortDirection::Asc).unwrap();

        session.delete_columns(&["Score%"]).unwrap();
        assert_eq!(session.columns(), ["Name"]);
        assert_eq!(session.column_type("Score%"), None);
        assert!(session.filters().is_empty());
        assert_eq!(session.sort_state().column(), None);
        assert_eq!(session.active_len(), 3);
    }

    #[test]
    fn test_delete_columns_is_atomic() {
        let mut session = scores_session();
        let err = session.delete_columns(&["Name", "Missing"]).unwrap_err();
        assert_eq!(err, TableError::UnknownColumn("Missing".into()));
        assert_eq!(session.columns(), ["Name", "Score%"]);

        let none: [&str; 0] = [];
        assert_eq!(
            session.delete_columns(&none).unwrap_err(),
            TableError::NoSelection(Selection::Columns)
        );
    }

    #[test]
    fn test_delete_every_column() {
        let mut session = scores_session();
        let all = session.columns().to_vec();
        session.delete_columns(&all).unwrap();
        assert!(session.columns().is_empty());
        assert_eq!(session.stats().columns, 0);
    }

    #[test]
    fn test_delete_rows_by_id() {
        let mut session = scores_session();
        session.sort("Name", SortDirection::Desc).unwrap();
        // ids are stable across sorting
        session.delete_rows(&[RowId(1)]).unwrap();
        assert_eq!(names(&session), vec!["C", "B"]);

        assert_eq!(
            session.delete_rows(&[RowId(2), RowId(1)]).unwrap_err(),
            TableError::UnknownRow(RowId(1))
        );
        assert_eq!(session.active_len(), 2);
        assert_eq!(
            session.delete_rows(&[]).unwrap_err(),
            TableError::NoSelection(Selection::Rows)
        );
    }

    #[test]
    fn test_page_clamps_when_view_shrinks() {
        let mut session = TableSession::new(ColumnTypeInferer::default(), ColorClassifier::default(), 2);
        let mut rows = vec![vec!["n".to_string()]];
        rows.extend((1..=7).map(|i| vec![i.to_string()]));
        session.ingest(rows).unwrap();
        assert_eq!(session.total_pages(), 4);
        assert_eq!(session.set_page(4), 4);
        assert_eq!(session.page_rows().len(), 1);

        session.set_filter("n", ["1", "2", "3"]).unwrap();
        assert_eq!(session.page_state().current_page(), 2);
        assert_eq!(session.page_rows()[0].get("n"), "3");
        assert_eq!(session.set_page(0), 1);
    }

    #[test]
    fn test_export_empty_view() {
        let mut session = scores_session();
        session.set_filter("Name", ["Z"]).unwrap();
        assert_eq!(session.export_view().unwrap_err(), TableError::EmptyExport);
        assert_eq!(
            TableSession::default().export_view().unwrap_err(),
            TableError::EmptyExport
        );
    }

    #[test]
    fn test_display_and_stats() {
        let mut session = scores_session();
        assert_eq!(session.display_cell("Score%", "95%"), "95.0%");
        assert_eq!(session.display_cell("Name", "A"), "A");
        session.set_filter("Name", ["A"]).unwrap();
        assert_eq!(
            session.stats(),
            TableStats {
                active_rows: 1,
                total_rows: 3,
                columns: 2
            }
        );
    }

    #[test]
    fn test_filter_options() {
        let session = scores_session();
        assert_eq!(session.filter_options("Score%").unwrap(), vec!["40", "95%"]);
    }
}
