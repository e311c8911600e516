//! Type-aware, stable ordering of the active view.

use icu_collator::{Collator, CollatorOptions, Strength};
use std::cmp::Ordering;
use tracing::warn;

use crate::dataset::Row;
use crate::inference::ColumnType;
use crate::value::parse_numeric;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// At most one sort column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortState {
    column: Option<String>,
    direction: SortDirection,
}

impl SortState {
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn set(&mut self, column: &str, direction: SortDirection) {
        self.column = Some(column.to_string());
        self.direction = direction;
    }

    /// Same column flips the direction; a new column starts ascending.
    pub fn toggle(&mut self, column: &str) -> SortDirection {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flip();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
        self.direction
    }

    pub fn clear(&mut self) {
        self.column = None;
        self.direction = SortDirection::Asc;
    }
}

/// Reorder `active` (positions into `original`) by `column`.
///
/// Numeric and percentage columns compare parsed values and put unparseable
/// cells last in both directions. Text is collated ignoring case and
/// accents. The sort is stable, so ties keep their prior relative order.
pub fn sort_active(
    original: &[Row],
    active: &mut [usize],
    column: &str,
    direction: SortDirection,
    column_type: ColumnType,
) {
    if column_type.is_numeric() {
        let keys: Vec<Option<f64>> = original
            .iter()
            .map(|row| parse_numeric(row.get(column)))
            .collect();
        active.sort_by(|&a, &b| compare_numeric(keys[a], keys[b], direction));
    } else {
        match text_collator() {
            Ok(collator) => active.sort_by(|&a, &b| {
                let ord = collator.compare(original[a].get(column), original[b].get(column));
                apply_direction(ord, direction)
            }),
            Err(e) => {
                warn!(error = %e, "collation data unavailable, sorting by lowercase text");
                let keys: Vec<String> =
                    original.iter().map(|row| fold_case(row.get(column))).collect();
                active.sort_by(|&a, &b| apply_direction(keys[a].cmp(&keys[b]), direction));
            }
        }
    }
}

/// Root-locale collator at primary strength: case and accents are ignored
/// and letters compare by their base form.
fn text_collator() -> Result<Collator, icu_collator::CollatorError> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Primary);
    Collator::try_new(&Default::default(), options)
}

fn apply_direction(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

fn compare_numeric(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => apply_direction(x.total_cmp(&y), direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn fold_case(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).collect()
}
