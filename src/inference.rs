//! Column type inference from a sample of raw values.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::{is_percentage, parse_numeric};

/// Number of non-empty values inspected per column.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

// A type wins only with a strict majority of the sample
const MAJORITY: f64 = 0.5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Percentage,
    #[default]
    Text,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Percentage => "percentage",
            Self::Text => "text",
        }
    }

    /// Numeric and percentage columns compare and format as numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Percentage)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forces the type of any column whose header matches `pattern`.
#[derive(Debug, Clone)]
pub struct HeaderOverride {
    pattern: Regex,
    column_type: ColumnType,
}

impl HeaderOverride {
    pub fn new(pattern: &str, column_type: ColumnType) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            column_type,
        })
    }

    pub fn matches(&self, header: &str) -> bool {
        self.pattern.is_match(header)
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

#[derive(Debug, Clone)]
pub struct ColumnTypeInferer {
    sample_size: usize,
    header_overrides: Vec<HeaderOverride>,
}

impl Default for ColumnTypeInferer {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            header_overrides: Vec::new(),
        }
    }
}

impl ColumnTypeInferer {
    pub fn new(sample_size: usize, header_overrides: Vec<HeaderOverride>) -> Self {
        Self {
            sample_size: sample_size.max(1),
            header_overrides,
        }
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Classify a sample of non-empty raw values.
    ///
    /// Values ending in `%` count toward percentage; the rest count toward
    /// numeric when they parse. An empty sample is text.
    pub fn infer(sample: &[&str]) -> ColumnType {
        if sample.is_empty() {
            return ColumnType::Text;
        }
        let total = sample.len() as f64;
        let mut percentage_count = 0usize;
        let mut numeric_count = 0usize;
        for raw in sample {
            if is_percentage(raw) {
                percentage_count += 1;
            } else if parse_numeric(raw).is_some() {
                numeric_count += 1;
            }
        }

        if percentage_count as f64 / total > MAJORITY {
            ColumnType::Percentage
        } else if numeric_count as f64 / total > MAJORITY {
            ColumnType::Numeric
        } else {
            ColumnType::Text
        }
    }

    /// First `sample_size` non-empty values, in row order.
    pub fn sample<'a, I>(&self, values: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .filter(|v| !v.is_empty())
            .take(self.sample_size)
            .collect()
    }

    /// Infer a column's type. A matching header override wins over the sample.
    pub fn infer_column<'a, I>(&self, header: &str, values: I) -> ColumnType
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(forced) = self.header_overrides.iter().find(|o| o.matches(header)) {
            return forced.column_type();
        }
        Self::infer(&self.sample(values))
    }
}
