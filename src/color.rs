//! Severity buckets for numeric cells.

use std::fmt;

use crate::inference::ColumnType;
use crate::value::parse_numeric;

/// Visual severity of a cell, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityBucket {
    Worst,
    Bad,
    LightBad,
    Warn,
    Mid,
    LightGood,
    DarkestGood,
}

impl SeverityBucket {
    pub const ALL: [Self; 7] = [
        Self::Worst,
        Self::Bad,
        Self::LightBad,
        Self::Warn,
        Self::Mid,
        Self::LightGood,
        Self::DarkestGood,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worst => "worst",
            Self::Bad => "bad",
            Self::LightBad => "light_bad",
            Self::Warn => "warn",
            Self::Mid => "mid",
            Self::LightGood => "light_good",
            Self::DarkestGood => "darkest_good",
        }
    }
}

impl fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// (lower bound, bucket), checked in order
const PERCENTAGE_THRESHOLDS: [(f64, SeverityBucket); 6] = [
    (95.0, SeverityBucket::DarkestGood),
    (90.0, SeverityBucket::LightGood),
    (80.0, SeverityBucket::Mid),
    (70.0, SeverityBucket::Warn),
    (50.0, SeverityBucket::LightBad),
    (30.0, SeverityBucket::Bad),
];

const PERCENTILE_THRESHOLDS: [(f64, SeverityBucket); 4] = [
    (0.9, SeverityBucket::DarkestGood),
    (0.75, SeverityBucket::LightGood),
    (0.5, SeverityBucket::Mid),
    (0.25, SeverityBucket::Warn),
];

/// Min and max of a column's parseable values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    min: f64,
    max: f64,
}

impl NumericRange {
    /// `None` when there are no values.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(r) => Some(Self {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Position of `value` within the range, 0.0 at min and 1.0 at max.
    /// `None` when min equals max.
    pub fn percentile(&self, value: f64) -> Option<f64> {
        let span = self.max - self.min;
        if span == 0.0 {
            None
        } else {
            Some((value - self.min) / span)
        }
    }
}

pub fn classify_percentage(value: f64) -> SeverityBucket {
    PERCENTAGE_THRESHOLDS
        .iter()
        .find(|(bound, _)| value >= *bound)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(SeverityBucket::Worst)
}

pub fn classify_numeric(value: f64, range: &NumericRange) -> SeverityBucket {
    let Some(percentile) = range.percentile(value) else {
        return SeverityBucket::DarkestGood;
    };
    PERCENTILE_THRESHOLDS
        .iter()
        .find(|(bound, _)| percentile >= *bound)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(SeverityBucket::LightBad)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorClassifier {
    numeric_coloring: bool,
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self {
            numeric_coloring: true,
        }
    }
}

impl ColorClassifier {
    pub fn new(numeric_coloring: bool) -> Self {
        Self { numeric_coloring }
    }

    pub fn numeric_coloring(&self) -> bool {
        self.numeric_coloring
    }

    /// Bucket for one cell. Text columns, unparseable values and numeric
    /// columns without a range (or with coloring off) get no bucket.
    pub fn classify(
        &self,
        raw: &str,
        column_type: ColumnType,
        range: Option<&NumericRange>,
    ) -> Option<SeverityBucket> {
        match column_type {
            ColumnType::Text => None,
            ColumnType::Percentage => parse_numeric(raw).map(classify_percentage),
            ColumnType::Numeric => {
                if !self.numeric_coloring {
                    return None;
                }
                let value = parse_numeric(raw)?;
                range.map(|r| classify_numeric(value, r))
            }
        }
    }
}
