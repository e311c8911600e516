//! Raw cell token interpretation.

use crate::inference::ColumnType;

/// Returns true when the trimmed token ends with `%`. Purely syntactic.
pub fn is_percentage(raw: &str) -> bool {
    raw.trim().ends_with('%')
}

/// Parse a raw cell token into a finite number.
///
/// A trailing `%` is stripped before parsing, so `"95%"` and `"95"` both
/// yield `95.0`. Returns `None` for empty input and for anything that is not
/// a finite decimal number (`"n/a"`, `"1,234"`, `"inf"`, `"%"`).
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let number = match trimmed.strip_suffix('%') {
        Some(rest) => rest.trim_end(),
        None => trimmed,
    };
    parse_decimal(number)
}

fn parse_decimal(text: &str) -> Option<f64> {
    // f64::from_str also accepts "inf", "NaN" and "infinity"
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a raw value for display under its column type.
///
/// Numeric and percentage cells that were written with a decimal point or a
/// `%` suffix are shown with one decimal, others as the plain number.
/// Percentage columns always append `%`. Text and unparseable values are
/// returned verbatim.
pub fn display_value(raw: &str, column_type: ColumnType) -> String {
    if !column_type.is_numeric() {
        return raw.to_string();
    }
    let Some(value) = parse_numeric(raw) else {
        return raw.to_string();
    };
    let trimmed = raw.trim();
    let suffix = if column_type == ColumnType::Percentage {
        "%"
    } else {
        ""
    };
    if trimmed.contains('.') || trimmed.ends_with('%') {
        format!("{value:.1}{suffix}")
    } else {
        format!("{value}{suffix}")
    }
}
