//! Plain-terminal rendering of the current page.

use comfy_table::presets::NOTHING;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table, TableComponent};
use crossterm::style::Color;
use serde::Serialize;
use std::io::{self, Write};

use crate::color::SeverityBucket;
use crate::config::Theme;
use crate::inference::ColumnType;
use crate::session::TableSession;

const ROW_ID_HEADER: &str = "#";
const COLUMN_GAP: u16 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub row_numbers: bool,
}

/// One entry of the `--types` report.
#[derive(Debug, Serialize)]
pub struct ColumnReport<'a> {
    pub column: &'a str,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Inferred column types, in column order, as pretty JSON.
pub fn types_json(session: &TableSession) -> serde_json::Result<String> {
    let report: Vec<ColumnReport<'_>> = session
        .columns()
        .iter()
        .map(|column| ColumnReport {
            column,
            column_type: session.column_type(column).unwrap_or_default(),
        })
        .collect();
    serde_json::to_string_pretty(&report)
}

// Text color readable on top of each bucket's background
fn foreground_for(bucket: SeverityBucket) -> Color {
    match bucket {
        SeverityBucket::DarkestGood | SeverityBucket::Bad | SeverityBucket::Worst => Color::White,
        _ => Color::Black,
    }
}

/// Theme colors are crossterm colors; the table has its own color type.
fn table_color(color: Color) -> comfy_table::Color {
    use comfy_table::Color as C;
    match color {
        Color::Reset => C::Reset,
        Color::Black => C::Black,
        Color::DarkGrey => C::DarkGrey,
        Color::Red => C::Red,
        Color::DarkRed => C::DarkRed,
        Color::Green => C::Green,
        Color::DarkGreen => C::DarkGreen,
        Color::Yellow => C::Yellow,
        Color::DarkYellow => C::DarkYellow,
        Color::Blue => C::Blue,
        Color::DarkBlue => C::DarkBlue,
        Color::Magenta => C::Magenta,
        Color::DarkMagenta => C::DarkMagenta,
        Color::Cyan => C::Cyan,
        Color::DarkCyan => C::DarkCyan,
        Color::White => C::White,
        Color::Grey => C::Grey,
        Color::Rgb { r, g, b } => C::Rgb { r, g, b },
        Color::AnsiValue(v) => C::AnsiValue(v),
    }
}

/// Build the current page as a borderless table with a dashed header rule.
///
/// Columns are separated by two spaces and numeric columns are right
/// aligned. Widths are display widths, so wide characters line up.
pub fn page_table(session: &TableSession, theme: &Theme, options: RenderOptions) -> Table {
    let columns = session.columns();
    let styled = theme.enabled();

    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_style(TableComponent::HeaderLines, '-')
        .set_content_arrangement(ContentArrangement::Disabled);
    if styled {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }

    let mut header = Vec::with_capacity(columns.len() + 1);
    let mut right_align = Vec::with_capacity(columns.len() + 1);
    if options.row_numbers {
        header.push(ROW_ID_HEADER.to_string());
        right_align.push(true);
    }
    for column in columns {
        header.push(column.clone());
        right_align.push(session.column_type(column).is_some_and(ColumnType::is_numeric));
    }
    table.set_header(header.into_iter().map(|name| {
        let cell = Cell::new(name);
        if styled {
            cell.fg(table_color(theme.get("header")))
                .add_attribute(Attribute::Bold)
        } else {
            cell
        }
    }));

    for row in session.page_rows() {
        let mut cells = Vec::with_capacity(right_align.len());
        if options.row_numbers {
            let id = Cell::new(row.id());
            cells.push(if styled {
                id.fg(table_color(theme.get("row_numbers")))
            } else {
                id
            });
        }
        for column in columns {
            let raw = row.get(column);
            let cell = Cell::new(session.display_cell(column, raw));
            cells.push(match session.classify_cell(column, raw) {
                Some(bucket) if styled => cell
                    .fg(table_color(foreground_for(bucket)))
                    .bg(table_color(theme.bucket(bucket))),
                _ => cell,
            });
        }
        table.add_row(cells);
    }

    let last = right_align.len().saturating_sub(1);
    for (idx, column) in table.column_iter_mut().enumerate() {
        let gap = if idx == last { 0 } else { COLUMN_GAP };
        column.set_padding((0, gap));
        if right_align.get(idx).copied().unwrap_or(false) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

/// Write the current page as an aligned table followed by a status line.
pub fn render_page<W: Write>(
    out: &mut W,
    session: &TableSession,
    theme: &Theme,
    options: RenderOptions,
) -> io::Result<()> {
    let table = page_table(session, theme, options);
    for line in table.lines() {
        writeln!(out, "{line}")?;
    }

    let stats = session.stats();
    writeln!(
        out,
        "Page {} of {} | {} of {} rows | {} columns",
        session.page_state().current_page(),
        session.total_pages(),
        stats.active_rows,
        stats.total_rows,
        stats.columns
    )?;
    Ok(())
}
