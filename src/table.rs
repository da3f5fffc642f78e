//! Elastic text tables for previewing reshaped output on a terminal.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::frame::OutputTable;

/// Cells wider than this are cut and marked with `…`.
pub const MAX_CELL_WIDTH: usize = 24;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let headers = headers.iter().map(|h| clip(h)).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| row.iter().take(column_count).map(|c| clip(c)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths.iter().map(|w| Cow::Owned("-".repeat(*w))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Renders the first `limit` rows of `table`, numbers with `decimal`.
pub fn render_output(table: &OutputTable, limit: usize, decimal: char) -> String {
    render_table(table.columns(), &table.display_rows(Some(limit), decimal))
}

pub fn print_output(table: &OutputTable, limit: usize, decimal: char) {
    print!("{}", render_output(table, limit, decimal));
}

fn format_row(values: &[Cow<'_, str>], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let padding = width.saturating_sub(value.chars().count());
            format!("{value}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

/// Flattens control whitespace and cuts overly long cells.
fn clip(value: &str) -> Cow<'_, str> {
    let needs_sanitizing = value.contains(['\n', '\r', '\t']);
    if !needs_sanitizing && value.chars().count() <= MAX_CELL_WIDTH {
        return Cow::Borrowed(value);
    }
    let mut clipped = value
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
        .take(MAX_CELL_WIDTH + 1)
        .collect::<String>();
    if clipped.chars().count() > MAX_CELL_WIDTH {
        clipped = clipped.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
    }
    Cow::Owned(clipped)
}
