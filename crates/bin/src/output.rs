//! Output formatting helpers for human-readable and JSON output.

use clap::ValueEnum;
use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Print a value as one line of JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print rows under `headers` with aligned columns. Prints nothing for no rows.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if !rows.is_empty() {
        print!("{}", render_table(headers, rows));
    }
}

/// Lays out a table, padding every column to its widest cell. Cells past
/// the header count are dropped.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = layout_row(headers.iter().copied(), &widths);
    for row in rows {
        out.push_str(&layout_row(row.iter().map(String::as_str), &widths));
    }
    out
}

fn layout_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Shortens `text` to at most `max` characters for table cells.
pub fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let mut short: String = flat.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}
