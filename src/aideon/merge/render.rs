//! Plain-text rendering of grids, listings, and session status.

use std::fmt::Write as _;

use crate::aideon::merge::model::Table;
use crate::aideon::merge::pipeline::SheetListing;
use crate::aideon::merge::session::Session;

/// Column header used for the row index.
const INDEX_HEADER: &str = "#";

/// Renders a table as aligned text with a leading row-index column.
pub fn render_table(table: &Table) -> String {
    let mut header: Vec<String> = vec![INDEX_HEADER.to_string()];
    header.extend(table.columns.iter().cloned());

    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut cells = vec![row_idx.to_string()];
            cells.extend(row.iter().map(ToString::to_string));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &body {
        push_line(&mut out, row, &widths);
    }
    let _ = write!(
        out,
        "({} rows x {} columns)",
        table.row_count(),
        table.column_count()
    );
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Renders the sheets offered for one file, marking default selections.
pub fn render_listing(listing: &SheetListing) -> String {
    let mut out = format!("{}\n", listing.file);
    if listing.sheets.is_empty() {
        out.push_str("  (no sheets)\n");
    }
    for sheet in &listing.sheets {
        let marker = if listing.default_selection.contains(sheet) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(out, "  [{marker}] {sheet}");
    }
    out
}

/// Summarises the stage, files, selections, and columns of a session.
pub fn render_status(session: &Session) -> String {
    let mut out = format!("stage: {}\n", session.stage());
    for (file, sheets) in session.selection().iter() {
        let _ = writeln!(out, "  {file}: {}", quote_list(sheets));
    }
    if let Some(merged) = session.merged() {
        let _ = writeln!(
            out,
            "merged: {} rows, columns {}",
            merged.row_count(),
            quote_list(&merged.columns)
        );
    }
    if session.arranged().is_some() {
        let _ = writeln!(out, "arranged: {}", quote_list(session.column_selection()));
    }
    if let Some(exported) = session.exported() {
        let _ = writeln!(out, "last export: {}", exported.file_name);
    }
    let actions: Vec<String> = session
        .available_actions()
        .iter()
        .map(ToString::to_string)
        .collect();
    let _ = write!(out, "available: {}", actions.join(", "));
    out
}

fn quote_list(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
