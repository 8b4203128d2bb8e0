//! Copy/paste coordination: TSV formatting and parsing.
//!
//! The format matches what spreadsheet applications put on the clipboard:
//! tab-separated fields, newline-separated rows, fields quoted when they
//! contain a tab, newline or quote.

use crate::editor::PasteArgs;
use crate::types::{CellRange, Position};

/// Quote a field that contains a tab, line break or quote, doubling inner quotes.
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains(['\t', '\n', '\r', '"']);
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Serialize `range` row-major using `text_of` for each cell.
pub fn to_tsv(range: CellRange, mut text_of: impl FnMut(Position) -> String) -> String {
    let mut out = String::new();
    for row in range.start_row..=range.end_row {
        if row > range.start_row {
            out.push('\n');
        }
        for col in range.start_col..=range.end_col {
            if col > range.start_col {
                out.push('\t');
            }
            out.push_str(&escape_cell_value(&text_of(Position::new(row, col))));
        }
    }
    out
}

/// Parse clipboard text into a row-major value matrix.
///
/// Quoted fields may contain tabs, newlines and doubled quotes. CRLF is
/// treated as a single newline and one trailing newline is ignored.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            '\t' => {
                row.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }
    if !at_field_start || !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Place `values` with its top-left corner at `origin`, clipped to the grid.
///
/// Returns `None` if the origin is outside the grid or nothing was parsed.
pub fn paste_target(
    origin: Position,
    values: Vec<Vec<String>>,
    row_count: usize,
    col_count: usize,
) -> Option<PasteArgs> {
    let origin = if origin.row < row_count && origin.col < col_count {
        origin
    } else {
        return None;
    };
    let height = values.len().min(row_count - origin.row);
    let width = values
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .min(col_count - origin.col);
    if height == 0 || width == 0 {
        return None;
    }

    let values = values
        .into_iter()
        .take(height)
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();
    Some(PasteArgs {
        range: CellRange {
            start_row: origin.row,
            start_col: origin.col,
            end_row: origin.row + height - 1,
            end_col: origin.col + width - 1,
        },
        values,
    })
}
