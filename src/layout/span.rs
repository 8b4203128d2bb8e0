//! Body cells spanning several columns.

use serde::{Deserialize, Serialize};

use super::ColumnSet;
use crate::types::{Column, FlatRow, RowKind};

/// Kind of row a span is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColSpanKind {
    Row,
    Summary,
}

impl ColSpanKind {
    pub fn of(row: &FlatRow) -> Self {
        match row.kind {
            RowKind::Data | RowKind::GroupHeader => Self::Row,
            RowKind::GroupSummary | RowKind::TopSummary | RowKind::BottomSummary => Self::Summary,
        }
    }
}

/// Arguments of a column-span query.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColSpanArgs<'a> {
    pub kind: ColSpanKind,
    pub row: &'a FlatRow,
    pub column: &'a Column,
    /// Display index of `column`
    pub col: usize,
}

/// Cell boundaries of one row after spans are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpans {
    /// First column of the cell covering each column
    starts: Vec<usize>,
}

impl RowSpans {
    /// Every cell one column wide.
    pub fn single(count: usize) -> Self {
        Self {
            starts: (0..count).collect(),
        }
    }

    /// Resolve spans left to right.
    ///
    /// A span of 0 counts as 1. Spans stop at the end of their frozen band
    /// and at the last column, and a covered column never starts its own cell.
    pub fn resolve(row: &FlatRow, columns: &ColumnSet, span_of: impl Fn(&ColSpanArgs<'_>) -> usize) -> Self {
        let count = columns.len();
        let kind = ColSpanKind::of(row);
        let band = columns.unfrozen_range();
        let mut starts = Vec::with_capacity(count);
        let mut col = 0;
        while col < count {
            let Some(column) = columns.column(col) else {
                break;
            };
            let span = span_of(&ColSpanArgs { kind, row, column, col }).max(1);
            let band_end = if col < band.start {
                band.start
            } else if col < band.end {
                band.end
            } else {
                count
            };
            let end = col.saturating_add(span).min(band_end);
            starts.resize(end, col);
            col = end;
        }
        Self { starts }
    }

    /// First column of the cell covering `col`.
    pub fn start(&self, col: usize) -> usize {
        self.starts.get(col).copied().unwrap_or(col)
    }

    /// Exclusive end column of the cell covering `col`.
    pub fn end(&self, col: usize) -> usize {
        let start = self.start(col);
        let mut end = col.max(start) + 1;
        while self.starts.get(end) == Some(&start) {
            end += 1;
        }
        end
    }

    /// Number of columns the cell starting at `col` covers.
    pub fn span(&self, col: usize) -> usize {
        self.end(col) - self.start(col)
    }

    /// Whether no cell spans more than one column.
    pub fn is_trivial(&self) -> bool {
        self.starts.iter().enumerate().all(|(i, &s)| i == s)
    }
}
