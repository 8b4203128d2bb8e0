//! Header-click sort cycling.

use serde::{Deserialize, Serialize};

use crate::types::{Column, SortColumn, SortDirection};

/// Ordered sort columns; the first entry has the highest priority.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortState {
    columns: Vec<SortColumn>,
}

impl SortState {
    pub fn new(columns: Vec<SortColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[SortColumn] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn direction(&self, column_key: &str) -> Option<SortDirection> {
        self.columns
            .iter()
            .find(|s| s.column_key == column_key)
            .map(|s| s.direction)
    }

    /// 1-based priority, only meaningful with more than one sort column.
    pub fn priority(&self, column_key: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|s| s.column_key == column_key)
            .map(|i| i + 1)
    }

    /// State after clicking `column`'s header.
    ///
    /// The column cycles first direction, opposite direction, unsorted. A
    /// plain click replaces the whole sort; `multi` (Ctrl/Meta) keeps the
    /// other columns and their priorities. Returns `None` when the column is
    /// not sortable.
    pub fn toggled(&self, column: &Column, multi: bool) -> Option<Self> {
        if !column.sortable {
            return None;
        }
        let (first, second) = if column.sort_descending_first {
            (SortDirection::Descending, SortDirection::Ascending)
        } else {
            (SortDirection::Ascending, SortDirection::Descending)
        };
        let next_direction = match self.direction(&column.key) {
            None => Some(first),
            Some(d) if d == first => Some(second),
            Some(_) => None,
        };

        let mut columns = if multi {
            self.columns.clone()
        } else {
            self.columns
                .iter()
                .filter(|s| s.column_key == column.key)
                .cloned()
                .collect()
        };
        match (columns.iter().position(|s| s.column_key == column.key), next_direction) {
            (Some(i), Some(direction)) => {
                if let Some(entry) = columns.get_mut(i) {
                    entry.direction = direction;
                }
            }
            (Some(i), None) => {
                columns.remove(i);
            }
            (None, Some(direction)) => columns.push(SortColumn::new(column.key.clone(), direction)),
            (None, None) => {}
        }
        Some(Self { columns })
    }
}
