//! Shared grid fixtures for integration tests.
//!
//! [`Sheet`] is an in-memory host: it stores edited values and records
//! every callback so tests can assert on what the grid asked for.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::{HashMap, HashSet};

use vgrid::editor::{CellValues, CommitArgs, FillArgs, PasteArgs};
use vgrid::grouping::FlatRows;
use vgrid::layout::ColSpanArgs;
use vgrid::{Column, ColumnDef, FlatRow, Grid, GridConfig, GridDelegate, GridError, RowKey, SortColumn};

/// Height of default rows and header rows.
pub const ROW: f32 = 35.0;

#[derive(Debug, Default)]
pub struct Sheet {
    pub values: HashMap<(RowKey, String), String>,
    /// Columns whose commits must parse as numbers
    pub numeric: HashSet<String>,
    pub commits: Vec<CommitArgs>,
    pub fills: Vec<FillArgs>,
    pub pastes: Vec<PasteArgs>,
    pub sorts: Vec<Vec<SortColumn>>,
    pub veto_sort: bool,
    pub veto_fill: bool,
    /// Rows whose selection checkbox is disabled
    pub locked_rows: HashSet<RowKey>,
    /// Column spans by (row key, column key)
    pub spans: HashMap<(RowKey, String), usize>,
}

impl Sheet {
    pub fn numeric(columns: &[&str]) -> Self {
        Self {
            numeric: columns.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn set(&mut self, row: &str, column: &str, value: &str) {
        self.values
            .insert((RowKey::from(row), column.to_string()), value.to_string());
    }

    pub fn span(&mut self, row: &str, column: &str, span: usize) {
        self.spans.insert((RowKey::from(row), column.to_string()), span);
    }

    pub fn get(&self, row: &str, column: &str) -> Option<&str> {
        self.values
            .get(&(RowKey::from(row), column.to_string()))
            .map(String::as_str)
    }
}

impl CellValues for Sheet {
    /// Stored value, or `<column><row>` (`a0`, `b3`, ...).
    fn cell_text(&self, row: &FlatRow, column: &Column) -> String {
        self.values
            .get(&(row.key.clone(), column.key.clone()))
            .cloned()
            .unwrap_or_else(|| format!("{}{}", column.key, row.key))
    }

    fn is_row_selectable(&self, key: &RowKey) -> bool {
        !self.locked_rows.contains(key)
    }

    fn col_span(&self, args: &ColSpanArgs<'_>) -> usize {
        self.spans
            .get(&(args.row.key.clone(), args.column.key.clone()))
            .copied()
            .unwrap_or(1)
    }
}

impl GridDelegate for Sheet {
    fn commit(&mut self, args: &CommitArgs) -> vgrid::Result<()> {
        if self.numeric.contains(&args.column_key) && args.new_value.parse::<f64>().is_err() {
            return Err(GridError::CommitRejected(format!(
                "'{}' is not a number",
                args.new_value
            )));
        }
        self.values.insert(
            (args.row_key.clone(), args.column_key.clone()),
            args.new_value.clone(),
        );
        self.commits.push(args.clone());
        Ok(())
    }

    fn fill(&mut self, args: &FillArgs) -> vgrid::Result<()> {
        if self.veto_fill {
            return Err(GridError::CommitRejected("range is locked".to_string()));
        }
        self.fills.push(args.clone());
        Ok(())
    }

    fn paste(&mut self, args: &PasteArgs) -> vgrid::Result<()> {
        self.pastes.push(args.clone());
        Ok(())
    }

    fn sort_changed(&mut self, sort: &[SortColumn]) -> vgrid::Result<()> {
        if self.veto_sort {
            return Err(GridError::CommitRejected("sorting disabled".to_string()));
        }
        self.sorts.push(sort.to_vec());
        Ok(())
    }
}

/// Fixed-width columns named by `keys`.
pub fn columns(keys: &[&str], width: f32) -> Vec<ColumnDef> {
    keys.iter()
        .map(|k| Column::new(*k).fixed(width).into())
        .collect()
}

/// Ungrouped rows keyed `0..count`.
pub fn rows(count: usize) -> FlatRows {
    let keys: Vec<usize> = (0..count).collect();
    FlatRows::from_rows(&keys, |&k| RowKey::from(k))
}

/// Grid with `row_count` rows and 100px columns, sized to show ten body
/// rows below one header row.
pub fn grid(row_count: usize, keys: &[&str], sheet: Sheet) -> Grid<Sheet> {
    grid_with(GridConfig::default(), &columns(keys, 100.0), rows(row_count), sheet)
}

pub fn grid_with(config: GridConfig, defs: &[ColumnDef], rows: FlatRows, sheet: Sheet) -> Grid<Sheet> {
    let width = 100.0 * defs.len() as f32;
    let mut grid = Grid::new(config, defs, rows, sheet).expect("valid grid");
    grid.resize(width, ROW * 11.0);
    grid
}
