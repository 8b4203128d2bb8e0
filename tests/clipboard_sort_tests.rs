//! Clipboard effects and header-click sorting through the grid.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{grid, grid_with, rows, Sheet};
use vgrid::editor::{Effect, Input, Key, Modifiers};
use vgrid::{CellRange, Column, ColumnDef, Grid, GridConfig, Position, SortColumn, SortDirection};

fn ctrl(key: char) -> Input {
    Input::key_with(Key::Char(key), Modifiers::CTRL)
}

fn shift_click(row: usize, col: usize) -> Input {
    Input::PointerDown {
        cell: Position::new(row, col),
        modifiers: Modifiers::SHIFT,
    }
}

fn paste(text: &str) -> Input {
    Input::Paste {
        text: text.to_string(),
    }
}

// ============================================================================
// Copy
// ============================================================================

#[test]
fn test_copy_selection_as_tsv() {
    let mut grid = grid(5, &["a", "b", "c"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&shift_click(1, 1));
    let effects = grid.dispatch(&ctrl('c'));
    assert_eq!(
        effects,
        vec![Effect::Copy {
            range: CellRange::between(Position::new(0, 0), Position::new(1, 1)),
            text: "a0\tb0\na1\tb1".to_string(),
        }]
    );
}

#[test]
fn test_copy_single_cell_and_quoting() {
    let mut sheet = Sheet::default();
    sheet.set("2", "b", "two\tparts");
    sheet.set("2", "c", "say \"hi\"");
    let mut grid = grid(5, &["a", "b", "c"], sheet);

    grid.dispatch(&Input::click(2, 1));
    let effects = grid.dispatch(&ctrl('c'));
    let Effect::Copy { text, .. } = &effects[0] else {
        panic!("expected a copy effect, got {effects:?}");
    };
    assert_eq!(text, "\"two\tparts\"");

    grid.dispatch(&shift_click(2, 2));
    let effects = grid.dispatch(&ctrl('c'));
    let Effect::Copy { text, .. } = &effects[0] else {
        panic!("expected a copy effect, got {effects:?}");
    };
    assert_eq!(text, "\"two\tparts\"\t\"say \"\"hi\"\"\"");
}

#[test]
fn test_copy_does_not_start_an_edit() {
    let mut grid = grid(5, &["a"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&ctrl('c'));
    assert!(grid.state().editing().is_none());
}

// ============================================================================
// Paste
// ============================================================================

#[test]
fn test_paste_clipped_to_grid() {
    let mut grid = grid(5, &["a", "b", "c"], Sheet::default());
    grid.dispatch(&Input::click(3, 1));
    let effects = grid.dispatch(&paste("1\t2\t3\n4\t5\t6\n7\t8\t9\n"));
    assert_eq!(effects.len(), 1);

    let pasted = &grid.delegate().pastes[0];
    assert_eq!(pasted.range, CellRange::between(Position::new(3, 1), Position::new(4, 2)));
    assert_eq!(pasted.values, vec![vec!["1", "2"], vec!["4", "5"]]);
}

#[test]
fn test_paste_starts_at_selection_corner() {
    let mut grid = grid(5, &["a", "b", "c"], Sheet::default());
    grid.dispatch(&Input::click(2, 2));
    grid.dispatch(&shift_click(1, 1));
    grid.dispatch(&paste("x"));
    let pasted = &grid.delegate().pastes[0];
    assert_eq!(pasted.range, CellRange::single(Position::new(1, 1)));
}

#[test]
fn test_paste_quoted_multiline_value() {
    let mut grid = grid(5, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&paste("\"line 1\nline 2\"\tplain\r\n"));
    let pasted = &grid.delegate().pastes[0];
    assert_eq!(pasted.values, vec![vec!["line 1\nline 2", "plain"]]);
}

#[test]
fn test_paste_without_focus_is_ignored() {
    let mut grid = grid(5, &["a"], Sheet::default());
    let effects = grid.dispatch(&paste("1"));
    assert!(effects.is_empty());
    assert!(grid.delegate().pastes.is_empty());
}

// ============================================================================
// Sorting
// ============================================================================

fn sortable_grid(sheet: Sheet) -> Grid<Sheet> {
    let defs: Vec<ColumnDef> = vec![
        Column::new("name").fixed(100.0).sortable(true).into(),
        Column::new("age").fixed(100.0).sortable(true).into(),
        Column::new("notes").fixed(100.0).into(),
    ];
    grid_with(GridConfig::default(), &defs, rows(5), sheet)
}

#[test]
fn test_header_click_cycles_direction() {
    let mut grid = sortable_grid(Sheet::default());
    assert!(grid.header_click("name", false));
    assert_eq!(grid.snapshot().sort.direction("name"), Some(SortDirection::Ascending));
    assert!(grid.header_click("name", false));
    assert_eq!(grid.snapshot().sort.direction("name"), Some(SortDirection::Descending));
    assert!(grid.header_click("name", false));
    assert!(grid.snapshot().sort.is_empty());

    let sorts = &grid.delegate().sorts;
    assert_eq!(sorts.len(), 3);
    assert_eq!(sorts[0], vec![SortColumn::new("name", SortDirection::Ascending)]);
    assert!(sorts[2].is_empty());
}

#[test]
fn test_multi_sort_and_plain_click_replaces() {
    let mut grid = sortable_grid(Sheet::default());
    grid.header_click("name", false);
    grid.header_click("age", true);
    let sort = grid.snapshot().sort.clone();
    assert_eq!(sort.priority("name"), Some(1));
    assert_eq!(sort.priority("age"), Some(2));

    grid.header_click("age", false);
    assert_eq!(
        grid.snapshot().sort.columns(),
        &[SortColumn::new("age", SortDirection::Descending)]
    );
}

#[test]
fn test_sort_veto_leaves_state_unchanged() {
    let sheet = Sheet {
        veto_sort: true,
        ..Sheet::default()
    };
    let mut grid = sortable_grid(sheet);
    assert!(!grid.header_click("name", false));
    assert!(grid.snapshot().sort.is_empty());
    assert!(grid.previous().is_some_and(|p| p.sort.is_empty()));
}

#[test]
fn test_unsortable_and_unknown_columns() {
    let mut grid = sortable_grid(Sheet::default());
    assert!(!grid.header_click("notes", false));
    assert!(!grid.header_click("missing", false));
    assert!(grid.delegate().sorts.is_empty());
}

#[test]
fn test_sort_is_saved() {
    let mut grid = sortable_grid(Sheet::default());
    grid.header_click("age", false);
    let saved = grid.save_state();
    assert_eq!(saved.sort, vec![SortColumn::new("age", SortDirection::Ascending)]);
}
