//! Row selection tests
//!
//! Checkbox-style selection by row key: single toggles, Shift ranges,
//! select-all, disabled rows and persistence.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{grid, Sheet};
use vgrid::editor::{Effect, Input, Key};
use vgrid::grouping::FlatRows;
use vgrid::{Grid, GridStateSnapshot, Mode, Position, RowKey};

fn select(grid: &mut Grid<Sheet>, row: usize, selected: bool, shift: bool) -> Vec<Effect> {
    grid.dispatch(&Input::SelectRow { row, selected, shift })
}

fn selected(grid: &Grid<Sheet>) -> Vec<&str> {
    grid.selected_rows().iter().map(RowKey::as_str).collect()
}

// ============================================================================
// Toggling
// ============================================================================

#[test]
fn test_select_row_toggles_its_key() {
    let mut grid = grid(10, &["a", "b"], Sheet::default());
    let effects = select(&mut grid, 2, true, false);
    assert_eq!(
        effects,
        vec![Effect::RowSelectionChanged {
            keys: vec![RowKey::from("2")]
        }]
    );
    // Cell focus is untouched
    assert_eq!(grid.state().focus, None);

    // Selecting again changes nothing
    assert!(select(&mut grid, 2, true, false).is_empty());

    let effects = select(&mut grid, 2, false, false);
    assert_eq!(effects, vec![Effect::RowSelectionChanged { keys: Vec::new() }]);
    assert!(grid.selected_rows().is_empty());
}

#[test]
fn test_shift_extends_from_last_toggled_row() {
    let mut grid = grid(10, &["a", "b"], Sheet::default());
    select(&mut grid, 2, true, false);
    select(&mut grid, 5, true, true);
    assert_eq!(selected(&grid), vec!["2", "3", "4", "5"]);

    // Shift-deselect runs from row 5 back to row 3
    select(&mut grid, 3, false, true);
    assert_eq!(selected(&grid), vec!["2"]);
}

#[test]
fn test_shift_without_previous_toggle_selects_one_row() {
    let mut grid = grid(10, &["a"], Sheet::default());
    select(&mut grid, 4, true, true);
    assert_eq!(selected(&grid), vec!["4"]);
}

#[test]
fn test_out_of_range_row_is_ignored() {
    let mut grid = grid(3, &["a"], Sheet::default());
    assert!(select(&mut grid, 7, true, false).is_empty());
    assert!(grid.selected_rows().is_empty());
}

// ============================================================================
// Select all
// ============================================================================

#[test]
fn test_select_all_and_clear() {
    let mut grid = grid(5, &["a"], Sheet::default());
    assert!(!grid.all_rows_selected());

    grid.dispatch(&Input::SelectAllRows { selected: true });
    assert_eq!(selected(&grid), vec!["0", "1", "2", "3", "4"]);
    assert!(grid.all_rows_selected());

    select(&mut grid, 1, false, false);
    assert!(!grid.all_rows_selected());

    let effects = grid.dispatch(&Input::SelectAllRows { selected: false });
    assert_eq!(effects, vec![Effect::RowSelectionChanged { keys: Vec::new() }]);
    assert!(grid.selected_rows().is_empty());
    assert!(grid.dispatch(&Input::SelectAllRows { selected: false }).is_empty());
}

#[test]
fn test_disabled_rows_are_never_selected() {
    let mut sheet = Sheet::default();
    sheet.locked_rows.insert(RowKey::from("1"));
    let mut grid = grid(4, &["a"], sheet);

    assert!(select(&mut grid, 1, true, false).is_empty());

    select(&mut grid, 0, true, false);
    select(&mut grid, 3, true, true);
    assert_eq!(selected(&grid), vec!["0", "2", "3"]);
    // Every selectable row is selected
    assert!(grid.all_rows_selected());
}

#[test]
fn test_empty_grid_is_never_all_selected() {
    let mut grid = grid(0, &["a"], Sheet::default());
    assert!(grid.dispatch(&Input::SelectAllRows { selected: true }).is_empty());
    assert!(!grid.all_rows_selected());
}

// ============================================================================
// Interaction with the rest of the grid
// ============================================================================

#[test]
fn test_row_selection_keeps_edit_open() {
    let mut grid = grid(10, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    grid.dispatch(&Input::key(Key::Enter));
    select(&mut grid, 4, true, false);
    assert!(matches!(grid.state().mode, Mode::Editing(_)));
    assert_eq!(selected(&grid), vec!["4"]);
}

#[test]
fn test_row_selection_follows_keys_across_reorder() {
    let mut grid = grid(10, &["a"], Sheet::default());
    select(&mut grid, 2, true, false);
    assert!(grid.snapshot().cell_state(Position::new(2, 0)).row_selected);

    let reversed: Vec<usize> = (0..10).rev().collect();
    grid.set_rows(FlatRows::from_rows(&reversed, |&k| RowKey::from(k)));
    let snapshot = grid.snapshot();
    assert!(snapshot.cell_state(Position::new(7, 0)).row_selected);
    assert!(!snapshot.cell_state(Position::new(2, 0)).row_selected);

    // Shift ranges start from the anchor's new position
    select(&mut grid, 5, true, true);
    assert_eq!(selected(&grid), vec!["2", "3", "4"]);
}

#[test]
fn test_row_selection_is_saved_and_restored() {
    let mut grid = grid(10, &["a"], Sheet::default());
    select(&mut grid, 3, true, false);
    select(&mut grid, 8, true, false);
    let json = grid.save_state().to_json().unwrap();
    assert!(json.contains("\"selectedRows\":[\"3\",\"8\"]"));

    let mut fresh = common::grid(10, &["a"], Sheet::default());
    fresh.restore_state(&GridStateSnapshot::from_json(&json).unwrap());
    assert_eq!(selected(&fresh), vec!["3", "8"]);

    // Older saved states without the field still load
    let old = GridStateSnapshot::from_json(r#"{"scrollTop": 0}"#).unwrap();
    assert!(old.selected_rows.is_empty());
}
