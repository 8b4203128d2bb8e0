//! Immutable snapshots and persisted grid state.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::sync::Arc;

use common::{columns, grid, grid_with, Sheet};
use vgrid::editor::{Input, Key, Modifiers};
use vgrid::grouping::FlatRows;
use vgrid::{GridConfig, GridError, GridStateSnapshot, Mode, Position, RowKey};

fn reversed_rows(count: usize) -> FlatRows {
    let keys: Vec<usize> = (0..count).rev().collect();
    FlatRows::from_rows(&keys, |&k| RowKey::from(k))
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_published_snapshots_never_change() {
    let mut grid = grid(10, &["a", "b"], Sheet::default());
    let before = grid.snapshot();
    grid.dispatch(&Input::click(3, 1));
    grid.scroll(70.0, 0.0);

    assert_eq!(before.state.focus, None);
    assert_eq!(before.viewport.scroll_top, 0.0);
    assert_eq!(grid.snapshot().state.focus, Some(Position::new(3, 1)));
}

#[test]
fn test_previous_snapshot_is_the_replaced_one() {
    let mut grid = grid(10, &["a"], Sheet::default());
    let before = grid.snapshot();
    grid.dispatch(&Input::click(1, 0));
    let previous = grid.previous().unwrap();
    assert!(Arc::ptr_eq(&before, &previous));
}

#[test]
fn test_unchanged_parts_are_shared() {
    let mut grid = grid(10, &["a"], Sheet::default());
    let before = grid.snapshot();
    grid.scroll(35.0, 0.0);
    let after = grid.snapshot();
    assert!(Arc::ptr_eq(&before.rows, &after.rows));
    assert!(Arc::ptr_eq(&before.columns, &after.columns));
    assert!(Arc::ptr_eq(&before.geometry, &after.geometry));
}

// ============================================================================
// Save and restore
// ============================================================================

#[test]
fn test_focus_and_selection_follow_row_keys() {
    let mut grid = grid(10, &["a", "b", "c"], Sheet::default());
    grid.dispatch(&Input::click(2, 1));
    grid.dispatch(&Input::PointerDown {
        cell: Position::new(3, 2),
        modifiers: Modifiers::SHIFT,
    });
    let saved = grid.save_state();

    let mut reordered = grid_with(
        GridConfig::default(),
        &columns(&["a", "b", "c"], 100.0),
        reversed_rows(10),
        Sheet::default(),
    );
    reordered.restore_state(&saved);
    let state = reordered.state();
    assert_eq!(state.focus, Some(Position::new(6, 2)));
    let selection = state.selection.unwrap();
    assert_eq!(selection.anchor, Position::new(7, 1));
    assert_eq!(selection.head, Position::new(6, 2));
}

#[test]
fn test_widths_order_and_scroll_round_trip_through_json() {
    let mut grid = grid(100, &["a", "b", "c"], Sheet::default());
    assert!(grid.resize_column("a", 150.0));
    assert!(grid.reorder_columns("c", "a"));
    grid.scroll(700.0, 0.0);
    let json = grid.save_state().to_json().unwrap();

    let saved = GridStateSnapshot::from_json(&json).unwrap();
    let mut fresh = grid_with(
        GridConfig::default(),
        &columns(&["a", "b", "c"], 100.0),
        common::rows(100),
        Sheet::default(),
    );
    fresh.restore_state(&saved);

    let snap = fresh.snapshot();
    assert_eq!(snap.columns.order(), vec!["c", "a", "b"]);
    assert_eq!(snap.column_layout.widths(), &[100.0, 150.0, 100.0]);
    assert_eq!(snap.viewport.scroll_top, 700.0);
    assert_eq!(fresh.save_state(), saved);
}

#[test]
fn test_missing_row_drops_focus() {
    let mut grid = grid(10, &["a"], Sheet::default());
    grid.dispatch(&Input::click(8, 0));
    let saved = grid.save_state();

    let mut smaller = grid_with(
        GridConfig::default(),
        &columns(&["a"], 100.0),
        common::rows(5),
        Sheet::default(),
    );
    smaller.restore_state(&saved);
    assert_eq!(smaller.state().focus, None);
    assert_eq!(smaller.state().selection, None);
}

#[test]
fn test_restore_lands_idle() {
    let mut grid = grid(10, &["a"], Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    grid.dispatch(&Input::key(Key::Enter));
    let saved = grid.save_state();
    grid.restore_state(&saved);
    assert_eq!(grid.state().mode, Mode::Idle);
    assert_eq!(grid.state().focus, Some(Position::new(1, 0)));
}

#[test]
fn test_unknown_width_keys_are_ignored() {
    let mut saved = GridStateSnapshot::default();
    saved.column_widths.insert("gone".to_string(), 400.0);
    saved.column_widths.insert("b".to_string(), 60.0);

    let mut grid = grid(3, &["a", "b"], Sheet::default());
    grid.restore_state(&saved);
    assert_eq!(grid.snapshot().column_layout.widths(), &[100.0, 60.0]);
    assert!(!grid.save_state().column_widths.contains_key("gone"));
}

#[test]
fn test_state_json_format() {
    let empty = GridStateSnapshot::from_json("{}").unwrap();
    assert_eq!(empty, GridStateSnapshot::default());

    let mut grid = grid(3, &["a"], Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    let json = grid.save_state().to_json().unwrap();
    assert!(json.contains("\"focus\":{\"rowKey\":\"1\",\"columnKey\":\"a\"}"));
    assert!(json.contains("\"scrollTop\":0.0"));

    assert!(matches!(GridStateSnapshot::from_json("[1, 2"), Err(GridError::Json(_))));
}
