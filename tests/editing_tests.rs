//! Edit sessions, commit verdicts and drag-fill.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{columns, grid, grid_with, rows, Sheet};
use vgrid::config::EnterCommitMove;
use vgrid::editor::{Effect, Input, Key};
use vgrid::{CellRange, Column, ColumnDef, Grid, GridConfig, Mode, Position};

fn draft(grid: &mut Grid<Sheet>, value: &str) {
    grid.dispatch(&Input::DraftChanged {
        value: value.to_string(),
    });
}

fn commits(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::Commit(_)))
        .count()
}

// ============================================================================
// Starting and ending edits
// ============================================================================

#[test]
fn test_enter_starts_edit_from_current_value() {
    let mut grid = grid(5, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(2, 1));
    let effects = grid.dispatch(&Input::key(Key::Enter));
    assert_eq!(
        effects,
        vec![Effect::EditStarted {
            position: Position::new(2, 1)
        }]
    );
    let session = grid.state().editing().unwrap();
    assert_eq!(session.original, "b2");
    assert_eq!(session.draft, "b2");
    assert!(grid.state().is_editing(Position::new(2, 1)));
}

#[test]
fn test_typing_starts_edit_with_the_character() {
    let mut grid = grid(5, &["a"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::Char('7')));
    let session = grid.state().editing().unwrap();
    assert_eq!(session.draft, "7");
    assert_eq!(session.original, "a0");
}

#[test]
fn test_successful_commit_stores_value() {
    let mut grid = grid(5, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    grid.dispatch(&Input::key(Key::F2));
    draft(&mut grid, "hello");
    let effects = grid.dispatch(&Input::key(Key::Enter));

    assert_eq!(commits(&effects), 1);
    assert!(effects.contains(&Effect::EditEnded {
        position: Position::new(1, 0),
        committed: true
    }));
    assert_eq!(grid.state().mode, Mode::Idle);
    assert_eq!(grid.state().focus, Some(Position::new(1, 0)));

    let sheet = grid.delegate();
    assert_eq!(sheet.get("1", "a"), Some("hello"));
    let commit = &sheet.commits[0];
    assert_eq!(commit.old_value, "a1");
    assert_eq!(commit.new_value, "hello");
    assert_eq!(commit.source_index, Some(1));
}

#[test]
fn test_rejected_commit_keeps_draft() {
    let mut grid = grid(5, &["qty"], Sheet::numeric(&["qty"]));
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::Enter));
    draft(&mut grid, "abc");
    let effects = grid.dispatch(&Input::key(Key::Enter));

    assert_eq!(commits(&effects), 1);
    assert!(!effects.iter().any(|e| matches!(e, Effect::EditEnded { .. })));
    let session = grid.state().editing().unwrap();
    assert_eq!(session.draft, "abc");
    assert!(session.has_error());
    assert!(grid.delegate().commits.is_empty());

    // Fixing the draft clears the error and commits
    draft(&mut grid, "12");
    assert!(!grid.state().editing().unwrap().has_error());
    grid.dispatch(&Input::key(Key::Enter));
    assert_eq!(grid.state().mode, Mode::Idle);
    assert_eq!(grid.delegate().get("0", "qty"), Some("12"));
}

#[test]
fn test_rejected_commit_then_escape_discards() {
    let mut grid = grid(5, &["qty"], Sheet::numeric(&["qty"]));
    grid.dispatch(&Input::click(3, 0));
    grid.dispatch(&Input::key(Key::Char('x')));
    grid.dispatch(&Input::Blur);
    assert!(grid.state().editing().unwrap().has_error());

    let effects = grid.dispatch(&Input::key(Key::Escape));
    assert_eq!(
        effects,
        vec![Effect::EditEnded {
            position: Position::new(3, 0),
            committed: false
        }]
    );
    assert_eq!(grid.state().mode, Mode::Idle);
    assert_eq!(grid.delegate().get("3", "qty"), None);
}

#[test]
fn test_escape_cancels_without_commit() {
    let mut grid = grid(5, &["a"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::Enter));
    draft(&mut grid, "changed");
    let effects = grid.dispatch(&Input::key(Key::Escape));
    assert_eq!(commits(&effects), 0);
    assert!(grid.delegate().commits.is_empty());
    assert_eq!(grid.state().mode, Mode::Idle);
}

#[test]
fn test_unchanged_draft_skips_commit() {
    let mut grid = grid(5, &["a"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::Enter));
    let effects = grid.dispatch(&Input::key(Key::Enter));
    assert_eq!(
        effects,
        vec![Effect::EditEnded {
            position: Position::new(0, 0),
            committed: false
        }]
    );
    assert!(grid.delegate().commits.is_empty());
}

// ============================================================================
// Focus after commit
// ============================================================================

#[test]
fn test_tab_commits_and_moves_to_next_cell() {
    let mut grid = grid(5, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::Enter));
    draft(&mut grid, "x");
    grid.dispatch(&Input::key(Key::Tab));
    assert_eq!(grid.state().focus, Some(Position::new(0, 1)));
    assert_eq!(grid.delegate().get("0", "a"), Some("x"));
}

#[test]
fn test_enter_commit_moves_down_when_configured() {
    let config = GridConfig {
        enter_commit: EnterCommitMove::Down,
        ..GridConfig::default()
    };
    let mut grid = grid_with(config, &columns(&["a"], 100.0), rows(5), Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    grid.dispatch(&Input::key(Key::Enter));
    draft(&mut grid, "x");
    grid.dispatch(&Input::key(Key::Enter));
    assert_eq!(grid.state().focus, Some(Position::new(2, 0)));
}

#[test]
fn test_click_elsewhere_commits_then_focuses() {
    let mut grid = grid(5, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::Enter));
    draft(&mut grid, "x");
    grid.dispatch(&Input::click(3, 1));
    assert_eq!(grid.state().focus, Some(Position::new(3, 1)));
    assert_eq!(grid.state().mode, Mode::Idle);
    assert_eq!(grid.delegate().get("0", "a"), Some("x"));
}

// ============================================================================
// Editability
// ============================================================================

#[test]
fn test_read_only_column_does_not_edit() {
    let defs: Vec<ColumnDef> = vec![Column::new("id").fixed(100.0).editable(false).into()];
    let mut grid = grid_with(GridConfig::default(), &defs, rows(5), Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::Char('q')));
    assert!(grid.state().editing().is_none());

    // Enter moves down instead
    grid.dispatch(&Input::key(Key::Enter));
    assert_eq!(grid.state().focus, Some(Position::new(1, 0)));

    grid.dispatch(&Input::key(Key::Delete));
    assert!(grid.delegate().commits.is_empty());
}

#[test]
fn test_delete_commits_empty_value() {
    let mut grid = grid(5, &["a"], Sheet::default());
    grid.dispatch(&Input::click(2, 0));
    let effects = grid.dispatch(&Input::key(Key::Delete));
    assert_eq!(commits(&effects), 1);
    assert_eq!(grid.delegate().get("2", "a"), Some(""));
    assert_eq!(grid.delegate().commits[0].old_value, "a2");
    assert_eq!(grid.state().mode, Mode::Idle);
}

#[test]
fn test_removing_edited_row_cancels_edit() {
    let mut grid = grid(5, &["a"], Sheet::default());
    grid.dispatch(&Input::click(4, 0));
    grid.dispatch(&Input::key(Key::Enter));
    let effects = grid.set_rows(rows(3));
    assert_eq!(
        effects,
        vec![Effect::EditEnded {
            position: Position::new(4, 0),
            committed: false
        }]
    );
    assert_eq!(grid.state().mode, Mode::Idle);
    assert_eq!(grid.state().focus, None);
}

// ============================================================================
// Drag-fill
// ============================================================================

#[test]
fn test_drag_fill_emits_fill_range() {
    let mut grid = grid(10, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    grid.dispatch(&Input::FillHandleDown);
    grid.dispatch(&Input::PointerMove {
        cell: Position::new(4, 1),
    });
    let fill = grid.state().drag_fill().unwrap();
    assert_eq!(fill.range, CellRange::between(Position::new(1, 0), Position::new(4, 0)));

    let effects = grid.dispatch(&Input::PointerUp);
    assert_eq!(effects.len(), 1);
    assert_eq!(grid.state().mode, Mode::Idle);
    assert_eq!(
        grid.state().selected_range(),
        Some(CellRange::between(Position::new(1, 0), Position::new(4, 0)))
    );

    let fills = &grid.delegate().fills;
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].source_value, "a1");
    assert_eq!(fills[0].range.row_count(), 4);
}

#[test]
fn test_rejected_fill_keeps_selection_on_source() {
    let sheet = Sheet {
        veto_fill: true,
        ..Sheet::default()
    };
    let mut grid = grid(10, &["a", "b"], sheet);
    grid.dispatch(&Input::click(2, 1));
    grid.dispatch(&Input::FillHandleDown);
    grid.dispatch(&Input::PointerMove {
        cell: Position::new(6, 1),
    });
    let effects = grid.dispatch(&Input::PointerUp);
    assert!(matches!(effects.as_slice(), [Effect::Fill(_)]));
    assert!(grid.delegate().fills.is_empty());

    let state = grid.state();
    assert_eq!(state.mode, Mode::Idle);
    assert_eq!(state.focus, Some(Position::new(2, 1)));
    assert_eq!(state.selected_range(), Some(CellRange::single(Position::new(2, 1))));
}

#[test]
fn test_drag_fill_released_on_source_does_nothing() {
    let mut grid = grid(10, &["a"], Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    grid.dispatch(&Input::FillHandleDown);
    let effects = grid.dispatch(&Input::PointerUp);
    assert!(effects.is_empty());
    assert!(grid.delegate().fills.is_empty());
    assert_eq!(grid.state().mode, Mode::Idle);
}

#[test]
fn test_escape_aborts_drag_fill() {
    let mut grid = grid(10, &["a"], Sheet::default());
    grid.dispatch(&Input::click(1, 0));
    grid.dispatch(&Input::FillHandleDown);
    grid.dispatch(&Input::PointerMove {
        cell: Position::new(6, 0),
    });
    grid.dispatch(&Input::key(Key::Escape));
    grid.dispatch(&Input::PointerUp);
    assert!(grid.delegate().fills.is_empty());
}
