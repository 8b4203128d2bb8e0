//! Viewport and scroll tests
//!
//! Visible range calculation through the grid controller: scrolling,
//! clamping, measured heights, frozen columns and scroll requests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{columns, grid, grid_with, rows, Sheet, ROW};
use test_case::test_case;
use vgrid::config::RowHeightMode;
use vgrid::editor::{Input, Key, Modifiers};
use vgrid::grouping::FlatRows;
use vgrid::layout::{compute_visible, ColumnLayout, ColumnSet, ColumnSizing, Overscan, RowGeometry, Viewport};
use vgrid::{Column, ColumnDef, FrozenSide, Grid, GridConfig, Position, RowKey};

fn estimated_grid(count: usize, estimate: f32) -> Grid<Sheet> {
    let config = GridConfig {
        row_height: RowHeightMode::Estimated { estimate },
        ..GridConfig::default()
    };
    grid_with(config, &columns(&["a", "b"], 100.0), rows(count), Sheet::default())
}

fn frozen_defs() -> Vec<ColumnDef> {
    let mut defs: Vec<ColumnDef> = vec![Column::new("id").fixed(100.0).frozen(FrozenSide::Start).into()];
    defs.extend((1..=8).map(|i| ColumnDef::from(Column::new(format!("c{i}")).fixed(100.0))));
    defs.push(Column::new("total").fixed(100.0).frozen(FrozenSide::End).into());
    defs
}

// ============================================================================
// Visible rows
// ============================================================================

#[test]
fn test_scroll_updates_visible_range() {
    let mut grid = grid(10_000, &["a", "b"], Sheet::default());
    // 20 body rows below the header
    grid.resize(200.0, ROW * 21.0);
    let range = grid.scroll(3500.0, 0.0);
    assert_eq!(range.rows(), 96..124);
    assert_eq!(grid.visible_range(), range);
}

#[test]
fn test_scroll_is_clamped_to_content() {
    let mut grid = grid(10_000, &["a", "b"], Sheet::default());
    let range = grid.scroll(1.0e9, 0.0);
    // 350_000 of content, 350 of body
    assert_eq!(grid.snapshot().viewport.scroll_top, 349_650.0);
    assert_eq!(range.row_stop, 10_000);
    assert!(range.contains_row(9_999));

    let range = grid.scroll(-500.0, 0.0);
    assert_eq!(grid.snapshot().viewport.scroll_top, 0.0);
    assert_eq!(range.row_start, 0);
}

#[test]
fn test_empty_grid_has_empty_range() {
    let grid = grid(0, &["a"], Sheet::default());
    let range = grid.visible_range();
    assert!(range.is_empty());
    assert_eq!(range.rows().count(), 0);
}

#[test]
fn test_viewport_taller_than_content_shows_everything() {
    let mut grid = grid(3, &["a", "b"], Sheet::default());
    let range = grid.resize(1000.0, 2000.0);
    assert_eq!(range.rows(), 0..3);
    assert_eq!(range.columns().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn test_pinned_rows_shrink_body() {
    let mut grid = grid(100, &["a"], Sheet::default());
    grid.set_rows(rows(100).with_pinned(1, 1));
    let snapshot = grid.snapshot();
    // Header plus two summary rows
    assert_eq!(snapshot.chrome_height(), ROW * 3.0);
    assert_eq!(snapshot.body_height(), ROW * 8.0);

    // PageDown moves by the shrunken body
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key(Key::PageDown));
    assert_eq!(grid.state().focus, Some(Position::new(8, 0)));
}

// ============================================================================
// Measured heights
// ============================================================================

#[test]
fn test_measured_row_shifts_following_offsets() {
    let mut grid = estimated_grid(100, 30.0);
    assert!(grid.measure_row(&RowKey::from(5usize), 90.0));

    let snapshot = grid.snapshot();
    assert_eq!(snapshot.geometry.row_offset(5), 150.0);
    assert_eq!(snapshot.geometry.row_offset(6), 240.0);
    assert_eq!(snapshot.geometry.total_height(), 99.0 * 30.0 + 90.0);

    // The replaced snapshot still sees the estimate
    let previous = grid.previous().unwrap();
    assert_eq!(previous.geometry.row_offset(6), 180.0);
}

#[test]
fn test_repeated_measurement_is_a_no_op() {
    let mut grid = estimated_grid(10, 30.0);
    assert!(grid.measure_row(&RowKey::from(2usize), 50.0));
    assert!(!grid.measure_row(&RowKey::from(2usize), 50.0));
    assert!(!grid.measure_row(&RowKey::from("missing"), 50.0));
}

#[test]
fn test_measurement_order_does_not_matter() {
    let keys: Vec<RowKey> = (0..50usize).map(RowKey::from).collect();
    let heights = [(3usize, 70.0), (40, 12.0), (17, 44.0)];

    let mut forward = estimated_grid(50, 30.0);
    for &(i, h) in &heights {
        forward.measure_row(&keys[i], h);
    }
    let mut backward = estimated_grid(50, 30.0);
    backward.measure_rows(heights.iter().rev().map(|&(i, h)| (&keys[i], h)));

    let (a, b) = (forward.snapshot(), backward.snapshot());
    for i in 0..=50 {
        assert_eq!(a.geometry.row_offset(i), b.geometry.row_offset(i));
    }
}

#[test]
fn test_measured_heights_survive_reordering() {
    let mut grid = estimated_grid(5, 20.0);
    grid.measure_row(&RowKey::from(4usize), 100.0);
    let reversed: Vec<usize> = (0..5).rev().collect();
    grid.set_rows(FlatRows::from_rows(&reversed, |&k| RowKey::from(k)));
    // Row "4" is now first
    let snapshot = grid.snapshot();
    assert_eq!(snapshot.geometry.row_height(0), 100.0);
    assert_eq!(snapshot.geometry.row_offset(1), 100.0);
}

#[test]
fn test_rendered_rows_cover_viewport_at_every_offset() {
    let mut grid = estimated_grid(400, 30.0);
    let keys: Vec<RowKey> = (0..400usize).map(RowKey::from).collect();
    grid.measure_rows(keys.iter().enumerate().filter_map(|(i, key)| match i % 7 {
        0 => Some((key, 95.0)),
        3 => Some((key, 12.0)),
        5 => Some((key, 30.5)),
        _ => None,
    }));
    let snapshot = grid.snapshot();
    let total = snapshot.geometry.total_height();
    let body = snapshot.body_height();

    let mut requested = 0.0;
    while requested <= total {
        let range = grid.scroll(requested, 0.0);
        let snapshot = grid.snapshot();
        let top = snapshot.viewport.scroll_top;
        let geometry = &snapshot.geometry;
        assert!(!range.is_empty(), "empty range at {top}");
        assert!(geometry.row_offset(range.row_start) <= top, "gap above at {top}");
        assert!(
            geometry.row_offset(range.row_stop) >= (top + body).min(total),
            "gap below at {top}"
        );
        requested += 37.0;
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_visible_cells_can_be_collected() {
    let mut grid = grid(100, &["a", "b"], Sheet::default());
    grid.scroll(ROW * 10.0, 0.0);
    let snapshot = grid.snapshot();

    let mut cells = Vec::new();
    snapshot.for_each_visible_cell(|cell| cells.push(cell));

    let range = snapshot.range;
    assert_eq!(cells.len(), range.rows().len() * 2);
    let first = cells.first().unwrap();
    assert_eq!(first.row.key, RowKey::from(range.row_start));
    assert_eq!(first.column.key, "a");
    let keys: Vec<(&RowKey, &str)> = cells.iter().map(|c| (&c.row.key, c.column.key.as_str())).collect();
    assert_eq!(keys.last(), Some(&(&RowKey::from(range.row_stop - 1), "b")));
}

#[test]
fn test_spanned_cell_is_drawn_once_across_its_columns() {
    let mut sheet = Sheet::default();
    sheet.span("1", "a", 3);
    let mut grid = grid(5, &["a", "b", "c", "d", "e", "f"], sheet);
    grid.resize(200.0, ROW * 11.0);
    // Window x [350, 550) plus overscan reaches column c, which the span covers
    grid.scroll(0.0, 350.0);
    let snapshot = grid.snapshot();

    let mut row_one = Vec::new();
    snapshot.for_each_spanned_cell(grid.delegate(), |cell| {
        if cell.position.row == 1 {
            row_one.push((cell.position.col, cell.col_span, cell.rect.x, cell.rect.width));
        }
    });
    assert_eq!(
        row_one,
        vec![(0, 3, -350.0, 300.0), (3, 1, -50.0, 100.0), (4, 1, 50.0, 100.0), (5, 1, 150.0, 100.0)]
    );

    // Rows without spans match the plain visitor
    let (mut plain, mut spanned) = (0, 0);
    snapshot.for_each_visible_cell(|cell| plain += usize::from(cell.position.row == 0));
    snapshot.for_each_spanned_cell(grid.delegate(), |cell| spanned += usize::from(cell.position.row == 0));
    assert_eq!(plain, spanned);
}

// ============================================================================
// Columns
// ============================================================================

#[test]
fn test_frozen_columns_always_materialized() {
    let mut grid = grid_with(GridConfig::default(), &frozen_defs(), rows(10), Sheet::default());
    grid.resize(400.0, 400.0);
    let range = grid.scroll(0.0, 500.0);
    // Scrolling window x [600, 800) plus one column of overscan each side
    assert_eq!(range.columns().collect::<Vec<_>>(), vec![0, 5, 6, 7, 8, 9]);
}

#[test_case(0.0 ; "at start")]
#[test_case(250.0 ; "middle")]
#[test_case(600.0 ; "at end")]
fn test_frozen_bands_present_at_any_scroll(scroll_left: f32) {
    let mut grid = grid_with(GridConfig::default(), &frozen_defs(), rows(10), Sheet::default());
    grid.resize(400.0, 400.0);
    let range = grid.scroll(0.0, scroll_left);
    assert!(range.contains_col(0));
    assert!(range.contains_col(9));
}

#[test]
fn test_compute_visible_without_grid() {
    let rows = RowGeometry::fixed(1_000, 20.0);
    let set = ColumnSet::from_columns((0..20).map(|i| Column::new(format!("c{i}")).fixed(50.0))).unwrap();
    let layout = ColumnLayout::resolve(&set, 200.0, &ColumnSizing::default(), 50.0);
    let mut viewport = Viewport::new(200.0, 100.0);
    viewport.scroll_top = 1_000.0;
    viewport.scroll_left = 175.0;
    let range = compute_visible(&rows, &layout, &viewport, Overscan::default()).unwrap();
    assert_eq!(range.rows(), 50..55);
    // x [175, 375): columns 3 through 7
    assert_eq!(range.columns().collect::<Vec<_>>(), vec![3, 4, 5, 6, 7]);
}

// ============================================================================
// Scroll requests
// ============================================================================

#[test]
fn test_focus_move_requests_minimal_scroll() {
    let mut grid = grid(100, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(9, 0));
    assert!(grid.take_scroll_request().is_none());

    grid.dispatch(&Input::key(Key::ArrowDown));
    let request = grid.take_scroll_request().unwrap();
    assert_eq!(request.top, Some(ROW));
    assert_eq!(request.left, None);
}

#[test]
fn test_newest_scroll_request_wins() {
    let mut grid = grid(100, &["a", "b"], Sheet::default());
    grid.dispatch(&Input::click(0, 0));
    grid.dispatch(&Input::key_with(Key::ArrowDown, Modifiers::CTRL));
    grid.dispatch(&Input::key(Key::ArrowUp));
    let request = grid.take_scroll_request().unwrap();
    // Row 98 aligned to the bottom of a 350px body
    assert_eq!(request.top, Some(99.0 * ROW - 350.0));
    assert!(grid.take_scroll_request().is_none());
}

#[test]
fn test_reveal_ignores_frozen_columns_horizontally() {
    let mut grid = grid_with(GridConfig::default(), &frozen_defs(), rows(10), Sheet::default());
    grid.resize(400.0, 400.0);
    grid.scroll(0.0, 300.0);
    let snapshot = grid.snapshot();
    assert_eq!(snapshot.reveal(Position::new(0, 0)), None);
    assert_eq!(snapshot.reveal(Position::new(0, 9)), None);

    // c1 at x [100, 200) hides under the start band
    let request = snapshot.reveal(Position::new(0, 1)).unwrap();
    assert_eq!(request.left, Some(0.0));
    // c8 at x [800, 900) must end where the end band begins
    let request = snapshot.reveal(Position::new(0, 8)).unwrap();
    assert_eq!(request.left, Some(600.0));
}
