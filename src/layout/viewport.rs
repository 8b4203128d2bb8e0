//! Viewport state and the visible-range calculation.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{ColumnLayout, RowGeometry};
use crate::error::Result;

/// Scroll position and size of the scrollable body, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub scroll_top: f32,
    /// Horizontal scroll; RTL hosts report negative values, only the magnitude is used
    pub scroll_left: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_top: 0.0,
            scroll_left: 0.0,
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    /// Horizontal scroll distance regardless of direction.
    pub fn scroll_x(&self) -> f32 {
        self.scroll_left.abs()
    }

    /// Same scroll position over a smaller height (header and pinned rows removed).
    pub fn shrink_height(&self, by: f32) -> Self {
        Self {
            height: (self.height - sanitize(by)).max(0.0),
            ..*self
        }
    }

    /// Largest scroll offsets that still show content.
    pub fn max_scroll(&self, content_width: f32, content_height: f32) -> (f32, f32) {
        (
            (content_height - self.height).max(0.0),
            (content_width - self.width).max(0.0),
        )
    }

    /// Clamp scroll position to `[0, content - viewport]` on both axes.
    pub fn clamp_scroll(&mut self, content_width: f32, content_height: f32) {
        let (max_top, max_left) = self.max_scroll(content_width, content_height);
        self.scroll_top = sanitize(self.scroll_top).clamp(0.0, max_top);
        let left = sanitize(self.scroll_left.abs()).clamp(0.0, max_left);
        self.scroll_left = if self.scroll_left < 0.0 { -left } else { left };
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, top: f32, left: f32, content_width: f32, content_height: f32) {
        self.scroll_top = top;
        self.scroll_left = left;
        self.clamp_scroll(content_width, content_height);
    }

    /// Scroll by delta amounts
    pub fn scroll_by(&mut self, delta_top: f32, delta_left: f32, content_width: f32, content_height: f32) {
        self.scroll_top += delta_top;
        self.scroll_left += delta_left;
        self.clamp_scroll(content_width, content_height);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = sanitize(width);
        self.height = sanitize(height);
    }
}

fn sanitize(px: f32) -> f32 {
    if px.is_finite() {
        px.max(0.0)
    } else {
        0.0
    }
}

/// Minimal scroll change that brings `[start, end)` into the visible span
/// `[scroll + inset_before, scroll + visible - inset_after)`.
///
/// Returns `None` when the span is already fully visible. Spans larger than
/// the visible area align to their start edge.
pub fn scroll_to_nearest(
    scroll: f32,
    start: f32,
    end: f32,
    visible: f32,
    inset_before: f32,
    inset_after: f32,
) -> Option<f32> {
    let lo = scroll + inset_before;
    let hi = scroll + visible - inset_after;
    if start < lo {
        Some((start - inset_before).max(0.0))
    } else if end > hi {
        let aligned_end = end - (visible - inset_after);
        let aligned_start = start - inset_before;
        Some(aligned_end.min(aligned_start).max(0.0))
    } else {
        None
    }
}

/// Extra rows/columns materialized around the strict viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overscan {
    pub rows: usize,
    pub cols: usize,
}

/// Index ranges to materialize.
///
/// Rows are `[row_start, row_stop)`. Columns are the scrolling window
/// `[col_start, col_stop)` plus the pinned bands `[0, frozen_start)` and
/// `[col_count - frozen_end, col_count)`, which are always included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportRange {
    pub row_start: usize,
    pub row_stop: usize,
    pub col_start: usize,
    pub col_stop: usize,
    pub frozen_start: usize,
    pub frozen_end: usize,
    pub col_count: usize,
}

impl ViewportRange {
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.row_start..self.row_stop
    }

    /// Every column to materialize in ascending index order.
    pub fn columns(&self) -> impl Iterator<Item = usize> {
        let end_band = self.col_count - self.frozen_end;
        (0..self.frozen_start)
            .chain(self.col_start..self.col_stop)
            .chain(end_band..self.col_count)
    }

    pub fn contains_row(&self, row: usize) -> bool {
        self.rows().contains(&row)
    }

    pub fn contains_col(&self, col: usize) -> bool {
        col < self.frozen_start
            || (self.col_start..self.col_stop).contains(&col)
            || (col >= self.col_count - self.frozen_end && col < self.col_count)
    }

    pub fn is_empty(&self) -> bool {
        self.row_start == self.row_stop || self.col_count == 0
    }

    /// Fit the range to new totals, keeping `stop >= start`.
    pub fn clamp_to(&self, row_count: usize, layout: &ColumnLayout) -> Self {
        let row_stop = self.row_stop.min(row_count);
        let frozen_start = layout.frozen_start_count();
        let frozen_end = layout.frozen_end_count();
        let col_count = layout.len();
        let band_end = col_count - frozen_end;
        let col_stop = self.col_stop.clamp(frozen_start, band_end);
        Self {
            row_start: self.row_start.min(row_stop),
            row_stop,
            col_start: self.col_start.clamp(frozen_start, col_stop),
            col_stop,
            frozen_start,
            frozen_end,
            col_count,
        }
    }
}

/// Compute the rows and columns to materialize for a body viewport.
///
/// Fails only with `StaleGeometry` when the row table has pending
/// invalidations; [`ViewportCalculator`] turns that into a fallback.
pub fn compute_visible(
    rows: &RowGeometry,
    columns: &ColumnLayout,
    viewport: &Viewport,
    overscan: Overscan,
) -> Result<ViewportRange> {
    let row_count = rows.len();
    let (row_start, row_stop) = if row_count == 0 {
        (0, 0)
    } else {
        let top = sanitize(viewport.scroll_top);
        let first = rows.try_first_row_ending_after(top)?;
        let stop = rows.try_rows_starting_before(top + viewport.height)?.max(first);
        (
            first.saturating_sub(overscan.rows),
            stop.saturating_add(overscan.rows).min(row_count),
        )
    };

    let col_count = columns.len();
    let frozen_start = columns.frozen_start_count();
    let frozen_end = columns.frozen_end_count();
    let band = frozen_start..col_count - frozen_end;
    let (col_start, col_stop) = if band.is_empty() {
        (band.start, band.start)
    } else {
        let left = viewport.scroll_x() + columns.frozen_start_width();
        let right = viewport.scroll_x() + viewport.width - columns.frozen_end_width();
        let first = columns.first_ending_after(band.clone(), left);
        let stop = columns.starting_before(band.clone(), right).max(first);
        (
            first.saturating_sub(overscan.cols).max(band.start),
            stop.saturating_add(overscan.cols).min(band.end),
        )
    };

    Ok(ViewportRange {
        row_start: row_start.min(row_stop),
        row_stop,
        col_start,
        col_stop,
        frozen_start,
        frozen_end,
        col_count,
    })
}

/// Remembers the last good range so a transiently inconsistent geometry
/// never reaches the caller.
#[derive(Debug, Clone, Default)]
pub struct ViewportCalculator {
    last: Option<ViewportRange>,
}

impl ViewportCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<ViewportRange> {
        self.last
    }

    pub fn compute(
        &mut self,
        rows: &RowGeometry,
        columns: &ColumnLayout,
        viewport: &Viewport,
        overscan: Overscan,
    ) -> ViewportRange {
        match compute_visible(rows, columns, viewport, overscan) {
            Ok(range) => {
                trace!(?range, "viewport computed");
                self.last = Some(range);
                range
            }
            Err(err) => {
                debug!(%err, "geometry stale, reusing previous viewport range");
                self.last
                    .unwrap_or_default()
                    .clamp_to(rows.len(), columns)
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::{ColumnSet, ColumnSizing};
    use crate::types::{Column, FrozenSide, RowKey};

    fn columns(widths: &[(f32, FrozenSide)]) -> ColumnLayout {
        let set = ColumnSet::from_columns(
            widths
                .iter()
                .enumerate()
                .map(|(i, &(w, side))| Column::new(format!("c{i}")).fixed(w).frozen(side)),
        )
        .unwrap();
        ColumnLayout::resolve(&set, 0.0, &ColumnSizing::default(), 0.0)
    }

    #[test]
    fn test_fixed_rows_example() {
        let rows = RowGeometry::fixed(10_000, 35.0);
        let cols = columns(&[(100.0, FrozenSide::None)]);
        let mut viewport = Viewport::new(500.0, 700.0);
        viewport.scroll_top = 3500.0;
        let range = compute_visible(&rows, &cols, &viewport, Overscan { rows: 5, cols: 0 }).unwrap();
        assert_eq!(range.rows(), 95..125);
    }

    #[test]
    fn test_empty_grid() {
        let rows = RowGeometry::fixed(0, 35.0);
        let cols = columns(&[]);
        let range =
            compute_visible(&rows, &cols, &Viewport::new(500.0, 500.0), Overscan::default()).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.columns().count(), 0);
    }

    #[test]
    fn test_viewport_larger_than_content() {
        let rows = RowGeometry::fixed(3, 20.0);
        let cols = columns(&[(50.0, FrozenSide::None), (50.0, FrozenSide::None)]);
        let range =
            compute_visible(&rows, &cols, &Viewport::new(1000.0, 1000.0), Overscan::default()).unwrap();
        assert_eq!(range.rows(), 0..3);
        assert_eq!(range.columns().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_frozen_columns_always_present() {
        let cols = columns(&[
            (100.0, FrozenSide::Start),
            (100.0, FrozenSide::None),
            (100.0, FrozenSide::None),
            (100.0, FrozenSide::None),
            (100.0, FrozenSide::None),
            (100.0, FrozenSide::End),
        ]);
        let rows = RowGeometry::fixed(1, 20.0);
        let mut viewport = Viewport::new(300.0, 100.0);
        viewport.scroll_left = 200.0;
        // Unfrozen window is content x [300, 400): column 3 only
        let range = compute_visible(&rows, &cols, &viewport, Overscan::default()).unwrap();
        assert_eq!(range.columns().collect::<Vec<_>>(), vec![0, 3, 5]);

        let range = compute_visible(&rows, &cols, &viewport, Overscan { rows: 0, cols: 5 }).unwrap();
        assert_eq!(range.columns().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_stale_geometry_returns_previous_range() {
        let keys: Vec<RowKey> = (0..100usize).map(RowKey::from).collect();
        let mut rows = RowGeometry::estimated(&keys, 10.0);
        let cols = columns(&[(100.0, FrozenSide::None)]);
        let viewport = Viewport::new(100.0, 50.0);
        let mut calc = ViewportCalculator::new();
        let first = calc.compute(&rows, &cols, &viewport, Overscan::default());
        assert_eq!(first.rows(), 0..5);

        rows.measure(&keys[2], 40.0);
        assert!(compute_visible(&rows, &cols, &viewport, Overscan::default()).is_err());
        let fallback = calc.compute(&rows, &cols, &viewport, Overscan::default());
        assert_eq!(fallback, first);

        rows.rebuild();
        let fresh = calc.compute(&rows, &cols, &viewport, Overscan::default());
        assert_eq!(fresh.rows(), 0..3);
    }

    #[test]
    fn test_clamp_scroll() {
        let mut viewport = Viewport::new(100.0, 100.0);
        viewport.set_scroll(500.0, -40.0, 120.0, 300.0);
        assert_eq!(viewport.scroll_top, 200.0);
        assert_eq!(viewport.scroll_left, -20.0);
        viewport.scroll_by(-1000.0, 0.0, 120.0, 300.0);
        assert_eq!(viewport.scroll_top, 0.0);
    }

    #[test]
    fn test_scroll_to_nearest() {
        // Already visible
        assert_eq!(scroll_to_nearest(100.0, 120.0, 150.0, 200.0, 0.0, 0.0), None);
        // Above: align start
        assert_eq!(scroll_to_nearest(100.0, 50.0, 80.0, 200.0, 0.0, 0.0), Some(50.0));
        // Below: align end
        assert_eq!(scroll_to_nearest(100.0, 300.0, 335.0, 200.0, 0.0, 0.0), Some(135.0));
        // Hidden behind a pinned start band
        assert_eq!(scroll_to_nearest(100.0, 120.0, 150.0, 300.0, 50.0, 0.0), Some(70.0));
    }
}
