//! Layout engine: row geometry, column widths and the visible range.
//!
//! This module handles:
//! - Cumulative row offsets (fixed arithmetic or a lazily rebuilt table)
//! - Column width resolution, frozen bands, resize and reorder
//! - Body cells spanning several columns
//! - Binary search from pixel positions to row/column indices
//! - Scroll clamping and the overscanned viewport range

mod columns;
mod geometry;
mod span;
mod viewport;

pub use columns::{
    resize_column, resolve_column_widths, resolve_widths, ColumnLayout, ColumnSet, ColumnSizing,
    HeaderSpan, LeafColumn, ResizeLimits,
};
pub use geometry::RowGeometry;
pub use span::{ColSpanArgs, ColSpanKind, RowSpans};
pub use viewport::{
    compute_visible, scroll_to_nearest, Overscan, Viewport, ViewportCalculator, ViewportRange,
};
