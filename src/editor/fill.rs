use crate::config::FillAxis;
use crate::types::{CellRange, Position};

/// Span covered by dragging the fill handle from `source` to `target`.
///
/// The target is projected onto the source's column (vertical), row
/// (horizontal), or whichever axis moved further (auto, ties vertical).
pub fn fill_range(source: Position, target: Position, axis: FillAxis) -> CellRange {
    let vertical = match axis {
        FillAxis::Vertical => true,
        FillAxis::Horizontal => false,
        FillAxis::Auto => source.row.abs_diff(target.row) >= source.col.abs_diff(target.col),
    };
    let end = if vertical {
        Position::new(target.row, source.col)
    } else {
        Position::new(source.row, target.col)
    };
    CellRange::between(source, end)
}
