//! Scroll requests and on-screen cell placement.

use serde::{Deserialize, Serialize};

use super::GridSnapshot;
use crate::config::Direction;
use crate::editor::CellValues;
use crate::layout::{scroll_to_nearest, RowSpans};
use crate::types::{Column, FlatRow, Position};

/// Scroll offsets the host should apply before the next render.
///
/// `left` is a magnitude; RTL hosts negate it if their scroll axis runs
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f32>,
}

impl ScrollRequest {
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.left.is_none()
    }
}

/// Pixel rectangle relative to the body viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Per-cell flags handed to the render callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellState {
    pub selected: bool,
    pub editing: bool,
    pub focused: bool,
    /// The cell's row is in the row selection
    pub row_selected: bool,
}

/// One materialized cell.
#[derive(Debug, Clone, Copy)]
pub struct VisibleCell<'a> {
    pub position: Position,
    pub row: &'a FlatRow,
    pub column: &'a Column,
    /// Columns covered, starting at `position.col`
    pub col_span: usize,
    pub state: CellState,
    pub rect: CellRect,
}

impl GridSnapshot {
    /// Smallest scroll change that fully shows `position` in the body.
    ///
    /// Frozen columns never require horizontal scrolling.
    pub fn reveal(&self, position: Position) -> Option<ScrollRequest> {
        if position.row >= self.rows.len() || position.col >= self.columns.len() {
            return None;
        }
        let body = self.body_viewport();
        let top = self.geometry.row_offset(position.row);
        let bottom = top + self.geometry.row_height(position.row);
        let request_top = scroll_to_nearest(body.scroll_top, top, bottom, body.height, 0.0, 0.0);

        let layout = &self.column_layout;
        let frozen = position.col < layout.frozen_start_count()
            || position.col >= layout.len() - layout.frozen_end_count();
        let request_left = if frozen {
            None
        } else {
            let left = layout.column_offset(position.col);
            let right = left + layout.column_width(position.col);
            scroll_to_nearest(
                body.scroll_x(),
                left,
                right,
                body.width,
                layout.frozen_start_width(),
                layout.frozen_end_width(),
            )
        };

        let request = ScrollRequest {
            top: request_top,
            left: request_left,
        };
        (!request.is_empty()).then_some(request)
    }

    /// Where a column's left edge lands on screen, honouring frozen bands,
    /// horizontal scroll and layout direction.
    pub fn column_screen_x(&self, col: usize) -> f32 {
        let layout = &self.column_layout;
        let width = layout.column_width(col);
        let viewport_width = self.viewport.width;
        let logical = match layout.frozen_inset(col) {
            Some(inset) if col < layout.frozen_start_count() => inset,
            Some(inset) => viewport_width - inset - width,
            None => layout.column_offset(col) - self.viewport.scroll_x(),
        };
        match self.config.direction {
            Direction::Ltr => logical,
            Direction::Rtl => viewport_width - logical - width,
        }
    }

    /// Screen rectangle of a body cell.
    pub fn cell_rect(&self, position: Position) -> CellRect {
        CellRect {
            x: self.column_screen_x(position.col),
            y: self.geometry.row_offset(position.row) - self.viewport.scroll_top,
            width: self.column_layout.column_width(position.col),
            height: self.geometry.row_height(position.row),
        }
    }

    pub fn cell_state(&self, position: Position) -> CellState {
        CellState {
            selected: self.state.is_selected(position),
            editing: self.state.is_editing(position),
            focused: self.state.focus == Some(position),
            row_selected: self
                .rows
                .get(position.row)
                .is_some_and(|row| self.state.is_row_selected(&row.key)),
        }
    }

    /// Visit every cell of the current viewport range, rows outer.
    pub fn for_each_visible_cell<'s>(&'s self, mut visit: impl FnMut(VisibleCell<'s>)) {
        for row_index in self.range.rows() {
            let Some(row) = self.rows.get(row_index) else {
                continue;
            };
            for col in self.range.columns() {
                let Some(column) = self.columns.column(col) else {
                    continue;
                };
                let position = Position::new(row_index, col);
                visit(VisibleCell {
                    position,
                    row,
                    column,
                    col_span: 1,
                    state: self.cell_state(position),
                    rect: self.cell_rect(position),
                });
            }
        }
    }

    /// Visit the viewport's cells with the host's column spans applied.
    ///
    /// A spanned cell is visited once, at its first column, with a rectangle
    /// covering every column it spans. A cell that starts left of the
    /// visible columns is still visited when it reaches into them.
    pub fn for_each_spanned_cell<'s>(&'s self, values: &dyn CellValues, mut visit: impl FnMut(VisibleCell<'s>)) {
        for row_index in self.range.rows() {
            let Some(row) = self.rows.get(row_index) else {
                continue;
            };
            let spans = RowSpans::resolve(row, &self.columns, |args| values.col_span(args));
            let mut covered_until = 0;
            for col in self.range.columns() {
                if col < covered_until {
                    continue;
                }
                let (start, end) = (spans.start(col), spans.end(col));
                covered_until = end;
                let Some(column) = self.columns.column(start) else {
                    continue;
                };
                let position = Position::new(row_index, start);
                let rect = CellRect {
                    x: (start..end)
                        .map(|c| self.column_screen_x(c))
                        .fold(f32::INFINITY, f32::min),
                    width: (start..end).map(|c| self.column_layout.column_width(c)).sum(),
                    ..self.cell_rect(position)
                };
                visit(VisibleCell {
                    position,
                    row,
                    column,
                    col_span: end - start,
                    state: self.cell_state(position),
                    rect,
                });
            }
        }
    }

    /// Render the viewport through a pure per-cell function.
    pub fn render<T>(&self, mut render_cell: impl FnMut(&FlatRow, &Column, CellState) -> T) -> Vec<(Position, T)> {
        let mut out = Vec::new();
        self.for_each_visible_cell(|cell| {
            out.push((cell.position, render_cell(cell.row, cell.column, cell.state)));
        });
        out
    }
}
