//! Focus movement.

use super::{Key, Modifiers, NavContext};
use crate::config::{Direction, NavigationMode};
use crate::types::Position;

/// A focus movement, already resolved for layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    /// Toward the start edge
    Back,
    /// Toward the end edge
    Forward,
    /// Tab
    Next,
    /// Shift+Tab
    Previous,
    RowStart,
    RowEnd,
    FirstRow,
    LastRow,
    FirstCell,
    LastCell,
    PageUp,
    PageDown,
}

impl Motion {
    /// Motion for a navigation key, or `None` if the key does not navigate.
    pub fn from_key(key: Key, modifiers: Modifiers, direction: Direction) -> Option<Self> {
        let primary = modifiers.primary();
        let rtl = direction == Direction::Rtl;
        let (left, right) = if rtl {
            (Self::Forward, Self::Back)
        } else {
            (Self::Back, Self::Forward)
        };
        let motion = match key {
            Key::ArrowUp if primary => Self::FirstRow,
            Key::ArrowDown if primary => Self::LastRow,
            Key::ArrowUp => Self::Up,
            Key::ArrowDown => Self::Down,
            Key::ArrowLeft if primary => {
                if rtl {
                    Self::RowEnd
                } else {
                    Self::RowStart
                }
            }
            Key::ArrowRight if primary => {
                if rtl {
                    Self::RowStart
                } else {
                    Self::RowEnd
                }
            }
            Key::ArrowLeft => left,
            Key::ArrowRight => right,
            Key::Tab if modifiers.shift => Self::Previous,
            Key::Tab => Self::Next,
            Key::Home if primary => Self::FirstCell,
            Key::End if primary => Self::LastCell,
            Key::Home => Self::RowStart,
            Key::End => Self::RowEnd,
            Key::PageUp => Self::PageUp,
            Key::PageDown => Self::PageDown,
            _ => return None,
        };
        Some(motion)
    }

    /// Whether Shift turns this motion into a selection extension.
    pub fn extends_with_shift(self) -> bool {
        !matches!(self, Self::Next | Self::Previous)
    }
}

/// Next focus position for `motion` from `from`.
///
/// Never leaves `[0, rows) x [0, cols)` and never lands on a column that is
/// not selectable; when no valid target exists the focus stays put. A target
/// inside a spanned cell resolves to the cell's first column.
pub fn next_position(from: Position, motion: Motion, ctx: &NavContext<'_>) -> Position {
    let rows = ctx.row_count();
    let cols = ctx.col_count();
    let Some(from) = from.clamp(rows, cols) else {
        return from;
    };
    let last_row = rows - 1;
    let mode = ctx.config.navigation;
    let row_only = mode == NavigationMode::RowOnly;

    let target = match motion {
        Motion::Up => Some(Position::new(from.row.saturating_sub(1), from.col)),
        Motion::Down => Some(Position::new((from.row + 1).min(last_row), from.col)),
        Motion::PageUp => Some(Position::new(ctx.page_up_row(from.row), from.col)),
        Motion::PageDown => Some(Position::new(ctx.page_down_row(from.row), from.col)),
        Motion::FirstRow => Some(Position::new(0, from.col)),
        Motion::LastRow => Some(Position::new(last_row, from.col)),
        Motion::FirstCell if row_only => Some(Position::new(0, from.col)),
        Motion::LastCell if row_only => Some(Position::new(last_row, from.col)),
        Motion::RowStart | Motion::RowEnd | Motion::Back | Motion::Forward | Motion::Next | Motion::Previous
            if row_only =>
        {
            None
        }
        Motion::RowStart => first_selectable(ctx, 0..cols).map(|col| Position::new(from.row, col)),
        Motion::RowEnd => last_selectable(ctx, 0..cols).map(|col| Position::new(from.row, col)),
        Motion::FirstCell => first_selectable(ctx, 0..cols).map(|col| Position::new(0, col)),
        Motion::LastCell => last_selectable(ctx, 0..cols).map(|col| Position::new(last_row, col)),
        Motion::Back | Motion::Previous => step_back(from, mode, ctx),
        Motion::Forward | Motion::Next => step_forward(from, mode, ctx),
    };
    target.map_or(from, |target| ctx.cell_start(target))
}

fn first_selectable(ctx: &NavContext<'_>, mut range: std::ops::Range<usize>) -> Option<usize> {
    range.find(|&col| ctx.is_selectable(col))
}

fn last_selectable(ctx: &NavContext<'_>, range: std::ops::Range<usize>) -> Option<usize> {
    range.rev().find(|&col| ctx.is_selectable(col))
}

fn step_forward(from: Position, mode: NavigationMode, ctx: &NavContext<'_>) -> Option<Position> {
    let cols = ctx.col_count();
    let spans = ctx.row_spans(from.row);
    if let Some(col) = first_selectable(ctx, spans.end(from.col)..cols) {
        return Some(Position::new(from.row, col));
    }
    match mode {
        NavigationMode::None | NavigationMode::RowOnly => None,
        NavigationMode::LoopOverRow => {
            first_selectable(ctx, 0..spans.start(from.col)).map(|col| Position::new(from.row, col))
        }
        NavigationMode::ChangeRow => {
            let row = from.row + 1;
            if row >= ctx.row_count() {
                return None;
            }
            first_selectable(ctx, 0..cols).map(|col| Position::new(row, col))
        }
    }
}

fn step_back(from: Position, mode: NavigationMode, ctx: &NavContext<'_>) -> Option<Position> {
    let cols = ctx.col_count();
    let spans = ctx.row_spans(from.row);
    if let Some(col) = last_selectable(ctx, 0..spans.start(from.col)) {
        return Some(Position::new(from.row, col));
    }
    match mode {
        NavigationMode::None | NavigationMode::RowOnly => None,
        NavigationMode::LoopOverRow => {
            last_selectable(ctx, spans.end(from.col)..cols).map(|col| Position::new(from.row, col))
        }
        NavigationMode::ChangeRow => {
            let row = from.row.checked_sub(1)?;
            last_selectable(ctx, 0..cols).map(|col| Position::new(row, col))
        }
    }
}
