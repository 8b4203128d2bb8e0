use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::RowKey;

/// A cell coordinate into the flat row sequence and the ordered column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Clamp into `[0, row_count) x [0, col_count)`; `None` when the grid is empty.
    pub fn clamp(self, row_count: usize, col_count: usize) -> Option<Self> {
        if row_count == 0 || col_count == 0 {
            return None;
        }
        Some(Self {
            row: self.row.min(row_count - 1),
            col: self.col.min(col_count - 1),
        })
    }
}

/// Inclusive rectangular cell span, always normalized (start <= end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl CellRange {
    /// Span covering both corners.
    pub fn between(a: Position, b: Position) -> Self {
        Self {
            start_row: a.row.min(b.row),
            start_col: a.col.min(b.col),
            end_row: a.row.max(b.row),
            end_col: a.col.max(b.col),
        }
    }

    pub fn single(p: Position) -> Self {
        Self::between(p, p)
    }

    pub fn contains(&self, p: Position) -> bool {
        (self.start_row..=self.end_row).contains(&p.row)
            && (self.start_col..=self.end_col).contains(&p.col)
    }

    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Intersect with the grid bounds; `None` if nothing is left.
    pub fn clamp(self, row_count: usize, col_count: usize) -> Option<Self> {
        if self.start_row >= row_count || self.start_col >= col_count {
            return None;
        }
        Some(Self {
            end_row: self.end_row.min(row_count - 1),
            end_col: self.end_col.min(col_count - 1),
            ..self
        })
    }

    /// Iterate cells row-major.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (self.start_row..=self.end_row)
            .flat_map(move |row| (self.start_col..=self.end_col).map(move |col| Position { row, col }))
    }
}

/// Anchored selection: extends from the last plain-selected cell to the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn collapsed(p: Position) -> Self {
        Self { anchor: p, head: p }
    }

    pub fn range(&self) -> CellRange {
        CellRange::between(self.anchor, self.head)
    }
}

/// Where an edit session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum EditPhase {
    /// User is typing
    #[default]
    Drafting,
    /// Draft handed to the commit callback, awaiting its verdict
    PendingCommit,
    /// Commit callback refused the draft; draft is kept
    Rejected,
}

/// Where focus goes once a commit succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AfterCommit {
    Stay,
    Down,
    Next,
    Previous,
    Focus(Position),
}

/// An in-progress cell edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    pub position: Position,
    /// Value when the edit began
    pub original: String,
    pub draft: String,
    pub phase: EditPhase,
    pub after_commit: AfterCommit,
}

impl EditSession {
    pub fn has_error(&self) -> bool {
        self.phase == EditPhase::Rejected
    }
}

/// Drag-fill in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragFill {
    pub source: Position,
    pub target: Position,
    pub range: CellRange,
}

/// Interaction mode of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Mode {
    #[default]
    Idle,
    Editing(EditSession),
    DragFilling(DragFill),
}

/// Focus, selection and edit state. Replaced wholesale on every input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub focus: Option<Position>,
    pub selection: Option<Selection>,
    pub mode: Mode,
    /// Selected rows by key, independent of cell focus
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub selected_rows: BTreeSet<RowKey>,
    /// Last row toggled; Shift extends from here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_anchor: Option<RowKey>,
}

impl SelectionState {
    pub fn selected_range(&self) -> Option<CellRange> {
        self.selection.map(|s| s.range())
    }

    pub fn is_selected(&self, p: Position) -> bool {
        self.selection.is_some_and(|s| s.range().contains(p))
    }

    pub fn editing(&self) -> Option<&EditSession> {
        match &self.mode {
            Mode::Editing(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_editing(&self, p: Position) -> bool {
        self.editing().is_some_and(|s| s.position == p)
    }

    pub fn is_row_selected(&self, key: &RowKey) -> bool {
        self.selected_rows.contains(key)
    }

    pub fn drag_fill(&self) -> Option<&DragFill> {
        match &self.mode {
            Mode::DragFilling(fill) => Some(fill),
            _ => None,
        }
    }
}
