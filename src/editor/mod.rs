//! Selection, navigation and editing state machine.
//!
//! [`SelectionState::transition`] is a pure function from the current state
//! and one [`Input`] to the next state plus a list of [`Effect`]s. Effects
//! are requests for the outside world (scroll, commit, fill, clipboard);
//! the grid controller performs them and feeds verdicts back as inputs.
//!
//! - `Idle`: focus and selection only
//! - `Editing`: a draft value is held, possibly awaiting a commit verdict
//! - `DragFilling`: the fill handle is being dragged
//!
//! Row selection (checkbox style, by row key) is orthogonal to the mode and
//! is handled in every mode.

mod fill;
mod machine;
mod navigation;
mod rows;

use serde::{Deserialize, Serialize};

pub use fill::fill_range;
pub use navigation::{next_position, Motion};

use crate::config::GridConfig;
use crate::grouping::FlatRows;
use crate::layout::{ColSpanArgs, ColumnSet, RowGeometry, RowSpans};
use crate::types::{CellRange, Column, FlatRow, Position, RowKey};

/// Keys the state machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Escape,
    F2,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Backspace,
    Char(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "F2" => Self::F2,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// One discrete interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Input {
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerDown {
        cell: Position,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer pressed on the selection's fill handle
    FillHandleDown,
    PointerMove {
        cell: Position,
    },
    PointerUp,
    /// The editor widget's text changed
    DraftChanged {
        value: String,
    },
    /// Editor lost focus
    Blur,
    /// Verdict of the commit callback for the pending draft
    CommitResolved {
        #[serde(default)]
        error: Option<String>,
    },
    Paste {
        text: String,
    },
    /// A row's selection checkbox changed
    SelectRow {
        row: usize,
        selected: bool,
        #[serde(default)]
        shift: bool,
    },
    /// The header select-all checkbox changed
    SelectAllRows {
        selected: bool,
    },
}

impl Input {
    pub fn key(key: Key) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_with(key: Key, modifiers: Modifiers) -> Self {
        Self::KeyDown { key, modifiers }
    }

    pub fn click(row: usize, col: usize) -> Self {
        Self::PointerDown {
            cell: Position::new(row, col),
            modifiers: Modifiers::NONE,
        }
    }
}

/// Structured arguments of the commit callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitArgs {
    pub position: Position,
    pub row_key: RowKey,
    /// Index into the host's row slice
    pub source_index: Option<usize>,
    pub column_key: String,
    pub old_value: String,
    pub new_value: String,
}

/// Structured arguments of the fill callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillArgs {
    pub source: Position,
    pub source_value: String,
    pub range: CellRange,
}

/// Structured arguments of the paste callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteArgs {
    /// Cells receiving `values`, already clipped to the grid
    pub range: CellRange,
    /// Row-major values, trimmed to `range`
    pub values: Vec<Vec<String>>,
}

/// A request produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    /// Scroll so this cell is visible
    Reveal { position: Position },
    EditStarted { position: Position },
    EditEnded { position: Position, committed: bool },
    Commit(CommitArgs),
    Fill(FillArgs),
    Copy { range: CellRange, text: String },
    Paste(PasteArgs),
    ToggleGroup { key: RowKey },
    /// The set of selected rows changed; `keys` is the whole new set
    RowSelectionChanged { keys: Vec<RowKey> },
}

/// Host accessor for displayed and editable cell values.
pub trait CellValues {
    /// Text shown for the cell (used for copy).
    fn cell_text(&self, row: &FlatRow, column: &Column) -> String;

    /// Value an edit session starts from.
    fn edit_value(&self, row: &FlatRow, column: &Column) -> String {
        self.cell_text(row, column)
    }

    /// Whether the cell accepts edits.
    fn is_editable(&self, row: &FlatRow, column: &Column) -> bool {
        row.is_data() && column.editable
    }

    /// Whether the data row may be selected.
    fn is_row_selectable(&self, _key: &RowKey) -> bool {
        true
    }

    /// Number of columns the cell at `args` covers.
    fn col_span(&self, _args: &ColSpanArgs<'_>) -> usize {
        1
    }
}

/// Everything a transition may read besides the state itself.
pub struct NavContext<'a> {
    pub rows: &'a FlatRows,
    pub columns: &'a ColumnSet,
    pub values: &'a dyn CellValues,
    pub config: &'a GridConfig,
    pub geometry: &'a RowGeometry,
    /// Height of the scrollable body (PageUp/PageDown distance)
    pub body_height: f32,
}

impl NavContext<'_> {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Row one body height below the top of `row`; always at least one row on.
    pub(crate) fn page_down_row(&self, row: usize) -> usize {
        let last = self.row_count().saturating_sub(1);
        let y = self.geometry.row_offset(row) + self.body_height;
        let target = self.geometry.row_at(y).unwrap_or(last);
        target.max(row + 1).min(last)
    }

    /// Row one body height above the top of `row`; always at least one row back.
    pub(crate) fn page_up_row(&self, row: usize) -> usize {
        let y = self.geometry.row_offset(row) - self.body_height;
        let target = self.geometry.row_at(y.max(0.0)).unwrap_or(0);
        target.min(row.saturating_sub(1))
    }

    /// Cell boundaries of `row` with the host's column spans applied.
    pub(crate) fn row_spans(&self, row: usize) -> RowSpans {
        match self.rows.get(row) {
            Some(flat) => RowSpans::resolve(flat, self.columns, |args| self.values.col_span(args)),
            None => RowSpans::single(self.col_count()),
        }
    }

    /// `p` moved to the first column of the cell covering it.
    pub(crate) fn cell_start(&self, p: Position) -> Position {
        Position::new(p.row, self.row_spans(p.row).start(p.col))
    }

    pub(crate) fn is_selectable(&self, col: usize) -> bool {
        self.columns.column(col).is_some_and(|c| c.selectable)
    }

    pub(crate) fn is_editable(&self, p: Position) -> bool {
        match (self.rows.get(p.row), self.columns.column(p.col)) {
            (Some(row), Some(column)) => self.values.is_editable(row, column),
            _ => false,
        }
    }

    pub(crate) fn cell_text(&self, p: Position) -> String {
        match (self.rows.get(p.row), self.columns.column(p.col)) {
            (Some(row), Some(column)) => self.values.cell_text(row, column),
            _ => String::new(),
        }
    }

    pub(crate) fn edit_value(&self, p: Position) -> String {
        match (self.rows.get(p.row), self.columns.column(p.col)) {
            (Some(row), Some(column)) => self.values.edit_value(row, column),
            _ => String::new(),
        }
    }

    pub(crate) fn commit_args(&self, p: Position, old_value: String, new_value: String) -> Option<CommitArgs> {
        let row = self.rows.get(p.row)?;
        let column = self.columns.column(p.col)?;
        Some(CommitArgs {
            position: p,
            row_key: row.key.clone(),
            source_index: row.source_index,
            column_key: column.key.clone(),
            old_value,
            new_value,
        })
    }
}
