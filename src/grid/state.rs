//! Host-persistable grid state.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::GridSnapshot;
use crate::error::Result;
use crate::grouping::{Expansion, FlatRows};
use crate::layout::ColumnSet;
use crate::types::{Position, RowKey, Selection, SelectionState, SortColumn};

/// A cell addressed by keys instead of indices, so it survives re-sorting,
/// re-grouping and column reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellKey {
    pub row_key: RowKey,
    pub column_key: String,
}

impl CellKey {
    fn capture(p: Position, rows: &FlatRows, columns: &ColumnSet) -> Option<Self> {
        Some(Self {
            row_key: rows.get(p.row)?.key.clone(),
            column_key: columns.column(p.col)?.key.clone(),
        })
    }

    fn resolve(&self, rows: &FlatRows, columns: &ColumnSet) -> Option<Position> {
        Some(Position::new(
            rows.position(&self.row_key)?,
            columns.index_of(&self.column_key)?,
        ))
    }
}

/// Focus, cell and row selection, expansion, widths, order and sort as
/// opaque JSON.
///
/// Edit drafts are deliberately absent: restoring always lands in `Idle`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridStateSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<CellKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_anchor: Option<CellKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_head: Option<CellKey>,
    pub expansion: Expansion,
    pub column_widths: HashMap<String, f32>,
    pub column_order: Vec<String>,
    pub sort: Vec<SortColumn>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub selected_rows: BTreeSet<RowKey>,
    pub scroll_top: f32,
    pub scroll_left: f32,
}

impl GridStateSnapshot {
    pub(crate) fn capture(snap: &GridSnapshot) -> Self {
        let key = |p: Position| CellKey::capture(p, &snap.rows, &snap.columns);
        Self {
            focus: snap.state.focus.and_then(key),
            selection_anchor: snap.state.selection.and_then(|s| key(s.anchor)),
            selection_head: snap.state.selection.and_then(|s| key(s.head)),
            expansion: (*snap.expansion).clone(),
            column_widths: snap.sizing.overrides.clone(),
            column_order: snap.columns.order(),
            sort: snap.sort.columns().to_vec(),
            selected_rows: snap.state.selected_rows.clone(),
            scroll_top: snap.viewport.scroll_top,
            scroll_left: snap.viewport.scroll_left,
        }
    }

    /// Selection state with keys resolved against the current rows/columns.
    pub(crate) fn resolve_state(&self, rows: &FlatRows, columns: &ColumnSet) -> SelectionState {
        let resolve = |k: &Option<CellKey>| k.as_ref().and_then(|k| k.resolve(rows, columns));
        let focus = resolve(&self.focus);
        let selection = match (resolve(&self.selection_anchor), resolve(&self.selection_head)) {
            (Some(anchor), Some(head)) => Some(Selection { anchor, head }),
            _ => focus.map(Selection::collapsed),
        };
        SelectionState {
            focus,
            selection,
            selected_rows: self.selected_rows.clone(),
            ..SelectionState::default()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
