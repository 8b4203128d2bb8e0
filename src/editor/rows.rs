//! Row selection by key.

use super::{Effect, NavContext};
use crate::types::{RowKey, RowKind, SelectionState};

impl SelectionState {
    /// Select or deselect the row at `row`.
    ///
    /// A group header applies to every data row under it, including rows
    /// hidden by collapsed groups. With `shift`, a data row applies to every
    /// data row between the last toggled row and this one.
    pub(super) fn select_row(
        &mut self,
        row: usize,
        selected: bool,
        shift: bool,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        let Some(target) = ctx.rows.get(row) else {
            return;
        };
        let keys = match target.kind {
            RowKind::Data => {
                let anchor = if shift {
                    self.row_anchor.as_ref().and_then(|key| ctx.rows.position(key))
                } else {
                    None
                };
                self.row_anchor = Some(target.key.clone());
                match anchor {
                    Some(from) => (from.min(row)..=from.max(row))
                        .filter_map(|i| ctx.rows.get(i))
                        .filter(|r| r.is_data())
                        .map(|r| r.key.clone())
                        .collect(),
                    None => vec![target.key.clone()],
                }
            }
            RowKind::GroupHeader => match &target.group {
                Some(id) => ctx.rows.group_data_keys(id),
                None => Vec::new(),
            },
            RowKind::GroupSummary | RowKind::TopSummary | RowKind::BottomSummary => return,
        };
        self.apply_row_selection(keys, selected, ctx, effects);
    }

    /// Select every data row, or clear the row selection.
    pub(super) fn select_all_rows(&mut self, selected: bool, ctx: &NavContext<'_>, effects: &mut Vec<Effect>) {
        self.row_anchor = None;
        if selected {
            let keys = ctx.rows.all_data_keys();
            self.apply_row_selection(keys, true, ctx, effects);
        } else if !self.selected_rows.is_empty() {
            self.selected_rows.clear();
            effects.push(Effect::RowSelectionChanged { keys: Vec::new() });
        }
    }

    fn apply_row_selection(
        &mut self,
        keys: impl IntoIterator<Item = RowKey>,
        selected: bool,
        ctx: &NavContext<'_>,
        effects: &mut Vec<Effect>,
    ) {
        let mut changed = false;
        for key in keys {
            if !ctx.values.is_row_selectable(&key) {
                continue;
            }
            changed |= if selected {
                self.selected_rows.insert(key)
            } else {
                self.selected_rows.remove(&key)
            };
        }
        if changed {
            effects.push(Effect::RowSelectionChanged {
                keys: self.selected_rows.iter().cloned().collect(),
            });
        }
    }
}
