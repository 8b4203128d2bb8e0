//! Row grouping and flattening.
//!
//! Grouped and hierarchical row sources are reduced to one flat, stably
//! ordered sequence of [`FlatRow`]s that the viewport can index directly.
//! Rows are never copied: data entries carry an index into the caller's
//! slice.

mod grouped;
mod tree;

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use grouped::{flatten_grouped, group_by_value, FlattenOptions, GroupBy, Grouped, RowGrouper};
pub use tree::{flatten_tree, TreeArena, TreeNode};

use crate::types::{FlatRow, GroupRow, RowKey, RowKind};

/// Host-toggled expansion overrides.
///
/// Group rows are collapsed unless listed in `expanded`. Tree nodes that are
/// expanded by default stay so unless listed in `collapsed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Expansion {
    pub expanded: HashSet<RowKey>,
    pub collapsed: HashSet<RowKey>,
}

impl Expansion {
    pub fn expanded<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<RowKey>,
    {
        Self {
            expanded: keys.into_iter().map(Into::into).collect(),
            collapsed: HashSet::new(),
        }
    }

    /// Flip `key` given whether it is currently shown expanded.
    pub fn toggle(&mut self, key: &RowKey, currently_expanded: bool) {
        if currently_expanded {
            self.expanded.remove(key);
            self.collapsed.insert(key.clone());
        } else {
            self.collapsed.remove(key);
            self.expanded.insert(key.clone());
        }
    }
}

/// The flat row sequence plus everything needed to look rows up by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRows {
    rows: Vec<FlatRow>,
    index: HashMap<RowKey, usize>,
    /// Every group, including ones hidden inside collapsed ancestors
    groups: HashMap<RowKey, GroupRow>,
    top: Vec<FlatRow>,
    bottom: Vec<FlatRow>,
}

impl FlatRows {
    /// Wrap an already flat sequence.
    pub fn new(rows: Vec<FlatRow>) -> Self {
        Self::with_groups(rows, HashMap::new())
    }

    pub(crate) fn with_groups(rows: Vec<FlatRow>, groups: HashMap<RowKey, GroupRow>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match index.entry(row.key.clone()) {
                Entry::Occupied(first) => {
                    warn!(key = %row.key, first = *first.get(), duplicate = i, "duplicate row key");
                }
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
            }
        }
        Self {
            rows,
            index,
            groups,
            top: Vec::new(),
            bottom: Vec::new(),
        }
    }

    /// Ungrouped data rows in source order.
    pub fn from_rows<R>(rows: &[R], key_of: impl Fn(&R) -> RowKey) -> Self {
        Self::new(
            rows.iter()
                .enumerate()
                .map(|(i, row)| FlatRow::data(key_of(row), i))
                .collect(),
        )
    }

    /// Attach `top` and `bottom` pinned summary rows.
    #[must_use]
    pub fn with_pinned(mut self, top: usize, bottom: usize) -> Self {
        self.top = (0..top)
            .map(|i| FlatRow::synthetic(RowKey::new(format!("summary:top:{i}")), RowKind::TopSummary, 0, None))
            .collect();
        self.bottom = (0..bottom)
            .map(|i| {
                FlatRow::synthetic(RowKey::new(format!("summary:bottom:{i}")), RowKind::BottomSummary, 0, None)
            })
            .collect();
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlatRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatRow> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.iter().map(|row| &row.key)
    }

    /// Position of `key` in the body sequence.
    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn group(&self, id: &RowKey) -> Option<&GroupRow> {
        self.groups.get(id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupRow> {
        self.groups.values()
    }

    /// Data row keys under group `id` at any depth, collapsed or not.
    pub fn group_data_keys(&self, id: &RowKey) -> Vec<RowKey> {
        let mut keys = Vec::new();
        self.collect_group_data(id, &mut keys);
        keys
    }

    fn collect_group_data(&self, id: &RowKey, out: &mut Vec<RowKey>) {
        let Some(group) = self.groups.get(id) else {
            return;
        };
        for child in &group.children {
            match self.groups.get(child) {
                Some(nested) if nested.parent.as_ref() == Some(id) => self.collect_group_data(child, out),
                _ => out.push(child.clone()),
            }
        }
    }

    /// Every data row key: visible data rows plus rows hidden in collapsed
    /// groups. Children of collapsed tree nodes are not part of the sequence.
    pub fn all_data_keys(&self) -> BTreeSet<RowKey> {
        let mut keys: BTreeSet<RowKey> = self.rows.iter().filter(|r| r.is_data()).map(|r| r.key.clone()).collect();
        for group in self.groups.values().filter(|g| g.parent.is_none()) {
            keys.extend(self.group_data_keys(&group.id));
        }
        keys
    }

    /// Pinned rows above the body.
    pub fn top(&self) -> &[FlatRow] {
        &self.top
    }

    /// Pinned rows below the body.
    pub fn bottom(&self) -> &[FlatRow] {
        &self.bottom
    }

    /// Source indices of every data row, in display order.
    pub fn data_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().filter_map(|row| row.source_index)
    }
}
