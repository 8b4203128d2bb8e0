//! Group-by flattening.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::FlatRows;
use crate::types::{FlatRow, GroupRow, RowKey, RowKind};

/// Host-supplied partitioning and aggregation. Both must be pure.
pub trait RowGrouper<R> {
    type Summary;

    /// Partition `rows` by the value of `column_key`.
    ///
    /// Returns `(group value, indices into rows)` in the order groups should
    /// be displayed.
    fn group(&self, rows: &[&R], column_key: &str) -> Vec<(String, Vec<usize>)>;

    /// Summary value for a group's data rows.
    fn aggregate(&self, rows: &[&R]) -> Self::Summary;
}

/// [`RowGrouper`] built from two closures.
pub struct GroupBy<G, A> {
    group: G,
    aggregate: A,
}

impl<G, A> GroupBy<G, A> {
    pub fn new(group: G, aggregate: A) -> Self {
        Self { group, aggregate }
    }
}

impl<R, S, G, A> RowGrouper<R> for GroupBy<G, A>
where
    G: Fn(&[&R], &str) -> Vec<(String, Vec<usize>)>,
    A: Fn(&[&R]) -> S,
{
    type Summary = S;

    fn group(&self, rows: &[&R], column_key: &str) -> Vec<(String, Vec<usize>)> {
        (self.group)(rows, column_key)
    }

    fn aggregate(&self, rows: &[&R]) -> S {
        (self.aggregate)(rows)
    }
}

/// Partition by a per-row value; groups appear in first-seen order.
pub fn group_by_value<R>(rows: &[&R], value_of: impl Fn(&R) -> String) -> Vec<(String, Vec<usize>)> {
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        let value = value_of(*row);
        match slot.get(&value) {
            Some(&s) => {
                if let Some((_, members)) = order.get_mut(s) {
                    members.push(i);
                }
            }
            None => {
                slot.insert(value.clone(), order.len());
                order.push((value, vec![i]));
            }
        }
    }
    order
}

/// Flattening switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Emit a summary row after each expanded group's children
    pub group_summaries: bool,
    /// Pinned summary rows above the body
    pub top_summaries: usize,
    /// Pinned summary rows below the body
    pub bottom_summaries: usize,
}

/// Flattened rows plus the eagerly computed group summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<S> {
    pub rows: FlatRows,
    pub summaries: HashMap<RowKey, S>,
}

struct Flattener<'a, R, G: RowGrouper<R>> {
    source: &'a [R],
    key_of: &'a dyn Fn(&R) -> RowKey,
    grouper: &'a G,
    group_by: &'a [String],
    expanded: &'a HashSet<RowKey>,
    options: FlattenOptions,
    rows: Vec<FlatRow>,
    groups: HashMap<RowKey, GroupRow>,
    summaries: HashMap<RowKey, G::Summary>,
    data_seen: usize,
}

impl<R, G: RowGrouper<R>> Flattener<'_, R, G> {
    /// Partition `members` (source indices) at `level`; returns the direct
    /// child keys and the number of data rows covered.
    fn partition(
        &mut self,
        members: &[usize],
        level: usize,
        parent: Option<&RowKey>,
        visible: bool,
    ) -> (Vec<RowKey>, usize) {
        let (source, group_by) = (self.source, self.group_by);
        let Some(column_key) = group_by.get(level) else {
            return self.emit_data(members, level, parent, visible);
        };

        let refs: Vec<&R> = members.iter().filter_map(|&i| source.get(i)).collect();
        let partitions = self.grouper.group(&refs, column_key);
        let set_size = partitions.len();
        let mut children = Vec::with_capacity(set_size);
        let mut total = 0;

        for (pos, (value, local)) in partitions.into_iter().enumerate() {
            let child_members: Vec<usize> = local
                .iter()
                .filter_map(|&l| members.get(l).copied())
                .collect();
            let id = RowKey::child_group(parent, &value);
            let expanded = self.expanded.contains(&id);
            let start_row_index = self.data_seen;

            if visible {
                self.rows.push(FlatRow {
                    has_children: !child_members.is_empty(),
                    expanded,
                    group: Some(id.clone()),
                    ..FlatRow::synthetic(
                        RowKey::group_header(&id),
                        RowKind::GroupHeader,
                        level,
                        parent.cloned(),
                    )
                });
            }

            let (grandchildren, count) =
                self.partition(&child_members, level + 1, Some(&id), visible && expanded);

            let child_refs: Vec<&R> = child_members
                .iter()
                .filter_map(|&i| source.get(i))
                .collect();
            let summary = self.grouper.aggregate(&child_refs);
            self.summaries.insert(id.clone(), summary);

            if visible && expanded && self.options.group_summaries {
                self.rows.push(FlatRow {
                    group: Some(id.clone()),
                    ..FlatRow::synthetic(
                        RowKey::group_summary(&id),
                        RowKind::GroupSummary,
                        level + 1,
                        Some(id.clone()),
                    )
                });
            }

            self.groups.insert(
                id.clone(),
                GroupRow {
                    id: id.clone(),
                    parent: parent.cloned(),
                    column_key: column_key.clone(),
                    value,
                    level,
                    child_count: count,
                    children: grandchildren,
                    expanded,
                    pos_in_set: pos + 1,
                    set_size,
                    start_row_index,
                },
            );
            total += count;
            children.push(id);
        }
        (children, total)
    }

    fn emit_data(
        &mut self,
        members: &[usize],
        depth: usize,
        parent: Option<&RowKey>,
        visible: bool,
    ) -> (Vec<RowKey>, usize) {
        let mut keys = Vec::with_capacity(members.len());
        let source = self.source;
        for &i in members {
            let Some(row) = source.get(i) else {
                continue;
            };
            let key = (self.key_of)(row);
            if visible {
                self.rows.push(FlatRow {
                    depth,
                    parent: parent.cloned(),
                    ..FlatRow::data(key.clone(), i)
                });
            }
            keys.push(key);
        }
        self.data_seen += keys.len();
        let count = keys.len();
        (keys, count)
    }
}

/// Flatten `rows` grouped by each key of `group_by` in turn.
///
/// A group's children (and its summary row) appear only when its id is in
/// `expanded` and every ancestor is expanded too. Counts and summaries are
/// computed for every group regardless. Re-flattening the same inputs
/// yields the same order; toggling one group never moves its siblings.
pub fn flatten_grouped<R, G: RowGrouper<R>>(
    rows: &[R],
    key_of: impl Fn(&R) -> RowKey,
    grouper: &G,
    group_by: &[String],
    expanded: &HashSet<RowKey>,
    options: FlattenOptions,
) -> Grouped<G::Summary> {
    let mut flattener = Flattener {
        source: rows,
        key_of: &key_of,
        grouper,
        group_by,
        expanded,
        options,
        rows: Vec::new(),
        groups: HashMap::new(),
        summaries: HashMap::new(),
        data_seen: 0,
    };
    let all: Vec<usize> = (0..rows.len()).collect();
    flattener.partition(&all, 0, None, true);

    debug!(
        rows = flattener.rows.len(),
        groups = flattener.groups.len(),
        "flattened grouped rows"
    );
    Grouped {
        rows: FlatRows::with_groups(flattener.rows, flattener.groups)
            .with_pinned(options.top_summaries, options.bottom_summaries),
        summaries: flattener.summaries,
    }
}
