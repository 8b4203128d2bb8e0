//! Hierarchical row sources.
//!
//! Parent/child links are stored as keys in an arena rather than as
//! references, so a node never owns its relatives.

use std::collections::{HashMap, HashSet};

use super::FlatRows;
use crate::error::{GridError, Result};
use crate::types::{FlatRow, RowKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub key: RowKey,
    pub parent: Option<RowKey>,
    pub children: Vec<RowKey>,
    /// Index into the caller's row slice
    pub source_index: usize,
    /// Shown expanded unless the host collapses it
    pub expanded_by_default: bool,
}

/// Arena of tree nodes keyed by row key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeArena {
    nodes: HashMap<RowKey, TreeNode>,
    roots: Vec<RowKey>,
}

impl TreeArena {
    /// Build from `(key, parent key, expanded by default)` per row.
    ///
    /// Children keep source order. A parent key that names no row makes the
    /// node a root. Duplicate keys and parent cycles are rejected.
    pub fn build<R>(
        rows: &[R],
        describe: impl Fn(&R) -> (RowKey, Option<RowKey>, bool),
    ) -> Result<Self> {
        let described: Vec<(RowKey, Option<RowKey>, bool)> = rows.iter().map(&describe).collect();

        let mut nodes: HashMap<RowKey, TreeNode> = HashMap::with_capacity(described.len());
        for (source_index, (key, parent, expanded_by_default)) in described.iter().enumerate() {
            let node = TreeNode {
                key: key.clone(),
                parent: parent.clone(),
                children: Vec::new(),
                source_index,
                expanded_by_default: *expanded_by_default,
            };
            if nodes.insert(key.clone(), node).is_some() {
                return Err(GridError::ConfigurationConflict(format!("duplicate row key '{key}'")));
            }
        }

        let mut roots = Vec::new();
        for (key, parent, _) in &described {
            match parent.as_ref().filter(|p| nodes.contains_key(*p)) {
                Some(parent) => {
                    if let Some(node) = nodes.get_mut(parent) {
                        node.children.push(key.clone());
                    }
                }
                None => {
                    if let Some(node) = nodes.get_mut(key) {
                        node.parent = None;
                    }
                    roots.push(key.clone());
                }
            }
        }

        let arena = Self { nodes, roots };
        arena.check_acyclic()?;
        Ok(arena)
    }

    fn check_acyclic(&self) -> Result<()> {
        let mut reachable = 0;
        let mut stack: Vec<&RowKey> = self.roots.iter().collect();
        while let Some(key) = stack.pop() {
            reachable += 1;
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.children.iter());
            }
        }
        if reachable != self.nodes.len() {
            return Err(GridError::ConfigurationConflict(
                "row parent links form a cycle".to_string(),
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: &RowKey) -> Option<&TreeNode> {
        self.nodes.get(key)
    }

    pub fn roots(&self) -> &[RowKey] {
        &self.roots
    }

    /// Ancestors of `key`, nearest first.
    pub fn ancestors(&self, key: &RowKey) -> Vec<RowKey> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(key).and_then(|n| n.parent.as_ref());
        while let Some(parent) = current {
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(parent.clone());
            current = self.nodes.get(parent).and_then(|n| n.parent.as_ref());
        }
        out
    }

    /// Effective expansion given host overrides.
    pub fn is_expanded(
        &self,
        key: &RowKey,
        expanded: &HashSet<RowKey>,
        collapsed: &HashSet<RowKey>,
    ) -> bool {
        expanded.contains(key)
            || (self.nodes.get(key).is_some_and(|n| n.expanded_by_default) && !collapsed.contains(key))
    }
}

/// Pre-order flattening of the visible part of the tree.
///
/// A node is expanded when its key is in `expanded`, or it is expanded by
/// default and not in `collapsed`.
pub fn flatten_tree(
    arena: &TreeArena,
    expanded: &HashSet<RowKey>,
    collapsed: &HashSet<RowKey>,
) -> FlatRows {
    let mut rows = Vec::with_capacity(arena.len());
    // (key, depth), reversed so pop yields source order
    let mut stack: Vec<(&RowKey, usize)> = arena.roots.iter().rev().map(|k| (k, 0)).collect();
    while let Some((key, depth)) = stack.pop() {
        let Some(node) = arena.get(key) else {
            continue;
        };
        let is_expanded = arena.is_expanded(key, expanded, collapsed);
        rows.push(FlatRow {
            depth,
            parent: node.parent.clone(),
            has_children: !node.children.is_empty(),
            expanded: is_expanded && !node.children.is_empty(),
            ..FlatRow::data(key.clone(), node.source_index)
        });
        if is_expanded {
            stack.extend(node.children.iter().rev().map(|k| (k, depth + 1)));
        }
    }
    FlatRows::new(rows)
}
