use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a row within the flat sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Composite id of a group nested under `parent` (`USA__2020`).
    pub fn child_group(parent: Option<&RowKey>, value: &str) -> Self {
        match parent {
            Some(parent) => Self(format!("{}__{value}", parent.0)),
            None => Self(value.to_string()),
        }
    }

    /// Key of the header row of `group` (`group:USA__2020`).
    pub fn group_header(group: &RowKey) -> Self {
        Self(format!("group:{}", group.0))
    }

    /// Key of the summary row emitted after an expanded group.
    pub fn group_summary(group: &RowKey) -> Self {
        Self(format!("summary:{}", group.0))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u32> for RowKey {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl From<u64> for RowKey {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<usize> for RowKey {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}

impl From<i64> for RowKey {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// What a flat row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Data,
    GroupHeader,
    GroupSummary,
    TopSummary,
    BottomSummary,
}

/// One entry of the flattened row sequence.
///
/// Data rows point back into the caller's row slice through `source_index`;
/// the record itself is never copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRow {
    pub key: RowKey,
    pub kind: RowKind,
    /// Nesting depth (0 = top level)
    pub depth: usize,
    /// Enclosing group or tree parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<RowKey>,
    /// Index into the caller's row slice (data rows only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    /// Tree rows: whether the node has children
    #[serde(default)]
    pub has_children: bool,
    /// Group headers and tree rows: whether the children are shown
    #[serde(default)]
    pub expanded: bool,
    /// Group headers and summaries: id of the group they belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<RowKey>,
}

impl FlatRow {
    /// A plain, ungrouped data row.
    pub fn data(key: RowKey, source_index: usize) -> Self {
        Self {
            key,
            kind: RowKind::Data,
            depth: 0,
            parent: None,
            source_index: Some(source_index),
            has_children: false,
            expanded: false,
            group: None,
        }
    }

    pub(crate) fn synthetic(key: RowKey, kind: RowKind, depth: usize, parent: Option<RowKey>) -> Self {
        Self {
            key,
            kind,
            depth,
            parent,
            source_index: None,
            has_children: false,
            expanded: false,
            group: None,
        }
    }

    pub fn is_data(&self) -> bool {
        self.kind == RowKind::Data
    }

    pub fn is_group(&self) -> bool {
        self.kind == RowKind::GroupHeader
    }

    /// Key that expansion state is recorded under: the group id for group
    /// headers, the row key for tree rows.
    pub fn expansion_key(&self) -> &RowKey {
        self.group.as_ref().unwrap_or(&self.key)
    }
}

/// Metadata of a synthetic group, kept for every group whether or not it is
/// currently visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRow {
    /// Composite id of ancestor values and this group's value
    pub id: RowKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<RowKey>,
    /// Group-by column this level partitions on
    pub column_key: String,
    /// Group value shared by the children
    pub value: String,
    pub level: usize,
    /// Number of data rows under this group, at any depth
    pub child_count: usize,
    /// Direct children: nested group ids or data row keys
    pub children: Vec<RowKey>,
    pub expanded: bool,
    /// 1-based position among sibling groups
    pub pos_in_set: usize,
    pub set_size: usize,
    /// Number of data rows that precede this group's first data row in grouped order
    pub start_row_index: usize,
}
