use serde::{Deserialize, Serialize};

/// Declared width of a column before layout resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ColumnWidth {
    /// Fixed width in pixels
    Fixed(f32),
    /// Percentage (0-100) of the available width
    Percent(f32),
    /// Sized to measured content; shares leftover space like `Flex(1.0)` until measured
    #[default]
    Auto,
    /// Share of the leftover width, proportional to the fraction
    Flex(f32),
}

/// Edge a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FrozenSide {
    /// Scrolls with the body (default)
    #[default]
    None,
    /// Pinned to the start edge (left in LTR)
    Start,
    /// Pinned to the end edge (right in LTR)
    End,
}

/// A leaf column declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique key across the flattened column set
    pub key: String,
    /// Header label
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: ColumnWidth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(default)]
    pub frozen: FrozenSide,
    #[serde(default)]
    pub sortable: bool,
    /// First header click sorts descending instead of ascending
    #[serde(default)]
    pub sort_descending_first: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    /// Whether keyboard focus may land on this column
    #[serde(default = "default_true")]
    pub selectable: bool,
    #[serde(default = "default_true")]
    pub resizable: bool,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// Create a column with default settings (auto width, unfrozen, editable).
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            width: ColumnWidth::Auto,
            min_width: None,
            max_width: None,
            frozen: FrozenSide::None,
            sortable: false,
            sort_descending_first: false,
            editable: true,
            selectable: true,
            resizable: true,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn fixed(self, px: f32) -> Self {
        self.width(ColumnWidth::Fixed(px))
    }

    #[must_use]
    pub fn flex(self, fraction: f32) -> Self {
        self.width(ColumnWidth::Flex(fraction))
    }

    #[must_use]
    pub fn min_width(mut self, px: f32) -> Self {
        self.min_width = Some(px);
        self
    }

    #[must_use]
    pub fn max_width(mut self, px: f32) -> Self {
        self.max_width = Some(px);
        self
    }

    #[must_use]
    pub fn frozen(mut self, side: FrozenSide) -> Self {
        self.frozen = side;
        self
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    #[must_use]
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Effective `[min, max]` clamp given the grid-wide default minimum.
    pub fn width_bounds(&self, default_min: f32) -> (f32, f32) {
        let min = self.min_width.unwrap_or(default_min).max(0.0);
        let max = self.max_width.unwrap_or(f32::INFINITY).max(min);
        (min, max)
    }
}

/// A named header spanning child columns or groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnGroup {
    pub name: String,
    pub children: Vec<ColumnDef>,
}

impl ColumnGroup {
    pub fn new(name: impl Into<String>, children: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// Node of the column declaration tree; leaves are columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnDef {
    Group(ColumnGroup),
    Column(Column),
}

impl From<Column> for ColumnDef {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<ColumnGroup> for ColumnDef {
    fn from(group: ColumnGroup) -> Self {
        Self::Group(group)
    }
}
