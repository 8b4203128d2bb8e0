//! Column layout engine.
//!
//! Flattens the column declaration tree into an ordered leaf set (start-frozen,
//! unfrozen, end-frozen), resolves declared widths into pixels, and applies
//! resize and reorder operations. Every operation returns a new value; the
//! input is left untouched so a rejected operation is a no-op by construction.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use crate::config::Direction;
use crate::error::{GridError, Result};
use crate::types::{Column, ColumnDef, ColumnWidth, FrozenSide};

/// A leaf column with its ancestor group path (outermost first).
#[derive(Debug, Clone, PartialEq)]
pub struct LeafColumn {
    pub column: Column,
    pub groups: Vec<String>,
}

impl LeafColumn {
    pub fn key(&self) -> &str {
        &self.column.key
    }

    /// Parent group name, if any.
    pub fn parent(&self) -> Option<&str> {
        self.groups.last().map(String::as_str)
    }
}

/// A header cell spanning a contiguous run of leaf columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSpan {
    pub name: String,
    /// Header row the span sits on (0 = outermost)
    pub level: usize,
    pub start: usize,
    pub span: usize,
}

/// Ordered leaf columns with frozen bands.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSet {
    columns: Vec<LeafColumn>,
    frozen_start: usize,
    frozen_end: usize,
    group_depth: usize,
}

impl ColumnSet {
    /// Flatten a declaration tree.
    ///
    /// Fails with `ConfigurationConflict` on duplicate keys.
    pub fn new(defs: &[ColumnDef]) -> Result<Self> {
        let mut leaves = Vec::new();
        let mut path = Vec::new();
        let mut depth = 0;
        collect_leaves(defs, &mut path, &mut leaves, &mut depth);
        Self::from_leaves(leaves, depth)
    }

    /// Flat declaration without groups.
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let leaves = columns
            .into_iter()
            .map(|column| LeafColumn {
                column,
                groups: Vec::new(),
            })
            .collect();
        Self::from_leaves(leaves, 0)
    }

    fn from_leaves(leaves: Vec<LeafColumn>, group_depth: usize) -> Result<Self> {
        let mut seen = HashSet::new();
        for leaf in &leaves {
            if !seen.insert(leaf.column.key.as_str()) {
                return Err(GridError::ConfigurationConflict(format!(
                    "duplicate column key '{}'",
                    leaf.column.key
                )));
            }
        }

        // Stable partition: start-frozen, unfrozen, end-frozen
        let mut start = Vec::new();
        let mut middle = Vec::new();
        let mut end = Vec::new();
        for leaf in leaves {
            match leaf.column.frozen {
                FrozenSide::Start => start.push(leaf),
                FrozenSide::None => middle.push(leaf),
                FrozenSide::End => end.push(leaf),
            }
        }
        let frozen_start = start.len();
        let frozen_end = end.len();
        let mut columns = start;
        columns.extend(middle);
        columns.extend(end);

        Ok(Self {
            columns,
            frozen_start,
            frozen_end,
            group_depth,
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LeafColumn> {
        self.columns.get(index)
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index).map(|leaf| &leaf.column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LeafColumn> {
        self.columns.iter()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|leaf| leaf.column.key == key)
    }

    /// Column keys in display order.
    pub fn order(&self) -> Vec<String> {
        self.columns.iter().map(|leaf| leaf.column.key.clone()).collect()
    }

    pub fn frozen_start_count(&self) -> usize {
        self.frozen_start
    }

    pub fn frozen_end_count(&self) -> usize {
        self.frozen_end
    }

    /// Index range of the scrollable band.
    pub fn unfrozen_range(&self) -> std::ops::Range<usize> {
        self.frozen_start..self.columns.len() - self.frozen_end
    }

    pub fn frozen_side(&self, index: usize) -> FrozenSide {
        self.column(index).map_or(FrozenSide::None, |c| c.frozen)
    }

    /// Number of header rows: one per group level plus the leaf row.
    pub fn header_row_count(&self) -> usize {
        self.group_depth + 1
    }

    /// Group header cells for the current order.
    ///
    /// Adjacent leaves sharing the same ancestor prefix at a level merge
    /// into a single span.
    pub fn header_spans(&self) -> Vec<HeaderSpan> {
        let mut spans: Vec<HeaderSpan> = Vec::new();
        for level in 0..self.group_depth {
            let mut open: Option<(&[String], HeaderSpan)> = None;
            for (index, leaf) in self.columns.iter().enumerate() {
                let prefix = leaf.groups.get(..=level);
                if let (Some((path, span)), Some(prefix)) = (open.as_mut(), prefix) {
                    if *path == prefix {
                        span.span += 1;
                        continue;
                    }
                }
                if let Some((_, span)) = open.take() {
                    spans.push(span);
                }
                if let (Some(prefix), Some(name)) = (prefix, leaf.groups.get(level)) {
                    let span = HeaderSpan {
                        name: name.clone(),
                        level,
                        start: index,
                        span: 1,
                    };
                    open = Some((prefix, span));
                }
            }
            if let Some((_, span)) = open {
                spans.push(span);
            }
        }
        spans
    }

    /// Move `source` to the position of `target`.
    ///
    /// Rejected when the two columns sit in different frozen bands or under
    /// different parent groups.
    pub fn reorder(&self, source: &str, target: &str) -> Result<Self> {
        let from = self
            .index_of(source)
            .ok_or_else(|| GridError::ConfigurationConflict(format!("unknown column '{source}'")))?;
        let to = self
            .index_of(target)
            .ok_or_else(|| GridError::ConfigurationConflict(format!("unknown column '{target}'")))?;
        if from == to {
            return Ok(self.clone());
        }
        let (Some(a), Some(b)) = (self.get(from), self.get(to)) else {
            return Err(GridError::InvalidRange { row: 0, col: from.max(to) });
        };
        if a.column.frozen != b.column.frozen {
            return Err(GridError::ConfigurationConflict(format!(
                "cannot move '{source}' across the frozen boundary"
            )));
        }
        if a.parent() != b.parent() {
            return Err(GridError::ConfigurationConflict(format!(
                "cannot move '{source}' out of its column group"
            )));
        }

        let mut columns = self.columns.clone();
        let moved = columns.remove(from);
        columns.insert(to, moved);
        Ok(Self {
            columns,
            ..self.clone()
        })
    }

    /// Apply a saved column order. Unknown keys are ignored and missing
    /// columns keep their relative order at the end of their band.
    pub fn with_order(&self, order: &[String]) -> Result<Self> {
        let rank: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, key)| (key.as_str(), i))
            .collect();
        let mut leaves = self.columns.clone();
        leaves.sort_by_key(|leaf| rank.get(leaf.column.key.as_str()).copied().unwrap_or(usize::MAX));
        let reordered = Self::from_leaves(leaves, self.group_depth)?;
        if reordered.breaks_groups() {
            return Err(GridError::ConfigurationConflict(
                "saved column order splits a column group".to_string(),
            ));
        }
        Ok(reordered)
    }

    /// True if any group's leaves are no longer contiguous.
    fn breaks_groups(&self) -> bool {
        (0..self.group_depth).any(|level| {
            let mut closed: HashSet<&[String]> = HashSet::new();
            let mut open: Option<&[String]> = None;
            for leaf in &self.columns {
                let prefix = leaf.groups.get(..=level);
                if prefix == open {
                    continue;
                }
                if let Some(prev) = open {
                    closed.insert(prev);
                }
                if prefix.is_some_and(|p| closed.contains(p)) {
                    return true;
                }
                open = prefix;
            }
            false
        })
    }
}

fn collect_leaves(
    defs: &[ColumnDef],
    path: &mut Vec<String>,
    out: &mut Vec<LeafColumn>,
    depth: &mut usize,
) {
    for def in defs {
        match def {
            ColumnDef::Column(column) => {
                *depth = (*depth).max(path.len());
                out.push(LeafColumn {
                    column: column.clone(),
                    groups: path.clone(),
                });
            }
            ColumnDef::Group(group) => {
                path.push(group.name.clone());
                collect_leaves(&group.children, path, out, depth);
                path.pop();
            }
        }
    }
}

/// Width inputs that are not part of the declarations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnSizing {
    /// Widths set by resize drags; replace the declared width
    pub overrides: HashMap<String, f32>,
    /// Measured content widths for `Auto` columns
    pub measured: HashMap<String, f32>,
}

/// Resolve declared widths into pixels, aligned with column indices.
///
/// Fixed and percentage columns take their share first; the remainder is
/// split between flexible columns by fraction. Clamped widths never go
/// below a column's minimum, so the total may exceed `available` (the grid
/// scrolls horizontally).
pub fn resolve_column_widths(
    columns: &ColumnSet,
    available: f32,
    sizing: &ColumnSizing,
    default_min: f32,
) -> Vec<f32> {
    let available = if available.is_finite() { available.max(0.0) } else { 0.0 };
    let mut widths = vec![0.0_f32; columns.len()];
    // (index, fraction, min, max)
    let mut flexible: Vec<(usize, f32, f32, f32)> = Vec::new();
    let mut used = 0.0_f32;

    for (index, (leaf, slot)) in columns.iter().zip(widths.iter_mut()).enumerate() {
        let column = &leaf.column;
        let (min, max) = column.width_bounds(default_min);
        let declared = sizing
            .overrides
            .get(&column.key)
            .map_or(column.width, |&px| ColumnWidth::Fixed(px));
        let width = match declared {
            ColumnWidth::Fixed(px) => Some(px),
            ColumnWidth::Percent(pct) => Some(available * pct / 100.0),
            ColumnWidth::Auto => sizing.measured.get(&column.key).copied(),
            ColumnWidth::Flex(_) => None,
        };
        match width {
            Some(px) => {
                *slot = clamp_width(px, min, max);
                used += *slot;
            }
            None => {
                let fraction = match declared {
                    ColumnWidth::Flex(fr) if fr.is_finite() && fr > 0.0 => fr,
                    ColumnWidth::Flex(_) => 0.0,
                    _ => 1.0,
                };
                flexible.push((index, fraction, min, max));
            }
        }
    }

    let mut remaining = (available - used).max(0.0);
    // Resolve flexible lengths, freezing clamp violators until none remain.
    while !flexible.is_empty() {
        let total_fraction: f32 = flexible.iter().map(|f| f.1).sum();
        let targets: Vec<f32> = flexible
            .iter()
            .map(|&(_, fr, _, _)| {
                if total_fraction > 0.0 {
                    remaining * fr / total_fraction
                } else {
                    0.0
                }
            })
            .collect();
        let violation: f32 = flexible
            .iter()
            .zip(&targets)
            .map(|(&(_, _, min, max), &t)| t.clamp(min, max) - t)
            .sum();

        if violation.abs() <= f32::EPSILON {
            for (&(index, _, min, max), &t) in flexible.iter().zip(&targets) {
                if let Some(slot) = widths.get_mut(index) {
                    *slot = t.clamp(min, max);
                }
            }
            break;
        }

        // Freeze min violators when space is short, max violators when it is in excess.
        let mut next = Vec::with_capacity(flexible.len());
        for (&(index, fr, min, max), &t) in flexible.iter().zip(&targets) {
            let frozen = if violation > 0.0 { t < min } else { t > max };
            if frozen {
                let px = t.clamp(min, max);
                if let Some(slot) = widths.get_mut(index) {
                    *slot = px;
                }
                remaining = (remaining - px).max(0.0);
            } else {
                next.push((index, fr, min, max));
            }
        }
        flexible = next;
    }

    widths
}

/// Resolved pixel width per column key.
pub fn resolve_widths(
    columns: &ColumnSet,
    available: f32,
    sizing: &ColumnSizing,
    default_min: f32,
) -> HashMap<String, f32> {
    columns
        .iter()
        .zip(resolve_column_widths(columns, available, sizing, default_min))
        .map(|(leaf, width)| (leaf.column.key.clone(), width))
        .collect()
}

fn clamp_width(px: f32, min: f32, max: f32) -> f32 {
    if px.is_finite() {
        px.clamp(min, max)
    } else {
        min
    }
}

/// Resolved horizontal geometry: widths plus the cumulative offset table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    widths: Vec<f32>,
    /// `offsets[i]` = x of column i's start edge, plus a final edge
    offsets: Vec<f32>,
    frozen_start: usize,
    frozen_end: usize,
}

impl ColumnLayout {
    pub fn new(columns: &ColumnSet, widths: Vec<f32>) -> Self {
        let mut offsets = Vec::with_capacity(widths.len() + 1);
        let mut x = 0.0_f32;
        for w in &widths {
            offsets.push(x);
            x += w;
        }
        offsets.push(x);
        Self {
            widths,
            offsets,
            frozen_start: columns.frozen_start_count(),
            frozen_end: columns.frozen_end_count(),
        }
    }

    /// Resolve and lay out in one step.
    pub fn resolve(
        columns: &ColumnSet,
        available: f32,
        sizing: &ColumnSizing,
        default_min: f32,
    ) -> Self {
        Self::new(columns, resolve_column_widths(columns, available, sizing, default_min))
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    pub fn column_width(&self, index: usize) -> f32 {
        self.widths.get(index).copied().unwrap_or(0.0)
    }

    /// Start edge of column `index` in content coordinates.
    pub fn column_offset(&self, index: usize) -> f32 {
        self.offsets
            .get(index.min(self.widths.len()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total_width(&self) -> f32 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    pub fn frozen_start_count(&self) -> usize {
        self.frozen_start
    }

    pub fn frozen_end_count(&self) -> usize {
        self.frozen_end
    }

    /// Width of the start-pinned band.
    pub fn frozen_start_width(&self) -> f32 {
        self.column_offset(self.frozen_start)
    }

    /// Width of the end-pinned band.
    pub fn frozen_end_width(&self) -> f32 {
        self.total_width() - self.column_offset(self.widths.len() - self.frozen_end)
    }

    /// Sticky inset of a pinned column from its own edge of the viewport:
    /// distance from the start edge for start-frozen columns, from the end
    /// edge for end-frozen ones. `None` for scrolling columns.
    pub fn frozen_inset(&self, index: usize) -> Option<f32> {
        let end_band = self.widths.len() - self.frozen_end;
        if index < self.frozen_start {
            Some(self.column_offset(index))
        } else if index >= end_band && index < self.widths.len() {
            Some(self.total_width() - self.column_offset(index + 1))
        } else {
            None
        }
    }

    /// Physical x of a column's left edge for the layout direction.
    pub fn physical_left(&self, index: usize, direction: Direction) -> f32 {
        match direction {
            Direction::Ltr => self.column_offset(index),
            Direction::Rtl => {
                self.total_width() - self.column_offset(index) - self.column_width(index)
            }
        }
    }

    /// Column containing the content x position.
    pub fn col_at_x(&self, x: f32) -> Option<usize> {
        if self.widths.is_empty() || x < 0.0 || !x.is_finite() {
            return None;
        }
        let ends = self.offsets.get(1..).unwrap_or_default();
        let index = ends.partition_point(|&end| end <= x);
        (index < self.widths.len()).then_some(index)
    }

    /// First column in `band` whose end edge lies past `x`.
    pub(crate) fn first_ending_after(&self, band: std::ops::Range<usize>, x: f32) -> usize {
        let ends = self
            .offsets
            .get(band.start + 1..band.end + 1)
            .unwrap_or_default();
        band.start + ends.partition_point(|&end| end <= x)
    }

    /// Number of columns in `band` (counted from its start) whose start edge lies before `x`.
    pub(crate) fn starting_before(&self, band: std::ops::Range<usize>, x: f32) -> usize {
        let starts = self.offsets.get(band.clone()).unwrap_or_default();
        band.start + starts.partition_point(|&start| start < x)
    }
}

/// Grid-wide inputs to a resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeLimits {
    /// Viewport width available to the columns
    pub available: f32,
    pub default_min: f32,
    /// Neighbour absorbs the change
    pub push: bool,
}

/// Resize `key` to `width`, returning the new sizing.
///
/// The width is clamped to the column's `[min, max]`. A frozen column is
/// additionally capped so its band never exceeds `available`. With
/// `push`, the next column in the same band absorbs the change (down to its
/// own bounds); otherwise no other column changes.
pub fn resize_column(
    columns: &ColumnSet,
    layout: &ColumnLayout,
    sizing: &ColumnSizing,
    key: &str,
    width: f32,
    limits: ResizeLimits,
) -> Result<ColumnSizing> {
    let ResizeLimits {
        available,
        default_min,
        push,
    } = limits;
    let index = columns
        .index_of(key)
        .ok_or_else(|| GridError::ConfigurationConflict(format!("unknown column '{key}'")))?;
    let column = columns
        .column(index)
        .ok_or(GridError::InvalidRange { row: 0, col: index })?;
    if !column.resizable {
        return Err(GridError::ConfigurationConflict(format!(
            "column '{key}' is not resizable"
        )));
    }
    if !width.is_finite() || width < 0.0 {
        return Err(GridError::ConfigurationConflict(format!(
            "invalid width {width} for column '{key}'"
        )));
    }

    let (min, mut max) = column.width_bounds(default_min);
    let current = layout.column_width(index);
    match column.frozen {
        FrozenSide::Start | FrozenSide::End => {
            let band = match column.frozen {
                FrozenSide::Start => layout.frozen_start_width(),
                _ => layout.frozen_end_width(),
            };
            let others = band - current;
            max = max.min((available - others).max(min));
        }
        FrozenSide::None => {}
    }
    let mut target = width.clamp(min, max);

    let mut next = sizing.clone();
    if push {
        let neighbour = index + 1;
        let same_band = columns
            .column(neighbour)
            .is_some_and(|c| c.frozen == column.frozen && c.resizable);
        if same_band {
            if let Some(other) = columns.column(neighbour) {
                let (other_min, other_max) = other.width_bounds(default_min);
                let other_current = layout.column_width(neighbour);
                let delta = target - current;
                let other_target = (other_current - delta).clamp(other_min, other_max);
                // Limit our change to what the neighbour could absorb.
                target = current + (other_current - other_target);
                next.overrides.insert(other.key.clone(), other_target);
            }
        }
    }
    next.overrides.insert(key.to_string(), target);
    Ok(next)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::ColumnGroup;

    fn limits(available: f32, push: bool) -> ResizeLimits {
        ResizeLimits {
            available,
            default_min: 50.0,
            push,
        }
    }

    fn set(columns: Vec<Column>) -> ColumnSet {
        ColumnSet::from_columns(columns).unwrap()
    }

    #[test]
    fn test_frozen_and_flex_example() {
        let columns = set(vec![
            Column::new("a").fixed(100.0).frozen(FrozenSide::Start),
            Column::new("b").flex(1.0),
            Column::new("c").flex(1.0),
        ]);
        let widths = resolve_widths(&columns, 500.0, &ColumnSizing::default(), 50.0);
        assert_eq!(widths["a"], 100.0);
        assert_eq!(widths["b"], 200.0);
        assert_eq!(widths["c"], 200.0);
    }

    #[test]
    fn test_frozen_columns_move_to_their_bands() {
        let columns = set(vec![
            Column::new("x"),
            Column::new("end").frozen(FrozenSide::End),
            Column::new("y"),
            Column::new("s1").frozen(FrozenSide::Start),
            Column::new("s2").frozen(FrozenSide::Start),
        ]);
        assert_eq!(columns.order(), vec!["s1", "s2", "x", "y", "end"]);
        assert_eq!(columns.unfrozen_range(), 2..4);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = ColumnSet::from_columns(vec![Column::new("a"), Column::new("a")]);
        assert!(matches!(result, Err(GridError::ConfigurationConflict(_))));
    }

    #[test]
    fn test_percent_and_flex_clamps() {
        let columns = set(vec![
            Column::new("p").width(ColumnWidth::Percent(10.0)),
            Column::new("f1").flex(1.0).max_width(100.0),
            Column::new("f2").flex(1.0),
        ]);
        let widths = resolve_column_widths(&columns, 1000.0, &ColumnSizing::default(), 50.0);
        assert_eq!(widths, vec![100.0, 100.0, 800.0]);
    }

    #[test]
    fn test_overflow_keeps_minimums() {
        let columns = set(vec![
            Column::new("a").fixed(300.0),
            Column::new("b").flex(1.0).min_width(80.0),
            Column::new("c").flex(2.0),
        ]);
        let widths = resolve_column_widths(&columns, 320.0, &ColumnSizing::default(), 50.0);
        assert_eq!(widths, vec![300.0, 80.0, 50.0]);
        let layout = ColumnLayout::new(&columns, widths);
        assert!(layout.total_width() > 320.0);
    }

    #[test]
    fn test_auto_uses_measurement() {
        let columns = set(vec![Column::new("a"), Column::new("b")]);
        let mut sizing = ColumnSizing::default();
        sizing.measured.insert("a".into(), 120.0);
        let widths = resolve_column_widths(&columns, 400.0, &sizing, 50.0);
        assert_eq!(widths, vec![120.0, 280.0]);
    }

    #[test]
    fn test_layout_offsets_and_insets() {
        let columns = set(vec![
            Column::new("a").fixed(50.0).frozen(FrozenSide::Start),
            Column::new("b").fixed(100.0),
            Column::new("c").fixed(60.0).frozen(FrozenSide::End),
            Column::new("d").fixed(40.0).frozen(FrozenSide::End),
        ]);
        let layout = ColumnLayout::resolve(&columns, 0.0, &ColumnSizing::default(), 10.0);
        assert_eq!(layout.column_offset(2), 150.0);
        assert_eq!(layout.total_width(), 250.0);
        assert_eq!(layout.frozen_start_width(), 50.0);
        assert_eq!(layout.frozen_end_width(), 100.0);
        assert_eq!(layout.frozen_inset(0), Some(0.0));
        assert_eq!(layout.frozen_inset(2), Some(40.0));
        assert_eq!(layout.frozen_inset(3), Some(0.0));
        assert_eq!(layout.frozen_inset(1), None);
        assert_eq!(layout.physical_left(0, Direction::Rtl), 200.0);
        assert_eq!(layout.col_at_x(149.0), Some(1));
    }

    #[test]
    fn test_resize_clamps_and_does_not_push() {
        let columns = set(vec![
            Column::new("a").fixed(100.0).min_width(60.0).max_width(200.0),
            Column::new("b").fixed(100.0),
        ]);
        let sizing = ColumnSizing::default();
        let layout = ColumnLayout::resolve(&columns, 500.0, &sizing, 50.0);

        let next = resize_column(&columns, &layout, &sizing, "a", 10.0, limits(500.0, false)).unwrap();
        assert_eq!(next.overrides["a"], 60.0);
        assert!(!next.overrides.contains_key("b"));

        let next = resize_column(&columns, &layout, &sizing, "a", 900.0, limits(500.0, false)).unwrap();
        assert_eq!(next.overrides["a"], 200.0);
    }

    #[test]
    fn test_push_resize_limited_by_neighbour() {
        let columns = set(vec![Column::new("a").fixed(100.0), Column::new("b").fixed(100.0)]);
        let sizing = ColumnSizing::default();
        let layout = ColumnLayout::resolve(&columns, 500.0, &sizing, 50.0);

        let next = resize_column(&columns, &layout, &sizing, "a", 180.0, limits(500.0, true)).unwrap();
        assert_eq!(next.overrides["a"], 150.0);
        assert_eq!(next.overrides["b"], 50.0);
    }

    #[test]
    fn test_frozen_resize_capped_by_available_width() {
        let columns = set(vec![
            Column::new("a").fixed(100.0).frozen(FrozenSide::Start),
            Column::new("b").fixed(100.0).frozen(FrozenSide::Start),
            Column::new("c").fixed(100.0),
        ]);
        let sizing = ColumnSizing::default();
        let layout = ColumnLayout::resolve(&columns, 300.0, &sizing, 50.0);
        let next = resize_column(&columns, &layout, &sizing, "b", 1000.0, limits(300.0, false)).unwrap();
        assert_eq!(next.overrides["b"], 200.0);
    }

    #[test]
    fn test_reorder_rules() {
        let columns = set(vec![
            Column::new("f").frozen(FrozenSide::Start),
            Column::new("a"),
            Column::new("b"),
            Column::new("c"),
        ]);
        let moved = columns.reorder("c", "a").unwrap();
        assert_eq!(moved.order(), vec!["f", "c", "a", "b"]);

        let rejected = columns.reorder("a", "f");
        assert!(matches!(rejected, Err(GridError::ConfigurationConflict(_))));
        assert_eq!(columns.order(), vec!["f", "a", "b", "c"]);
    }

    #[test]
    fn test_group_headers() {
        let defs = vec![
            ColumnDef::from(Column::new("id")),
            ColumnGroup::new(
                "Place",
                vec![
                    Column::new("country").into(),
                    ColumnGroup::new("Detail", vec![Column::new("city").into(), Column::new("zip").into()])
                        .into(),
                ],
            )
            .into(),
        ];
        let columns = ColumnSet::new(&defs).unwrap();
        assert_eq!(columns.header_row_count(), 3);
        let spans = columns.header_spans();
        assert_eq!(
            spans,
            vec![
                HeaderSpan { name: "Place".into(), level: 0, start: 1, span: 3 },
                HeaderSpan { name: "Detail".into(), level: 1, start: 2, span: 2 },
            ]
        );

        // Moving a column out of its group is rejected
        assert!(columns.reorder("city", "id").is_err());
        assert_eq!(columns.reorder("zip", "city").unwrap().order(), vec!["id", "country", "zip", "city"]);
    }
}
