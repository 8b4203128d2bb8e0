//! Row geometry: per-row heights and the cumulative offset table.
//!
//! Fixed-height grids never materialize a table; offsets are arithmetic.
//! Variable-height grids keep `offsets[i]` = y of row i's top edge (plus a
//! final edge), rebuilt lazily from the first invalidated index onward.
//! Measured heights are cached by row key so they survive re-flattening.

use std::collections::HashMap;

use tracing::debug;

use crate::config::RowHeightMode;
use crate::error::{GridError, Result};
use crate::types::RowKey;

#[derive(Debug, Clone, PartialEq)]
enum Heights {
    Fixed(f32),
    Variable(VariableHeights),
}

#[derive(Debug, Clone, PartialEq)]
struct VariableHeights {
    estimate: f32,
    heights: Vec<f32>,
    /// Cumulative top edges, `len == heights.len() + 1` once built
    offsets: Vec<f32>,
    /// `offsets[..=valid_until]` are current
    valid_until: usize,
    index: HashMap<RowKey, usize>,
    measured: HashMap<RowKey, f32>,
}

/// Pre-computed vertical layout of the flat row sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    count: usize,
    heights: Heights,
}

impl RowGeometry {
    /// Uniform row height.
    pub fn fixed(count: usize, height: f32) -> Self {
        Self {
            count,
            heights: Heights::Fixed(height.max(0.0)),
        }
    }

    /// Variable heights: every row starts at `estimate` until measured.
    pub fn estimated<'a>(keys: impl IntoIterator<Item = &'a RowKey>, estimate: f32) -> Self {
        let mut geometry = Self {
            count: 0,
            heights: Heights::Variable(VariableHeights {
                estimate: estimate.max(0.0),
                heights: Vec::new(),
                offsets: vec![0.0],
                valid_until: 0,
                index: HashMap::new(),
                measured: HashMap::new(),
            }),
        };
        geometry.relayout(keys);
        geometry
    }

    /// Build from a height mode.
    pub fn for_mode<'a>(mode: RowHeightMode, keys: impl IntoIterator<Item = &'a RowKey>) -> Self {
        match mode {
            RowHeightMode::Fixed { height } => Self::fixed(keys.into_iter().count(), height),
            RowHeightMode::Estimated { estimate } => Self::estimated(keys, estimate),
        }
    }

    /// Adopt a new flat row sequence, keeping measured heights by key.
    pub fn relayout<'a>(&mut self, keys: impl IntoIterator<Item = &'a RowKey>) {
        match &mut self.heights {
            Heights::Fixed(_) => {
                self.count = keys.into_iter().count();
            }
            Heights::Variable(v) => {
                v.heights.clear();
                v.index.clear();
                for (i, key) in keys.into_iter().enumerate() {
                    v.heights
                        .push(v.measured.get(key).copied().unwrap_or(v.estimate));
                    v.index.entry(key.clone()).or_insert(i);
                }
                self.count = v.heights.len();
                v.offsets.clear();
                v.offsets.push(0.0);
                v.valid_until = 0;
                v.rebuild();
            }
        }
    }

    /// Record a measured height for `key`.
    ///
    /// Only this row's entry is written and the table is invalidated from its
    /// index onward, so measurements for different rows commute. Returns
    /// whether the visible layout changed.
    pub fn measure(&mut self, key: &RowKey, height: f32) -> bool {
        let Heights::Variable(v) = &mut self.heights else {
            return false;
        };
        if !height.is_finite() || height < 0.0 {
            return false;
        }
        v.measured.insert(key.clone(), height);
        let Some(&index) = v.index.get(key) else {
            return false;
        };
        let Some(slot) = v.heights.get_mut(index) else {
            return false;
        };
        if (*slot - height).abs() <= f32::EPSILON {
            return false;
        }
        *slot = height;
        v.valid_until = v.valid_until.min(index);
        true
    }

    /// Whether lookups past some index would hit invalidated offsets.
    pub fn is_stale(&self) -> bool {
        match &self.heights {
            Heights::Fixed(_) => false,
            Heights::Variable(v) => v.valid_until < self.count,
        }
    }

    /// Recompute invalidated offsets.
    pub fn rebuild(&mut self) {
        if let Heights::Variable(v) = &mut self.heights {
            if v.valid_until < v.heights.len() {
                debug!(from = v.valid_until, rows = v.heights.len(), "rebuilding row offsets");
            }
            v.rebuild();
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.heights, Heights::Fixed(_))
    }

    /// Height of row `index` (0 past the end).
    pub fn row_height(&self, index: usize) -> f32 {
        match &self.heights {
            Heights::Fixed(h) if index < self.count => *h,
            Heights::Fixed(_) => 0.0,
            Heights::Variable(v) => v.heights.get(index).copied().unwrap_or(0.0),
        }
    }

    /// Top edge of row `index`, failing if the table is invalidated there.
    ///
    /// `index == len()` yields the bottom edge of the last row; larger
    /// indices are clamped to it.
    pub fn try_row_offset(&self, index: usize) -> Result<f32> {
        let index = index.min(self.count);
        match &self.heights {
            Heights::Fixed(h) => Ok(*h * index as f32),
            Heights::Variable(v) => {
                if index > v.valid_until {
                    return Err(GridError::StaleGeometry {
                        index,
                        valid_until: v.valid_until,
                    });
                }
                v.offsets
                    .get(index)
                    .copied()
                    .ok_or(GridError::StaleGeometry {
                        index,
                        valid_until: v.valid_until,
                    })
            }
        }
    }

    /// Top edge of row `index`.
    ///
    /// Never fails: on a stale table the offset is summed from the last
    /// valid entry instead.
    pub fn row_offset(&self, index: usize) -> f32 {
        match self.try_row_offset(index) {
            Ok(offset) => offset,
            Err(_) => match &self.heights {
                Heights::Fixed(_) => 0.0,
                Heights::Variable(v) => v.offset_from_valid_prefix(index.min(self.count)),
            },
        }
    }

    /// Total content height.
    pub fn total_height(&self) -> f32 {
        self.row_offset(self.count)
    }

    /// Index of the first row whose bottom edge lies below `y`.
    ///
    /// Returns `len()` when `y` is at or past the end of the content.
    pub fn try_first_row_ending_after(&self, y: f32) -> Result<usize> {
        match &self.heights {
            Heights::Fixed(h) => Ok(fixed_index_at(y, *h, self.count)),
            Heights::Variable(v) => {
                v.check_fresh()?;
                let bottoms = v.offsets.get(1..).unwrap_or_default();
                Ok(bottoms.partition_point(|&bottom| bottom <= y))
            }
        }
    }

    /// Number of rows whose top edge lies strictly above `y`.
    pub fn try_rows_starting_before(&self, y: f32) -> Result<usize> {
        match &self.heights {
            Heights::Fixed(h) => {
                if *h <= 0.0 {
                    return Ok(if y > 0.0 { self.count } else { 0 });
                }
                Ok(ceil_index(y / *h).min(self.count))
            }
            Heights::Variable(v) => {
                v.check_fresh()?;
                let tops = v.offsets.get(..self.count).unwrap_or_default();
                Ok(tops.partition_point(|&top| top < y))
            }
        }
    }

    /// Row containing the y position, if any.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        if self.count == 0 || y < 0.0 || !y.is_finite() {
            return None;
        }
        let index = match self.try_first_row_ending_after(y) {
            Ok(index) => index,
            Err(_) => {
                // Stale: walk a fresh copy rather than surface the error.
                let mut fresh = self.clone();
                fresh.rebuild();
                fresh.try_first_row_ending_after(y).ok()?
            }
        };
        (index < self.count).then_some(index)
    }
}

impl VariableHeights {
    fn check_fresh(&self) -> Result<()> {
        if self.valid_until < self.heights.len() {
            return Err(GridError::StaleGeometry {
                index: self.heights.len(),
                valid_until: self.valid_until,
            });
        }
        Ok(())
    }

    fn rebuild(&mut self) {
        let start = self.valid_until.min(self.heights.len());
        self.offsets.truncate(start + 1);
        let mut y = self.offsets.last().copied().unwrap_or(0.0);
        if self.offsets.is_empty() {
            self.offsets.push(0.0);
        }
        for h in self.heights.iter().skip(start) {
            y += h;
            self.offsets.push(y);
        }
        self.valid_until = self.heights.len();
    }

    fn offset_from_valid_prefix(&self, index: usize) -> f32 {
        let start = self.valid_until.min(index);
        let base = self.offsets.get(start).copied().unwrap_or(0.0);
        base + self
            .heights
            .iter()
            .skip(start)
            .take(index - start)
            .sum::<f32>()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fixed_index_at(y: f32, height: f32, count: usize) -> usize {
    if height <= 0.0 {
        return count;
    }
    if y < 0.0 {
        return 0;
    }
    let index = (y / height).floor();
    if index >= count as f32 {
        count
    } else {
        index as usize
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ceil_index(value: f32) -> usize {
    if value <= 0.0 {
        0
    } else {
        value.ceil() as usize
    }
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

    fn keys(n: usize) -> Vec<RowKey> {
        (0..n).map(RowKey::from).collect()
    }

    #[test]
    fn test_fixed_offsets_are_arithmetic() {
        let geometry = RowGeometry::fixed(10_000, 35.0);
        assert_eq!(geometry.row_offset(100), 3500.0);
        assert_eq!(geometry.total_height(), 350_000.0);
        assert_eq!(geometry.row_at(3534.9), Some(100));
        assert_eq!(geometry.row_at(350_000.0), None);
    }

    #[test]
    fn test_estimated_uses_default_until_measured() {
        let keys = keys(5);
        let geometry = RowGeometry::estimated(&keys, 20.0);
        assert_eq!(geometry.row_offset(3), 60.0);
        assert_eq!(geometry.total_height(), 100.0);
        assert!(!geometry.is_stale());
    }

    #[test]
    fn test_measure_invalidates_suffix_only() {
        let keys = keys(5);
        let mut geometry = RowGeometry::estimated(&keys, 20.0);
        assert!(geometry.measure(&keys[2], 50.0));
        assert!(geometry.is_stale());

        // Prefix before the measured row is still valid
        assert_eq!(geometry.try_row_offset(2).unwrap(), 40.0);
        assert!(matches!(
            geometry.try_row_offset(3),
            Err(GridError::StaleGeometry { .. })
        ));
        // Non-failing lookup sums from the valid prefix
        assert_eq!(geometry.row_offset(3), 90.0);

        geometry.rebuild();
        assert_eq!(geometry.try_row_offset(3).unwrap(), 90.0);
        assert_eq!(geometry.total_height(), 130.0);
    }

    #[test]
    fn test_measurements_commute() {
        let keys = keys(4);
        let mut a = RowGeometry::estimated(&keys, 10.0);
        let mut b = a.clone();

        a.measure(&keys[1], 30.0);
        a.measure(&keys[3], 5.0);
        b.measure(&keys[3], 5.0);
        b.measure(&keys[1], 30.0);
        a.rebuild();
        b.rebuild();

        assert_eq!(a, b);
        assert_eq!(a.total_height(), 55.0);
    }

    #[test]
    fn test_measured_heights_survive_relayout() {
        let keys = keys(3);
        let mut geometry = RowGeometry::estimated(&keys, 10.0);
        geometry.measure(&keys[2], 40.0);
        geometry.rebuild();

        // Reverse the order: row "2" keeps its measured height at index 0
        let reversed: Vec<RowKey> = keys.iter().rev().cloned().collect();
        geometry.relayout(&reversed);
        assert_eq!(geometry.row_height(0), 40.0);
        assert_eq!(geometry.row_offset(1), 40.0);
    }

    #[test]
    fn test_measure_unknown_key_is_cached_for_later() {
        let keys = keys(2);
        let mut geometry = RowGeometry::estimated(&keys, 10.0);
        let late = RowKey::from("late");
        assert!(!geometry.measure(&late, 99.0));

        let mut with_late = keys.clone();
        with_late.push(late);
        geometry.relayout(&with_late);
        assert_eq!(geometry.row_height(2), 99.0);
    }

    #[test]
    fn test_row_at_variable() {
        let keys = keys(3);
        let mut geometry = RowGeometry::estimated(&keys, 10.0);
        geometry.measure(&keys[1], 100.0);
        geometry.rebuild();

        assert_eq!(geometry.row_at(0.0), Some(0));
        assert_eq!(geometry.row_at(10.0), Some(1));
        assert_eq!(geometry.row_at(109.9), Some(1));
        assert_eq!(geometry.row_at(110.0), Some(2));
        assert_eq!(geometry.row_at(120.0), None);
    }

    #[test]
    fn test_row_at_on_stale_table_still_answers() {
        let keys = keys(3);
        let mut geometry = RowGeometry::estimated(&keys, 10.0);
        geometry.measure(&keys[0], 100.0);
        assert_eq!(geometry.row_at(105.0), Some(1));
    }
}
