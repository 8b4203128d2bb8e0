//! Grid configuration.
//!
//! Hosts usually build a [`GridConfig`] in code, but the struct also
//! round-trips through JSON (camelCase keys, every field optional).

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: f32 = 35.0;

/// Default minimum column width in pixels
pub const DEFAULT_MIN_COLUMN_WIDTH: f32 = 50.0;

/// How row heights are determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RowHeightMode {
    /// Every row has the same height; offsets are plain arithmetic
    Fixed { height: f32 },
    /// Rows start at `estimate` and are replaced by measured heights as they arrive
    Estimated { estimate: f32 },
}

impl RowHeightMode {
    pub fn nominal(&self) -> f32 {
        match *self {
            Self::Fixed { height } => height,
            Self::Estimated { estimate } => estimate,
        }
    }
}

impl Default for RowHeightMode {
    fn default() -> Self {
        Self::Fixed {
            height: DEFAULT_ROW_HEIGHT,
        }
    }
}

/// Layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// What horizontal navigation does at a row boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NavigationMode {
    /// Stop at the edge
    #[default]
    None,
    /// Continue on the next/previous row
    ChangeRow,
    /// Wrap around within the same row
    LoopOverRow,
    /// Focus moves between rows only; horizontal moves are ignored
    RowOnly,
}

/// Where focus goes after Enter commits an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum EnterCommitMove {
    #[default]
    Stay,
    Down,
}

/// Axis a drag-fill is constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FillAxis {
    /// Same column as the source
    #[default]
    Vertical,
    /// Same row as the source
    Horizontal,
    /// Whichever axis the pointer moved further along
    Auto,
}

/// Grid-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub row_height: RowHeightMode,
    /// Height of each header row (one per column-group level)
    pub header_row_height: f32,
    /// Height of pinned top/bottom summary rows
    pub summary_row_height: f32,
    /// Extra rows materialized above and below the viewport
    pub overscan_rows: usize,
    /// Extra unfrozen columns materialized on each side
    pub overscan_cols: usize,
    pub direction: Direction,
    pub navigation: NavigationMode,
    pub enter_commit: EnterCommitMove,
    pub fill_axis: FillAxis,
    /// Resizing a column shrinks/grows its neighbour by the same amount
    pub push_resize: bool,
    pub min_column_width: f32,
    /// Emit a summary row after every expanded group
    pub group_summaries: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: RowHeightMode::default(),
            header_row_height: DEFAULT_ROW_HEIGHT,
            summary_row_height: DEFAULT_ROW_HEIGHT,
            overscan_rows: 4,
            overscan_cols: 1,
            direction: Direction::Ltr,
            navigation: NavigationMode::None,
            enter_commit: EnterCommitMove::Stay,
            fill_axis: FillAxis::Vertical,
            push_resize: false,
            min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
            group_summaries: false,
        }
    }
}

impl GridConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject non-positive or non-finite sizes.
    pub fn validate(&self) -> Result<()> {
        let row = self.row_height.nominal();
        if !(row.is_finite() && row > 0.0) {
            return Err(GridError::Config(format!("row height must be positive, got {row}")));
        }
        for (name, value) in [
            ("headerRowHeight", self.header_row_height),
            ("summaryRowHeight", self.summary_row_height),
            ("minColumnWidth", self.min_column_width),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GridError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
