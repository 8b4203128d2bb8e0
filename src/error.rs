//! Structured error types for vgrid.
//!
//! None of these are fatal. The grid controller decides per kind whether an
//! error is clamped away, retried, surfaced as edit state, or dropped.

/// All errors that can occur in the grid core.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Index outside the current row/column bounds.
    #[error("Cell ({row}, {col}) is outside the grid")]
    InvalidRange { row: usize, col: usize },

    /// Lookup against an offset table that has pending invalidations.
    #[error("Row offset table is stale at index {index} (valid up to {valid_until})")]
    StaleGeometry { index: usize, valid_until: usize },

    /// An external commit/fill/paste/sort callback refused the change.
    #[error("Change rejected: {0}")]
    CommitRejected(String),

    /// A structural operation would break a layout invariant.
    #[error("Configuration conflict: {0}")]
    ConfigurationConflict(String),

    /// Invalid grid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    /// Whether the error is a rejected external callback.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::CommitRejected(_))
    }
}

impl From<wasm_bindgen::JsValue> for GridError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::CommitRejected(
            value
                .as_string()
                .unwrap_or_else(|| "callback threw".to_string()),
        )
    }
}

impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
