//! vgrid - virtualized data grid core
//!
//! Everything a spreadsheet-style grid needs except the DOM:
//! - Windowed row/column range for millions of rows, fixed or measured heights
//! - Column width resolution with fixed, percent, flex and auto widths
//! - Frozen columns on either side, grouped headers, RTL layout
//! - Grouped and hierarchical rows flattened with stable keys
//! - Keyboard navigation, editing, drag-fill and clipboard as a state machine
//! - Immutable snapshots; every change swaps in a new one
//!
//! # Usage (Rust)
//!
//! ```ignore
//! let mut grid = Grid::new(config, &columns, FlatRows::from_rows(&rows, key_of), delegate)?;
//! grid.resize(800.0, 600.0);
//! let effects = grid.dispatch(&Input::key(Key::ArrowDown));
//! if let Some(request) = grid.take_scroll_request() {
//!     // apply request.top / request.left to the scroll container
//! }
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'vgrid';
//! await init();
//! const view = new GridView(config, columns, rowKeys, callbacks);
//! view.resize(800, 600);
//! const effects = view.keyDown('ArrowDown', false, false, false, false);
//! const cells = view.visibleCells();
//! ```

// Model
pub mod config;
pub mod error;
pub mod sort;
pub mod types;

// Row and column machinery
pub mod grouping;
pub mod layout;

// Interaction
pub mod clipboard;
pub mod editor;
pub mod grid;

mod bindings;

use wasm_bindgen::prelude::*;

pub use bindings::GridView;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use grid::{Grid, GridDelegate, GridSnapshot, GridStateSnapshot};

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
