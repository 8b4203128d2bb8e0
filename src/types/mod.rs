//! Data types for the grid model.

mod column;
mod row;
mod selection;
mod sort;

pub use column::*;
pub use row::*;
pub use selection::*;
pub use sort::*;
