//! # cellgrid-core
//!
//! Core data structures for the cellgrid calculation engine.
//!
//! This crate provides the fundamental types used throughout cellgrid:
//! - [`CellId`] and [`CellRange`] - Cell identifiers and rectangular ranges
//! - [`GridBounds`] - The size of the grid
//! - [`CellValue`] and [`ErrorValue`] - Computed cell values and error sentinels
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_core::{CellId, CellRange};
//!
//! let id: CellId = "AA1".parse().unwrap();
//! assert_eq!(id.col, 27);
//!
//! let range = CellRange::parse("B2:A1").unwrap();
//! let cells: Vec<String> = range.cells().map(|c| c.to_string()).collect();
//! assert_eq!(cells, ["A1", "B1", "A2", "B2"]);
//! ```

pub mod bounds;
pub mod cell;
pub mod error;

// Re-exports for convenience
pub use bounds::GridBounds;
pub use cell::{
    format_number, parse_numeric_text, CellId, CellRange, CellRangeIterator, CellValue, ErrorValue,
};
pub use error::{Error, Result};

/// Default number of rows in a grid
pub const MAX_ROWS: u32 = 1_048_576;

/// Default number of columns in a grid
pub const MAX_COLS: u32 = 16_384;
