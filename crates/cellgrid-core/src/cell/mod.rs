//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellId`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangle of cells (e.g., "A1:B10")
//! - [`CellValue`] - The computed value of a cell
//! - [`ErrorValue`] - In-cell error sentinels

mod address;
mod value;

pub use address::{CellId, CellRange, CellRangeIterator};
pub use value::{format_number, parse_numeric_text, CellValue, ErrorValue};
