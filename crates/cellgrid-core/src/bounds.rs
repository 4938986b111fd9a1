//! Grid dimensions

use crate::cell::{CellId, CellRange};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// The size of the grid
///
/// A reference outside these bounds is dangling and evaluates to `#REF!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    /// Number of rows (the last valid row number)
    pub rows: u32,
    /// Number of columns (the last valid column number)
    pub cols: u32,
}

impl GridBounds {
    /// Create bounds for a `rows` x `cols` grid
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Check if a cell lies inside the grid
    pub fn contains(&self, id: CellId) -> bool {
        id.row >= 1 && id.col >= 1 && id.row <= self.rows && id.col <= self.cols
    }

    /// Check if every cell of a range lies inside the grid
    pub fn contains_range(&self, range: &CellRange) -> bool {
        self.contains(range.start) && self.contains(range.end)
    }

    /// Return an error if the cell lies outside the grid
    pub fn check(&self, id: CellId) -> Result<()> {
        if id.row > self.rows {
            return Err(Error::RowOutOfBounds(id.row, self.rows));
        }
        if id.col > self.cols {
            return Err(Error::ColumnOutOfBounds(id.col, self.cols));
        }
        Ok(())
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            rows: MAX_ROWS,
            cols: MAX_COLS,
        }
    }
}
