//! Cell identifier and range types

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell identifier (e.g., "A1", "AA10")
///
/// Both coordinates are 1-based: column `A` is 1, `Z` is 26, `AA` is 27.
/// Ordering is row-major, so sorted collections of cell ids read like the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A=1, B=2, ..., Z=26, AA=27)
    pub col: u32,
}

impl CellId {
    /// Create a new cell id from 1-based column and row numbers
    pub fn new(col: u32, row: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell identifier from `COLROW` notation
    ///
    /// The text must be uppercase column letters followed by the row digits,
    /// and the row must not be zero or start with a zero.
    ///
    /// # Examples
    /// ```
    /// use cellgrid_core::CellId;
    ///
    /// let id = CellId::parse("A1").unwrap();
    /// assert_eq!((id.col, id.row), (1, 1));
    ///
    /// let id = CellId::parse("AA1").unwrap();
    /// assert_eq!(id.col, 27);
    ///
    /// assert!(CellId::parse("A0").is_err());
    /// assert!(CellId::parse("a1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let letters_end = bytes
            .iter()
            .position(|b| !b.is_ascii_uppercase())
            .unwrap_or(bytes.len());

        if letters_end == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let row_str = &s[letters_end..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "unexpected characters in '{}'",
                s
            )));
        }

        if row_str.starts_with('0') {
            return Err(Error::InvalidAddress(format!(
                "row number has a leading zero in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..letters_end])?;
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row, col })
    }

    /// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to a 1-based column number (A = 1, Z = 26, AA = 27, etc.)
    ///
    /// Bijective base-26: there is no zero digit.
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(c as u32 - 'A' as u32 + 1))
                .ok_or_else(|| Error::InvalidAddress(format!("column too large: {}", letters)))?;
        }

        Ok(col)
    }

    /// Format as `COLROW` text
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row)
    }

    /// Create a range from this cell to another
    pub fn to(&self, other: CellId) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
///
/// Always normalized: `start` is the top-left corner and `end` the
/// bottom-right, whichever corners were given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellId,
    /// Bottom-right corner
    pub end: CellId,
}

impl CellRange {
    /// Create a new cell range from any two opposite corners
    pub fn new(a: CellId, b: CellId) -> Self {
        Self {
            start: CellId::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellId::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    /// Create a single-cell range
    pub fn single(id: CellId) -> Self {
        Self { start: id, end: id }
    }

    /// Parse a range from `START:END` notation
    ///
    /// Text without a colon is accepted as a 1x1 range.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();

        if parts.next().is_some() {
            return Err(Error::InvalidRange(format!("too many ':' in '{}'", s)));
        }

        let start = CellId::parse(first)
            .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;

        match second {
            Some(end) => {
                let end = CellId::parse(end)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(start)),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, id: &CellId) -> bool {
        id.row >= self.start.row
            && id.row <= self.end.row
            && id.col >= self.start.col
            && id.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Iterate over all cells in the range, row by row
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current: Some(self.start),
            remaining: self.cell_count(),
        }
    }

    /// Row-major offset of a cell within the range
    ///
    /// This is the index [`CellRange::cells`] yields the cell at.
    pub fn position(&self, id: &CellId) -> Option<u64> {
        if !self.contains(id) {
            return None;
        }
        let row = u64::from(id.row - self.start.row);
        let col = u64::from(id.col - self.start.col);
        Some(row * u64::from(self.col_count()) + col)
    }

    /// Format as `START:END` text
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over the cells of a range
pub struct CellRangeIterator {
    range: CellRange,
    current: Option<CellId>,
    remaining: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;

        self.current = if id.col < self.range.end.col {
            Some(CellId::new(id.col + 1, id.row))
        } else if id.row < self.range.end.row {
            Some(CellId::new(self.range.start.col, id.row + 1))
        } else {
            None
        };
        self.remaining -= 1;

        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellRangeIterator {}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::CellId;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for CellId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    struct CellIdVisitor;

    impl<'de> Visitor<'de> for CellIdVisitor {
        type Value = CellId;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a cell identifier such as \"A1\"")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<CellId, E> {
            CellId::parse(v).map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for CellId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_str(CellIdVisitor)
        }
    }
}
