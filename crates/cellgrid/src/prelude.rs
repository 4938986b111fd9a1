//! Prelude module - common imports for cellgrid users
//!
//! ```rust
//! use cellgrid::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellId,
    CellRange,
    CellValue,
    ErrorValue,
    GridBounds,

    // Error types
    Error,
    Result,

    // Main types
    RecalcResult,
    SheetOptions,
    Spreadsheet,
};
