//! # cellgrid
//!
//! A grid-of-cells calculator with incremental, dependency-driven
//! recalculation.
//!
//! Each cell holds a literal or a formula. Formulas are parsed with a
//! closed grammar (numbers, strings, cell and range references, function
//! calls, `+ - * /`), their references are recorded in a dependency graph,
//! and every edit recalculates exactly the cells that depend on it, in
//! dependency order. Cycles are detected and marked `#CIRCULAR!`.
//!
//! ## Features
//!
//! - Cell and range references with multi-letter columns (`AA1`, `B5:A1`)
//! - Aggregates (`SUM`, `AVERAGE`, `MAX`, `MIN`, `COUNT`) and text
//!   functions (`TRIM`, `UPPER`, `LOWER`), extensible at runtime
//! - Errors as values: `#ERROR!`, `#CIRCULAR!`, `#DIV0!`, `#REF!`
//! - JSON sheet files that keep unknown per-cell fields
//!
//! ## Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut sheet = Spreadsheet::new();
//!
//! sheet.set("A1", "10").unwrap();
//! sheet.set("A2", "20").unwrap();
//! sheet.set("A3", "=SUM(A1:A2)").unwrap();
//! sheet.set("B1", "=UPPER(\"total\")").unwrap();
//!
//! assert_eq!(sheet.value("A3").unwrap(), CellValue::Number(30.0));
//! assert_eq!(sheet.value("B1").unwrap(), CellValue::string("TOTAL"));
//!
//! // Save to file
//! // sheet.save("sheet.json").unwrap();
//! ```

pub mod calculation;
pub mod edit;
pub mod error;
pub mod persistence;
pub mod prelude;
pub mod sheet;

pub use calculation::RecalcResult;
pub use error::{Error, Result};
pub use persistence::StoredCell;
pub use sheet::{literal_value, Cell, CellExtra, SheetOptions, Spreadsheet};

// Re-export core types
pub use cellgrid_core::{
    CellId, CellRange, CellValue, ErrorValue, GridBounds, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use cellgrid_formula::{
    evaluate, parse_formula, ArgShape, EvalError, EvaluationContext, FormulaError, FormulaExpr,
    FormulaResult, FormulaValue, FunctionDef, FunctionRegistry, Precedent,
};
