//! # cellgrid-formula
//!
//! Formula parser and evaluator for cellgrid.
//!
//! This crate provides:
//! - Formula parsing (text → AST) over a closed grammar
//! - Formula evaluation (AST → value)
//! - Built-in functions (`SUM`, `AVERAGE`, `MAX`, `MIN`, `COUNT`, `TRIM`, `UPPER`, `LOWER`)
//! - Dependency tracking for incremental recalculation
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_formula::{evaluate, parse_formula, EvaluationContext, FormulaValue};
//!
//! let ast = parse_formula("=SUM(1, 2) * 2").unwrap();
//! let result = evaluate(&ast, &EvaluationContext::simple()).unwrap();
//! assert_eq!(result, FormulaValue::Number(6.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, Precedent, UnaryOperator};
pub use dependency::{DependencyGraph, RecalcStep};
pub use error::{EvalError, FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellSource, EvaluationContext, FormulaValue};
pub use functions::{ArgShape, FunctionDef, FunctionImpl, FunctionRegistry};
pub use parser::{parse_formula, parse_formula_with};
