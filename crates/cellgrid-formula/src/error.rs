//! Formula error types

use cellgrid_core::{CellId, ErrorValue};
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
///
/// None of these escape the engine: every one is turned into an in-cell
/// sentinel with [`FormulaError::error_value`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Malformed formula text or reference
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Errors raised while evaluating a parsed formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The cell is part of a reference cycle
    #[error("Circular reference involving {0}")]
    CircularReference(CellId),

    /// Operand of the wrong kind (text in arithmetic, range outside a function, ...)
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// Function name not in the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Reference to a cell outside the grid bounds
    #[error("Reference outside the grid: {0}")]
    DanglingReference(String),
}

impl FormulaError {
    /// Shorthand for an invalid operand error
    pub fn invalid_operand<S: Into<String>>(msg: S) -> Self {
        FormulaError::Eval(EvalError::InvalidOperand(msg.into()))
    }

    /// The sentinel shown in the cell for this error
    pub fn error_value(&self) -> ErrorValue {
        match self {
            FormulaError::Parse(_) => ErrorValue::Error,
            FormulaError::Eval(e) => e.error_value(),
        }
    }
}

impl EvalError {
    /// The sentinel shown in the cell for this error
    pub fn error_value(&self) -> ErrorValue {
        match self {
            EvalError::CircularReference(_) => ErrorValue::Circular,
            EvalError::DanglingReference(_) => ErrorValue::Ref,
            EvalError::InvalidOperand(_) | EvalError::UnknownFunction(_) => ErrorValue::Error,
        }
    }
}
