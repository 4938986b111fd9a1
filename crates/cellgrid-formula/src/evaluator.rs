//! Formula evaluator
//!
//! Evaluates formula ASTs over resolved operand values. Cell values come
//! from a [`CellSource`]; the evaluator never sees formula text.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{EvalError, FormulaError, FormulaResult};
use crate::functions::{ArgShape, FunctionRegistry};
use cellgrid_core::{
    format_number, parse_numeric_text, CellId, CellRange, CellValue, ErrorValue, GridBounds,
};

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Error(ErrorValue),
    /// Cell values of a range, row-major
    Array(Vec<FormulaValue>),
    Empty,
}

impl FormulaValue {
    /// Numeric reading of the value (numbers and numeric text)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::String(s) => parse_numeric_text(s),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Error(e) => e.to_string(),
            FormulaValue::Empty => String::new(),
            FormulaValue::Array(_) => ErrorValue::Error.to_string(),
        }
    }
}

impl From<CellValue> for FormulaValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => FormulaValue::Empty,
            CellValue::Number(n) => FormulaValue::Number(n),
            CellValue::String(s) => FormulaValue::String(s),
            CellValue::Error(e) => FormulaValue::Error(e),
        }
    }
}

impl From<FormulaValue> for CellValue {
    fn from(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Empty => CellValue::Empty,
            FormulaValue::Number(n) => CellValue::Number(n),
            FormulaValue::String(s) => CellValue::String(s),
            FormulaValue::Error(e) => CellValue::Error(e),
            // A bare range is not a cell value
            FormulaValue::Array(_) => CellValue::Error(ErrorValue::Error),
        }
    }
}

/// Read access to the grid for formula evaluation
pub trait CellSource {
    /// Current computed value of a cell (`Empty` if it does not exist)
    fn cell_value(&self, id: CellId) -> CellValue;

    /// Grid bounds; references outside them dangle
    fn bounds(&self) -> GridBounds;

    /// Values of the cells in a range, row-major
    ///
    /// Implementations may leave out empty cells.
    fn range_values(&self, range: &CellRange) -> Vec<CellValue> {
        range.cells().map(|id| self.cell_value(id)).collect()
    }
}

/// Context for formula evaluation
pub struct EvaluationContext<'a> {
    /// Cell lookups (None = every cell is empty)
    source: Option<&'a dyn CellSource>,
    /// Functions callable from formulas
    functions: &'a FunctionRegistry,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(source: &'a dyn CellSource, functions: &'a FunctionRegistry) -> Self {
        Self {
            source: Some(source),
            functions,
        }
    }

    /// Create a simple context without a grid (for testing)
    pub fn simple() -> EvaluationContext<'static> {
        EvaluationContext {
            source: None,
            functions: FunctionRegistry::builtin(),
        }
    }

    fn bounds(&self) -> GridBounds {
        self.source.map(|s| s.bounds()).unwrap_or_default()
    }

    /// Get a cell value from the grid
    ///
    /// Errors read from another cell propagate as their downstream form,
    /// so a reader of a `#CIRCULAR!` cell sees `#ERROR!`.
    pub fn get_cell_value(&self, id: CellId) -> FormulaResult<FormulaValue> {
        if !self.bounds().contains(id) {
            return Err(EvalError::DanglingReference(id.to_string()).into());
        }

        let value = match self.source {
            Some(source) => source.cell_value(id),
            None => CellValue::Empty,
        };

        Ok(match value {
            CellValue::Error(e) => FormulaValue::Error(e.propagate()),
            other => other.into(),
        })
    }

    /// Get the values of a range as an array
    pub fn get_range_values(&self, range: &CellRange) -> FormulaResult<FormulaValue> {
        if !self.bounds().contains_range(range) {
            return Err(EvalError::DanglingReference(range.to_string()).into());
        }

        let values = match self.source {
            Some(source) => source
                .range_values(range)
                .into_iter()
                .map(|value| match value {
                    CellValue::Error(e) => FormulaValue::Error(e.propagate()),
                    other => other.into(),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(FormulaValue::Array(values))
    }
}

/// Evaluate a formula expression
///
/// Values like `#DIV0!` come back as `Ok(FormulaValue::Error(..))`; an
/// `Err` means the formula itself could not be evaluated and the caller
/// shows [`FormulaError::error_value`] instead.
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),

        // === References ===
        FormulaExpr::CellRef(id) => ctx.get_cell_value(*id),

        FormulaExpr::RangeRef(range) => Err(FormulaError::invalid_operand(format!(
            "range {} used outside a function call",
            range
        ))),

        // === Operators ===
        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        FormulaExpr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Operand of an arithmetic operator: a number or an error to pass on
enum Operand {
    Number(f64),
    Error(ErrorValue),
}

/// Evaluate an arithmetic operand
///
/// A referenced cell that is blank or holds non-numeric text counts as 0.
/// Any other non-numeric operand is invalid.
fn arithmetic_operand(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<Operand> {
    let value = evaluate(expr, ctx)?;
    let from_cell = matches!(expr, FormulaExpr::CellRef(_));

    match value {
        FormulaValue::Number(n) => Ok(Operand::Number(n)),
        FormulaValue::Error(e) => Ok(Operand::Error(e.propagate())),
        FormulaValue::Empty if from_cell => Ok(Operand::Number(0.0)),
        FormulaValue::String(s) => match parse_numeric_text(&s) {
            Some(n) => Ok(Operand::Number(n)),
            None if from_cell => Ok(Operand::Number(0.0)),
            None => Err(FormulaError::invalid_operand(format!(
                "\"{}\" is not a number",
                s
            ))),
        },
        other => Err(FormulaError::invalid_operand(format!(
            "expected a number, got {:?}",
            other
        ))),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    // Evaluate operands first
    let l = match arithmetic_operand(left, ctx)? {
        Operand::Number(n) => n,
        Operand::Error(e) => return Ok(FormulaValue::Error(e)),
    };
    let r = match arithmetic_operand(right, ctx)? {
        Operand::Number(n) => n,
        Operand::Error(e) => return Ok(FormulaValue::Error(e)),
    };

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Ok(FormulaValue::Error(ErrorValue::Div0));
            }
            l / r
        }
    };

    if result.is_finite() {
        Ok(FormulaValue::Number(result))
    } else {
        Ok(FormulaValue::Error(ErrorValue::Error))
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let n = match arithmetic_operand(operand, ctx)? {
        Operand::Number(n) => n,
        Operand::Error(e) => return Ok(FormulaValue::Error(e)),
    };

    match op {
        UnaryOperator::Negate => Ok(FormulaValue::Number(-n)),
        UnaryOperator::Plus => Ok(FormulaValue::Number(n)),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let func = ctx
        .functions
        .get(name)
        .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;

    // Check argument count (the registry may have changed since parsing)
    if args.len() < func.min_args || func.max_args.map_or(false, |max| args.len() > max) {
        return Err(FormulaError::invalid_operand(format!(
            "wrong number of arguments to {}",
            func.name
        )));
    }

    // Evaluate arguments
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        let value = match (func.arg_shape, arg) {
            (ArgShape::Range, FormulaExpr::RangeRef(range)) => ctx.get_range_values(range)?,
            (ArgShape::Range, FormulaExpr::CellRef(id)) => {
                ctx.get_range_values(&CellRange::single(*id))?
            }
            _ => evaluate(arg, ctx)?,
        };
        evaluated_args.push(value);
    }

    // Call the function
    (func.implementation)(&evaluated_args)
}
