//! Formula Abstract Syntax Tree types

use cellgrid_core::{CellId, CellRange, CellRangeIterator};
use std::fmt;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),

    // === References ===
    /// Single cell reference
    CellRef(CellId),
    /// Range reference
    RangeRef(CellRange),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    // === Function call ===
    Function {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

/// Something a formula reads: a single cell or a whole range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precedent {
    Cell(CellId),
    Range(CellRange),
}

impl Precedent {
    /// Check if the precedent covers a cell
    pub fn covers(&self, id: &CellId) -> bool {
        match self {
            Precedent::Cell(cell) => cell == id,
            Precedent::Range(range) => range.contains(id),
        }
    }

    /// Iterate the cells this precedent covers, row-major
    pub fn cells(&self) -> CellRangeIterator {
        match self {
            Precedent::Cell(cell) => CellRange::single(*cell).cells(),
            Precedent::Range(range) => range.cells(),
        }
    }
}

impl fmt::Display for Precedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precedent::Cell(cell) => write!(f, "{}", cell),
            Precedent::Range(range) => write!(f, "{}", range),
        }
    }
}

impl FormulaExpr {
    /// Collect every cell and range this expression reads, in source order
    pub fn precedents(&self) -> Vec<Precedent> {
        let mut refs = Vec::new();
        self.collect_precedents(&mut refs);
        refs
    }

    fn collect_precedents(&self, refs: &mut Vec<Precedent>) {
        match self {
            FormulaExpr::CellRef(id) => refs.push(Precedent::Cell(*id)),
            FormulaExpr::RangeRef(range) => refs.push(Precedent::Range(*range)),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_precedents(refs);
                right.collect_precedents(refs);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_precedents(refs),
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.collect_precedents(refs);
                }
            }
            // Literals have no references
            FormulaExpr::Number(_) | FormulaExpr::String(_) => {}
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
}
