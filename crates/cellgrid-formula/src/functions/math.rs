//! Aggregate functions
//!
//! Each argument is an array of cell values (from a range or a single
//! cell) or a scalar. Only numeric values take part; blank and text
//! values are skipped. The first error value found is the result.

use crate::error::FormulaResult;
use crate::evaluator::FormulaValue;
use cellgrid_core::{parse_numeric_text, ErrorValue};

/// Gather the numeric values of all arguments, flattening arrays
fn numeric_values(args: &[FormulaValue]) -> Result<Vec<f64>, ErrorValue> {
    let mut values = Vec::new();

    for arg in args {
        match arg {
            FormulaValue::Array(items) => {
                for item in items {
                    push_numeric(item, &mut values)?;
                }
            }
            other => push_numeric(other, &mut values)?,
        }
    }

    Ok(values)
}

fn push_numeric(value: &FormulaValue, values: &mut Vec<f64>) -> Result<(), ErrorValue> {
    match value {
        FormulaValue::Number(n) => values.push(*n),
        FormulaValue::String(s) => {
            if let Some(n) = parse_numeric_text(s) {
                values.push(n);
            }
        }
        FormulaValue::Error(e) => return Err(*e),
        // Nested arrays do not occur; empties are skipped
        FormulaValue::Array(_) | FormulaValue::Empty => {}
    }
    Ok(())
}

/// SUM function
pub fn fn_sum(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numeric_values(args) {
        Ok(values) => FormulaValue::Number(values.iter().sum()),
        Err(e) => FormulaValue::Error(e),
    })
}

/// AVERAGE function
pub fn fn_average(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numeric_values(args) {
        Ok(values) if values.is_empty() => FormulaValue::Number(0.0),
        Ok(values) => FormulaValue::Number(values.iter().sum::<f64>() / values.len() as f64),
        Err(e) => FormulaValue::Error(e),
    })
}

/// MAX function
pub fn fn_max(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numeric_values(args) {
        Ok(values) => FormulaValue::Number(
            values
                .into_iter()
                .reduce(f64::max)
                .unwrap_or(0.0),
        ),
        Err(e) => FormulaValue::Error(e),
    })
}

/// MIN function
pub fn fn_min(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numeric_values(args) {
        Ok(values) => FormulaValue::Number(
            values
                .into_iter()
                .reduce(f64::min)
                .unwrap_or(0.0),
        ),
        Err(e) => FormulaValue::Error(e),
    })
}

/// COUNT function
pub fn fn_count(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(match numeric_values(args) {
        Ok(values) => FormulaValue::Number(values.len() as f64),
        Err(e) => FormulaValue::Error(e),
    })
}
