//! Tests for formula evaluation with cell references

use cellgrid::prelude::*;
use cellgrid::{evaluate, parse_formula, EvaluationContext, FormulaValue};

/// Test basic formula evaluation without cell references
#[test]
fn test_evaluate_simple_formulas() {
    let ctx = EvaluationContext::simple();

    // Arithmetic
    let ast = parse_formula("=1+2*3").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(7.0));

    // Parentheses and unary minus
    let ast = parse_formula("=-(1+2)*3").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(-9.0));

    // String literal
    let ast = parse_formula("=\"Hello World\"").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::String("Hello World".into()));
}

/// Test SUM function
#[test]
fn test_evaluate_sum() {
    let ast = parse_formula("=SUM(1,2,3,4,5)").unwrap();
    let ctx = EvaluationContext::simple();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(15.0));
}

/// Test formula evaluation with cell references
#[test]
fn test_evaluate_with_cell_references() {
    // Create a sheet with some data
    let mut sheet = Spreadsheet::new();

    sheet.set("A1", "10").unwrap();
    sheet.set("A2", "20").unwrap();
    sheet.set("A3", "30").unwrap();
    sheet.set("B1", "5").unwrap();

    // Create evaluation context over the sheet
    let ctx = EvaluationContext::new(&sheet, sheet.functions());

    // Test simple cell reference
    let ast = parse_formula("=A1").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(10.0));

    // Test cell reference in arithmetic
    let ast = parse_formula("=A1+B1").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(15.0));

    // A10 is not a prefix match of A1
    let ast = parse_formula("=A1*A10+A3").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(30.0));
}

/// Test formula evaluation with range references
#[test]
fn test_evaluate_with_range_references() {
    let mut sheet = Spreadsheet::new();

    sheet.set("A1", "10").unwrap();
    sheet.set("A2", "20").unwrap();
    sheet.set("A3", "30").unwrap();

    let ctx = EvaluationContext::new(&sheet, sheet.functions());

    // Test SUM with range
    let ast = parse_formula("=SUM(A1:A3)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(60.0));

    // Test AVERAGE with range
    let ast = parse_formula("=AVERAGE(A1:A3)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(20.0));

    // Test MIN/MAX with range, corners in either order
    let ast = parse_formula("=MIN(A3:A1)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(10.0));

    let ast = parse_formula("=MAX(A1:A3)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(30.0));

    let ast = parse_formula("=COUNT(A1:B3)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(3.0));
}

/// Test complex nested formulas
#[test]
fn test_evaluate_complex_formulas() {
    let mut sheet = Spreadsheet::new();

    sheet.set("A1", "100").unwrap();
    sheet.set("A2", "50").unwrap();
    sheet.set("B1", "0.1").unwrap(); // 10%

    let ctx = EvaluationContext::new(&sheet, sheet.functions());

    // Nested SUM and multiplication
    let ast = parse_formula("=SUM(A1,A2)*B1").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(15.0));

    let ast = parse_formula("=(MAX(A1:A2)-MIN(A1:A2))/AVERAGE(A1:A2)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(50.0 / 75.0));
}

/// Test error propagation in formulas
#[test]
fn test_error_propagation() {
    let ctx = EvaluationContext::simple();

    // Division by zero
    let ast = parse_formula("=1/0").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Error(ErrorValue::Div0));

    // Error in arithmetic propagates
    let ast = parse_formula("=1/0+5").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert!(matches!(result, FormulaValue::Error(_)));

    // Error in an aggregate argument propagates
    let ast = parse_formula("=SUM(1, 2/0)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Error(ErrorValue::Div0));
}

/// Test empty cell handling
#[test]
fn test_empty_cell_handling() {
    let mut sheet = Spreadsheet::new();

    sheet.set("A1", "10").unwrap();
    // A2 is empty
    sheet.set("A3", "30").unwrap();
    sheet.set("A4", "n/a").unwrap();

    let ctx = EvaluationContext::new(&sheet, sheet.functions());

    // Empty and non-numeric cells are treated as 0 in arithmetic
    let ast = parse_formula("=A1+A2+A4").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(10.0)); // 10 + 0 + 0

    // Aggregates skip them
    let ast = parse_formula("=AVERAGE(A1:A4)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::Number(20.0)); // (10 + 30) / 2
}

/// Test string operations
#[test]
fn test_string_operations() {
    let mut sheet = Spreadsheet::new();

    sheet.set("A1", "  Hello  ").unwrap();
    sheet.set("B1", "World").unwrap();

    let ctx = EvaluationContext::new(&sheet, sheet.functions());

    let ast = parse_formula("=UPPER(TRIM(A1))").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::String("HELLO".into()));

    let ast = parse_formula("=LOWER(B1)").unwrap();
    let result = evaluate(&ast, &ctx).unwrap();
    assert_eq!(result, FormulaValue::String("world".into()));

    // Text is not a number outside a cell reference
    let ast = parse_formula("=LOWER(B1)+1").unwrap();
    let err = evaluate(&ast, &ctx).unwrap_err();
    assert_eq!(err.error_value(), ErrorValue::Error);
}
