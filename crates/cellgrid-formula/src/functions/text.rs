//! Text functions

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;

/// Apply a text transform to a single argument
///
/// A missing cell reads as empty text and numbers use their display form.
fn map_text(args: &[FormulaValue], f: impl Fn(&str) -> String) -> FormulaResult<FormulaValue> {
    let v = args.first().unwrap_or(&FormulaValue::Empty);
    match v {
        FormulaValue::Error(e) => Ok(FormulaValue::Error(*e)),
        FormulaValue::Array(_) => Err(FormulaError::invalid_operand(
            "text functions take a single value, not a range",
        )),
        other => Ok(FormulaValue::String(f(&other.as_string()))),
    }
}

/// TRIM(text)
pub fn fn_trim(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    map_text(args, |s| s.trim().to_string())
}

/// UPPER(text)
pub fn fn_upper(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    map_text(args, str::to_uppercase)
}

/// LOWER(text)
pub fn fn_lower(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    map_text(args, str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::ErrorValue;

    fn text(s: &str) -> FormulaValue {
        FormulaValue::String(s.to_string())
    }

    #[test]
    fn test_trim() {
        assert_eq!(fn_trim(&[text("  padded \t")]).unwrap(), text("padded"));
        assert_eq!(fn_trim(&[FormulaValue::Empty]).unwrap(), text(""));
    }

    #[test]
    fn test_upper_lower() {
        assert_eq!(fn_upper(&[text("Hello")]).unwrap(), text("HELLO"));
        assert_eq!(fn_lower(&[text("Hello")]).unwrap(), text("hello"));
        assert_eq!(fn_upper(&[FormulaValue::Number(2.5)]).unwrap(), text("2.5"));
        assert_eq!(fn_lower(&[FormulaValue::Empty]).unwrap(), text(""));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            fn_upper(&[FormulaValue::Error(ErrorValue::Ref)]).unwrap(),
            FormulaValue::Error(ErrorValue::Ref)
        );
        assert!(fn_trim(&[FormulaValue::Array(vec![text("a")])]).is_err());
    }
}
