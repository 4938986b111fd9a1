//! Cell value types

use std::fmt;

/// The computed value of a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Numeric value
    Number(f64),

    /// Text value
    String(String),

    /// Error sentinel (#ERROR!, #CIRCULAR!, etc.)
    Error(ErrorValue),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric reading of the value
    ///
    /// Numbers, and strings that parse fully as a finite number, are numeric.
    /// Empty cells, other text and errors are not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::String(s) => parse_numeric_text(s),
            _ => None,
        }
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of the value, as shown in the grid
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

/// Parse text as a number, the way aggregates and arithmetic read text cells
pub fn parse_numeric_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // Rust accepts "inf" and "NaN"; a grid does not
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number the way cells display it
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", n)
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<ErrorValue> for CellValue {
    fn from(e: ErrorValue) -> Self {
        CellValue::Error(e)
    }
}

/// In-cell error sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorValue {
    /// #ERROR! - Malformed formula or invalid operand
    Error,
    /// #CIRCULAR! - Cell is part of a reference cycle
    Circular,
    /// #DIV0! - Division by zero
    Div0,
    /// #REF! - Reference outside the grid
    Ref,
}

impl ErrorValue {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorValue::Error => "#ERROR!",
            ErrorValue::Circular => "#CIRCULAR!",
            ErrorValue::Div0 => "#DIV0!",
            ErrorValue::Ref => "#REF!",
        }
    }

    /// Parse an error sentinel
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "#ERROR!" => Some(ErrorValue::Error),
            "#CIRCULAR!" => Some(ErrorValue::Circular),
            "#DIV0!" => Some(ErrorValue::Div0),
            "#REF!" => Some(ErrorValue::Ref),
            _ => None,
        }
    }

    /// The error a formula produces when it reads this error
    ///
    /// Only the cells on a cycle are `#CIRCULAR!`; anything reading them,
    /// like anything reading `#ERROR!`, becomes `#ERROR!`.
    pub fn propagate(self) -> Self {
        match self {
            ErrorValue::Error | ErrorValue::Circular => ErrorValue::Error,
            other => other,
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42), CellValue::Number(42.0));
        assert_eq!(CellValue::from(3.5), CellValue::Number(3.5));

        let s = CellValue::from("hello");
        assert_eq!(s.as_str(), Some("hello"));
    }

    #[test]
    fn test_cell_value_as_number() {
        assert_eq!(CellValue::Number(42.0).as_number(), Some(42.0));
        assert_eq!(CellValue::string("12.5").as_number(), Some(12.5));
        assert_eq!(CellValue::string(" 7 ").as_number(), Some(7.0));
        assert_eq!(CellValue::string("hello").as_number(), None);
        assert_eq!(CellValue::string("inf").as_number(), None);
        assert_eq!(CellValue::string("NaN").as_number(), None);
        assert_eq!(CellValue::string("").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::Error(ErrorValue::Ref).as_number(), None);
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Number(-0.0).to_string(), "0");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Error(ErrorValue::Circular).to_string(), "#CIRCULAR!");
    }

    #[test]
    fn test_error_value_parse() {
        assert_eq!(ErrorValue::from_str("#ERROR!"), Some(ErrorValue::Error));
        assert_eq!(ErrorValue::from_str("#DIV0!"), Some(ErrorValue::Div0));
        assert_eq!(ErrorValue::from_str("#REF!"), Some(ErrorValue::Ref));
        assert_eq!(ErrorValue::from_str("#VALUE!"), None);
    }

    #[test]
    fn test_error_propagation() {
        assert_eq!(ErrorValue::Circular.propagate(), ErrorValue::Error);
        assert_eq!(ErrorValue::Error.propagate(), ErrorValue::Error);
        assert_eq!(ErrorValue::Div0.propagate(), ErrorValue::Div0);
        assert_eq!(ErrorValue::Ref.propagate(), ErrorValue::Ref);
    }
}
