//! Cells and rows as they travel from the writer to the sink

use crate::error::{Error, Result};
use crate::style::StyleId;
use std::fmt;

/// How a cell's raw value is interpreted and encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    /// Text; inline unless the writer routes it through the shared-string table
    Text,
    /// Numeric literal
    Number,
    /// Formula expression, without the leading `=`
    Formula,
    /// Text always stored in the shared-string table
    SharedString,
    /// `1` or `0`
    Boolean,
    /// Error literal such as `#N/A`
    Error,
}

impl CellType {
    pub fn name(self) -> &'static str {
        match self {
            CellType::Text => "text",
            CellType::Number => "number",
            CellType::Formula => "formula",
            CellType::SharedString => "shared string",
            CellType::Boolean => "boolean",
            CellType::Error => "error",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error literals accepted for [`CellType::Error`]
pub const ERROR_LITERALS: [&str; 7] = [
    "#NULL!", "#DIV/0!", "#VALUE!", "#REF!", "#NAME?", "#NUM!", "#N/A",
];

/// A cell to be written into the open row
///
/// # Example
///
/// ```
/// use duke_stream_core::{Cell, CellType};
///
/// let cell = Cell::number(42.5).at_column(3);
/// assert_eq!(cell.cell_type, CellType::Number);
/// assert_eq!(cell.value, "42.5");
/// assert_eq!(cell.column, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Raw value, interpreted according to `cell_type`
    pub value: String,
    pub cell_type: CellType,
    /// Explicit 1-based column; `None` continues after the previous cell
    pub column: Option<u32>,
    pub style: Option<StyleId>,
}

impl Cell {
    pub fn new(value: impl Into<String>, cell_type: CellType) -> Self {
        Self {
            value: value.into(),
            cell_type,
            column: None,
            style: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(value, CellType::Text)
    }

    pub fn shared_string(value: impl Into<String>) -> Self {
        Self::new(value, CellType::SharedString)
    }

    pub fn number(value: f64) -> Self {
        Self::new(value.to_string(), CellType::Number)
    }

    pub fn integer(value: i64) -> Self {
        Self::new(value.to_string(), CellType::Number)
    }

    pub fn formula(expression: impl Into<String>) -> Self {
        Self::new(expression, CellType::Formula)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(if value { "1" } else { "0" }, CellType::Boolean)
    }

    pub fn error(literal: impl Into<String>) -> Self {
        Self::new(literal, CellType::Error)
    }

    /// Place the cell in an explicit column
    pub fn at_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }

    /// Check the raw value against the declared type and return the
    /// canonical text to hand to the sink
    ///
    /// Formulas lose a leading `=`, booleans become `1`/`0`, error literals
    /// are upper-cased. Text values are returned unchanged.
    pub fn canonical_value(&self) -> Result<String> {
        let invalid = || Error::InvalidCellValue {
            cell_type: self.cell_type.name(),
            value: self.value.clone(),
        };

        match self.cell_type {
            CellType::Text | CellType::SharedString => Ok(self.value.clone()),
            CellType::Number => {
                let trimmed = self.value.trim();
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(trimmed.to_string()),
                    _ => Err(invalid()),
                }
            }
            CellType::Formula => {
                let expr = self.value.trim();
                let expr = expr.strip_prefix('=').unwrap_or(expr);
                if expr.is_empty() {
                    return Err(invalid());
                }
                Ok(expr.to_string())
            }
            CellType::Boolean => match self.value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Ok("1".to_string()),
                "0" | "false" => Ok("0".to_string()),
                _ => Err(invalid()),
            },
            CellType::Error => {
                let upper = self.value.trim().to_ascii_uppercase();
                if ERROR_LITERALS.contains(&upper.as_str()) {
                    Ok(upper)
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// Per-row settings supplied when a row is opened
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowOptions {
    /// Explicit 1-based row number; `None` continues after the last row
    pub number: Option<u32>,
    pub hidden: bool,
    /// Height in points
    pub height: Option<f64>,
    /// Row-level default format
    pub style: Option<StyleId>,
}

impl RowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }
}

/// A cell as delivered to the sink
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    /// 1-based column
    pub column: u32,
    pub cell_type: CellType,
    /// Canonical value; the shared-string index for [`CellType::SharedString`]
    pub raw_value: String,
    pub style: Option<StyleId>,
}

/// A completed row as delivered to the sink
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowRecord {
    /// 1-based row number
    pub number: u32,
    pub hidden: bool,
    pub height: Option<f64>,
    pub style: Option<StyleId>,
    /// Cells in strictly increasing column order
    pub cells: Vec<CellRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(Cell::number(30.0).canonical_value().unwrap(), "30");
        assert_eq!(Cell::integer(-7).canonical_value().unwrap(), "-7");
        assert_eq!(
            Cell::new(" 1e3 ", CellType::Number).canonical_value().unwrap(),
            "1e3"
        );
        assert!(Cell::new("abc", CellType::Number).canonical_value().is_err());
        assert!(Cell::number(f64::NAN).canonical_value().is_err());
        assert!(Cell::number(f64::INFINITY).canonical_value().is_err());
    }

    #[test]
    fn test_canonical_formula_strips_equals() {
        assert_eq!(
            Cell::formula("=SUM(A2:D2)").canonical_value().unwrap(),
            "SUM(A2:D2)"
        );
        assert_eq!(Cell::formula("A1*2").canonical_value().unwrap(), "A1*2");
        assert!(Cell::formula("=").canonical_value().is_err());
    }

    #[test]
    fn test_canonical_boolean_and_error() {
        assert_eq!(Cell::boolean(true).canonical_value().unwrap(), "1");
        assert_eq!(
            Cell::new("FALSE", CellType::Boolean).canonical_value().unwrap(),
            "0"
        );
        assert!(Cell::new("yes", CellType::Boolean).canonical_value().is_err());

        assert_eq!(Cell::error("#n/a").canonical_value().unwrap(), "#N/A");
        assert!(matches!(
            Cell::error("#OOPS").canonical_value(),
            Err(Error::InvalidCellValue { cell_type: "error", .. })
        ));
    }

    #[test]
    fn test_text_is_untouched() {
        let cell = Cell::text("  spaced  ");
        assert_eq!(cell.canonical_value().unwrap(), "  spaced  ");
    }
}
