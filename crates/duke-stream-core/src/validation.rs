//! Data validation rules
//!
//! A rule restricts what users may later type into a set of ranges. Rules are
//! collected while a sheet is open and flushed with the sheet footer.
//!
//! ```rust
//! use duke_stream_core::{CellRange, DataValidation, ValidationOperator};
//!
//! let dropdown = DataValidation::list(["Yes", "No", "Maybe"])
//!     .with_range(CellRange::parse("B2:B100").unwrap())
//!     .with_error_message("Invalid value", "Pick one from the list");
//! assert!(dropdown.check().is_ok());
//!
//! let percent = DataValidation::decimal(ValidationOperator::Between, "0", Some("1"))
//!     .with_range(CellRange::parse("C2:C100").unwrap());
//! assert!(percent.check().is_ok());
//! ```

use crate::error::{Error, Result};
use crate::range::CellRange;

/// A validation rule applied to one or more ranges
#[derive(Debug, Clone, PartialEq)]
pub struct DataValidation {
    pub rule: ValidationRule,
    pub ranges: Vec<CellRange>,
    pub allow_blank: bool,
    /// Show the in-cell dropdown for list rules
    pub show_dropdown: bool,
    /// Title and text shown when a cell is selected
    pub prompt: Option<(String, String)>,
    /// Title and text shown when invalid data is entered
    pub error: Option<(String, String)>,
    pub error_style: ValidationErrorStyle,
}

impl DataValidation {
    fn with_rule(rule: ValidationRule) -> Self {
        Self {
            rule,
            ranges: Vec::new(),
            allow_blank: true,
            show_dropdown: true,
            prompt: None,
            error: None,
            error_style: ValidationErrorStyle::Stop,
        }
    }

    /// Dropdown of literal choices
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rule(ValidationRule::List(ListSource::Items(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    /// Dropdown whose choices come from a range, e.g. `Lists!$A$1:$A$5`
    pub fn list_from_range(range: CellRange) -> Self {
        Self::with_rule(ValidationRule::List(ListSource::Range(range)))
    }

    pub fn whole_number(
        operator: ValidationOperator,
        value1: impl Into<String>,
        value2: Option<&str>,
    ) -> Self {
        Self::with_rule(ValidationRule::Whole(Criterion::new(operator, value1, value2)))
    }

    pub fn decimal(
        operator: ValidationOperator,
        value1: impl Into<String>,
        value2: Option<&str>,
    ) -> Self {
        Self::with_rule(ValidationRule::Decimal(Criterion::new(operator, value1, value2)))
    }

    pub fn text_length(
        operator: ValidationOperator,
        value1: impl Into<String>,
        value2: Option<&str>,
    ) -> Self {
        Self::with_rule(ValidationRule::TextLength(Criterion::new(
            operator, value1, value2,
        )))
    }

    /// Formula that evaluates to TRUE for acceptable input
    pub fn custom(formula: impl Into<String>) -> Self {
        let formula = formula.into();
        let formula = formula.strip_prefix('=').map(str::to_string).unwrap_or(formula);
        Self::with_rule(ValidationRule::Custom(formula))
    }

    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn with_allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    pub fn with_dropdown(mut self, show: bool) -> Self {
        self.show_dropdown = show;
        self
    }

    pub fn with_prompt(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.prompt = Some((title.into(), message.into()));
        self
    }

    pub fn with_error_message(
        mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.error = Some((title.into(), message.into()));
        self
    }

    pub fn with_error_style(mut self, style: ValidationErrorStyle) -> Self {
        self.error_style = style;
        self
    }

    /// Check that the rule can be written
    ///
    /// A rule needs at least one range, two-value operators need both bounds,
    /// and a literal list must be non-empty with no item containing `,`.
    pub fn check(&self) -> Result<()> {
        if self.ranges.is_empty() {
            return Err(Error::InvalidValidation(
                "validation has no target range".to_string(),
            ));
        }

        match &self.rule {
            ValidationRule::List(ListSource::Items(items)) => {
                if items.is_empty() {
                    return Err(Error::InvalidValidation("list has no items".to_string()));
                }
                if let Some(item) = items.iter().find(|i| i.contains(',')) {
                    return Err(Error::InvalidValidation(format!(
                        "list item {item:?} contains a comma"
                    )));
                }
            }
            ValidationRule::List(ListSource::Range(_)) => {}
            ValidationRule::Whole(c) | ValidationRule::Decimal(c) | ValidationRule::TextLength(c) => {
                if c.operator.requires_two_values() && c.value2.is_none() {
                    return Err(Error::InvalidValidation(format!(
                        "operator {} needs two values",
                        c.operator.xml_value()
                    )));
                }
            }
            ValidationRule::Custom(formula) => {
                if formula.trim().is_empty() {
                    return Err(Error::InvalidValidation("empty formula".to_string()));
                }
            }
        }
        Ok(())
    }

    /// Whether any of the target ranges covers the cell
    pub fn applies_to(&self, column: u32, row: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(column, row))
    }
}

/// What a validation accepts
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    List(ListSource),
    Whole(Criterion),
    Decimal(Criterion),
    TextLength(Criterion),
    /// Formula without the leading `=`
    Custom(String),
}

impl ValidationRule {
    /// Value of the `type` attribute
    pub fn xml_type(&self) -> &'static str {
        match self {
            ValidationRule::List(_) => "list",
            ValidationRule::Whole(_) => "whole",
            ValidationRule::Decimal(_) => "decimal",
            ValidationRule::TextLength(_) => "textLength",
            ValidationRule::Custom(_) => "custom",
        }
    }

    pub fn criterion(&self) -> Option<&Criterion> {
        match self {
            ValidationRule::Whole(c) | ValidationRule::Decimal(c) | ValidationRule::TextLength(c) => {
                Some(c)
            }
            _ => None,
        }
    }
}

/// Where a list rule takes its choices from
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource {
    Items(Vec<String>),
    Range(CellRange),
}

/// Comparison against one or two bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub operator: ValidationOperator,
    pub value1: String,
    pub value2: Option<String>,
}

impl Criterion {
    pub fn new(operator: ValidationOperator, value1: impl Into<String>, value2: Option<&str>) -> Self {
        Self {
            operator,
            value1: value1.into(),
            value2: value2.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationOperator {
    #[default]
    Between,
    NotBetween,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl ValidationOperator {
    pub fn xml_value(self) -> &'static str {
        match self {
            ValidationOperator::Between => "between",
            ValidationOperator::NotBetween => "notBetween",
            ValidationOperator::Equal => "equal",
            ValidationOperator::NotEqual => "notEqual",
            ValidationOperator::GreaterThan => "greaterThan",
            ValidationOperator::LessThan => "lessThan",
            ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    pub fn requires_two_values(self) -> bool {
        matches!(self, ValidationOperator::Between | ValidationOperator::NotBetween)
    }
}

/// How hard the error alert pushes back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationErrorStyle {
    #[default]
    Stop,
    Warning,
    Information,
}

impl ValidationErrorStyle {
    pub fn xml_value(self) -> &'static str {
        match self {
            ValidationErrorStyle::Stop => "stop",
            ValidationErrorStyle::Warning => "warning",
            ValidationErrorStyle::Information => "information",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> CellRange {
        CellRange::parse(s).unwrap()
    }

    #[test]
    fn test_list_rule() {
        let v = DataValidation::list(["Red", "Green"]).with_range(range("A1:A10"));
        assert_eq!(v.rule.xml_type(), "list");
        assert_eq!(
            v.rule,
            ValidationRule::List(ListSource::Items(vec!["Red".into(), "Green".into()]))
        );
        assert!(v.check().is_ok());
    }

    #[test]
    fn test_list_item_with_comma_rejected() {
        let v = DataValidation::list(["a,b"]).with_range(range("A1"));
        assert!(matches!(v.check(), Err(Error::InvalidValidation(_))));

        let empty = DataValidation::list(Vec::<String>::new()).with_range(range("A1"));
        assert!(empty.check().is_err());
    }

    #[test]
    fn test_between_needs_two_values() {
        let v = DataValidation::whole_number(ValidationOperator::Between, "1", None)
            .with_range(range("B1:B5"));
        assert!(v.check().is_err());

        let v = DataValidation::whole_number(ValidationOperator::Between, "1", Some("100"))
            .with_range(range("B1:B5"));
        assert!(v.check().is_ok());
        let c = v.rule.criterion().unwrap();
        assert_eq!(c.value2.as_deref(), Some("100"));
    }

    #[test]
    fn test_rule_without_range_rejected() {
        let v = DataValidation::custom("=MOD(A1,5)=0");
        assert_eq!(v.rule, ValidationRule::Custom("MOD(A1,5)=0".into()));
        assert!(v.check().is_err());
    }

    #[test]
    fn test_applies_to() {
        let v = DataValidation::text_length(ValidationOperator::LessThan, "10", None)
            .with_range(range("A1:C10"));
        assert!(v.applies_to(1, 1));
        assert!(v.applies_to(3, 10));
        assert!(!v.applies_to(1, 11));
        assert!(!v.applies_to(4, 1));
    }
}
