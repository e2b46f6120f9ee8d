//! Cell value types

use lazy_regex::{regex_captures, regex_is_match};
use std::fmt;

/// The displayed content of a cell
///
/// Literal cells hold whatever the user typed (a number or free text). Formula
/// cells hold their last computed result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CellValue {
    /// Numeric value
    Number(f64),
    /// Text value (headers, descriptions, unparseable input)
    Text(String),
}

impl CellValue {
    /// The value of a cell that was never written
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Check if this is the empty text value
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Exact numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// Numeric value used by formulas
    ///
    /// Numbers are taken as-is; text contributes its leading number
    /// (`"12 kg"` is 12), or nothing when it has none.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_leading_number(s),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Raw user input, classified
///
/// Input starting with `=` is a formula; otherwise a complete decimal number
/// becomes a number and anything else is kept verbatim as text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Formula text, including the leading `=`
    Formula(String),
    /// Numeric literal
    Number(f64),
    /// Free text
    Text(String),
}

impl CellContent {
    /// Classify raw input. Never fails.
    ///
    /// # Examples
    /// ```
    /// use moneyflow_core::CellContent;
    ///
    /// assert_eq!(CellContent::parse("42"), CellContent::Number(42.0));
    /// assert_eq!(CellContent::parse("=D2-E2"), CellContent::Formula("=D2-E2".into()));
    /// assert_eq!(CellContent::parse("Rent"), CellContent::Text("Rent".into()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with('=') {
            return CellContent::Formula(raw.to_string());
        }

        let trimmed = raw.trim();
        if regex_is_match!(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$", trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                return CellContent::Number(n);
            }
        }

        CellContent::Text(raw.to_string())
    }
}

/// Parse the longest leading decimal number of `text`
///
/// Leading whitespace is skipped and trailing garbage is ignored, so `"3.5m"`
/// yields 3.5 and `"1e"` yields 1. Returns `None` when no digits lead the text.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let (_, number) = regex_captures!(
        r"^\s*([+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))",
        text
    )?;

    match number.trim_start_matches(['+', '-']) {
        "Infinity" if number.starts_with('-') => Some(f64::NEG_INFINITY),
        "Infinity" => Some(f64::INFINITY),
        _ => number.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_content_classification() {
        assert_eq!(CellContent::parse("42"), CellContent::Number(42.0));
        assert_eq!(CellContent::parse(" -3.5 "), CellContent::Number(-3.5));
        assert_eq!(CellContent::parse(".5"), CellContent::Number(0.5));
        assert_eq!(CellContent::parse("1e3"), CellContent::Number(1000.0));
        assert_eq!(CellContent::parse("hello"), CellContent::Text("hello".into()));
        assert_eq!(CellContent::parse("12 kg"), CellContent::Text("12 kg".into()));
        assert_eq!(CellContent::parse(""), CellContent::Text(String::new()));
        assert_eq!(CellContent::parse("inf"), CellContent::Text("inf".into()));
        assert_eq!(CellContent::parse("NaN"), CellContent::Text("NaN".into()));
    }

    #[test]
    fn test_formula_detection_keeps_raw_text() {
        assert_eq!(
            CellContent::parse("=SUM(D2:D8)"),
            CellContent::Formula("=SUM(D2:D8)".into())
        );
        // A leading space means the user typed text, not a formula
        assert_eq!(
            CellContent::parse(" =1"),
            CellContent::Text(" =1".into())
        );
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("1500"), Some(1500.0));
        assert_eq!(parse_leading_number("  42abc"), Some(42.0));
        assert_eq!(parse_leading_number("3.5m"), Some(3.5));
        assert_eq!(parse_leading_number("1e"), Some(1.0));
        assert_eq!(parse_leading_number("-2.5e2x"), Some(-250.0));
        assert_eq!(parse_leading_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_leading_number("Income"), None);
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("."), None);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(CellValue::Number(7.0).coerce_number(), Some(7.0));
        assert_eq!(CellValue::from("250 birr").coerce_number(), Some(250.0));
        assert_eq!(CellValue::from("Total").coerce_number(), None);
        assert_eq!(CellValue::empty().coerce_number(), None);
        assert_eq!(CellValue::from("Total").as_number(), None);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn finite_numbers_classify_as_numbers(n in -1e12f64..1e12) {
                prop_assert_eq!(CellContent::parse(&n.to_string()), CellContent::Number(n));
            }

            #[test]
            fn leading_equals_is_always_a_formula(body in ".*") {
                let raw = format!("={}", body);
                prop_assert_eq!(CellContent::parse(&raw), CellContent::Formula(raw.clone()));
            }

            #[test]
            fn numeric_input_has_a_leading_number(raw in ".*") {
                if let CellContent::Number(n) = CellContent::parse(&raw) {
                    prop_assert_eq!(parse_leading_number(&raw), Some(n));
                }
            }
        }
    }
}
