// ============================================================
// CELL VALUE
// ============================================================
// Scalar held by one cell of an imported or exported row

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static NUMERIC_LITERAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").unwrap()
});

/// Largest integer an f64 represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single typed cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Absent value, serialized as `null`
    Empty,
}

impl CellValue {
    /// Classify raw field text into a typed value.
    ///
    /// Booleans and numeric literals are recognised; the empty string becomes
    /// `Empty`; everything else is kept verbatim as `Text`.
    pub fn classify(raw: &str) -> Self {
        match raw {
            "true" | "TRUE" | "True" => return CellValue::Bool(true),
            "false" | "FALSE" | "False" => return CellValue::Bool(false),
            "" => return CellValue::Empty,
            _ => {}
        }

        if NUMERIC_LITERAL_PATTERN.is_match(raw) {
            if let Ok(number) = raw.trim().parse::<f64>() {
                if number.is_finite() && !exceeds_safe_integer(raw, number) {
                    return CellValue::Number(number);
                }
            }
        }

        CellValue::Text(raw.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Text shown in an exported cell
    pub fn display_text(&self) -> String {
        self.to_string()
    }

    /// Character count of the rendered cell, used for column sizing
    pub fn display_len(&self) -> usize {
        self.display_text().chars().count()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::Number(number) => write!(f, "{}", format_number(*number)),
            CellValue::Text(text) => write!(f, "{}", text),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Integers without a decimal point, everything else in shortest round-trip form.
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

fn exceeds_safe_integer(raw: &str, number: f64) -> bool {
    let trimmed = raw.trim();
    let is_integer_literal = !trimmed.contains(['.', 'e', 'E']);
    is_integer_literal && number.abs() > MAX_SAFE_INTEGER
}
