use std::fmt;

use serde::{Deserialize, Serialize};

/// Field contents that decode to a missing value, on top of the empty string.
pub const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

/// A single output cell; `None` is the null value.
pub type Cell = Option<Value>;

impl Value {
    /// Renders the value, using `decimal` as the decimal separator for numbers.
    pub fn as_display(&self, decimal: char) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n, decimal),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display('.'))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

pub fn is_missing_token(raw: &str) -> bool {
    raw.is_empty() || MISSING_TOKENS.contains(&raw)
}

/// Decodes a raw field into a cell. Values are kept verbatim as text.
pub fn decode_cell(raw: &str) -> Cell {
    if is_missing_token(raw) {
        None
    } else {
        Some(Value::Text(raw.to_string()))
    }
}

/// Parses a `.`-decimal number. Surrounding whitespace is ignored; NaN is
/// treated as unparseable.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Coerces a cell to a number, turning anything unparseable into null.
pub fn coerce_numeric(cell: Cell) -> Cell {
    match cell {
        Some(Value::Number(n)) if !n.is_nan() => Some(Value::Number(n)),
        Some(Value::Text(text)) => parse_number(&text).map(Value::Number),
        _ => None,
    }
}

pub fn format_number(value: f64, decimal: char) -> String {
    let rendered = if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    };
    if decimal == '.' {
        rendered
    } else {
        rendered.replace('.', &decimal.to_string())
    }
}

pub fn display_cell(cell: &Cell, decimal: char) -> String {
    cell.as_ref()
        .map(|value| value.as_display(decimal))
        .unwrap_or_default()
}
