use std::fmt;

use crate::schema::ColumnType;

/// Placeholder used when a missing cell takes part in an identity key.
pub const MISSING_KEY_TOKEN: &str = "nan";

/// Raw cell texts read as a missing value, in addition to the empty cell.
pub const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_null_token(raw: &str) -> bool {
    raw.is_empty() || NULL_TOKENS.contains(&raw)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    /// Canonical text form. Floats always keep a fractional part or exponent
    /// (`2016.0`, never `2016`) so integer and float cells stay distinguishable.
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "inf".to_string()
        } else {
            "-inf".to_string()
        }
    } else {
        // Debug formatting keeps the trailing `.0` on integral floats.
        format!("{value:?}")
    }
}

/// Text used for a cell inside an identity key.
pub fn key_repr(value: Option<&Value>) -> String {
    value
        .map(Value::as_display)
        .unwrap_or_else(|| MISSING_KEY_TOKEN.to_string())
}

/// Text used for a cell in CSV output; missing cells become empty fields.
pub fn output_repr(value: Option<&Value>) -> String {
    value.map(Value::as_display).unwrap_or_default()
}

pub fn parse_typed_value(value: &str, ty: ColumnType) -> Result<Option<Value>, String> {
    if is_null_token(value) {
        return Ok(None);
    }
    let parsed = match ty {
        ColumnType::String => Value::String(value.to_string()),
        ColumnType::Integer => {
            let parsed: i64 = value
                .parse()
                .map_err(|_| format!("Failed to parse '{value}' as integer"))?;
            Value::Integer(parsed)
        }
        ColumnType::Float => {
            let parsed: f64 = value
                .parse()
                .map_err(|_| format!("Failed to parse '{value}' as float"))?;
            Value::Float(parsed)
        }
    };
    Ok(Some(parsed))
}
