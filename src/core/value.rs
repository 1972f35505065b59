use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::primitives::{
    NumberText, datetime_to_epoch_millis, datetime_to_key, decimal_to_f64,
};
use crate::error::{ChartError, ChartResult};

/// Untyped value produced by an accessor.
///
/// Numeric roles coerce with [`Value::to_number`]; categorical roles compare
/// by [`Value::canonical_key`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Time(DateTime<Utc>),
    Text(String),
}

impl Value {
    /// Numeric cast used wherever a number is expected.
    ///
    /// Booleans map to 1/0, timestamps to epoch milliseconds, text is parsed
    /// after trimming (blank text is 0). Anything else is NaN, which callers
    /// must filter rather than expect to be zeroed.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => f64::NAN,
            Self::Bool(flag) => f64::from(u8::from(*flag)),
            Self::Number(value) => *value,
            Self::Time(time) => datetime_to_epoch_millis(*time),
            Self::Text(text) => parse_number(text),
        }
    }

    /// Canonical string form used to group records into stacks.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(flag) => flag.to_string(),
            Self::Number(value) => NumberText(*value).to_string(),
            Self::Time(time) => datetime_to_key(*time),
            Self::Text(text) => text.clone(),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_key())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl TryFrom<Decimal> for Value {
    type Error = ChartError;

    fn try_from(value: Decimal) -> ChartResult<Self> {
        decimal_to_f64(value, "decimal value").map(Self::Number)
    }
}
