//! Runtime value types

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime value
///
/// Integers are never negative. Construction from text and from arithmetic
/// results collapses non-negative integral floats into `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Value {
    Int(u64),
    Float(f64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    Bool,
    Str,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Int => "int",
            ValueType::Float => "double",
            ValueType::Bool => "bool",
            ValueType::Str => "str",
        })
    }
}

/// Mutation rejected by a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("{0} values are not numeric")]
    NotNumeric(ValueType),
    #[error("integer overflow")]
    Overflow,
}

impl Value {
    /// Classify a textual literal
    ///
    /// Precedence: strip surrounding quotes, then non-negative integer, then
    /// float, then `true`/`false`, then string.
    pub fn parse(text: &str) -> Value {
        let text = unquote(text);

        if let Ok(n) = text.parse::<u64>() {
            return Value::Int(n);
        }
        if text.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = text.parse::<f64>() {
                return Value::from_float(f);
            }
        }
        match text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Str(text),
        }
    }

    /// Build a numeric value, collapsing non-negative integral floats to `Int`
    pub fn from_float(f: f64) -> Value {
        if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
            Value::Int(f as u64)
        } else {
            Value::Float(f)
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::Str(_) => ValueType::Str,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Add one. Fails without mutating on non-numeric values.
    pub fn increment(&mut self) -> Result<(), ValueError> {
        match self {
            Value::Int(n) => *n = n.checked_add(1).ok_or(ValueError::Overflow)?,
            Value::Float(f) => *f += 1.0,
            other => return Err(ValueError::NotNumeric(other.value_type())),
        }
        Ok(())
    }

    /// Subtract one. Integers stop at zero.
    pub fn decrement(&mut self) -> Result<(), ValueError> {
        match self {
            Value::Int(n) => *n = n.saturating_sub(1),
            Value::Float(f) => *f -= 1.0,
            other => return Err(ValueError::NotNumeric(other.value_type())),
        }
        Ok(())
    }

    /// Reset to zero, keeping the numeric type
    pub fn clear(&mut self) -> Result<(), ValueError> {
        match self {
            Value::Int(n) => *n = 0,
            Value::Float(f) => *f = 0.0,
            other => return Err(ValueError::NotNumeric(other.value_type())),
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Strip one pair of surrounding double quotes and unescape `\"`
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    inner.replace("\\\"", "\"")
}
