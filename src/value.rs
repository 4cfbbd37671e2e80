//! Scalar values exchanged between a running program and the core.
//!
//! The same five kinds are used for input requests, output writes and
//! inspected cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic type of a value requested from or written to the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Integer,
    Real,
    Boolean,
    Character,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Integer => "integer",
            DataType::Real => "real",
            DataType::Boolean => "boolean",
            DataType::Character => "character",
            DataType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

/// A scalar value of one of the five [`DataType`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Character(char),
    Text(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Real(_) => DataType::Real,
            Value::Boolean(_) => DataType::Boolean,
            Value::Character(_) => DataType::Character,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Convert this value to `target`, if the conversion is lossless.
    ///
    /// Integers widen to reals and characters widen to text; every other
    /// mismatch yields `None`.
    pub fn coerce_to(self, target: DataType) -> Option<Value> {
        match (self, target) {
            (v, t) if v.data_type() == t => Some(v),
            (Value::Integer(i), DataType::Real) => Some(Value::Real(i as f64)),
            (Value::Character(c), DataType::Text) => Some(Value::Text(c.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Character(c) => write!(f, "{}", c),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Character(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_same_type() {
        assert_eq!(
            Value::Integer(4).coerce_to(DataType::Integer),
            Some(Value::Integer(4))
        );
    }

    #[test]
    fn test_coerce_widening() {
        assert_eq!(Value::Integer(2).coerce_to(DataType::Real), Some(Value::Real(2.0)));
        assert_eq!(
            Value::Character('x').coerce_to(DataType::Text),
            Some(Value::Text("x".into()))
        );
    }

    #[test]
    fn test_coerce_rejects_narrowing() {
        assert_eq!(Value::Real(2.5).coerce_to(DataType::Integer), None);
        assert_eq!(Value::Text("true".into()).coerce_to(DataType::Boolean), None);
    }
}
