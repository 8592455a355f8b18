//! Typed flag values and string coercion.
//!
//! Flags travel through the tokenizer as raw strings. A [`Value`] is what a
//! handler gets back after the raw string has been converted according to the
//! flag's declared [`DataType`].

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The declared type of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Int,
    Float,
    Bool,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(DataType::String),
            "int" => Ok(DataType::Int),
            "float" => Ok(DataType::Float),
            "bool" => Ok(DataType::Bool),
            other => Err(format!("unknown data type '{other}'")),
        }
    }
}

/// A flag value tagged with its type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// The type tag carried by this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Str(_) => DataType::String,
            Value::Int(_) => DataType::Int,
            Value::Float(_) => DataType::Float,
            Value::Bool(_) => DataType::Bool,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Canonical string form, the same one [`coerce`] accepts back.
///
/// Floats are rendered fixed-point with six decimals (`1.200000`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:.6}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A raw flag string that could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{value}' to {data_type}")]
pub struct ConversionError {
    pub value: String,
    pub data_type: DataType,
}

/// Converts a raw flag string into a typed [`Value`].
///
/// Booleans accept `1`, `t`, `T`, `TRUE`, `true`, `True` and their false
/// counterparts. Strings are passed through unchanged.
pub fn coerce(raw: &str, data_type: DataType) -> Result<Value, ConversionError> {
    let fail = || ConversionError {
        value: raw.to_string(),
        data_type,
    };
    match data_type {
        DataType::String => Ok(Value::Str(raw.to_string())),
        DataType::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| fail()),
        DataType::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| fail()),
        DataType::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(fail),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
