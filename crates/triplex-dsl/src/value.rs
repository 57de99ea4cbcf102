//! Typed scalar values.
//!
//! A `TypedValue` carries exactly one primitive payload; its `ValueType`
//! discriminant is fixed at construction. Stored entity properties arrive as
//! raw text and are parsed into the discriminant a predicate declares; there
//! is no implicit coercion between discriminants.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Discriminant
// ============================================================================

/// The discriminant of a `TypedValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Int32,
    Int64,
    #[serde(rename = "uint")]
    UInt,
    Bool,
    Float,
    Double,
}

impl ValueType {
    /// Every declared discriminant, in declaration order.
    pub const ALL: [ValueType; 7] = [
        ValueType::String,
        ValueType::Int32,
        ValueType::Int64,
        ValueType::UInt,
        ValueType::Bool,
        ValueType::Float,
        ValueType::Double,
    ];

    /// Number of declared discriminants.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..COUNT`, usable for table dispatch.
    pub const fn index(self) -> usize {
        match self {
            ValueType::String => 0,
            ValueType::Int32 => 1,
            ValueType::Int64 => 2,
            ValueType::UInt => 3,
            ValueType::Bool => 4,
            ValueType::Float => 5,
            ValueType::Double => 6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int32 => "int32",
            ValueType::Int64 => "int64",
            ValueType::UInt => "uint",
            ValueType::Bool => "bool",
            ValueType::Float => "float",
            ValueType::Double => "double",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Values
// ============================================================================

/// A discriminated scalar value.
///
/// JSON form is adjacently tagged: `{"type": "int32", "value": 30}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    String(String),
    Int32(i32),
    Int64(i64),
    #[serde(rename = "uint")]
    UInt(u32),
    Bool(bool),
    Float(f32),
    Double(f64),
}

impl TypedValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::String(_) => ValueType::String,
            TypedValue::Int32(_) => ValueType::Int32,
            TypedValue::Int64(_) => ValueType::Int64,
            TypedValue::UInt(_) => ValueType::UInt,
            TypedValue::Bool(_) => ValueType::Bool,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::Double(_) => ValueType::Double,
        }
    }

    /// Parse raw stored text into a value of discriminant `ty`.
    ///
    /// Lexical forms:
    /// - `string`: the bytes verbatim (must be UTF-8)
    /// - integers and floats: Rust's standard literal syntax, surrounding
    ///   ASCII whitespace ignored
    /// - `bool`: `true` / `false` (ASCII case-insensitive) or `1` / `0`
    pub fn parse(raw: &[u8], ty: ValueType) -> Result<TypedValue, ParseValueError> {
        let text = std::str::from_utf8(raw).map_err(|_| ParseValueError::InvalidUtf8 {
            expected: ty,
        })?;

        let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
        let invalid = || ParseValueError::Invalid {
            expected: ty,
            text: text.to_string(),
        };

        let value = match ty {
            ValueType::String => TypedValue::String(text.to_string()),
            ValueType::Int32 => TypedValue::Int32(trimmed.parse().map_err(|_| invalid())?),
            ValueType::Int64 => TypedValue::Int64(trimmed.parse().map_err(|_| invalid())?),
            ValueType::UInt => TypedValue::UInt(trimmed.parse().map_err(|_| invalid())?),
            ValueType::Float => TypedValue::Float(trimmed.parse().map_err(|_| invalid())?),
            ValueType::Double => TypedValue::Double(trimmed.parse().map_err(|_| invalid())?),
            ValueType::Bool => TypedValue::Bool(parse_bool(trimmed).ok_or_else(invalid)?),
        };
        Ok(value)
    }

    /// Parse from `&str`; convenience for callers that already hold text.
    pub fn parse_str(text: &str, ty: ValueType) -> Result<TypedValue, ParseValueError> {
        Self::parse(text.as_bytes(), ty)
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => write!(f, "string({s:?})"),
            TypedValue::Int32(v) => write!(f, "int32({v})"),
            TypedValue::Int64(v) => write!(f, "int64({v})"),
            TypedValue::UInt(v) => write!(f, "uint({v})"),
            TypedValue::Bool(v) => write!(f, "bool({v})"),
            TypedValue::Float(v) => write!(f, "float({v})"),
            TypedValue::Double(v) => write!(f, "double({v})"),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::String(value)
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        TypedValue::Int32(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Int64(value)
    }
}

impl From<u32> for TypedValue {
    fn from(value: u32) -> Self {
        TypedValue::UInt(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Bool(value)
    }
}

impl From<f32> for TypedValue {
    fn from(value: f32) -> Self {
        TypedValue::Float(value)
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        TypedValue::Double(value)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("expected {expected} value, got non-UTF-8 bytes")]
    InvalidUtf8 { expected: ValueType },
    #[error("invalid {expected} value: {text:?}")]
    Invalid { expected: ValueType, text: String },
}

impl ParseValueError {
    pub fn expected(&self) -> ValueType {
        match self {
            ParseValueError::InvalidUtf8 { expected } | ParseValueError::Invalid { expected, .. } => {
                *expected
            }
        }
    }
}
