//! Typed parsers for dynamic path segments.
//!
//! # Responsibilities
//! - Name one dynamic segment of a route path
//! - Decode the raw captured string into a typed value
//!
//! # Design Decisions
//! - Parsers are plain data (name + fn pointer), cheap to clone
//! - A failed decode carries no detail; callers get one opaque error
//! - Integers must round-trip exactly, so `"123abc"` or `"007"` are rejected

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The single failure a parameter decode can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid url path")]
pub struct PathParseError;

/// A decoded path parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Str(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            ParamValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::Int(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

/// Decode function for one raw capture. `None` means the transport captured nothing.
pub type DecodeFn = fn(Option<&str>) -> Result<ParamValue, PathParseError>;

/// A named decoder for one dynamic URL segment.
#[derive(Clone)]
pub struct ParamParser {
    name: String,
    decode: DecodeFn,
}

impl ParamParser {
    /// Build a parser from a name and a custom decode function.
    pub fn new(name: impl Into<String>, decode: DecodeFn) -> Self {
        Self {
            name: name.into(),
            decode,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decode a raw value captured for this parameter.
    pub fn decode(&self, raw: Option<&str>) -> Result<ParamValue, PathParseError> {
        (self.decode)(raw)
    }
}

impl fmt::Debug for ParamParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamParser")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// String parameter: any non-empty value, returned unchanged.
pub fn str(name: impl Into<String>) -> ParamParser {
    ParamParser::new(name, decode_str)
}

/// Base-10 integer parameter.
pub fn int(name: impl Into<String>) -> ParamParser {
    ParamParser::new(name, decode_int)
}

fn decode_str(raw: Option<&str>) -> Result<ParamValue, PathParseError> {
    match raw {
        Some(value) if !value.is_empty() => Ok(ParamValue::Str(value.to_string())),
        _ => Err(PathParseError),
    }
}

fn decode_int(raw: Option<&str>) -> Result<ParamValue, PathParseError> {
    let raw = raw.filter(|v| !v.is_empty()).ok_or(PathParseError)?;
    let parsed: i64 = raw.parse().map_err(|_| PathParseError)?;

    // i64::from_str accepts "+5" and "007"; only the canonical rendering is a valid id
    if parsed.to_string() != raw {
        return Err(PathParseError);
    }

    Ok(ParamValue::Int(parsed))
}
