//! Native values exchanged with driver entry points.

use crate::visa::ViSession;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A driver value in its native Rust representation.
///
/// Inputs to the function invoker are given as `Value`s and outputs come back
/// as `Value`s, in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// `ViBoolean`.
    Boolean(bool),

    /// `ViInt16`.
    Int16(i16),

    /// `ViInt32`.
    Int32(i32),

    /// `ViInt64`.
    Int64(i64),

    /// Unsigned 32-bit value (`ViAttr`, `ViUInt32`).
    UInt32(u32),

    /// `ViReal64`.
    Real64(f64),

    /// `ViConstString` input or `ViChar[]` output.
    String(String),

    /// `ViSession` produced by the initialize entry point.
    Session(ViSession),
}

impl Value {
    /// Try to extract as a signed integer. Only integral variants convert.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            Self::UInt32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Try to extract as f64. Integral variants widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real64(v) => Some(*v),
            Self::Int16(v) => Some(f64::from(*v)),
            Self::Int32(v) => Some(f64::from(*v)),
            Self::UInt32(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Try to extract as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to extract as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract as a device handle.
    pub fn as_session(&self) -> Option<ViSession> {
        match self {
            Self::Session(vi) => Some(*vi),
            _ => None,
        }
    }

    /// Name of the variant, used in usage-error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "ViBoolean",
            Self::Int16(_) => "ViInt16",
            Self::Int32(_) => "ViInt32",
            Self::Int64(_) => "ViInt64",
            Self::UInt32(_) => "ViUInt32",
            Self::Real64(_) => "ViReal64",
            Self::String(_) => "ViString",
            Self::Session(_) => "ViSession",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Real64(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Session(vi) => write!(f, "session {vi}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widening() {
        assert_eq!(Value::Int16(-3).as_i64(), Some(-3));
        assert_eq!(Value::UInt32(1_000_001).as_i64(), Some(1_000_001));
        assert_eq!(Value::Int32(7).as_f64(), Some(7.0));
        assert_eq!(Value::Real64(1.5).as_i64(), None);
    }

    #[test]
    fn test_strict_extraction() {
        assert_eq!(Value::from("potato").as_i64(), None);
        assert_eq!(Value::Int32(1).as_bool(), None);
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::Session(42).as_session(), Some(42));
    }
}
