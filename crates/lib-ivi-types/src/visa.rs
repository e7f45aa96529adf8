//! VISA/IVI-C scalar types and status classification.
//!
//! These aliases mirror the C typedefs used by IVI-C driver headers so that
//! entry-point metadata reads like the driver's own prototypes.

use serde::{Deserialize, Serialize};

/// Opaque device handle returned by the driver's initialize entry point.
pub type ViSession = u32;

/// Signed status returned by every driver entry point.
pub type ViStatus = i32;

/// Attribute identifier.
pub type ViAttr = u32;

/// IVI boolean (`unsigned short` in C).
pub type ViBoolean = u16;

pub type ViInt16 = i16;
pub type ViInt32 = i32;
pub type ViInt64 = i64;
pub type ViReal64 = f64;

pub const VI_TRUE: ViBoolean = 1;
pub const VI_FALSE: ViBoolean = 0;

/// Handle value used when no device handle exists yet.
pub const VI_NULL: ViSession = 0;

/// Successful completion.
pub const VI_SUCCESS: ViStatus = 0;

/// How a driver status code must be treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    /// Status is zero.
    Success,
    /// Positive status: the call completed and its outputs are valid.
    Warning,
    /// Negative status: the call failed and its outputs must be discarded.
    Error,
}

impl StatusKind {
    /// Classify a raw status code.
    pub fn of(status: ViStatus) -> Self {
        match status {
            0 => Self::Success,
            s if s > 0 => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// Convert a Rust `bool` to an IVI boolean.
pub fn to_vi_boolean(value: bool) -> ViBoolean {
    if value {
        VI_TRUE
    } else {
        VI_FALSE
    }
}

/// Convert an IVI boolean to `bool`. Any non-zero value is true.
pub fn from_vi_boolean(value: ViBoolean) -> bool {
    value != VI_FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_kind_classification() {
        assert_eq!(StatusKind::of(0), StatusKind::Success);
        assert_eq!(StatusKind::of(15), StatusKind::Warning);
        assert_eq!(StatusKind::of(-42), StatusKind::Error);
        assert_eq!(StatusKind::of(i32::MIN), StatusKind::Error);
    }

    #[test]
    fn test_boolean_conversion() {
        assert_eq!(to_vi_boolean(true), VI_TRUE);
        assert_eq!(to_vi_boolean(false), VI_FALSE);
        assert!(from_vi_boolean(2));
        assert!(!from_vi_boolean(VI_FALSE));
    }
}
