//! Session-level types.

use crate::visa::ViStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Driver session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Initialize has not completed.
    Unopened,
    /// A device handle is held.
    Open,
    /// The device handle has been released.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unopened => "unopened",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Options passed to the driver's initialize entry point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOptions {
    /// Query the instrument ID and verify it is supported.
    #[serde(default)]
    pub id_query: bool,

    /// Reset the device during initialization.
    #[serde(default)]
    pub reset_device: bool,

    /// Driver-specific option string (e.g. `"Simulate=1"`).
    #[serde(default)]
    pub option_string: String,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_query(mut self, enabled: bool) -> Self {
        self.id_query = enabled;
        self
    }

    pub fn reset_device(mut self, enabled: bool) -> Self {
        self.reset_device = enabled;
        self
    }

    pub fn option_string(mut self, options: impl Into<String>) -> Self {
        self.option_string = options.into();
        self
    }
}

/// A non-fatal driver status (positive code).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverWarning {
    pub code: ViStatus,
    pub description: String,
}

impl fmt::Display for DriverWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Driver warning {}: {}", self.code, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_options_defaults() {
        let options = OpenOptions::default();
        assert!(!options.id_query);
        assert!(!options.reset_device);
        assert!(options.option_string.is_empty());
    }

    #[test]
    fn test_open_options_builder() {
        let options = OpenOptions::new()
            .id_query(true)
            .option_string("Simulate=1");
        assert!(options.id_query);
        assert!(!options.reset_device);
        assert_eq!(options.option_string, "Simulate=1");
    }
}
