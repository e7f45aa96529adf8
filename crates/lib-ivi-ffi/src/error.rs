//! Error types for driver session operations.

use lib_ivi_types::{SessionState, ViSession, ViStatus};
use thiserror::Error;

/// Errors that can occur while talking to an IVI-C driver.
#[derive(Debug, Error)]
pub enum IviError {
    /// A driver entry point returned a negative status.
    #[error("Driver error {code}: {description}")]
    Driver {
        code: ViStatus,
        description: String,
        session: Option<ViSession>,
    },

    /// Operation attempted on a session that is not open.
    #[error("Invalid session state: expected {expected}, got {actual}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    /// Wrong number of inputs passed to an entry point.
    #[error("{function} expects {expected} input(s), got {got}")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    /// Input value does not match the declared parameter type.
    #[error("{function}: parameter '{param}' expects {expected}, got {got}")]
    TypeMismatch {
        function: String,
        param: String,
        expected: String,
        got: String,
    },

    /// Input value has the right type but cannot be marshalled.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Attribute name not present in the catalog.
    #[error("Unknown attribute '{0}'")]
    UnknownAttribute(String),

    /// No driver library has been installed or loaded.
    #[error("Driver library not initialized")]
    LibraryNotInitialized,

    /// Failed to load the shared library.
    #[cfg(feature = "native")]
    #[error("Failed to load library '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: libloading::Error,
    },

    /// Required entry point not found in the library.
    #[error("Symbol '{symbol}' not found in library")]
    SymbolNotFound { symbol: String },

    /// I/O error reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration.
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON configuration.
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but is semantically invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IviError {
    /// Create a driver error.
    pub fn driver(code: ViStatus, description: impl Into<String>, session: Option<ViSession>) -> Self {
        Self::Driver {
            code,
            description: description.into(),
            session,
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(expected: SessionState, actual: SessionState) -> Self {
        Self::InvalidState { expected, actual }
    }

    /// Create a library load error.
    #[cfg(feature = "native")]
    pub fn load_error(path: impl Into<String>, source: libloading::Error) -> Self {
        Self::LoadError {
            path: path.into(),
            source,
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(symbol: impl Into<String>) -> Self {
        Self::SymbolNotFound {
            symbol: symbol.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Driver status code, for driver errors.
    pub fn code(&self) -> Option<ViStatus> {
        match self {
            Self::Driver { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Driver-provided description, for driver errors.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Driver { description, .. } => Some(description),
            _ => None,
        }
    }

    /// Check if the device reported this failure.
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::Driver { .. })
    }

    /// Check if this reflects a caller or binding mistake rather than a device failure.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::ArityMismatch { .. }
                | Self::TypeMismatch { .. }
                | Self::InvalidParameter { .. }
                | Self::UnknownAttribute(_)
        )
    }
}

/// Result type for driver operations.
pub type IviResult<T> = Result<T, IviError>;
