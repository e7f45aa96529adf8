//! Error translation.
//!
//! Every driver status passes through [`check`]: zero is success, a positive
//! status is a warning that leaves outputs valid, and a negative status
//! becomes an [`IviError::Driver`] carrying the code and the driver's own
//! description of it.

use crate::entry_points::{GET_ERROR, GET_ERROR_MESSAGE};
use crate::error::{IviError, IviResult};
use crate::invoke;
use crate::library::DriverLibrary;
use lib_ivi_types::{DriverWarning, StatusKind, Value, ViSession, ViStatus, VI_NULL};

/// Interpret a driver status.
///
/// `handle` is `None` while a session is being opened; the description
/// lookup then uses the session-independent forms.
pub fn check(
    library: &dyn DriverLibrary,
    handle: Option<ViSession>,
    status: ViStatus,
) -> IviResult<Option<DriverWarning>> {
    match StatusKind::of(status) {
        StatusKind::Success => Ok(None),
        StatusKind::Warning => {
            let description = error_description(library, handle, status);
            tracing::warn!(code = status, description = %description, "Driver warning");
            Ok(Some(DriverWarning {
                code: status,
                description,
            }))
        }
        StatusKind::Error => {
            let description = error_description(library, handle, status);
            tracing::debug!(code = status, description = %description, "Driver error");
            Err(IviError::driver(status, description, handle))
        }
    }
}

/// Look up the description of a status code.
///
/// Tries `GetError` first and accepts its answer only if it reports the same
/// code, then `GetErrorMessage`, and finally falls back to a generic
/// placeholder. Never fails; lookup calls are not themselves translated.
pub fn error_description(
    library: &dyn DriverLibrary,
    handle: Option<ViSession>,
    code: ViStatus,
) -> String {
    let vi = handle.unwrap_or(VI_NULL);

    if library.has_entry_point(GET_ERROR.name) {
        match invoke::execute(library, vi, &GET_ERROR, &[]) {
            Ok(outcome) if outcome.status >= 0 => {
                if let [Value::Int32(reported), Value::String(description)] = outcome.outputs.as_slice() {
                    if *reported == code {
                        return description.clone();
                    }
                }
            }
            Ok(outcome) => {
                tracing::debug!(code, status = outcome.status, "GetError failed");
            }
            Err(e) => {
                tracing::debug!(code, error = %e, "GetError unavailable");
            }
        }
    }

    if library.has_entry_point(GET_ERROR_MESSAGE.name) {
        match invoke::execute(library, vi, &GET_ERROR_MESSAGE, &[Value::Int32(code)]) {
            Ok(outcome) if outcome.status >= 0 => {
                if let Some(Value::String(message)) = outcome.outputs.into_iter().next() {
                    return message;
                }
            }
            Ok(outcome) => {
                tracing::debug!(code, status = outcome.status, "GetErrorMessage failed");
            }
            Err(e) => {
                tracing::debug!(code, error = %e, "GetErrorMessage unavailable");
            }
        }
    }

    unknown_error(code)
}

/// Placeholder description when the driver cannot describe a code.
pub fn unknown_error(code: ViStatus) -> String {
    format!("Unknown error {code}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLibrary, RecordedArg};

    #[test]
    fn test_success_is_silent() {
        let mock = MockLibrary::new().with_get_error(-1, "unused");
        assert_eq!(check(&mock, Some(1), 0).unwrap(), None);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_error_uses_get_error() {
        let mock = MockLibrary::new().with_get_error(-42, "The answer to the ultimate question");
        let err = check(&mock, Some(42), -42).unwrap_err();
        assert_eq!(err.code(), Some(-42));
        assert_eq!(err.description(), Some("The answer to the ultimate question"));
        assert!(matches!(err, IviError::Driver { session: Some(42), .. }));
    }

    #[test]
    fn test_mismatched_get_error_falls_back_to_message() {
        let mock = MockLibrary::new()
            .with_get_error(-7, "stale")
            .with_error_message(-42, "from message table");
        let err = check(&mock, Some(1), -42).unwrap_err();
        assert_eq!(err.description(), Some("from message table"));

        let calls = mock.calls_to("GetErrorMessage");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][1], RecordedArg::Value(Value::Int32(-42)));
        assert_eq!(calls[0][2], RecordedArg::Buffer(256));
    }

    #[test]
    fn test_placeholder_when_lookup_unavailable() {
        let mock = MockLibrary::new();
        let err = check(&mock, None, -5).unwrap_err();
        assert_eq!(err.description(), Some("Unknown error -5"));
        assert!(matches!(err, IviError::Driver { session: None, .. }));
    }

    #[test]
    fn test_placeholder_when_lookup_fails() {
        let mock = MockLibrary::new()
            .on("GetError", |_args| -1)
            .on("GetErrorMessage", |_args| -1);
        let err = check(&mock, Some(3), -9).unwrap_err();
        assert_eq!(err.description(), Some("Unknown error -9"));
        // Lookup failures are not translated again.
        assert_eq!(mock.call_count("GetError"), 1);
        assert_eq!(mock.call_count("GetErrorMessage"), 1);
    }

    #[test]
    fn test_lookup_without_handle_uses_null_session() {
        let mock = MockLibrary::new().with_get_error(-20, "init failed");
        let _ = check(&mock, None, -20);
        let calls = mock.calls_to("GetError");
        assert_eq!(calls[0][0], RecordedArg::Value(Value::Session(VI_NULL)));
    }

    #[test]
    fn test_warning_is_returned() {
        let mock = MockLibrary::new().with_error_message(5, "Minor issue");
        let warning = check(&mock, Some(1), 5).unwrap().unwrap();
        assert_eq!(warning.code, 5);
        assert_eq!(warning.description, "Minor issue");
    }
}
