//! Scripted driver library.
//!
//! [`MockLibrary`] stands in for a native driver in tests and simulations.
//! Each entry point is served by a handler that sees the marshalled
//! arguments exactly as a C driver would, writes outputs in place, and
//! returns a status. Every call is recorded before its handler runs.

use crate::error::{IviError, IviResult};
use crate::library::DriverLibrary;
use crate::marshal::ForeignArg;
use lib_ivi_types::{FunctionSpec, Value, ViSession, ViStatus, VI_SUCCESS};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Extension trait for poison-recovering mutex locks.
trait RecoverMutex<T> {
    fn lock_recover(&self) -> MutexGuard<'_, T>;
}

impl<T> RecoverMutex<T> for Mutex<T> {
    fn lock_recover(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Mock call log was poisoned, recovering data");
            poisoned.into_inner()
        })
    }
}

type Handler = Arc<dyn Fn(&mut [ForeignArg]) -> ViStatus + Send + Sync>;

/// An argument as it was passed to the driver.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedArg {
    /// Input passed by value.
    Value(Value),
    /// Scalar output slot.
    Output,
    /// Null buffer pointer.
    NullBuffer,
    /// Buffer of the given size.
    Buffer(usize),
}

impl From<&ForeignArg> for RecordedArg {
    fn from(arg: &ForeignArg) -> Self {
        if let Some(value) = arg.input_value() {
            return Self::Value(value);
        }
        match arg {
            ForeignArg::Buffer(None) => Self::NullBuffer,
            ForeignArg::Buffer(Some(bytes)) => Self::Buffer(bytes.len()),
            _ => Self::Output,
        }
    }
}

/// One recorded entry-point call.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub function: String,
    pub args: Vec<RecordedArg>,
}

/// A [`DriverLibrary`] driven by per-entry-point handlers.
///
/// Calls to entry points without a handler fail with
/// [`IviError::SymbolNotFound`], like a driver that does not export them.
#[derive(Default)]
pub struct MockLibrary {
    handlers: HashMap<String, Handler>,
    error_messages: HashMap<ViStatus, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `entry_point` with `handler`, replacing any earlier handler.
    pub fn on<F>(mut self, entry_point: &str, handler: F) -> Self
    where
        F: Fn(&mut [ForeignArg]) -> ViStatus + Send + Sync + 'static,
    {
        self.handlers.insert(entry_point.to_string(), Arc::new(handler));
        self
    }

    /// Serve `InitWithOptions` with `handle` and `close` with success.
    pub fn with_session(self, handle: ViSession) -> Self {
        self.on("InitWithOptions", move |args| {
            if let Some(slot) = args.last_mut() {
                slot.write(&Value::Session(handle));
            }
            VI_SUCCESS
        })
        .on("close", |_args| VI_SUCCESS)
    }

    /// Serve a length-probed string output at argument `buffer_index`.
    ///
    /// The probe call returns the length of `value`; the fill call writes it.
    pub fn with_string_output(self, entry_point: &str, buffer_index: usize, value: &str) -> Self {
        let value = value.to_string();
        self.on(entry_point, move |args| fill_string(args, buffer_index, &value))
    }

    /// Serve `GetError` reporting `code` and `description`.
    pub fn with_get_error(self, code: ViStatus, description: &str) -> Self {
        let description = description.to_string();
        self.on("GetError", move |args| {
            args[1].write(&Value::Int32(code));
            fill_string(args, 3, &description)
        })
    }

    /// Add an entry to the table served by `GetErrorMessage`.
    ///
    /// Codes missing from the table fail with status -1.
    pub fn with_error_message(mut self, code: ViStatus, message: &str) -> Self {
        self.error_messages.insert(code, message.to_string());
        let table = self.error_messages.clone();
        self.on("GetErrorMessage", move |args| {
            let requested = args[1].input_value().and_then(|v| v.as_i64());
            match requested.and_then(|code| table.get(&(code as ViStatus))) {
                Some(message) => {
                    args[2].write(&Value::String(message.clone()));
                    VI_SUCCESS
                }
                None => -1,
            }
        })
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock_recover().clone()
    }

    /// Arguments of every call to `entry_point`, in order.
    pub fn calls_to(&self, entry_point: &str) -> Vec<Vec<RecordedArg>> {
        self.calls
            .lock_recover()
            .iter()
            .filter(|call| call.function == entry_point)
            .map(|call| call.args.clone())
            .collect()
    }

    /// Number of calls made to `entry_point`.
    pub fn call_count(&self, entry_point: &str) -> usize {
        self.calls
            .lock_recover()
            .iter()
            .filter(|call| call.function == entry_point)
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock_recover().clear();
    }
}

impl DriverLibrary for MockLibrary {
    fn call(&self, function: &FunctionSpec, args: &mut [ForeignArg]) -> IviResult<ViStatus> {
        let handler = self
            .handlers
            .get(function.name)
            .cloned()
            .ok_or_else(|| IviError::symbol_not_found(function.name))?;

        self.calls.lock_recover().push(RecordedCall {
            function: function.name.to_string(),
            args: args.iter().map(RecordedArg::from).collect(),
        });

        Ok(handler(args))
    }

    fn has_entry_point(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

/// Two-call string protocol, driver side.
fn fill_string(args: &mut [ForeignArg], buffer_index: usize, value: &str) -> ViStatus {
    match args.get_mut(buffer_index) {
        Some(ForeignArg::Buffer(None)) => value.len() as ViStatus,
        Some(buffer) => {
            buffer.write(&Value::String(value.to_string()));
            VI_SUCCESS
        }
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_points::{CLOSE, INIT_WITH_OPTIONS};
    use crate::marshal::marshal;

    #[test]
    fn test_unhandled_entry_point_is_missing_symbol() {
        let mock = MockLibrary::new();
        let mut args = marshal(&CLOSE, 1, &[]).unwrap();
        let err = mock.call(&CLOSE, &mut args).unwrap_err();
        assert!(matches!(err, IviError::SymbolNotFound { ref symbol } if symbol == "close"));
        assert!(!mock.has_entry_point("close"));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_session_handlers() {
        let mock = MockLibrary::new().with_session(42);
        let inputs = [
            Value::from("dev1"),
            Value::Boolean(false),
            Value::Boolean(false),
            Value::from(""),
        ];
        let mut args = marshal(&INIT_WITH_OPTIONS, 0, &inputs).unwrap();
        assert_eq!(mock.call(&INIT_WITH_OPTIONS, &mut args).unwrap(), 0);
        assert_eq!(args[4], ForeignArg::OutSession(42));

        let recorded = &mock.calls()[0];
        assert_eq!(recorded.function, "InitWithOptions");
        assert_eq!(recorded.args[0], RecordedArg::Value(Value::from("dev1")));
        assert_eq!(recorded.args[4], RecordedArg::Output);
    }

    #[test]
    fn test_clear_calls() {
        let mock = MockLibrary::new().with_session(1);
        let mut args = marshal(&CLOSE, 1, &[]).unwrap();
        mock.call(&CLOSE, &mut args).unwrap();
        assert_eq!(mock.call_count("close"), 1);
        mock.clear_calls();
        assert_eq!(mock.call_count("close"), 0);
    }
}
