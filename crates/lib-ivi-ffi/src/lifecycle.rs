//! Driver session lifecycle management.
//!
//! This module manages the lifecycle of a device session:
//! - Initialization (`InitWithOptions`) producing the device handle
//! - Function and attribute calls against the open handle
//! - Cleanup (`close`), explicit, scoped, or on drop
//!
//! Each session tracks its state so that calls on a handle that was never
//! opened, or has already been released, fail before reaching the driver.

use crate::config::DriverConfig;
use crate::entry_points::{CLOSE, INIT_WITH_OPTIONS};
use crate::error::{IviError, IviResult};
use crate::invoke;
use crate::library::{self, DriverLibrary};
use crate::status;
use lib_ivi_types::{
    DriverWarning, FunctionSpec, OpenOptions, Value, ViSession, ViStatus,
};
use std::collections::VecDeque;
use std::sync::Arc;

pub use lib_ivi_types::SessionState;

/// Most warnings a session holds before the oldest are dropped.
pub const MAX_QUEUED_WARNINGS: usize = 64;

/// An open device session.
///
/// A `Session` is only handed out once the driver has produced a device
/// handle; a failed open never exposes a partially open session. The handle
/// is released exactly once, by [`Session::close`], by the end of
/// [`Session::scope`], or on drop.
///
/// # Thread Safety
///
/// Sessions are `Send`: independent sessions may live on independent
/// threads. The driver is assumed to tolerate concurrent calls on distinct
/// handles. A single session takes `&mut self` for calls that record
/// warnings, so sharing one across threads needs a `Mutex<Session>`.
///
/// # Warnings
///
/// Driver warnings are queued until [`Session::take_warnings`] drains them.
/// The queue keeps the most recent [`MAX_QUEUED_WARNINGS`]; older ones are
/// discarded after being logged.
pub struct Session {
    /// The shared driver library.
    library: Arc<dyn DriverLibrary>,

    /// Device handle, present only while open.
    handle: Option<ViSession>,

    /// Current session state.
    state: SessionState,

    /// Warnings reported by the driver since the last `take_warnings`.
    warnings: VecDeque<DriverWarning>,
}

impl Session {
    /// Open `resource_name` with default options on the process-wide library.
    pub fn open(resource_name: &str) -> IviResult<Self> {
        Self::open_with_options(resource_name, &OpenOptions::default())
    }

    /// Open `resource_name` on the process-wide library.
    pub fn open_with_options(resource_name: &str, options: &OpenOptions) -> IviResult<Self> {
        Self::open_with(library::global()?, resource_name, options)
    }

    /// Open `resource_name` on the process-wide library, creating it with
    /// `load` if this is its first use.
    pub fn open_or_load<F>(resource_name: &str, options: &OpenOptions, load: F) -> IviResult<Self>
    where
        F: FnOnce() -> IviResult<Arc<dyn DriverLibrary>>,
    {
        Self::open_with(library::get_or_init(load)?, resource_name, options)
    }

    /// Open the resource named by `config` with its initialize options.
    pub fn open_configured(library: Arc<dyn DriverLibrary>, config: &DriverConfig) -> IviResult<Self> {
        let resource = config
            .resource
            .as_deref()
            .ok_or_else(|| IviError::Config("No resource name configured".into()))?;
        Self::open_with(library, resource, &config.options)
    }

    /// Open `resource_name` on an explicit library handle.
    pub fn open_with(
        library: Arc<dyn DriverLibrary>,
        resource_name: &str,
        options: &OpenOptions,
    ) -> IviResult<Self> {
        let mut session = Self {
            library,
            handle: None,
            state: SessionState::Unopened,
            warnings: VecDeque::new(),
        };
        session.initialize(resource_name, options)?;
        Ok(session)
    }

    fn initialize(&mut self, resource_name: &str, options: &OpenOptions) -> IviResult<()> {
        let inputs = [
            Value::from(resource_name),
            Value::Boolean(options.id_query),
            Value::Boolean(options.reset_device),
            Value::from(options.option_string.as_str()),
        ];
        let outcome = invoke::execute(self.library.as_ref(), 0, &INIT_WITH_OPTIONS, &inputs)?;

        // No handle exists yet: descriptions come from the session-independent lookup.
        self.record(None, outcome.status)?;

        let handle = outcome
            .outputs
            .first()
            .and_then(Value::as_session)
            .ok_or_else(|| IviError::invalid_parameter("vi", "initialize returned no session handle"))?;

        self.handle = Some(handle);
        self.state = SessionState::Open;

        tracing::info!(
            resource = resource_name,
            handle,
            option_string = %options.option_string,
            "Opened driver session"
        );
        Ok(())
    }

    /// Get the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Device handle, while open.
    pub fn handle(&self) -> Option<ViSession> {
        self.handle
    }

    /// The library this session calls into.
    pub fn library(&self) -> &Arc<dyn DriverLibrary> {
        &self.library
    }

    fn require_open(&self) -> IviResult<ViSession> {
        match (self.state, self.handle) {
            (SessionState::Open, Some(handle)) => Ok(handle),
            _ => Err(IviError::invalid_state(SessionState::Open, self.state)),
        }
    }

    /// Run the status through the translator, queueing any warning.
    fn record(&mut self, handle: Option<ViSession>, status: ViStatus) -> IviResult<()> {
        if let Some(warning) = status::check(self.library.as_ref(), handle, status)? {
            if self.warnings.len() == MAX_QUEUED_WARNINGS {
                if let Some(dropped) = self.warnings.pop_front() {
                    tracing::debug!(code = dropped.code, "Warning queue full, dropping oldest");
                }
            }
            self.warnings.push_back(warning);
        }
        Ok(())
    }

    /// Call a driver function on this session.
    ///
    /// The device handle is passed first; `inputs` fill the remaining caller
    /// inputs in declaration order. Outputs are returned in declaration
    /// order. A negative status becomes [`IviError::Driver`] and no outputs
    /// are returned.
    pub fn invoke(&mut self, function: &FunctionSpec, inputs: &[Value]) -> IviResult<Vec<Value>> {
        let handle = self.require_open()?;
        let outcome = invoke::execute(self.library.as_ref(), handle, function, inputs)?;
        self.record(Some(handle), outcome.status)?;
        Ok(outcome.outputs)
    }

    /// Description of a status code, as reported by the driver.
    ///
    /// Requires an open session. The lookup itself never fails: an
    /// unavailable or failing lookup yields a generic `Unknown error <code>`
    /// description.
    pub fn get_error_description(&self, code: ViStatus) -> IviResult<(ViStatus, String)> {
        let handle = self.require_open()?;
        Ok((code, status::error_description(self.library.as_ref(), Some(handle), code)))
    }

    /// Drain warnings reported since the last call, oldest first.
    pub fn take_warnings(&mut self) -> Vec<DriverWarning> {
        self.warnings.drain(..).collect()
    }

    /// Close the session.
    ///
    /// The handle is invalidated whether or not the driver's close succeeds.
    /// Closing a closed session does nothing.
    pub fn close(&mut self) -> IviResult<()> {
        let handle = match (self.state, self.handle) {
            (SessionState::Open, Some(handle)) => handle,
            (SessionState::Closed, _) => return Ok(()),
            _ => return Err(IviError::invalid_state(SessionState::Open, self.state)),
        };

        let result = invoke::execute(self.library.as_ref(), handle, &CLOSE, &[]);

        // Update state regardless of result
        self.state = SessionState::Closed;
        self.handle = None;

        let status = result?.status;
        self.record(Some(handle), status)?;

        tracing::info!(handle, "Closed driver session");
        Ok(())
    }

    /// Run `body` with this session, closing it afterwards.
    ///
    /// The session is closed exactly once whether or not `body` succeeds. A
    /// failure from `body` takes precedence over a failure to close.
    pub fn scope<T, F>(mut self, body: F) -> IviResult<T>
    where
        F: FnOnce(&mut Session) -> IviResult<T>,
    {
        let result = body(&mut self);
        let closed = self.close();
        match (result, closed) {
            (Err(e), Err(close_err)) => {
                tracing::warn!(error = %close_err, "Error closing session after failure");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Ok(value), Ok(())) => Ok(value),
        }
    }
}

/// Open `resource_name` on the process-wide library, run `body`, and close.
pub fn with_session<T, F>(resource_name: &str, options: &OpenOptions, body: F) -> IviResult<T>
where
    F: FnOnce(&mut Session) -> IviResult<T>,
{
    Session::open_with_options(resource_name, options)?.scope(body)
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            // Best-effort close, log but don't propagate errors
            if let Err(e) = self.close() {
                tracing::warn!(error = %e, "Error during session cleanup");
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("warnings", &self.warnings.len())
            .finish()
    }
}
