//! The foreign library handle.
//!
//! A [`DriverLibrary`] executes one entry point with marshalled arguments and
//! reports its raw status. The process-wide handle is installed once and
//! shared by every session; it is never replaced or mutated afterwards.

use crate::error::{IviError, IviResult};
use crate::marshal::ForeignArg;
use lib_ivi_types::{FunctionSpec, ViStatus};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// A loaded set of driver entry points.
///
/// Implementations must tolerate concurrent calls on distinct device handles;
/// no locking is performed above this layer.
pub trait DriverLibrary: Send + Sync {
    /// Call `function` with one argument per declared parameter.
    ///
    /// Output arguments are written in place. The returned status is the raw
    /// driver status and is not interpreted here.
    fn call(&self, function: &FunctionSpec, args: &mut [ForeignArg]) -> IviResult<ViStatus>;

    /// Whether the library provides the named entry point.
    fn has_entry_point(&self, name: &str) -> bool;
}

static LIBRARY: OnceCell<Arc<dyn DriverLibrary>> = OnceCell::new();

/// Install the process-wide library handle.
///
/// Returns the installed handle. If a handle already exists it is kept and
/// the candidate is dropped.
pub fn install(library: Arc<dyn DriverLibrary>) -> Arc<dyn DriverLibrary> {
    let mut installed = false;
    let handle = LIBRARY.get_or_init(|| {
        installed = true;
        library
    });
    if !installed {
        tracing::debug!("Driver library already installed, keeping existing handle");
    }
    Arc::clone(handle)
}

/// The process-wide library handle, if one has been installed.
pub fn global() -> IviResult<Arc<dyn DriverLibrary>> {
    LIBRARY
        .get()
        .map(Arc::clone)
        .ok_or(IviError::LibraryNotInitialized)
}

/// The process-wide library handle, creating it on first use.
///
/// `init` runs at most once per process; concurrent first callers block until
/// it completes. A failed `init` leaves the handle uninstalled.
pub fn get_or_init<F>(init: F) -> IviResult<Arc<dyn DriverLibrary>>
where
    F: FnOnce() -> IviResult<Arc<dyn DriverLibrary>>,
{
    LIBRARY.get_or_try_init(init).map(Arc::clone)
}
