//! # lib-nifake
//!
//! Declarations for the NI-FAKE test driver over the generic IVI-C session
//! layer: enumerations, attributes, entry points and thin function wrappers.
//!
//! ```
//! use std::sync::Arc;
//! use lib_ivi_ffi::{MockLibrary, OpenOptions, Session, Value};
//! use lib_nifake::NiFake;
//!
//! let library = Arc::new(MockLibrary::new().with_session(1).on("GetANumber", |args| {
//!     args[1].write(&Value::Int16(16));
//!     0
//! }));
//! let mut session = Session::open_with(library, "Dev1", &OpenOptions::default()).unwrap();
//! assert_eq!(session.get_a_number().unwrap(), 16);
//! ```

pub mod attributes;
pub mod enums;
pub mod functions;
pub mod session;

pub use enums::{Color, Turtle};
pub use session::{CalDateTime, NiFake};

use lib_ivi_ffi::{AttributeCatalog, DriverConfig, DriverLibrary, IviResult, Session};
use lib_ivi_types::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

/// Entry-point symbol prefix.
pub const PREFIX: &str = "niFake_";

/// Platform file name of the NI-FAKE shared library.
pub fn library_name() -> &'static str {
    if cfg!(windows) {
        if cfg!(target_pointer_width = "64") {
            "nifake_64.dll"
        } else {
            "nifake_32.dll"
        }
    } else {
        "libnifake.so"
    }
}

/// Configuration of the NI-FAKE driver with its full attribute catalog.
pub fn default_config() -> DriverConfig {
    DriverConfig {
        library: PathBuf::from(library_name()),
        prefix: PREFIX.to_string(),
        resource: None,
        options: OpenOptions::default(),
        attributes: attributes::descriptors(),
    }
}

/// Name-keyed access to every NI-FAKE attribute.
pub fn attribute_catalog() -> IviResult<AttributeCatalog> {
    AttributeCatalog::from_config(&default_config())
}

/// The process-wide NI-FAKE library, loaded from `config` on first use.
///
/// Once a library exists, it is returned whatever `config` names.
pub fn library(config: &DriverConfig) -> IviResult<Arc<dyn DriverLibrary>> {
    lib_ivi_ffi::library::get_or_init(|| load(config))
}

/// Open `resource_name` with default options, loading the driver on first use.
pub fn open(resource_name: &str) -> IviResult<Session> {
    let config = default_config();
    Session::open_or_load(resource_name, &config.options, || load(&config))
}

/// Open the resource named by `config`, loading the driver on first use.
pub fn open_configured(config: &DriverConfig) -> IviResult<Session> {
    Session::open_configured(library(config)?, config)
}

#[cfg(feature = "native")]
fn load(config: &DriverConfig) -> IviResult<Arc<dyn DriverLibrary>> {
    let native: Arc<dyn DriverLibrary> = lib_ivi_ffi::NativeLibrary::load(config, functions::FUNCTIONS)?;
    Ok(native)
}

// Without the native backend a library must be installed before first use.
#[cfg(not(feature = "native"))]
fn load(_config: &DriverConfig) -> IviResult<Arc<dyn DriverLibrary>> {
    Err(lib_ivi_ffi::IviError::LibraryNotInitialized)
}
