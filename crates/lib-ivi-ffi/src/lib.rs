//! # lib-ivi-ffi
//!
//! Safe session layer over IVI-C instrument driver libraries.
//!
//! This crate turns a C-ABI driver (`.dll`/`.so`) into sessions with typed
//! attribute access and structured errors. It handles:
//!
//! - The process-wide driver library handle (native or scripted)
//! - Session lifecycle (InitWithOptions/close, scoped use, drop)
//! - Generic function invocation from static entry-point declarations
//! - The two-call string protocol (length probe, then fill)
//! - Status translation into errors and warnings with driver descriptions
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lib_ivi_ffi::{MockLibrary, OpenOptions, Session};
//!
//! let library = Arc::new(MockLibrary::new().with_session(42));
//! let session = Session::open_with(library, "Dev1", &OpenOptions::default()).unwrap();
//! session.scope(|s| {
//!     assert_eq!(s.handle(), Some(42));
//!     Ok(())
//! }).unwrap();
//! ```
//!
//! # Safety
//!
//! Driver binaries are trusted to match their declarations. The native
//! backend (feature `native`) calls entry points exactly as declared; a
//! mismatched signature is undefined behavior.

pub mod error;
pub mod config;
pub mod library;
pub mod marshal;
pub mod entry_points;
pub mod invoke;
pub mod status;
pub mod lifecycle;
pub mod attributes;
pub mod mock;
#[cfg(feature = "native")]
pub mod loader;

pub use error::{IviError, IviResult};
pub use config::{load_config, DriverConfig};
pub use library::DriverLibrary;
pub use marshal::ForeignArg;
pub use lifecycle::{with_session, Session, SessionState};
pub use attributes::AttributeCatalog;
pub use mock::{MockLibrary, RecordedArg, RecordedCall};
#[cfg(feature = "native")]
pub use loader::NativeLibrary;

pub use lib_ivi_types::{
    Attribute, AttributeType, DriverEnum, DriverWarning, EnumValue, FunctionSpec, OpenOptions, Value,
    ViSession, ViStatus,
};
