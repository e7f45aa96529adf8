//! # lib-ivi-types
//!
//! Core type definitions for IVI-C driver bindings.
//!
//! This crate provides the vocabulary shared by the session layer and the
//! per-driver declaration crates:
//! - VISA scalar aliases and status classification
//! - Native values exchanged with entry points
//! - Static entry-point metadata (typed, directional parameters)
//! - Attribute descriptors and enumerations
//! - Session state and open options

pub mod visa;
pub mod value;
pub mod function;
pub mod attribute;
pub mod enums;
pub mod session;

pub use visa::*;
pub use value::Value;
pub use function::{BufferSize, Direction, FunctionSpec, ParamSpec, SpecError, ViType};
pub use attribute::{Attribute, AttributeDescriptor, AttributeType, AttributeValue};
pub use enums::{DriverEnum, EnumValue};
pub use session::{DriverWarning, OpenOptions, SessionState};
