//! Attribute descriptors.
//!
//! An attribute is identified by a numeric code and read or written per
//! session, optionally qualified by a channel name. Typed descriptors
//! ([`Attribute<T>`]) give compile-time checked accessors; untyped
//! descriptors ([`AttributeDescriptor`]) come from configuration.

use crate::enums::{DriverEnum, EnumValue};
use crate::value::Value;
use crate::visa::ViAttr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Foreign representation of an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Boolean,
    Int32,
    Int64,
    Real64,
    String,
}

impl AttributeType {
    /// Suffix of the `GetAttributeVi*` / `SetAttributeVi*` entry points.
    pub fn entry_point_suffix(&self) -> &'static str {
        match self {
            Self::Boolean => "ViBoolean",
            Self::Int32 => "ViInt32",
            Self::Int64 => "ViInt64",
            Self::Real64 => "ViReal64",
            Self::String => "ViString",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry_point_suffix())
    }
}

/// A Rust type that can be stored in a driver attribute.
pub trait AttributeValue: Sized {
    /// Foreign type used to transfer the value.
    const TYPE: AttributeType;

    /// Convert from the value read back from the driver.
    fn from_value(value: Value) -> Option<Self>;

    /// Convert to the value written to the driver.
    fn into_value(self) -> Value;
}

impl AttributeValue for bool {
    const TYPE: AttributeType = AttributeType::Boolean;

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl AttributeValue for i32 {
    const TYPE: AttributeType = AttributeType::Int32;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int32(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int32(self)
    }
}

impl AttributeValue for i64 {
    const TYPE: AttributeType = AttributeType::Int64;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int64(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int64(self)
    }
}

impl AttributeValue for f64 {
    const TYPE: AttributeType = AttributeType::Real64;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Real64(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Real64(self)
    }
}

impl AttributeValue for String {
    const TYPE: AttributeType = AttributeType::String;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

/// Enumerated attributes travel as `ViInt32`.
impl<E: DriverEnum> AttributeValue for EnumValue<E> {
    const TYPE: AttributeType = AttributeType::Int32;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int32(raw) => Some(EnumValue::from_raw(raw)),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int32(self.raw())
    }
}

/// A typed attribute declaration.
pub struct Attribute<T> {
    pub id: ViAttr,
    pub name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: AttributeValue> Attribute<T> {
    pub const fn new(id: ViAttr, name: &'static str) -> Self {
        Self {
            id,
            name,
            _marker: PhantomData,
        }
    }

    pub fn value_type(&self) -> AttributeType {
        T::TYPE
    }

    /// Untyped form of this declaration.
    pub fn descriptor(&self) -> AttributeDescriptor {
        AttributeDescriptor {
            name: self.name.to_string(),
            id: self.id,
            ty: T::TYPE,
        }
    }
}

// Manual impls: derives would require `T: Clone` / `T: Debug`.
impl<T> Clone for Attribute<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Attribute<T> {}

impl<T> fmt::Debug for Attribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// An attribute declaration loaded at run time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    pub id: ViAttr,
    #[serde(rename = "type")]
    pub ty: AttributeType,
}
