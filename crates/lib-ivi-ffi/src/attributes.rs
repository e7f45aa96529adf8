//! Attribute accessors.
//!
//! Attributes are addressed by `(channel name, attribute id)`; the empty
//! channel name addresses the session as a whole. Values are never cached:
//! every read and write is one driver round trip, except string reads, which
//! use the length probe and cost two.

use crate::config::DriverConfig;
use crate::entry_points::{attribute_getter_for, attribute_setter_for};
use crate::error::{IviError, IviResult};
use crate::lifecycle::Session;
use lib_ivi_types::{Attribute, AttributeDescriptor, AttributeType, AttributeValue, Value, ViAttr};
use std::collections::HashMap;

impl Session {
    /// Read an attribute of the given foreign type.
    ///
    /// Any attribute id is accepted; the driver decides whether it exists.
    pub fn get_attribute_value(
        &mut self,
        channel: &str,
        id: ViAttr,
        ty: AttributeType,
    ) -> IviResult<Value> {
        let getter = attribute_getter_for(ty);
        let outputs = self.invoke(getter, &[Value::from(channel), Value::UInt32(id)])?;
        outputs.into_iter().next().ok_or_else(|| {
            IviError::invalid_parameter("attributeValue", format!("{} returned no value", getter.name))
        })
    }

    /// Write an attribute of the given foreign type.
    ///
    /// The value must convert to `ty`; integers are accepted for real
    /// attributes and range-checked for narrower integer attributes.
    pub fn set_attribute_value(
        &mut self,
        channel: &str,
        id: ViAttr,
        ty: AttributeType,
        value: Value,
    ) -> IviResult<()> {
        let setter = attribute_setter_for(ty);
        self.invoke(setter, &[Value::from(channel), Value::UInt32(id), value])?;
        Ok(())
    }

    /// Read a session-wide typed attribute.
    pub fn get_attribute<T: AttributeValue>(&mut self, attribute: Attribute<T>) -> IviResult<T> {
        self.get_channel_attribute("", attribute)
    }

    /// Write a session-wide typed attribute.
    pub fn set_attribute<T: AttributeValue>(&mut self, attribute: Attribute<T>, value: T) -> IviResult<()> {
        self.set_channel_attribute("", attribute, value)
    }

    /// Read a typed attribute on one channel.
    pub fn get_channel_attribute<T: AttributeValue>(
        &mut self,
        channel: &str,
        attribute: Attribute<T>,
    ) -> IviResult<T> {
        let ty = attribute.value_type();
        let value = self.get_attribute_value(channel, attribute.id, ty)?;
        let got = value.type_name();
        T::from_value(value).ok_or_else(|| IviError::TypeMismatch {
            function: attribute_getter_for(ty).name.to_string(),
            param: attribute.name.to_string(),
            expected: ty.entry_point_suffix().to_string(),
            got: got.to_string(),
        })
    }

    /// Write a typed attribute on one channel.
    pub fn set_channel_attribute<T: AttributeValue>(
        &mut self,
        channel: &str,
        attribute: Attribute<T>,
        value: T,
    ) -> IviResult<()> {
        self.set_attribute_value(channel, attribute.id, attribute.value_type(), value.into_value())
    }
}

/// Name-keyed attribute declarations.
///
/// Used where attributes are chosen at run time, e.g. from configuration.
/// Names that are not in the catalog are rejected before any driver call.
#[derive(Clone, Debug, Default)]
pub struct AttributeCatalog {
    by_name: HashMap<String, AttributeDescriptor>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog declared by a driver configuration.
    pub fn from_config(config: &DriverConfig) -> IviResult<Self> {
        config.validate()?;
        let mut catalog = Self::new();
        for descriptor in &config.attributes {
            catalog.insert(descriptor.clone());
        }
        Ok(catalog)
    }

    /// Add or replace a declaration.
    pub fn insert(&mut self, descriptor: AttributeDescriptor) {
        self.by_name.insert(descriptor.name.clone(), descriptor);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Look up a declaration by name.
    pub fn descriptor(&self, name: &str) -> IviResult<&AttributeDescriptor> {
        self.by_name
            .get(name)
            .ok_or_else(|| IviError::UnknownAttribute(name.to_string()))
    }

    /// Read a named attribute.
    pub fn get(&self, session: &mut Session, channel: &str, name: &str) -> IviResult<Value> {
        let descriptor = self.descriptor(name)?;
        session.get_attribute_value(channel, descriptor.id, descriptor.ty)
    }

    /// Write a named attribute.
    pub fn set(&self, session: &mut Session, channel: &str, name: &str, value: Value) -> IviResult<()> {
        let descriptor = self.descriptor(name)?;
        session.set_attribute_value(channel, descriptor.id, descriptor.ty, value)
    }
}
