//! NI-FAKE attribute declarations.

use crate::enums::Color;
use lib_ivi_types::{Attribute, AttributeDescriptor, EnumValue};

pub const READ_WRITE_BOOL: Attribute<bool> = Attribute::new(1_000_000, "read_write_bool");
pub const READ_WRITE_DOUBLE: Attribute<f64> = Attribute::new(1_000_001, "read_write_double");
pub const READ_WRITE_STRING: Attribute<String> = Attribute::new(1_000_002, "read_write_string");
pub const READ_WRITE_COLOR: Attribute<EnumValue<Color>> = Attribute::new(1_000_003, "read_write_color");
pub const READ_WRITE_INTEGER: Attribute<i32> = Attribute::new(1_000_004, "read_write_integer");
pub const READ_WRITE_INT64: Attribute<i64> = Attribute::new(1_000_005, "read_write_int64");

/// Untyped declarations of every NI-FAKE attribute.
pub fn descriptors() -> Vec<AttributeDescriptor> {
    vec![
        READ_WRITE_BOOL.descriptor(),
        READ_WRITE_DOUBLE.descriptor(),
        READ_WRITE_STRING.descriptor(),
        READ_WRITE_COLOR.descriptor(),
        READ_WRITE_INTEGER.descriptor(),
        READ_WRITE_INT64.descriptor(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_ivi_types::AttributeType;

    #[test]
    fn test_descriptor_types() {
        let all = descriptors();
        assert_eq!(all.len(), 6);
        assert_eq!(all[3].name, "read_write_color");
        assert_eq!(all[3].ty, AttributeType::Int32);
        assert_eq!(all[5].ty, AttributeType::Int64);
    }
}
