//! Entry points common to every IVI-C driver.
//!
//! Names are given without the driver prefix. Driver crates declare their
//! own functions the same way and pass them to [`crate::Session::invoke`].

use lib_ivi_types::{AttributeType, BufferSize, FunctionSpec, ParamSpec, ViType};

/// Size of the buffer passed to `GetErrorMessage`.
pub const ERROR_MESSAGE_BUFFER_SIZE: usize = 256;

pub const INIT_WITH_OPTIONS: FunctionSpec = FunctionSpec::new(
    "InitWithOptions",
    &[
        ParamSpec::input("resourceName", ViType::String),
        ParamSpec::input("idQuery", ViType::Boolean),
        ParamSpec::input("resetDevice", ViType::Boolean),
        ParamSpec::input("optionString", ViType::String),
        ParamSpec::output("vi", ViType::Session),
    ],
);

pub const CLOSE: FunctionSpec = FunctionSpec::new("close", &[ParamSpec::session()]);

/// Session-scoped description of the last error.
pub const GET_ERROR: FunctionSpec = FunctionSpec::new(
    "GetError",
    &[
        ParamSpec::session(),
        ParamSpec::output("errorCode", ViType::Int32),
        ParamSpec::input("bufferSize", ViType::Int32),
        ParamSpec::buffer("description", BufferSize::Probe("bufferSize")),
    ],
);

/// Session-independent description of a status code.
pub const GET_ERROR_MESSAGE: FunctionSpec = FunctionSpec::new(
    "GetErrorMessage",
    &[
        ParamSpec::session(),
        ParamSpec::input("errorCode", ViType::Int32),
        ParamSpec::buffer("errorMessage", BufferSize::Fixed(ERROR_MESSAGE_BUFFER_SIZE)),
    ],
);

macro_rules! attribute_accessor {
    ($(#[$meta:meta])* $name:ident, $entry:literal, $direction:ident, $ty:ident) => {
        $(#[$meta])*
        pub const $name: FunctionSpec = FunctionSpec::new(
            $entry,
            &[
                ParamSpec::session(),
                ParamSpec::input("channelName", ViType::String),
                ParamSpec::input("attributeId", ViType::Attr),
                ParamSpec::$direction("attributeValue", ViType::$ty),
            ],
        );
    };
}

attribute_accessor!(GET_ATTRIBUTE_VI_BOOLEAN, "GetAttributeViBoolean", output, Boolean);
attribute_accessor!(GET_ATTRIBUTE_VI_INT32, "GetAttributeViInt32", output, Int32);
attribute_accessor!(GET_ATTRIBUTE_VI_INT64, "GetAttributeViInt64", output, Int64);
attribute_accessor!(GET_ATTRIBUTE_VI_REAL64, "GetAttributeViReal64", output, Real64);

/// String attributes are read with the length probe.
pub const GET_ATTRIBUTE_VI_STRING: FunctionSpec = FunctionSpec::new(
    "GetAttributeViString",
    &[
        ParamSpec::session(),
        ParamSpec::input("channelName", ViType::String),
        ParamSpec::input("attributeId", ViType::Attr),
        ParamSpec::input("bufferSize", ViType::Int32),
        ParamSpec::buffer("attributeValue", BufferSize::Probe("bufferSize")),
    ],
);

attribute_accessor!(SET_ATTRIBUTE_VI_BOOLEAN, "SetAttributeViBoolean", input, Boolean);
attribute_accessor!(SET_ATTRIBUTE_VI_INT32, "SetAttributeViInt32", input, Int32);
attribute_accessor!(SET_ATTRIBUTE_VI_INT64, "SetAttributeViInt64", input, Int64);
attribute_accessor!(SET_ATTRIBUTE_VI_REAL64, "SetAttributeViReal64", input, Real64);
attribute_accessor!(SET_ATTRIBUTE_VI_STRING, "SetAttributeViString", input, String);

/// Getter entry point for an attribute type.
pub fn attribute_getter_for(ty: AttributeType) -> &'static FunctionSpec {
    match ty {
        AttributeType::Boolean => &GET_ATTRIBUTE_VI_BOOLEAN,
        AttributeType::Int32 => &GET_ATTRIBUTE_VI_INT32,
        AttributeType::Int64 => &GET_ATTRIBUTE_VI_INT64,
        AttributeType::Real64 => &GET_ATTRIBUTE_VI_REAL64,
        AttributeType::String => &GET_ATTRIBUTE_VI_STRING,
    }
}

/// Setter entry point for an attribute type.
pub fn attribute_setter_for(ty: AttributeType) -> &'static FunctionSpec {
    match ty {
        AttributeType::Boolean => &SET_ATTRIBUTE_VI_BOOLEAN,
        AttributeType::Int32 => &SET_ATTRIBUTE_VI_INT32,
        AttributeType::Int64 => &SET_ATTRIBUTE_VI_INT64,
        AttributeType::Real64 => &SET_ATTRIBUTE_VI_REAL64,
        AttributeType::String => &SET_ATTRIBUTE_VI_STRING,
    }
}

/// Entry points every driver must export.
pub const REQUIRED: &[FunctionSpec] = &[INIT_WITH_OPTIONS, CLOSE];

/// Common entry points a driver may export.
pub const OPTIONAL: &[FunctionSpec] = &[
    GET_ERROR,
    GET_ERROR_MESSAGE,
    GET_ATTRIBUTE_VI_BOOLEAN,
    GET_ATTRIBUTE_VI_INT32,
    GET_ATTRIBUTE_VI_INT64,
    GET_ATTRIBUTE_VI_REAL64,
    GET_ATTRIBUTE_VI_STRING,
    SET_ATTRIBUTE_VI_BOOLEAN,
    SET_ATTRIBUTE_VI_INT32,
    SET_ATTRIBUTE_VI_INT64,
    SET_ATTRIBUTE_VI_REAL64,
    SET_ATTRIBUTE_VI_STRING,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations_are_consistent() {
        for function in REQUIRED.iter().chain(OPTIONAL) {
            assert!(function.validate().is_ok(), "{} is inconsistent", function.name);
        }
    }

    #[test]
    fn test_initialize_produces_handle() {
        assert!(!INIT_WITH_OPTIONS.takes_session());
        assert_eq!(INIT_WITH_OPTIONS.input_arity(), 4);
        assert_eq!(INIT_WITH_OPTIONS.output_arity(), 1);
    }

    #[test]
    fn test_attribute_entry_points_follow_type() {
        for ty in [
            AttributeType::Boolean,
            AttributeType::Int32,
            AttributeType::Int64,
            AttributeType::Real64,
            AttributeType::String,
        ] {
            let getter = attribute_getter_for(ty);
            let setter = attribute_setter_for(ty);
            assert_eq!(getter.name, format!("GetAttribute{}", ty.entry_point_suffix()));
            assert_eq!(setter.name, format!("SetAttribute{}", ty.entry_point_suffix()));
            assert_eq!(getter.input_arity(), 2);
            assert_eq!(getter.output_arity(), 1);
            assert_eq!(setter.input_arity(), 3);
        }
        assert_eq!(GET_ATTRIBUTE_VI_STRING.probe_buffer(), Some((3, 4)));
        assert_eq!(SET_ATTRIBUTE_VI_STRING.params[3].ty, ViType::String);
    }
}
