//! NI-FAKE entry-point declarations.

use lib_ivi_types::{BufferSize, FunctionSpec, ParamSpec, ViType};

pub const SIMPLE_FUNCTION: FunctionSpec = FunctionSpec::new("SimpleFunction", &[ParamSpec::session()]);

pub const GET_A_NUMBER: FunctionSpec = FunctionSpec::new(
    "GetANumber",
    &[ParamSpec::session(), ParamSpec::output("aNumber", ViType::Int16)],
);

pub const GET_A_BOOLEAN: FunctionSpec = FunctionSpec::new(
    "GetABoolean",
    &[ParamSpec::session(), ParamSpec::output("aBoolean", ViType::Boolean)],
);

pub const GET_ENUM_VALUE: FunctionSpec = FunctionSpec::new(
    "GetEnumValue",
    &[
        ParamSpec::session(),
        ParamSpec::output("aQuantity", ViType::Int32),
        ParamSpec::output("aTurtle", ViType::Int16),
    ],
);

pub const ONE_INPUT_FUNCTION: FunctionSpec = FunctionSpec::new(
    "OneInputFunction",
    &[ParamSpec::session(), ParamSpec::input("aNumber", ViType::Int32)],
);

pub const TWO_INPUT_FUNCTION: FunctionSpec = FunctionSpec::new(
    "TwoInputFunction",
    &[
        ParamSpec::session(),
        ParamSpec::input("aNumber", ViType::Real64),
        ParamSpec::input("anInt", ViType::Int32),
    ],
);

pub const GET_A_STRING_WITH_SPECIFIED_MAXIMUM_SIZE: FunctionSpec = FunctionSpec::new(
    "GetAStringWithSpecifiedMaximumSize",
    &[
        ParamSpec::session(),
        ParamSpec::input("bufferSize", ViType::Int32),
        ParamSpec::buffer("aString", BufferSize::Param("bufferSize")),
    ],
);

pub const GET_CAL_DATE_AND_TIME: FunctionSpec = FunctionSpec::new(
    "GetCalDateAndTime",
    &[
        ParamSpec::session(),
        ParamSpec::input("calType", ViType::Int32),
        ParamSpec::output("month", ViType::Int32),
        ParamSpec::output("day", ViType::Int32),
        ParamSpec::output("year", ViType::Int32),
        ParamSpec::output("hour", ViType::Int32),
        ParamSpec::output("minute", ViType::Int32),
    ],
);

/// Driver-specific entry points, resolved at load time when exported.
pub const FUNCTIONS: &[FunctionSpec] = &[
    SIMPLE_FUNCTION,
    GET_A_NUMBER,
    GET_A_BOOLEAN,
    GET_ENUM_VALUE,
    ONE_INPUT_FUNCTION,
    TWO_INPUT_FUNCTION,
    GET_A_STRING_WITH_SPECIFIED_MAXIMUM_SIZE,
    GET_CAL_DATE_AND_TIME,
];
