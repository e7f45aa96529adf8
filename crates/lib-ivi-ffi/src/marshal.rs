//! Argument marshalling between native values and foreign storage.
//!
//! The invoker converts caller inputs into a vector of [`ForeignArg`], one per
//! declared parameter. Inputs hold their C representation by value; outputs
//! hold the storage the driver writes through. After the call, outputs are
//! read back in declaration order.

use crate::error::{IviError, IviResult};
use lib_ivi_types::{
    from_vi_boolean, to_vi_boolean, BufferSize, Direction, FunctionSpec, ParamSpec, Value,
    ViAttr, ViBoolean, ViSession, ViType,
};
use std::ffi::CString;

/// One argument in its foreign representation.
#[derive(Clone, Debug, PartialEq)]
pub enum ForeignArg {
    Session(ViSession),
    Boolean(ViBoolean),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Attr(ViAttr),
    Real64(f64),
    /// NUL-terminated input string.
    Str(CString),
    OutSession(ViSession),
    OutBoolean(ViBoolean),
    OutInt16(i16),
    OutInt32(i32),
    OutInt64(i64),
    OutAttr(ViAttr),
    OutReal64(f64),
    /// Output character buffer; `None` is passed as a null pointer.
    Buffer(Option<Vec<u8>>),
}

impl ForeignArg {
    /// Zeroed output storage for a parameter.
    fn output_slot(ty: ViType) -> Self {
        match ty {
            ViType::Session => Self::OutSession(0),
            ViType::Boolean => Self::OutBoolean(0),
            ViType::Int16 => Self::OutInt16(0),
            ViType::Int32 => Self::OutInt32(0),
            ViType::Int64 => Self::OutInt64(0),
            ViType::Attr => Self::OutAttr(0),
            ViType::Real64 => Self::OutReal64(0.0),
            ViType::String => Self::Buffer(None),
        }
    }

    /// The value of an input argument, as seen by the driver.
    pub fn input_value(&self) -> Option<Value> {
        match self {
            Self::Session(vi) => Some(Value::Session(*vi)),
            Self::Boolean(b) => Some(Value::Boolean(from_vi_boolean(*b))),
            Self::Int16(v) => Some(Value::Int16(*v)),
            Self::Int32(v) => Some(Value::Int32(*v)),
            Self::Int64(v) => Some(Value::Int64(*v)),
            Self::Attr(v) => Some(Value::UInt32(*v)),
            Self::Real64(v) => Some(Value::Real64(*v)),
            Self::Str(s) => Some(Value::String(s.to_string_lossy().into_owned())),
            _ => None,
        }
    }

    /// The value held by an output argument.
    pub fn output_value(&self) -> Option<Value> {
        match self {
            Self::OutSession(vi) => Some(Value::Session(*vi)),
            Self::OutBoolean(b) => Some(Value::Boolean(from_vi_boolean(*b))),
            Self::OutInt16(v) => Some(Value::Int16(*v)),
            Self::OutInt32(v) => Some(Value::Int32(*v)),
            Self::OutInt64(v) => Some(Value::Int64(*v)),
            Self::OutAttr(v) => Some(Value::UInt32(*v)),
            Self::OutReal64(v) => Some(Value::Real64(*v)),
            Self::Buffer(Some(bytes)) => Some(Value::String(read_c_buffer(bytes))),
            Self::Buffer(None) => Some(Value::String(String::new())),
            _ => None,
        }
    }

    /// Size of an output buffer; `None` for a null buffer or a non-buffer.
    pub fn buffer_len(&self) -> Option<usize> {
        match self {
            Self::Buffer(Some(bytes)) => Some(bytes.len()),
            _ => None,
        }
    }

    pub fn is_null_buffer(&self) -> bool {
        matches!(self, Self::Buffer(None))
    }

    /// Store a value into output storage, the way a driver would.
    ///
    /// Strings are copied up to the buffer size; a terminating NUL is added
    /// when there is room. Returns `false` if the value does not fit this
    /// argument.
    pub fn write(&mut self, value: &Value) -> bool {
        match (self, value) {
            (Self::OutSession(slot), Value::Session(vi)) => *slot = *vi,
            (Self::OutBoolean(slot), Value::Boolean(b)) => *slot = to_vi_boolean(*b),
            (Self::OutInt16(slot), v) => match v.as_i64().and_then(|v| i16::try_from(v).ok()) {
                Some(v) => *slot = v,
                None => return false,
            },
            (Self::OutInt32(slot), v) => match v.as_i64().and_then(|v| i32::try_from(v).ok()) {
                Some(v) => *slot = v,
                None => return false,
            },
            (Self::OutInt64(slot), v) => match v.as_i64() {
                Some(v) => *slot = v,
                None => return false,
            },
            (Self::OutAttr(slot), v) => match v.as_i64().and_then(|v| u32::try_from(v).ok()) {
                Some(v) => *slot = v,
                None => return false,
            },
            (Self::OutReal64(slot), v) => match v.as_f64() {
                Some(v) => *slot = v,
                None => return false,
            },
            (Self::Buffer(Some(bytes)), Value::String(s)) => {
                let src = s.as_bytes();
                let n = src.len().min(bytes.len());
                bytes[..n].copy_from_slice(&src[..n]);
                if n < bytes.len() {
                    bytes[n] = 0;
                }
            }
            _ => return false,
        }
        true
    }
}

/// Decode a driver-filled character buffer, stopping at the first NUL.
pub fn read_c_buffer(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Build the foreign argument list for a call.
///
/// `handle` fills every leading `ViSession` input. Probe-managed size
/// parameters start at zero with a null buffer.
pub fn marshal(function: &FunctionSpec, handle: ViSession, inputs: &[Value]) -> IviResult<Vec<ForeignArg>> {
    let expected = function.input_arity();
    if inputs.len() != expected {
        return Err(IviError::ArityMismatch {
            function: function.name.to_string(),
            expected,
            got: inputs.len(),
        });
    }

    let mut remaining = inputs.iter();
    let mut args = Vec::with_capacity(function.params.len());

    for (idx, param) in function.params.iter().enumerate() {
        let arg = match param.direction {
            Direction::Out => ForeignArg::output_slot(param.ty),
            Direction::In if param.ty == ViType::Session => ForeignArg::Session(handle),
            Direction::In if function.is_caller_input(idx) => {
                let value = remaining.next().ok_or_else(|| IviError::ArityMismatch {
                    function: function.name.to_string(),
                    expected,
                    got: inputs.len(),
                })?;
                marshal_input(function, param, value)?
            }
            // Size parameter managed by the length probe.
            Direction::In => ForeignArg::Int32(0),
        };
        args.push(arg);
    }

    // Buffers whose size depends on another argument are allocated once all
    // inputs are known.
    for (idx, param) in function.params.iter().enumerate() {
        let size = match param.buffer {
            Some(BufferSize::Fixed(n)) => n,
            Some(BufferSize::Param(size_name)) => {
                let size_idx = function.param_index(size_name).ok_or_else(|| {
                    IviError::invalid_parameter(param.name, "size parameter not declared")
                })?;
                match args[size_idx] {
                    ForeignArg::Int32(n) if n >= 0 => n as usize,
                    _ => {
                        return Err(IviError::invalid_parameter(
                            size_name,
                            "buffer size must be a non-negative ViInt32",
                        ))
                    }
                }
            }
            Some(BufferSize::Probe(_)) | None => continue,
        };
        args[idx] = ForeignArg::Buffer(Some(vec![0u8; size]));
    }

    Ok(args)
}

fn marshal_input(function: &FunctionSpec, param: &ParamSpec, value: &Value) -> IviResult<ForeignArg> {
    let mismatch = || IviError::TypeMismatch {
        function: function.name.to_string(),
        param: param.name.to_string(),
        expected: param.ty.display_name().to_string(),
        got: value.type_name().to_string(),
    };
    let out_of_range = |v: i64| {
        IviError::invalid_parameter(
            param.name,
            format!("{v} out of range for {}", param.ty.display_name()),
        )
    };

    let arg = match param.ty {
        ViType::Boolean => ForeignArg::Boolean(to_vi_boolean(value.as_bool().ok_or_else(mismatch)?)),
        ViType::Int16 => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            ForeignArg::Int16(i16::try_from(v).map_err(|_| out_of_range(v))?)
        }
        ViType::Int32 => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            ForeignArg::Int32(i32::try_from(v).map_err(|_| out_of_range(v))?)
        }
        ViType::Int64 => ForeignArg::Int64(value.as_i64().ok_or_else(mismatch)?),
        ViType::Attr => {
            let v = value.as_i64().ok_or_else(mismatch)?;
            ForeignArg::Attr(u32::try_from(v).map_err(|_| out_of_range(v))?)
        }
        ViType::Real64 => ForeignArg::Real64(value.as_f64().ok_or_else(mismatch)?),
        ViType::String => {
            let text = value.as_str().ok_or_else(mismatch)?;
            let c_text = CString::new(text)
                .map_err(|_| IviError::invalid_parameter(param.name, "Contains null byte"))?;
            ForeignArg::Str(c_text)
        }
        ViType::Session => return Err(mismatch()),
    };
    Ok(arg)
}

/// Read outputs back in declaration order.
pub fn unmarshal(function: &FunctionSpec, args: &[ForeignArg]) -> Vec<Value> {
    function
        .params
        .iter()
        .zip(args)
        .filter(|(param, _)| param.is_output())
        .filter_map(|(_, arg)| arg.output_value())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_INPUTS: FunctionSpec = FunctionSpec::new(
        "TwoInputFunction",
        &[
            ParamSpec::session(),
            ParamSpec::input("aNumber", ViType::Real64),
            ParamSpec::input("anInt", ViType::Int32),
        ],
    );

    const SIZED: FunctionSpec = FunctionSpec::new(
        "GetAStringWithSpecifiedMaximumSize",
        &[
            ParamSpec::session(),
            ParamSpec::input("bufferSize", ViType::Int32),
            ParamSpec::buffer("aString", BufferSize::Param("bufferSize")),
        ],
    );

    const CAL: FunctionSpec = FunctionSpec::new(
        "GetCalDateAndTime",
        &[
            ParamSpec::session(),
            ParamSpec::input("calType", ViType::Int32),
            ParamSpec::output("month", ViType::Int32),
            ParamSpec::output("day", ViType::Int32),
            ParamSpec::output("year", ViType::Int32),
        ],
    );

    #[test]
    fn test_handle_is_first_argument() {
        let args = marshal(&TWO_INPUTS, 42, &[Value::Real64(1.5), Value::Int32(2)]).unwrap();
        assert_eq!(
            args,
            vec![
                ForeignArg::Session(42),
                ForeignArg::Real64(1.5),
                ForeignArg::Int32(2)
            ]
        );
    }

    #[test]
    fn test_integer_input_coerces_to_real() {
        let args = marshal(&TWO_INPUTS, 1, &[Value::Int32(3), Value::Int16(2)]).unwrap();
        assert_eq!(args[1], ForeignArg::Real64(3.0));
        assert_eq!(args[2], ForeignArg::Int32(2));
    }

    #[test]
    fn test_arity_mismatch() {
        let err = marshal(&SIZED, 1, &[]).unwrap_err();
        assert!(matches!(err, IviError::ArityMismatch { expected: 1, got: 0, .. }));
    }

    #[test]
    fn test_wrong_type_is_usage_error() {
        let err = marshal(&SIZED, 1, &[Value::from("potato")]).unwrap_err();
        assert!(err.is_usage_error());
        assert!(matches!(err, IviError::TypeMismatch { ref param, .. } if param == "bufferSize"));
    }

    #[test]
    fn test_out_of_range_integer() {
        let err = marshal(&TWO_INPUTS, 1, &[Value::Real64(0.0), Value::Int64(1 << 40)]).unwrap_err();
        assert!(matches!(err, IviError::InvalidParameter { .. }));
    }

    #[test]
    fn test_param_sized_buffer_is_allocated() {
        let args = marshal(&SIZED, 7, &[Value::Int32(16)]).unwrap();
        assert_eq!(args[2].buffer_len(), Some(16));

        let err = marshal(&SIZED, 7, &[Value::Int32(-1)]).unwrap_err();
        assert!(matches!(err, IviError::InvalidParameter { .. }));
    }

    #[test]
    fn test_string_with_nul_rejected() {
        const ONE_STRING: FunctionSpec = FunctionSpec::new(
            "WriteText",
            &[ParamSpec::session(), ParamSpec::input("text", ViType::String)],
        );
        let err = marshal(&ONE_STRING, 1, &[Value::from("a\0b")]).unwrap_err();
        assert!(matches!(err, IviError::InvalidParameter { .. }));
    }

    #[test]
    fn test_outputs_unmarshal_in_declaration_order() {
        let mut args = marshal(&CAL, 1, &[Value::Int32(0)]).unwrap();
        assert!(args[2].write(&Value::Int32(6)));
        assert!(args[3].write(&Value::Int32(30)));
        assert!(args[4].write(&Value::Int32(2017)));
        assert_eq!(
            unmarshal(&CAL, &args),
            vec![Value::Int32(6), Value::Int32(30), Value::Int32(2017)]
        );
    }

    #[test]
    fn test_attribute_id_output_stays_unsigned() {
        const NEXT_ATTRIBUTE: FunctionSpec = FunctionSpec::new(
            "GetNextCoercionRecord",
            &[ParamSpec::session(), ParamSpec::output("attributeId", ViType::Attr)],
        );
        let mut args = marshal(&NEXT_ATTRIBUTE, 1, &[]).unwrap();
        assert_eq!(args[1], ForeignArg::OutAttr(0));
        assert!(args[1].write(&Value::UInt32(0x8000_0001)));
        assert!(!args[1].write(&Value::Int32(-1)));
        assert_eq!(unmarshal(&NEXT_ATTRIBUTE, &args), vec![Value::UInt32(0x8000_0001)]);
    }

    #[test]
    fn test_buffer_write_truncates_and_terminates() {
        let mut exact = ForeignArg::Buffer(Some(vec![0; 15]));
        assert!(exact.write(&Value::from("Testing is fun?")));
        assert_eq!(exact.output_value(), Some(Value::from("Testing is fun?")));

        let mut short = ForeignArg::Buffer(Some(vec![0xff; 4]));
        assert!(short.write(&Value::from("ab")));
        assert_eq!(short.output_value(), Some(Value::from("ab")));

        let mut null = ForeignArg::Buffer(None);
        assert!(!null.write(&Value::from("x")));
    }
}
