//! NI-FAKE function wrappers.
//!
//! Each wrapper is a thin declaration over [`Session::invoke`]: inputs are
//! passed as values and the outputs are unpacked into native types.

use crate::enums::Turtle;
use crate::functions::*;
use lib_ivi_ffi::{IviError, IviResult, Session};
use lib_ivi_types::{EnumValue, FunctionSpec, Value};

/// Calibration timestamp reported by `GetCalDateAndTime`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalDateTime {
    pub month: i32,
    pub day: i32,
    pub year: i32,
    pub hour: i32,
    pub minute: i32,
}

/// NI-FAKE driver functions.
pub trait NiFake {
    fn simple_function(&mut self) -> IviResult<()>;

    fn get_a_number(&mut self) -> IviResult<i16>;

    fn get_a_boolean(&mut self) -> IviResult<bool>;

    /// Quantity and turtle; turtle values outside the catalog are preserved.
    fn get_enum_value(&mut self) -> IviResult<(i32, EnumValue<Turtle>)>;

    fn one_input_function(&mut self, a_number: i32) -> IviResult<()>;

    fn two_input_function(&mut self, a_number: f64, an_int: i32) -> IviResult<()>;

    /// Read a string into a caller-sized buffer; longer values are truncated.
    fn get_a_string_with_specified_maximum_size(&mut self, buffer_size: i32) -> IviResult<String>;

    fn get_cal_date_and_time(&mut self, cal_type: i32) -> IviResult<CalDateTime>;
}

impl NiFake for Session {
    fn simple_function(&mut self) -> IviResult<()> {
        self.invoke(&SIMPLE_FUNCTION, &[])?;
        Ok(())
    }

    fn get_a_number(&mut self) -> IviResult<i16> {
        let outputs = self.invoke(&GET_A_NUMBER, &[])?;
        match outputs.as_slice() {
            [Value::Int16(n)] => Ok(*n),
            _ => Err(unexpected_outputs(&GET_A_NUMBER, &outputs)),
        }
    }

    fn get_a_boolean(&mut self) -> IviResult<bool> {
        let outputs = self.invoke(&GET_A_BOOLEAN, &[])?;
        match outputs.as_slice() {
            [Value::Boolean(b)] => Ok(*b),
            _ => Err(unexpected_outputs(&GET_A_BOOLEAN, &outputs)),
        }
    }

    fn get_enum_value(&mut self) -> IviResult<(i32, EnumValue<Turtle>)> {
        let outputs = self.invoke(&GET_ENUM_VALUE, &[])?;
        match outputs.as_slice() {
            [Value::Int32(quantity), Value::Int16(raw)] => {
                let turtle = EnumValue::from_raw(i32::from(*raw));
                if !turtle.is_known() {
                    tracing::debug!(raw, "Unrecognized Turtle value");
                }
                Ok((*quantity, turtle))
            }
            _ => Err(unexpected_outputs(&GET_ENUM_VALUE, &outputs)),
        }
    }

    fn one_input_function(&mut self, a_number: i32) -> IviResult<()> {
        self.invoke(&ONE_INPUT_FUNCTION, &[Value::Int32(a_number)])?;
        Ok(())
    }

    fn two_input_function(&mut self, a_number: f64, an_int: i32) -> IviResult<()> {
        self.invoke(&TWO_INPUT_FUNCTION, &[Value::Real64(a_number), Value::Int32(an_int)])?;
        Ok(())
    }

    fn get_a_string_with_specified_maximum_size(&mut self, buffer_size: i32) -> IviResult<String> {
        let outputs = self.invoke(&GET_A_STRING_WITH_SPECIFIED_MAXIMUM_SIZE, &[Value::Int32(buffer_size)])?;
        match outputs.as_slice() {
            [Value::String(s)] => Ok(s.clone()),
            _ => Err(unexpected_outputs(&GET_A_STRING_WITH_SPECIFIED_MAXIMUM_SIZE, &outputs)),
        }
    }

    fn get_cal_date_and_time(&mut self, cal_type: i32) -> IviResult<CalDateTime> {
        let outputs = self.invoke(&GET_CAL_DATE_AND_TIME, &[Value::Int32(cal_type)])?;
        match outputs.as_slice() {
            [Value::Int32(month), Value::Int32(day), Value::Int32(year), Value::Int32(hour), Value::Int32(minute)] => {
                Ok(CalDateTime {
                    month: *month,
                    day: *day,
                    year: *year,
                    hour: *hour,
                    minute: *minute,
                })
            }
            _ => Err(unexpected_outputs(&GET_CAL_DATE_AND_TIME, &outputs)),
        }
    }
}

fn unexpected_outputs(function: &FunctionSpec, outputs: &[Value]) -> IviError {
    let declared: Vec<&str> = function
        .params
        .iter()
        .filter(|p| p.is_output())
        .map(|p| p.ty.display_name())
        .collect();
    let got: Vec<&str> = outputs.iter().map(Value::type_name).collect();
    IviError::TypeMismatch {
        function: function.name.to_string(),
        param: "outputs".to_string(),
        expected: declared.join(", "),
        got: got.join(", "),
    }
}
