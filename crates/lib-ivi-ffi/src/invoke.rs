//! Generic function invoker.
//!
//! One routine serves every declared entry point: marshal inputs, allocate
//! outputs, call, and unmarshal outputs in declaration order. Functions that
//! return a string through the length probe are called twice: first with
//! size 0 and a null buffer to learn the size, then with a buffer of exactly
//! that size.

use crate::error::IviResult;
use crate::library::DriverLibrary;
use crate::marshal::{self, ForeignArg};
use lib_ivi_types::{FunctionSpec, Value, ViSession, ViStatus};

/// Raw result of one logical call.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Status of the last physical call made.
    pub status: ViStatus,

    /// Outputs in declaration order; empty when `status` is negative.
    pub outputs: Vec<Value>,
}

/// Call `function` without interpreting its status.
///
/// A negative status from the length probe ends the call; the fill call is
/// not made. A positive probe status is the required buffer size.
pub fn execute(
    library: &dyn DriverLibrary,
    handle: ViSession,
    function: &FunctionSpec,
    inputs: &[Value],
) -> IviResult<Outcome> {
    let mut args = marshal::marshal(function, handle, inputs)?;

    let status = match function.probe_buffer() {
        Some((size_idx, buffer_idx)) => {
            let probe = library.call(function, &mut args)?;
            if probe < 0 {
                tracing::trace!(function = function.name, status = probe, "Length probe failed");
                return Ok(Outcome {
                    status: probe,
                    outputs: Vec::new(),
                });
            }

            tracing::trace!(function = function.name, size = probe, "Length probe");
            args[size_idx] = ForeignArg::Int32(probe);
            args[buffer_idx] = ForeignArg::Buffer(Some(vec![0u8; probe as usize]));
            library.call(function, &mut args)?
        }
        None => library.call(function, &mut args)?,
    };

    tracing::trace!(function = function.name, status, "Called entry point");

    let outputs = if status < 0 {
        Vec::new()
    } else {
        marshal::unmarshal(function, &args)
    };
    Ok(Outcome { status, outputs })
}
