//! Static metadata describing driver entry points.
//!
//! Every driver function is declared once as a [`FunctionSpec`]: an ordered
//! list of typed parameters, each tagged input or output. The generic invoker
//! marshals arguments from this metadata, so wrappers never hand-write
//! conversion code.

use serde::{Deserialize, Serialize};

/// C type of a parameter as it crosses the foreign boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViType {
    /// `ViSession` handle.
    Session,
    /// `ViBoolean` (u16).
    Boolean,
    /// `ViInt16`.
    Int16,
    /// `ViInt32`.
    Int32,
    /// `ViInt64`.
    Int64,
    /// `ViAttr` (u32).
    Attr,
    /// `ViReal64`.
    Real64,
    /// `ViConstString` as input, `ViChar[]` as output.
    String,
}

impl ViType {
    /// Display name matching the IVI-C typedef.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Session => "ViSession",
            Self::Boolean => "ViBoolean",
            Self::Int16 => "ViInt16",
            Self::Int32 => "ViInt32",
            Self::Int64 => "ViInt64",
            Self::Attr => "ViAttr",
            Self::Real64 => "ViReal64",
            Self::String => "ViString",
        }
    }
}

/// Parameter direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Passed by value (or as a read-only string).
    In,
    /// Passed by reference; written by the driver.
    Out,
}

/// How the size of an output string buffer is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferSize {
    /// A fixed number of bytes.
    Fixed(usize),
    /// The caller supplies the size through the named input parameter.
    Param(&'static str),
    /// The size is discovered with a length probe (size 0, null buffer)
    /// followed by a fill call. The named size parameter is filled in by the
    /// invoker and is not a caller input.
    Probe(&'static str),
}

/// One parameter of a driver entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub direction: Direction,
    pub ty: ViType,
    pub buffer: Option<BufferSize>,
}

impl ParamSpec {
    /// The leading device handle, filled in from the session.
    pub const fn session() -> Self {
        Self::input("vi", ViType::Session)
    }

    pub const fn input(name: &'static str, ty: ViType) -> Self {
        Self {
            name,
            direction: Direction::In,
            ty,
            buffer: None,
        }
    }

    pub const fn output(name: &'static str, ty: ViType) -> Self {
        Self {
            name,
            direction: Direction::Out,
            ty,
            buffer: None,
        }
    }

    /// An output character buffer.
    pub const fn buffer(name: &'static str, size: BufferSize) -> Self {
        Self {
            name,
            direction: Direction::Out,
            ty: ViType::String,
            buffer: Some(size),
        }
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Out
    }
}

/// Declaration of a driver entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionSpec {
    /// Entry-point name without the driver prefix (e.g. `GetAttributeViString`).
    pub name: &'static str,

    /// Parameters in C declaration order.
    pub params: &'static [ParamSpec],
}

impl FunctionSpec {
    pub const fn new(name: &'static str, params: &'static [ParamSpec]) -> Self {
        Self { name, params }
    }

    /// Index of a parameter by name.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Whether the first parameter is the device handle.
    pub fn takes_session(&self) -> bool {
        matches!(
            self.params.first(),
            Some(ParamSpec {
                direction: Direction::In,
                ty: ViType::Session,
                ..
            })
        )
    }

    /// The (size parameter, buffer parameter) indices when this function
    /// returns a string through the length-probe protocol.
    pub fn probe_buffer(&self) -> Option<(usize, usize)> {
        self.params.iter().enumerate().find_map(|(idx, p)| match p.buffer {
            Some(BufferSize::Probe(size_name)) => {
                self.param_index(size_name).map(|size_idx| (size_idx, idx))
            }
            _ => None,
        })
    }

    /// Whether the parameter at `idx` is supplied by the caller.
    ///
    /// The device handle and probe-managed size parameters are filled in by
    /// the invoker.
    pub fn is_caller_input(&self, idx: usize) -> bool {
        let Some(param) = self.params.get(idx) else {
            return false;
        };
        if param.direction != Direction::In || param.ty == ViType::Session {
            return false;
        }
        !matches!(self.probe_buffer(), Some((size_idx, _)) if size_idx == idx)
    }

    /// Number of values the caller must supply.
    pub fn input_arity(&self) -> usize {
        (0..self.params.len())
            .filter(|&idx| self.is_caller_input(idx))
            .count()
    }

    /// Number of values returned on success.
    pub fn output_arity(&self) -> usize {
        self.params.iter().filter(|p| p.is_output()).count()
    }

    /// Check the declaration for internal consistency.
    pub fn validate(&self) -> Result<(), SpecError> {
        for (idx, param) in self.params.iter().enumerate() {
            if param.ty == ViType::Session && param.direction == Direction::In && idx != 0 {
                return Err(SpecError::new(self.name, param.name, "device handle must come first"));
            }

            match param.buffer {
                Some(_) if param.direction != Direction::Out || param.ty != ViType::String => {
                    return Err(SpecError::new(
                        self.name,
                        param.name,
                        "only output strings may declare a buffer size",
                    ));
                }
                Some(BufferSize::Param(size_name)) | Some(BufferSize::Probe(size_name)) => {
                    let size_param = self
                        .param_index(size_name)
                        .map(|i| &self.params[i])
                        .ok_or_else(|| {
                            SpecError::new(self.name, param.name, "size parameter not declared")
                        })?;
                    if size_param.direction != Direction::In || size_param.ty != ViType::Int32 {
                        return Err(SpecError::new(
                            self.name,
                            size_param.name,
                            "buffer size must be a ViInt32 input",
                        ));
                    }
                }
                Some(BufferSize::Fixed(_)) => {}
                None if param.direction == Direction::Out && param.ty == ViType::String => {
                    return Err(SpecError::new(
                        self.name,
                        param.name,
                        "output string needs a buffer size",
                    ));
                }
                None => {}
            }
        }

        let probes = self
            .params
            .iter()
            .filter(|p| matches!(p.buffer, Some(BufferSize::Probe(_))))
            .count();
        if probes > 1 {
            return Err(SpecError::new(
                self.name,
                "",
                "at most one buffer may use the length probe",
            ));
        }

        Ok(())
    }
}

/// Inconsistent function declaration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid declaration of {function}({param}): {reason}")]
pub struct SpecError {
    pub function: &'static str,
    pub param: &'static str,
    pub reason: &'static str,
}

impl SpecError {
    fn new(function: &'static str, param: &'static str, reason: &'static str) -> Self {
        Self {
            function,
            param,
            reason,
        }
    }
}
