//! Dynamic loading of native IVI-C driver libraries.
//!
//! This module loads a vendor-supplied shared library, resolves every
//! declared entry point once, and calls through `libffi` using the C types
//! of the marshalled arguments.

use crate::config::DriverConfig;
use crate::entry_points;
use crate::error::{IviError, IviResult};
use crate::library::DriverLibrary;
use crate::marshal::ForeignArg;
use libffi::middle::{Arg, Cif, CodePtr, Type};
use libloading::Library;
use lib_ivi_types::{FunctionSpec, ViStatus};
use std::collections::HashMap;
use std::ffi::{c_char, c_void};
use std::ptr;
use std::sync::Arc;

/// Untyped entry-point address; the real signature comes from its declaration.
type EntryPoint = unsafe extern "C" fn();

/// Loaded driver library with resolved entry points.
pub struct NativeLibrary {
    /// The underlying dynamic library handle.
    #[allow(dead_code)]
    library: Library,

    /// Path to the library file.
    pub path: String,

    /// Resolved entry points, keyed by unprefixed name.
    entry_points: HashMap<&'static str, EntryPoint>,
}

impl NativeLibrary {
    /// Load the library named by `config` and resolve its entry points.
    ///
    /// The common required entry points must be present. The common optional
    /// ones and the driver's own `functions` are resolved when exported.
    ///
    /// # Safety
    ///
    /// The library must implement each resolved entry point with exactly the
    /// declared signature. A mismatched library causes undefined behavior on
    /// the first call.
    pub fn load(config: &DriverConfig, functions: &[FunctionSpec]) -> IviResult<Arc<Self>> {
        let path_str = config.library.display().to_string();

        let library = unsafe { Library::new(&config.library) }
            .map_err(|e| IviError::load_error(&path_str, e))?;

        let mut resolved = HashMap::new();

        for function in entry_points::REQUIRED {
            let symbol = config.symbol(function.name);
            let entry = unsafe { resolve(&library, &symbol) }
                .ok_or_else(|| IviError::symbol_not_found(&symbol))?;
            resolved.insert(function.name, entry);
        }

        for function in entry_points::OPTIONAL.iter().chain(functions) {
            let symbol = config.symbol(function.name);
            match unsafe { resolve(&library, &symbol) } {
                Some(entry) => {
                    resolved.insert(function.name, entry);
                }
                None => tracing::debug!(symbol = %symbol, "Optional entry point not exported"),
            }
        }

        tracing::info!(
            path = %path_str,
            entry_points = resolved.len(),
            "Loaded driver library"
        );

        Ok(Arc::new(Self {
            library,
            path: path_str,
            entry_points: resolved,
        }))
    }
}

/// Look up `symbol` in `library`.
///
/// # Safety
///
/// The returned address is only valid while `library` is loaded.
unsafe fn resolve(library: &Library, symbol: &str) -> Option<EntryPoint> {
    let mut name = symbol.as_bytes().to_vec();
    name.push(0);
    library.get::<EntryPoint>(&name).ok().map(|s| *s)
}

fn ffi_type(arg: &ForeignArg) -> Type {
    match arg {
        ForeignArg::Session(_) | ForeignArg::Attr(_) => Type::u32(),
        ForeignArg::Boolean(_) => Type::u16(),
        ForeignArg::Int16(_) => Type::i16(),
        ForeignArg::Int32(_) => Type::i32(),
        ForeignArg::Int64(_) => Type::i64(),
        ForeignArg::Real64(_) => Type::f64(),
        _ => Type::pointer(),
    }
}

/// Address passed for arguments that travel by reference.
fn pointer_to(arg: &mut ForeignArg) -> *mut c_void {
    match arg {
        ForeignArg::Str(s) => s.as_ptr() as *mut c_char as *mut c_void,
        ForeignArg::OutSession(v) => v as *mut _ as *mut c_void,
        ForeignArg::OutBoolean(v) => v as *mut _ as *mut c_void,
        ForeignArg::OutInt16(v) => v as *mut _ as *mut c_void,
        ForeignArg::OutInt32(v) => v as *mut _ as *mut c_void,
        ForeignArg::OutInt64(v) => v as *mut _ as *mut c_void,
        ForeignArg::OutAttr(v) => v as *mut _ as *mut c_void,
        ForeignArg::OutReal64(v) => v as *mut _ as *mut c_void,
        ForeignArg::Buffer(Some(bytes)) => bytes.as_mut_ptr() as *mut c_void,
        _ => ptr::null_mut(),
    }
}

impl DriverLibrary for NativeLibrary {
    fn call(&self, function: &FunctionSpec, args: &mut [ForeignArg]) -> IviResult<ViStatus> {
        let entry = *self
            .entry_points
            .get(function.name)
            .ok_or_else(|| IviError::symbol_not_found(function.name))?;

        if args.len() != function.params.len() {
            return Err(IviError::ArityMismatch {
                function: function.name.to_string(),
                expected: function.params.len(),
                got: args.len(),
            });
        }

        let cif = Cif::new(args.iter().map(ffi_type), Type::i32());

        // Pointers are taken before any shared borrow so the slots stay put
        // for the duration of the call.
        let pointers: Vec<*mut c_void> = args.iter_mut().map(pointer_to).collect();

        let ffi_args: Vec<Arg> = args
            .iter()
            .zip(&pointers)
            .map(|(arg, pointer)| match arg {
                ForeignArg::Session(v) | ForeignArg::Attr(v) => Arg::new(v),
                ForeignArg::Boolean(v) => Arg::new(v),
                ForeignArg::Int16(v) => Arg::new(v),
                ForeignArg::Int32(v) => Arg::new(v),
                ForeignArg::Int64(v) => Arg::new(v),
                ForeignArg::Real64(v) => Arg::new(v),
                _ => Arg::new(pointer),
            })
            .collect();

        // SAFETY: the entry point was resolved from the declaration's name and
        // `ffi_args` matches the declared parameter list one-to-one.
        let status: ViStatus = unsafe { cif.call(CodePtr::from_fun(entry), &ffi_args) };

        tracing::trace!(function = function.name, status, "Native call returned");
        Ok(status)
    }

    fn has_entry_point(&self, name: &str) -> bool {
        self.entry_points.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_ivi_types::OpenOptions;
    use std::path::PathBuf;

    #[test]
    fn test_load_nonexistent_library() {
        let config = DriverConfig {
            library: PathBuf::from("/nonexistent/libnifake_64.so"),
            prefix: "niFake_".to_string(),
            resource: None,
            options: OpenOptions::default(),
            attributes: Vec::new(),
        };
        let result = NativeLibrary::load(&config, &[]);
        assert!(matches!(result, Err(IviError::LoadError { .. })));
    }

    #[test]
    fn test_reference_arguments_pass_pointers() {
        assert!(pointer_to(&mut ForeignArg::Buffer(None)).is_null());
        assert!(!pointer_to(&mut ForeignArg::OutInt32(0)).is_null());
        assert!(!pointer_to(&mut ForeignArg::Buffer(Some(vec![0; 4]))).is_null());
        assert!(pointer_to(&mut ForeignArg::Int32(5)).is_null());
    }

    // In-process stand-ins for driver exports, called through the same
    // libffi path as a loaded library.
    #[cfg(unix)]
    mod fake_driver {
        use std::ffi::{c_char, CStr};
        use std::ptr;
        use std::sync::atomic::{AtomicU64, Ordering};

        const MODEL: &[u8] = b"Testing is fun?";
        static STORED_DOUBLE: AtomicU64 = AtomicU64::new(0);

        pub extern "C" fn init_with_options(
            resource: *const c_char,
            _id_query: u16,
            _reset_device: u16,
            _option_string: *const c_char,
            vi: *mut u32,
        ) -> i32 {
            let resource = unsafe { CStr::from_ptr(resource) };
            if resource.to_bytes() != b"dev1" {
                return -17;
            }
            unsafe { *vi = 42 };
            0
        }

        pub extern "C" fn close(vi: u32) -> i32 {
            if vi == 42 {
                0
            } else {
                -1
            }
        }

        pub extern "C" fn get_error_message(_vi: u32, code: i32, message: *mut c_char) -> i32 {
            let text: &[u8] = if code == -17 { b"Resource not found\0" } else { b"\0" };
            unsafe { ptr::copy_nonoverlapping(text.as_ptr() as *const c_char, message, text.len()) };
            0
        }

        pub extern "C" fn get_attribute_string(
            _vi: u32,
            _channel: *const c_char,
            attribute: u32,
            size: i32,
            value: *mut c_char,
        ) -> i32 {
            if attribute != 1_000_002 {
                return -1;
            }
            if size == 0 {
                return if value.is_null() { MODEL.len() as i32 + 1 } else { -2 };
            }
            let n = MODEL.len().min(size as usize - 1);
            unsafe {
                ptr::copy_nonoverlapping(MODEL.as_ptr() as *const c_char, value, n);
                *value.add(n) = 0;
            }
            0
        }

        pub extern "C" fn set_attribute_real64(_vi: u32, _channel: *const c_char, _attribute: u32, value: f64) -> i32 {
            STORED_DOUBLE.store(value.to_bits(), Ordering::SeqCst);
            0
        }

        pub extern "C" fn get_attribute_real64(
            _vi: u32,
            _channel: *const c_char,
            _attribute: u32,
            value: *mut f64,
        ) -> i32 {
            unsafe { *value = f64::from_bits(STORED_DOUBLE.load(Ordering::SeqCst)) };
            0
        }
    }

    #[cfg(unix)]
    fn fake_library() -> Arc<dyn DriverLibrary> {
        use crate::entry_points::{
            CLOSE, GET_ATTRIBUTE_VI_REAL64, GET_ATTRIBUTE_VI_STRING, GET_ERROR_MESSAGE,
            INIT_WITH_OPTIONS, SET_ATTRIBUTE_VI_REAL64,
        };

        let exports: [(&'static str, *const ()); 6] = [
            (INIT_WITH_OPTIONS.name, fake_driver::init_with_options as *const ()),
            (CLOSE.name, fake_driver::close as *const ()),
            (GET_ERROR_MESSAGE.name, fake_driver::get_error_message as *const ()),
            (GET_ATTRIBUTE_VI_STRING.name, fake_driver::get_attribute_string as *const ()),
            (SET_ATTRIBUTE_VI_REAL64.name, fake_driver::set_attribute_real64 as *const ()),
            (GET_ATTRIBUTE_VI_REAL64.name, fake_driver::get_attribute_real64 as *const ()),
        ];
        let entry_points = exports
            .into_iter()
            .map(|(name, address)| (name, unsafe { std::mem::transmute::<*const (), EntryPoint>(address) }))
            .collect();

        Arc::new(NativeLibrary {
            library: libloading::os::unix::Library::this().into(),
            path: "<in-process>".to_string(),
            entry_points,
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_native_calls_through_session() {
        use crate::lifecycle::Session;
        use lib_ivi_types::{AttributeType, Value};

        let library = fake_library();
        assert!(library.has_entry_point("InitWithOptions"));
        assert!(!library.has_entry_point("GetError"));

        let err = Session::open_with(Arc::clone(&library), "dev9", &OpenOptions::default()).unwrap_err();
        assert_eq!(err.code(), Some(-17));
        assert_eq!(err.description(), Some("Resource not found"));

        let mut session = Session::open_with(library, "dev1", &OpenOptions::default()).unwrap();
        assert_eq!(session.handle(), Some(42));

        // Length probe with a null buffer, then the fill call.
        let text = session
            .get_attribute_value("", 1_000_002, AttributeType::String)
            .unwrap();
        assert_eq!(text, Value::from("Testing is fun?"));

        session
            .set_attribute_value("", 1_000_001, AttributeType::Real64, Value::Real64(2.5))
            .unwrap();
        let value = session
            .get_attribute_value("", 1_000_001, AttributeType::Real64)
            .unwrap();
        assert_eq!(value, Value::Real64(2.5));

        session.close().unwrap();
        session.close().unwrap();
    }
}
