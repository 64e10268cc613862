//! Error handling for the core and the FFI layer.
//!
//! `IslError` is what the safe Rust API returns. `IslFfiError` is the
//! C-compatible out-parameter the exported functions fill in.

use std::ffi::CString;
use std::os::raw::c_char;
use thiserror::Error;

/// Errors produced by contexts, managed objects and engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IslError {
    /// The engine could not allocate a new context.
    #[error("failed to create ISL context")]
    AllocationFailed,

    /// Operation on a context after `close()`.
    #[error("ISL context is closed")]
    ContextClosed,

    /// Operation on a managed object after `close()`.
    #[error("ISL {kind} is closed")]
    ObjectClosed { kind: &'static str },

    /// Caller passed an argument that can never be valid.
    #[error("invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    /// Attempt to wrap the zero handle.
    #[error("native {kind} handle must not be 0")]
    NullHandle { kind: &'static str },

    /// The engine rejected the textual representation.
    #[error("failed to parse ISL text: {0}")]
    Parse(String),

    /// The engine library could not be initialised.
    #[error("failed to load ISL library: {0}")]
    LibraryLoad(String),

    /// Any other failure reported by the engine.
    #[error("ISL engine error: {0}")]
    Engine(String),
}

pub type IslResult<T> = Result<T, IslError>;

/// Error codes for FFI functions.
///
/// These codes are stable and can be matched in C code.
/// Codes 1-99 map to `IslError` variants.
/// Codes 100+ are FFI-specific errors.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IslErrorCode {
    /// No error
    Ok = 0,

    /// Context allocation failed
    AllocationFailed = 1,
    /// Context used after close
    ContextClosed = 2,
    /// Object used after close
    ObjectClosed = 3,
    /// Argument rejected before any engine call
    InvalidArgument = 4,
    /// Zero handle passed where a live one is required
    NullHandle = 5,
    /// Set text could not be parsed
    Parse = 6,
    /// Engine library failed to load
    LibraryLoad = 7,
    /// Other engine failure
    Engine = 8,

    // FFI-specific errors (100+)
    /// Null pointer passed
    NullPointer = 100,
    /// Invalid UTF-8 string
    InvalidUtf8 = 101,
    /// JSON parse error
    JsonParse = 102,
    /// Invalid handle
    InvalidHandle = 103,
}

impl From<&IslError> for IslErrorCode {
    fn from(e: &IslError) -> Self {
        match e {
            IslError::AllocationFailed => Self::AllocationFailed,
            IslError::ContextClosed => Self::ContextClosed,
            IslError::ObjectClosed { .. } => Self::ObjectClosed,
            IslError::InvalidArgument { .. } => Self::InvalidArgument,
            IslError::NullHandle { .. } => Self::NullHandle,
            IslError::Parse(_) => Self::Parse,
            IslError::LibraryLoad(_) => Self::LibraryLoad,
            IslError::Engine(_) => Self::Engine,
        }
    }
}

/// Error structure returned via out-parameter.
///
/// # Memory Ownership
///
/// The `message` field is owned by the FFI layer when non-null.
/// Call `islcore_error_free()` to release the message memory.
#[repr(C)]
pub struct IslFfiError {
    /// Error code
    pub code: IslErrorCode,
    /// Error message (NULL if code == Ok)
    pub message: *mut c_char,
}

impl IslFfiError {
    /// Create a success result (no error).
    pub fn ok() -> Self {
        Self {
            code: IslErrorCode::Ok,
            message: std::ptr::null_mut(),
        }
    }

    fn with_message(code: IslErrorCode, msg: String) -> Self {
        Self {
            code,
            message: CString::new(msg)
                .map(CString::into_raw)
                .unwrap_or(std::ptr::null_mut()),
        }
    }

    /// Create an error from a core error.
    pub fn from_core_error(e: &IslError) -> Self {
        Self::with_message(IslErrorCode::from(e), e.to_string())
    }

    /// Create a null pointer error.
    pub fn null_pointer(param: &str) -> Self {
        Self::with_message(
            IslErrorCode::NullPointer,
            format!("null pointer passed for parameter: {param}"),
        )
    }

    /// Create an invalid UTF-8 error.
    pub fn invalid_utf8(context: &str) -> Self {
        Self::with_message(IslErrorCode::InvalidUtf8, format!("invalid UTF-8 in {context}"))
    }

    /// Create a JSON parse error.
    pub fn json_parse(e: serde_json::Error) -> Self {
        Self::with_message(IslErrorCode::JsonParse, format!("JSON parse error: {e}"))
    }

    /// Create an invalid handle error.
    pub fn invalid_handle() -> Self {
        Self::with_message(IslErrorCode::InvalidHandle, "invalid or null handle".to_string())
    }
}

impl From<IslError> for IslFfiError {
    fn from(e: IslError) -> Self {
        Self::from_core_error(&e)
    }
}

/// Free error message memory.
///
/// Safe to call with NULL error or NULL message.
///
/// # Safety
///
/// The error pointer must be valid or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_error_free(error: *mut IslFfiError) {
    if error.is_null() {
        return;
    }
    unsafe {
        let err = &mut *error;
        if !err.message.is_null() {
            drop(CString::from_raw(err.message));
            err.message = std::ptr::null_mut();
        }
    }
}
