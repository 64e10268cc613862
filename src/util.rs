//! Utility functions for FFI operations.

use crate::error::IslFfiError;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Convert a C string to a borrowed `&str`.
///
/// Returns an error if the pointer is null or contains invalid UTF-8.
///
/// # Safety
///
/// The caller must ensure `ptr` is either null or points to a valid
/// null-terminated C string that outlives `'a`.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char, param_name: &str) -> Result<&'a str, IslFfiError> {
    if ptr.is_null() {
        return Err(IslFfiError::null_pointer(param_name));
    }

    let cstr = unsafe { CStr::from_ptr(ptr) };
    cstr.to_str().map_err(|_| IslFfiError::invalid_utf8(param_name))
}

/// Convert an optional C string to an `Option<&str>`.
///
/// Returns None if the pointer is null, Some if valid,
/// or an error if the string contains invalid UTF-8.
///
/// # Safety
///
/// The caller must ensure `ptr` is either null or points to a valid
/// null-terminated C string that outlives `'a`.
pub unsafe fn cstr_to_option_str<'a>(
    ptr: *const c_char,
    param_name: &str,
) -> Result<Option<&'a str>, IslFfiError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { cstr_to_str(ptr, param_name) }.map(Some)
}

/// Convert a Rust string to a C string, returning an owned pointer.
///
/// The caller is responsible for freeing the returned pointer with `islcore_string_free`.
/// Returns null if the string contains internal null bytes.
pub fn string_to_cstr(s: String) -> *mut c_char {
    CString::new(s)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Set an error in the out-parameter and return a default value.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_error<T: Default>(error: *mut IslFfiError, err: IslFfiError) -> T {
    if let Some(e) = unsafe { error.as_mut() } {
        *e = err;
    }
    T::default()
}

/// Set an error in the out-parameter and return null.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_error_null<T>(error: *mut IslFfiError, err: IslFfiError) -> *mut T {
    if let Some(e) = unsafe { error.as_mut() } {
        *e = err;
    }
    std::ptr::null_mut()
}

/// Set success in the out-parameter error.
///
/// # Safety
///
/// The caller must ensure `error` is either null or a valid pointer.
pub unsafe fn set_ok(error: *mut IslFfiError) {
    if let Some(e) = unsafe { error.as_mut() } {
        *e = IslFfiError::ok();
    }
}

/// Free a string returned by the FFI layer.
///
/// # Safety
///
/// - `str` must be a string returned by an FFI function, or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_string_free(str: *mut c_char) {
    if !str.is_null() {
        unsafe {
            drop(CString::from_raw(str));
        }
    }
}
