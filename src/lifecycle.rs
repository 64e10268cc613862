//! Lifecycle functions (create, read, copy, close, free).

use crate::context::Context;
use crate::error::IslFfiError;
use crate::handle::{IslContextHandle, IslSetHandle};
use crate::resource::{Ownership, RawHandle};
use crate::set::Set;
use crate::util::{cstr_to_str, set_error, set_error_null, set_ok, string_to_cstr};
use std::os::raw::c_char;

/// Create a new context, loading the engine library on first use.
///
/// # Parameters
///
/// - `error`: Out-parameter for error information
///
/// # Returns
///
/// Handle on success, NULL on failure.
///
/// # Ownership
///
/// Caller owns the returned handle. Must call `islcore_context_free()`.
///
/// # Safety
///
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_context_create(error: *mut IslFfiError) -> *mut IslContextHandle {
    match Context::create() {
        Ok(ctx) => {
            unsafe { set_ok(error) };
            Box::into_raw(IslContextHandle::new(ctx))
        }
        Err(e) => unsafe { set_error_null(error, e.into()) },
    }
}

/// Close a context. Idempotent; the handle stays valid until freed.
///
/// Sets created in the context stay usable until they are closed; the engine
/// instance is released after the last of them.
///
/// # Safety
///
/// - `ctx` must be a live context handle or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_context_close(ctx: *const IslContextHandle) {
    if let Some(ctx) = unsafe { IslContextHandle::from_ptr(ctx) } {
        ctx.as_ref().close();
    }
}

/// Close and free a context handle.
///
/// # Safety
///
/// - `ctx` must be a handle returned by `islcore_context_create`, or NULL
/// - The handle must not be used after this call
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_context_free(ctx: *mut IslContextHandle) {
    if ctx.is_null() {
        return;
    }

    // Take ownership and drop; dropping closes.
    unsafe {
        drop(Box::from_raw(ctx));
    }
}

/// Parse set text in a context.
///
/// # Parameters
///
/// - `ctx`: Context handle
/// - `text`: Set in textual notation (UTF-8, null-terminated)
/// - `error`: Out-parameter for error information
///
/// # Returns
///
/// Owned set handle on success, NULL on failure. Free with `islcore_set_free()`.
///
/// # Safety
///
/// - `ctx` must be a live context handle or NULL
/// - `text` must be a valid null-terminated string or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_context_read_set(
    ctx: *const IslContextHandle,
    text: *const c_char,
    error: *mut IslFfiError,
) -> *mut IslSetHandle {
    let Some(ctx) = (unsafe { IslContextHandle::from_ptr(ctx) }) else {
        return unsafe { set_error_null(error, IslFfiError::invalid_handle()) };
    };
    let text = match unsafe { cstr_to_str(text, "text") } {
        Ok(t) => t,
        Err(e) => return unsafe { set_error_null(error, e) },
    };

    match ctx.as_ref().read_set(text) {
        Ok(set) => {
            unsafe { set_ok(error) };
            Box::into_raw(IslSetHandle::new(set))
        }
        Err(e) => unsafe { set_error_null(error, e.into()) },
    }
}

/// Parse set text in a context (set-side spelling of `islcore_context_read_set`).
///
/// # Safety
///
/// Same as `islcore_context_read_set`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_read_from(
    ctx: *const IslContextHandle,
    text: *const c_char,
    error: *mut IslFfiError,
) -> *mut IslSetHandle {
    let Some(ctx) = (unsafe { IslContextHandle::from_ptr(ctx) }) else {
        return unsafe { set_error_null(error, IslFfiError::invalid_handle()) };
    };
    let text = match unsafe { cstr_to_str(text, "text") } {
        Ok(t) => t,
        Err(e) => return unsafe { set_error_null(error, e) },
    };

    match Set::read_from(ctx.as_ref(), text) {
        Ok(set) => {
            unsafe { set_ok(error) };
            Box::into_raw(IslSetHandle::new(set))
        }
        Err(e) => unsafe { set_error_null(error, e.into()) },
    }
}

/// Wrap a raw engine set handle without taking ownership of it.
///
/// Closing or freeing the returned handle never releases `raw`.
///
/// # Safety
///
/// - `ctx` must be a live context handle or NULL
/// - `raw` must be a live set in `ctx`'s engine instance that its owner keeps
///   alive until the returned handle is closed
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_borrow(
    ctx: *const IslContextHandle,
    raw: u64,
    error: *mut IslFfiError,
) -> *mut IslSetHandle {
    let Some(ctx) = (unsafe { IslContextHandle::from_ptr(ctx) }) else {
        return unsafe { set_error_null(error, IslFfiError::invalid_handle()) };
    };

    match unsafe { Set::from_raw(ctx.as_ref(), RawHandle::new(raw), Ownership::Borrowed) } {
        Ok(set) => {
            unsafe { set_ok(error) };
            Box::into_raw(IslSetHandle::new(set))
        }
        Err(e) => unsafe { set_error_null(error, e.into()) },
    }
}

/// Copy a set into a new owned handle.
///
/// # Safety
///
/// - `set` must be a live set handle or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_copy(
    set: *const IslSetHandle,
    error: *mut IslFfiError,
) -> *mut IslSetHandle {
    let Some(set) = (unsafe { IslSetHandle::from_ptr(set) }) else {
        return unsafe { set_error_null(error, IslFfiError::invalid_handle()) };
    };

    match set.as_ref().try_clone() {
        Ok(copy) => {
            unsafe { set_ok(error) };
            Box::into_raw(IslSetHandle::new(copy))
        }
        Err(e) => unsafe { set_error_null(error, e.into()) },
    }
}

/// Canonical text of a set.
///
/// # Returns
///
/// String on success (free with `islcore_string_free()`), NULL on failure.
///
/// # Safety
///
/// - `set` must be a live set handle or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_to_str(
    set: *const IslSetHandle,
    error: *mut IslFfiError,
) -> *mut c_char {
    let Some(set) = (unsafe { IslSetHandle::from_ptr(set) }) else {
        return unsafe { set_error_null(error, IslFfiError::invalid_handle()) };
    };

    match set.as_ref().to_text() {
        Ok(text) => {
            unsafe { set_ok(error) };
            string_to_cstr(text)
        }
        Err(e) => unsafe { set_error_null(error, e.into()) },
    }
}

/// Raw engine handle of an open set, for passing to native code.
///
/// # Returns
///
/// The handle, or 0 on error (closed set or NULL pointer).
///
/// # Safety
///
/// - `set` must be a live set handle or NULL
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_raw(set: *const IslSetHandle, error: *mut IslFfiError) -> u64 {
    let Some(set) = (unsafe { IslSetHandle::from_ptr(set) }) else {
        return unsafe { set_error(error, IslFfiError::invalid_handle()) };
    };

    match set.as_ref().handle() {
        Ok(raw) => {
            unsafe { set_ok(error) };
            raw.get()
        }
        Err(e) => unsafe { set_error(error, e.into()) },
    }
}

/// Whether the set owns its engine handle.
///
/// # Returns
///
/// 1 if owned, 0 if borrowed or `set` is NULL.
///
/// # Safety
///
/// - `set` must be a live set handle or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_is_owned(set: *const IslSetHandle) -> i32 {
    match unsafe { IslSetHandle::from_ptr(set) } {
        Some(set) => i32::from(set.as_ref().is_owned()),
        None => 0,
    }
}

/// Close a set. Idempotent; the handle stays valid until freed.
///
/// # Safety
///
/// - `set` must be a live set handle or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_close(set: *const IslSetHandle) {
    if let Some(set) = unsafe { IslSetHandle::from_ptr(set) } {
        set.as_ref().close();
    }
}

/// Close and free a set handle.
///
/// # Safety
///
/// - `set` must be a handle returned by a set constructor, or NULL
/// - The handle must not be used after this call
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_set_free(set: *mut IslSetHandle) {
    if set.is_null() {
        return;
    }

    unsafe {
        drop(Box::from_raw(set));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IslErrorCode, islcore_error_free};
    use std::ffi::{CStr, CString};
    use std::ptr;

    #[test]
    fn test_create_and_free() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };
        assert!(!ctx.is_null());
        assert_eq!(error.code, IslErrorCode::Ok);

        unsafe { islcore_context_close(ctx) };
        unsafe { islcore_context_close(ctx) };
        unsafe { islcore_context_free(ctx) };
        unsafe { islcore_context_free(ptr::null_mut()) };
    }

    #[test]
    fn test_null_arguments() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };

        let set = unsafe { islcore_context_read_set(ctx, ptr::null(), &mut error) };
        assert!(set.is_null());
        assert_eq!(error.code, IslErrorCode::NullPointer);
        unsafe { islcore_error_free(&mut error) };

        // NULL handles of either kind report the same code
        let text = CString::new("{ [i] }").unwrap();
        let set = unsafe { islcore_set_read_from(ptr::null(), text.as_ptr(), &mut error) };
        assert!(set.is_null());
        assert_eq!(error.code, IslErrorCode::InvalidHandle);
        unsafe { islcore_error_free(&mut error) };

        let set = unsafe { islcore_context_read_set(ptr::null(), text.as_ptr(), &mut error) };
        assert!(set.is_null());
        assert_eq!(error.code, IslErrorCode::InvalidHandle);
        unsafe { islcore_error_free(&mut error) };

        let set = unsafe { islcore_set_borrow(ptr::null(), 1, &mut error) };
        assert!(set.is_null());
        assert_eq!(error.code, IslErrorCode::InvalidHandle);
        unsafe { islcore_error_free(&mut error) };

        let s = unsafe { islcore_set_to_str(ptr::null(), &mut error) };
        assert!(s.is_null());
        assert_eq!(error.code, IslErrorCode::InvalidHandle);
        unsafe { islcore_error_free(&mut error) };

        let copy = unsafe { islcore_set_copy(ptr::null(), &mut error) };
        assert!(copy.is_null());
        assert_eq!(error.code, IslErrorCode::InvalidHandle);
        unsafe { islcore_error_free(&mut error) };

        assert_eq!(unsafe { islcore_set_raw(ptr::null(), &mut error) }, 0);
        assert_eq!(error.code, IslErrorCode::InvalidHandle);
        unsafe { islcore_error_free(&mut error) };

        unsafe { islcore_context_free(ctx) };
    }

    #[test]
    fn test_invalid_utf8() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };
        let bad = [0x7b_u8, 0xff, 0xfe, 0x7d, 0x00];
        let set = unsafe { islcore_context_read_set(ctx, bad.as_ptr().cast(), &mut error) };
        assert!(set.is_null());
        assert_eq!(error.code, IslErrorCode::InvalidUtf8);
        unsafe { islcore_error_free(&mut error) };
        unsafe { islcore_context_free(ctx) };
    }

    #[test]
    fn test_borrowed_set_via_raw_handle() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };
        let text = CString::new("{ [i] : i >= 0 }").unwrap();
        let owner = unsafe { islcore_context_read_set(ctx, text.as_ptr(), &mut error) };
        assert_eq!(unsafe { islcore_set_is_owned(owner) }, 1);

        let raw = unsafe { islcore_set_raw(owner, &mut error) };
        assert_ne!(raw, 0);
        let view = unsafe { islcore_set_borrow(ctx, raw, &mut error) };
        assert!(!view.is_null());
        assert_eq!(unsafe { islcore_set_is_owned(view) }, 0);
        unsafe { islcore_set_free(view) };

        // the owner is unaffected by freeing the borrowed view
        let s = unsafe { islcore_set_to_str(owner, &mut error) };
        assert!(!s.is_null());
        assert_eq!(
            unsafe { CStr::from_ptr(s) }.to_str().unwrap(),
            "{ [i] : i >= 0 }"
        );
        unsafe { crate::util::islcore_string_free(s) };

        let zero = unsafe { islcore_set_borrow(ctx, 0, &mut error) };
        assert!(zero.is_null());
        assert_eq!(error.code, IslErrorCode::NullHandle);
        unsafe { islcore_error_free(&mut error) };

        unsafe { islcore_set_free(owner) };
        unsafe { islcore_context_free(ctx) };
    }

    #[test]
    fn test_closed_set_reports_object_closed() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };
        let text = CString::new("{ [i, j] : 0 <= i < j <= 4 }").unwrap();
        let set = unsafe { islcore_context_read_set(ctx, text.as_ptr(), &mut error) };
        let copy = unsafe { islcore_set_copy(set, &mut error) };
        assert!(!copy.is_null());

        unsafe { islcore_set_close(set) };
        unsafe { islcore_set_close(set) };
        assert_eq!(unsafe { islcore_set_raw(set, &mut error) }, 0);
        assert_eq!(error.code, IslErrorCode::ObjectClosed);
        unsafe { islcore_error_free(&mut error) };

        let copy_text = unsafe { islcore_set_to_str(copy, &mut error) };
        assert!(!copy_text.is_null());
        unsafe { crate::util::islcore_string_free(copy_text) };

        unsafe { islcore_set_free(set) };
        unsafe { islcore_set_free(copy) };
        unsafe { islcore_context_free(ctx) };
    }
}
