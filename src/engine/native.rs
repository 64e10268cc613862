//! Binding to the system integer set library (feature `isl`).
//!
//! Handles are the library's pointers reinterpreted as integers. The library
//! is linked by `build.rs`.

use super::Engine;
use crate::error::{IslError, IslResult};
use crate::resource::RawHandle;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

#[repr(C)]
struct IslCtx {
    _private: [u8; 0],
}

#[repr(C)]
struct IslSet {
    _private: [u8; 0],
}

const ISL_ON_ERROR_CONTINUE: c_int = 1;

unsafe extern "C" {
    fn isl_version() -> *const c_char;
    fn isl_ctx_alloc() -> *mut IslCtx;
    fn isl_ctx_free(ctx: *mut IslCtx);
    fn isl_ctx_last_error_msg(ctx: *mut IslCtx) -> *const c_char;
    fn isl_ctx_reset_error(ctx: *mut IslCtx);
    fn isl_options_set_on_error(ctx: *mut IslCtx, val: c_int) -> c_int;
    fn isl_set_read_from_str(ctx: *mut IslCtx, s: *const c_char) -> *mut IslSet;
    fn isl_set_copy(set: *mut IslSet) -> *mut IslSet;
    fn isl_set_to_str(set: *const IslSet) -> *mut c_char;
    fn isl_set_free(set: *mut IslSet) -> *mut IslSet;
}

fn ctx_ptr(handle: RawHandle) -> *mut IslCtx {
    handle.get() as usize as *mut IslCtx
}

fn set_ptr(handle: RawHandle) -> *mut IslSet {
    handle.get() as usize as *mut IslSet
}

fn to_handle<T>(ptr: *mut T) -> RawHandle {
    RawHandle::new(ptr as usize as u64)
}

/// Engine backed by the linked native library.
#[derive(Debug)]
pub struct NativeEngine {
    version: String,
}

impl NativeEngine {
    /// Resolve the library and record its version.
    pub fn load() -> IslResult<Self> {
        let ptr = unsafe { isl_version() };
        if ptr.is_null() {
            return Err(IslError::LibraryLoad("isl_version returned NULL".to_string()));
        }
        let version = unsafe { CStr::from_ptr(ptr) }
            .to_string_lossy()
            .trim()
            .to_string();
        Ok(Self { version })
    }
}

impl Engine for NativeEngine {
    fn name(&self) -> &'static str {
        "isl"
    }

    fn version(&self) -> String {
        self.version.clone()
    }

    fn context_create(&self) -> RawHandle {
        let ctx = unsafe { isl_ctx_alloc() };
        if !ctx.is_null() {
            unsafe { isl_options_set_on_error(ctx, ISL_ON_ERROR_CONTINUE) };
        }
        to_handle(ctx)
    }

    fn context_release(&self, ctx: RawHandle) {
        unsafe { isl_ctx_free(ctx_ptr(ctx)) };
    }

    fn set_parse(&self, ctx: RawHandle, text: &str) -> IslResult<RawHandle> {
        let text = CString::new(text).map_err(|_| IslError::InvalidArgument {
            param: "text",
            reason: "contains an interior NUL byte".to_string(),
        })?;
        let ctx = ctx_ptr(ctx);
        let set = unsafe { isl_set_read_from_str(ctx, text.as_ptr()) };
        if !set.is_null() {
            return Ok(to_handle(set));
        }
        let msg = unsafe { isl_ctx_last_error_msg(ctx) };
        let message = if msg.is_null() {
            "unknown parse error".to_string()
        } else {
            unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
        };
        unsafe { isl_ctx_reset_error(ctx) };
        Err(IslError::Parse(message))
    }

    fn set_copy(&self, set: RawHandle) -> RawHandle {
        to_handle(unsafe { isl_set_copy(set_ptr(set)) })
    }

    fn set_to_text(&self, set: RawHandle) -> IslResult<String> {
        let ptr = unsafe { isl_set_to_str(set_ptr(set)) };
        if ptr.is_null() {
            return Err(IslError::Engine("isl_set_to_str returned NULL".to_string()));
        }
        let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        unsafe { libc::free(ptr.cast()) };
        Ok(text)
    }

    fn set_release(&self, set: RawHandle) {
        unsafe { isl_set_free(set_ptr(set)) };
    }
}
