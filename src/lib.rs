//! Context-scoped handle lifecycle for integer set engines, with C FFI bindings.
//!
//! Sets of integer points described by parametric affine constraints live in
//! an engine (the system integer set library with the `isl` feature, a
//! built-in engine otherwise). This crate owns the handles to them: every set
//! belongs to one [`Context`], is either owned or borrowed, and is released
//! exactly once.
//!
//! ```
//! use islcore::Context;
//!
//! let ctx = Context::create()?;
//! let set = ctx.read_set("{ [i] : 0 <= i <= 10 }")?;
//! assert!(set.is_owned());
//! set.close();
//! ctx.close();
//! assert!(ctx.read_set("{ [i] }").is_err());
//! # Ok::<(), islcore::IslError>(())
//! ```
//!
//! # Thread Safety
//!
//! Contexts and sets guard their handles with their own locks so that
//! `close` racing with other calls fails with a closed error instead of
//! reaching the engine with a released handle. They are not meant as shared
//! concurrent structures; confine each context to one thread or coordinate
//! externally.
//!
//! # Memory Management
//!
//! - Contexts from `islcore_context_create` must be freed with `islcore_context_free`
//! - Sets from the set constructors must be freed with `islcore_set_free`
//! - `*_close` functions are idempotent and leave the handle valid until freed
//! - Strings returned by functions must be freed with `islcore_string_free`
//! - Error messages must be freed with `islcore_error_free`
//!
//! # Feature Flags
//!
//! - `isl`: link the system integer set library and use it as the default
//!   engine (set `ISL_LIB_DIR` for a non-standard location)

mod context;
pub mod engine;
mod error;
mod handle;
pub mod library;
mod lifecycle;
pub mod logging;
mod object;
mod resource;
mod set;
mod state;
mod util;

pub use context::{Context, ContextStats};
pub use engine::{BuiltinEngine, Engine};
pub use error::{IslError, IslErrorCode, IslFfiError, IslResult, islcore_error_free};
pub use handle::{IslContextHandle, IslSetHandle};
pub use lifecycle::{
    islcore_context_close, islcore_context_create, islcore_context_free, islcore_context_read_set,
    islcore_set_borrow, islcore_set_close, islcore_set_copy, islcore_set_free, islcore_set_is_owned,
    islcore_set_raw, islcore_set_read_from, islcore_set_to_str,
};
pub use logging::{LoggingConfig, init_logging, islcore_init_logging};
pub use object::{ManagedObject, ObjectKind};
pub use resource::{Ownership, RawHandle};
pub use set::{Set, SetKind};
pub use state::{IslContextStats, islcore_context_stats};
pub use util::islcore_string_free;

use std::os::raw::c_char;

/// Library version string.
///
/// # Returns
///
/// Static string containing the version (e.g., "0.1.0").
/// Do not free this string.
#[unsafe(no_mangle)]
pub extern "C" fn islcore_version() -> *const c_char {
    // Include null terminator in the static string
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Feature flags bitmask.
///
/// # Returns
///
/// Bitmask indicating which features are compiled in:
/// - Bit 0 (0x01): `isl` - system integer set library linked
///
/// # Example
///
/// ```c
/// uint32_t features = islcore_features();
/// if (features & 0x01) { /* native engine */ }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn islcore_features() -> u32 {
    let mut flags = 0u32;

    #[cfg(feature = "isl")]
    {
        flags |= 1 << 0;
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    #[test]
    fn test_version() {
        let version = islcore_version();
        assert!(!version.is_null());
        let version_str = unsafe { CStr::from_ptr(version) };
        assert_eq!(version_str.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_features() {
        let features = islcore_features();
        #[cfg(feature = "isl")]
        assert!(features & 0x01 != 0);
        #[cfg(not(feature = "isl"))]
        assert_eq!(features, 0);
    }

    #[test]
    fn test_read_set_and_close_scenario() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };
        assert!(!ctx.is_null());
        assert_eq!(error.code, IslErrorCode::Ok);

        let text = CString::new("{ [i] : 0 <= i <= 10 }").unwrap();
        let set = unsafe { islcore_context_read_set(ctx, text.as_ptr(), &mut error) };
        assert!(!set.is_null());
        assert_eq!(error.code, IslErrorCode::Ok);
        assert_eq!(unsafe { islcore_set_is_owned(set) }, 1);
        assert_ne!(unsafe { islcore_set_raw(set, &mut error) }, 0);

        unsafe { islcore_set_close(set) };
        unsafe { islcore_context_close(ctx) };

        let mut stats = IslContextStats::default();
        assert_eq!(unsafe { islcore_context_stats(ctx, &mut stats, &mut error) }, 1);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.live_objects, 0);

        let again = unsafe { islcore_context_read_set(ctx, text.as_ptr(), &mut error) };
        assert!(again.is_null());
        assert_eq!(error.code, IslErrorCode::ContextClosed);
        let msg = unsafe { CStr::from_ptr(error.message) }.to_str().unwrap();
        assert_eq!(msg, "ISL context is closed");
        unsafe { islcore_error_free(&mut error) };

        unsafe { islcore_set_free(set) };
        unsafe { islcore_context_free(ctx) };
    }

    #[test]
    fn test_parse_error_code() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };

        let text = CString::new("{ [i] : 0 <= i <= }").unwrap();
        let set = unsafe { islcore_set_read_from(ctx, text.as_ptr(), &mut error) };
        assert!(set.is_null());
        assert_eq!(error.code, IslErrorCode::Parse);
        assert!(!error.message.is_null());
        unsafe { islcore_error_free(&mut error) };

        unsafe { islcore_context_free(ctx) };
    }

    #[test]
    fn test_free_context_before_sets() {
        let mut error = IslFfiError::ok();
        let ctx = unsafe { islcore_context_create(&mut error) };
        let text = CString::new("[N] -> { [i, j] : 0 <= i < N and 0 <= j < i }").unwrap();
        let set = unsafe { islcore_context_read_set(ctx, text.as_ptr(), &mut error) };
        assert!(!set.is_null());

        unsafe { islcore_context_free(ctx) };

        // the set keeps its engine context alive
        let s = unsafe { islcore_set_to_str(set, &mut error) };
        assert!(!s.is_null());
        assert_eq!(error.code, IslErrorCode::Ok);
        unsafe { islcore_string_free(s) };
        unsafe { islcore_set_free(set) };
    }

    #[test]
    fn test_context_stats_null_arguments() {
        let mut error = IslFfiError::ok();
        let mut stats = IslContextStats::default();
        let result = unsafe { islcore_context_stats(std::ptr::null(), &mut stats, &mut error) };
        assert_eq!(result, 0);
        assert_eq!(error.code, IslErrorCode::InvalidHandle);
        unsafe { islcore_error_free(&mut error) };

        let ctx = unsafe { islcore_context_create(&mut error) };
        let result = unsafe { islcore_context_stats(ctx, std::ptr::null_mut(), &mut error) };
        assert_eq!(result, 0);
        assert_eq!(error.code, IslErrorCode::NullPointer);
        unsafe { islcore_error_free(&mut error) };
        unsafe { islcore_context_free(ctx) };
    }
}
