//! State query functions.

use crate::context::ContextStats;
use crate::error::IslFfiError;
use crate::handle::IslContextHandle;
use crate::util::{set_error, set_ok};

/// Context lifecycle statistics.
///
/// All fields are value types that can be safely copied.
#[repr(C)]
#[derive(Debug, Default)]
pub struct IslContextStats {
    /// Whether `islcore_context_close` has been called
    pub closed: u8,
    /// Whether the engine instance has been released
    pub released: u8,
    /// Padding for alignment
    pub _padding: [u8; 6],
    /// Number of sets created in the context and not yet closed
    pub live_objects: u64,
}

impl From<ContextStats> for IslContextStats {
    fn from(s: ContextStats) -> Self {
        Self {
            closed: u8::from(s.closed),
            released: u8::from(s.released),
            _padding: [0; 6],
            live_objects: s.live_objects as u64,
        }
    }
}

/// Get context statistics.
///
/// Works on closed contexts too.
///
/// # Parameters
///
/// - `ctx`: Context handle
/// - `stats`: Out-parameter for statistics (must not be NULL)
/// - `error`: Out-parameter for error information
///
/// # Returns
///
/// 1 on success, 0 on failure.
///
/// # Safety
///
/// - `ctx` must be a live context handle or NULL
/// - `stats` must be a valid pointer
/// - `error` must be a valid pointer or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn islcore_context_stats(
    ctx: *const IslContextHandle,
    stats: *mut IslContextStats,
    error: *mut IslFfiError,
) -> i32 {
    let ctx = match unsafe { IslContextHandle::from_ptr(ctx) } {
        Some(c) => c,
        None => return unsafe { set_error(error, IslFfiError::invalid_handle()) },
    };

    if stats.is_null() {
        return unsafe { set_error(error, IslFfiError::null_pointer("stats")) };
    }

    unsafe { *stats = IslContextStats::from(ctx.as_ref().stats()) };
    unsafe { set_ok(error) };
    1
}
