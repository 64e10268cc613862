//! The engine call surface.
//!
//! Contexts and managed objects never do set computation themselves; every
//! operation ends in one call on an [`Engine`]. Two implementations exist:
//!
//! - [`BuiltinEngine`]: pure Rust handle arena with a parser for the textual
//!   set notation. Always available.
//! - `NativeEngine` (feature `isl`): the system integer set library.
//!
//! Handles passed into an engine are owned by the caller's bookkeeping. The
//! engine does not have to tolerate double release; contexts and objects
//! guarantee each handle is released once.

mod builtin;
#[cfg(feature = "isl")]
mod native;
pub(crate) mod parse;
#[cfg(test)]
pub(crate) mod testing;

pub use builtin::BuiltinEngine;
#[cfg(feature = "isl")]
pub use native::NativeEngine;

use crate::error::IslResult;
use crate::resource::RawHandle;

/// Operations a context-scoped integer set engine must provide.
pub trait Engine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Engine version string.
    fn version(&self) -> String;

    /// Allocate a new isolated context. Returns `RawHandle::NULL` on failure.
    fn context_create(&self) -> RawHandle;

    /// Release a context previously returned by `context_create`.
    fn context_release(&self, ctx: RawHandle);

    /// Parse `text` into a new set owned by the caller.
    fn set_parse(&self, ctx: RawHandle, text: &str) -> IslResult<RawHandle>;

    /// New owned handle to the same set. `RawHandle::NULL` on failure.
    fn set_copy(&self, set: RawHandle) -> RawHandle;

    /// Canonical textual form of a set.
    fn set_to_text(&self, set: RawHandle) -> IslResult<String>;

    /// Release a set handle.
    fn set_release(&self, set: RawHandle);
}
