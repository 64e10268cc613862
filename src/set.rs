//! ISL Set - a symbolic integer set parsed from constraint text.
//!
//! ```text
//! { [i] : 0 <= i <= 10 }                       // bounded interval
//! [N] -> { S[i, j] : 0 <= i < N and i <= j < N } // parametric triangle
//! ```

use crate::context::Context;
use crate::engine::Engine;
use crate::error::{IslError, IslResult};
use crate::object::{ManagedObject, ObjectKind};
use crate::resource::RawHandle;

/// Reject text no engine could receive, before any lock is taken.
fn validate_text(text: &str) -> IslResult<()> {
    if text.contains('\0') {
        return Err(IslError::InvalidArgument {
            param: "text",
            reason: "contains an interior NUL byte".to_string(),
        });
    }
    Ok(())
}

/// Marker for set handles.
#[derive(Debug)]
pub enum SetKind {}

impl ObjectKind for SetKind {
    const NAME: &'static str = "set";

    fn release(engine: &dyn Engine, handle: RawHandle) {
        engine.set_release(handle);
    }
}

/// A symbolic integer set owned by, or borrowed within, one context.
///
/// Every engine call on a set, including its release, runs under its
/// context's lock, so sets of one context may be used from several threads.
pub type Set = ManagedObject<SetKind>;

impl ManagedObject<SetKind> {
    /// Parse `text` into a new owned set. Same as [`Context::read_set`].
    ///
    /// The open-check on `context` and the parse happen atomically with
    /// respect to `Context::close`.
    pub fn read_from(context: &Context, text: &str) -> IslResult<Set> {
        validate_text(text)?;
        context.inner().derive(|engine, ctx| engine.set_parse(ctx, text))
    }

    /// Canonical text of the set as printed by the engine.
    pub fn to_text(&self) -> IslResult<String> {
        self.with_handle(|context, set| context.call(|engine| engine.set_to_text(set)))
    }

    /// New owned set referring to the same value.
    pub fn try_clone(&self) -> IslResult<Set> {
        self.with_handle(|context, set| context.derive(|engine, _| Ok(engine.set_copy(set))))
    }
}
