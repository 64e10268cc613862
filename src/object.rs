//! Engine-backed values.
//!
//! [`ManagedObject`] carries the protocol shared by every value type: a
//! back-reference to its context, a raw handle guarded by the object's own
//! lock, and an ownership tag fixed at construction. A variant only names
//! itself and supplies its release routine through [`ObjectKind`].

use crate::context::{Context, ContextInner};
use crate::engine::Engine;
use crate::error::{IslError, IslResult};
use crate::resource::{Ownership, RawHandle};
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A kind of engine resource with its own handle namespace.
pub trait ObjectKind: 'static {
    /// Name used in errors and logs.
    const NAME: &'static str;

    /// Release one owned handle of this kind.
    fn release(engine: &dyn Engine, handle: RawHandle);
}

#[derive(Debug)]
struct ObjectState {
    handle: RawHandle,
    closed: bool,
}

/// A resource handle of kind `K`, associated with exactly one context.
pub struct ManagedObject<K: ObjectKind> {
    context: Arc<ContextInner>,
    state: Mutex<ObjectState>,
    ownership: Ownership,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ObjectKind> ManagedObject<K> {
    /// Wrap `handle`, registering the object with `context`.
    ///
    /// A NULL handle is rejected whatever the ownership: it is the engine's
    /// failure sentinel and must have been handled by the caller.
    pub(crate) fn new(
        context: &Arc<ContextInner>,
        handle: RawHandle,
        ownership: Ownership,
    ) -> IslResult<Self> {
        if handle.is_null() {
            return Err(IslError::NullHandle { kind: K::NAME });
        }
        context.attach()?;
        Ok(Self::attached(Arc::clone(context), handle, ownership))
    }

    /// Wrap a non-NULL handle already counted by `context`.
    pub(crate) fn attached(
        context: Arc<ContextInner>,
        handle: RawHandle,
        ownership: Ownership,
    ) -> Self {
        debug_assert!(!handle.is_null());
        tracing::trace!(kind = K::NAME, handle = ?handle, ?ownership, "object created");
        Self {
            context,
            state: Mutex::new(ObjectState {
                handle,
                closed: false,
            }),
            ownership,
            _kind: PhantomData,
        }
    }

    /// Wrap a handle obtained outside this crate.
    ///
    /// # Safety
    ///
    /// `handle` must be a live handle of kind `K` created in `context`'s
    /// engine instance. If `ownership` is `Owned`, nothing else may release
    /// it; if `Borrowed`, its owner must keep it alive until this object is
    /// closed.
    pub unsafe fn from_raw(
        context: &Context,
        handle: RawHandle,
        ownership: Ownership,
    ) -> IslResult<Self> {
        Self::new(context.inner(), handle, ownership)
    }

    /// Current raw handle. Fails once the object is closed.
    ///
    /// The value is only meaningful while the object stays open.
    pub fn handle(&self) -> IslResult<RawHandle> {
        let state = self.state.lock();
        if state.closed {
            return Err(IslError::ObjectClosed { kind: K::NAME });
        }
        Ok(state.handle)
    }

    /// Run `f` with the open handle while holding the object lock, so a
    /// concurrent `close` cannot release the handle mid-call.
    pub(crate) fn with_handle<R>(
        &self,
        f: impl FnOnce(&Arc<ContextInner>, RawHandle) -> IslResult<R>,
    ) -> IslResult<R> {
        let state = self.state.lock();
        if state.closed {
            return Err(IslError::ObjectClosed { kind: K::NAME });
        }
        f(&self.context, state.handle)
    }

    /// Close the object. Idempotent.
    ///
    /// Owned handles are released through `K::release` exactly once; borrowed
    /// handles are only forgotten.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let handle = state.handle.take();
        let owned = self.ownership.is_owned() && !handle.is_null();
        self.context.detach(|engine| {
            if owned {
                K::release(engine, handle);
                tracing::trace!(kind = K::NAME, handle = ?handle, "object released");
            }
        });
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_owned(&self) -> bool {
        self.ownership.is_owned()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<K: ObjectKind> Drop for ManagedObject<K> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<K: ObjectKind> fmt::Debug for ManagedObject<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct(K::NAME)
            .field("handle", &state.handle)
            .field("ownership", &self.ownership)
            .field("closed", &state.closed)
            .finish()
    }
}
