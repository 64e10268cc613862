//! ISL contexts.
//!
//! A [`Context`] owns one engine instance. Every managed object created in it
//! keeps the context's shared state alive and is counted as a live object.
//! Closing the context forbids further use at once, but the engine instance
//! is released only after the last live object has been closed, so no object
//! ever refers into a released context.

use crate::engine::Engine;
use crate::error::{IslError, IslResult};
use crate::library;
use crate::object::{ManagedObject, ObjectKind};
use crate::resource::{Ownership, RawHandle};
use crate::set::Set;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct ContextState {
    handle: RawHandle,
    closed: bool,
    live_objects: usize,
}

impl ContextState {
    fn ensure_open(&self) -> IslResult<()> {
        if self.closed {
            return Err(IslError::ContextClosed);
        }
        Ok(())
    }
}

/// Point-in-time view of a context's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextStats {
    /// `close()` has been called.
    pub closed: bool,
    /// The engine instance has been released.
    pub released: bool,
    /// Derived objects not yet closed.
    pub live_objects: usize,
}

/// State shared between a context and the objects derived from it.
pub(crate) struct ContextInner {
    engine: Arc<dyn Engine>,
    state: Mutex<ContextState>,
}

impl ContextInner {
    /// Run one engine call under the context lock. Engine instances are
    /// single threaded, so calls on handles of one context never overlap.
    pub(crate) fn call<R>(&self, f: impl FnOnce(&dyn Engine) -> R) -> R {
        let _state = self.state.lock();
        f(self.engine.as_ref())
    }

    fn handle(&self) -> IslResult<RawHandle> {
        let state = self.state.lock();
        state.ensure_open()?;
        Ok(state.handle)
    }

    /// Run `derive` against the open context handle and wrap its result as a
    /// new owned object. The open-check and the engine call happen under one
    /// lock acquisition, so they cannot interleave with `close`.
    pub(crate) fn derive<K: ObjectKind>(
        self: &Arc<Self>,
        derive: impl FnOnce(&dyn Engine, RawHandle) -> IslResult<RawHandle>,
    ) -> IslResult<ManagedObject<K>> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        let raw = derive(self.engine.as_ref(), state.handle)?;
        if raw.is_null() {
            return Err(IslError::NullHandle { kind: K::NAME });
        }
        state.live_objects += 1;
        drop(state);
        Ok(ManagedObject::attached(Arc::clone(self), raw, Ownership::Owned))
    }

    /// Register an object created from an existing handle.
    pub(crate) fn attach(&self) -> IslResult<()> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.live_objects += 1;
        Ok(())
    }

    /// Called exactly once by every attached object when it is closed.
    /// `release` frees the object's own handle first, under the same lock.
    pub(crate) fn detach(&self, release: impl FnOnce(&dyn Engine)) {
        let mut state = self.state.lock();
        release(self.engine.as_ref());
        debug_assert!(state.live_objects > 0, "detach without matching attach");
        state.live_objects = state.live_objects.saturating_sub(1);
        if state.closed && state.live_objects == 0 {
            self.release_native(&mut state);
        }
    }

    fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        if state.live_objects == 0 {
            self.release_native(&mut state);
        } else {
            tracing::debug!(
                context = ?state.handle,
                live_objects = state.live_objects,
                "context closed, release deferred until dependent objects are closed"
            );
        }
    }

    fn release_native(&self, state: &mut ContextState) {
        let handle = state.handle.take();
        if !handle.is_null() {
            self.engine.context_release(handle);
            tracing::debug!(context = ?handle, "context released");
        }
    }
}

/// An isolated engine instance and the root owner of the sets created in it.
///
/// The internal lock makes `close` racing with other calls fail cleanly with
/// [`IslError::ContextClosed`]; it does not make a context a general purpose
/// concurrent structure. Confine a context to one thread or coordinate access
/// externally.
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// Load the engine library if needed and allocate a new context.
    pub fn create() -> IslResult<Self> {
        let engine = library::load()?;
        Self::with_engine(engine)
    }

    /// Allocate a new context on an explicit engine.
    pub fn with_engine(engine: Arc<dyn Engine>) -> IslResult<Self> {
        let handle = engine.context_create();
        if handle.is_null() {
            return Err(IslError::AllocationFailed);
        }
        tracing::debug!(engine = engine.name(), context = ?handle, "context created");
        Ok(Self {
            inner: Arc::new(ContextInner {
                engine,
                state: Mutex::new(ContextState {
                    handle,
                    closed: false,
                    live_objects: 0,
                }),
            }),
        })
    }

    /// Parse `text` into a new set owned by this context.
    pub fn read_set(&self, text: &str) -> IslResult<Set> {
        Set::read_from(self, text)
    }

    /// Current engine handle. Fails once the context is closed.
    pub fn handle(&self) -> IslResult<RawHandle> {
        self.inner.handle()
    }

    /// Close the context. Idempotent.
    pub fn close(&self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Objects derived from this context that have not been closed yet.
    pub fn live_objects(&self) -> usize {
        self.inner.state.lock().live_objects
    }

    pub fn stats(&self) -> ContextStats {
        let state = self.inner.state.lock();
        ContextStats {
            closed: state.closed,
            released: state.handle.is_null(),
            live_objects: state.live_objects,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.inner.engine.name()
    }

    pub(crate) fn inner(&self) -> &Arc<ContextInner> {
        &self.inner
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Context")
            .field("engine", &self.inner.engine.name())
            .field("handle", &state.handle)
            .field("closed", &state.closed)
            .field("live_objects", &state.live_objects)
            .finish()
    }
}
