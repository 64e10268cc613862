//! Engine wrapper that records calls, for lifecycle tests.

use super::{BuiltinEngine, Engine};
use crate::error::IslResult;
use crate::resource::RawHandle;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    inner: BuiltinEngine,
    pub fail_create: AtomicBool,
    pub context_releases: AtomicUsize,
    pub set_parses: AtomicUsize,
    pub set_releases: AtomicUsize,
    /// Calls that reached the engine with a NULL handle.
    pub null_handle_calls: AtomicUsize,
    in_flight: AtomicUsize,
    /// Most calls on context-scoped handles seen running at once.
    pub max_in_flight: AtomicUsize,
}

/// Marks one engine call as running until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let engine = Self::default();
        engine.fail_create.store(true, Ordering::SeqCst);
        engine
    }

    pub fn context_releases(&self) -> usize {
        self.context_releases.load(Ordering::SeqCst)
    }

    pub fn set_parses(&self) -> usize {
        self.set_parses.load(Ordering::SeqCst)
    }

    pub fn set_releases(&self) -> usize {
        self.set_releases.load(Ordering::SeqCst)
    }

    pub fn null_handle_calls(&self) -> usize {
        self.null_handle_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn live_resources(&self) -> (usize, usize) {
        self.inner.live_resources()
    }

    fn check(&self, handle: RawHandle) -> InFlight<'_> {
        if handle.is_null() {
            self.null_handle_calls.fetch_add(1, Ordering::SeqCst);
        }
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        // widen the window for overlapping calls
        thread::yield_now();
        InFlight(&self.in_flight)
    }
}

impl Engine for RecordingEngine {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn version(&self) -> String {
        self.inner.version()
    }

    fn context_create(&self) -> RawHandle {
        if self.fail_create.load(Ordering::SeqCst) {
            return RawHandle::NULL;
        }
        self.inner.context_create()
    }

    fn context_release(&self, ctx: RawHandle) {
        let _call = self.check(ctx);
        self.context_releases.fetch_add(1, Ordering::SeqCst);
        self.inner.context_release(ctx);
    }

    fn set_parse(&self, ctx: RawHandle, text: &str) -> IslResult<RawHandle> {
        let _call = self.check(ctx);
        self.set_parses.fetch_add(1, Ordering::SeqCst);
        self.inner.set_parse(ctx, text)
    }

    fn set_copy(&self, set: RawHandle) -> RawHandle {
        let _call = self.check(set);
        self.inner.set_copy(set)
    }

    fn set_to_text(&self, set: RawHandle) -> IslResult<String> {
        let _call = self.check(set);
        self.inner.set_to_text(set)
    }

    fn set_release(&self, set: RawHandle) {
        let _call = self.check(set);
        self.set_releases.fetch_add(1, Ordering::SeqCst);
        self.inner.set_release(set);
    }
}
