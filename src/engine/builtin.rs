//! Pure Rust engine: a handle arena over parsed sets.
//!
//! Handles come from one process-wide counter, so they are non-zero, unique
//! across engine instances and never reused.

use super::Engine;
use super::parse::{ParsedSet, parse_set};
use crate::error::{IslError, IslResult};
use crate::resource::RawHandle;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn next_handle() -> RawHandle {
    RawHandle::new(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Default)]
struct ContextSlot {
    live_sets: usize,
}

#[derive(Debug)]
struct SetSlot {
    context: RawHandle,
    set: ParsedSet,
}

#[derive(Debug, Default)]
struct Arena {
    contexts: HashMap<RawHandle, ContextSlot>,
    sets: HashMap<RawHandle, SetSlot>,
}

impl Arena {
    fn insert_set(&mut self, context: RawHandle, set: ParsedSet) -> RawHandle {
        let handle = next_handle();
        if let Some(slot) = self.contexts.get_mut(&context) {
            slot.live_sets += 1;
        }
        self.sets.insert(handle, SetSlot { context, set });
        handle
    }
}

/// In-process engine used when no native library is linked.
#[derive(Debug, Default)]
pub struct BuiltinEngine {
    arena: Mutex<Arena>,
}

impl BuiltinEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live contexts and sets held by this engine.
    pub fn live_resources(&self) -> (usize, usize) {
        let arena = self.arena.lock();
        (arena.contexts.len(), arena.sets.len())
    }
}

impl Engine for BuiltinEngine {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn version(&self) -> String {
        concat!("islcore-builtin-", env!("CARGO_PKG_VERSION")).to_string()
    }

    fn context_create(&self) -> RawHandle {
        let handle = next_handle();
        self.arena.lock().contexts.insert(handle, ContextSlot::default());
        handle
    }

    fn context_release(&self, ctx: RawHandle) {
        let mut arena = self.arena.lock();
        match arena.contexts.get(&ctx) {
            Some(slot) if slot.live_sets > 0 => {
                tracing::warn!(
                    context = ?ctx,
                    live_sets = slot.live_sets,
                    "context not freed as some objects still reference it"
                );
            }
            Some(_) => {
                arena.contexts.remove(&ctx);
            }
            None => tracing::warn!(context = ?ctx, "release of unknown context"),
        }
    }

    fn set_parse(&self, ctx: RawHandle, text: &str) -> IslResult<RawHandle> {
        let mut arena = self.arena.lock();
        if !arena.contexts.contains_key(&ctx) {
            return Err(IslError::Engine(format!("unknown context {ctx:?}")));
        }
        let set = parse_set(text).map_err(|e| IslError::Parse(e.to_string()))?;
        Ok(arena.insert_set(ctx, set))
    }

    fn set_copy(&self, set: RawHandle) -> RawHandle {
        let mut arena = self.arena.lock();
        let Some(slot) = arena.sets.get(&set) else {
            return RawHandle::NULL;
        };
        let (context, parsed) = (slot.context, slot.set.clone());
        arena.insert_set(context, parsed)
    }

    fn set_to_text(&self, set: RawHandle) -> IslResult<String> {
        self.arena
            .lock()
            .sets
            .get(&set)
            .map(|slot| slot.set.to_text())
            .ok_or_else(|| IslError::Engine(format!("unknown set {set:?}")))
    }

    fn set_release(&self, set: RawHandle) {
        let mut arena = self.arena.lock();
        let Some(slot) = arena.sets.remove(&set) else {
            tracing::warn!(set = ?set, "release of unknown set");
            return;
        };
        if let Some(ctx) = arena.contexts.get_mut(&slot.context) {
            ctx.live_sets -= 1;
        }
    }
}
