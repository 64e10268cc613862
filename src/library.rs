//! Process-wide engine bootstrap.
//!
//! The first caller of [`load`] initialises the default engine while holding
//! the gate; concurrent callers block until it is recorded and then share it.
//! A failed initialisation records nothing, so the next call retries.

use crate::engine::Engine;
use crate::error::IslResult;
use parking_lot::Mutex;
use std::sync::Arc;

static LIBRARY: Mutex<Option<Arc<dyn Engine>>> = parking_lot::const_mutex(None);

/// Load the default engine once per process and return it.
pub fn load() -> IslResult<Arc<dyn Engine>> {
    let mut slot = LIBRARY.lock();
    if let Some(engine) = slot.as_ref() {
        return Ok(Arc::clone(engine));
    }
    let engine = default_engine()?;
    tracing::info!(engine = engine.name(), version = %engine.version(), "ISL engine loaded");
    *slot = Some(Arc::clone(&engine));
    Ok(engine)
}

/// Whether [`load`] has completed successfully in this process.
pub fn is_loaded() -> bool {
    LIBRARY.lock().is_some()
}

#[cfg(feature = "isl")]
fn default_engine() -> IslResult<Arc<dyn Engine>> {
    Ok(Arc::new(crate::engine::NativeEngine::load()?))
}

#[cfg(not(feature = "isl"))]
fn default_engine() -> IslResult<Arc<dyn Engine>> {
    Ok(Arc::new(crate::engine::BuiltinEngine::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_first_use_shares_one_engine() {
        let handles: Vec<_> = (0..8).map(|_| thread::spawn(|| load().unwrap())).collect();
        let engines: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(is_loaded());
        for engine in &engines[1..] {
            assert!(Arc::ptr_eq(&engines[0], engine));
        }
        assert!(Arc::ptr_eq(&engines[0], &load().unwrap()));
    }
}
