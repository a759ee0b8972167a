use std::sync::{Arc, PoisonError, RwLock};

use crate::pipeline::ParameterEngine;

/// Thread-safe handle publishing immutable engine snapshots.
///
/// Readers take an `Arc` to the current snapshot and run without holding
/// the lock, so validation never waits on other validation. Writers clone
/// the current engine, mutate the clone, and swap it in. Snapshots taken
/// before an update keep seeing the old state.
#[derive(Debug, Default)]
pub struct SharedEngine {
    current: RwLock<Arc<ParameterEngine>>,
}

impl SharedEngine {
    pub fn new(engine: ParameterEngine) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
        }
    }

    /// Consistent view of every registry at this instant.
    pub fn snapshot(&self) -> Arc<ParameterEngine> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a consistent snapshot.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Copy-on-write update. The new snapshot is published only when
    /// `mutate` succeeds; on error the current one stays in place.
    ///
    /// The write lock is held for the whole update so concurrent writers
    /// cannot lose each other's changes. Registration is rare, so this
    /// does not contend with the read path in practice.
    pub fn update<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut ParameterEngine) -> Result<T, E>,
    {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = ParameterEngine::clone(&guard);
        let out = mutate(&mut next)?;
        *guard = Arc::new(next);
        tracing::debug!("Published new engine snapshot");
        Ok(out)
    }
}
