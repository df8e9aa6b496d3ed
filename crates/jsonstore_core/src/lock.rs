//! Per-collection write locks.
//!
//! # Responsibility
//! - Hand out one shared mutex per collection name.
//!
//! # Invariants
//! - At most one lock is ever created for a given name; lookup and insert
//!   happen inside one critical section of the registry mutex.
//! - Entries are never evicted for the registry's lifetime.
//! - Locks are process-local; they do not coordinate separate processes.
//! - Names are compared byte for byte. On a case-insensitive filesystem
//!   `Users` and `users` get separate locks for the same directory, so
//!   callers there must spell each collection name consistently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to one collection's lock.
pub type CollectionLock = Arc<Mutex<()>>;

/// Lazily populated map from collection name to its lock.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `collection`, creating it on first use.
    pub fn get_or_create(&self, collection: &str) -> CollectionLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = locks.get(collection) {
            return Arc::clone(existing);
        }

        let created = Arc::new(Mutex::new(()));
        locks.insert(collection.to_string(), Arc::clone(&created));
        created
    }

    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Acquires a collection lock, recovering from poisoning.
///
/// The guarded value is `()`, so a panic in another holder leaves nothing
/// inconsistent behind.
pub fn acquire(lock: &CollectionLock) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
