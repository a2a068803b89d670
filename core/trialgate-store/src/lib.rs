//! Persistent key/value storage for trialgate.
//!
//! The license engine treats storage as a plain get/set service over string
//! pairs, scoped by an application namespace. Two implementations ship here:
//!
//! - [`FileStore`]: one JSON object per namespace under a root directory,
//!   rewritten atomically on every `set`
//! - [`MemoryStore`]: process-local map, used by tests and dry runs

mod error;
mod file_store;
mod memory_store;

pub use error::{StoreError, StoreResult};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use std::sync::Arc;

/// Durable string storage scoped by namespace.
///
/// Implementations must survive process restarts (except [`MemoryStore`]).
/// No transactional guarantees are required: exactly one process performs the
/// startup check at a time.
pub trait PersistentStore: Send + Sync {
    /// Returns the value stored under `key` in `namespace`, if any.
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key` in `namespace`, replacing any previous value.
    fn set(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()>;
}

impl<T: PersistentStore + ?Sized> PersistentStore for Arc<T> {
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        (**self).get(namespace, key)
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(namespace, key, value)
    }
}
