//! In-memory store.

use crate::{PersistentStore, StoreResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`PersistentStore`] backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored values across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert((namespace.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}
