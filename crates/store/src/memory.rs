use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::kv::KeyValueStore;

/// In-memory key-value store.
///
/// Intended for tests/dev. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::unavailable("lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::unavailable("lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
