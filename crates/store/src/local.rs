//! Namespaced access to the local store.
//!
//! `save_local` wraps a JSON value together with the moment it was captured;
//! `load_local` hands back only the value. The timestamp is informational:
//! nothing expires.

use std::sync::Arc;

use brickerp_core::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::kv::KeyValueStore;

/// Prefix applied to every key written through `LocalStorage`.
pub const DEFAULT_NAMESPACE: &str = "brickerp:";

/// A value persisted by `save_local`, with its capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord<T> {
    pub value: T,
    pub saved_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct LocalRecordRef<'a, T: ?Sized> {
    value: &'a T,
    saved_at: DateTime<Utc>,
}

/// Handle to the local store, scoped to a key namespace.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct LocalStorage {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl LocalStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            namespace: DEFAULT_NAMESPACE.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Read the raw string stored under `key`.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.store.get(&self.key(key)).await
    }

    /// Write a raw string under `key`.
    pub async fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(key), value).await
    }

    /// Persist `value` under `key` together with the current timestamp.
    pub async fn save_local<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let record = LocalRecordRef {
            value,
            saved_at: self.clock.now(),
        };
        let json = serde_json::to_string(&record).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.set_raw(key, &json).await
    }

    /// Load the value stored by `save_local`, discarding the timestamp.
    pub async fn load_local<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        Ok(self.load_record(key).await?.map(|r| r.value))
    }

    /// Load the value stored by `save_local` along with its capture time.
    pub async fn load_record<T>(&self, key: &str) -> Result<Option<LocalRecord<T>>, StorageError>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };

        let record = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupted {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(record))
    }
}
