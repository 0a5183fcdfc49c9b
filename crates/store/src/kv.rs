//! Key-value store contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;

/// Durable string key-value store.
///
/// Writes are last-writer-wins; implementations provide no transactions
/// across keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T> KeyValueStore for Arc<T>
where
    T: KeyValueStore + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }
}
