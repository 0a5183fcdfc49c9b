//! Remote backend contract used to replay queued writes.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::operation::{Record, Table};

/// Why a write could not be applied remotely.
///
/// Every variant is treated as transient by the queue.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Table-addressed request/response API of the remote database.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn insert(&self, table: &Table, record: &Record) -> Result<(), BackendError>;

    async fn update(&self, table: &Table, id: &str, changes: &Record) -> Result<(), BackendError>;

    async fn delete(&self, table: &Table, id: &str) -> Result<(), BackendError>;
}

#[async_trait]
impl<T> RemoteBackend for Arc<T>
where
    T: RemoteBackend + ?Sized,
{
    async fn insert(&self, table: &Table, record: &Record) -> Result<(), BackendError> {
        (**self).insert(table, record).await
    }

    async fn update(&self, table: &Table, id: &str, changes: &Record) -> Result<(), BackendError> {
        (**self).update(table, id, changes).await
    }

    async fn delete(&self, table: &Table, id: &str) -> Result<(), BackendError> {
        (**self).delete(table, id).await
    }
}
