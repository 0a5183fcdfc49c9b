//! Typed pending writes.

use core::str::FromStr;

use brickerp_core::{DomainError, OperationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::{BackendError, RemoteBackend};

/// JSON object carried by create/update operations.
pub type Record = Map<String, Value>;

/// Name of a backend table (`products`, `sales`, `invoices`, ...).
///
/// Lowercase ASCII letters, digits and underscores; must start with a letter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Table(String);

impl Table {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(DomainError::validation(format!("invalid table name '{name}'")));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Table {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Table {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Table> for String {
    fn from(value: Table) -> Self {
        value.0
    }
}

/// A write that could not be applied immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingOperation {
    CreateRecord { table: Table, record: Record },
    UpdateRecord { table: Table, id: String, changes: Record },
    DeleteRecord { table: Table, id: String },
}

impl PendingOperation {
    pub fn table(&self) -> &Table {
        match self {
            PendingOperation::CreateRecord { table, .. }
            | PendingOperation::UpdateRecord { table, .. }
            | PendingOperation::DeleteRecord { table, .. } => table,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PendingOperation::CreateRecord { .. } => "create_record",
            PendingOperation::UpdateRecord { .. } => "update_record",
            PendingOperation::DeleteRecord { .. } => "delete_record",
        }
    }

    /// Identifier of the affected record, if known.
    ///
    /// Creates only carry one when the record itself has a string `id` field.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            PendingOperation::CreateRecord { record, .. } => {
                record.get("id").and_then(Value::as_str)
            }
            PendingOperation::UpdateRecord { id, .. } | PendingOperation::DeleteRecord { id, .. } => {
                Some(id.as_str())
            }
        }
    }

    /// Apply this operation against the backend.
    pub async fn replay(&self, backend: &dyn RemoteBackend) -> Result<(), BackendError> {
        match self {
            PendingOperation::CreateRecord { table, record } => backend.insert(table, record).await,
            PendingOperation::UpdateRecord { table, id, changes } => {
                backend.update(table, id, changes).await
            }
            PendingOperation::DeleteRecord { table, id } => backend.delete(table, id).await,
        }
    }
}

/// A pending operation as held in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub id: OperationId,
    pub operation: PendingOperation,
    pub enqueued_at: DateTime<Utc>,
}

impl QueuedOperation {
    pub fn new(operation: PendingOperation, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            id: OperationId::new(),
            operation,
            enqueued_at,
        }
    }
}
