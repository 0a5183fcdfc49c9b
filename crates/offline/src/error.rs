use brickerp_store::StorageError;
use thiserror::Error;

/// Failure of a queue operation.
///
/// Replay failures are not here: they are absorbed by `drain` and the
/// operation stays queued.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("pending operation storage failed: {0}")]
    Storage(#[from] StorageError),
}
