use brickerp_store::StorageError;
use thiserror::Error;

use crate::kind::DocumentKind;

/// Failure to issue a document number.
///
/// No number is ever returned alongside one of these: the caller cannot
/// create the document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NumberingError {
    #[error("counter storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// The stored counter is not a non-negative integer.
    #[error("counter for {kind} is corrupted (stored value: {stored:?})")]
    CounterCorrupted { kind: DocumentKind, stored: String },

    #[error("counter for {kind} cannot be incremented any further")]
    CounterExhausted { kind: DocumentKind },
}
