use thiserror::Error;

/// Local storage failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be read or written.
    #[error("local storage unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded for storage.
    #[error("failed to serialize value for '{key}': {reason}")]
    Serialization { key: String, reason: String },

    /// A stored value exists but cannot be decoded.
    #[error("stored value for '{key}' is corrupted: {reason}")]
    Corrupted { key: String, reason: String },
}

impl StorageError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
