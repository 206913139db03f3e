//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Entity not found.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// The entity is in a state the operation cannot accept.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A flush found the row already rewritten by another writer.
    #[error("stale entity: {0}")]
    Stale(String),

    /// Backend failure (connection, SQL, I/O) reported by an implementation.
    #[error("backend error: {0}")]
    Backend(String),
}
