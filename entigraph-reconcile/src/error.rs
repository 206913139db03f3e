//! Error types for graph operations.

use entigraph_storage::StorageError;
use entigraph_types::EntityId;
use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that abort a reconcile, attach or duplicate call.
///
/// None of them is retried here. Mutations already applied to in-memory
/// entities stay applied; rolling back is the caller's transaction's job.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An identity token in a value map could not be parsed.
    #[error("invalid identity for {type_name}: {value}")]
    InvalidIdentity { type_name: String, value: String },

    /// A version token in a value map could not be parsed.
    #[error("invalid version for {type_name}: {value}")]
    InvalidVersion { type_name: String, value: String },

    /// A referenced identity does not resolve to a persisted entity.
    #[error("entity not found: {type_name}#{id}")]
    EntityNotFound { type_name: String, id: EntityId },

    /// The supplied version no longer matches the persisted one, or the
    /// entity was deleted in the meantime.
    #[error("stale entity: {type_name}#{id}")]
    StaleEntity { type_name: String, id: EntityId },

    /// No descriptor is registered for the type.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// The persistence boundary failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl GraphError {
    /// `true` for optimistic-concurrency failures, whichever layer caught them.
    ///
    /// Callers that want to retry must re-fetch current state and resubmit.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::StaleEntity { .. } | Self::Storage(StorageError::Stale(_))
        )
    }
}
