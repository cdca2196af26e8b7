use catsync_types::{PartitionId, RecordId};

use crate::record::Scope;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record to update does not exist in the scope.
    #[error("record not found: {scope}/{id}")]
    NotFound { scope: Scope, id: RecordId },

    /// The partition is not registered with the store.
    #[error("unknown partition: {0}")]
    UnknownPartition(PartitionId),

    /// Writes to the partition are refused (permissions, maintenance).
    #[error("partition is read-only: {0}")]
    ReadOnly(PartitionId),

    /// The document is not a JSON object or cannot be decoded.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failure reported by a remote backend (network, validation).
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
