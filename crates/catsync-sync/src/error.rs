use catsync_types::{OwnerId, PartitionId, RecordId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A category or supplier could not be looked up or created.
    #[error("{kind} \"{name}\" could not be provisioned: {reason}")]
    DependencyProvisionFailed {
        kind: &'static str,
        name: String,
        reason: String,
    },

    /// The create/update of the catalog entry itself failed.
    #[error("write to partition {partition} failed: {reason}")]
    PartitionWriteFailed { partition: PartitionId, reason: String },

    #[error("source entry has no record id")]
    SourceWithoutId,

    #[error("catalog entry {id} not found in partition {partition}")]
    EntryNotFound { partition: PartitionId, id: RecordId },

    #[error("partition {partition} is not owned by {owner}")]
    PartitionNotOwned { partition: PartitionId, owner: OwnerId },

    #[error("a sync pass for entry {id} in partition {partition} is already running")]
    AlreadyRunning { partition: PartitionId, id: RecordId },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] catsync_store::StoreError),

    #[error("confirmation error: {0}")]
    Gate(#[from] catsync_gate::GateError),

    #[error("merge error: {0}")]
    Merge(#[from] catsync_merge::MergeError),
}

pub type SyncResult<T> = Result<T, SyncError>;
