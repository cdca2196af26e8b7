use async_trait::async_trait;
use catsync_types::{OwnerId, Partition, PartitionId, RecordId};

use crate::error::StoreResult;
use crate::record::{Document, Filter, Record, Scope};

/// Partition-scoped document store.
///
/// All implementations must satisfy these invariants:
/// - Record ids are assigned on `create` and never change.
/// - `query` applies every filter (logical AND); no filters means the whole scope.
/// - `query` returns records in a stable order (insertion order for the
///   in-memory backend).
/// - `update` merges the partial document into the stored one.
/// - Server timestamps (`createdAt`, `updatedAt`) are owned by the store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Query records matching all filters.
    async fn query(&self, scope: &Scope, filters: &[Filter]) -> StoreResult<Vec<Record>>;

    /// Create a record and return its new id.
    async fn create(&self, scope: &Scope, data: Document) -> StoreResult<RecordId>;

    /// Merge `partial` into an existing record.
    ///
    /// Returns `Err(StoreError::NotFound)` if the record does not exist.
    async fn update(&self, scope: &Scope, id: &RecordId, partial: Document) -> StoreResult<()>;

    /// Fetch a single record by id.
    ///
    /// Default implementation queries on the `id` field.
    async fn get(&self, scope: &Scope, id: &RecordId) -> StoreResult<Option<Record>> {
        let mut hits = self
            .query(scope, &[Filter::eq("id", id.as_str())])
            .await?;
        Ok(if hits.is_empty() { None } else { Some(hits.swap_remove(0)) })
    }
}

/// Lookup of the partitions belonging to an owner.
#[async_trait]
pub trait PartitionDirectory: Send + Sync {
    /// All partitions owned by `owner`, in registration order.
    async fn partitions_of(&self, owner: &OwnerId) -> StoreResult<Vec<Partition>>;

    /// A single partition by id.
    async fn partition(&self, id: &PartitionId) -> StoreResult<Option<Partition>>;
}
