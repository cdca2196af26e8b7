use catsync_store::{Filter, RecordStore, RecordStoreExt, Scope};
use catsync_types::{Category, PartitionId, RecordId, Supplier};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// A dependent record that exists in the target partition after provisioning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provisioned {
    pub id: RecordId,
    /// Name as stored in the target partition.
    pub name: String,
    /// `true` when the record was created by this call.
    pub created: bool,
}

/// Ensures categories and suppliers referenced by an entry exist in a target
/// partition, creating copies on demand.
///
/// Every call queries before creating, so repeated calls never produce
/// duplicates.
pub struct Provisioner<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> Provisioner<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Find a category with exactly the same name, or create one.
    pub async fn ensure_category(&self, source: &Category, partition: &PartitionId) -> SyncResult<Provisioned> {
        self.try_ensure_category(source, partition)
            .await
            .map_err(|e| SyncError::DependencyProvisionFailed {
                kind: "category",
                name: source.name.clone(),
                reason: e.to_string(),
            })
    }

    async fn try_ensure_category(&self, source: &Category, partition: &PartitionId) -> SyncResult<Provisioned> {
        let scope = Scope::categories(partition);
        let existing: Vec<Category> = self
            .store
            .query_as(&scope, &[Filter::eq("name", source.name.as_str())])
            .await?;
        if let Some(found) = existing.into_iter().find_map(|c| c.id.map(|id| (id, c.name))) {
            debug!(%partition, category = %source.name, "category exists");
            return Ok(Provisioned {
                id: found.0,
                name: found.1,
                created: false,
            });
        }

        let id = self.store.create_from(&scope, &source.provisioned_copy()).await?;
        debug!(%partition, category = %source.name, %id, "category created");
        Ok(Provisioned {
            id,
            name: source.name.clone(),
            created: true,
        })
    }

    /// Find a supplier by exact name, then case-insensitively, or create one
    /// carrying the source's descriptive fields.
    pub async fn ensure_supplier(&self, source: &Supplier, partition: &PartitionId) -> SyncResult<Provisioned> {
        self.try_ensure_supplier(source, partition)
            .await
            .map_err(|e| SyncError::DependencyProvisionFailed {
                kind: "supplier",
                name: source.name.clone(),
                reason: e.to_string(),
            })
    }

    async fn try_ensure_supplier(&self, source: &Supplier, partition: &PartitionId) -> SyncResult<Provisioned> {
        let scope = Scope::suppliers(partition);
        let exact: Vec<Supplier> = self
            .store
            .query_as(&scope, &[Filter::eq("name", source.name.as_str())])
            .await?;
        let found = match exact.into_iter().find(|s| s.id.is_some()) {
            Some(s) => Some(s),
            None => {
                let wanted = source.name.to_lowercase();
                let all: Vec<Supplier> = self.store.query_as(&scope, &[]).await?;
                all.into_iter()
                    .find(|s| s.id.is_some() && s.name.to_lowercase() == wanted)
            }
        };

        if let Some(Supplier { id: Some(id), name, .. }) = found {
            debug!(%partition, supplier = %name, "supplier exists");
            return Ok(Provisioned {
                id,
                name,
                created: false,
            });
        }

        let id = self.store.create_from(&scope, &source.provisioned_copy()).await?;
        debug!(%partition, supplier = %source.name, %id, "supplier created");
        Ok(Provisioned {
            id,
            name: source.name.clone(),
            created: true,
        })
    }
}
