use catsync_merge::CodeChange;
use catsync_store::{Filter, RecordStore, Scope};
use catsync_types::{CatalogEntry, MatchStrategy, PartitionId};
use tracing::{debug, warn};

use crate::error::SyncResult;

/// An existing copy of the source entry in a target partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetMatch {
    pub entry: CatalogEntry,
    pub strategy: MatchStrategy,
}

/// Decides whether a catalog entry already exists in a target partition.
pub struct IdentityResolver<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Lookups to attempt, in priority order.
    fn attempts(source: &CatalogEntry, codes: &CodeChange) -> Vec<(MatchStrategy, Filter)> {
        let mut attempts = Vec::with_capacity(5);
        if let Some(root) = &source.root_id {
            attempts.push((MatchStrategy::RootId, Filter::eq("rootId", root.as_str())));
        }
        if let Some(code) = codes.original() {
            attempts.push((MatchStrategy::LegacyCode, Filter::eq("reference", code)));
        }
        if !source.name.is_empty() {
            attempts.push((MatchStrategy::Name, Filter::eq("name", source.name.as_str())));
        }
        let trimmed = source.name.trim();
        if !trimmed.is_empty() && trimmed != source.name {
            attempts.push((MatchStrategy::TrimmedName, Filter::eq("name", trimmed)));
        }
        if let Some(code) = codes.fresh() {
            attempts.push((MatchStrategy::NewCode, Filter::eq("reference", code)));
        }
        attempts
    }

    /// Find the target copy of `source`, stopping at the first strategy that
    /// hits. `None` means the entry should be created.
    pub async fn resolve(
        &self,
        source: &CatalogEntry,
        codes: &CodeChange,
        partition: &PartitionId,
    ) -> SyncResult<Option<TargetMatch>> {
        let scope = Scope::catalog(partition);
        for (strategy, filter) in Self::attempts(source, codes) {
            let hits = self.store.query(&scope, &[filter]).await?;
            if hits.len() > 1 {
                debug!(%partition, %strategy, hits = hits.len(), "several candidates; taking the first");
            }
            for record in hits {
                match record.decode::<CatalogEntry>() {
                    Ok(entry) => {
                        debug!(%partition, %strategy, "target resolved");
                        return Ok(Some(TargetMatch { entry, strategy }));
                    }
                    Err(e) => {
                        warn!(%partition, %strategy, id = %record.id, error = %e, "skipping unreadable candidate");
                    }
                }
            }
        }
        debug!(%partition, "no existing copy");
        Ok(None)
    }
}
