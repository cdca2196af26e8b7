use std::collections::HashSet;
use std::sync::Mutex;

use catsync_store::{RecordStoreExt, Scope};
use catsync_types::{CatalogEntry, OwnerId, PartitionId, RecordId, UserId};

use crate::config::OwnerPreferences;
use crate::error::{SyncError, SyncResult};
use crate::orchestrator::{SyncEngine, SyncRequest};
use crate::outcome::{RunStatus, SyncReport};
use crate::transcript::Transcript;

type PassKey = (PartitionId, RecordId);

/// Entry points into synchronization: after a save, and on demand.
///
/// At most one pass per `(partition, entry)` runs at a time; a second
/// request while one is in flight fails with [`SyncError::AlreadyRunning`].
pub struct SyncTrigger {
    engine: SyncEngine,
    in_flight: Mutex<HashSet<PassKey>>,
}

struct InFlight<'a> {
    set: &'a Mutex<HashSet<PassKey>>,
    key: PassKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.key);
        }
    }
}

impl SyncTrigger {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Propagate a just-saved entry, if the owner wants that.
    pub async fn on_entry_saved(&self, request: SyncRequest, prefs: &OwnerPreferences) -> SyncResult<SyncReport> {
        if !prefs.propagate_on_save {
            let mut transcript = Transcript::new();
            transcript.info(None, format!("propagation on save is off for {}", request.owner));
            return Ok(SyncReport::empty(
                RunStatus::Disabled,
                request.entry.root_id,
                transcript,
            ));
        }
        self.run(request).await
    }

    /// Re-synchronize a stored entry now, regardless of preferences.
    pub async fn sync_now(
        &self,
        partition: &PartitionId,
        entry_id: &RecordId,
        owner: &OwnerId,
        acting_user: &UserId,
    ) -> SyncResult<SyncReport> {
        let entry: CatalogEntry = self
            .engine
            .store()
            .get_as(&Scope::catalog(partition), entry_id)
            .await?
            .ok_or_else(|| SyncError::EntryNotFound {
                partition: partition.clone(),
                id: entry_id.clone(),
            })?;
        let request = SyncRequest::new(partition.clone(), entry, owner.clone(), acting_user.clone());
        self.run(request).await
    }

    async fn run(&self, request: SyncRequest) -> SyncResult<SyncReport> {
        let id = request.entry.id.clone().ok_or(SyncError::SourceWithoutId)?;
        let _guard = self.claim((request.source_partition.clone(), id))?;
        self.engine.synchronize(request).await
    }

    fn claim(&self, key: PassKey) -> SyncResult<InFlight<'_>> {
        let mut set = self.in_flight.lock().expect("lock poisoned");
        if !set.insert(key.clone()) {
            return Err(SyncError::AlreadyRunning {
                partition: key.0,
                id: key.1,
            });
        }
        Ok(InFlight {
            set: &self.in_flight,
            key,
        })
    }
}
