use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use catsync_types::{OwnerId, Partition, PartitionId, RecordId};
use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::record::{Document, Filter, Record, Scope, ID_FIELD};
use crate::traits::{PartitionDirectory, RecordStore};

/// Server-owned fields; caller-supplied values are discarded.
const SERVER_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

#[derive(Default)]
struct Inner {
    partitions: Vec<Partition>,
    records: HashMap<Scope, Vec<Record>>,
    read_only: HashSet<PartitionId>,
}

impl Inner {
    fn ensure_partition(&self, id: &PartitionId) -> StoreResult<()> {
        if self.partitions.iter().any(|p| &p.id == id) {
            Ok(())
        } else {
            Err(StoreError::UnknownPartition(id.clone()))
        }
    }

    fn ensure_writable(&self, id: &PartitionId) -> StoreResult<()> {
        self.ensure_partition(id)?;
        if self.read_only.contains(id) {
            return Err(StoreError::ReadOnly(id.clone()));
        }
        Ok(())
    }
}

/// In-memory, HashMap-based record store and partition directory.
///
/// Intended for tests, fixtures and embedding. Records live behind a
/// `RwLock` and are cloned on read. Ids are UUID v7 strings.
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    /// Create a new empty store with no partitions.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a partition. Re-registering an id replaces its metadata.
    pub fn add_partition(&self, partition: Partition) {
        let mut inner = self.inner.write().expect("lock poisoned");
        match inner.partitions.iter_mut().find(|p| p.id == partition.id) {
            Some(existing) => *existing = partition,
            None => inner.partitions.push(partition),
        }
    }

    /// Refuse (or allow again) writes to a partition.
    pub fn set_read_only(&self, partition: &PartitionId, read_only: bool) {
        let mut inner = self.inner.write().expect("lock poisoned");
        if read_only {
            inner.read_only.insert(partition.clone());
        } else {
            inner.read_only.remove(partition);
        }
    }

    /// Seed a record, bypassing read-only flags and keeping any timestamps
    /// already present in `data`. A string `"id"` in `data` is used as the
    /// record id; otherwise one is generated.
    pub fn insert(&self, scope: &Scope, mut data: Document) -> StoreResult<RecordId> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.ensure_partition(&scope.partition)?;
        let id = match data.remove(ID_FIELD) {
            Some(Value::String(s)) if !s.trim().is_empty() => RecordId::new(s),
            _ => new_record_id(),
        };
        inner
            .records
            .entry(scope.clone())
            .or_default()
            .push(Record {
                id: id.clone(),
                data,
            });
        Ok(id)
    }

    /// All records of a scope in insertion order.
    pub fn records(&self, scope: &Scope) -> Vec<Record> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.records.get(scope).cloned().unwrap_or_default()
    }

    /// Number of records in a scope.
    pub fn count(&self, scope: &Scope) -> usize {
        let inner = self.inner.read().expect("lock poisoned");
        inner.records.get(scope).map_or(0, Vec::len)
    }

    /// Every registered partition, in registration order.
    pub fn all_partitions(&self) -> Vec<Partition> {
        self.inner.read().expect("lock poisoned").partitions.clone()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

fn new_record_id() -> RecordId {
    RecordId::new(uuid::Uuid::now_v7().to_string())
}

fn strip_server_fields(data: &mut Document) {
    data.remove(ID_FIELD);
    for field in SERVER_FIELDS {
        data.remove(field);
    }
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query(&self, scope: &Scope, filters: &[Filter]) -> StoreResult<Vec<Record>> {
        let inner = self.inner.read().expect("lock poisoned");
        inner.ensure_partition(&scope.partition)?;
        let hits: Vec<Record> = inner
            .records
            .get(scope)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filters.iter().all(|f| f.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!(%scope, filters = filters.len(), hits = hits.len(), "query");
        Ok(hits)
    }

    async fn create(&self, scope: &Scope, mut data: Document) -> StoreResult<RecordId> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.ensure_writable(&scope.partition)?;
        strip_server_fields(&mut data);
        let now = now_value();
        data.insert("createdAt".into(), now.clone());
        data.insert("updatedAt".into(), now);

        let id = new_record_id();
        inner
            .records
            .entry(scope.clone())
            .or_default()
            .push(Record {
                id: id.clone(),
                data,
            });
        debug!(%scope, %id, "created record");
        Ok(id)
    }

    async fn update(&self, scope: &Scope, id: &RecordId, mut partial: Document) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.ensure_writable(&scope.partition)?;
        let record = inner
            .records
            .get_mut(scope)
            .and_then(|records| records.iter_mut().find(|r| &r.id == id))
            .ok_or_else(|| StoreError::NotFound {
                scope: scope.clone(),
                id: id.clone(),
            })?;

        strip_server_fields(&mut partial);
        record.data.extend(partial);
        record.data.insert("updatedAt".into(), now_value());
        debug!(%scope, %id, "updated record");
        Ok(())
    }
}

#[async_trait]
impl PartitionDirectory for InMemoryRecordStore {
    async fn partitions_of(&self, owner: &OwnerId) -> StoreResult<Vec<Partition>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner
            .partitions
            .iter()
            .filter(|p| &p.owner == owner)
            .cloned()
            .collect())
    }

    async fn partition(&self, id: &PartitionId) -> StoreResult<Option<Partition>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.partitions.iter().find(|p| &p.id == id).cloned())
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("lock poisoned");
        let records: usize = inner.records.values().map(Vec::len).sum();
        f.debug_struct("InMemoryRecordStore")
            .field("partitions", &inner.partitions.len())
            .field("records", &records)
            .finish()
    }
}
