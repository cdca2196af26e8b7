use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use catsync_store::{Document, InMemoryRecordStore, Scope, ID_FIELD};
use catsync_types::{Collection, Partition, PartitionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// On-disk form of an in-memory store.
///
/// ```json
/// {
///   "partitions": [{ "id": "p1", "owner": "acme", "displayName": "Downtown" }],
///   "records": { "p1": { "catalogEntries": [{ "id": "e1", "name": "Shirt" }] } }
/// }
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub partitions: Vec<Partition>,
    #[serde(default)]
    pub records: BTreeMap<PartitionId, BTreeMap<String, Vec<Document>>>,
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing fixture {}", path.display()))
    }

    pub fn into_store(self) -> anyhow::Result<InMemoryRecordStore> {
        let store = InMemoryRecordStore::new();
        for partition in self.partitions {
            store.add_partition(partition);
        }
        for (partition, collections) in self.records {
            for (name, docs) in collections {
                let collection: Collection = name.parse()?;
                let scope = Scope::new(partition.clone(), collection);
                for doc in docs {
                    store.insert(&scope, doc)?;
                }
            }
        }
        Ok(store)
    }

    /// Capture the current contents of `store`, ids included.
    pub fn snapshot(store: &InMemoryRecordStore) -> Self {
        let partitions = store.all_partitions();
        let mut records = BTreeMap::new();
        for partition in &partitions {
            let mut collections = BTreeMap::new();
            for collection in Collection::ALL {
                let scope = Scope::new(partition.id.clone(), collection);
                let docs: Vec<Document> = store
                    .records(&scope)
                    .into_iter()
                    .map(|r| {
                        let mut doc = Document::new();
                        doc.insert(ID_FIELD.into(), Value::String(r.id.to_string()));
                        doc.extend(r.data);
                        doc
                    })
                    .collect();
                if !docs.is_empty() {
                    collections.insert(collection.to_string(), docs);
                }
            }
            records.insert(partition.id.clone(), collections);
        }
        Self {
            partitions,
            records,
        }
    }
}
