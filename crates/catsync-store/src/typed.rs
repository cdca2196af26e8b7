use async_trait::async_trait;
use catsync_types::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::record::{Document, Filter, Scope, ID_FIELD};
use crate::traits::RecordStore;

/// Serialize a typed record into a store document, dropping its `id`.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove(ID_FIELD);
            Ok(map)
        }
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Typed serde helpers over any [`RecordStore`].
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    async fn query_as<T>(&self, scope: &Scope, filters: &[Filter]) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.query(scope, filters)
            .await?
            .iter()
            .map(|r| r.decode())
            .collect()
    }

    async fn get_as<T>(&self, scope: &Scope, id: &RecordId) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(scope, id).await? {
            Some(record) => Ok(Some(record.decode()?)),
            None => Ok(None),
        }
    }

    async fn create_from<T>(&self, scope: &Scope, value: &T) -> StoreResult<RecordId>
    where
        T: Serialize + Sync,
    {
        let doc = to_document(value)?;
        self.create(scope, doc).await
    }

    async fn update_from<T>(&self, scope: &Scope, id: &RecordId, value: &T) -> StoreResult<()>
    where
        T: Serialize + Sync,
    {
        let doc = to_document(value)?;
        self.update(scope, id, doc).await
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
