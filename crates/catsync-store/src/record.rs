use std::fmt;

use catsync_types::{Collection, PartitionId, RecordId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreResult;

/// A stored JSON document.
pub type Document = serde_json::Map<String, Value>;

/// Field under which a record's id is exposed to readers.
pub const ID_FIELD: &str = "id";

/// One collection inside one partition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub partition: PartitionId,
    pub collection: Collection,
}

impl Scope {
    pub fn new(partition: PartitionId, collection: Collection) -> Self {
        Self {
            partition,
            collection,
        }
    }

    pub fn catalog(partition: &PartitionId) -> Self {
        Self::new(partition.clone(), Collection::CatalogEntries)
    }

    pub fn categories(partition: &PartitionId) -> Self {
        Self::new(partition.clone(), Collection::Categories)
    }

    pub fn suppliers(partition: &PartitionId) -> Self {
        Self::new(partition.clone(), Collection::Suppliers)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.collection)
    }
}

/// A record as returned by a query.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub data: Document,
}

impl Record {
    /// Decode into a typed record. The id is exposed under `"id"`.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let mut data = self.data.clone();
        data.insert(ID_FIELD.into(), Value::String(self.id.to_string()));
        Ok(serde_json::from_value(Value::Object(data))?)
    }

    /// Read a string field.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        if field == ID_FIELD {
            return Some(self.id.as_str());
        }
        self.data.get(field).and_then(Value::as_str)
    }
}

/// Comparison operator of a [`Filter`]. Only exact matching is supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    Eq,
}

/// A single `field op value` condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// Evaluate against a record. `"id"` compares against the record id.
    pub fn matches(&self, record: &Record) -> bool {
        match self.op {
            FilterOp::Eq => {
                if self.field == ID_FIELD {
                    return self.value.as_str() == Some(record.id.as_str());
                }
                record.data.get(&self.field) == Some(&self.value)
            }
        }
    }
}
