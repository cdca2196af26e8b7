use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Partition-scoped collections touched by the synchronization engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    CatalogEntries,
    Categories,
    Suppliers,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::CatalogEntries, Self::Categories, Self::Suppliers];

    /// Collection name as used by the record store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatalogEntries => "catalogEntries",
            Self::Categories => "categories",
            Self::Suppliers => "suppliers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TypeError::UnknownCollection(s.to_string()))
    }
}
