use serde::{Deserialize, Serialize};

use crate::identity::{OwnerId, PartitionId, RecordId};

/// One merchant location's isolated data scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub id: PartitionId,
    pub owner: OwnerId,
    pub display_name: String,
}

impl Partition {
    pub fn new(id: impl Into<PartitionId>, owner: impl Into<OwnerId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            display_name: display_name.into(),
        }
    }
}

/// Per-partition product category. Only `name` travels between partitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            active: true,
        }
    }

    /// A fresh, active copy for another partition.
    pub fn provisioned_copy(&self) -> Self {
        Self {
            id: None,
            name: self.name.clone(),
            description: self.description.clone(),
            active: true,
        }
    }
}

/// Per-partition supplier record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Partition-local link into that store's payables; never copied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable_account_id: Option<RecordId>,
}

impl Supplier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            contact: None,
            phone: None,
            email: None,
            address: None,
            tax_id: None,
            active: true,
            payable_account_id: None,
        }
    }

    /// A fresh, active copy for another partition: descriptive fields only.
    pub fn provisioned_copy(&self) -> Self {
        Self {
            id: None,
            name: self.name.clone(),
            contact: self.contact.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            tax_id: self.tax_id.clone(),
            active: true,
            payable_account_id: None,
        }
    }
}

fn default_active() -> bool {
    true
}
