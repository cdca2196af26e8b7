use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::{RecordId, RootId, UserId};

/// A sellable item within one partition.
///
/// `id` and `legacy_code` are partition-local and may differ between the
/// copies of one product; `root_id` is the identity shared by all of them.
/// Prices are minor currency units (cents).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_root_as_none"
    )]
    pub root_id: Option<RootId>,
    pub name: String,
    /// Human-assigned product code ("reference").
    #[serde(rename = "reference", default)]
    pub legacy_code: Option<String>,
    #[serde(rename = "categoryId", default)]
    pub category_ref: Option<RecordId>,
    #[serde(rename = "supplier", default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fiscal: FiscalInfo,
    #[serde(default)]
    pub cost_price: i64,
    #[serde(default)]
    pub sale_price: i64,
    #[serde(default)]
    pub promo_price: Option<i64>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub stock_initial: i64,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// A blank `rootId` is treated as never linked.
fn blank_root_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RootId>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| RootId::parse(s).ok()))
}

impl CatalogEntry {
    /// A new active entry with the given name and everything else empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            root_id: None,
            name: name.into(),
            legacy_code: None,
            category_ref: None,
            supplier_name: None,
            description: None,
            fiscal: FiscalInfo::default(),
            cost_price: 0,
            sale_price: 0,
            promo_price: None,
            stock_quantity: 0,
            stock_initial: 0,
            variants: Vec::new(),
            active: true,
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// The legacy code, or `None` when absent or blank.
    pub fn code(&self) -> Option<&str> {
        self.legacy_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Look up a variant by exact name.
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Sum of `stock_quantity` across all variants.
    pub fn variant_stock_total(&self) -> i64 {
        self.variants.iter().map(|v| v.stock_quantity).sum()
    }
}

/// Fiscal classification copied verbatim between partitions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// What kind of pricing slot a variant represents.
///
/// Derived from the variant name when the variant is ingested. It is
/// informational only: variants are always matched across partitions by
/// their exact name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// Paid up front ("cash price", "à vista").
    Cash,
    /// Paid in instalments ("installment price", "parcelado", "a prazo").
    Installment,
    Other,
}

impl SlotKind {
    /// Classify a variant name.
    pub fn classify(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        if ["cash", "vista", "dinheiro"].iter().any(|k| lower.contains(k)) {
            Self::Cash
        } else if ["install", "parcel", "prazo"].iter().any(|k| lower.contains(k)) {
            Self::Installment
        } else {
            Self::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Installment => "installment",
            Self::Other => "other",
        }
    }
}

/// A named pricing/stock slot within a [`CatalogEntry`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VariantRecord", into = "VariantRecord")]
pub struct Variant {
    pub name: String,
    pub kind: SlotKind,
    pub cost: i64,
    pub sale_price: i64,
    pub promo_price: Option<i64>,
    pub stock_quantity: i64,
    pub stock_initial: i64,
}

impl Variant {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: SlotKind::classify(&name),
            name,
            cost: 0,
            sale_price: 0,
            promo_price: None,
            stock_quantity: 0,
            stock_initial: 0,
        }
    }

    pub fn with_stock(mut self, quantity: i64, initial: i64) -> Self {
        self.stock_quantity = quantity;
        self.stock_initial = initial;
        self
    }

    pub fn with_prices(mut self, cost: i64, sale: i64) -> Self {
        self.cost = cost;
        self.sale_price = sale;
        self
    }
}

/// Persisted shape of a variant; `kind` is not stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantRecord {
    name: String,
    #[serde(default)]
    cost: i64,
    #[serde(default)]
    sale_price: i64,
    #[serde(default)]
    promo_price: Option<i64>,
    #[serde(default)]
    stock_quantity: i64,
    #[serde(default)]
    stock_initial: i64,
}

impl From<VariantRecord> for Variant {
    fn from(r: VariantRecord) -> Self {
        Self {
            kind: SlotKind::classify(&r.name),
            name: r.name,
            cost: r.cost,
            sale_price: r.sale_price,
            promo_price: r.promo_price,
            stock_quantity: r.stock_quantity,
            stock_initial: r.stock_initial,
        }
    }
}

impl From<Variant> for VariantRecord {
    fn from(v: Variant) -> Self {
        Self {
            name: v.name,
            cost: v.cost,
            sale_price: v.sale_price,
            promo_price: v.promo_price,
            stock_quantity: v.stock_quantity,
            stock_initial: v.stock_initial,
        }
    }
}
