use catsync_types::{CatalogEntry, RecordId, UserId};
use tracing::debug;

use crate::code::CodeChange;
use crate::error::{MergeError, MergeResult};
use crate::variants::{merge_variants, zeroed_variants, VariantMerge};

/// Category and supplier references already resolved in the target
/// partition. `None` leaves the reference unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedRefs {
    pub category: Option<RecordId>,
    pub supplier: Option<String>,
}

/// Whether the plan creates a new record or updates an existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update { target_id: RecordId },
}

/// The record to write into one target partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WritePlan {
    pub kind: WriteKind,
    pub entry: CatalogEntry,
    pub variants: Vec<VariantMerge>,
}

impl WritePlan {
    pub fn is_create(&self) -> bool {
        matches!(self.kind, WriteKind::Create)
    }
}

/// Compute the write for one target partition.
///
/// - **Create** (`target` is `None`): every catalog attribute comes from the
///   source; all stock, top-level and per variant, is zero; `created_by` is
///   the acting user.
/// - **Update**: catalog attributes come from the source, while stock,
///   `created_by` and `created_at` stay the target's. The target keeps its
///   own legacy code, or adopts the source's when it has none. The code is
///   cleared only when `codes` shows the edit emptied a code that was set;
///   a source that never had a code leaves the target's alone. Variants follow the source's list and order with stock
///   carried over by name, and the aggregate `stock_quantity` becomes the
///   sum of the merged variants' stock.
///
/// The root id always follows the source.
pub fn plan_write(
    source: &CatalogEntry,
    target: Option<&CatalogEntry>,
    refs: &ResolvedRefs,
    codes: &CodeChange,
    acting_user: &UserId,
) -> MergeResult<WritePlan> {
    if source.root_id.is_none() {
        return Err(MergeError::MissingRootId);
    }

    let mut entry = source.clone();
    entry.category_ref = refs.category.clone();
    entry.supplier_name = refs.supplier.clone();
    entry.updated_at = None;

    match target {
        None => {
            let (variants, report) = zeroed_variants(&source.variants);
            entry.id = None;
            entry.variants = variants;
            entry.stock_quantity = 0;
            entry.stock_initial = 0;
            entry.created_by = Some(acting_user.clone());
            entry.created_at = None;
            debug!(name = %entry.name, variants = report.len(), "planned create");
            Ok(WritePlan {
                kind: WriteKind::Create,
                entry,
                variants: report,
            })
        }
        Some(existing) => {
            let target_id = existing.id.clone().ok_or(MergeError::TargetWithoutId)?;
            let (variants, report) = merge_variants(&source.variants, &existing.variants);

            entry.id = Some(target_id.clone());
            entry.legacy_code = if codes.cleared() {
                None
            } else {
                existing.code().or(source.code()).map(str::to_string)
            };
            entry.stock_quantity = if variants.is_empty() {
                existing.stock_quantity
            } else {
                variants.iter().map(|v| v.stock_quantity).sum()
            };
            entry.stock_initial = existing.stock_initial;
            entry.variants = variants;
            entry.created_by = existing.created_by.clone();
            entry.created_at = existing.created_at;
            debug!(name = %entry.name, target = %target_id, variants = report.len(), "planned update");
            Ok(WritePlan {
                kind: WriteKind::Update { target_id },
                entry,
                variants: report,
            })
        }
    }
}
