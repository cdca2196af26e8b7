use catsync_types::{SlotKind, Variant};
use serde::{Deserialize, Serialize};

/// How one variant slot was merged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMerge {
    pub name: String,
    pub kind: SlotKind,
    /// `true` when stock was carried over from a same-named target variant;
    /// `false` for a slot new to the target (stock starts at zero).
    pub carried: bool,
    pub stock_quantity: i64,
    pub stock_initial: i64,
}

/// Build the target's variant list from the source's list and order,
/// keeping each variant's stock from the same-named target variant.
///
/// Matching is by exact name only. Target variants absent from the source
/// are dropped.
pub fn merge_variants(source: &[Variant], target: &[Variant]) -> (Vec<Variant>, Vec<VariantMerge>) {
    let mut merged = Vec::with_capacity(source.len());
    let mut report = Vec::with_capacity(source.len());

    for sv in source {
        let existing = target.iter().find(|tv| tv.name == sv.name);
        let (quantity, initial) = existing.map_or((0, 0), |tv| (tv.stock_quantity, tv.stock_initial));

        let mut v = sv.clone();
        v.stock_quantity = quantity;
        v.stock_initial = initial;

        report.push(VariantMerge {
            name: v.name.clone(),
            kind: v.kind,
            carried: existing.is_some(),
            stock_quantity: quantity,
            stock_initial: initial,
        });
        merged.push(v);
    }

    (merged, report)
}

/// Copy variants with all stock zeroed, for a partition that has never held
/// the product.
pub fn zeroed_variants(source: &[Variant]) -> (Vec<Variant>, Vec<VariantMerge>) {
    merge_variants(source, &[])
}
