//! Merge planner for catsync.
//!
//! Given a source catalog entry and, optionally, the copy that already
//! exists in a target partition, the planner computes exactly what to
//! write there. Catalog attributes (name, prices, description, fiscal data,
//! variant list) follow the source; stock is partition-local and always
//! follows the target. The planner is pure: it performs no I/O.

pub mod code;
pub mod error;
pub mod planner;
pub mod variants;

pub use code::CodeChange;
pub use error::{MergeError, MergeResult};
pub use planner::{plan_write, ResolvedRefs, WriteKind, WritePlan};
pub use variants::{merge_variants, VariantMerge};
