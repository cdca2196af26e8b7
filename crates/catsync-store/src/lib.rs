//! Partition-scoped record storage for catsync.
//!
//! The synchronization engine never talks to a concrete database. It
//! consumes the host application's document store through two narrow
//! async interfaces:
//!
//! - [`RecordStore`] -- exact-match query, create, and partial update of
//!   JSON documents within one `(partition, collection)` [`Scope`]
//! - [`PartitionDirectory`] -- the partitions owned by a merchant
//!
//! [`RecordStoreExt`] layers typed serde helpers over any `RecordStore`.
//!
//! # Storage Backends
//!
//! - [`InMemoryRecordStore`] -- `HashMap`-based store for tests, fixtures and embedding
//!
//! # Design Rules
//!
//! 1. Record ids are assigned by the store and are partition-local.
//! 2. `createdAt` / `updatedAt` are server fields; values supplied by callers are ignored.
//! 3. Filters are exact-match only; an empty filter list selects the whole scope.
//! 4. Updates merge the given fields into the stored document; absent fields are untouched.

pub mod error;
pub mod memory;
pub mod record;
pub mod traits;
pub mod typed;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRecordStore;
pub use record::{Document, Filter, FilterOp, Record, Scope, ID_FIELD};
pub use traits::{PartitionDirectory, RecordStore};
pub use typed::{to_document, RecordStoreExt};
