//! Foundation types for catsync.
//!
//! This crate provides the identifiers and record shapes shared by every
//! other catsync crate. Records here are plain serde structs; they carry no
//! storage or synchronization behaviour of their own.
//!
//! # Key Types
//!
//! - [`RootId`] -- UUID v7 identity shared by every partition-local copy of a product
//! - [`PartitionId`], [`OwnerId`], [`RecordId`], [`UserId`] -- scoped string identifiers
//! - [`CatalogEntry`] -- a sellable item within one partition
//! - [`Variant`] -- a named pricing/stock slot, classified once into a [`SlotKind`]
//! - [`Category`], [`Supplier`] -- per-partition dependent records, keyed by name
//! - [`Collection`] -- the partition-scoped collections the engine touches
//! - [`MatchStrategy`] -- how a target copy of an entry was identified

pub mod catalog;
pub mod collection;
pub mod dependent;
pub mod error;
pub mod identity;
pub mod strategy;

pub use catalog::{CatalogEntry, FiscalInfo, SlotKind, Variant};
pub use collection::Collection;
pub use dependent::{Category, Partition, Supplier};
pub use error::TypeError;
pub use identity::{OwnerId, PartitionId, RecordId, RootId, UserId};
pub use strategy::MatchStrategy;
