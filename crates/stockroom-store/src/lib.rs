//! Per-owner capacity store for amount resources.
//!
//! Every storage-capable owner in the simulation (settlement, vehicle,
//! container) holds one [`CapacityStore`]. The inventory layer talks to the
//! store only; the two ledgers behind it are never exposed for mutation.
//!
//! # Modules
//!
//! - [`store`] -- [`CapacityStore`]: the two-tier store/retrieve policy.
//! - [`cache`] -- [`Cached`]: explicit fresh/stale wrapper for derived totals.
//! - [`snapshot`] -- [`StorageSnapshot`]: persistence and restore.
//! - [`transfer`] -- Moving stock between two owners.
//!
//! # Allocation policy
//!
//! A resource may use two kinds of capacity: its own dedicated type
//! capacity, and the shared phase capacity of its phase while nobody else
//! holds that slot. Stores fill type capacity first and overflow into the
//! phase slot; retrievals drain the phase slot first and then type
//! capacity. Dedicated space therefore stays available to its resource for
//! as long as possible, and shared space is released early.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use rust_decimal::Decimal;
//! use stockroom_catalog::{ResourceCatalog, ResourceDefinition};
//! use stockroom_store::{CapacityStore, StorageError};
//! use stockroom_types::{OwnerId, Phase, ResourceId};
//!
//! let water = ResourceId(1);
//! let grey_water = ResourceId(2);
//! let liquid = |id: ResourceId, name: &str| ResourceDefinition {
//!     id,
//!     name: name.to_owned(),
//!     phase: Phase::Liquid,
//!     edible: false,
//!     life_support: false,
//! };
//! let catalog = ResourceCatalog::from_definitions([
//!     liquid(water, "water"),
//!     liquid(grey_water, "grey water"),
//! ])
//! .map(Arc::new)
//! .unwrap_or_default();
//!
//! let mut store = CapacityStore::new(OwnerId::new(), catalog);
//! store.add_phase_capacity(Phase::Liquid, Decimal::new(20, 0)).ok();
//!
//! assert!(store.store(water, Decimal::new(15, 0)).is_ok());
//! assert!(matches!(
//!     store.store(grey_water, Decimal::ONE),
//!     Err(StorageError::PhaseConflict { .. })
//! ));
//! assert_eq!(store.total_stored(false), Decimal::new(15, 0));
//! ```

pub mod cache;
pub mod snapshot;
pub mod store;
pub mod transfer;

// Re-export primary types at crate root.
pub use cache::Cached;
pub use snapshot::StorageSnapshot;
pub use store::CapacityStore;
pub use transfer::{transfer, TransferError};

pub use stockroom_ledger::{AuditResult, LedgerViolation, SlotKey, StorageError, SNAP_EPSILON};
