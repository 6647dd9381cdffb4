//! Persistence of a capacity store's ledger contents.
//!
//! A [`StorageSnapshot`] is the raw content of both ledgers. The enclosing
//! save/restore mechanism serializes it however it likes (JSON in tests);
//! restoring re-populates the ledgers verbatim, validates them, and leaves
//! every derived value stale so it is rebuilt on the next strict read.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockroom_catalog::ResourceCatalog;
use stockroom_ledger::{PhaseLedger, StorageError, TypeLedger};
use stockroom_types::{Kg, OwnerId, PhaseSlot, TypeSlot};

use crate::store::CapacityStore;

/// Raw ledger contents of one owner at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// The owner the contents belong to.
    pub owner: OwnerId,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Every type slot, in resource order.
    pub type_slots: Vec<TypeSlot>,
    /// Every phase slot, in phase order.
    pub phase_slots: Vec<PhaseSlot>,
}

impl CapacityStore {
    /// Capture the ledger contents.
    pub fn snapshot(&self) -> StorageSnapshot {
        StorageSnapshot {
            owner: self.owner(),
            captured_at: Utc::now(),
            type_slots: self.types.slots(),
            phase_slots: self.phases.slots(),
        }
    }

    /// Rebuild a store from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptSnapshot`] if the slots violate a
    /// ledger invariant, or if a stocked phase slot is occupied by a
    /// resource the catalog does not list under that phase.
    pub fn restore(
        catalog: Arc<ResourceCatalog>,
        snapshot: StorageSnapshot,
    ) -> Result<Self, StorageError> {
        for slot in snapshot.phase_slots.iter().filter(|slot| slot.stored > Kg::ZERO) {
            let Some(occupant) = slot.occupant else {
                continue;
            };
            match catalog.phase_of(occupant) {
                Some(actual) if actual != slot.phase => {
                    return Err(StorageError::CorruptSnapshot {
                        reason: format!(
                            "{} phase slot is occupied by {occupant}, which is {actual}",
                            slot.phase
                        ),
                    });
                }
                None => {
                    return Err(StorageError::CorruptSnapshot {
                        reason: format!(
                            "{} phase slot is occupied by {occupant}, which is not in the catalog",
                            slot.phase
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        let type_count = snapshot.type_slots.len();
        let phase_count = snapshot.phase_slots.len();
        let types = TypeLedger::from_slots(snapshot.type_slots)?;
        let phases = PhaseLedger::from_slots(snapshot.phase_slots)?;

        tracing::info!(
            owner = %snapshot.owner,
            captured_at = %snapshot.captured_at,
            type_slots = type_count,
            phase_slots = phase_count,
            "Restored capacity store from snapshot"
        );

        Ok(Self::from_parts(snapshot.owner, catalog, types, phases))
    }
}
