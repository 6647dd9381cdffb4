//! Shared per-phase capacity with exclusive occupancy.
//!
//! A phase slot models one physical tank or bin: any resource of the phase
//! may use it, but never two at once. The slot is held by its occupant
//! while anything is stored in it, and released when it is drained.
//!
//! Drained amounts at or below [`SNAP_EPSILON`] are snapped to zero so that
//! a trace left by inexact caller arithmetic cannot block the slot forever.

use std::collections::{BTreeMap, BTreeSet};

use stockroom_types::{Kg, Phase, PhaseSlot, ResourceId};

use crate::{add, check_amount, sub, SlotKey, StorageError, SNAP_EPSILON};

/// Capacity, occupant, and stored amount of one phase slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PhaseEntry {
    capacity: Kg,
    occupant: Option<ResourceId>,
    stored: Kg,
}

impl PhaseEntry {
    /// Whether `resource` may be stored here right now.
    fn admits(&self, resource: ResourceId) -> bool {
        self.stored.is_zero() || self.occupant == Some(resource)
    }

    /// The amount of `resource` held in this slot.
    fn stored_for(&self, resource: ResourceId) -> Kg {
        if self.occupant == Some(resource) {
            self.stored
        } else {
            Kg::ZERO
        }
    }
}

/// Per-owner ledger of capacity shared by every resource of a phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseLedger {
    entries: BTreeMap<Phase, PhaseEntry>,
}

impl PhaseLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild a ledger from slot records, validating every invariant.
    ///
    /// A slot that stores nothing has its occupant cleared. Zero-capacity
    /// slots holding nothing are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptSnapshot`] if a slot is duplicated,
    /// negative, overfull, or holds an amount without an occupant.
    pub fn from_slots(slots: impl IntoIterator<Item = PhaseSlot>) -> Result<Self, StorageError> {
        let mut ledger = Self::new();

        for slot in slots {
            let key = SlotKey::Phase(slot.phase);
            if slot.capacity < Kg::ZERO || slot.stored < Kg::ZERO {
                return Err(StorageError::CorruptSnapshot {
                    reason: format!("negative value in {key}"),
                });
            }
            if slot.stored > slot.capacity {
                return Err(StorageError::CorruptSnapshot {
                    reason: format!(
                        "{key} holds {} kg but has only {} kg of capacity",
                        slot.stored, slot.capacity
                    ),
                });
            }
            if slot.stored > Kg::ZERO && slot.occupant.is_none() {
                return Err(StorageError::CorruptSnapshot {
                    reason: format!("{key} holds {} kg with no occupant", slot.stored),
                });
            }
            if slot.capacity.is_zero() {
                continue;
            }

            let occupant = if slot.stored.is_zero() {
                None
            } else {
                slot.occupant
            };
            let previous = ledger.entries.insert(
                slot.phase,
                PhaseEntry {
                    capacity: slot.capacity,
                    occupant,
                    stored: slot.stored,
                },
            );
            if previous.is_some() {
                return Err(StorageError::CorruptSnapshot {
                    reason: format!("duplicate {key}"),
                });
            }
        }

        Ok(ledger)
    }

    /// Number of phases with shared capacity.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no phase has shared capacity.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add shared capacity for a phase, creating the slot if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `delta` is negative.
    pub fn add_capacity(&mut self, phase: Phase, delta: Kg) -> Result<(), StorageError> {
        check_amount(delta)?;
        if delta.is_zero() {
            return Ok(());
        }

        match self.entries.get_mut(&phase) {
            Some(entry) => {
                entry.capacity = add(entry.capacity, delta, "phase capacity")?;
            }
            None => {
                self.entries.insert(
                    phase,
                    PhaseEntry {
                        capacity: delta,
                        occupant: None,
                        stored: Kg::ZERO,
                    },
                );
            }
        }
        Ok(())
    }

    /// Remove shared capacity from a phase.
    ///
    /// The slot is removed entirely when its capacity reaches exactly zero.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `delta` is negative,
    /// [`StorageError::CapacityUnderflow`] if `delta` exceeds the current
    /// capacity, or [`StorageError::CapacityInUse`] if the reduced capacity
    /// would be smaller than the amount stored. Nothing changes on error.
    pub fn remove_capacity(&mut self, phase: Phase, delta: Kg) -> Result<(), StorageError> {
        check_amount(delta)?;
        if delta.is_zero() {
            return Ok(());
        }

        let capacity = self.capacity(phase);
        let stored = self.stored(phase);

        if delta > capacity {
            return Err(StorageError::CapacityUnderflow {
                slot: SlotKey::Phase(phase),
                requested: delta,
                capacity,
            });
        }

        let new_capacity = sub(capacity, delta, "phase capacity")?;
        if new_capacity < stored {
            return Err(StorageError::CapacityInUse {
                slot: SlotKey::Phase(phase),
                requested: delta,
                capacity,
                stored,
            });
        }

        if new_capacity.is_zero() {
            self.entries.remove(&phase);
        } else if let Some(entry) = self.entries.get_mut(&phase) {
            entry.capacity = new_capacity;
        }
        Ok(())
    }

    /// Whether the phase has any shared capacity.
    pub fn has_capacity(&self, phase: Phase) -> bool {
        self.entries.contains_key(&phase)
    }

    /// Shared capacity of a phase (zero if none).
    pub fn capacity(&self, phase: Phase) -> Kg {
        self.entries.get(&phase).map_or(Kg::ZERO, |entry| entry.capacity)
    }

    /// Amount held in the phase slot, whoever holds it.
    pub fn stored(&self, phase: Phase) -> Kg {
        self.entries.get(&phase).map_or(Kg::ZERO, |entry| entry.stored)
    }

    /// Amount of `resource` held in the phase slot (zero unless it is the
    /// occupant).
    pub fn stored_for(&self, phase: Phase, resource: ResourceId) -> Kg {
        self.entries
            .get(&phase)
            .map_or(Kg::ZERO, |entry| entry.stored_for(resource))
    }

    /// The resource currently holding the phase slot.
    pub fn occupant(&self, phase: Phase) -> Option<ResourceId> {
        self.entries.get(&phase).and_then(|entry| entry.occupant)
    }

    /// Whether `resource` may use the phase slot: it is empty or already
    /// held by `resource`. A phase without capacity admits nobody.
    pub fn admits(&self, phase: Phase, resource: ResourceId) -> bool {
        self.entries
            .get(&phase)
            .is_some_and(|entry| entry.admits(resource))
    }

    /// Shared capacity not yet used.
    pub fn remaining(&self, phase: Phase) -> Kg {
        self.entries.get(&phase).map_or(Kg::ZERO, |entry| {
            entry.capacity.saturating_sub(entry.stored)
        })
    }

    /// Store an amount of `resource` in the phase slot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `amount` is negative,
    /// [`StorageError::PhaseConflict`] if the slot holds a different
    /// resource (regardless of remaining capacity), or
    /// [`StorageError::CapacityExceeded`] if the amount does not fit.
    /// Nothing changes on error.
    pub fn store(
        &mut self,
        phase: Phase,
        resource: ResourceId,
        amount: Kg,
    ) -> Result<(), StorageError> {
        check_amount(amount)?;
        if amount.is_zero() {
            return Ok(());
        }

        let Some(entry) = self.entries.get_mut(&phase) else {
            return Err(StorageError::CapacityExceeded {
                resource,
                requested: amount,
                remaining: Kg::ZERO,
            });
        };

        match entry.occupant {
            Some(occupant) if !entry.admits(resource) => {
                return Err(StorageError::PhaseConflict {
                    phase,
                    resource,
                    occupant,
                });
            }
            _ => {}
        }

        let remaining = entry.capacity.saturating_sub(entry.stored);
        if amount > remaining {
            return Err(StorageError::CapacityExceeded {
                resource,
                requested: amount,
                remaining,
            });
        }

        entry.stored = add(entry.stored, amount, "phase stored")?;
        entry.occupant = Some(resource);
        Ok(())
    }

    /// Retrieve an amount of `resource` from the phase slot.
    ///
    /// A remainder at or below [`SNAP_EPSILON`] is snapped to zero and the
    /// slot is released.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `amount` is negative, or
    /// [`StorageError::InsufficientStock`] if the slot holds less of
    /// `resource` than requested. Nothing changes on error.
    pub fn retrieve(
        &mut self,
        phase: Phase,
        resource: ResourceId,
        amount: Kg,
    ) -> Result<(), StorageError> {
        check_amount(amount)?;
        if amount.is_zero() {
            return Ok(());
        }

        let stored = self.stored_for(phase, resource);
        if amount > stored {
            return Err(StorageError::InsufficientStock {
                resource,
                requested: amount,
                stored,
            });
        }

        let entry = self.entries.get_mut(&phase).ok_or(StorageError::InsufficientStock {
            resource,
            requested: amount,
            stored: Kg::ZERO,
        })?;

        let left = sub(entry.stored, amount, "phase stored")?;
        if left <= SNAP_EPSILON {
            if !left.is_zero() {
                tracing::trace!(%phase, %resource, %left, "Snapping phase slot residue to zero");
            }
            entry.stored = Kg::ZERO;
            entry.occupant = None;
        } else {
            entry.stored = left;
        }
        Ok(())
    }

    /// Occupants with a nonzero stored amount.
    pub fn stored_resources(&self) -> BTreeSet<ResourceId> {
        self.entries
            .values()
            .filter(|entry| entry.stored > Kg::ZERO)
            .filter_map(|entry| entry.occupant)
            .collect()
    }

    /// Sum of stored amounts over every phase slot.
    pub fn total_stored(&self) -> Kg {
        self.entries
            .values()
            .fold(Kg::ZERO, |total, entry| total.saturating_add(entry.stored))
    }

    /// Shared capacity per phase.
    pub fn capacities(&self) -> BTreeMap<Phase, Kg> {
        self.entries
            .iter()
            .map(|(phase, entry)| (*phase, entry.capacity))
            .collect()
    }

    /// Snapshot every slot as a [`PhaseSlot`], in phase order.
    pub fn slots(&self) -> Vec<PhaseSlot> {
        self.entries
            .iter()
            .map(|(phase, entry)| PhaseSlot {
                phase: *phase,
                capacity: entry.capacity,
                occupant: entry.occupant,
                stored: entry.stored,
            })
            .collect()
    }
}
