//! Dedicated per-resource capacity.
//!
//! The [`TypeLedger`] maps a resource to the capacity reserved for it and
//! the amount currently held in that reservation. Capacity is added once
//! during owner setup and only changes through explicit capacity calls;
//! stored amounts move continuously through [`TypeLedger::store`] and
//! [`TypeLedger::retrieve`].

use std::collections::{BTreeMap, BTreeSet};

use stockroom_types::{Kg, ResourceId, TypeSlot};

use crate::{add, check_amount, sub, SlotKey, StorageError};

/// Capacity and stored amount of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TypeEntry {
    capacity: Kg,
    stored: Kg,
}

/// Per-owner ledger of capacity dedicated to specific resources.
///
/// Entries with zero capacity are never materialized: removing the last
/// kilogram of capacity removes the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeLedger {
    entries: BTreeMap<ResourceId, TypeEntry>,
}

impl TypeLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild a ledger from slot records, validating every invariant.
    ///
    /// Zero-capacity slots holding nothing are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CorruptSnapshot`] if a slot is duplicated,
    /// negative, or holds more than its capacity.
    pub fn from_slots(slots: impl IntoIterator<Item = TypeSlot>) -> Result<Self, StorageError> {
        let mut ledger = Self::new();

        for slot in slots {
            if slot.capacity < Kg::ZERO || slot.stored < Kg::ZERO {
                return Err(StorageError::CorruptSnapshot {
                    reason: format!("negative value in {}", SlotKey::Type(slot.resource)),
                });
            }
            if slot.stored > slot.capacity {
                return Err(StorageError::CorruptSnapshot {
                    reason: format!(
                        "{} holds {} kg but has only {} kg of capacity",
                        SlotKey::Type(slot.resource),
                        slot.stored,
                        slot.capacity
                    ),
                });
            }
            if slot.capacity.is_zero() {
                continue;
            }
            let previous = ledger.entries.insert(
                slot.resource,
                TypeEntry {
                    capacity: slot.capacity,
                    stored: slot.stored,
                },
            );
            if previous.is_some() {
                return Err(StorageError::CorruptSnapshot {
                    reason: format!("duplicate {}", SlotKey::Type(slot.resource)),
                });
            }
        }

        Ok(ledger)
    }

    /// Number of resources with dedicated capacity.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no resource has dedicated capacity.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add dedicated capacity for a resource, creating the entry if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `delta` is negative.
    pub fn add_capacity(&mut self, resource: ResourceId, delta: Kg) -> Result<(), StorageError> {
        check_amount(delta)?;
        if delta.is_zero() {
            return Ok(());
        }

        match self.entries.get_mut(&resource) {
            Some(entry) => {
                entry.capacity = add(entry.capacity, delta, "type capacity")?;
            }
            None => {
                self.entries.insert(
                    resource,
                    TypeEntry {
                        capacity: delta,
                        stored: Kg::ZERO,
                    },
                );
            }
        }
        Ok(())
    }

    /// Remove dedicated capacity from a resource.
    ///
    /// The entry is removed entirely when its capacity reaches exactly zero.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `delta` is negative,
    /// [`StorageError::CapacityUnderflow`] if `delta` exceeds the current
    /// capacity, or [`StorageError::CapacityInUse`] if the reduced capacity
    /// would be smaller than the amount stored. Nothing changes on error.
    pub fn remove_capacity(&mut self, resource: ResourceId, delta: Kg) -> Result<(), StorageError> {
        check_amount(delta)?;
        if delta.is_zero() {
            return Ok(());
        }

        let entry = self.entries.get(&resource).copied().unwrap_or(TypeEntry {
            capacity: Kg::ZERO,
            stored: Kg::ZERO,
        });

        if delta > entry.capacity {
            return Err(StorageError::CapacityUnderflow {
                slot: SlotKey::Type(resource),
                requested: delta,
                capacity: entry.capacity,
            });
        }

        let new_capacity = sub(entry.capacity, delta, "type capacity")?;
        if new_capacity < entry.stored {
            return Err(StorageError::CapacityInUse {
                slot: SlotKey::Type(resource),
                requested: delta,
                capacity: entry.capacity,
                stored: entry.stored,
            });
        }

        if new_capacity.is_zero() {
            self.entries.remove(&resource);
        } else if let Some(existing) = self.entries.get_mut(&resource) {
            existing.capacity = new_capacity;
        }
        Ok(())
    }

    /// Whether the resource has any dedicated capacity.
    pub fn has_capacity(&self, resource: ResourceId) -> bool {
        self.entries.contains_key(&resource)
    }

    /// Dedicated capacity for a resource (zero if none).
    pub fn capacity(&self, resource: ResourceId) -> Kg {
        self.entries
            .get(&resource)
            .map_or(Kg::ZERO, |entry| entry.capacity)
    }

    /// Amount of a resource held in its dedicated capacity (zero if none).
    pub fn stored(&self, resource: ResourceId) -> Kg {
        self.entries
            .get(&resource)
            .map_or(Kg::ZERO, |entry| entry.stored)
    }

    /// Dedicated capacity not yet used.
    pub fn remaining(&self, resource: ResourceId) -> Kg {
        self.entries.get(&resource).map_or(Kg::ZERO, |entry| {
            entry.capacity.saturating_sub(entry.stored)
        })
    }

    /// Store an amount into the resource's dedicated capacity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `amount` is negative, or
    /// [`StorageError::CapacityExceeded`] if it does not fit. Nothing
    /// changes on error.
    pub fn store(&mut self, resource: ResourceId, amount: Kg) -> Result<(), StorageError> {
        check_amount(amount)?;
        if amount.is_zero() {
            return Ok(());
        }

        let remaining = self.remaining(resource);
        if amount > remaining {
            return Err(StorageError::CapacityExceeded {
                resource,
                requested: amount,
                remaining,
            });
        }

        let entry = self.entries.get_mut(&resource).ok_or(StorageError::CapacityExceeded {
            resource,
            requested: amount,
            remaining: Kg::ZERO,
        })?;
        entry.stored = add(entry.stored, amount, "type stored")?;
        Ok(())
    }

    /// Retrieve an amount from the resource's dedicated capacity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `amount` is negative, or
    /// [`StorageError::InsufficientStock`] if less is stored. Nothing
    /// changes on error.
    pub fn retrieve(&mut self, resource: ResourceId, amount: Kg) -> Result<(), StorageError> {
        check_amount(amount)?;
        if amount.is_zero() {
            return Ok(());
        }

        let stored = self.stored(resource);
        if amount > stored {
            return Err(StorageError::InsufficientStock {
                resource,
                requested: amount,
                stored,
            });
        }

        let entry = self.entries.get_mut(&resource).ok_or(StorageError::InsufficientStock {
            resource,
            requested: amount,
            stored: Kg::ZERO,
        })?;
        entry.stored = sub(entry.stored, amount, "type stored")?;
        Ok(())
    }

    /// Resources with a nonzero stored amount.
    pub fn stored_resources(&self) -> BTreeSet<ResourceId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.stored > Kg::ZERO)
            .map(|(resource, _)| *resource)
            .collect()
    }

    /// Sum of stored amounts over every entry.
    pub fn total_stored(&self) -> Kg {
        self.entries
            .values()
            .fold(Kg::ZERO, |total, entry| total.saturating_add(entry.stored))
    }

    /// Dedicated capacity per resource.
    pub fn capacities(&self) -> BTreeMap<ResourceId, Kg> {
        self.entries
            .iter()
            .map(|(resource, entry)| (*resource, entry.capacity))
            .collect()
    }

    /// Snapshot every entry as a [`TypeSlot`], in resource order.
    pub fn slots(&self) -> Vec<TypeSlot> {
        self.entries
            .iter()
            .map(|(resource, entry)| TypeSlot {
                resource: *resource,
                capacity: entry.capacity,
                stored: entry.stored,
            })
            .collect()
    }
}
