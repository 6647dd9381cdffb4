//! Invariant verification across the type and phase ledgers.
//!
//! The ledgers maintain their invariants on every operation, so a sound
//! result is guaranteed by construction. The audit exists to catch
//! corruption from outside the ledgers (hand-edited save files, future
//! bugs) and to give the inventory layer a cheap periodic integrity check.
//!
//! For every slot the audit checks:
//!
//! ```text
//! capacity > 0
//! 0 <= stored <= capacity
//! phase slot: stored > 0  =>  occupant is Some
//! ```

use stockroom_types::{Kg, Phase, PhaseSlot, TypeSlot};

use crate::{PhaseLedger, SlotKey, TypeLedger};

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerViolation {
    /// A slot holds more than its capacity.
    StoredExceedsCapacity {
        /// The offending slot.
        slot: SlotKey,
        /// Amount stored.
        stored: Kg,
        /// Capacity of the slot.
        capacity: Kg,
    },
    /// A slot has a negative capacity or stored amount.
    NegativeValue {
        /// The offending slot.
        slot: SlotKey,
    },
    /// A slot exists with zero capacity.
    ZeroCapacity {
        /// The offending slot.
        slot: SlotKey,
    },
    /// A phase slot holds material but records no occupant.
    MissingOccupant {
        /// The offending phase.
        phase: Phase,
        /// Amount stored without an owner.
        stored: Kg,
    },
}

impl core::fmt::Display for LedgerViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StoredExceedsCapacity {
                slot,
                stored,
                capacity,
            } => write!(f, "{slot} stores {stored} kg over a capacity of {capacity} kg"),
            Self::NegativeValue { slot } => write!(f, "{slot} has a negative value"),
            Self::ZeroCapacity { slot } => write!(f, "{slot} exists with zero capacity"),
            Self::MissingOccupant { phase, stored } => {
                write!(f, "{phase} phase slot stores {stored} kg with no occupant")
            }
        }
    }
}

/// The result of auditing a pair of ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// Every invariant holds.
    Sound,
    /// One or more invariants are broken.
    Violations(Vec<LedgerViolation>),
}

impl AuditResult {
    /// Whether the audit found nothing wrong.
    pub const fn is_sound(&self) -> bool {
        matches!(self, Self::Sound)
    }
}

/// Audit both ledgers of one owner.
pub fn audit(types: &TypeLedger, phases: &PhaseLedger) -> AuditResult {
    audit_slots(&types.slots(), &phases.slots())
}

/// Audit raw slot records, e.g. a snapshot before it is restored.
pub fn audit_slots(type_slots: &[TypeSlot], phase_slots: &[PhaseSlot]) -> AuditResult {
    let mut violations = Vec::new();

    for slot in type_slots {
        check_slot(
            SlotKey::Type(slot.resource),
            slot.capacity,
            slot.stored,
            &mut violations,
        );
    }

    for slot in phase_slots {
        check_slot(
            SlotKey::Phase(slot.phase),
            slot.capacity,
            slot.stored,
            &mut violations,
        );
        if slot.stored > Kg::ZERO && slot.occupant.is_none() {
            violations.push(LedgerViolation::MissingOccupant {
                phase: slot.phase,
                stored: slot.stored,
            });
        }
    }

    if violations.is_empty() {
        AuditResult::Sound
    } else {
        tracing::warn!(count = violations.len(), "Storage ledger audit found violations");
        AuditResult::Violations(violations)
    }
}

fn check_slot(slot: SlotKey, capacity: Kg, stored: Kg, violations: &mut Vec<LedgerViolation>) {
    if capacity < Kg::ZERO || stored < Kg::ZERO {
        violations.push(LedgerViolation::NegativeValue { slot });
        return;
    }
    if capacity.is_zero() {
        violations.push(LedgerViolation::ZeroCapacity { slot });
    }
    if stored > capacity {
        violations.push(LedgerViolation::StoredExceedsCapacity {
            slot,
            stored,
            capacity,
        });
    }
}
