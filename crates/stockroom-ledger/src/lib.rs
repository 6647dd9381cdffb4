//! Type and phase capacity ledgers for the Stockroom engine.
//!
//! Every kilogram held by a storage owner lives in exactly one of two
//! ledgers:
//!
//! - [`type_ledger`] -- The [`TypeLedger`]: capacity dedicated to one
//!   specific resource.
//! - [`phase_ledger`] -- The [`PhaseLedger`]: capacity shared by all
//!   resources of a phase, held exclusively by one resource at a time.
//! - [`audit`] -- Invariant verification across both ledgers.
//!
//! Neither ledger knows about the other. Splitting a store or retrieve
//! between them is the job of the capacity store that owns them.
//!
//! # Invariants
//!
//! For every entry in either ledger:
//!
//! ```text
//! 0 <= stored <= capacity
//! capacity > 0                      (zero-capacity entries are removed)
//! phase stored > 0  =>  occupant is Some
//! ```
//!
//! Every mutating operation validates first and mutates second, so a
//! failed call leaves the ledger untouched. The ledgers never panic; they
//! return [`StorageError`].
//!
//! # Usage
//!
//! ```
//! use stockroom_ledger::{PhaseLedger, StorageError};
//! use stockroom_types::{Phase, ResourceId};
//! use rust_decimal::Decimal;
//!
//! let water = ResourceId(1);
//! let grey_water = ResourceId(2);
//!
//! let mut tanks = PhaseLedger::new();
//! tanks.add_capacity(Phase::Liquid, Decimal::new(20, 0)).ok();
//! tanks.store(Phase::Liquid, water, Decimal::new(15, 0)).ok();
//!
//! // One tank cannot hold two substances.
//! let result = tanks.store(Phase::Liquid, grey_water, Decimal::ONE);
//! assert!(matches!(result, Err(StorageError::PhaseConflict { .. })));
//! ```

pub mod audit;
pub mod phase_ledger;
pub mod type_ledger;

// Re-export primary types at crate root.
pub use audit::{audit_slots, AuditResult, LedgerViolation};
pub use phase_ledger::PhaseLedger;
pub use type_ledger::TypeLedger;

use rust_decimal::Decimal;
use stockroom_types::{Kg, Phase, ResourceId};

/// Amounts at or below this many kilograms left in a phase slot after a
/// retrieval are snapped to zero, freeing the slot for another resource.
///
/// Also the threshold under which a store request is treated as a no-op.
pub const SNAP_EPSILON: Kg = Decimal::from_parts(1, 0, 0, false, 7);

// ---------------------------------------------------------------------------
// Slot key
// ---------------------------------------------------------------------------

/// Identifies one ledger entry: a resource's type slot or a phase slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    /// Type capacity reserved for a resource.
    Type(ResourceId),
    /// Shared capacity for a phase.
    Phase(Phase),
}

impl core::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Type(resource) => write!(f, "type slot {resource}"),
            Self::Phase(phase) => write!(f, "{phase} phase slot"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by ledger and capacity-store operations.
///
/// All of these are recoverable: the caller decides whether a failure is a
/// failed simulation action or a configuration bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// An amount argument was negative.
    #[error("amount must not be negative, got {amount} kg")]
    NegativeAmount {
        /// The invalid amount.
        amount: Kg,
    },

    /// Removing more capacity than exists.
    #[error("cannot remove {requested} kg of capacity from {slot}: only {capacity} kg exists")]
    CapacityUnderflow {
        /// The slot whose capacity was being reduced.
        slot: SlotKey,
        /// Capacity the caller tried to remove.
        requested: Kg,
        /// Capacity the slot currently has.
        capacity: Kg,
    },

    /// Removing capacity would leave less capacity than is already stored.
    #[error("cannot remove {requested} kg of capacity from {slot}: {stored} kg of {capacity} kg is in use")]
    CapacityInUse {
        /// The slot whose capacity was being reduced.
        slot: SlotKey,
        /// Capacity the caller tried to remove.
        requested: Kg,
        /// Capacity the slot currently has.
        capacity: Kg,
        /// Amount currently stored in the slot.
        stored: Kg,
    },

    /// A store would exceed the remaining capacity.
    #[error("cannot store {requested} kg of {resource}: only {remaining} kg of capacity remains")]
    CapacityExceeded {
        /// The resource being stored.
        resource: ResourceId,
        /// The amount the caller tried to store.
        requested: Kg,
        /// Capacity remaining for the resource.
        remaining: Kg,
    },

    /// A retrieve would take more than is stored.
    #[error("cannot retrieve {requested} kg of {resource}: only {stored} kg is stored")]
    InsufficientStock {
        /// The resource being retrieved.
        resource: ResourceId,
        /// The amount the caller tried to retrieve.
        requested: Kg,
        /// The amount actually stored.
        stored: Kg,
    },

    /// The phase slot is held by a different resource.
    #[error("cannot store {resource} in the {phase} phase slot: it is occupied by {occupant}")]
    PhaseConflict {
        /// The phase slot in question.
        phase: Phase,
        /// The resource being stored.
        resource: ResourceId,
        /// The resource currently occupying the slot.
        occupant: ResourceId,
    },

    /// Checked arithmetic failed.
    #[error("arithmetic overflow in storage calculation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: &'static str,
    },

    /// Restored ledger contents violate the ledger invariants.
    #[error("corrupt storage snapshot: {reason}")]
    CorruptSnapshot {
        /// Description of the first violation found.
        reason: String,
    },
}

/// Reject negative amounts.
///
/// # Errors
///
/// Returns [`StorageError::NegativeAmount`] if `amount < 0`.
pub fn check_amount(amount: Kg) -> Result<(), StorageError> {
    if amount < Kg::ZERO {
        return Err(StorageError::NegativeAmount { amount });
    }
    Ok(())
}

/// Add two masses, mapping overflow to [`StorageError::ArithmeticOverflow`].
pub(crate) fn add(a: Kg, b: Kg, context: &'static str) -> Result<Kg, StorageError> {
    a.checked_add(b)
        .ok_or(StorageError::ArithmeticOverflow { context })
}

/// Subtract two masses, mapping overflow to [`StorageError::ArithmeticOverflow`].
pub(crate) fn sub(a: Kg, b: Kg, context: &'static str) -> Result<Kg, StorageError> {
    a.checked_sub(b)
        .ok_or(StorageError::ArithmeticOverflow { context })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn snap_epsilon_is_one_ten_millionth() {
        assert_eq!(SNAP_EPSILON, dec!(0.0000001));
    }

    #[test]
    fn check_amount_accepts_zero_and_positive() {
        assert!(check_amount(Kg::ZERO).is_ok());
        assert!(check_amount(dec!(0.5)).is_ok());
    }

    #[test]
    fn check_amount_rejects_negative() {
        assert_eq!(
            check_amount(dec!(-1)),
            Err(StorageError::NegativeAmount { amount: dec!(-1) })
        );
    }

    #[test]
    fn overflow_is_reported() {
        assert!(matches!(
            add(Kg::MAX, Kg::ONE, "test"),
            Err(StorageError::ArithmeticOverflow { context: "test" })
        ));
        assert!(matches!(
            sub(Kg::MIN, Kg::ONE, "test"),
            Err(StorageError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn slot_key_display() {
        assert_eq!(SlotKey::Phase(Phase::Gas).to_string(), "gas phase slot");
        assert_eq!(SlotKey::Type(ResourceId(4)).to_string(), "type slot resource#4");
    }
}
