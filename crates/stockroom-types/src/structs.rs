//! Plain records describing individual ledger slots.
//!
//! These are the unit of exchange between the ledgers and the outside world:
//! read-only views hand them out, and snapshots are lists of them. They carry
//! no behavior and enforce no invariants on their own; the ledgers validate
//! them on restore.

use serde::{Deserialize, Serialize};

use crate::{Kg, Phase, ResourceId};

/// Dedicated storage for one specific resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    /// The resource this capacity is reserved for.
    pub resource: ResourceId,
    /// Capacity in kilograms.
    pub capacity: Kg,
    /// Amount currently stored in kilograms.
    pub stored: Kg,
}

/// Shared storage for one phase, held by at most one resource at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSlot {
    /// The phase this capacity serves.
    pub phase: Phase,
    /// Capacity in kilograms.
    pub capacity: Kg,
    /// The resource currently occupying the slot, if any.
    pub occupant: Option<ResourceId>,
    /// Amount of the occupant stored in kilograms.
    pub stored: Kg,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn phase_slot_json_shape() {
        let slot = PhaseSlot {
            phase: Phase::Gas,
            capacity: dec!(20),
            occupant: Some(ResourceId(3)),
            stored: dec!(4.5),
        };
        let json = serde_json::to_value(&slot).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "phase": "Gas",
                "capacity": "20",
                "occupant": 3,
                "stored": "4.5",
            }))
        );
    }
}
