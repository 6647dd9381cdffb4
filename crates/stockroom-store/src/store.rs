//! The capacity store: one owner's view over its type and phase ledgers.
//!
//! # Store
//!
//! ```text
//! remaining(r) >= amount            else CapacityExceeded / PhaseConflict
//! type_part  = min(amount, type remaining(r))
//! phase_part = amount - type_part   (into the phase slot of r)
//! ```
//!
//! # Retrieve
//!
//! ```text
//! stored(r) >= amount               else InsufficientStock
//! phase_part = min(amount, phase stored(r))
//! type_part  = amount - phase_part
//! ```
//!
//! Both operations validate against the combined capacity or stock before
//! touching either ledger, so a failure never leaves one half applied.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use stockroom_catalog::{ResolvedProfile, ResourceCatalog};
use stockroom_ledger::{
    check_amount, AuditResult, PhaseLedger, StorageError, TypeLedger, SNAP_EPSILON,
};
use stockroom_types::{Kg, OwnerId, Phase, ResourceId};

use crate::cache::Cached;

/// How an accepted store or retrieve was split between the two ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Split {
    type_part: Kg,
    phase_part: Kg,
}

/// Capacity accounting for the amount resources of a single owner.
///
/// Not synchronized: the simulation serializes all calls for one owner.
/// Owners that must be shared across threads should each be wrapped in
/// their own lock.
#[derive(Debug, Clone)]
pub struct CapacityStore {
    owner: OwnerId,
    catalog: Arc<ResourceCatalog>,
    pub(crate) types: TypeLedger,
    pub(crate) phases: PhaseLedger,
    total_stored: Cached<Kg>,
    stored_resources: Cached<BTreeSet<ResourceId>>,
}

impl CapacityStore {
    /// Create an empty store for `owner`.
    pub fn new(owner: OwnerId, catalog: Arc<ResourceCatalog>) -> Self {
        Self {
            owner,
            catalog,
            types: TypeLedger::new(),
            phases: PhaseLedger::new(),
            total_stored: Cached::fresh(Kg::ZERO),
            stored_resources: Cached::fresh(BTreeSet::new()),
        }
    }

    /// Create a store and give it the capacities of a configured profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if the profile carries a
    /// negative capacity.
    pub fn with_profile(
        owner: OwnerId,
        catalog: Arc<ResourceCatalog>,
        profile: &ResolvedProfile,
    ) -> Result<Self, StorageError> {
        let mut store = Self::new(owner, catalog);
        for (resource, capacity) in &profile.type_capacities {
            store.add_type_capacity(*resource, *capacity)?;
        }
        for (phase, capacity) in &profile.phase_capacities {
            store.add_phase_capacity(*phase, *capacity)?;
        }
        Ok(store)
    }

    /// Assemble a store from already-validated ledgers. Derived values
    /// start stale.
    pub(crate) fn from_parts(
        owner: OwnerId,
        catalog: Arc<ResourceCatalog>,
        types: TypeLedger,
        phases: PhaseLedger,
    ) -> Self {
        Self {
            owner,
            catalog,
            types,
            phases,
            total_stored: Cached::stale(Kg::ZERO),
            stored_resources: Cached::stale(BTreeSet::new()),
        }
    }

    /// The owner of this store.
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The catalog this store resolves phases with.
    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.catalog
    }

    /// Phase of a resource, or `None` for an uncatalogued id.
    ///
    /// Uncatalogued resources can only use type capacity.
    fn phase_of(&self, resource: ResourceId) -> Option<Phase> {
        self.catalog.phase_of(resource)
    }

    /// Phase lookup for store and retrieve, which warn once per call about
    /// an uncatalogued resource.
    fn routed_phase(&self, resource: ResourceId) -> Option<Phase> {
        let phase = self.phase_of(resource);
        if phase.is_none() {
            tracing::warn!(
                owner = %self.owner,
                %resource,
                "Resource not in catalog; phase capacity unavailable"
            );
        }
        phase
    }

    fn capacity_in(&self, resource: ResourceId, phase: Option<Phase>) -> Kg {
        let dedicated = self.types.capacity(resource);
        match phase {
            Some(phase) if self.phases.admits(phase, resource) => {
                dedicated.saturating_add(self.phases.capacity(phase))
            }
            _ => dedicated,
        }
    }

    fn stored_in(&self, resource: ResourceId, phase: Option<Phase>) -> Kg {
        let dedicated = self.types.stored(resource);
        match phase {
            Some(phase) => dedicated.saturating_add(self.phases.stored_for(phase, resource)),
            None => dedicated,
        }
    }

    // -----------------------------------------------------------------------
    // Capacity configuration
    // -----------------------------------------------------------------------

    /// Add dedicated capacity for a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `kg` is negative.
    pub fn add_type_capacity(&mut self, resource: ResourceId, kg: Kg) -> Result<(), StorageError> {
        self.types.add_capacity(resource, kg)
    }

    /// Remove dedicated capacity from a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`],
    /// [`StorageError::CapacityUnderflow`], or
    /// [`StorageError::CapacityInUse`]; capacity is unchanged on error.
    pub fn remove_type_capacity(&mut self, resource: ResourceId, kg: Kg) -> Result<(), StorageError> {
        self.types.remove_capacity(resource, kg)
    }

    /// Add shared capacity for a phase.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] if `kg` is negative.
    pub fn add_phase_capacity(&mut self, phase: Phase, kg: Kg) -> Result<(), StorageError> {
        self.phases.add_capacity(phase, kg)
    }

    /// Remove shared capacity from a phase.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`],
    /// [`StorageError::CapacityUnderflow`], or
    /// [`StorageError::CapacityInUse`]; capacity is unchanged on error.
    pub fn remove_phase_capacity(&mut self, phase: Phase, kg: Kg) -> Result<(), StorageError> {
        self.phases.remove_capacity(phase, kg)
    }

    /// Dedicated capacity per resource.
    pub fn type_capacities(&self) -> BTreeMap<ResourceId, Kg> {
        self.types.capacities()
    }

    /// Shared capacity per phase.
    pub fn phase_capacities(&self) -> BTreeMap<Phase, Kg> {
        self.phases.capacities()
    }

    /// The resource currently holding a phase slot.
    pub fn phase_occupant(&self, phase: Phase) -> Option<ResourceId> {
        self.phases.occupant(phase)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether the resource has any capacity here: dedicated capacity, or
    /// shared capacity for its phase (whoever holds the slot right now).
    pub fn has_capacity(&self, resource: ResourceId) -> bool {
        self.types.has_capacity(resource)
            || self
                .phase_of(resource)
                .is_some_and(|phase| self.phases.has_capacity(phase))
    }

    /// Total capacity usable by the resource right now.
    ///
    /// Dedicated capacity plus the phase slot's capacity if the slot is
    /// free or already held by this resource.
    pub fn capacity(&self, resource: ResourceId) -> Kg {
        self.capacity_in(resource, self.phase_of(resource))
    }

    /// Total amount of the resource held, across both ledgers.
    pub fn stored(&self, resource: ResourceId) -> Kg {
        self.stored_in(resource, self.phase_of(resource))
    }

    /// Capacity still available to the resource.
    pub fn remaining(&self, resource: ResourceId) -> Kg {
        self.capacity(resource).saturating_sub(self.stored(resource))
    }

    /// Whether nothing at all is stored.
    pub fn is_empty(&self) -> bool {
        self.types.total_stored().is_zero() && self.phases.total_stored().is_zero()
    }

    /// Total mass stored across every resource.
    ///
    /// With `allow_stale` the last computed value is returned even if
    /// stores or retrievals happened since; otherwise it is recomputed if
    /// needed.
    pub fn total_stored(&mut self, allow_stale: bool) -> Kg {
        let types = &self.types;
        let phases = &self.phases;
        self.total_stored.get(allow_stale, || {
            types.total_stored().saturating_add(phases.total_stored())
        })
    }

    /// Every resource with a nonzero stored amount.
    ///
    /// `allow_stale` has the same meaning as for [`total_stored`].
    ///
    /// [`total_stored`]: CapacityStore::total_stored
    pub fn all_stored_resources(&mut self, allow_stale: bool) -> BTreeSet<ResourceId> {
        let types = &self.types;
        let phases = &self.phases;
        self.stored_resources.get(allow_stale, || {
            let mut resources = types.stored_resources();
            resources.extend(phases.stored_resources());
            resources
        })
    }

    /// Mark every derived value stale so the next strict read recomputes
    /// it from the ledgers.
    pub const fn rebuild_derived(&mut self) {
        self.total_stored.invalidate();
        self.stored_resources.invalidate();
    }

    /// Audit both ledgers for broken invariants.
    pub fn verify(&self) -> AuditResult {
        stockroom_ledger::audit::audit(&self.types, &self.phases)
    }

    // -----------------------------------------------------------------------
    // Store / retrieve
    // -----------------------------------------------------------------------

    /// Store an amount of a resource, filling dedicated capacity first and
    /// overflowing into the phase slot.
    ///
    /// Amounts at or below [`SNAP_EPSILON`] are accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] for a negative amount,
    /// [`StorageError::PhaseConflict`] if the amount does not fit in
    /// dedicated capacity and the phase slot is held by another resource,
    /// or [`StorageError::CapacityExceeded`] if it does not fit otherwise.
    /// Nothing changes on error.
    pub fn store(&mut self, resource: ResourceId, amount: Kg) -> Result<(), StorageError> {
        match self.try_store(resource, amount) {
            Ok(split) => {
                if !split.type_part.is_zero() || !split.phase_part.is_zero() {
                    self.rebuild_derived();
                    tracing::debug!(
                        owner = %self.owner,
                        %resource,
                        %amount,
                        type_part = %split.type_part,
                        phase_part = %split.phase_part,
                        "Stored resource"
                    );
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(owner = %self.owner, %resource, %amount, %err, "Store rejected");
                Err(err)
            }
        }
    }

    fn try_store(&mut self, resource: ResourceId, amount: Kg) -> Result<Split, StorageError> {
        check_amount(amount)?;
        if amount <= SNAP_EPSILON {
            return Ok(Split {
                type_part: Kg::ZERO,
                phase_part: Kg::ZERO,
            });
        }

        let phase = self.routed_phase(resource);
        let remaining = self
            .capacity_in(resource, phase)
            .saturating_sub(self.stored_in(resource, phase));
        if amount > remaining {
            return Err(self.rejection(resource, phase, amount, remaining));
        }

        let type_part = amount.min(self.types.remaining(resource));
        let phase_part = amount.saturating_sub(type_part);

        self.types.store(resource, type_part)?;
        if phase_part > Kg::ZERO {
            let stored = match phase {
                Some(phase) => self.phases.store(phase, resource, phase_part),
                None => Err(StorageError::CapacityExceeded {
                    resource,
                    requested: amount,
                    remaining,
                }),
            };
            if let Err(err) = stored {
                // Undo the dedicated half so the call has no effect.
                self.types.retrieve(resource, type_part)?;
                return Err(err);
            }
        }

        Ok(Split {
            type_part,
            phase_part,
        })
    }

    /// Pick the error for a store that does not fit.
    fn rejection(
        &self,
        resource: ResourceId,
        phase: Option<Phase>,
        amount: Kg,
        remaining: Kg,
    ) -> StorageError {
        let holder = phase.and_then(|phase| {
            self.phases
                .occupant(phase)
                .map(|occupant| (phase, occupant))
        });
        match holder {
            Some((phase, occupant)) if occupant != resource => StorageError::PhaseConflict {
                phase,
                resource,
                occupant,
            },
            _ => StorageError::CapacityExceeded {
                resource,
                requested: amount,
                remaining,
            },
        }
    }

    /// Retrieve an amount of a resource, draining the phase slot first and
    /// dedicated capacity second.
    ///
    /// An amount at or below [`SNAP_EPSILON`] that is covered by stock is
    /// accepted and ignored, which keeps retrieve symmetric with [`store`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NegativeAmount`] for a negative amount, or
    /// [`StorageError::InsufficientStock`] if less is stored across both
    /// ledgers. Nothing changes on error.
    ///
    /// [`store`]: CapacityStore::store
    pub fn retrieve(&mut self, resource: ResourceId, amount: Kg) -> Result<(), StorageError> {
        match self.try_retrieve(resource, amount) {
            Ok(split) => {
                if !split.type_part.is_zero() || !split.phase_part.is_zero() {
                    self.rebuild_derived();
                    tracing::debug!(
                        owner = %self.owner,
                        %resource,
                        %amount,
                        type_part = %split.type_part,
                        phase_part = %split.phase_part,
                        "Retrieved resource"
                    );
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(owner = %self.owner, %resource, %amount, %err, "Retrieve rejected");
                Err(err)
            }
        }
    }

    fn try_retrieve(&mut self, resource: ResourceId, amount: Kg) -> Result<Split, StorageError> {
        check_amount(amount)?;

        let phase = self.routed_phase(resource);
        let stored = self.stored_in(resource, phase);
        if amount > stored {
            return Err(StorageError::InsufficientStock {
                resource,
                requested: amount,
                stored,
            });
        }
        if amount <= SNAP_EPSILON {
            return Ok(Split {
                type_part: Kg::ZERO,
                phase_part: Kg::ZERO,
            });
        }

        let in_phase = phase.map_or(Kg::ZERO, |phase| self.phases.stored_for(phase, resource));
        let phase_part = amount.min(in_phase);
        let type_part = amount.saturating_sub(phase_part);

        if let Some(phase) = phase {
            self.phases.retrieve(phase, resource, phase_part)?;
            if let Err(err) = self.types.retrieve(resource, type_part) {
                // Put the phase half back so the call has no effect.
                self.phases.store(phase, resource, phase_part)?;
                return Err(err);
            }
        } else {
            self.types.retrieve(resource, type_part)?;
        }

        Ok(Split {
            type_part,
            phase_part,
        })
    }
}
