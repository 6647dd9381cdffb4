//! End-to-end storage scenarios against a catalog loaded from the
//! workspace configuration file.
//!
//! Covers the concrete water/grey water/methane scenarios, the capacity,
//! round-trip, atomicity, exclusivity and snapping properties, and a seeded
//! random walk that checks conservation after every operation.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::too_many_lines
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockroom_catalog::{ResourceCatalog, StorageConfig};
use stockroom_store::{transfer, CapacityStore, StorageError, StorageSnapshot};
use stockroom_types::{Kg, OwnerId, Phase, PhaseSlot, ResourceId, TypeSlot};

const CONFIG: &str = include_str!("../../../stockroom-config.yaml");

// =============================================================================
// Helpers
// =============================================================================

fn config() -> StorageConfig {
    StorageConfig::parse(CONFIG).expect("workspace config should parse")
}

fn catalog() -> Arc<ResourceCatalog> {
    Arc::new(config().catalog().expect("workspace catalog should be valid"))
}

fn id(catalog: &ResourceCatalog, name: &str) -> ResourceId {
    catalog
        .find_by_name(name)
        .unwrap_or_else(|| panic!("{name} should be catalogued"))
        .id
}

struct Names {
    water: ResourceId,
    grey_water: ResourceId,
    methane: ResourceId,
    oxygen: ResourceId,
}

fn setup() -> (CapacityStore, Names) {
    let catalog = catalog();
    let names = Names {
        water: id(&catalog, "water"),
        grey_water: id(&catalog, "grey water"),
        methane: id(&catalog, "methane"),
        oxygen: id(&catalog, "oxygen"),
    };
    (CapacityStore::new(OwnerId::new(), catalog), names)
}

fn ledger_state(store: &CapacityStore) -> (Vec<TypeSlot>, Vec<PhaseSlot>) {
    let StorageSnapshot {
        type_slots,
        phase_slots,
        ..
    } = store.snapshot();
    (type_slots, phase_slots)
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn dedicated_capacity_fills_exactly() {
    let (mut store, r) = setup();
    store.add_type_capacity(r.water, dec!(50)).unwrap();

    store.store(r.water, dec!(50)).unwrap();
    assert_eq!(
        store.store(r.water, dec!(0.001)),
        Err(StorageError::CapacityExceeded {
            resource: r.water,
            requested: dec!(0.001),
            remaining: Kg::ZERO,
        })
    );
    assert_eq!(store.stored(r.water), dec!(50));
}

#[test]
fn phase_overflow_blocks_other_liquid() {
    let (mut store, r) = setup();
    store.add_phase_capacity(Phase::Liquid, dec!(20)).unwrap();

    store.store(r.water, dec!(15)).unwrap();
    assert_eq!(
        store.store(r.grey_water, dec!(1)),
        Err(StorageError::PhaseConflict {
            phase: Phase::Liquid,
            resource: r.grey_water,
            occupant: r.water,
        })
    );
}

#[test]
fn drained_phase_slot_accepts_other_liquid() {
    let (mut store, r) = setup();
    store.add_phase_capacity(Phase::Liquid, dec!(20)).unwrap();
    store.store(r.water, dec!(15)).unwrap();

    store.retrieve(r.water, dec!(15)).unwrap();
    assert_eq!(store.phase_occupant(Phase::Liquid), None);

    store.store(r.grey_water, dec!(5)).unwrap();
    assert_eq!(store.stored(r.grey_water), dec!(5));
    assert_eq!(store.phase_occupant(Phase::Liquid), Some(r.grey_water));
}

#[test]
fn retrieving_more_than_stored_changes_nothing() {
    let (mut store, r) = setup();
    store.add_type_capacity(r.methane, dec!(10)).unwrap();
    store.store(r.methane, dec!(4)).unwrap();
    let before = ledger_state(&store);

    assert_eq!(
        store.retrieve(r.methane, dec!(10)),
        Err(StorageError::InsufficientStock {
            resource: r.methane,
            requested: dec!(10),
            stored: dec!(4),
        })
    );
    assert_eq!(ledger_state(&store), before);
}

#[test]
fn removing_too_much_capacity_changes_nothing() {
    let (mut store, r) = setup();
    store.add_type_capacity(r.water, dec!(50)).unwrap();

    assert!(matches!(
        store.remove_type_capacity(r.water, dec!(60)),
        Err(StorageError::CapacityUnderflow { .. })
    ));
    assert_eq!(store.capacity(r.water), dec!(50));
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn round_trip_leaves_totals_unchanged() {
    let (mut store, r) = setup();
    store.add_type_capacity(r.water, dec!(30)).unwrap();
    store.add_phase_capacity(Phase::Liquid, dec!(25)).unwrap();
    store.add_type_capacity(r.oxygen, dec!(8)).unwrap();
    store.store(r.water, dec!(20)).unwrap();
    store.store(r.oxygen, dec!(3)).unwrap();

    for x in [dec!(0), dec!(0.5), dec!(10), dec!(35)] {
        let stored = store.stored(r.water);
        let total = store.total_stored(false);
        assert!(x <= store.remaining(r.water));

        store.store(r.water, x).unwrap();
        store.retrieve(r.water, x).unwrap();

        assert_eq!(store.stored(r.water), stored);
        assert_eq!(store.total_stored(false), total);
    }
}

#[test]
fn failed_store_is_atomic_across_ledgers() {
    let (mut store, r) = setup();
    store.add_type_capacity(r.water, dec!(10)).unwrap();
    store.add_phase_capacity(Phase::Liquid, dec!(10)).unwrap();
    store.store(r.water, dec!(4)).unwrap();
    let before = ledger_state(&store);

    // Would need 6 kg of type capacity plus 11 of the 10 kg phase slot.
    assert!(store.store(r.water, dec!(17)).is_err());
    assert_eq!(ledger_state(&store), before);
    assert!(store.verify().is_sound());
}

#[test]
fn exclusivity_holds_until_slot_is_drained() {
    let (mut store, r) = setup();
    store.add_phase_capacity(Phase::Gas, dec!(15)).unwrap();
    store.add_type_capacity(r.oxygen, dec!(2)).unwrap();

    // Methane overflows into the gas slot.
    store.store(r.methane, dec!(5)).unwrap();

    // Oxygen that fits in its own capacity is fine...
    store.store(r.oxygen, dec!(2)).unwrap();
    // ...but any oxygen that needs the slot is refused.
    assert!(matches!(
        store.store(r.oxygen, dec!(0.5)),
        Err(StorageError::PhaseConflict { .. })
    ));

    store.retrieve(r.methane, dec!(5)).unwrap();
    store.store(r.oxygen, dec!(15)).unwrap();
    assert_eq!(store.stored(r.oxygen), dec!(17));
}

#[test]
fn trace_residue_does_not_block_slot() {
    let (mut store, r) = setup();
    store.add_phase_capacity(Phase::Liquid, dec!(20)).unwrap();

    store.store(r.water, dec!(7.00000008)).unwrap();
    store.retrieve(r.water, dec!(7)).unwrap();

    assert_eq!(store.stored(r.water), Kg::ZERO);
    store.store(r.grey_water, dec!(20)).unwrap();
    assert_eq!(store.remaining(r.grey_water), Kg::ZERO);
}

// =============================================================================
// Profiles and persistence
// =============================================================================

#[test]
fn configured_profiles_build_stores() {
    let config = config();
    let catalog = catalog();

    let rover_profile = config.profile("rover").unwrap().resolve(&catalog).unwrap();
    let mut rover =
        CapacityStore::with_profile(OwnerId::new(), Arc::clone(&catalog), &rover_profile).unwrap();
    let water = id(&catalog, "water");
    let regolith = id(&catalog, "regolith");

    assert_eq!(rover.capacity(water), dec!(500));
    assert_eq!(rover.capacity(regolith), dec!(1500));
    rover.store(regolith, dec!(1200)).unwrap();
    assert_eq!(rover.phase_occupant(Phase::Solid), Some(regolith));

    let barrel_profile = config.profile("barrel").unwrap().resolve(&catalog).unwrap();
    let mut barrel =
        CapacityStore::with_profile(OwnerId::new(), Arc::clone(&catalog), &barrel_profile).unwrap();

    rover.store(water, dec!(300)).unwrap();
    transfer(&mut rover, &mut barrel, water, dec!(150)).unwrap();
    assert_eq!(barrel.stored(water), dec!(150));
    assert_eq!(rover.stored(water), dec!(150));
}

#[test]
fn snapshot_survives_json_and_restores_verbatim() {
    let (mut store, r) = setup();
    store.add_type_capacity(r.water, dec!(30)).unwrap();
    store.add_phase_capacity(Phase::Liquid, dec!(25)).unwrap();
    store.add_phase_capacity(Phase::Gas, dec!(5)).unwrap();
    store.store(r.water, dec!(41.25)).unwrap();
    store.store(r.methane, dec!(4)).unwrap();

    let json = serde_json::to_string_pretty(&store.snapshot()).unwrap();
    let snapshot: StorageSnapshot = serde_json::from_str(&json).unwrap();
    let mut restored = CapacityStore::restore(catalog(), snapshot).unwrap();

    assert_eq!(ledger_state(&restored), ledger_state(&store));
    assert_eq!(restored.total_stored(false), store.total_stored(false));
    assert_eq!(
        restored.all_stored_resources(false),
        store.all_stored_resources(false)
    );
}

// =============================================================================
// Random walk
// =============================================================================

#[test]
fn random_walk_conserves_every_kilogram() {
    let (mut store, r) = setup();
    store.add_type_capacity(r.water, dec!(30)).unwrap();
    store.add_type_capacity(r.methane, dec!(10)).unwrap();
    store.add_phase_capacity(Phase::Liquid, dec!(25)).unwrap();
    store.add_phase_capacity(Phase::Gas, dec!(15)).unwrap();

    let resources = [r.water, r.grey_water, r.methane, r.oxygen];
    let mut expected: BTreeMap<ResourceId, Kg> =
        resources.iter().map(|resource| (*resource, Kg::ZERO)).collect();
    let mut rng = SmallRng::seed_from_u64(0x5709_4000);

    for step in 0..2_000 {
        let resource = resources[rng.random_range(0..resources.len())];
        // Hundredths of a kilogram never leave a residue below the snap
        // threshold, so the model can track amounts exactly.
        let amount = Decimal::new(rng.random_range(0..=2_000), 2);
        let storing = rng.random_bool(0.5);
        let before = ledger_state(&store);

        let result = if storing {
            store.store(resource, amount)
        } else {
            store.retrieve(resource, amount)
        };

        match result {
            Ok(()) => {
                let held = expected.entry(resource).or_insert(Kg::ZERO);
                if storing {
                    *held += amount;
                } else {
                    *held -= amount;
                }
            }
            Err(_) => assert_eq!(
                ledger_state(&store),
                before,
                "step {step}: failed call mutated state"
            ),
        }

        for candidate in resources {
            let stored = store.stored(candidate);
            assert!(stored >= Kg::ZERO, "step {step}: negative stock");
            assert!(
                stored <= store.capacity(candidate),
                "step {step}: {candidate} over capacity"
            );
            assert_eq!(stored, expected[&candidate], "step {step}: {candidate} drifted");
        }

        let total: Kg = expected.values().copied().sum();
        assert_eq!(store.total_stored(false), total, "step {step}: total drifted");
    }

    assert!(store.verify().is_sound());
}
