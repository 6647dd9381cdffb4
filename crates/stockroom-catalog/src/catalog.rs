//! The resource catalog: identity, name, and phase of every amount resource.
//!
//! Built once at startup and shared (behind an `Arc`) by every capacity
//! store in the run. Lookups are pure and stable for the lifetime of the
//! catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stockroom_types::{Phase, ResourceId};

use crate::error::CatalogError;

/// Definition of one amount resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Canonical identity.
    pub id: ResourceId,
    /// Unique display name (e.g. `"water"`).
    pub name: String,
    /// Material phase, which decides the shared phase slot the resource
    /// may overflow into.
    pub phase: Phase,
    /// Whether the resource can be eaten.
    #[serde(default)]
    pub edible: bool,
    /// Whether the resource is consumed by life support.
    #[serde(default)]
    pub life_support: bool,
}

/// Immutable lookup table of resource definitions.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    by_id: BTreeMap<ResourceId, ResourceDefinition>,
    by_name: BTreeMap<String, ResourceId>,
}

impl ResourceCatalog {
    /// Build a catalog from a list of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`], [`CatalogError::DuplicateName`],
    /// or [`CatalogError::EmptyName`] if the definitions are inconsistent.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = ResourceDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        for definition in definitions {
            if definition.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(definition.id));
            }
            if catalog.by_id.contains_key(&definition.id) {
                return Err(CatalogError::DuplicateId(definition.id));
            }
            if catalog.by_name.contains_key(&definition.name) {
                return Err(CatalogError::DuplicateName(definition.name));
            }

            catalog
                .by_name
                .insert(definition.name.clone(), definition.id);
            catalog.by_id.insert(definition.id, definition);
        }

        Ok(catalog)
    }

    /// Look up a definition by id.
    pub fn get(&self, id: ResourceId) -> Option<&ResourceDefinition> {
        self.by_id.get(&id)
    }

    /// The phase of a resource, or `None` if the id is not catalogued.
    pub fn phase_of(&self, id: ResourceId) -> Option<Phase> {
        self.by_id.get(&id).map(|definition| definition.phase)
    }

    /// Look up a definition by its unique name.
    pub fn find_by_name(&self, name: &str) -> Option<&ResourceDefinition> {
        self.by_name.get(name).and_then(|id| self.by_id.get(id))
    }

    /// Number of catalogued resources.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the catalog has no resources.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterate definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.by_id.values()
    }

    /// Ids of every resource of the given phase, in id order.
    pub fn ids_in_phase(&self, phase: Phase) -> Vec<ResourceId> {
        self.by_id
            .values()
            .filter(|definition| definition.phase == phase)
            .map(|definition| definition.id)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn def(id: u32, name: &str, phase: Phase) -> ResourceDefinition {
        ResourceDefinition {
            id: ResourceId(id),
            name: name.to_owned(),
            phase,
            edible: false,
            life_support: false,
        }
    }

    fn sample() -> ResourceCatalog {
        ResourceCatalog::from_definitions([
            def(1, "water", Phase::Liquid),
            def(2, "grey water", Phase::Liquid),
            def(3, "methane", Phase::Gas),
            def(4, "regolith", Phase::Solid),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_by_id_and_name() {
        let catalog = sample();

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.phase_of(ResourceId(3)), Some(Phase::Gas));
        assert_eq!(
            catalog.find_by_name("grey water").map(|d| d.id),
            Some(ResourceId(2))
        );
        assert_eq!(
            catalog.get(ResourceId(4)).map(|d| d.name.as_str()),
            Some("regolith")
        );
    }

    #[test]
    fn unknown_id_has_no_phase() {
        let catalog = sample();
        assert_eq!(catalog.phase_of(ResourceId(99)), None);
        assert!(catalog.find_by_name("plutonium").is_none());
    }

    #[test]
    fn ids_in_phase_are_ordered() {
        let catalog = sample();
        assert_eq!(
            catalog.ids_in_phase(Phase::Liquid),
            vec![ResourceId(1), ResourceId(2)]
        );
        assert!(catalog.ids_in_phase(Phase::Gas).contains(&ResourceId(3)));
    }

    #[test]
    fn duplicate_id_rejected() {
        let result = ResourceCatalog::from_definitions([
            def(1, "water", Phase::Liquid),
            def(1, "ice", Phase::Solid),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(ResourceId(1)))));
    }

    #[test]
    fn duplicate_name_rejected() {
        let result = ResourceCatalog::from_definitions([
            def(1, "water", Phase::Liquid),
            def(2, "water", Phase::Solid),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateName(_))));
    }

    #[test]
    fn empty_name_rejected() {
        let result = ResourceCatalog::from_definitions([def(5, "  ", Phase::Gas)]);
        assert!(matches!(result, Err(CatalogError::EmptyName(ResourceId(5)))));
    }

    #[test]
    fn empty_catalog() {
        let catalog = ResourceCatalog::from_definitions([]);
        assert!(catalog.is_ok_and(|c| c.is_empty()));
    }
}
