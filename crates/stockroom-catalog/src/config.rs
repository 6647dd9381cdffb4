//! Configuration loading for the resource catalog and storage profiles.
//!
//! The canonical configuration lives in `stockroom-config.yaml` at the
//! workspace root. It declares every amount resource once, and a set of
//! named storage profiles describing how much type and phase capacity a
//! kind of owner (settlement, rover, canister...) is built with.
//!
//! Profiles refer to resources by name so the YAML stays readable; they are
//! resolved to [`ResourceId`] keys against the catalog before use.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use stockroom_types::{Kg, Phase, ResourceId};

use crate::catalog::{ResourceCatalog, ResourceDefinition};
use crate::error::{CatalogError, ConfigError};

/// Top-level storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Every amount resource known to the simulation.
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,

    /// Named capacity profiles, keyed by profile name.
    #[serde(default)]
    pub profiles: BTreeMap<String, StorageProfile>,
}

impl StorageConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Catalog`] if the resource list is inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Catalog`] if the resource list is inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        // Fail at load time rather than when the first store is built.
        config.catalog()?;
        tracing::debug!(
            resources = config.resources.len(),
            profiles = config.profiles.len(),
            "Loaded storage configuration"
        );
        Ok(config)
    }

    /// Build the resource catalog declared by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the resource list is inconsistent.
    pub fn catalog(&self) -> Result<ResourceCatalog, CatalogError> {
        ResourceCatalog::from_definitions(self.resources.iter().cloned())
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProfile`] if no such profile exists.
    pub fn profile(&self, name: &str) -> Result<&StorageProfile, CatalogError> {
        self.profiles
            .get(name)
            .ok_or_else(|| CatalogError::UnknownProfile(name.to_owned()))
    }
}

/// Capacities an owner is built with, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageProfile {
    /// Dedicated capacity per resource name, in kilograms.
    #[serde(default)]
    pub type_capacities: BTreeMap<String, Kg>,

    /// Shared capacity per phase, in kilograms.
    #[serde(default)]
    pub phase_capacities: BTreeMap<Phase, Kg>,
}

impl StorageProfile {
    /// Resolve resource names to catalog ids and validate capacities.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownResource`] for a name missing from the
    /// catalog, or [`CatalogError::NegativeCapacity`] for a negative value.
    pub fn resolve(&self, catalog: &ResourceCatalog) -> Result<ResolvedProfile, CatalogError> {
        let mut type_capacities = BTreeMap::new();
        for (name, capacity) in &self.type_capacities {
            let definition = catalog
                .find_by_name(name)
                .ok_or_else(|| CatalogError::UnknownResource(name.clone()))?;
            if *capacity < Kg::ZERO {
                return Err(CatalogError::NegativeCapacity {
                    target: name.clone(),
                    capacity: *capacity,
                });
            }
            type_capacities.insert(definition.id, *capacity);
        }

        let mut phase_capacities = BTreeMap::new();
        for (phase, capacity) in &self.phase_capacities {
            if *capacity < Kg::ZERO {
                return Err(CatalogError::NegativeCapacity {
                    target: phase.to_string(),
                    capacity: *capacity,
                });
            }
            phase_capacities.insert(*phase, *capacity);
        }

        Ok(ResolvedProfile {
            type_capacities,
            phase_capacities,
        })
    }
}

/// A [`StorageProfile`] with resource names resolved to catalog ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProfile {
    /// Dedicated capacity per resource.
    pub type_capacities: BTreeMap<ResourceId, Kg>,
    /// Shared capacity per phase.
    pub phase_capacities: BTreeMap<Phase, Kg>,
}
