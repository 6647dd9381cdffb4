//! Error types for the `stockroom-catalog` crate.

use stockroom_types::{Kg, ResourceId};

/// Errors raised while building a catalog or resolving a storage profile.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two definitions share the same id.
    #[error("duplicate resource id: {0}")]
    DuplicateId(ResourceId),

    /// Two definitions share the same name.
    #[error("duplicate resource name: {0}")]
    DuplicateName(String),

    /// A definition has an empty or whitespace-only name.
    #[error("resource {0} has an empty name")]
    EmptyName(ResourceId),

    /// A profile refers to a resource name the catalog does not know.
    #[error("unknown resource name: {0}")]
    UnknownResource(String),

    /// A profile name is not present in the configuration.
    #[error("unknown storage profile: {0}")]
    UnknownProfile(String),

    /// A profile declares a negative capacity.
    #[error("negative capacity {capacity} for {target}")]
    NegativeCapacity {
        /// The resource or phase the capacity was declared for.
        target: String,
        /// The offending capacity.
        capacity: Kg,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The parsed catalog is not internally consistent.
    #[error("invalid resource catalog: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}
