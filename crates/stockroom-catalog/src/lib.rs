//! Resource catalog and storage configuration for the Stockroom engine.
//!
//! The catalog is loaded once from configuration and never mutated by the
//! storage engine. It answers the one question the engine needs from it:
//! which [`Phase`] does a resource belong to.
//!
//! # Modules
//!
//! - [`catalog`] -- [`ResourceCatalog`] and [`ResourceDefinition`].
//! - [`config`] -- YAML loading of the catalog plus named storage profiles.
//! - [`error`] -- [`CatalogError`] and [`ConfigError`].
//!
//! [`Phase`]: stockroom_types::Phase

pub mod catalog;
pub mod config;
pub mod error;

pub use catalog::{ResourceCatalog, ResourceDefinition};
pub use config::{ResolvedProfile, StorageConfig, StorageProfile};
pub use error::{CatalogError, ConfigError};
