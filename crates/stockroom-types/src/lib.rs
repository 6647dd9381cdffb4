//! Shared type definitions for the Stockroom capacity-accounting engine.
//!
//! This crate is the single source of truth for the vocabulary shared by the
//! catalog, the ledgers, and the capacity store.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed identifiers for resources and storage owners
//! - [`enums`] -- Material phase classification
//! - [`structs`] -- Plain ledger slot records used for views and snapshots

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::Phase;
pub use ids::{OwnerId, ResourceId};
pub use structs::{PhaseSlot, TypeSlot};

/// A mass in kilograms.
///
/// Masses are exact decimals. Floating point is never used for stored
/// amounts so that repeated store/retrieve cycles cannot create or destroy
/// material through rounding.
pub type Kg = rust_decimal::Decimal;
