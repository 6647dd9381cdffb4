//! Type-safe identifier wrappers.
//!
//! Storage owners (settlements, vehicles, containers) are identified by UUID
//! v7 values. Resources are identified by the small integer key assigned in
//! the resource catalog; the integer is the one canonical key used by every
//! ledger.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner of a capacity store: a settlement, vehicle, or container.
///
/// Fresh ids are UUID v7, so they sort by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// A new, time-ordered owner id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "owner:{}", self.0)
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Catalog identity of an amount resource (water, oxygen, regolith, ...).
///
/// Opaque to the storage engine: two ids are the same resource if and only
/// if their keys are equal. The phase of a resource is looked up in the
/// catalog, never encoded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u32);

impl ResourceId {
    /// Return the raw catalog key.
    pub const fn key(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

impl From<u32> for ResourceId {
    fn from(key: u32) -> Self {
        Self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_ids_are_unique() {
        assert_ne!(OwnerId::new(), OwnerId::new());
    }

    #[test]
    fn owner_id_wraps_uuid() {
        let raw = Uuid::now_v7();
        let id = OwnerId::from(raw);
        assert_eq!(id.as_uuid(), &raw);
        assert_eq!(id.to_string(), format!("owner:{raw}"));
    }

    #[test]
    fn owner_id_serializes_as_bare_uuid() {
        let raw = Uuid::now_v7();
        let json = serde_json::to_string(&OwnerId::from(raw)).ok();
        assert_eq!(json, Some(format!("\"{raw}\"")));
    }

    #[test]
    fn resource_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&ResourceId(7)).ok();
        assert_eq!(json.as_deref(), Some("7"));
    }

    #[test]
    fn resource_id_display() {
        assert_eq!(ResourceId(42).to_string(), "resource#42");
    }
}
