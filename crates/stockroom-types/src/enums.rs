//! Enumeration types for the storage engine.

use serde::{Deserialize, Serialize};

/// Material phase of an amount resource.
///
/// Resources of the same phase share a physical storage medium (a gas tank,
/// a liquid tank, a bin), which is why phase capacity is pooled per phase
/// and can only hold one substance at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Gases such as oxygen, methane, and carbon dioxide.
    Gas,
    /// Liquids such as water and grey water.
    Liquid,
    /// Solids such as regolith, ice, and food.
    Solid,
}

impl Phase {
    /// Every phase, in declaration order.
    pub const ALL: [Self; 3] = [Self::Gas, Self::Liquid, Self::Solid];

    /// Lowercase display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gas => "gas",
            Self::Liquid => "liquid",
            Self::Solid => "solid",
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_phases_listed_once() {
        assert_eq!(Phase::ALL.len(), 3);
        assert!(Phase::ALL.contains(&Phase::Gas));
        assert!(Phase::ALL.contains(&Phase::Liquid));
        assert!(Phase::ALL.contains(&Phase::Solid));
    }

    #[test]
    fn phase_serializes_by_variant_name() {
        let json = serde_json::to_string(&Phase::Liquid).ok();
        assert_eq!(json.as_deref(), Some("\"Liquid\""));
    }

    #[test]
    fn phase_display_is_lowercase() {
        assert_eq!(Phase::Gas.to_string(), "gas");
    }
}
