//! Cascading constraint-relaxation tiers.
//!
//! Placement fallback and repair each run their own ladder over one
//! shared tier set: try the tiers in order, stop at the first that
//! yields a slot. Blocked time ranges stay
//! hard for physical sessions at every tier; only the soft signals
//! (stated days, preferred times) loosen.

use serde::{Deserialize, Serialize};

/// A named constraint level, loosest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelaxationTier {
    /// Stated days only, session inside a preferred time range.
    PreferredSlot,
    /// Any day, session inside a preferred time range.
    PreferredTime,
    /// Stated days only, any legal time.
    AvailableDay,
    /// Any day, any legal time. Hard blocks and physical conflicts only.
    AnyDay,
    /// Take over another section's slot after relocating it.
    Swap,
}

impl RelaxationTier {
    /// Ladder used by first-pass placement fallback.
    pub const PLACEMENT: [RelaxationTier; 3] = [
        RelaxationTier::PreferredSlot,
        RelaxationTier::PreferredTime,
        RelaxationTier::AnyDay,
    ];

    /// Ladder used by the repair engine.
    pub const REPAIR: [RelaxationTier; 4] = [
        RelaxationTier::PreferredSlot,
        RelaxationTier::AvailableDay,
        RelaxationTier::AnyDay,
        RelaxationTier::Swap,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            RelaxationTier::PreferredSlot => "preferred-slot",
            RelaxationTier::PreferredTime => "preferred-time",
            RelaxationTier::AvailableDay => "available-day",
            RelaxationTier::AnyDay => "any-day",
            RelaxationTier::Swap => "swap",
        }
    }
}

/// Tries `attempt` against each tier in order, returning the first hit
/// together with the tier that produced it.
pub fn try_tiers<T>(
    tiers: &[RelaxationTier],
    mut attempt: impl FnMut(RelaxationTier) -> Option<T>,
) -> Option<(RelaxationTier, T)> {
    for &tier in tiers {
        if let Some(found) = attempt(tier) {
            return Some((tier, found));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_at_first_success() {
        let mut attempts = Vec::new();
        let found = try_tiers(&RelaxationTier::PLACEMENT, |tier| {
            attempts.push(tier);
            if tier == RelaxationTier::PreferredTime {
                Some("slot")
            } else {
                None
            }
        });
        assert_eq!(found, Some((RelaxationTier::PreferredTime, "slot")));
        assert_eq!(
            attempts,
            vec![RelaxationTier::PreferredSlot, RelaxationTier::PreferredTime]
        );
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let found: Option<(RelaxationTier, ())> = try_tiers(&RelaxationTier::REPAIR, |_| None);
        assert!(found.is_none());
    }

    #[test]
    fn test_repair_ladder_ends_in_swap() {
        assert_eq!(RelaxationTier::REPAIR.last(), Some(&RelaxationTier::Swap));
        assert_eq!(RelaxationTier::PLACEMENT.len(), 3);
    }
}
