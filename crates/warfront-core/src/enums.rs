//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Unit health lifecycle state.
///
/// Transitions are one-way: `Alive -> Dying -> Dead`. A pooled slot that
/// is reused starts over as a fresh unit identity, not a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    #[default]
    Alive,
    /// Kill has been enqueued; death effects are in flight.
    Dying,
    /// Reclaim finished; the slot is ready to return to the pool.
    Dead,
}

/// Unit archetype. Dispatch happens through capability components plus
/// this closed set, not through an inheritance chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    #[default]
    Vehicle,
    Building,
    Aircraft,
}

/// Which machine this simulation instance is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetRole {
    /// No network session; this instance is fully authoritative.
    #[default]
    SinglePlayer,
    /// Authoritative machine in a network session.
    Host,
    /// Non-authoritative machine; consumes orders issued by the host.
    Client,
}

/// Who issued the current attack order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiOrderState {
    /// No order pending.
    #[default]
    None,
    /// Order issued by the AI driver.
    AiIssued,
    /// Order issued by a player or the network layer.
    NonAiIssued,
}

/// Where an attack order originated. Carried on network commands so the
/// receiving side can reproduce move-to behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderOrigin {
    #[default]
    Ai,
    Player,
}

/// Bitmask of target categories a unit is willing to attack.
///
/// A unit is a valid target when its own category bit intersects the
/// attacker's mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCategory(pub u32);

impl TargetCategory {
    pub const NONE: TargetCategory = TargetCategory(0);
    pub const VEHICLES: TargetCategory = TargetCategory(1);
    pub const BUILDINGS: TargetCategory = TargetCategory(1 << 1);
    pub const AIRCRAFT: TargetCategory = TargetCategory(1 << 2);
    pub const ALL: TargetCategory = TargetCategory(0b111);

    /// The category bit for a unit kind.
    pub fn of_kind(kind: UnitKind) -> TargetCategory {
        match kind {
            UnitKind::Vehicle => Self::VEHICLES,
            UnitKind::Building => Self::BUILDINGS,
            UnitKind::Aircraft => Self::AIRCRAFT,
        }
    }

    /// Whether this mask intersects another.
    pub fn matches(&self, other: TargetCategory) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for TargetCategory {
    type Output = TargetCategory;
    fn bitor(self, rhs: TargetCategory) -> TargetCategory {
        TargetCategory(self.0 | rhs.0)
    }
}
