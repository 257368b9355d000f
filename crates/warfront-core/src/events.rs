//! Events emitted by the simulation for cosmetic and UI collaborators.
//!
//! The combat core never calls rendering, audio, or UI directly; it
//! emits these records and external systems consume them after the tick.

use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, Position};

/// Per-tick event feed for external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// Health dropped below 50% of starting — swap to damaged cosmetics.
    HealthBelowHalf { network_id: u32 },
    /// Health dropped below 25% — heavier damage cosmetics.
    HealthBelowQuarter { network_id: u32 },
    /// Health recovered above a threshold — restore cosmetics.
    HealthRestored { network_id: u32 },
    /// Unit entered Dying; detach its status bar and name registry entry.
    UnitDying { network_id: u32, owner: PlayerId },
    /// Unit fully dead; drop it from the minimap and selection lists.
    UnitRemoved { network_id: u32, owner: PlayerId },
    /// A projectile struck its target.
    ProjectileHit {
        target_network_id: u32,
        damage: f64,
        position: Position,
    },
}
