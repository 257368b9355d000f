//! World snapshot — the per-tick view handed to external collaborators.
//!
//! Rendering, UI, and the AI worker pool all consume this read-only
//! picture instead of touching the ECS world directly.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{PlayerId, Position, SimTime};

/// Complete combat state published after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub role: NetRole,
    pub units: Vec<UnitView>,
    pub projectiles: Vec<ProjectileView>,
    pub players: Vec<PlayerView>,
    pub events: Vec<SimEvent>,
}

/// One unit as seen from outside the simulation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub unit_id: u32,
    pub network_id: u32,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub position: Position,
    /// Hull facing in the ground plane (radians, [-pi, pi]).
    pub rotation_y: f64,
    /// Turret facing in world terms: hull facing plus turret offset.
    pub turret_facing: f64,
    pub health_percent: f64,
    pub state: HealthState,
    pub attack_on: bool,
    /// Network id of the current attack target, if any.
    pub target_network_id: Option<u32>,
    /// How far this unit can acquire targets (meters).
    pub view_radius: f64,
    /// Maximum firing range (meters).
    pub attack_radius: f64,
    /// Categories this unit will attack.
    pub group_to_attack: TargetCategory,
}

/// One in-flight projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Position,
    pub target_network_id: Option<u32>,
    pub shooter_owner: PlayerId,
}

/// Per-player score line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub units_killed: u32,
    pub units_lost: u32,
}
