//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Behavior lives in systems, not components.

use std::collections::VecDeque;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::pool::PoolHandle;
use crate::target_handle::TargetHandle;
use crate::types::{PlayerId, Position};

/// World placement of a unit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Position,
    /// Hull facing in the ground plane, radians in [-pi, pi].
    pub rotation_y: f64,
    pub scale: f64,
}

/// Physical extents used by collision and targeting queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collision {
    /// Collision radius (meters).
    pub radius: f64,
    /// How far this unit can see/acquire targets (meters).
    pub view_radius: f64,
}

/// Health and lifecycle state.
///
/// `current` is only meaningful while `state == Alive`. The two one-shot
/// flags guard the death pipeline: `kill_enqueued` is set exactly once
/// when health reaches zero, `kill_started` exactly once when the begin-
/// death step runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub starting: f64,
    pub current: f64,
    /// current / starting, recomputed on every change.
    pub percent: f64,
    pub state: HealthState,
    pub below_half: bool,
    pub below_quarter: bool,
    pub kill_enqueued: bool,
    pub kill_started: bool,
    /// Player whose shot last damaged this unit, for scripting/AI.
    pub last_attacked_by: Option<PlayerId>,
}

impl Health {
    pub fn full(starting: f64) -> Self {
        Self {
            starting,
            current: starting,
            percent: 1.0,
            state: HealthState::Alive,
            below_half: false,
            below_quarter: false,
            kill_enqueued: false,
            kill_started: false,
            last_attacked_by: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == HealthState::Alive
    }
}

/// Identity of a unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitInfo {
    /// Unique id within this simulation instance.
    pub unit_id: u32,
    /// Stable id shared across machines in a network session.
    pub network_id: u32,
    pub owner: PlayerId,
    pub kind: UnitKind,
}

/// Attack-order state for a targetable unit.
#[derive(Debug, Clone)]
pub struct Targeting {
    /// Shared atomic target slot; the AI worker pool writes it while the
    /// simulation thread reads it.
    pub target: TargetHandle,
    pub attack_on: bool,
    /// Maximum firing range (meters).
    pub attack_radius: f64,
    /// Categories this unit will attack.
    pub group_to_attack: TargetCategory,
    pub ai_order: AiOrderState,
    /// Client role only: host-issued attack orders buffered while this
    /// unit is still busy with an earlier target. FIFO; entries are
    /// skipped only if dead by dequeue time. Never drops an order.
    pub pending: VecDeque<Entity>,
    /// Tick at which the next idle target rescan is due.
    pub next_rescan_tick: u64,
}

impl Targeting {
    pub fn new(attack_radius: f64, group_to_attack: TargetCategory) -> Self {
        Self {
            target: TargetHandle::new(),
            attack_on: false,
            attack_radius,
            group_to_attack,
            ai_order: AiOrderState::None,
            pending: VecDeque::new(),
            next_rescan_tick: 0,
        }
    }
}

/// Turret aim state. Both angles are constrained to [-pi, pi]; they are
/// only written through the validated setters in the aim crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TurretAim {
    /// Current turret facing relative to the hull.
    pub facing: f64,
    /// Angle the controller is steering toward.
    pub desired: f64,
    /// Maximum facing change per tick (radians).
    pub turn_speed: f64,
    /// Mount correction added to the desired angle.
    pub facing_offset: f64,
    /// While set, the turret steers to straight-ahead and clears the
    /// flag once within 1 degree.
    pub parking: bool,
    /// Tick at which the next random idle scan angle is due.
    pub next_scan_tick: u64,
}

impl TurretAim {
    pub fn new(turn_speed: f64) -> Self {
        Self {
            facing: 0.0,
            desired: 0.0,
            turn_speed,
            facing_offset: 0.0,
            parking: false,
            next_scan_tick: 0,
        }
    }
}

/// Presence marks a unit as mobile; buildings have none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mobility {
    /// Movement speed (m/s), consumed by the pathfinding collaborator.
    pub speed: f64,
}

/// Damage multipliers per target archetype. Fixed values from the
/// attacker's item attributes; there is no dynamic resistance system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageBias {
    pub vehicle: f64,
    pub building: f64,
    pub aircraft: f64,
}

impl DamageBias {
    pub fn uniform() -> Self {
        Self {
            vehicle: 1.0,
            building: 1.0,
            aircraft: 1.0,
        }
    }

    pub fn for_kind(&self, kind: UnitKind) -> f64 {
        match kind {
            UnitKind::Vehicle => self.vehicle,
            UnitKind::Building => self.building,
            UnitKind::Aircraft => self.aircraft,
        }
    }
}

/// One projectile spawn point on a unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnSlot {
    pub enabled: bool,
    /// Ticks between shots from this slot.
    pub fire_interval_ticks: u64,
    /// Tick at which this slot may fire again.
    pub next_fire_tick: u64,
}

impl Default for SpawnSlot {
    fn default() -> Self {
        Self {
            enabled: false,
            fire_interval_ticks: crate::constants::DEFAULT_FIRE_INTERVAL_TICKS,
            next_fire_tick: 0,
        }
    }
}

/// Projectile spawning capability. Slot indices are 1-based (1..=4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectileSpawner {
    pub slots: [SpawnSlot; crate::constants::SPAWN_SLOT_COUNT],
    /// Base damage per shot, before the category bias.
    pub damage: f64,
    pub bias: DamageBias,
}

impl ProjectileSpawner {
    pub fn single_slot(damage: f64, bias: DamageBias) -> Self {
        let mut slots = [SpawnSlot::default(); crate::constants::SPAWN_SLOT_COUNT];
        slots[0].enabled = true;
        Self {
            slots,
            damage,
            bias,
        }
    }
}

/// An in-flight shot.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    /// Target recorded at fire time; damage lands on it even if it
    /// moved.
    pub target: Entity,
    pub damage: f64,
    pub bias: DamageBias,
    pub shooter_owner: PlayerId,
}

/// Link from a world entity back to its pool slot, so the reclaim path
/// can release it.
#[derive(Debug, Clone, Copy)]
pub struct PoolBinding {
    pub handle: PoolHandle,
}
