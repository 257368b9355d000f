//! Pooled spawn paths for units and projectiles.
//!
//! Nothing in the combat core constructs an entity outside these
//! allocators: acquisition reuses a reclaimed pool slot where one is
//! free, and release resets the slot rather than dropping it.

use hecs::{Entity, World};

use warfront_core::components::*;
use warfront_core::constants::DEFAULT_TURN_SPEED;
use warfront_core::enums::{TargetCategory, UnitKind};
use warfront_core::pool::SlotPool;
use warfront_core::types::{PlayerId, Position, Velocity};

/// Recycled record backing one unit slot.
#[derive(Debug, Default)]
pub struct UnitRecord {
    /// World entity currently occupying the slot, if spawned.
    pub entity: Option<Entity>,
}

/// Recycled record backing one projectile slot.
#[derive(Debug, Default)]
pub struct ProjectileRecord {
    pub entity: Option<Entity>,
}

/// Attributes for populating a freshly acquired unit slot.
#[derive(Debug, Clone)]
pub struct UnitParams {
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub position: Position,
    pub rotation_y: f64,
    pub starting_health: f64,
    pub collision_radius: f64,
    pub view_radius: f64,
    pub attack_radius: f64,
    pub group_to_attack: TargetCategory,
    pub turn_speed: f64,
    /// None for immobile units (buildings).
    pub move_speed: Option<f64>,
    /// None for units that cannot shoot.
    pub weapon: Option<(f64, DamageBias)>,
    /// Explicit network id (client role mirrors the host's); None mints
    /// a fresh one.
    pub network_id: Option<u32>,
}

impl Default for UnitParams {
    fn default() -> Self {
        Self {
            kind: UnitKind::Vehicle,
            owner: 1,
            position: Position::default(),
            rotation_y: 0.0,
            starting_health: 100.0,
            collision_radius: 10.0,
            view_radius: 500.0,
            attack_radius: 300.0,
            group_to_attack: TargetCategory::ALL,
            turn_speed: DEFAULT_TURN_SPEED,
            move_speed: Some(20.0),
            weapon: Some((10.0, DamageBias::uniform())),
            network_id: None,
        }
    }
}

/// Pooled allocation path for units.
#[derive(Default)]
pub struct UnitAllocator {
    pool: SlotPool<UnitRecord>,
    next_unit_id: u32,
    next_network_id: u32,
}

impl UnitAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a slot and spawn the unit's components into the world.
    pub fn spawn_unit(&mut self, world: &mut World, params: &UnitParams) -> Entity {
        let unit_id = self.next_unit_id;
        self.next_unit_id += 1;

        let network_id = params.network_id.unwrap_or_else(|| {
            let id = self.next_network_id;
            self.next_network_id += 1;
            id
        });

        let entity = world.spawn((
            Transform {
                position: params.position,
                rotation_y: params.rotation_y,
                scale: 1.0,
            },
            Collision {
                radius: params.collision_radius,
                view_radius: params.view_radius,
            },
            Health::full(params.starting_health),
            UnitInfo {
                unit_id,
                network_id,
                owner: params.owner,
                kind: params.kind,
            },
            Targeting::new(params.attack_radius, params.group_to_attack),
            TurretAim::new(params.turn_speed),
        ));

        if let Some(speed) = params.move_speed {
            let _ = world.insert_one(entity, Mobility { speed });
        }
        if let Some((damage, bias)) = params.weapon {
            let _ = world.insert_one(entity, ProjectileSpawner::single_slot(damage, bias));
        }

        let handle = self.pool.acquire(UnitRecord {
            entity: Some(entity),
        });
        let _ = world.insert_one(entity, PoolBinding { handle });

        entity
    }

    /// Despawn the unit and return its slot to the pool with attributes
    /// reset.
    pub fn release_unit(&mut self, world: &mut World, entity: Entity) {
        if let Ok(binding) = world.get::<&PoolBinding>(entity).map(|b| *b) {
            self.pool.release(binding.handle);
        }
        let _ = world.despawn(entity);
    }

    /// Occupied unit slots.
    pub fn live_units(&self) -> usize {
        self.pool.len()
    }

    /// Total slots ever allocated; stays flat when the pool recycles.
    pub fn slot_capacity(&self) -> usize {
        self.pool.capacity()
    }
}

/// Pooled allocation path for projectiles.
#[derive(Default)]
pub struct ProjectileAllocator {
    pool: SlotPool<ProjectileRecord>,
}

impl ProjectileAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_projectile(
        &mut self,
        world: &mut World,
        origin: Position,
        velocity: Velocity,
        projectile: Projectile,
    ) -> Entity {
        let entity = world.spawn((origin, velocity, projectile));
        let handle = self.pool.acquire(ProjectileRecord {
            entity: Some(entity),
        });
        let _ = world.insert_one(entity, PoolBinding { handle });
        entity
    }

    pub fn release_projectile(&mut self, world: &mut World, entity: Entity) {
        if let Ok(binding) = world.get::<&PoolBinding>(entity).map(|b| *b) {
            self.pool.release(binding.handle);
        }
        let _ = world.despawn(entity);
    }

    pub fn in_flight(&self) -> usize {
        self.pool.len()
    }

    pub fn slot_capacity(&self) -> usize {
        self.pool.capacity()
    }
}
