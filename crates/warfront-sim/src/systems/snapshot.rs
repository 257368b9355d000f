//! Snapshot system: queries the ECS world and builds a complete WorldSnapshot.
//!
//! This system is read-only — it never modifies the world.

use hecs::World;

use warfront_core::components::*;
use warfront_core::events::SimEvent;
use warfront_core::state::*;
use warfront_core::types::{Position, SimTime, Velocity};

use crate::context::SimContext;
use warfront_aim::world_facing;

/// Build a complete WorldSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    ctx: &SimContext,
    events: Vec<SimEvent>,
) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        role: ctx.role,
        units: build_units(world),
        projectiles: build_projectiles(world),
        players: build_players(ctx),
        events,
    }
}

/// Build UnitView list from all entities with UnitInfo.
fn build_units(world: &World) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = world
        .query::<(
            &Transform,
            &Collision,
            &Health,
            &UnitInfo,
            &Targeting,
            &TurretAim,
        )>()
        .iter()
        .map(|(_, (transform, collision, health, info, targeting, aim))| UnitView {
            unit_id: info.unit_id,
            network_id: info.network_id,
            owner: info.owner,
            kind: info.kind,
            position: transform.position,
            rotation_y: transform.rotation_y,
            turret_facing: world_facing(aim.facing, transform.rotation_y),
            health_percent: health.percent,
            state: health.state,
            attack_on: targeting.attack_on,
            target_network_id: targeting
                .target
                .get()
                .and_then(|target| network_id_of(world, target)),
            view_radius: collision.view_radius,
            attack_radius: targeting.attack_radius,
            group_to_attack: targeting.group_to_attack,
        })
        .collect();

    units.sort_by_key(|u| u.unit_id);
    units
}

/// Build ProjectileView list from all in-flight shots.
fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    world
        .query::<(&Position, &Velocity, &Projectile)>()
        .iter()
        .map(|(_, (pos, _, projectile))| ProjectileView {
            position: *pos,
            target_network_id: network_id_of(world, projectile.target),
            shooter_owner: projectile.shooter_owner,
        })
        .collect()
}

/// Build PlayerView list from the player registry.
fn build_players(ctx: &SimContext) -> Vec<PlayerView> {
    ctx.players
        .iter()
        .map(|player| PlayerView {
            id: player.id,
            name: player.name.clone(),
            units_killed: player.stats.units_killed,
            units_lost: player.stats.units_lost,
        })
        .collect()
}

fn network_id_of(world: &World, entity: hecs::Entity) -> Option<u32> {
    world
        .get::<&UnitInfo>(entity)
        .ok()
        .map(|info| info.network_id)
}
