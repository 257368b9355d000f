//! Projectile spawn, travel, and damage resolution.
//!
//! Spawn-point timers gate firing; in-flight shots steer toward the
//! recorded target every tick and apply category-biased damage once on
//! arrival, then return to their pool.

use hecs::{Entity, World};
use tracing::trace;

use warfront_core::components::{
    Health, Projectile, ProjectileSpawner, Targeting, Transform, UnitInfo,
};
use warfront_core::constants::{
    PROJECTILE_LETHAL_RADIUS, PROJECTILE_SPEED, SPAWN_SLOT_COUNT,
};
use warfront_core::error::CombatError;
use warfront_core::events::SimEvent;
use warfront_core::kill_queue::KillSender;
use warfront_core::types::{Position, Velocity};

use crate::context::SimContext;
use crate::spawn::ProjectileAllocator;
use crate::systems::health::reduce_health;

/// Fire from every spawn slot whose timer has elapsed, for units that
/// are attacking a live target inside their attack radius.
pub fn run_spawn(
    world: &mut World,
    projectiles: &mut ProjectileAllocator,
    current_tick: u64,
) {
    struct Shot {
        shooter: Entity,
        slot: usize,
        origin: Position,
        target: Entity,
        target_pos: Position,
    }

    let mut shots: Vec<Shot> = Vec::new();

    for (entity, (spawner, targeting, transform, health)) in world
        .query::<(&ProjectileSpawner, &Targeting, &Transform, &Health)>()
        .iter()
    {
        if !health.is_alive() || !targeting.attack_on {
            continue;
        }
        let target = match targeting.target.get() {
            Some(t) => t,
            None => continue,
        };
        let target_pos = match world.get::<&Transform>(target) {
            Ok(t) => t.position,
            Err(_) => continue,
        };
        let target_live = world
            .get::<&Health>(target)
            .map(|h| h.is_alive())
            .unwrap_or(false);
        if !target_live {
            continue;
        }
        if transform.position.range_to(&target_pos) > targeting.attack_radius {
            continue;
        }

        for (idx, slot) in spawner.slots.iter().enumerate() {
            if slot.enabled && current_tick >= slot.next_fire_tick {
                shots.push(Shot {
                    shooter: entity,
                    slot: idx + 1,
                    origin: transform.position,
                    target,
                    target_pos,
                });
            }
        }
    }

    for shot in shots {
        let _ = spawn_from_slot(
            world,
            projectiles,
            shot.shooter,
            shot.slot,
            shot.origin,
            shot.target,
            shot.target_pos,
            current_tick,
        );
    }
}

/// Spawn one projectile from a numbered slot (1-based, 1..=4).
///
/// An out-of-range slot index is a caller bug and is rejected with an
/// error rather than clamped.
#[allow(clippy::too_many_arguments)]
pub fn spawn_from_slot(
    world: &mut World,
    projectiles: &mut ProjectileAllocator,
    shooter: Entity,
    slot_index: usize,
    origin: Position,
    target: Entity,
    target_pos: Position,
    current_tick: u64,
) -> Result<Entity, CombatError> {
    if slot_index < 1 || slot_index > SPAWN_SLOT_COUNT {
        return Err(CombatError::SpawnSlotOutOfRange(slot_index));
    }

    let (damage, bias, owner) = {
        let spawner = match world.get::<&ProjectileSpawner>(shooter) {
            Ok(s) => *s,
            Err(_) => return Err(CombatError::SpawnSlotOutOfRange(slot_index)),
        };
        let owner = world
            .get::<&UnitInfo>(shooter)
            .map(|i| i.owner)
            .unwrap_or(0);
        (spawner.damage, spawner.bias, owner)
    };

    // Rearm the slot.
    if let Ok(mut spawner) = world.get::<&mut ProjectileSpawner>(shooter) {
        let slot = &mut spawner.slots[slot_index - 1];
        slot.next_fire_tick = current_tick + slot.fire_interval_ticks;
    }

    let velocity = Velocity::toward(&origin, &target_pos, PROJECTILE_SPEED);
    let entity = projectiles.spawn_projectile(
        world,
        origin,
        velocity,
        Projectile {
            target,
            damage,
            bias,
            shooter_owner: owner,
        },
    );
    trace!(?shooter, slot_index, "projectile away");
    Ok(entity)
}

/// Advance in-flight projectiles: steer toward the recorded target and
/// resolve damage on arrival.
pub fn run_travel(
    world: &mut World,
    ctx: &mut SimContext,
    projectiles: &mut ProjectileAllocator,
    events: &mut Vec<SimEvent>,
    kill_tx: &KillSender,
    despawn_buffer: &mut Vec<Entity>,
) {
    struct Arrival {
        projectile: Entity,
        target: Entity,
        damage: f64,
        attacker: u8,
        position: Position,
    }

    let mut arrivals: Vec<Arrival> = Vec::new();
    let mut retargets: Vec<(Entity, Velocity)> = Vec::new();

    despawn_buffer.clear();

    for (entity, (projectile, position)) in world.query::<(&Projectile, &Position)>().iter() {
        let target_view = world.get::<&Transform>(projectile.target).ok().map(|t| t.position);
        let target_pos = match target_view {
            Some(p) => p,
            None => {
                // Target entity gone entirely; the shot fizzles.
                despawn_buffer.push(entity);
                continue;
            }
        };

        if position.range_to(&target_pos) <= PROJECTILE_LETHAL_RADIUS {
            let kind = world
                .get::<&UnitInfo>(projectile.target)
                .map(|i| i.kind)
                .unwrap_or_default();
            arrivals.push(Arrival {
                projectile: entity,
                target: projectile.target,
                damage: projectile.damage * projectile.bias.for_kind(kind),
                attacker: projectile.shooter_owner,
                position: target_pos,
            });
        } else {
            retargets.push((
                entity,
                Velocity::toward(position, &target_pos, PROJECTILE_SPEED),
            ));
        }
    }

    for (entity, velocity) in retargets {
        if let Ok(mut v) = world.get::<&mut Velocity>(entity) {
            *v = velocity;
        }
    }

    for arrival in arrivals {
        let network_id = world
            .get::<&UnitInfo>(arrival.target)
            .map(|i| i.network_id)
            .unwrap_or(0);
        reduce_health(
            world,
            ctx,
            events,
            kill_tx,
            arrival.target,
            arrival.damage,
            Some(arrival.attacker),
        );
        events.push(SimEvent::ProjectileHit {
            target_network_id: network_id,
            damage: arrival.damage,
            position: arrival.position,
        });
        despawn_buffer.push(arrival.projectile);
    }

    for entity in despawn_buffer.drain(..) {
        projectiles.release_projectile(world, entity);
    }
}
