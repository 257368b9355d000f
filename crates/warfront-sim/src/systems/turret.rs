//! Per-tick turret aim system.
//!
//! Bridges turret components to the pure controller in `warfront-aim`,
//! the same way the sim crate bridges unit state to its behavior crates.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use warfront_aim::{evaluate, pick_scan_angle, validate_angle, AimContext};
use warfront_core::components::{Health, Targeting, Transform, TurretAim};
use warfront_core::constants::{IDLE_SCAN_MAX_SECS, IDLE_SCAN_MIN_SECS, TICK_RATE};
use warfront_core::error::CombatError;

/// Advance every turret one tick.
pub fn run(world: &mut World, rng: &mut ChaCha8Rng, current_tick: u64) {
    struct Update {
        entity: Entity,
        facing: f64,
        desired: f64,
        parking: bool,
        next_scan_tick: Option<u64>,
    }

    let mut updates: Vec<Update> = Vec::new();

    for (entity, (turret, targeting, transform, health)) in world
        .query::<(&TurretAim, &Targeting, &Transform, &Health)>()
        .iter()
    {
        if !health.is_alive() {
            continue;
        }

        // A live target overrides idle scanning: recompute the bearing
        // toward its current position every frame.
        let target_bearing = if targeting.attack_on {
            targeting.target.get().and_then(|target| {
                let live = world
                    .get::<&Health>(target)
                    .map(|h| h.is_alive())
                    .unwrap_or(false);
                if !live {
                    return None;
                }
                world
                    .get::<&Transform>(target)
                    .ok()
                    .map(|t| transform.position.ground_bearing_to(&t.position))
            })
        } else {
            None
        };

        let mut desired = turret.desired;
        let mut next_scan_tick = None;
        if target_bearing.is_none() && !turret.parking && current_tick >= turret.next_scan_tick {
            desired = pick_scan_angle(rng);
            let window = rng.gen_range(IDLE_SCAN_MIN_SECS..IDLE_SCAN_MAX_SECS);
            next_scan_tick = Some(current_tick + (window * TICK_RATE as f64) as u64);
        }

        let update = evaluate(&AimContext {
            facing: turret.facing,
            desired,
            turn_speed: turret.turn_speed,
            facing_offset: turret.facing_offset,
            hull_facing: transform.rotation_y,
            parking: turret.parking,
            target_bearing,
        });

        updates.push(Update {
            entity,
            facing: update.facing,
            desired: update.desired,
            parking: turret.parking && !update.park_cleared,
            next_scan_tick,
        });
    }

    for update in updates {
        if let Ok(mut turret) = world.get::<&mut TurretAim>(update.entity) {
            turret.facing = update.facing;
            turret.desired = update.desired;
            turret.parking = update.parking;
            if let Some(tick) = update.next_scan_tick {
                turret.next_scan_tick = tick;
            }
        }
    }
}

/// Externally assign a turret's desired angle. Out-of-range values are a
/// contract violation and rejected, never clamped.
pub fn set_desired_angle(
    world: &mut World,
    entity: Entity,
    angle: f64,
) -> Result<(), CombatError> {
    let angle = validate_angle(angle)?;
    if let Ok(mut turret) = world.get::<&mut TurretAim>(entity) {
        turret.desired = angle;
    }
    Ok(())
}

/// Externally assign a turret's facing angle, same contract as
/// `set_desired_angle`.
pub fn set_facing_angle(world: &mut World, entity: Entity, angle: f64) -> Result<(), CombatError> {
    let angle = validate_angle(angle)?;
    if let Ok(mut turret) = world.get::<&mut TurretAim>(entity) {
        turret.facing = angle;
    }
    Ok(())
}
