//! Health mutation and the death pipeline entry points.
//!
//! The state machine is one-way: Alive -> Dying -> Dead. `reduce_health`
//! performs the guarded Alive -> Dying transition and enqueues the kill;
//! `start_kill` and `finish_kill` are applied later by the reclaim path.

use hecs::{Entity, World};
use tracing::debug;

use warfront_core::components::{Health, Targeting, Transform, UnitInfo};
use warfront_core::constants::{HEALTH_BELOW_HALF, HEALTH_BELOW_QUARTER};
use warfront_core::enums::{AiOrderState, HealthState, NetRole};
use warfront_core::events::SimEvent;
use warfront_core::kill_queue::{KillRequest, KillSender};
use warfront_core::commands::NetCommand;
use warfront_core::types::{PlayerId, Position};

use crate::context::SimContext;
use crate::systems::targeting::WatchRegistry;

/// Apply damage to a unit. Returns the resulting health value.
///
/// No-ops for units already at or below zero (the Dying/Dead guard): a
/// second lethal hit in the same frame must not re-run death effects.
pub fn reduce_health(
    world: &mut World,
    ctx: &mut SimContext,
    events: &mut Vec<SimEvent>,
    kill_tx: &KillSender,
    victim: Entity,
    damage: f64,
    attacker: Option<PlayerId>,
) -> f64 {
    let (network_id, owner) = match world.get::<&UnitInfo>(victim) {
        Ok(info) => (info.network_id, info.owner),
        Err(_) => return 0.0,
    };

    let mut health = match world.get::<&mut Health>(victim) {
        Ok(h) => h,
        Err(_) => return 0.0,
    };

    if health.current <= 0.0 {
        return health.current;
    }

    health.current -= damage;
    health.percent = (health.current / health.starting).max(0.0);
    health.last_attacked_by = attacker;

    if !health.below_half && health.percent < HEALTH_BELOW_HALF {
        health.below_half = true;
        events.push(SimEvent::HealthBelowHalf { network_id });
    }
    if !health.below_quarter && health.percent < HEALTH_BELOW_QUARTER {
        health.below_quarter = true;
        events.push(SimEvent::HealthBelowQuarter { network_id });
    }

    if health.current <= 0.0 && !health.kill_enqueued {
        health.kill_enqueued = true;
        health.state = HealthState::Dying;
        let victim_bits = victim.to_bits().get();
        let result = health.current;
        drop(health);

        // Attacker/victim statistics at kill time.
        if let Some(attacker_id) = attacker {
            if let Some(player) = ctx.players.get_player_mut(attacker_id) {
                player.stats.units_killed += 1;
            }
        }
        if let Some(player) = ctx.players.get_player_mut(owner) {
            player.stats.units_lost += 1;
        } else {
            debug!(owner, "victim owner not in registry; skipping stats");
        }

        kill_tx.send(KillRequest {
            victim_bits,
            network_id,
            owner,
            attacker,
        });
        return result;
    }

    health.current
}

/// Restore health. No-ops when the unit is already at or below zero.
/// Returns the resulting health value.
pub fn increase_health(
    world: &mut World,
    events: &mut Vec<SimEvent>,
    victim: Entity,
    value: f64,
) -> f64 {
    let network_id = match world.get::<&UnitInfo>(victim) {
        Ok(info) => info.network_id,
        Err(_) => return 0.0,
    };

    let mut health = match world.get::<&mut Health>(victim) {
        Ok(h) => h,
        Err(_) => return 0.0,
    };

    if health.current <= 0.0 {
        return health.current;
    }

    health.current = (health.current + value).min(health.starting);
    health.percent = health.current / health.starting;

    let mut restored = false;
    if health.below_quarter && health.percent >= HEALTH_BELOW_QUARTER {
        health.below_quarter = false;
        restored = true;
    }
    if health.below_half && health.percent >= HEALTH_BELOW_HALF {
        health.below_half = false;
        restored = true;
    }
    if restored {
        events.push(SimEvent::HealthRestored { network_id });
    }

    health.current
}

/// Synchronous begin-death step. Idempotent: calling it twice runs the
/// side effects once.
///
/// Clears the victim's own attack order, fires destroyed-notifications
/// to every unit watching the victim, zeroes the position, detaches
/// status-bar/name-registry bindings, and for network roles emits a
/// kill command so the peer converges.
pub fn start_kill(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    events: &mut Vec<SimEvent>,
    victim: Entity,
    attacker: Option<PlayerId>,
) {
    let (network_id, owner) = match world.get::<&UnitInfo>(victim) {
        Ok(info) => (info.network_id, info.owner),
        Err(_) => return,
    };

    {
        let mut health = match world.get::<&mut Health>(victim) {
            Ok(h) => h,
            Err(_) => return,
        };
        if health.kill_started {
            return;
        }
        health.kill_started = true;
        if health.state == HealthState::Alive {
            // Killed by command rather than damage (network kill).
            health.current = 0.0;
            health.percent = 0.0;
            health.state = HealthState::Dying;
            health.kill_enqueued = true;
        }
    }

    // The victim stops attacking.
    if let Ok(mut targeting) = world.get::<&mut Targeting>(victim) {
        if let Some(old_target) = targeting.target.take() {
            targeting.attack_on = false;
            targeting.ai_order = AiOrderState::None;
            drop(targeting);
            watch.unwatch(old_target, victim);
        }
    }

    // Everyone aiming at the victim gets a destroyed-notification.
    crate::systems::targeting::notify_destroyed(world, ctx, watch, victim);

    if let Ok(mut transform) = world.get::<&mut Transform>(victim) {
        transform.position = Position::default();
    }

    events.push(SimEvent::UnitDying { network_id, owner });

    // Converge the peer. A missing player slot means a connect race;
    // skip this frame's network branch rather than fault.
    match ctx.role {
        NetRole::SinglePlayer => {}
        NetRole::Host | NetRole::Client => {
            if ctx.players.get_player(owner).is_none() {
                debug!(owner, network_id, "owner not registered; kill command skipped");
            } else {
                let command = NetCommand::KillSceneItem {
                    network_id,
                    attacker,
                };
                if ctx.role == NetRole::Host {
                    ctx.commands.enqueue_for_client(command);
                } else {
                    ctx.commands.enqueue_for_server(command);
                }
            }
        }
    }
}

/// Final death step, invoked by the reclaim path: marks Dead and queues
/// the entity for pool return.
pub fn finish_kill(
    world: &mut World,
    events: &mut Vec<SimEvent>,
    victim: Entity,
    despawn_buffer: &mut Vec<Entity>,
) {
    let (network_id, owner) = match world.get::<&UnitInfo>(victim) {
        Ok(info) => (info.network_id, info.owner),
        Err(_) => return,
    };

    if let Ok(mut health) = world.get::<&mut Health>(victim) {
        if health.state == HealthState::Dead {
            return;
        }
        health.state = HealthState::Dead;
    }

    events.push(SimEvent::UnitRemoved { network_id, owner });
    despawn_buffer.push(victim);
}
