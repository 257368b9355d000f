//! Attack-order protocol: target selection, order issuing, and the
//! destroyed-notification registry.
//!
//! Three role variants exist because the simulation can run
//! single-player, as the authoritative host, or as a client whose view
//! of the world can lag the host's. The host picks targets and tells
//! the client; the client never selects on its own and buffers orders it
//! cannot act on yet.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use warfront_core::commands::NetCommand;
use warfront_core::components::{Collision, Health, Mobility, Targeting, Transform, UnitInfo};
use warfront_core::constants::{
    ATTACK_MOVE_BIAS, TARGET_RESCAN_MAX_SECS, TARGET_RESCAN_MIN_SECS, TICK_RATE,
};
use warfront_core::enums::{AiOrderState, NetRole, OrderOrigin, TargetCategory};
use warfront_core::types::{PlayerId, Position};

use crate::context::{NeighborList, SimContext};

/// Explicit registry of destroyed-notification back-references:
/// victim -> units currently aiming at it. Replaces multicast event
/// subscriptions, whose hidden lifetimes were a recurring bug source.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    watchers: HashMap<Entity, Vec<Entity>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `watcher` as aiming at `victim`.
    pub fn watch(&mut self, victim: Entity, watcher: Entity) {
        let list = self.watchers.entry(victim).or_default();
        if !list.contains(&watcher) {
            list.push(watcher);
        }
    }

    /// Detach one watcher from a victim.
    pub fn unwatch(&mut self, victim: Entity, watcher: Entity) {
        if let Some(list) = self.watchers.get_mut(&victim) {
            list.retain(|w| *w != watcher);
            if list.is_empty() {
                self.watchers.remove(&victim);
            }
        }
    }

    /// Remove and return everyone watching a victim.
    pub fn take_watchers(&mut self, victim: Entity) -> Vec<Entity> {
        self.watchers.remove(&victim).unwrap_or_default()
    }

    pub fn watcher_count(&self, victim: Entity) -> usize {
        self.watchers.get(&victim).map_or(0, Vec::len)
    }
}

/// Plain-data view of one candidate target, independent of the world so
/// the same selection runs on AI worker threads.
#[derive(Debug, Clone, Copy)]
pub struct CandidateTarget {
    pub entity: Entity,
    pub position: Position,
    pub owner: PlayerId,
    pub category: TargetCategory,
    pub alive: bool,
}

/// Nearest valid enemy among the candidates: alive, different owner,
/// category matching the attacker's mask, within view radius.
pub fn select_target(
    self_owner: PlayerId,
    self_position: Position,
    group_to_attack: TargetCategory,
    view_radius: f64,
    candidates: &[CandidateTarget],
) -> Option<Entity> {
    let mut best: Option<(Entity, f64)> = None;
    for candidate in candidates {
        if !candidate.alive
            || candidate.owner == self_owner
            || !group_to_attack.matches(candidate.category)
        {
            continue;
        }
        let range = self_position.range_to(&candidate.position);
        if range > view_radius {
            continue;
        }
        match best {
            Some((_, best_range)) if range >= best_range => {}
            _ => best = Some((candidate.entity, range)),
        }
    }
    best.map(|(entity, _)| entity)
}

/// Gather the neighbor-query result for one unit. Stands in for the
/// spatial-index collaborator; tolerates the same contract (fixed array,
/// valid count, null slots).
pub fn gather_neighbors(world: &World, of: Entity, out: &mut NeighborList) {
    out.clear();
    for (entity, _info) in world.query::<&UnitInfo>().iter() {
        if entity != of {
            out.push(entity);
        }
    }
}

/// Resolve a neighbor entity into a candidate view. Absent components
/// mean the slot is treated as empty.
pub fn candidate_view(world: &World, entity: Entity) -> Option<CandidateTarget> {
    let info = world.get::<&UnitInfo>(entity).ok()?;
    let transform = world.get::<&Transform>(entity).ok()?;
    let health = world.get::<&Health>(entity).ok()?;
    Some(CandidateTarget {
        entity,
        position: transform.position,
        owner: info.owner,
        category: TargetCategory::of_kind(info.kind),
        alive: health.is_alive(),
    })
}

fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Health>(entity)
        .map(|h| h.is_alive())
        .unwrap_or(false)
}

/// Run the defense-behavior update for every targetable unit.
///
/// Tolerates being driven from an AI thread as well as the main loop:
/// the only cross-thread state it touches is the atomic target handle.
pub fn run(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    rng: &mut ChaCha8Rng,
    current_tick: u64,
) {
    match ctx.role {
        NetRole::SinglePlayer | NetRole::Host => {
            run_authoritative(world, ctx, watch, rng, current_tick)
        }
        NetRole::Client => run_client(world, watch),
    }
}

/// Single-player and host variant: scan and select. The host serializes
/// the order for the client before committing locally — the host is the
/// source of truth.
fn run_authoritative(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    rng: &mut ChaCha8Rng,
    current_tick: u64,
) {
    // Collect-then-mutate to satisfy hecs borrow rules.
    struct Scan {
        entity: Entity,
        owner: PlayerId,
        position: Position,
        group: TargetCategory,
        view_radius: f64,
    }

    let mut adoptions: Vec<(Entity, Entity)> = Vec::new();
    let mut stale: Vec<Entity> = Vec::new();
    let mut scans: Vec<Scan> = Vec::new();

    for (entity, (targeting, info, transform, collision, health)) in world
        .query::<(&Targeting, &UnitInfo, &Transform, &Collision, &Health)>()
        .iter()
    {
        if !health.is_alive() {
            continue;
        }

        match targeting.target.get() {
            Some(target) if !targeting.attack_on => {
                // An AI worker CAS-placed a target since last tick;
                // adopt it (watch registration, attack flag) on the sim
                // thread where the registry lives.
                adoptions.push((entity, target));
            }
            Some(_) => {}
            None => {
                if targeting.attack_on {
                    // Target cleared by a destroyed-notification.
                    stale.push(entity);
                } else if current_tick >= targeting.next_rescan_tick {
                    scans.push(Scan {
                        entity,
                        owner: info.owner,
                        position: transform.position,
                        group: targeting.group_to_attack,
                        view_radius: collision.view_radius,
                    });
                }
            }
        }
    }

    for (entity, target) in adoptions {
        if is_alive(world, target) {
            commit_attack(world, ctx, watch, entity, target, OrderOrigin::Ai);
        } else if let Ok(targeting) = world.get::<&Targeting>(entity) {
            targeting.target.clear_if(target);
        }
    }

    for entity in stale {
        if let Ok(mut targeting) = world.get::<&mut Targeting>(entity) {
            targeting.attack_on = false;
            targeting.ai_order = AiOrderState::None;
        }
    }

    let mut neighbors = NeighborList::default();
    for scan in scans {
        gather_neighbors(world, scan.entity, &mut neighbors);
        let candidates: Vec<CandidateTarget> = neighbors
            .iter()
            .filter_map(|e| candidate_view(world, e))
            .collect();

        let selected = select_target(
            scan.owner,
            scan.position,
            scan.group,
            scan.view_radius,
            &candidates,
        );

        match selected {
            Some(target) => {
                if let Ok(targeting) = world.get::<&Targeting>(scan.entity) {
                    targeting.target.set(target);
                }
                commit_attack(world, ctx, watch, scan.entity, target, OrderOrigin::Ai);
            }
            None => {
                // Nothing in range: back off for a randomized window.
                let window =
                    rng.gen_range(TARGET_RESCAN_MIN_SECS..TARGET_RESCAN_MAX_SECS);
                let ticks = (window * TICK_RATE as f64) as u64;
                if let Ok(mut targeting) = world.get::<&mut Targeting>(scan.entity) {
                    targeting.next_rescan_tick = current_tick + ticks;
                }
            }
        }
    }
}

/// Client variant: never selects targets. Consumes the network-assigned
/// target and the per-unit pending FIFO; an order is skipped only when
/// its target is already dead, so no host order is silently lost.
fn run_client(world: &mut World, watch: &mut WatchRegistry) {
    let mut idle: Vec<Entity> = Vec::new();

    for (entity, (targeting, health)) in world.query::<(&Targeting, &Health)>().iter() {
        if !health.is_alive() {
            continue;
        }
        let target_live = targeting
            .target
            .get()
            .map(|t| {
                world
                    .get::<&Health>(t)
                    .map(|h| h.is_alive())
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        if !targeting.attack_on || !target_live {
            idle.push(entity);
        }
    }

    for entity in idle {
        // Clear a dead current target first.
        let old = world
            .get::<&Targeting>(entity)
            .ok()
            .and_then(|t| t.target.take());
        if let Some(old_target) = old {
            watch.unwatch(old_target, entity);
        }

        // Dequeue the next pending order, skipping dead targets.
        let next = loop {
            let candidate = match world.get::<&mut Targeting>(entity) {
                Ok(mut targeting) => targeting.pending.pop_front(),
                Err(_) => None,
            };
            match candidate {
                Some(target) if is_alive(world, target) => break Some(target),
                Some(skipped) => {
                    trace!(?skipped, "pending attack target already dead; skipped");
                    continue;
                }
                None => break None,
            }
        };

        match next {
            Some(target) => {
                if let Ok(mut targeting) = world.get::<&mut Targeting>(entity) {
                    targeting.target.set(target);
                    targeting.attack_on = true;
                    targeting.ai_order = AiOrderState::NonAiIssued;
                }
                watch.watch(target, entity);
            }
            None => {
                if let Ok(mut targeting) = world.get::<&mut Targeting>(entity) {
                    targeting.attack_on = false;
                }
            }
        }
    }
}

/// Commit an attack locally: host emits the StartAttack command first,
/// then the watch registration and flags are applied.
fn commit_attack(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    attacker: Entity,
    target: Entity,
    origin: OrderOrigin,
) {
    if ctx.role == NetRole::Host {
        let attacker_view = world.get::<&UnitInfo>(attacker).map(|i| *i);
        let target_view = world.get::<&UnitInfo>(target).map(|i| *i);
        if let (Ok(a), Ok(t)) = (attacker_view, target_view) {
            if ctx.players.get_player(t.owner).is_none() {
                debug!(owner = t.owner, "target owner not registered; command skipped");
            } else {
                ctx.commands.enqueue_for_client(NetCommand::StartAttack {
                    attacker_id: a.unit_id,
                    attacker_network_id: a.network_id,
                    target_id: t.network_id,
                    target_owner: t.owner,
                    origin,
                });
            }
        }
    }

    if let Ok(mut targeting) = world.get::<&mut Targeting>(attacker) {
        targeting.attack_on = true;
        targeting.ai_order = match origin {
            OrderOrigin::Ai => AiOrderState::AiIssued,
            OrderOrigin::Player => AiOrderState::NonAiIssued,
        };
    }
    watch.watch(target, attacker);
}

/// Issue an attack order against the currently-set target.
///
/// Contract: aborts (clearing state) when the target is missing, dead,
/// or outside the unit's category mask. Mobile units acting on a non-AI
/// order also get a move-to goal at the edge of firing range.
pub fn attack_order(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    attacker: Entity,
    origin: OrderOrigin,
) {
    let target = match world.get::<&Targeting>(attacker).ok().and_then(|t| t.target.get()) {
        Some(t) => t,
        None => {
            clear_attack(world, watch, attacker, None);
            return;
        }
    };

    if !is_alive(world, target) {
        clear_attack(world, watch, attacker, Some(target));
        return;
    }

    let target_kind = world.get::<&UnitInfo>(target).map(|info| info.kind);
    let target_category = match target_kind {
        Ok(kind) => TargetCategory::of_kind(kind),
        Err(_) => {
            clear_attack(world, watch, attacker, Some(target));
            return;
        }
    };
    let group = match world.get::<&Targeting>(attacker) {
        Ok(t) => t.group_to_attack,
        Err(_) => return,
    };
    if !group.matches(target_category) {
        clear_attack(world, watch, attacker, Some(target));
        return;
    }

    commit_attack(world, ctx, watch, attacker, target, origin);

    // Close to firing range: lerp a waypoint biased inside the radius so
    // the unit ends up strictly within range, then hand it to pathing.
    if origin == OrderOrigin::Player {
        let mobile = world.get::<&Mobility>(attacker).is_ok();
        if mobile {
            let self_pos = world.get::<&Transform>(attacker).map(|t| t.position);
            let target_pos = world.get::<&Transform>(target).map(|t| t.position);
            let attack_radius = world.get::<&Targeting>(attacker).map(|t| t.attack_radius);
            if let (Ok(self_pos), Ok(target_pos), Ok(attack_radius)) =
                (self_pos, target_pos, attack_radius)
            {
                let dist = self_pos.range_to(&target_pos);
                if dist > attack_radius - ATTACK_MOVE_BIAS {
                    let travel = dist - (attack_radius - ATTACK_MOVE_BIAS);
                    let t = (travel / dist).clamp(0.0, 1.0);
                    let goal = self_pos.lerp(&target_pos, t);
                    ctx.waypoints.enqueue_waypoint(attacker, goal);
                }
            }
        }
    }
}

/// Issue an attack order against a ground position. Shares the
/// validation shape of `attack_order` but aims at a fixed point: no live
/// target, so no watch registration.
pub fn attack_ground_order(
    world: &mut World,
    ctx: &mut SimContext,
    attacker: Entity,
    position: Position,
    origin: OrderOrigin,
) {
    let ok = world
        .get::<&Health>(attacker)
        .map(|h| h.is_alive())
        .unwrap_or(false);
    if !ok {
        return;
    }

    if let Ok(mut targeting) = world.get::<&mut Targeting>(attacker) {
        targeting.target.clear();
        targeting.attack_on = true;
        targeting.ai_order = match origin {
            OrderOrigin::Ai => AiOrderState::AiIssued,
            OrderOrigin::Player => AiOrderState::NonAiIssued,
        };
    }

    // Swing the turret onto the ground point.
    let aim = world
        .get::<&Transform>(attacker)
        .map(|t| (t.position, t.rotation_y));
    if let Ok((self_pos, hull)) = aim {
        let bearing = self_pos.ground_bearing_to(&position);
        if let Ok(mut turret) = world.get::<&mut warfront_core::components::TurretAim>(attacker) {
            turret.desired = warfront_aim::wrap_angle(bearing - hull);
        }
    }

    if origin == OrderOrigin::Player && world.get::<&Mobility>(attacker).is_ok() {
        ctx.waypoints.enqueue_waypoint(attacker, position);
    }
}

/// Fire destroyed-notifications for a victim: every watcher's target
/// back-reference is cleared (CAS so a newer retarget survives), its
/// order state resets, and the host emits a cease-attack per watcher.
pub fn notify_destroyed(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    victim: Entity,
) {
    let watchers = watch.take_watchers(victim);
    for watcher in watchers {
        let cleared = match world.get::<&mut Targeting>(watcher) {
            Ok(mut targeting) => {
                let cleared = targeting.target.clear_if(victim);
                if cleared {
                    targeting.attack_on = false;
                    targeting.ai_order = AiOrderState::None;
                }
                cleared
            }
            Err(_) => false,
        };

        if cleared && ctx.role == NetRole::Host {
            if let Ok(info) = world.get::<&UnitInfo>(watcher) {
                ctx.commands.enqueue_for_client(NetCommand::CeaseAttack {
                    attacker_network_id: info.network_id,
                });
            }
        }
    }
}

fn clear_attack(world: &mut World, watch: &mut WatchRegistry, attacker: Entity, target: Option<Entity>) {
    if let Ok(mut targeting) = world.get::<&mut Targeting>(attacker) {
        targeting.target.clear();
        targeting.attack_on = false;
        targeting.ai_order = AiOrderState::None;
    }
    if let Some(target) = target {
        watch.unwatch(target, attacker);
    }
}
