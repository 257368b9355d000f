//! Simulation engine — the core of the combat loop.
//!
//! `SimulationEngine` owns the hecs ECS world, processes inbound network
//! commands, runs all systems, and produces `WorldSnapshot`s. Completely
//! headless (no runtime dependency), enabling deterministic testing.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use warfront_core::commands::NetCommand;
use warfront_core::components::{Health, Targeting, UnitInfo};
use warfront_core::enums::{NetRole, OrderOrigin, TargetCategory};
use warfront_core::error::CombatError;
use warfront_core::events::SimEvent;
use warfront_core::kill_queue::{
    kill_channel, KillCompletion, KillReceiver, KillRequest, KillSender,
};
use warfront_core::state::WorldSnapshot;
use warfront_core::target_handle::TargetHandle;
use warfront_core::types::{PlayerId, Position, SimTime};

use crate::context::{Player, SimContext};
use crate::spawn::{ProjectileAllocator, UnitAllocator, UnitParams};
use crate::systems;
use crate::systems::targeting::{candidate_view, CandidateTarget, WatchRegistry};

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Which machine this instance is.
    pub role: NetRole,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            role: NetRole::SinglePlayer,
        }
    }
}

/// One unit of work for the AI worker pool: everything a worker needs to
/// pick a target off-thread. The shared handle is the only write-back
/// path; the simulation adopts the placed target next tick.
#[derive(Debug)]
pub struct AiJob {
    pub unit: Entity,
    pub handle: TargetHandle,
    pub owner: PlayerId,
    pub position: Position,
    pub group_to_attack: TargetCategory,
    pub view_radius: f64,
    pub candidates: Vec<CandidateTarget>,
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    ctx: SimContext,
    watch: WatchRegistry,
    units: UnitAllocator,
    projectiles: ProjectileAllocator,

    kill_tx: KillSender,
    /// Present until a reclaim worker takes it; while present, kills are
    /// finalized inline at the tick boundary.
    kill_rx: Option<KillReceiver>,
    completion_tx: mpsc::Sender<KillCompletion>,
    completion_rx: mpsc::Receiver<KillCompletion>,

    net_inbound: VecDeque<NetCommand>,
    by_network_id: HashMap<u32, Entity>,
    events: Vec<SimEvent>,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let (kill_tx, kill_rx) = kill_channel();
        let (completion_tx, completion_rx) = mpsc::channel();
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            ctx: SimContext::new(config.role),
            watch: WatchRegistry::new(),
            units: UnitAllocator::new(),
            projectiles: ProjectileAllocator::new(),
            kill_tx,
            kill_rx: Some(kill_rx),
            completion_tx,
            completion_rx,
            net_inbound: VecDeque::new(),
            by_network_id: HashMap::new(),
            events: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Register a player slot.
    pub fn add_player(&mut self, id: PlayerId, name: impl Into<String>) {
        self.ctx.players.insert(Player {
            id,
            name: name.into(),
            stats: Default::default(),
        });
    }

    /// Spawn a unit through the pooled allocator.
    pub fn spawn_unit(&mut self, params: &UnitParams) -> Entity {
        let entity = self.units.spawn_unit(&mut self.world, params);
        if let Ok(info) = self.world.get::<&UnitInfo>(entity) {
            self.by_network_id.insert(info.network_id, entity);
        }
        entity
    }

    /// Queue an inbound network command for the next tick boundary.
    pub fn queue_net_command(&mut self, command: NetCommand) {
        self.net_inbound.push_back(command);
    }

    /// Queue multiple inbound commands.
    pub fn queue_net_commands(&mut self, commands: impl IntoIterator<Item = NetCommand>) {
        self.net_inbound.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting
    /// snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        self.process_net_commands();
        self.run_systems();
        self.time.advance();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, &self.ctx, events)
    }

    /// Issue an attack order against an explicit target.
    pub fn attack_order(&mut self, attacker: Entity, target: Entity, origin: OrderOrigin) {
        let previous = self
            .world
            .get::<&Targeting>(attacker)
            .ok()
            .and_then(|t| t.target.get());
        if let Some(old) = previous {
            if old != target {
                self.watch.unwatch(old, attacker);
            }
        }
        if let Ok(targeting) = self.world.get::<&Targeting>(attacker) {
            targeting.target.set(target);
        }
        systems::targeting::attack_order(
            &mut self.world,
            &mut self.ctx,
            &mut self.watch,
            attacker,
            origin,
        );
    }

    /// Issue an attack order against a ground position.
    pub fn attack_ground_order(&mut self, attacker: Entity, position: Position, origin: OrderOrigin) {
        systems::targeting::attack_ground_order(
            &mut self.world,
            &mut self.ctx,
            attacker,
            position,
            origin,
        );
    }

    /// Apply damage to a unit. Returns the resulting health value.
    pub fn apply_damage(&mut self, victim: Entity, damage: f64, attacker: Option<PlayerId>) -> f64 {
        systems::health::reduce_health(
            &mut self.world,
            &mut self.ctx,
            &mut self.events,
            &self.kill_tx,
            victim,
            damage,
            attacker,
        )
    }

    /// Restore health to a unit.
    pub fn apply_repair(&mut self, unit: Entity, amount: f64) -> f64 {
        systems::health::increase_health(&mut self.world, &mut self.events, unit, amount)
    }

    /// Point a unit's turret at an explicit hull-relative angle.
    pub fn set_desired_angle(&mut self, unit: Entity, angle: f64) -> Result<(), CombatError> {
        systems::turret::set_desired_angle(&mut self.world, unit, angle)
    }

    /// Snap a unit's turret facing to an explicit angle.
    pub fn set_facing_angle(&mut self, unit: Entity, angle: f64) -> Result<(), CombatError> {
        systems::turret::set_facing_angle(&mut self.world, unit, angle)
    }

    /// Hand the kill receiver to a reclaim worker. After this, kills are
    /// finalized only when the worker posts completions back.
    pub fn take_kill_receiver(&mut self) -> Option<KillReceiver> {
        self.kill_rx.take()
    }

    /// Sender half the reclaim worker posts completions through.
    pub fn completion_sender(&self) -> mpsc::Sender<KillCompletion> {
        self.completion_tx.clone()
    }

    /// Clone of the kill-request producer, for collaborators that detect
    /// deaths off the main path.
    pub fn kill_sender(&self) -> KillSender {
        self.kill_tx.clone()
    }

    /// Build AI jobs for every idle combat-capable unit. Authoritative
    /// roles only; a client waits for host orders instead.
    pub fn ai_jobs(&self) -> Vec<AiJob> {
        if self.ctx.role == NetRole::Client {
            return Vec::new();
        }

        let mut jobs = Vec::new();
        for (entity, (targeting, info, transform, collision, health)) in self
            .world
            .query::<(
                &Targeting,
                &UnitInfo,
                &warfront_core::components::Transform,
                &warfront_core::components::Collision,
                &Health,
            )>()
            .iter()
        {
            if !health.is_alive() || targeting.attack_on || targeting.target.get().is_some() {
                continue;
            }
            let candidates: Vec<CandidateTarget> = self
                .world
                .query::<&UnitInfo>()
                .iter()
                .filter(|(other, _)| *other != entity)
                .filter_map(|(other, _)| candidate_view(&self.world, other))
                .collect();
            jobs.push(AiJob {
                unit: entity,
                handle: targeting.target.clone(),
                owner: info.owner,
                position: transform.position,
                group_to_attack: targeting.group_to_attack,
                view_radius: collision.view_radius,
                candidates,
            });
        }
        jobs
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Context accessors, for the transport and pathfinding collaborators.
    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    /// Resolve a cross-machine unit id to its local entity.
    pub fn entity_by_network_id(&self, network_id: u32) -> Option<Entity> {
        self.by_network_id.get(&network_id).copied()
    }

    /// Occupied unit slots.
    pub fn live_units(&self) -> usize {
        self.units.live_units()
    }

    /// Total unit slots ever allocated; stays flat when the pool recycles.
    pub fn unit_slot_capacity(&self) -> usize {
        self.units.slot_capacity()
    }

    /// In-flight projectile count.
    pub fn projectiles_in_flight(&self) -> usize {
        self.projectiles.in_flight()
    }

    #[cfg(test)]
    pub fn watch_registry(&self) -> &WatchRegistry {
        &self.watch
    }

    /// Process all queued network commands.
    fn process_net_commands(&mut self) {
        while let Some(command) = self.net_inbound.pop_front() {
            self.handle_net_command(command);
        }
    }

    /// Handle a single inbound network command.
    fn handle_net_command(&mut self, command: NetCommand) {
        match command {
            NetCommand::StartAttack {
                attacker_network_id,
                target_id,
                origin,
                ..
            } => {
                let attacker = self.by_network_id.get(&attacker_network_id).copied();
                let target = self.by_network_id.get(&target_id).copied();
                let (attacker, target) = match (attacker, target) {
                    (Some(a), Some(t)) => (a, t),
                    _ => {
                        debug!(
                            attacker_network_id,
                            target_id, "attack order names an unknown unit; dropped"
                        );
                        return;
                    }
                };

                let busy = self
                    .world
                    .get::<&Targeting>(attacker)
                    .map(|t| t.attack_on && self.target_is_live(&t))
                    .unwrap_or(false);

                if busy {
                    // Buffer behind the current engagement; never drop a
                    // host order.
                    if let Ok(mut targeting) = self.world.get::<&mut Targeting>(attacker) {
                        targeting.pending.push_back(target);
                    }
                } else {
                    self.attack_order(attacker, target, origin);
                }
            }
            NetCommand::CeaseAttack { attacker_network_id } => {
                if let Some(attacker) = self.by_network_id.get(&attacker_network_id).copied() {
                    let old = self
                        .world
                        .get::<&Targeting>(attacker)
                        .ok()
                        .and_then(|t| t.target.take());
                    if let Some(target) = old {
                        self.watch.unwatch(target, attacker);
                    }
                    if let Ok(mut targeting) = self.world.get::<&mut Targeting>(attacker) {
                        targeting.attack_on = false;
                    }
                }
            }
            NetCommand::KillSceneItem {
                network_id,
                attacker,
            } => {
                if let Some(victim) = self.by_network_id.get(&network_id).copied() {
                    let owner = self
                        .world
                        .get::<&UnitInfo>(victim)
                        .map(|i| i.owner)
                        .unwrap_or(0);
                    self.kill_tx.send(KillRequest {
                        victim_bits: victim.to_bits().get(),
                        network_id,
                        owner,
                        attacker,
                    });
                } else {
                    debug!(network_id, "kill command names an unknown unit; dropped");
                }
            }
        }
    }

    fn target_is_live(&self, targeting: &Targeting) -> bool {
        targeting
            .target
            .get()
            .map(|t| {
                self.world
                    .get::<&Health>(t)
                    .map(|h| h.is_alive())
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Target selection and the attack-order protocol
        systems::targeting::run(
            &mut self.world,
            &mut self.ctx,
            &mut self.watch,
            &mut self.rng,
            self.time.tick,
        );
        // 2. Turret aim
        systems::turret::run(&mut self.world, &mut self.rng, self.time.tick);
        // 3. Projectile spawning
        systems::projectiles::run_spawn(&mut self.world, &mut self.projectiles, self.time.tick);
        // 4. Movement integration (projectiles; unit movement belongs to
        //    the pathfinding collaborator)
        systems::movement::run(&mut self.world);
        // 5. Projectile arrival and damage
        systems::projectiles::run_travel(
            &mut self.world,
            &mut self.ctx,
            &mut self.projectiles,
            &mut self.events,
            &self.kill_tx,
            &mut self.despawn_buffer,
        );
        // 6. Kill finalization at the tick boundary
        systems::reclaim::drain_completions(
            &mut self.world,
            &mut self.ctx,
            &mut self.watch,
            &mut self.events,
            &mut self.units,
            &mut self.despawn_buffer,
            &self.completion_rx,
        );
        if let Some(receiver) = &self.kill_rx {
            systems::reclaim::drain_inline(
                &mut self.world,
                &mut self.ctx,
                &mut self.watch,
                &mut self.events,
                &mut self.units,
                &mut self.despawn_buffer,
                receiver,
            );
        }
        // 7. Drop despawned units from the network-id map
        let world = &self.world;
        self.by_network_id.retain(|_, entity| world.contains(*entity));
    }
}
