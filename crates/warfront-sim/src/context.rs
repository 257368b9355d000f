//! Explicit simulation context passed into every system.
//!
//! Replaces the global player/engine lookups of older engines: every
//! collaborator a system needs arrives as an argument, which keeps the
//! systems testable and the threading story explicit.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use warfront_core::commands::CommandQueues;
use warfront_core::constants::MAX_NEIGHBORS;
use warfront_core::enums::NetRole;
use warfront_core::types::{PlayerId, Position};

/// One player slot in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub stats: PlayerStats,
}

/// Combat statistics tracked per player.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub units_killed: u32,
    pub units_lost: u32,
}

/// Player lookup. `get_player` may return None during connect/disconnect
/// races in network play; callers skip the frame's network branch rather
/// than fault.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    slots: Vec<Option<Player>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player: Player) {
        let idx = player.id as usize;
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        self.slots[idx] = Some(player);
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        self.slots.get_mut(id as usize)?.take()
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.slots.get(id as usize)?.as_ref()
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.slots.get_mut(id as usize)?.as_mut()
    }

    /// Present players in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> + '_ {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }
}

/// Fire-and-forget pathfinding sink. The combat core queues move goals
/// and never inspects path results.
#[derive(Debug, Default)]
pub struct WaypointSink {
    queued: Vec<(Entity, Position)>,
}

impl WaypointSink {
    pub fn enqueue_waypoint(&mut self, unit: Entity, goal: Position) {
        self.queued.push((unit, goal));
    }

    /// Drain queued goals; the pathfinding collaborator consumes these
    /// after the tick.
    pub fn drain(&mut self) -> impl Iterator<Item = (Entity, Position)> + '_ {
        self.queued.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

/// Result of a neighbor query: a fixed-size array plus a valid count.
/// Null slots and indices at or beyond `count` are treated as absent.
#[derive(Debug, Clone)]
pub struct NeighborList {
    pub slots: [Option<Entity>; MAX_NEIGHBORS],
    pub count: usize,
}

impl Default for NeighborList {
    fn default() -> Self {
        Self {
            slots: [None; MAX_NEIGHBORS],
            count: 0,
        }
    }
}

impl NeighborList {
    pub fn clear(&mut self) {
        self.slots = [None; MAX_NEIGHBORS];
        self.count = 0;
    }

    pub fn push(&mut self, entity: Entity) {
        if self.count < MAX_NEIGHBORS {
            self.slots[self.count] = Some(entity);
            self.count += 1;
        }
    }

    /// Present entities, respecting the valid count and skipping nulls.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .take(self.count.min(MAX_NEIGHBORS))
            .filter_map(|slot| *slot)
    }
}

/// Everything a system needs beyond the world itself.
#[derive(Debug)]
pub struct SimContext {
    pub role: NetRole,
    pub players: PlayerRegistry,
    pub commands: CommandQueues,
    pub waypoints: WaypointSink,
}

impl SimContext {
    pub fn new(role: NetRole) -> Self {
        Self {
            role,
            players: PlayerRegistry::new(),
            commands: CommandQueues::new(),
            waypoints: WaypointSink::default(),
        }
    }
}
