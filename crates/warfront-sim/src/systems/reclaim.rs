//! Sim-side application of the deferred kill pipeline.
//!
//! Kill requests flow out to the reclaim worker; completions flow back
//! and are applied here at the tick boundary. When no worker has taken
//! the receiver (single-threaded use, tests), requests are drained and
//! finalized inline instead.

use std::sync::mpsc;

use hecs::{Entity, World};
use tracing::debug;

use warfront_core::events::SimEvent;
use warfront_core::kill_queue::{KillCompletion, KillPoll, KillReceiver, KillRequest};

use crate::context::SimContext;
use crate::spawn::UnitAllocator;
use crate::systems::health::{finish_kill, start_kill};
use crate::systems::targeting::WatchRegistry;

/// Apply one finished kill: begin-death effects, then final removal and
/// pool return.
#[allow(clippy::too_many_arguments)]
pub fn apply_kill(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    events: &mut Vec<SimEvent>,
    units: &mut UnitAllocator,
    despawn_buffer: &mut Vec<Entity>,
    request: KillRequest,
) {
    let victim = match Entity::from_bits(request.victim_bits) {
        Some(e) => e,
        None => {
            debug!(bits = request.victim_bits, "kill request had invalid entity bits");
            return;
        }
    };

    start_kill(world, ctx, watch, events, victim, request.attacker);
    finish_kill(world, events, victim, despawn_buffer);

    for entity in despawn_buffer.drain(..) {
        units.release_unit(world, entity);
    }
}

/// Drain completions posted back by the reclaim worker.
#[allow(clippy::too_many_arguments)]
pub fn drain_completions(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    events: &mut Vec<SimEvent>,
    units: &mut UnitAllocator,
    despawn_buffer: &mut Vec<Entity>,
    completions: &mpsc::Receiver<KillCompletion>,
) {
    while let Ok(completion) = completions.try_recv() {
        apply_kill(
            world,
            ctx,
            watch,
            events,
            units,
            despawn_buffer,
            completion.request,
        );
    }
}

/// Inline fallback when the engine still owns the kill receiver: drain
/// and finalize synchronously.
#[allow(clippy::too_many_arguments)]
pub fn drain_inline(
    world: &mut World,
    ctx: &mut SimContext,
    watch: &mut WatchRegistry,
    events: &mut Vec<SimEvent>,
    units: &mut UnitAllocator,
    despawn_buffer: &mut Vec<Entity>,
    receiver: &KillReceiver,
) {
    loop {
        match receiver.poll() {
            KillPoll::Request(request) => {
                apply_kill(world, ctx, watch, events, units, despawn_buffer, request);
            }
            KillPoll::Empty | KillPoll::Disconnected => break,
        }
    }
}
