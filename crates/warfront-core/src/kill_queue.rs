//! Deferred kill pipeline types.
//!
//! Death can involve variable-cost work (stat bookkeeping, network
//! command emission), so `reduce_health` only enqueues a request; a
//! dedicated worker drains the queue off the main tick and posts
//! completions back for the simulation to apply at a tick boundary.

use std::sync::mpsc;

use crate::types::PlayerId;

/// A deferred instruction to finalize one unit's death.
///
/// The victim entity travels as packed bits so the request is plain data
/// that crosses threads without borrowing the world.
#[derive(Debug, Clone, Copy)]
pub struct KillRequest {
    /// Packed `hecs::Entity` bits of the victim.
    pub victim_bits: u64,
    /// Stable cross-machine id of the victim.
    pub network_id: u32,
    /// Owner of the victim.
    pub owner: PlayerId,
    /// Player whose shot caused the death, if known.
    pub attacker: Option<PlayerId>,
}

/// A kill request the worker has finished bookkeeping for, ready for the
/// simulation to apply scene-side effects.
#[derive(Debug, Clone, Copy)]
pub struct KillCompletion {
    pub request: KillRequest,
}

/// Producer half of the kill queue. Clone freely; any thread that
/// detects a death may send.
#[derive(Debug, Clone)]
pub struct KillSender(mpsc::Sender<KillRequest>);

/// Consumer half. Exactly one worker drains it.
#[derive(Debug)]
pub struct KillReceiver(mpsc::Receiver<KillRequest>);

/// Create a connected kill-queue pair.
pub fn kill_channel() -> (KillSender, KillReceiver) {
    let (tx, rx) = mpsc::channel();
    (KillSender(tx), KillReceiver(rx))
}

impl KillSender {
    /// Enqueue a kill request. Send failure means the consumer is gone
    /// (shutdown); the request is dropped, which is acceptable then.
    pub fn send(&self, request: KillRequest) {
        let _ = self.0.send(request);
    }
}

/// Result of a non-blocking kill-queue poll.
#[derive(Debug)]
pub enum KillPoll {
    Request(KillRequest),
    /// Nothing queued right now. Not an error — the consumer treats a
    /// failed dequeue as "nothing to do".
    Empty,
    /// All producers are gone; the worker should exit.
    Disconnected,
}

impl KillReceiver {
    /// Non-blocking receive.
    pub fn poll(&self) -> KillPoll {
        match self.0.try_recv() {
            Ok(request) => KillPoll::Request(request),
            Err(mpsc::TryRecvError::Empty) => KillPoll::Empty,
            Err(mpsc::TryRecvError::Disconnected) => KillPoll::Disconnected,
        }
    }
}
