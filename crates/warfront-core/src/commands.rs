//! Network commands exchanged between the host and client roles.
//!
//! Commands are plain records; the transport layer only sees serialized
//! bytes. The combat core produces `StartAttack`/`CeaseAttack`/
//! `KillSceneItem` and consumes the resulting target assignments on the
//! client.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::enums::OrderOrigin;
use crate::types::PlayerId;

/// Commands this core places on the outbound queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetCommand {
    /// Host orders a unit to attack a target. Sent before the host
    /// commits locally — the host is the source of truth.
    StartAttack {
        attacker_id: u32,
        attacker_network_id: u32,
        target_id: u32,
        target_owner: PlayerId,
        origin: OrderOrigin,
    },
    /// Host tells the client the attacker's target is gone.
    CeaseAttack { attacker_network_id: u32 },
    /// Either side tells the peer a unit has been killed so both
    /// machines converge.
    KillSceneItem {
        network_id: u32,
        attacker: Option<PlayerId>,
    },
}

/// Outbound command queues toward each peer role. The network transport
/// drains these; this core only enqueues.
#[derive(Debug, Default)]
pub struct CommandQueues {
    for_client: VecDeque<NetCommand>,
    for_server: VecDeque<NetCommand>,
}

impl CommandQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command for the client (host role).
    pub fn enqueue_for_client(&mut self, command: NetCommand) {
        self.for_client.push_back(command);
    }

    /// Queue a command for the server (client role).
    pub fn enqueue_for_server(&mut self, command: NetCommand) {
        self.for_server.push_back(command);
    }

    /// Drain everything queued for the client, in order.
    pub fn drain_for_client(&mut self) -> impl Iterator<Item = NetCommand> + '_ {
        self.for_client.drain(..)
    }

    /// Drain everything queued for the server, in order.
    pub fn drain_for_server(&mut self) -> impl Iterator<Item = NetCommand> + '_ {
        self.for_server.drain(..)
    }

    pub fn for_client_len(&self) -> usize {
        self.for_client.len()
    }

    pub fn for_server_len(&self) -> usize {
        self.for_server.len()
    }
}
