//! State shared between the game loop thread and its callers.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use warfront_core::commands::NetCommand;
use warfront_core::state::WorldSnapshot;

/// Commands sent from the outside into the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A network command to forward to the simulation engine.
    Net(NetCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Latest snapshot slot, updated by the game loop after each tick and
/// read by anyone polling synchronously.
pub type SharedSnapshot = Arc<Mutex<Option<WorldSnapshot>>>;

/// Shared runtime state for an embedding layer.
///
/// `mpsc::Sender` is Send but not Sync, so it sits behind a `Mutex`;
/// it is `None` until the game loop has been started.
pub struct RuntimeState {
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    pub latest_snapshot: SharedSnapshot,
    pub running: Mutex<bool>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }
}
