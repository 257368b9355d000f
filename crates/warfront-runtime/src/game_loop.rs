//! Game loop thread — runs the simulation engine at 30Hz.
//!
//! The engine is created inside the thread because it's cleaner for
//! ownership. Commands arrive via `mpsc` channel; snapshots land in
//! shared state for synchronous polling. The loop also owns the reclaim
//! worker and the AI pool.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::info;

use warfront_core::constants::TICK_RATE;
use warfront_sim::engine::{SimConfig, SimulationEngine};

use crate::ai_pool::AiPool;
use crate::reclaim;
use crate::state::{GameLoopCommand, SharedSnapshot};

/// Nominal duration of one tick.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Worker threads in the AI pool.
const AI_WORKERS: usize = 2;

/// Running game loop thread plus its command channel.
pub struct GameLoopHandle {
    commands: mpsc::Sender<GameLoopCommand>,
    thread: JoinHandle<()>,
}

impl GameLoopHandle {
    pub fn commands(&self) -> mpsc::Sender<GameLoopCommand> {
        self.commands.clone()
    }

    /// Ask the loop to stop and wait for it.
    pub fn shutdown(self) {
        let _ = self.commands.send(GameLoopCommand::Shutdown);
        let _ = self.thread.join();
    }
}

/// Spawn the game loop in a new thread.
///
/// `setup` runs once against the fresh engine before the first tick
/// (player registration, initial spawns).
pub fn spawn_game_loop(
    config: SimConfig,
    setup: impl FnOnce(&mut SimulationEngine) + Send + 'static,
    latest_snapshot: SharedSnapshot,
) -> GameLoopHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let thread = std::thread::Builder::new()
        .name("warfront-game-loop".into())
        .spawn(move || {
            run_game_loop(config, setup, cmd_rx, &latest_snapshot);
        })
        .expect("Failed to spawn game loop thread");

    GameLoopHandle {
        commands: cmd_tx,
        thread,
    }
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    config: SimConfig,
    setup: impl FnOnce(&mut SimulationEngine),
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &SharedSnapshot,
) {
    let mut engine = SimulationEngine::new(config);
    setup(&mut engine);

    // Hand the kill queue to its worker; completions flow back into the
    // engine at tick boundaries.
    let reclaim_worker = engine
        .take_kill_receiver()
        .map(|receiver| reclaim::spawn_reclaim_worker(receiver, engine.completion_sender()));
    let ai_pool = AiPool::new(AI_WORKERS);

    info!(role = ?engine.context().role, "game loop running");
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Net(command)) => {
                    engine.queue_net_command(command);
                }
                Ok(GameLoopCommand::Shutdown) => {
                    shutdown(engine, reclaim_worker, ai_pool);
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    shutdown(engine, reclaim_worker, ai_pool);
                    return;
                }
            }
        }

        // 2. Advance one tick
        let snapshot = engine.tick();

        // 3. Queue target-selection work for idle units
        ai_pool.submit_all(engine.ai_jobs());

        // 4. Store latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 5. Sleep until next tick
        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind — reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }
}

fn shutdown(engine: SimulationEngine, reclaim_worker: Option<JoinHandle<()>>, ai_pool: AiPool) {
    ai_pool.shutdown();
    // Dropping the engine drops every kill sender, which lets the
    // reclaim worker observe the disconnect and exit.
    drop(engine);
    if let Some(worker) = reclaim_worker {
        let _ = worker.join();
    }
    info!("game loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use warfront_core::commands::NetCommand;
    use warfront_core::enums::NetRole;
    use warfront_core::types::Position;
    use warfront_sim::spawn::UnitParams;

    #[test]
    fn test_tick_duration_constant() {
        // 30Hz = 33.333ms per tick
        let expected_nanos = 1_000_000_000u64 / 30;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Net(NetCommand::CeaseAttack {
            attacker_network_id: 3,
        }))
        .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 2);
        assert!(matches!(
            commands[0],
            GameLoopCommand::Net(NetCommand::CeaseAttack {
                attacker_network_id: 3
            })
        ));
        assert!(matches!(commands[1], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_loop_publishes_snapshots_and_shuts_down() {
        let latest: SharedSnapshot = Arc::new(Mutex::new(None));
        let handle = spawn_game_loop(
            SimConfig {
                seed: 42,
                role: NetRole::SinglePlayer,
            },
            |engine| {
                engine.add_player(1, "alpha");
                engine.add_player(2, "bravo");
                engine.spawn_unit(&UnitParams::default());
                engine.spawn_unit(&UnitParams {
                    owner: 2,
                    position: Position {
                        x: 100.0,
                        y: 0.0,
                        z: 0.0,
                    },
                    ..Default::default()
                });
            },
            Arc::clone(&latest),
        );

        // Wait for at least one published snapshot.
        let deadline = Instant::now() + Duration::from_secs(5);
        let snapshot = loop {
            if let Some(snap) = latest.lock().unwrap().clone() {
                break snap;
            }
            assert!(Instant::now() < deadline, "no snapshot published in time");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(snapshot.units.len(), 2);

        handle.shutdown();
    }

    #[test]
    fn test_snapshot_serializes_quickly() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        engine.add_player(1, "alpha");
        engine.add_player(2, "bravo");
        for i in 0..50 {
            engine.spawn_unit(&UnitParams {
                owner: 1 + (i % 2) as u8,
                position: Position {
                    x: i as f64 * 40.0,
                    y: 0.0,
                    z: 0.0,
                },
                ..Default::default()
            });
        }
        for _ in 0..50 {
            engine.tick();
        }

        let snapshot = engine.tick();
        let start = Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(3),
            "Snapshot serialization took {:?}, should be <3ms",
            elapsed
        );
        assert!(!json.is_empty());
    }
}
