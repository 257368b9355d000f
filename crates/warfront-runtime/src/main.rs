//! Headless skirmish runner.
//!
//! Spins up the game loop with a small two-player battle and logs a
//! situation line once per second until the fight resolves or the demo
//! window ends.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use warfront_core::enums::{HealthState, NetRole, UnitKind};
use warfront_core::types::Position;
use warfront_runtime::game_loop::spawn_game_loop;
use warfront_runtime::state::SharedSnapshot;
use warfront_sim::engine::SimConfig;
use warfront_sim::spawn::UnitParams;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() {
    init_tracing();

    let seed = env_u64("WARFRONT_SEED", 42);
    let demo_secs = env_u64("WARFRONT_DEMO_SECS", 60);

    let latest: SharedSnapshot = Arc::new(Mutex::new(None));
    let handle = spawn_game_loop(
        SimConfig {
            seed,
            role: NetRole::SinglePlayer,
        },
        |engine| {
            engine.add_player(1, "alpha");
            engine.add_player(2, "bravo");

            for i in 0..4 {
                engine.spawn_unit(&UnitParams {
                    owner: 1,
                    position: Position {
                        x: -200.0,
                        y: i as f64 * 60.0,
                        z: 0.0,
                    },
                    ..Default::default()
                });
                engine.spawn_unit(&UnitParams {
                    owner: 2,
                    position: Position {
                        x: 200.0,
                        y: i as f64 * 60.0,
                        z: 0.0,
                    },
                    ..Default::default()
                });
            }
            engine.spawn_unit(&UnitParams {
                kind: UnitKind::Building,
                owner: 2,
                position: Position {
                    x: 350.0,
                    y: 100.0,
                    z: 0.0,
                },
                move_speed: None,
                weapon: None,
                starting_health: 400.0,
                ..Default::default()
            });
        },
        Arc::clone(&latest),
    );

    info!(seed, demo_secs, "skirmish started");

    for _ in 0..demo_secs {
        std::thread::sleep(Duration::from_secs(1));

        let snapshot = match latest.lock() {
            Ok(lock) => lock.clone(),
            Err(_) => break,
        };
        let Some(snapshot) = snapshot else { continue };

        let mut alive = [0u32; 2];
        for unit in &snapshot.units {
            if unit.state == HealthState::Alive && (1..=2).contains(&unit.owner) {
                alive[(unit.owner - 1) as usize] += 1;
            }
        }
        info!(
            tick = snapshot.time.tick,
            alpha = alive[0],
            bravo = alive[1],
            projectiles = snapshot.projectiles.len(),
            "situation"
        );

        if alive.iter().any(|&n| n == 0) {
            info!("one side eliminated; ending demo");
            break;
        }
    }

    handle.shutdown();
}
