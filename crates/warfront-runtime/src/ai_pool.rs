//! AI worker pool.
//!
//! Target selection is pure math over a plain-data candidate list, so it
//! runs off the simulation thread. The only write-back path is the
//! unit's shared target handle: a compare-and-swap that succeeds only if
//! the slot is still empty, so the simulation can never be overruled.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::trace;

use warfront_sim::engine::AiJob;
use warfront_sim::systems::targeting::select_target;

/// A pool of worker threads consuming [`AiJob`]s.
pub struct AiPool {
    tx: Option<mpsc::Sender<AiJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl AiPool {
    /// Spawn `worker_count` threads sharing one job queue.
    pub fn new(worker_count: usize) -> Self {
        let (tx, rx) = mpsc::channel::<AiJob>();
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..worker_count.max(1))
            .map(|i| {
                let rx = Arc::clone(&rx);
                std::thread::Builder::new()
                    .name(format!("warfront-ai-{i}"))
                    .spawn(move || loop {
                        let job = match rx.lock() {
                            Ok(guard) => guard.recv(),
                            Err(_) => break,
                        };
                        match job {
                            Ok(job) => run_job(&job),
                            Err(_) => break,
                        }
                    })
                    .expect("Failed to spawn AI worker thread")
            })
            .collect();

        Self {
            tx: Some(tx),
            workers,
        }
    }

    /// Queue one job. Dropped silently if the pool is shut down.
    pub fn submit(&self, job: AiJob) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(job);
        }
    }

    /// Queue a batch of jobs.
    pub fn submit_all(&self, jobs: impl IntoIterator<Item = AiJob>) {
        for job in jobs {
            self.submit(job);
        }
    }

    /// Close the queue and wait for the workers to finish everything
    /// already submitted.
    pub fn shutdown(mut self) {
        self.tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for AiPool {
    fn drop(&mut self) {
        self.tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Run one selection job: pick the nearest valid enemy and try to place
/// it in the unit's target slot.
pub fn run_job(job: &AiJob) {
    let selected = select_target(
        job.owner,
        job.position,
        job.group_to_attack,
        job.view_radius,
        &job.candidates,
    );
    if let Some(target) = selected {
        if job.handle.set_if_empty(target) {
            trace!(unit = ?job.unit, ?target, "ai worker placed a target");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warfront_core::components::Targeting;
    use warfront_core::enums::NetRole;
    use warfront_core::types::Position;
    use warfront_sim::engine::{SimConfig, SimulationEngine};
    use warfront_sim::spawn::UnitParams;

    fn engine_with_players() -> SimulationEngine {
        let mut engine = SimulationEngine::new(SimConfig {
            seed: 77,
            role: NetRole::SinglePlayer,
        });
        engine.add_player(1, "alpha");
        engine.add_player(2, "bravo");
        engine
    }

    #[test]
    fn test_pool_places_targets_through_handle() {
        let mut engine = engine_with_players();
        let unit = engine.spawn_unit(&UnitParams {
            weapon: None,
            owner: 1,
            ..Default::default()
        });
        let enemy = engine.spawn_unit(&UnitParams {
            weapon: None,
            owner: 2,
            position: Position {
                x: 100.0,
                y: 0.0,
                z: 0.0,
            },
            ..Default::default()
        });

        let jobs = engine.ai_jobs();
        assert_eq!(jobs.len(), 2, "both idle units get a job");

        let pool = AiPool::new(2);
        pool.submit_all(jobs);
        pool.shutdown();

        let placed = engine
            .world()
            .get::<&Targeting>(unit)
            .map(|t| t.target.get())
            .unwrap();
        assert_eq!(placed, Some(enemy));

        // The simulation adopts the placed target on its next tick.
        engine.tick();
        let targeting = engine.world().get::<&Targeting>(unit).unwrap();
        assert!(targeting.attack_on);
    }

    #[test]
    fn test_worker_never_overwrites_existing_target() {
        let mut engine = engine_with_players();
        let unit = engine.spawn_unit(&UnitParams {
            weapon: None,
            owner: 1,
            ..Default::default()
        });
        let near = engine.spawn_unit(&UnitParams {
            weapon: None,
            owner: 2,
            position: Position {
                x: 50.0,
                y: 0.0,
                z: 0.0,
            },
            ..Default::default()
        });
        let far = engine.spawn_unit(&UnitParams {
            weapon: None,
            owner: 2,
            position: Position {
                x: 200.0,
                y: 0.0,
                z: 0.0,
            },
            ..Default::default()
        });

        let jobs: Vec<_> = engine
            .ai_jobs()
            .into_iter()
            .filter(|j| j.unit == unit)
            .collect();
        assert_eq!(jobs.len(), 1);

        // A player order lands first; the stale worker result must lose.
        engine.attack_order(unit, far, warfront_core::enums::OrderOrigin::Player);
        for job in &jobs {
            run_job(job);
        }

        let placed = engine
            .world()
            .get::<&Targeting>(unit)
            .map(|t| t.target.get())
            .unwrap();
        assert_eq!(placed, Some(far), "CAS must not replace the player's target");
        let _ = near;
    }
}
