//! Combat simulation engine.
//!
//! `SimulationEngine` owns the hecs ECS world, processes network
//! commands, runs the per-tick system pipeline, and produces
//! `WorldSnapshot`s. Completely headless, enabling deterministic tests.

pub mod context;
pub mod engine;
pub mod spawn;
pub mod systems;
