//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions taking `&mut World` plus the explicit
//! context they need. They do not own state — state lives in components
//! and in the engine.

pub mod health;
pub mod movement;
pub mod projectiles;
pub mod reclaim;
pub mod snapshot;
pub mod targeting;
pub mod turret;
