//! Turret aim controller.
//!
//! Pure functions that compute bounded-rate turret facing updates.
//! No ECS dependency — operates on plain data, so the same math serves
//! the simulation systems and any offline tooling.

pub mod controller;

pub use controller::{
    evaluate, pick_scan_angle, turn_toward, validate_angle, world_facing, wrap_angle, AimContext,
    AimUpdate,
};
