//! Error taxonomy for the combat core.
//!
//! Precondition violations are surfaced to the caller immediately and
//! never silently clamped. Missing collaborators are handled at the call
//! site by skipping the frame's work, not through this type.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CombatError {
    /// A turret angle was assigned outside [-pi, pi].
    #[error("angle {0} outside [-pi, pi]")]
    AngleOutOfRange(f64),

    /// A projectile spawn slot index was outside 1..=4.
    #[error("spawn slot {0} outside 1..={max}", max = crate::constants::SPAWN_SLOT_COUNT)]
    SpawnSlotOutOfRange(usize),
}
