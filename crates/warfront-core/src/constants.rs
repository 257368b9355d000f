//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Health thresholds ---

/// Fraction of starting health below which the "below half" cosmetic
/// flag is set (smoke effects, damaged mesh swap).
pub const HEALTH_BELOW_HALF: f64 = 0.5;

/// Fraction of starting health below which the "below quarter" flag is
/// set (fire effects).
pub const HEALTH_BELOW_QUARTER: f64 = 0.25;

// --- Targeting ---

/// Maximum entries returned by a neighbor query.
pub const MAX_NEIGHBORS: usize = 32;

/// Minimum seconds between target-selection rescans when no enemy is in
/// range. The actual interval is uniform in [min, max].
pub const TARGET_RESCAN_MIN_SECS: f64 = 5.0;

/// Maximum seconds between target-selection rescans.
pub const TARGET_RESCAN_MAX_SECS: f64 = 10.0;

/// Distance bias applied when computing a move-to goal for an attack
/// order: the waypoint lands this far inside `attack_radius` so the unit
/// ends up strictly within firing range.
pub const ATTACK_MOVE_BIAS: f64 = 110.0;

// --- Turret aim ---

/// Minimum seconds between idle scan angle picks.
pub const IDLE_SCAN_MIN_SECS: f64 = 4.0;

/// Maximum seconds between idle scan angle picks.
pub const IDLE_SCAN_MAX_SECS: f64 = 10.0;

/// Angular tolerance for clearing the park flag (1 degree).
pub const PARK_EPSILON: f64 = std::f64::consts::PI / 180.0;

/// Default turret turn speed (radians per tick).
pub const DEFAULT_TURN_SPEED: f64 = 0.05;

// --- Projectiles ---

/// Number of projectile spawn slots per unit. Slot indices are 1-based.
pub const SPAWN_SLOT_COUNT: usize = 4;

/// Range at which a projectile is considered to have reached its target
/// (meters).
pub const PROJECTILE_LETHAL_RADIUS: f64 = 10.0;

/// Default projectile speed (m/s).
pub const PROJECTILE_SPEED: f64 = 300.0;

/// Default ticks between shots from one spawn slot.
pub const DEFAULT_FIRE_INTERVAL_TICKS: u64 = 45;

// --- Reclaim worker ---

/// Sleep between empty kill-queue polls (milliseconds). A kill landing a
/// few milliseconds late is invisible to gameplay.
pub const RECLAIM_BACKOFF_MS: u64 = 2;

// --- Players ---

/// Maximum number of player slots in a session.
pub const MAX_PLAYERS: usize = 8;
