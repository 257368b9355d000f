//! Bounded-rate turn math and the per-tick aim evaluation.

use rand::Rng;

use warfront_core::constants::PARK_EPSILON;
use warfront_core::error::CombatError;

use std::f64::consts::{PI, TAU};

/// Wrap an angle into [-pi, pi].
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid maps exactly +pi to -pi; keep +pi representable.
    if wrapped == -PI && angle > 0.0 {
        PI
    } else {
        wrapped
    }
}

/// Validate that an angle is a legal turret assignment.
///
/// Angles outside [-pi, pi] are a contract violation from the caller and
/// are rejected rather than clamped, so integration bugs surface early.
pub fn validate_angle(angle: f64) -> Result<f64, CombatError> {
    if !angle.is_finite() || !(-PI..=PI).contains(&angle) {
        return Err(CombatError::AngleOutOfRange(angle));
    }
    Ok(angle)
}

/// One bounded-rate turn step.
///
/// Moves `current` toward `desired + facing_offset` by at most
/// `turn_speed` radians, wrapping so the turret always takes the short
/// way around. `turn_speed` is radians per tick, pre-scaled by the
/// caller where continuous rotation is tracked.
pub fn turn_toward(desired: f64, current: f64, turn_speed: f64, facing_offset: f64) -> f64 {
    let adjusted_desired = desired + facing_offset;
    let raw_difference = wrap_angle(adjusted_desired - current);
    let clamped = raw_difference.clamp(-turn_speed, turn_speed);
    wrap_angle(current + clamped)
}

/// Pick a uniformly random idle scan angle in [-pi, pi].
pub fn pick_scan_angle<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(-PI..PI)
}

/// Input to the aim controller for a single turret, one tick.
#[derive(Debug, Clone, Copy)]
pub struct AimContext {
    /// Current turret facing, relative to the hull.
    pub facing: f64,
    /// Angle the controller was last steering toward.
    pub desired: f64,
    /// Maximum facing change this tick (radians).
    pub turn_speed: f64,
    /// Mount correction added to the desired angle.
    pub facing_offset: f64,
    /// Hull facing in the world frame.
    pub hull_facing: f64,
    /// Park mode: steer to straight-ahead and report when arrived.
    pub parking: bool,
    /// World-frame bearing to a live target, if attacking.
    pub target_bearing: Option<f64>,
}

/// Output of one aim evaluation.
#[derive(Debug, Clone, Copy)]
pub struct AimUpdate {
    pub facing: f64,
    pub desired: f64,
    /// Park completed this tick (within 1 degree of straight ahead).
    pub park_cleared: bool,
}

/// Evaluate one turret for one tick.
///
/// With a live target the desired angle tracks it every frame; the hull
/// facing is subtracted so the turret's desired angle is independent of
/// hull rotation (and re-added by the renderer when composing the world
/// transform). Without a target the desired angle is whatever the idle
/// scan last picked. Park mode overrides both.
pub fn evaluate(ctx: &AimContext) -> AimUpdate {
    if ctx.parking {
        // Straight ahead relative to the hull is zero in turret frame;
        // the mount offset shifts the rest position, so arrival is
        // measured against the offset rather than raw zero.
        let facing = turn_toward(0.0, ctx.facing, ctx.turn_speed, ctx.facing_offset);
        let park_cleared = wrap_angle(facing - ctx.facing_offset).abs() < PARK_EPSILON;
        return AimUpdate {
            facing,
            desired: 0.0,
            park_cleared,
        };
    }

    let desired = match ctx.target_bearing {
        Some(bearing) => wrap_angle(bearing - ctx.hull_facing),
        None => ctx.desired,
    };

    AimUpdate {
        facing: turn_toward(desired, ctx.facing, ctx.turn_speed, ctx.facing_offset),
        desired,
        park_cleared: false,
    }
}

/// Compose the world-frame turret facing for rendering/aim checks: the
/// hull facing re-added after the hull-relative computation.
pub fn world_facing(turret_facing: f64, hull_facing: f64) -> f64 {
    wrap_angle(turret_facing + hull_facing)
}
