//! Kinematic integration for in-flight projectiles.
//!
//! position += velocity * dt each tick. Unit movement itself belongs to
//! the pathfinding/steering collaborator; only entities carrying a bare
//! Position + Velocity pair (projectiles) integrate here.

use hecs::World;

use warfront_core::constants::DT;
use warfront_core::types::{Position, Velocity};

pub fn run(world: &mut World) {
    for (_entity, (pos, vel)) in world.query_mut::<(&mut Position, &Velocity)>() {
        pos.x += vel.x * DT;
        pos.y += vel.y * DT;
        pos.z += vel.z * DT;
    }
}
