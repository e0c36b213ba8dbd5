//! Velocity integration.

use bevy_ecs::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::resources::worldtime::WorldTime;

/// Integrate positions from rigid body velocities.
///
/// Frozen bodies are skipped. Velocities above a body's `max_speed` are
/// clamped before integration.
pub fn movement(mut query: Query<(&mut MapPosition, &mut RigidBody)>, time: Res<WorldTime>) {
    for (mut position, mut rigidbody) in query.iter_mut() {
        if rigidbody.frozen {
            continue;
        }
        let capped = rigidbody.capped(rigidbody.velocity);
        if capped != rigidbody.velocity {
            rigidbody.velocity = capped;
        }
        position.pos += rigidbody.velocity * time.delta;
    }
}
