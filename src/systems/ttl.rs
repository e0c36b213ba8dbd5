//! TTL (time-to-live) system.
//!
//! Each tick the remaining time of every [`Ttl`] is reduced by the scaled
//! delta; entities whose time ran out are despawned.

use bevy_ecs::prelude::*;

use crate::components::ttl::Ttl;
use crate::resources::worldtime::WorldTime;

/// Decrements TTL and despawns entities when it reaches zero.
pub fn ttl_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut Ttl)>,
    mut commands: Commands,
) {
    for (entity, mut ttl) in query.iter_mut() {
        if ttl.tick(world_time.delta) {
            log::debug!("Ttl expired, despawning {:?}", entity);
            commands.entity(entity).try_despawn();
        }
    }
}
