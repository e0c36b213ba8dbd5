//! Pickup systems.
//!
//! - [`pickup_setup_system`] – enlist new pickups as [`MeterRestored`] invokers
//! - [`collect_pickups_system`] – hand each touched pickup to one collector
//!
//! Collection only fires the event and despawns the pickup. The refill itself
//! is applied by the vitals listener, and the despawn prunes the pickup's
//! registration.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::boxcollider::BoxCollider;
use crate::components::mapposition::MapPosition;
use crate::components::pickup::Pickup;
use crate::components::vitals::{Dead, Vitals};
use crate::events::gameplay::{MeterRestored, Restore};
use crate::resources::eventbus::EventBus;
use crate::systems::eventbus::enlist;

pub fn pickup_setup_system(
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    query: Query<Entity, Added<Pickup>>,
) {
    for entity in query.iter() {
        enlist::<MeterRestored>(&mut bus, &mut commands, entity);
    }
}

/// Fire [`MeterRestored`] for every pickup that overlaps a living entity
/// carrying the matching meter, then despawn the pickup.
///
/// A pickup is consumed by at most one collector per tick.
pub fn collect_pickups_system(
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    pickups: Query<(Entity, &Pickup, &MapPosition, &BoxCollider)>,
    collectors: Query<(Entity, &Vitals, &MapPosition, &BoxCollider), Without<Dead>>,
) {
    for (pickup_entity, pickup, pickup_position, pickup_collider) in pickups.iter() {
        let collector = collectors.iter().find(|(_, vitals, position, collider)| {
            vitals.meter(pickup.kind).is_some()
                && collider.overlaps(position.pos, pickup_collider, pickup_position.pos)
        });
        let Some((target, ..)) = collector else {
            continue;
        };

        let restore = Restore {
            source: pickup_entity,
            target,
            kind: pickup.kind,
            amount: pickup.amount,
        };
        let delivered = bus.fire::<MeterRestored>(pickup_entity, &restore, &mut commands);
        if delivered == 0 {
            debug!("Pickup {:?} touched by {:?} but nobody listens", pickup_entity, target);
        }
        info!(
            "{:?} collected {} {:?} from pickup {:?}",
            target, pickup.amount, pickup.kind, pickup_entity
        );
        commands.entity(pickup_entity).try_despawn();
    }
}
