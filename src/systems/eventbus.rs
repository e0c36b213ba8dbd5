//! Event bus membership upkeep.
//!
//! - [`enlist`] registers an entity as an invoker and tags it with
//!   [`BusMember`]
//! - [`listen`] registers a listener owned by an entity and tags the owner
//!   the same way
//! - [`prune_bus_members`] drops the registrations of entities that lost the
//!   tag, which includes every despawned member

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::busmember::BusMember;
use crate::resources::eventbus::{BusEvent, EventBus, ListenerId};

/// Register `entity` as an invoker of `K` and mark it as a bus member.
///
/// Returns `false` if it already was an invoker of `K`.
pub fn enlist<K: BusEvent>(bus: &mut EventBus, commands: &mut Commands, entity: Entity) -> bool {
    let added = bus.register_invoker::<K>(entity);
    commands.entity(entity).try_insert(BusMember);
    added
}

/// Register a listener of `K` owned by `owner` and mark the owner as a bus member.
///
/// The listener goes away with its owner. Owned listeners registered straight
/// on the [`EventBus`] are only pruned if the owner is a member already.
pub fn listen<K, F>(
    bus: &mut EventBus,
    commands: &mut Commands,
    owner: Entity,
    callback: F,
) -> ListenerId
where
    K: BusEvent,
    F: for<'w, 's> FnMut(&K::Payload, &mut Commands<'w, 's>) + Send + Sync + 'static,
{
    let id = bus.register_listener::<K, _>(Some(owner), callback);
    commands.entity(owner).try_insert(BusMember);
    id
}

/// Remove bus registrations owned by entities whose [`BusMember`] went away.
pub fn prune_bus_members(mut bus: ResMut<EventBus>, mut removed: RemovedComponents<BusMember>) {
    for entity in removed.read() {
        let pruned = bus.remove_owner(entity);
        if pruned > 0 {
            debug!("EventBus: pruned {} registrations of {:?}", pruned, entity);
        }
    }
}
