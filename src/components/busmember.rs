//! Event bus membership marker.
//!
//! Any entity that registers invokers or owns listeners on the
//! [`EventBus`](crate::resources::eventbus::EventBus) carries [`BusMember`].
//! When the component goes away (explicit removal or despawn) the
//! [`prune_bus_members`](crate::systems::eventbus::prune_bus_members) system
//! drops the entity's registrations from every channel.
//!
//! Use [`enlist`](crate::systems::eventbus::enlist) to register an invoker and
//! attach the marker in one step.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, Default)]
pub struct BusMember;
