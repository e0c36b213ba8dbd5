//! Pursuit state transition event.
//!
//! Triggered by [`pursuit_system`](crate::systems::pursuit::pursuit_system)
//! whenever an agent's [`PursuitState`] changes. Observers can use it for
//! presentation (growls, music stings) without touching the state machine.
//!
//! ```ignore
//! world.add_observer(|trigger: On<PursuitStateChanged>| {
//!     let ev = trigger.event();
//!     log::info!("{:?}: {:?} -> {:?}", ev.entity, ev.from, ev.to);
//! });
//! ```

use bevy_ecs::prelude::*;

use crate::components::pursuit::PursuitState;

/// Emitted once per transition, after the new state's entry action ran.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PursuitStateChanged {
    pub entity: Entity,
    pub from: PursuitState,
    pub to: PursuitState,
}
