//! Simulation systems.
//!
//! This module groups all ECS systems that advance the simulation. The order
//! they run in is fixed by [`crate::game::build_schedule`].
//!
//! Submodules overview
//! - [`eventbus`] – enlist invokers, attach owned listeners and prune registrations of torn-down entities
//! - [`movement`] – integrate positions from rigid body velocities and time
//! - [`pickup`] – collect meter refills on contact
//! - [`pursuit`] – target resolution and the per-tick pursuit update
//! - [`raycast`] – ray casting against box colliders and line of sight
//! - [`time`] – update simulation time and delta
//! - [`timer`] – advance deferred-callback timers and emit their events
//! - [`ttl`] – delayed despawn
//! - [`vitals`] – meter drain, change reports, damage and refill application, death

pub mod eventbus;
pub mod movement;
pub mod pickup;
pub mod pursuit;
pub mod raycast;
pub mod time;
pub mod timer;
pub mod ttl;
pub mod vitals;
