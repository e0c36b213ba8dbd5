//! ECS components for entities.
//!
//! Submodules overview:
//! - [`boxcollider`] – axis-aligned collider, also the surface that blocks sight
//! - [`busmember`] – marker tying an entity's event bus registrations to its lifetime
//! - [`group`] – tag component for lookup by name
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`pickup`] – collectible meter refill
//! - [`pursuit`] – hostile agent state machine
//! - [`rigidbody`] – velocity actuator with speed cap
//! - [`timer`] – deferred callback that emits events when finished
//! - [`ttl`] – delayed despawn
//! - [`vitals`] – health, oxygen and sanity meters

pub mod boxcollider;
pub mod busmember;
pub mod group;
pub mod mapposition;
pub mod pickup;
pub mod pursuit;
pub mod rigidbody;
pub mod timer;
pub mod ttl;
pub mod vitals;
