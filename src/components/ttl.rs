//! Delayed deactivation.
//!
//! An entity carrying [`Ttl`] is despawned by
//! [`ttl_system`](crate::systems::ttl::ttl_system) once `remaining` runs out.
//! The death flow uses it so a killed agent lingers for a moment before it
//! disappears; despawning also clears its event bus registrations.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Ttl {
    /// Seconds left before despawn.
    pub remaining: f32,
}

impl Ttl {
    pub fn new(seconds: f32) -> Self {
        Ttl { remaining: seconds }
    }

    /// Consume `dt` seconds and report whether the entity should go.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}
