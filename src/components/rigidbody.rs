//! Kinematic body component: the velocity actuator of an entity.
//!
//! The [`RigidBody`] component stores the current velocity and an optional
//! speed cap. Behaviour systems (pursuit, input) write the velocity; the
//! [`movement`](crate::systems::movement::movement) system integrates it into
//! [`MapPosition`](super::mapposition::MapPosition).
//!
//! Velocity changes are frame-rate independent: behaviours interpolate by
//! [`lerp_factor`], which scales with the elapsed tick time instead of
//! assuming a fixed step.
//!
//! The `frozen` flag disables integration, used for dead entities whose
//! position must not drift while they linger.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Interpolation factor for a tick of `dt` seconds at `rate` per second,
/// clamped to `0.0..=1.0`.
pub fn lerp_factor(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// Kinematic body storing velocity and a speed cap.
///
/// # Fields
/// - `velocity` - Current velocity in world units per second
/// - `max_speed` - Optional maximum speed clamp
/// - `frozen` - When true, movement system skips this entity
///
/// # Example
/// ```ignore
/// let mut rb = RigidBody::with_max_speed(4.0);
/// let goal = Vec2::new(4.0, 0.0);
/// rb.set_velocity(rb.velocity().lerp(goal, lerp_factor(dt, 1.0)));
/// ```
#[derive(Component, Clone, Debug, PartialEq)]
pub struct RigidBody {
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Optional maximum speed. If set, velocity magnitude is clamped to this value.
    pub max_speed: Option<f32>,
    /// When true, movement system skips all calculations for this entity.
    pub frozen: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Create a RigidBody at rest with no speed cap.
    pub fn new() -> Self {
        Self {
            velocity: Vec2::ZERO,
            max_speed: None,
            frozen: false,
        }
    }

    /// Create a RigidBody at rest whose speed never exceeds `max_speed`.
    pub fn with_max_speed(max_speed: f32) -> Self {
        Self {
            max_speed: Some(max_speed),
            ..Self::new()
        }
    }

    /// Builder: start with the given velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the velocity of the RigidBody.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Get the current velocity.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Current speed (velocity magnitude).
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Velocity after applying the speed cap, if any.
    pub fn capped(&self, velocity: Vec2) -> Vec2 {
        match self.max_speed {
            Some(max) => velocity.clamp_length_max(max.max(0.0)),
            None => velocity,
        }
    }

    /// Freeze the rigid body, preventing movement system from updating it.
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.velocity = Vec2::ZERO;
    }
}
