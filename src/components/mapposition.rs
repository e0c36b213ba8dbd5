//! World-space position of an entity.
//!
//! The position is the entity's pivot; colliders are placed relative to it
//! with [`BoxCollider::offset`](super::boxcollider::BoxCollider).

use bevy_ecs::prelude::Component;
use glam::Vec2;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }

    pub fn from_vec(pos: Vec2) -> Self {
        Self { pos }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &MapPosition) -> f32 {
        self.pos.distance(other.pos)
    }
}
