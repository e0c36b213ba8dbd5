use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Axis-aligned box collider placed relative to the entity position.
///
/// Colliders are the only surfaces that block line of sight: a ray stops at
/// the first box it enters.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct BoxCollider {
    pub size: Vec2,
    pub offset: Vec2,
}

impl BoxCollider {
    /// Create a BoxCollider with given size, anchored at the entity position.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            offset: Vec2::ZERO,
        }
    }

    /// Create a BoxCollider centered on the entity position.
    pub fn centered(width: f32, height: f32) -> Self {
        Self::new(width, height).with_offset(Vec2::new(-width * 0.5, -height * 0.5))
    }

    /// Modify BoxCollider with given offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Returns (min, max) of the collider AABB for a given entity position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn aabb(&self, position: Vec2) -> (Vec2, Vec2) {
        let p0 = position + self.offset;
        let p1 = p0 + self.size;
        (p0.min(p1), p0.max(p1))
    }

    /// Whether this collider at `position` overlaps `other` at `other_position`.
    /// Touching edges do not count.
    pub fn overlaps(&self, position: Vec2, other: &Self, other_position: Vec2) -> bool {
        let (min_a, max_a) = self.aabb(position);
        let (min_b, max_b) = other.aabb(other_position);
        min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
    }

    /// Distance along a ray to the first point inside this box (slab test).
    ///
    /// `direction` must be normalized. Returns `None` if the ray misses or the
    /// entry point lies beyond `max_distance`. A ray starting inside the box
    /// hits at distance `0.0`.
    pub fn ray_distance(
        &self,
        position: Vec2,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
    ) -> Option<f32> {
        let (min, max) = self.aabb(position);
        let mut t_enter = 0.0_f32;
        let mut t_exit = max_distance;

        for axis in 0..2 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < f32::EPSILON {
                // parallel to this slab
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (min[axis] - o) * inv;
            let mut t1 = (max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        Some(t_enter)
    }
}
