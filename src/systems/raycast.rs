//! Ray casting against box colliders.
//!
//! Line of sight only needs one primitive from physics: "what is the first
//! thing along this bounded segment". That primitive is the [`RayCast`] trait,
//! so the pursuit logic can run against the in-crate [`ColliderSet`] or any
//! other provider.

use bevy_ecs::prelude::Entity;
use glam::Vec2;

use crate::components::boxcollider::BoxCollider;

/// First obstruction found along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
}

/// Bounded ray cast returning the nearest hit.
pub trait RayCast {
    /// Cast from `origin` along normalized `direction` for at most
    /// `max_distance`, skipping the collider of `ignore` (usually the caster).
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        ignore: Option<Entity>,
    ) -> Option<RayHit>;
}

/// Snapshot of collider placements for one tick.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    entries: Vec<(Entity, Vec2, BoxCollider)>,
}

impl FromIterator<(Entity, Vec2, BoxCollider)> for ColliderSet {
    fn from_iter<I: IntoIterator<Item = (Entity, Vec2, BoxCollider)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl RayCast for ColliderSet {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        ignore: Option<Entity>,
    ) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;
        for (entity, position, collider) in self.entries.iter() {
            if Some(*entity) == ignore {
                continue;
            }
            let Some(distance) = collider.ray_distance(*position, origin, direction, max_distance)
            else {
                continue;
            };
            if nearest.is_none_or(|n| distance < n.distance) {
                nearest = Some(RayHit {
                    entity: *entity,
                    distance,
                });
            }
        }
        nearest
    }
}

/// Whether `observer` at `origin` can see `target` within `sight_range`.
///
/// Holds iff the target's position is within `sight_range` and the first
/// collider the ray hits is the target's. An observer standing exactly on the
/// target sees it.
pub fn line_of_sight(
    caster: &impl RayCast,
    observer: Entity,
    origin: Vec2,
    target: Entity,
    target_position: Vec2,
    sight_range: f32,
) -> bool {
    let to_target = target_position - origin;
    if to_target.length() > sight_range {
        return false;
    }
    let direction = to_target.normalize_or_zero();
    if direction == Vec2::ZERO {
        return sight_range >= 0.0;
    }
    caster
        .cast_ray(origin, direction, sight_range, Some(observer))
        .is_some_and(|hit| hit.entity == target)
}
