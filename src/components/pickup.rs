//! Collectible meter refills.
//!
//! A pickup needs a [`MapPosition`](super::mapposition::MapPosition) and a
//! [`BoxCollider`](super::boxcollider::BoxCollider) to be collected. It does
//! not block line of sight.

use bevy_ecs::prelude::Component;

use super::vitals::MeterKind;

/// Refills `amount` of the `kind` meter of the first living entity that
/// touches it, then disappears.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub kind: MeterKind,
    pub amount: f32,
}

impl Pickup {
    pub fn new(kind: MeterKind, amount: f32) -> Self {
        Self { kind, amount }
    }
}
