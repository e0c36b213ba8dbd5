//! Gameplay event kinds routed through the [`EventBus`](crate::resources::eventbus::EventBus).
//!
//! Each zero-sized type here names one bus channel. Invokers register per
//! entity when the entity is set up; listeners are installed by the systems
//! that consume them (see [`crate::systems::vitals::install_vitals_listeners`]).
//!
//! | Kind | Payload | Fired by |
//! |---|---|---|
//! | [`DamageDealt`] | [`Damage`] | pursuit agents on attack, suffocation |
//! | [`MeterRestored`] | [`Restore`] | pickups when collected |
//! | [`HealthChanged`] | [`MeterReading`] | vitals report system |
//! | [`OxygenChanged`] | [`MeterReading`] | vitals report system |
//! | [`SanityChanged`] | [`MeterReading`] | vitals report system |
//! | [`EntityDied`] | `Entity` | death system |

use bevy_ecs::prelude::Entity;

use crate::components::vitals::MeterKind;
use crate::resources::eventbus::BusEvent;

/// Damage applied from `source` to `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damage {
    pub source: Entity,
    pub target: Entity,
    pub amount: f32,
}

/// Refill of one meter of `target`, granted by `source`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Restore {
    pub source: Entity,
    pub target: Entity,
    pub kind: MeterKind,
    pub amount: f32,
}

/// Snapshot of a meter after it changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    pub entity: Entity,
    pub value: f32,
    pub max: f32,
}

impl MeterReading {
    /// Value as a fraction of max, in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.value / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

pub struct DamageDealt;
impl BusEvent for DamageDealt {
    type Payload = Damage;
    const NAME: &'static str = "damage_dealt";
}

pub struct MeterRestored;
impl BusEvent for MeterRestored {
    type Payload = Restore;
    const NAME: &'static str = "meter_restored";
}

pub struct HealthChanged;
impl BusEvent for HealthChanged {
    type Payload = MeterReading;
    const NAME: &'static str = "health_changed";
}

pub struct OxygenChanged;
impl BusEvent for OxygenChanged {
    type Payload = MeterReading;
    const NAME: &'static str = "oxygen_changed";
}

pub struct SanityChanged;
impl BusEvent for SanityChanged {
    type Payload = MeterReading;
    const NAME: &'static str = "sanity_changed";
}

pub struct EntityDied;
impl BusEvent for EntityDied {
    type Payload = Entity;
    const NAME: &'static str = "entity_died";
}
