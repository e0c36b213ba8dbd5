//! Health, oxygen and sanity meters.
//!
//! [`Vitals`] groups the meters of one entity. Health is always present;
//! oxygen and sanity are optional (hostile agents only have health).
//!
//! Meters never mutate each other directly. Oxygen depletion hurts through
//! the same [`DamageDealt`](crate::events::gameplay::DamageDealt) channel as a
//! pursuit strike, and changes are announced on the bus by
//! [`report_vitals_system`](crate::systems::vitals::report_vitals_system).
//! Refills arrive the same way, as
//! [`MeterRestored`](crate::events::gameplay::MeterRestored).

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Which meter a [`Meter`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterKind {
    Health,
    Oxygen,
    Sanity,
}

/// A bounded value that can drain over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meter {
    pub value: f32,
    pub max: f32,
    /// Units lost per second; 0 for meters that only change on events.
    pub drain_per_second: f32,
    /// Last value announced on the bus.
    pub(crate) reported: f32,
}

impl Meter {
    /// Full meter with no drain.
    pub fn full(max: f32) -> Self {
        Self {
            value: max,
            max,
            drain_per_second: 0.0,
            reported: max,
        }
    }

    /// Builder: drain this many units per second.
    pub fn draining(mut self, per_second: f32) -> Self {
        self.drain_per_second = per_second;
        self
    }

    /// Subtract `amount`, clamped at zero. Returns the amount actually removed.
    pub fn deplete(&mut self, amount: f32) -> f32 {
        let before = self.value;
        self.value = (self.value - amount.max(0.0)).max(0.0);
        before - self.value
    }

    /// Add `amount`, clamped at max. Returns the amount actually added.
    pub fn restore(&mut self, amount: f32) -> f32 {
        let before = self.value;
        self.value = (self.value + amount.max(0.0)).min(self.max);
        self.value - before
    }

    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }

    /// Whether the value moved since it was last announced.
    pub fn changed_since_report(&self) -> bool {
        self.value != self.reported
    }

    pub(crate) fn mark_reported(&mut self) {
        self.reported = self.value;
    }
}

/// The meters of one entity plus the parameters of their side effects.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Vitals {
    pub health: Meter,
    pub oxygen: Option<Meter>,
    pub sanity: Option<Meter>,
    /// Health lost per second while oxygen is empty.
    pub suffocation_damage: f32,
    /// Seconds a dead entity lingers before it is despawned.
    pub death_linger: f32,
}

impl Vitals {
    /// Health-only vitals.
    pub fn with_health(max: f32) -> Self {
        Self {
            health: Meter::full(max),
            oxygen: None,
            sanity: None,
            suffocation_damage: 5.0,
            death_linger: 1.0,
        }
    }

    /// Builder: add a draining oxygen meter.
    pub fn oxygen(mut self, max: f32, drain_per_second: f32) -> Self {
        self.oxygen = Some(Meter::full(max).draining(drain_per_second));
        self
    }

    /// Builder: add a draining sanity meter.
    pub fn sanity(mut self, max: f32, drain_per_second: f32) -> Self {
        self.sanity = Some(Meter::full(max).draining(drain_per_second));
        self
    }

    pub fn suffocation_damage(mut self, per_second: f32) -> Self {
        self.suffocation_damage = per_second;
        self
    }

    pub fn death_linger(mut self, seconds: f32) -> Self {
        self.death_linger = seconds;
        self
    }

    pub fn meter(&self, kind: MeterKind) -> Option<&Meter> {
        match kind {
            MeterKind::Health => Some(&self.health),
            MeterKind::Oxygen => self.oxygen.as_ref(),
            MeterKind::Sanity => self.sanity.as_ref(),
        }
    }

    pub fn meter_mut(&mut self, kind: MeterKind) -> Option<&mut Meter> {
        match kind {
            MeterKind::Health => Some(&mut self.health),
            MeterKind::Oxygen => self.oxygen.as_mut(),
            MeterKind::Sanity => self.sanity.as_mut(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_empty()
    }

    pub fn is_suffocating(&self) -> bool {
        self.oxygen.is_some_and(|o| o.is_empty())
    }
}

/// Marker for entities whose health reached zero.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Dead;
