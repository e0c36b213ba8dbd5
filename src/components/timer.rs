//! Deferred callback timer.
//!
//! A [`Timer`] accumulates elapsed time every tick. When it reaches its
//! duration the [`update_timers`](crate::systems::timer::update_timers) system
//! triggers a [`TimerEvent`](crate::events::timer::TimerEvent) carrying the
//! timer's signal. One-shot timers are then removed; repeating timers keep
//! the overshoot so periodic effects do not drift.
//!
//! Timed effects that would otherwise suspend (flashes, scripted beats) are
//! expressed as a `Timer` plus an observer for its signal.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Timer {
    /// Seconds until the timer fires.
    pub duration: f32,
    /// Seconds accumulated since the last firing.
    pub elapsed: f32,
    /// Signal name carried by the emitted event.
    pub signal: String,
    /// Fire every `duration` seconds instead of once.
    pub repeat: bool,
}

impl Timer {
    /// One-shot timer firing `signal` after `duration` seconds.
    pub fn new(duration: f32, signal: impl Into<String>) -> Self {
        Timer {
            duration,
            elapsed: 0.0,
            signal: signal.into(),
            repeat: false,
        }
    }

    /// Timer firing `signal` every `period` seconds.
    pub fn repeating(period: f32, signal: impl Into<String>) -> Self {
        Timer {
            repeat: true,
            ..Self::new(period, signal)
        }
    }

    /// Add `dt` and report whether the timer completed.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.finished()
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Rearm a repeating timer, keeping the overshoot.
    pub fn reset(&mut self) {
        self.elapsed -= self.duration;
    }
}
