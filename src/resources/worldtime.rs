//! Simulation clock.
//!
//! `delta` is the scaled duration of the current tick and is what every
//! time-dependent system consumes; the tick length is chosen by the driver
//! and may vary from tick to tick.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    /// Scaled seconds since the simulation started.
    pub elapsed: f32,
    /// Scaled seconds of the current tick.
    pub delta: f32,
    /// Multiplier applied to the driver's elapsed time.
    pub time_scale: f32,
    /// Number of ticks advanced so far.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
