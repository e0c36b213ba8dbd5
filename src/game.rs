//! World and schedule construction, and the tick driver.
//!
//! The simulation is headless: the driver (the binary, or a test) decides the
//! elapsed time of every tick and calls [`tick`]. Each tick:
//!
//! 1. [`update_world_time`] scales the elapsed time into `WorldTime::delta`
//! 2. the schedule runs once (see [`build_schedule`] for the order)
//! 3. change trackers are cleared for the next tick

use bevy_ecs::prelude::*;
use log::info;

use crate::events::gameplay::{
    DamageDealt, EntityDied, HealthChanged, MeterRestored, OxygenChanged, SanityChanged,
};
use crate::resources::eventbus::EventBus;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::eventbus::prune_bus_members;
use crate::systems::movement::movement;
use crate::systems::pickup::{collect_pickups_system, pickup_setup_system};
use crate::systems::pursuit::{pursuit_setup_system, pursuit_system, resolve_targets_system};
use crate::systems::time::update_world_time;
use crate::systems::timer::update_timers;
use crate::systems::ttl::ttl_system;
use crate::systems::vitals::{
    death_system, drain_vitals_system, install_vitals_listeners, report_vitals_system,
    vitals_setup_system,
};

/// Event bus with every gameplay channel declared and the vitals listeners installed.
pub fn build_bus() -> EventBus {
    let mut bus = EventBus::new();
    bus.declare::<DamageDealt>();
    bus.declare::<MeterRestored>();
    bus.declare::<HealthChanged>();
    bus.declare::<OxygenChanged>();
    bus.declare::<SanityChanged>();
    bus.declare::<EntityDied>();
    install_vitals_listeners(&mut bus);
    bus
}

/// Create a world holding the clock, the event bus and a copy of `config`.
pub fn build_world(config: &GameConfig) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    world.insert_resource(build_bus());
    world.insert_resource(config.clone());
    world
}

/// The per-tick schedule.
///
/// Setup runs first so entities spawned since the last tick take part in
/// this one. Pursuit decides velocities before movement integrates them;
/// pickups are collected at the new positions; damage queued by strikes and
/// refills queued by pickups are applied before vitals are drained and
/// reported; deaths
/// are handled before timers and despawns; bus pruning runs last so it sees
/// this tick's despawns.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            pursuit_setup_system,
            vitals_setup_system,
            pickup_setup_system,
            resolve_targets_system,
            pursuit_system,
            movement,
            collect_pickups_system,
            drain_vitals_system,
            report_vitals_system,
            death_system,
            update_timers,
            ttl_system,
            prune_bus_members,
        )
            .chain(),
    );
    schedule
}

/// Advance the simulation by `dt` unscaled seconds.
pub fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
    world.clear_trackers();
}

/// Run `ticks` ticks of `dt` seconds each.
pub fn run(world: &mut World, schedule: &mut Schedule, ticks: u32, dt: f32) {
    for _ in 0..ticks {
        tick(world, schedule, dt);
    }
    let time = world.resource::<WorldTime>();
    info!(
        "Simulated {} ticks ({:.2}s of world time)",
        time.frame_count, time.elapsed
    );
}
