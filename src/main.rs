//! Hollowdeep headless runner.
//!
//! Simulates the survival-horror core without a window:
//! - **bevy_ecs** for entity-component-system architecture
//! - an [`EventBus`](resources::eventbus::EventBus) connecting damage, meters and death
//! - pursuit agents chasing the player through a JSON-described scenario
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults when missing) and the scenario
//! 2. Build the world, register observers and bus listeners that log gameplay
//! 3. Advance the schedule `ticks` times with a fixed `dt`
//! 4. Print a summary of the surviving entities
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --scenario assets/scenarios/corridor.json --ticks 600
//! ```

mod components;
mod events;
mod game;
mod resources;
mod scenario;
mod systems;

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};

use crate::components::group::Group;
use crate::components::mapposition::MapPosition;
use crate::components::pursuit::PursuitAgent;
use crate::components::vitals::{Dead, Vitals};
use crate::events::gameplay::{Damage, DamageDealt, EntityDied, MeterReading, OxygenChanged};
use crate::events::pursuit::PursuitStateChanged;
use crate::events::timer::TimerEvent;
use crate::resources::eventbus::EventBus;
use crate::resources::gameconfig::GameConfig;
use crate::scenario::Scenario;

/// Hollowdeep headless simulation
#[derive(Parser)]
#[command(version, about = "Runs the Hollowdeep pursuit and vitals simulation without a window.")]
struct Cli {
    /// Configuration file (INI). Defaults are used when it cannot be read.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Scenario file (JSON). The built-in corridor scenario when absent.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,

    /// Number of ticks to simulate (overrides `[simulation] ticks`).
    #[arg(long)]
    ticks: Option<u32>,

    /// Seconds per tick (default: 1 / `[simulation] tick_rate`).
    #[arg(long, value_name = "SECONDS")]
    dt: Option<f32>,

    /// Print the scenario as JSON and exit.
    #[arg(long)]
    dump_scenario: bool,
}

fn install_observers(world: &mut World) {
    world.add_observer(|trigger: On<PursuitStateChanged>| {
        let ev = trigger.event();
        info!("Agent {:?}: {:?} -> {:?}", ev.entity, ev.from, ev.to);
    });
    world.add_observer(|trigger: On<TimerEvent>| {
        let ev = trigger.event();
        info!("Beat '{}' on {:?}", ev.signal, ev.entity);
    });
}

fn install_log_listeners(bus: &mut EventBus) {
    bus.register_listener::<DamageDealt, _>(None, |damage: &Damage, _commands: &mut Commands| {
        if damage.source != damage.target {
            info!(
                "{:?} hits {:?} for {}",
                damage.source, damage.target, damage.amount
            );
        }
    });
    bus.register_listener::<OxygenChanged, _>(
        None,
        |reading: &MeterReading, _commands: &mut Commands| {
            if reading.value <= 0.0 {
                warn!("{:?} is out of oxygen", reading.entity);
            }
        },
    );
    bus.register_listener::<EntityDied, _>(None, |entity: &Entity, _commands: &mut Commands| {
        info!("{:?} is dead", entity);
    });
}

fn print_summary(world: &mut World) {
    let mut query = world.query::<(
        Entity,
        &Group,
        &MapPosition,
        Option<&Vitals>,
        Option<&PursuitAgent>,
        Has<Dead>,
    )>();
    for (entity, group, position, vitals, agent, dead) in query.iter(world) {
        let health = vitals.map_or(String::from("-"), |v| format!("{:.1}", v.health.value));
        let state = agent.map_or(String::from("-"), |a| format!("{:?}", a.state));
        println!(
            "{:?} [{}] at ({:.2}, {:.2}) health={} state={}{}",
            entity,
            group.name(),
            position.pos.x,
            position.pos.y,
            health,
            state,
            if dead { " (dead)" } else { "" }
        );
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }

    let scenario = match cli.scenario.as_ref() {
        Some(path) => match Scenario::load(path) {
            Ok(scenario) => scenario,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => Scenario::corridor(),
    };

    if cli.dump_scenario {
        match scenario.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let ticks = cli.ticks.unwrap_or(config.ticks);
    let dt = cli.dt.unwrap_or_else(|| config.fixed_dt());
    info!("Hollowdeep: {} ticks of {:.4}s", ticks, dt);

    let mut world = game::build_world(&config);
    install_observers(&mut world);
    install_log_listeners(&mut world.resource_mut::<EventBus>());
    scenario.spawn(&mut world, &config);

    let mut schedule = game::build_schedule();
    game::run(&mut world, &mut schedule, ticks, dt);

    print_summary(&mut world);
}
