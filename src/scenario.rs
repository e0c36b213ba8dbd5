//! Data-driven scenarios.
//!
//! A [`Scenario`] describes what to spawn before the first tick: the player,
//! static walls that block sight, pursuit agents, meter pickups and scripted
//! beats (timers whose signal is logged or handled by observers). Scenarios
//! are JSON files:
//!
//! ```json
//! {
//!   "name": "corridor",
//!   "player": { "position": [30.0, 0.0], "velocity": [-4.0, 0.0], "oxygen": 60.0 },
//!   "walls": [ { "position": [15.0, 6.0], "size": [30.0, 1.0] } ],
//!   "agents": [ { "position": [0.0, 0.0], "overrides": { "attack_damage": 15.0 } } ],
//!   "pickups": [ { "position": [20.0, 0.0], "kind": "oxygen", "amount": 30.0 } ],
//!   "beats": [ { "after": 5.0, "signal": "lights_flicker" } ]
//! }
//! ```
//!
//! Missing fields take the defaults from [`GameConfig`].

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::info;
use serde::{Deserialize, Serialize};

use crate::components::boxcollider::BoxCollider;
use crate::components::group::Group;
use crate::components::mapposition::MapPosition;
use crate::components::pickup::Pickup;
use crate::components::pursuit::{PursuitAgent, PursuitParams, PursuitState};
use crate::components::rigidbody::RigidBody;
use crate::components::timer::Timer;
use crate::components::vitals::{MeterKind, Vitals};
use crate::resources::gameconfig::GameConfig;

fn unit_size() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_player_health() -> f32 {
    100.0
}

fn default_agent_health() -> f32 {
    50.0
}

fn pickup_size() -> [f32; 2] {
    [0.5, 0.5]
}

fn default_player_tag() -> String {
    "player".to_string()
}

/// The player-controlled entity. In a headless run it moves at a constant velocity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlayerSpec {
    pub position: [f32; 2],
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default = "unit_size")]
    pub size: [f32; 2],
    #[serde(default = "default_player_health")]
    pub health: f32,
    /// Oxygen capacity; no oxygen meter when absent.
    #[serde(default)]
    pub oxygen: Option<f32>,
    /// Sanity capacity; no sanity meter when absent.
    #[serde(default)]
    pub sanity: Option<f32>,
    #[serde(default = "default_player_tag")]
    pub tag: String,
}

/// A static obstruction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WallSpec {
    /// Center of the wall.
    pub position: [f32; 2],
    pub size: [f32; 2],
}

/// Per-agent replacements for the configured pursuit parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ParamOverrides {
    pub max_speed: Option<f32>,
    pub sight_range: Option<f32>,
    pub attack_range: Option<f32>,
    pub attack_cooldown: Option<f32>,
    pub attack_damage: Option<f32>,
    pub steer_rate: Option<f32>,
    pub max_lookahead: Option<f32>,
}

impl ParamOverrides {
    /// `base` with every present override applied.
    pub fn apply(&self, base: PursuitParams) -> PursuitParams {
        PursuitParams {
            max_speed: self.max_speed.unwrap_or(base.max_speed),
            sight_range: self.sight_range.unwrap_or(base.sight_range),
            attack_range: self.attack_range.unwrap_or(base.attack_range),
            attack_cooldown: self.attack_cooldown.unwrap_or(base.attack_cooldown),
            attack_damage: self.attack_damage.unwrap_or(base.attack_damage),
            steer_rate: self.steer_rate.unwrap_or(base.steer_rate),
            max_lookahead: self.max_lookahead.unwrap_or(base.max_lookahead),
        }
    }
}

/// A hostile agent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub position: [f32; 2],
    #[serde(default = "unit_size")]
    pub size: [f32; 2],
    #[serde(default = "default_agent_health")]
    pub health: f32,
    /// Tag to pursue; the configured `target_tag` when absent.
    #[serde(default)]
    pub target_tag: Option<String>,
    /// Starting state; `"idle"` when absent.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub overrides: ParamOverrides,
}

/// A meter refill lying on the map.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PickupSpec {
    pub position: [f32; 2],
    pub kind: MeterKind,
    pub amount: f32,
    #[serde(default = "pickup_size")]
    pub size: [f32; 2],
}

/// A scripted beat: a timer whose signal fires after `after` seconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BeatSpec {
    pub after: f32,
    pub signal: String,
    #[serde(default)]
    pub repeat: bool,
}

/// Everything spawned before the first tick.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub player: Option<PlayerSpec>,
    #[serde(default)]
    pub walls: Vec<WallSpec>,
    #[serde(default)]
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub pickups: Vec<PickupSpec>,
    #[serde(default)]
    pub beats: Vec<BeatSpec>,
}

/// Entities created by [`Scenario::spawn`].
#[derive(Debug, Clone, Default)]
pub struct SpawnedScenario {
    pub player: Option<Entity>,
    pub walls: Vec<Entity>,
    pub agents: Vec<Entity>,
    pub pickups: Vec<Entity>,
}

fn parse_state(name: &str) -> Result<PursuitState, String> {
    match name.to_ascii_lowercase().as_str() {
        "idle" => Ok(PursuitState::Idle),
        "pursue" => Ok(PursuitState::Pursue),
        "wait" => Ok(PursuitState::Wait),
        other => Err(format!("Unknown starting state '{}'", other)),
    }
}

impl Scenario {
    /// Parse a scenario from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let scenario: Scenario =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse scenario: {}", e))?;
        for agent in scenario.agents.iter() {
            if let Some(state) = agent.state.as_deref() {
                parse_state(state)?;
            }
        }
        Ok(scenario)
    }

    /// Load a scenario from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario {:?}: {}", path, e))?;
        Self::from_json(&content)
    }

    /// Pretty-printed JSON of this scenario.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize scenario: {}", e))
    }

    /// The built-in scenario: an agent at the origin and the player walking
    /// toward it from (30, 0), with a wall running alongside the corridor.
    pub fn corridor() -> Self {
        Scenario {
            name: "corridor".to_string(),
            player: Some(PlayerSpec {
                position: [30.0, 0.0],
                velocity: [-4.0, 0.0],
                size: unit_size(),
                health: default_player_health(),
                oxygen: Some(60.0),
                sanity: Some(100.0),
                tag: default_player_tag(),
            }),
            walls: vec![WallSpec {
                position: [15.0, 6.0],
                size: [40.0, 1.0],
            }],
            agents: vec![AgentSpec {
                position: [0.0, 0.0],
                size: unit_size(),
                health: default_agent_health(),
                target_tag: None,
                state: None,
                overrides: ParamOverrides::default(),
            }],
            pickups: Vec::new(),
            beats: vec![BeatSpec {
                after: 5.0,
                signal: "lights_flicker".to_string(),
                repeat: false,
            }],
        }
    }

    /// Spawn every described entity into `world`.
    pub fn spawn(&self, world: &mut World, config: &GameConfig) -> SpawnedScenario {
        let mut spawned = SpawnedScenario::default();

        if let Some(player) = self.player.as_ref() {
            let mut vitals = Vitals::with_health(player.health)
                .suffocation_damage(config.suffocation_damage)
                .death_linger(config.death_linger);
            if let Some(oxygen) = player.oxygen {
                vitals = vitals.oxygen(oxygen, config.oxygen_drain);
            }
            if let Some(sanity) = player.sanity {
                vitals = vitals.sanity(sanity, config.sanity_drain);
            }
            let entity = world
                .spawn((
                    Group::new(player.tag.clone()),
                    MapPosition::new(player.position[0], player.position[1]),
                    RigidBody::new().with_velocity(Vec2::from(player.velocity)),
                    BoxCollider::centered(player.size[0], player.size[1]),
                    vitals,
                ))
                .id();
            spawned.player = Some(entity);
        }

        for wall in self.walls.iter() {
            let entity = world
                .spawn((
                    Group::new("wall"),
                    MapPosition::new(wall.position[0], wall.position[1]),
                    BoxCollider::centered(wall.size[0], wall.size[1]),
                ))
                .id();
            spawned.walls.push(entity);
        }

        for agent in self.agents.iter() {
            let params = agent.overrides.apply(config.pursuit);
            let tag = agent
                .target_tag
                .clone()
                .unwrap_or_else(|| config.target_tag.clone());
            let state = agent
                .state
                .as_deref()
                .and_then(|s| parse_state(s).ok())
                .unwrap_or_default();
            let entity = world
                .spawn((
                    Group::new("agent"),
                    MapPosition::new(agent.position[0], agent.position[1]),
                    RigidBody::with_max_speed(params.max_speed),
                    BoxCollider::centered(agent.size[0], agent.size[1]),
                    Vitals::with_health(agent.health).death_linger(config.death_linger),
                    PursuitAgent::new(params)
                        .with_target_tag(tag)
                        .with_state(state),
                ))
                .id();
            spawned.agents.push(entity);
        }

        for pickup in self.pickups.iter() {
            let entity = world
                .spawn((
                    Group::new("pickup"),
                    MapPosition::new(pickup.position[0], pickup.position[1]),
                    BoxCollider::centered(pickup.size[0], pickup.size[1]),
                    Pickup::new(pickup.kind, pickup.amount),
                ))
                .id();
            spawned.pickups.push(entity);
        }

        for beat in self.beats.iter() {
            let timer = if beat.repeat {
                Timer::repeating(beat.after, beat.signal.clone())
            } else {
                Timer::new(beat.after, beat.signal.clone())
            };
            world.spawn((Group::new("beat"), timer));
        }

        info!(
            "Scenario '{}': player={}, walls={}, agents={}, pickups={}, beats={}",
            self.name,
            spawned.player.is_some(),
            spawned.walls.len(),
            spawned.agents.len(),
            spawned.pickups.len(),
            self.beats.len()
        );
        spawned
    }
}
