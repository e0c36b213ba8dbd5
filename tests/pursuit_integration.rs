//! Pursuit integration tests: agents, targets and obstructions driven through
//! the full tick schedule.

use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;
use glam::Vec2;

use hollowdeep::components::boxcollider::BoxCollider;
use hollowdeep::components::group::Group;
use hollowdeep::components::mapposition::MapPosition;
use hollowdeep::components::pursuit::{PursuitAgent, PursuitState};
use hollowdeep::components::rigidbody::RigidBody;
use hollowdeep::components::vitals::Vitals;
use hollowdeep::events::gameplay::{Damage, DamageDealt};
use hollowdeep::events::pursuit::PursuitStateChanged;
use hollowdeep::game::{build_schedule, build_world, tick};
use hollowdeep::resources::eventbus::EventBus;
use hollowdeep::resources::gameconfig::GameConfig;
use hollowdeep::scenario::Scenario;

const DT: f32 = 0.25;
const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

type Transitions = Arc<Mutex<Vec<(PursuitState, PursuitState)>>>;
type Strikes = Arc<Mutex<Vec<Damage>>>;

struct Harness {
    world: World,
    schedule: Schedule,
    transitions: Transitions,
    strikes: Strikes,
}

impl Harness {
    fn new() -> Self {
        let mut world = build_world(&GameConfig::new());
        let transitions: Transitions = Arc::new(Mutex::new(Vec::new()));
        let sink = transitions.clone();
        world.add_observer(move |trigger: On<PursuitStateChanged>| {
            let ev = trigger.event();
            sink.lock().unwrap().push((ev.from, ev.to));
        });
        let strikes: Strikes = Arc::new(Mutex::new(Vec::new()));
        let sink = strikes.clone();
        world
            .resource_mut::<EventBus>()
            .register_listener::<DamageDealt, _>(None, move |damage: &Damage, _: &mut Commands| {
                if damage.source != damage.target {
                    sink.lock().unwrap().push(*damage);
                }
            });
        Harness {
            world,
            schedule: build_schedule(),
            transitions,
            strikes,
        }
    }

    fn tick(&mut self) {
        tick(&mut self.world, &mut self.schedule, DT);
    }

    fn spawn_player(&mut self, x: f32, y: f32) -> Entity {
        self.world
            .spawn((
                Group::new("player"),
                MapPosition::new(x, y),
                RigidBody::new(),
                BoxCollider::centered(1.0, 1.0),
                Vitals::with_health(100.0),
            ))
            .id()
    }

    fn spawn_agent(&mut self, agent: PursuitAgent) -> Entity {
        let max_speed = agent.params.max_speed;
        self.world
            .spawn((
                MapPosition::new(0.0, 0.0),
                RigidBody::with_max_speed(max_speed),
                BoxCollider::centered(1.0, 1.0),
                agent,
            ))
            .id()
    }

    fn spawn_wall(&mut self, x: f32, y: f32, w: f32, h: f32) -> Entity {
        self.world
            .spawn((
                Group::new("wall"),
                MapPosition::new(x, y),
                BoxCollider::centered(w, h),
            ))
            .id()
    }

    fn state(&self, agent: Entity) -> PursuitState {
        self.world.get::<PursuitAgent>(agent).unwrap().state
    }
}

// ==================== EXAMPLE SCENARIO ====================

#[test]
fn agent_pursues_strikes_once_and_recovers() {
    let mut h = Harness::new();
    let player = h.spawn_player(30.0, 0.0);
    let agent = h.spawn_agent(PursuitAgent::default());

    h.tick();
    assert_eq!(h.state(agent), PursuitState::Pursue);
    assert_eq!(
        h.transitions.lock().unwrap()[0],
        (PursuitState::Idle, PursuitState::Pursue)
    );

    let mut ticks = 0;
    while h.state(agent) == PursuitState::Pursue {
        h.tick();
        ticks += 1;
        assert!(ticks < 200, "agent never reached the player");
    }
    assert_eq!(h.state(agent), PursuitState::Attack);

    let strikes = h.strikes.lock().unwrap().clone();
    assert_eq!(strikes.len(), 1);
    assert_eq!(strikes[0].source, agent);
    assert_eq!(strikes[0].target, player);
    assert!(approx_eq(strikes[0].amount, 15.0));
    assert!(approx_eq(
        h.world.get::<Vitals>(player).unwrap().health.value,
        85.0
    ));

    h.tick();
    assert_eq!(h.state(agent), PursuitState::Wait);
    assert!(approx_eq(
        h.world.get::<PursuitAgent>(agent).unwrap().countdown,
        3.0
    ));

    // 2.75s of Wait ticks keep the agent waiting, the 3.0s mark releases it.
    for _ in 0..11 {
        h.tick();
        assert_eq!(h.state(agent), PursuitState::Wait);
    }
    h.tick();
    assert_eq!(h.state(agent), PursuitState::Idle);
    assert_eq!(h.strikes.lock().unwrap().len(), 1);
}

#[test]
fn agent_speed_never_exceeds_max() {
    let mut h = Harness::new();
    h.spawn_player(25.0, 10.0);
    let agent = h.spawn_agent(PursuitAgent::default());

    for _ in 0..20 {
        h.tick();
        let body = h.world.get::<RigidBody>(agent).unwrap();
        assert!(body.speed() <= 4.0 + EPSILON);
    }
}

#[test]
fn corridor_scenario_reaches_attack() {
    let config = GameConfig::new();
    let mut h = Harness::new();
    let spawned = Scenario::corridor().spawn(&mut h.world, &config);
    let agent = spawned.agents[0];

    h.tick();
    assert_eq!(h.state(agent), PursuitState::Pursue);
    for _ in 0..40 {
        h.tick();
    }
    let transitions = h.transitions.lock().unwrap();
    assert!(transitions.contains(&(PursuitState::Pursue, PursuitState::Attack)));
    assert!(transitions.contains(&(PursuitState::Attack, PursuitState::Wait)));
    let strikes = h.strikes.lock().unwrap();
    assert!(!strikes.is_empty());
    assert_eq!(strikes[0].target, spawned.player.unwrap());
}

// ==================== VISIBILITY ====================

#[test]
fn wall_between_agent_and_target_drops_pursuit() {
    let mut h = Harness::new();
    let player = h.spawn_player(20.0, 0.0);
    h.spawn_wall(10.0, 0.0, 1.0, 10.0);
    let agent = h.spawn_agent(
        PursuitAgent::default()
            .with_target(player)
            .with_state(PursuitState::Pursue),
    );

    h.tick();
    assert_eq!(h.state(agent), PursuitState::Idle);
    assert_eq!(
        *h.transitions.lock().unwrap(),
        vec![(PursuitState::Pursue, PursuitState::Idle)]
    );
}

#[test]
fn obstructed_target_within_attack_range_is_not_struck() {
    let mut h = Harness::new();
    let player = h.spawn_player(2.8, 0.0);
    h.spawn_wall(2.0, 0.0, 0.2, 4.0);
    let agent = h.spawn_agent(
        PursuitAgent::default()
            .with_target(player)
            .with_state(PursuitState::Pursue),
    );

    for _ in 0..10 {
        h.tick();
    }
    assert_eq!(h.state(agent), PursuitState::Idle);
    assert!(h.strikes.lock().unwrap().is_empty());
}

#[test]
fn target_beyond_sight_range_is_ignored() {
    let mut h = Harness::new();
    h.spawn_player(45.0, 0.0);
    let agent = h.spawn_agent(PursuitAgent::default());

    for _ in 0..8 {
        h.tick();
    }
    assert_eq!(h.state(agent), PursuitState::Idle);
    assert!(h.transitions.lock().unwrap().is_empty());
}

#[test]
fn target_centre_just_past_sight_range_is_ignored() {
    let mut h = Harness::new();
    // The collider's near edge sits at 29.9, inside the 30 unit sight range.
    let player = h.spawn_player(30.4, 0.0);
    let agent = h.spawn_agent(PursuitAgent::default());

    h.tick();
    let pursuit = h.world.get::<PursuitAgent>(agent).unwrap();
    assert_eq!(pursuit.target, Some(player));
    assert_eq!(pursuit.state, PursuitState::Idle);
    assert!(h.transitions.lock().unwrap().is_empty());
}

// ==================== TARGET RESOLUTION ====================

#[test]
fn unplaced_tag_holder_never_becomes_a_target() {
    let mut h = Harness::new();
    h.world.spawn(Group::new("player"));
    let agent = h.spawn_agent(PursuitAgent::default());

    for _ in 0..5 {
        h.tick();
        assert!(h.world.get::<PursuitAgent>(agent).unwrap().target.is_none());
    }

    let player = h.spawn_player(10.0, 0.0);
    h.tick();
    assert_eq!(
        h.world.get::<PursuitAgent>(agent).unwrap().target,
        Some(player)
    );
}

#[test]
fn agent_resolves_target_by_tag() {
    let mut h = Harness::new();
    let survivor = h
        .world
        .spawn((Group::new("survivor"), MapPosition::new(5.0, 0.0)))
        .id();
    h.spawn_player(10.0, 0.0);
    let agent = h.spawn_agent(PursuitAgent::default().with_target_tag("survivor"));

    h.tick();
    assert_eq!(
        h.world.get::<PursuitAgent>(agent).unwrap().target,
        Some(survivor)
    );
}

#[test]
fn agent_without_target_stays_inert() {
    let mut h = Harness::new();
    let agent = h.spawn_agent(PursuitAgent::default());
    h.world
        .get_mut::<RigidBody>(agent)
        .unwrap()
        .set_velocity(Vec2::new(2.0, 0.0));

    for _ in 0..10 {
        h.tick();
    }
    let pursuit = h.world.get::<PursuitAgent>(agent).unwrap();
    assert_eq!(pursuit.state, PursuitState::Idle);
    assert!(pursuit.target.is_none());
    assert!(h.world.get::<RigidBody>(agent).unwrap().speed() < 2.0);
    assert!(h.transitions.lock().unwrap().is_empty());
}

#[test]
fn late_player_is_picked_up() {
    let mut h = Harness::new();
    let agent = h.spawn_agent(PursuitAgent::default());
    h.tick();
    h.tick();

    let player = h.spawn_player(10.0, 0.0);
    h.tick();
    assert_eq!(
        h.world.get::<PursuitAgent>(agent).unwrap().target,
        Some(player)
    );
    assert_eq!(h.state(agent), PursuitState::Pursue);
}

#[test]
fn despawned_target_returns_agent_to_idle() {
    let mut h = Harness::new();
    let player = h.spawn_player(20.0, 0.0);
    let agent = h.spawn_agent(PursuitAgent::default());

    h.tick();
    assert_eq!(h.state(agent), PursuitState::Pursue);

    h.world.despawn(player);
    h.tick();
    let pursuit = h.world.get::<PursuitAgent>(agent).unwrap();
    assert_eq!(pursuit.state, PursuitState::Idle);
    assert!(pursuit.target.is_none());
}
