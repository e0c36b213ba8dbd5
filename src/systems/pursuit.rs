//! Pursuit systems.
//!
//! - [`pursuit_setup_system`] – enlist new agents as damage invokers
//! - [`resolve_targets_system`] – give target-less agents a target by tag
//! - [`pursuit_system`] – sample targets and step every agent's state machine
//!
//! Targets are read through a query that excludes other agents, so an agent
//! can pursue the player or any tagged entity but never another agent.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::boxcollider::BoxCollider;
use crate::components::group::Group;
use crate::components::mapposition::MapPosition;
use crate::components::pickup::Pickup;
use crate::components::pursuit::{PursuitAgent, PursuitState, StepInput, TargetSample};
use crate::components::rigidbody::RigidBody;
use crate::components::vitals::Dead;
use crate::events::gameplay::{Damage, DamageDealt};
use crate::events::pursuit::PursuitStateChanged;
use crate::resources::eventbus::EventBus;
use crate::resources::worldtime::WorldTime;
use crate::systems::eventbus::enlist;
use crate::systems::raycast::{ColliderSet, line_of_sight};

/// Register freshly spawned agents as invokers of [`DamageDealt`].
pub fn pursuit_setup_system(
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    query: Query<(Entity, Has<RigidBody>, Has<MapPosition>), Added<PursuitAgent>>,
) {
    for (entity, has_body, has_position) in query.iter() {
        enlist::<DamageDealt>(&mut bus, &mut commands, entity);
        if !has_body || !has_position {
            warn!(
                "PursuitAgent {:?} needs RigidBody and MapPosition; it will not move",
                entity
            );
        }
    }
}

/// Resolve a target for every agent that has none, by [`Group`] tag.
///
/// Only placed, living entities are candidates; the agent itself is never
/// chosen. When nothing matches
/// the agent stays inert; the miss is logged once until a target is found.
pub fn resolve_targets_system(
    mut agents: Query<(Entity, &mut PursuitAgent)>,
    candidates: Query<
        (Entity, &Group),
        (With<MapPosition>, Without<Dead>, Without<PursuitAgent>),
    >,
) {
    for (entity, mut agent) in agents.iter_mut() {
        if agent.target.is_some() {
            continue;
        }
        let found = candidates
            .iter()
            .find(|(candidate, group)| *candidate != entity && group.is(&agent.target_tag))
            .map(|(candidate, _)| candidate);
        match found {
            Some(target) => {
                info!(
                    "PursuitAgent {:?} targets {:?} (tag '{}')",
                    entity, target, agent.target_tag
                );
                agent.target = Some(target);
                agent.warned_missing_target = false;
            }
            None if !agent.warned_missing_target => {
                warn!(
                    "PursuitAgent {:?}: no entity tagged '{}', staying inert",
                    entity, agent.target_tag
                );
                agent.warned_missing_target = true;
            }
            None => {}
        }
    }
}

/// Advance every agent's state machine by one tick.
///
/// Samples the target's position and velocity, checks line of sight against
/// all box colliders except pickups while the agent is `Idle` or `Pursue`, and applies the
/// [`StepOutcome`](crate::components::pursuit::StepOutcome): the velocity is
/// written back, transitions trigger [`PursuitStateChanged`] and strikes fire
/// [`DamageDealt`] from the agent.
pub fn pursuit_system(
    world_time: Res<WorldTime>,
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    mut agents: Query<(Entity, &mut PursuitAgent, &MapPosition, &mut RigidBody)>,
    bodies: Query<(&MapPosition, Option<&RigidBody>, Has<Dead>), Without<PursuitAgent>>,
    colliders: Query<(Entity, &MapPosition, &BoxCollider), Without<Pickup>>,
) {
    let dt = world_time.delta;
    let colliders: ColliderSet = colliders
        .iter()
        .map(|(entity, position, collider)| (entity, position.pos, *collider))
        .collect();

    for (entity, mut agent, position, mut rigidbody) in agents.iter_mut() {
        let mut sample = None;
        if let Some(target) = agent.target {
            match bodies.get(target) {
                Ok((target_position, target_body, false)) => {
                    let looking = matches!(agent.state, PursuitState::Idle | PursuitState::Pursue);
                    let visible = looking
                        && line_of_sight(
                            &colliders,
                            entity,
                            position.pos,
                            target,
                            target_position.pos,
                            agent.params.sight_range,
                        );
                    sample = Some(TargetSample {
                        position: target_position.pos,
                        velocity: target_body.map_or(glam::Vec2::ZERO, RigidBody::velocity),
                        visible,
                    });
                }
                Ok((_, _, true)) => {
                    debug!("PursuitAgent {:?}: target {:?} is dead", entity, target);
                    agent.target = None;
                }
                Err(_) => {
                    warn!("PursuitAgent {:?}: target {:?} is gone", entity, target);
                    agent.target = None;
                }
            }
        }

        let outcome = agent.step(&StepInput {
            dt,
            position: position.pos,
            velocity: rigidbody.velocity,
            target: sample,
        });
        if rigidbody.velocity != outcome.velocity {
            rigidbody.set_velocity(outcome.velocity);
        }

        if let Some((from, to)) = outcome.transition {
            debug!("PursuitAgent {:?}: {:?} -> {:?}", entity, from, to);
            commands.trigger(PursuitStateChanged { entity, from, to });
        }
        if let (Some(amount), Some(target)) = (outcome.strike, agent.target) {
            let damage = Damage {
                source: entity,
                target,
                amount,
            };
            let delivered = bus.fire::<DamageDealt>(entity, &damage, &mut commands);
            debug!(
                "PursuitAgent {:?} strikes {:?} for {} ({} listeners)",
                entity, target, amount, delivered
            );
        }
    }
}
