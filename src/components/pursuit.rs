//! Pursuit state machine for hostile agents.
//!
//! A [`PursuitAgent`] chases a target entity, strikes it when close enough,
//! then recovers for a cooldown before looking again.
//!
//! ```text
//!            target visible
//!   Idle ─────────────────────▶ Pursue
//!    ▲  ◀───────────────────────  │
//!    │     visibility lost        │ distance <= attack_range
//!    │                            ▼
//!   Wait ◀──────────────────── Attack (fires damage on entry)
//!     countdown <= 0      next tick
//! ```
//!
//! The machine is evaluated once per tick by
//! [`pursuit_system`](crate::systems::pursuit::pursuit_system), which samples
//! the target (position, velocity, line of sight) and then calls
//! [`PursuitAgent::step`]. `step` is pure: it takes the sampled inputs and
//! returns the new velocity, the transition taken and the damage to deliver,
//! so the state machine can be driven without a world.
//!
//! # Numeric Semantics
//!
//! - All velocity changes interpolate by `clamp(dt * steer_rate, 0, 1)`, so a
//!   variable tick duration is handled without assuming a fixed step.
//! - Intercept prediction divides by the agent's current speed, floored at
//!   [`MIN_INTERCEPT_SPEED`], and looks ahead at most `max_lookahead` seconds.

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec2;

use crate::components::rigidbody::lerp_factor;

/// Floor for the closing speed used in intercept prediction.
pub const MIN_INTERCEPT_SPEED: f32 = 0.1;

/// Default tag searched when an agent has no explicit target.
pub const DEFAULT_TARGET_TAG: &str = "player";

/// The four pursuit states. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PursuitState {
    #[default]
    Idle,
    Pursue,
    /// Transient: lasts a single tick.
    Attack,
    Wait,
}

/// Tunable parameters of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuitParams {
    /// Speed cap while chasing, world units per second.
    pub max_speed: f32,
    /// Maximum length of the line-of-sight ray.
    pub sight_range: f32,
    /// Distance at which the agent strikes.
    pub attack_range: f32,
    /// Seconds spent in `Wait` after a strike.
    pub attack_cooldown: f32,
    /// Damage delivered per strike.
    pub attack_damage: f32,
    /// Interpolation rate per second for velocity changes.
    pub steer_rate: f32,
    /// Upper bound on how far ahead the target's motion is extrapolated.
    pub max_lookahead: f32,
}

impl Default for PursuitParams {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            sight_range: 30.0,
            attack_range: 3.0,
            attack_cooldown: 3.0,
            attack_damage: 15.0,
            steer_rate: 1.0,
            max_lookahead: 2.0,
        }
    }
}

/// What the agent knows about its target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSample {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Line of sight within sight range.
    pub visible: bool,
}

/// Inputs for one [`PursuitAgent::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    pub dt: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// `None` while the target is unresolved or gone.
    pub target: Option<TargetSample>,
}

/// Result of one [`PursuitAgent::step`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutcome {
    /// Velocity to write back to the agent's body.
    pub velocity: Vec2,
    /// `(from, to)` when the state changed this tick.
    pub transition: Option<(PursuitState, PursuitState)>,
    /// Damage to deliver to the target, set only on entry into `Attack`.
    pub strike: Option<f32>,
}

/// A hostile entity driven by the pursuit state machine.
///
/// Requires a [`RigidBody`](super::rigidbody::RigidBody) and a
/// [`MapPosition`](super::mapposition::MapPosition) on the same entity.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PursuitAgent {
    /// The active state.
    pub state: PursuitState,
    /// The pursued entity. Resolved by tag when absent.
    pub target: Option<Entity>,
    /// Tag looked up when `target` is `None`.
    pub target_tag: String,
    pub params: PursuitParams,
    /// Remaining cooldown; meaningful only in `Wait`.
    pub countdown: f32,
    pub(crate) warned_missing_target: bool,
}

impl Default for PursuitAgent {
    fn default() -> Self {
        Self::new(PursuitParams::default())
    }
}

impl PursuitAgent {
    /// Create an idle agent with no target; it will look for [`DEFAULT_TARGET_TAG`].
    pub fn new(params: PursuitParams) -> Self {
        Self {
            state: PursuitState::Idle,
            target: None,
            target_tag: DEFAULT_TARGET_TAG.to_string(),
            params,
            countdown: 0.0,
            warned_missing_target: false,
        }
    }

    /// Builder: pursue a specific entity.
    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder: tag used to resolve a default target.
    pub fn with_target_tag(mut self, tag: impl Into<String>) -> Self {
        self.target_tag = tag.into();
        self
    }

    /// Builder: start in a state other than `Idle`.
    pub fn with_state(mut self, state: PursuitState) -> Self {
        self.state = state;
        if state == PursuitState::Wait {
            self.countdown = self.params.attack_cooldown;
        }
        self
    }

    /// Advance the state machine by one tick.
    ///
    /// Runs the current state's update, then, if a transition was taken, the
    /// entry action of the new state (`Attack` strikes, `Wait` arms the
    /// cooldown). At most one transition happens per tick.
    pub fn step(&mut self, input: &StepInput) -> StepOutcome {
        let p = self.params;
        let factor = lerp_factor(input.dt, p.steer_rate);
        let mut velocity = input.velocity;

        let next = match self.state {
            PursuitState::Idle => {
                velocity = velocity.lerp(Vec2::ZERO, factor);
                match input.target {
                    Some(target) if target.visible => Some(PursuitState::Pursue),
                    _ => None,
                }
            }
            PursuitState::Pursue => match input.target {
                None => Some(PursuitState::Idle),
                Some(target) => {
                    let desired = intercept_velocity(
                        input.position,
                        input.velocity,
                        target.position,
                        target.velocity,
                        p.max_speed,
                        p.max_lookahead,
                    );
                    velocity = velocity
                        .lerp(desired, factor)
                        .clamp_length_max(p.max_speed.max(0.0));

                    if !target.visible {
                        Some(PursuitState::Idle)
                    } else if input.position.distance(target.position) <= p.attack_range {
                        Some(PursuitState::Attack)
                    } else {
                        None
                    }
                }
            },
            PursuitState::Attack => {
                velocity = velocity.lerp(Vec2::ZERO, factor);
                Some(PursuitState::Wait)
            }
            PursuitState::Wait => {
                velocity = velocity.lerp(Vec2::ZERO, factor);
                self.countdown -= input.dt;
                if self.countdown <= 0.0 {
                    Some(PursuitState::Idle)
                } else {
                    None
                }
            }
        };

        let mut outcome = StepOutcome {
            velocity,
            ..StepOutcome::default()
        };
        if let Some(to) = next {
            let from = std::mem::replace(&mut self.state, to);
            match to {
                PursuitState::Attack => outcome.strike = Some(p.attack_damage),
                PursuitState::Wait => self.countdown = p.attack_cooldown,
                PursuitState::Idle | PursuitState::Pursue => {}
            }
            outcome.transition = Some((from, to));
        }
        outcome
    }
}

/// Desired velocity toward the point where the target will be when reached.
///
/// `time_to_reach = distance / max(speed, MIN_INTERCEPT_SPEED)`, capped at
/// `max_lookahead`; the target position is extrapolated by its velocity over
/// that time. The result has magnitude `max_speed`, or is zero when the
/// predicted point coincides with the agent. Always finite for finite inputs.
pub fn intercept_velocity(
    position: Vec2,
    velocity: Vec2,
    target_position: Vec2,
    target_velocity: Vec2,
    max_speed: f32,
    max_lookahead: f32,
) -> Vec2 {
    let distance = position.distance(target_position);
    let closing_speed = velocity.length().max(MIN_INTERCEPT_SPEED);
    let time_to_reach = (distance / closing_speed).min(max_lookahead.max(0.0));
    let predicted = target_position + target_velocity * time_to_reach;
    (predicted - position).normalize_or_zero() * max_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn visible_at(x: f32, y: f32) -> Option<TargetSample> {
        Some(TargetSample {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            visible: true,
        })
    }

    fn input(dt: f32, target: Option<TargetSample>) -> StepInput {
        StepInput {
            dt,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target,
        }
    }

    // ==================== IDLE ====================

    #[test]
    fn test_idle_to_pursue_when_visible() {
        let mut agent = PursuitAgent::default();
        let out = agent.step(&input(0.1, visible_at(30.0, 0.0)));
        assert_eq!(agent.state, PursuitState::Pursue);
        assert_eq!(
            out.transition,
            Some((PursuitState::Idle, PursuitState::Pursue))
        );
        assert!(out.strike.is_none());
    }

    #[test]
    fn test_idle_stays_without_target() {
        let mut agent = PursuitAgent::default();
        let out = agent.step(&input(0.1, None));
        assert_eq!(agent.state, PursuitState::Idle);
        assert!(out.transition.is_none());
    }

    #[test]
    fn test_idle_stays_when_hidden() {
        let mut agent = PursuitAgent::default();
        let hidden = Some(TargetSample {
            visible: false,
            ..visible_at(5.0, 0.0).unwrap()
        });
        agent.step(&input(0.1, hidden));
        assert_eq!(agent.state, PursuitState::Idle);
    }

    #[test]
    fn test_idle_decelerates_by_elapsed_time() {
        let mut agent = PursuitAgent::default();
        let mut step = input(0.25, None);
        step.velocity = Vec2::new(4.0, 0.0);
        let out = agent.step(&step);
        assert!(approx_eq(out.velocity.x, 3.0));
    }

    // ==================== PURSUE ====================

    #[test]
    fn test_pursue_steers_toward_target() {
        let mut agent = PursuitAgent::default().with_state(PursuitState::Pursue);
        let out = agent.step(&input(0.5, visible_at(20.0, 0.0)));
        assert_eq!(agent.state, PursuitState::Pursue);
        assert!(out.velocity.x > 0.0);
        assert!(approx_eq(out.velocity.y, 0.0));
        assert!(out.velocity.length() <= agent.params.max_speed + EPSILON);
    }

    #[test]
    fn test_pursue_to_attack_strikes_once() {
        let mut agent = PursuitAgent::default().with_state(PursuitState::Pursue);
        let out = agent.step(&input(0.1, visible_at(2.0, 0.0)));
        assert_eq!(agent.state, PursuitState::Attack);
        assert_eq!(out.strike, Some(15.0));

        let out = agent.step(&input(0.1, visible_at(2.0, 0.0)));
        assert_eq!(agent.state, PursuitState::Wait);
        assert!(out.strike.is_none());
        assert!(approx_eq(agent.countdown, 3.0));
    }

    #[test]
    fn test_pursue_loses_visibility() {
        let mut agent = PursuitAgent::default().with_state(PursuitState::Pursue);
        let hidden = Some(TargetSample {
            visible: false,
            ..visible_at(1.0, 0.0).unwrap()
        });
        let out = agent.step(&input(0.1, hidden));
        assert_eq!(agent.state, PursuitState::Idle);
        assert!(out.strike.is_none());
    }

    #[test]
    fn test_pursue_without_target_returns_to_idle() {
        let mut agent = PursuitAgent::default().with_state(PursuitState::Pursue);
        agent.step(&input(0.1, None));
        assert_eq!(agent.state, PursuitState::Idle);
    }

    // ==================== WAIT ====================

    #[test]
    fn test_wait_counts_down_to_idle() {
        let mut agent = PursuitAgent::default().with_state(PursuitState::Wait);
        agent.step(&input(1.0, None));
        agent.step(&input(1.5, None));
        assert_eq!(agent.state, PursuitState::Wait);
        let out = agent.step(&input(0.5, None));
        assert_eq!(agent.state, PursuitState::Idle);
        assert_eq!(out.transition, Some((PursuitState::Wait, PursuitState::Idle)));
    }

    #[test]
    fn test_wait_ignores_visible_target() {
        let mut agent = PursuitAgent::default().with_state(PursuitState::Wait);
        agent.step(&input(0.1, visible_at(1.0, 0.0)));
        assert_eq!(agent.state, PursuitState::Wait);
    }

    // ==================== INTERCEPT ====================

    #[test]
    fn test_intercept_zero_speed_is_finite() {
        let v = intercept_velocity(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 3.0),
            4.0,
            f32::MAX,
        );
        assert!(v.is_finite());
        assert!(approx_eq(v.length(), 4.0));
    }

    #[test]
    fn test_intercept_coincident_is_zero() {
        let v = intercept_velocity(Vec2::ONE, Vec2::ZERO, Vec2::ONE, Vec2::ZERO, 4.0, 2.0);
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn test_intercept_leads_moving_target() {
        let v = intercept_velocity(
            Vec2::ZERO,
            Vec2::new(4.0, 0.0),
            Vec2::new(8.0, 0.0),
            Vec2::new(0.0, 2.0),
            4.0,
            2.0,
        );
        // time_to_reach = 2s, predicted = (8, 4)
        let expected = Vec2::new(8.0, 4.0).normalize() * 4.0;
        assert!(approx_eq(v.x, expected.x));
        assert!(approx_eq(v.y, expected.y));
    }
}
