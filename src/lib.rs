//! Hollowdeep simulation core.
//!
//! This module exposes the ECS components, resources, systems, and events of
//! the headless survival-horror core for use in integration tests and as a
//! reusable library.

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod scenario;
pub mod systems;
