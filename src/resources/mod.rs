//! ECS resources made available to systems.
//!
//! Overview
//! - `eventbus` – typed invoker/listener channels shared by gameplay systems
//! - `gameconfig` – INI-backed configuration
//! - `worldtime` – simulation time and delta
pub mod eventbus;
pub mod gameconfig;
pub mod worldtime;
