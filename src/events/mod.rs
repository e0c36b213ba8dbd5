//! Event types.
//!
//! Two flavours of events live here:
//!
//! - bus kinds ([`gameplay`]) – channels on the
//!   [`EventBus`](crate::resources::eventbus::EventBus), matched between
//!   invoker entities and listener callbacks
//! - observer events ([`pursuit`], [`timer`]) – plain ECS events triggered with
//!   `commands.trigger(..)` and consumed by observers
//!
//! Submodules:
//! - [`gameplay`] – damage, meter and death channels
//! - [`pursuit`] – pursuit state transition notifications
//! - [`timer`] – timer expiration notifications
pub mod gameplay;
pub mod pursuit;
pub mod timer;
