//! Timer system.
//!
//! Advances every [`Timer`](crate::components::timer::Timer) and triggers a
//! [`TimerEvent`](crate::events::timer::TimerEvent) when one completes.
//! One-shot timers are removed after firing; repeating ones are rearmed.

use bevy_ecs::prelude::*;

use crate::components::timer::Timer;
use crate::events::timer::TimerEvent;
use crate::resources::worldtime::WorldTime;

pub fn update_timers(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut Timer)>,
    mut commands: Commands,
) {
    for (entity, mut timer) in query.iter_mut() {
        if !timer.advance(world_time.delta) {
            continue;
        }
        commands.trigger(TimerEvent {
            entity,
            signal: timer.signal.clone(),
        });
        if timer.repeat {
            timer.reset();
        } else {
            commands.entity(entity).try_remove::<Timer>();
        }
    }
}
