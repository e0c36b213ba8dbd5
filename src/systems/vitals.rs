//! Vitals systems: meter drain, change reports and death.
//!
//! Damage never touches [`Vitals`] directly. Pursuit strikes and suffocation
//! both fire [`DamageDealt`], pickups fire [`MeterRestored`]; the listeners
//! installed by [`install_vitals_listeners`] queue the meter change, and
//! [`report_vitals_system`] announces it on the next pass.
//!
//! Schedule order (see [`crate::game::build_schedule`]):
//! `vitals_setup_system` → `drain_vitals_system` → `report_vitals_system` →
//! `death_system`.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::pursuit::PursuitAgent;
use crate::components::rigidbody::RigidBody;
use crate::components::ttl::Ttl;
use crate::components::vitals::{Dead, Meter, Vitals};
use crate::events::gameplay::{
    Damage, DamageDealt, EntityDied, HealthChanged, MeterReading, MeterRestored, OxygenChanged,
    Restore, SanityChanged,
};
use crate::resources::eventbus::{BusEvent, EventBus, ListenerId};
use crate::resources::worldtime::WorldTime;
use crate::systems::eventbus::enlist;

/// Register the listeners that apply [`Damage`] and [`Restore`] to meters.
///
/// Called once when the bus is built. Changes are queued as commands, so
/// they land at the next sync point. Returns the damage and restore listener
/// ids, in that order.
pub fn install_vitals_listeners(bus: &mut EventBus) -> [ListenerId; 2] {
    let damage = bus.register_listener::<DamageDealt, _>(
        None,
        |damage: &Damage, commands: &mut Commands| {
            let Damage {
                source,
                target,
                amount,
            } = *damage;
            commands.queue(move |world: &mut World| {
                let Some(mut vitals) = world.get_mut::<Vitals>(target) else {
                    debug!("Damage from {:?} to {:?} ignored: no vitals", source, target);
                    return;
                };
                let dealt = vitals.health.deplete(amount);
                debug!(
                    "{:?} took {} damage from {:?} ({} left)",
                    target, dealt, source, vitals.health.value
                );
            });
        },
    );

    let restore = bus.register_listener::<MeterRestored, _>(
        None,
        |restore: &Restore, commands: &mut Commands| {
            let Restore {
                source,
                target,
                kind,
                amount,
            } = *restore;
            commands.queue(move |world: &mut World| {
                if world.get::<Dead>(target).is_some() {
                    debug!("{:?} from {:?} ignored: {:?} is dead", kind, source, target);
                    return;
                }
                let Some(mut vitals) = world.get_mut::<Vitals>(target) else {
                    debug!("{:?} from {:?} ignored: {:?} has no vitals", kind, source, target);
                    return;
                };
                let Some(meter) = vitals.meter_mut(kind) else {
                    debug!("{:?} from {:?} ignored: {:?} lacks it", kind, source, target);
                    return;
                };
                let gained = meter.restore(amount);
                debug!(
                    "{:?} regained {} {:?} from {:?} ({} now)",
                    target, gained, kind, source, meter.value
                );
            });
        },
    );

    [damage, restore]
}

/// Enlist entities with fresh [`Vitals`] as invokers of the vitals channels.
pub fn vitals_setup_system(
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    query: Query<(Entity, &Vitals), Added<Vitals>>,
) {
    for (entity, vitals) in query.iter() {
        enlist::<DamageDealt>(&mut bus, &mut commands, entity);
        enlist::<HealthChanged>(&mut bus, &mut commands, entity);
        enlist::<EntityDied>(&mut bus, &mut commands, entity);
        if vitals.oxygen.is_some() {
            enlist::<OxygenChanged>(&mut bus, &mut commands, entity);
        }
        if vitals.sanity.is_some() {
            enlist::<SanityChanged>(&mut bus, &mut commands, entity);
        }
    }
}

/// Drain oxygen and sanity; hurt entities whose oxygen ran out.
pub fn drain_vitals_system(
    world_time: Res<WorldTime>,
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Vitals), Without<Dead>>,
) {
    let dt = world_time.delta;
    if dt <= 0.0 {
        return;
    }
    for (entity, mut vitals) in query.iter_mut() {
        let vitals = &mut *vitals;
        for meter in [vitals.oxygen.as_mut(), vitals.sanity.as_mut()]
            .into_iter()
            .flatten()
        {
            if meter.drain_per_second > 0.0 {
                meter.deplete(meter.drain_per_second * dt);
            }
        }

        if vitals.is_suffocating() && vitals.suffocation_damage > 0.0 {
            let damage = Damage {
                source: entity,
                target: entity,
                amount: vitals.suffocation_damage * dt,
            };
            bus.fire::<DamageDealt>(entity, &damage, &mut commands);
        }
    }
}

fn report<K>(bus: &mut EventBus, commands: &mut Commands, entity: Entity, meter: &mut Meter)
where
    K: BusEvent<Payload = MeterReading>,
{
    if !meter.changed_since_report() {
        return;
    }
    let reading = MeterReading {
        entity,
        value: meter.value,
        max: meter.max,
    };
    bus.fire::<K>(entity, &reading, commands);
    meter.mark_reported();
}

/// Fire a `*Changed` event for every meter that moved since its last report.
pub fn report_vitals_system(
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Vitals)>,
) {
    for (entity, mut vitals) in query.iter_mut() {
        let vitals = &mut *vitals;
        report::<HealthChanged>(&mut bus, &mut commands, entity, &mut vitals.health);
        if let Some(oxygen) = vitals.oxygen.as_mut() {
            report::<OxygenChanged>(&mut bus, &mut commands, entity, oxygen);
        }
        if let Some(sanity) = vitals.sanity.as_mut() {
            report::<SanityChanged>(&mut bus, &mut commands, entity, sanity);
        }
    }
}

/// Handle entities whose health reached zero.
///
/// Fires [`EntityDied`], marks the entity [`Dead`], freezes its body, stops
/// its pursuit and schedules the despawn after `death_linger` seconds.
pub fn death_system(
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    mut query: Query<(Entity, &Vitals, Option<&mut RigidBody>), Without<Dead>>,
) {
    for (entity, vitals, rigidbody) in query.iter_mut() {
        if !vitals.is_dead() {
            continue;
        }
        info!("{:?} died", entity);
        bus.fire::<EntityDied>(entity, &entity, &mut commands);
        if let Some(mut rigidbody) = rigidbody {
            rigidbody.freeze();
        }
        commands
            .entity(entity)
            .insert((Dead, Ttl::new(vitals.death_linger)))
            .remove::<PursuitAgent>();
    }
}
