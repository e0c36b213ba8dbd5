//! Typed invoker/listener event bus.
//!
//! The [`EventBus`] resource keeps one [`Channel`] per event kind. A kind is any
//! type implementing [`BusEvent`]; it names the channel and fixes the payload
//! type. Two kinds may share the same payload type and still be delivered
//! independently (e.g. `OxygenChanged` and `SanityChanged`).
//!
//! # Binding Model
//!
//! A channel pairs *invokers* (entities that fire the event) with *listeners*
//! (callbacks). Registration order does not matter:
//!
//! - registering a listener attaches it to every invoker already known
//! - registering an invoker attaches every listener already known to it
//!
//! Firing from an invoker calls its attached listeners synchronously, in the
//! order the listeners were registered, on the calling thread.
//!
//! # Lifetime
//!
//! Registrations can be removed explicitly ([`EventBus::unregister_invoker`],
//! [`EventBus::unregister_listener`]) or per owning entity with
//! [`EventBus::remove_owner`]. The
//! [`prune_bus_members`](crate::systems::eventbus::prune_bus_members) system
//! calls the latter for every entity that lost its
//! [`BusMember`](crate::components::busmember::BusMember) component, so despawned
//! entities never receive callbacks.
//!
//! # Example
//!
//! ```ignore
//! let mut bus = EventBus::default();
//! bus.register_listener::<DamageDealt, _>(None, |damage, commands| {
//!     commands.entity(damage.target).insert(Hurt);
//! });
//! bus.register_invoker::<DamageDealt>(enemy);
//! bus.fire::<DamageDealt>(enemy, &damage, &mut commands);
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use bevy_ecs::prelude::{Commands, Entity, Resource};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// An event kind that can be routed through the [`EventBus`].
///
/// The implementing type is only used as a key; it is never instantiated by
/// the bus. The payload is what listeners receive.
pub trait BusEvent: Send + Sync + 'static {
    /// Data delivered to listeners on every firing.
    type Payload: 'static;
    /// Human readable channel name, used in logs and introspection.
    const NAME: &'static str;
}

/// Handle returned by [`EventBus::register_listener`].
///
/// Ids are unique across all channels of one bus and increase monotonically,
/// so sorting by id is the same as sorting by registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Boxed listener callback for payload type `P`.
pub type ListenerFn<P> = Box<dyn for<'w, 's> FnMut(&P, &mut Commands<'w, 's>) + Send + Sync>;

struct ListenerEntry<P> {
    id: ListenerId,
    owner: Option<Entity>,
    callback: ListenerFn<P>,
}

struct InvokerEntry {
    handle: Entity,
    /// Listeners bound to this invoker, in registration order.
    attached: SmallVec<[ListenerId; 4]>,
}

/// Registry of invokers and listeners for a single event kind.
pub struct Channel<K: BusEvent> {
    invokers: Vec<InvokerEntry>,
    listeners: Vec<ListenerEntry<K::Payload>>,
}

impl<K: BusEvent> Default for Channel<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: BusEvent> Channel<K> {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            invokers: Vec::new(),
            listeners: Vec::new(),
        }
    }

    fn invoker_index(&self, handle: Entity) -> Option<usize> {
        self.invokers.iter().position(|i| i.handle == handle)
    }

    fn add_invoker(&mut self, handle: Entity) -> bool {
        if self.invoker_index(handle).is_some() {
            return false;
        }
        let attached = self.listeners.iter().map(|l| l.id).collect();
        self.invokers.push(InvokerEntry { handle, attached });
        true
    }

    fn add_listener(&mut self, id: ListenerId, owner: Option<Entity>, callback: ListenerFn<K::Payload>) {
        self.listeners.push(ListenerEntry {
            id,
            owner,
            callback,
        });
        for invoker in self.invokers.iter_mut() {
            invoker.attached.push(id);
        }
    }

    fn remove_invoker(&mut self, handle: Entity) -> bool {
        match self.invoker_index(handle) {
            Some(index) => {
                self.invokers.remove(index);
                true
            }
            None => false,
        }
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Ok(index) = self.listeners.binary_search_by_key(&id, |l| l.id) else {
            return false;
        };
        self.listeners.remove(index);
        for invoker in self.invokers.iter_mut() {
            invoker.attached.retain(|attached| *attached != id);
        }
        true
    }

    fn fire(&mut self, handle: Entity, payload: &K::Payload, commands: &mut Commands) -> usize {
        let Channel {
            invokers,
            listeners,
        } = self;
        let Some(invoker) = invokers.iter().find(|i| i.handle == handle) else {
            trace!("{}: fired by unregistered invoker {:?}", K::NAME, handle);
            return 0;
        };
        let mut delivered = 0;
        for id in invoker.attached.iter() {
            if let Ok(index) = listeners.binary_search_by_key(id, |l| l.id) {
                (listeners[index].callback)(payload, &mut *commands);
                delivered += 1;
            }
        }
        if delivered == 0 {
            trace!("{}: no listeners attached to {:?}", K::NAME, handle);
        }
        delivered
    }

    /// Number of listeners bound to `handle`, or `None` if it is not an invoker.
    pub fn attached_count(&self, handle: Entity) -> Option<usize> {
        self.invokers
            .iter()
            .find(|i| i.handle == handle)
            .map(|i| i.attached.len())
    }
}

/// Object-safe view of a channel so kinds with different payloads share one map.
trait ErasedChannel: Send + Sync {
    fn name(&self) -> &'static str;
    fn remove_owner(&mut self, owner: Entity) -> usize;
    fn invoker_count(&self) -> usize;
    fn listener_count(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K: BusEvent> ErasedChannel for Channel<K> {
    fn name(&self) -> &'static str {
        K::NAME
    }

    fn remove_owner(&mut self, owner: Entity) -> usize {
        let mut removed = usize::from(self.remove_invoker(owner));
        let owned: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|l| l.owner == Some(owner))
            .map(|l| l.id)
            .collect();
        for id in owned {
            if self.remove_listener(id) {
                removed += 1;
            }
        }
        removed
    }

    fn invoker_count(&self) -> usize {
        self.invokers.len()
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Event bus resource holding one [`Channel`] per [`BusEvent`] kind.
///
/// Inserted into the world once at startup and passed to systems as
/// `ResMut<EventBus>`. Everything is in memory and synchronous; there is no
/// queue between [`fire`](Self::fire) and the listeners.
#[derive(Resource, Default)]
pub struct EventBus {
    channels: FxHashMap<TypeId, Box<dyn ErasedChannel>>,
    next_listener: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut channels: Vec<(&'static str, usize, usize)> = self
            .channels
            .values()
            .map(|c| (c.name(), c.invoker_count(), c.listener_count()))
            .collect();
        channels.sort_unstable();
        f.debug_struct("EventBus")
            .field("channels", &channels)
            .field("next_listener", &self.next_listener)
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    fn channel<K: BusEvent>(&self) -> Option<&Channel<K>> {
        self.channels
            .get(&TypeId::of::<K>())
            .and_then(|c| c.as_any().downcast_ref::<Channel<K>>())
    }

    fn channel_mut<K: BusEvent>(&mut self) -> Option<&mut Channel<K>> {
        self.channels
            .get_mut(&TypeId::of::<K>())
            .and_then(|c| c.as_any_mut().downcast_mut::<Channel<K>>())
    }

    fn channel_or_create<K: BusEvent>(&mut self) -> &mut Channel<K> {
        let erased = self.channels.entry(TypeId::of::<K>()).or_insert_with(|| {
            debug!("EventBus: created channel '{}'", K::NAME);
            Box::new(Channel::<K>::new())
        });
        match erased.as_any_mut().downcast_mut::<Channel<K>>() {
            Some(channel) => channel,
            None => unreachable!("channel '{}' stored under a foreign TypeId", K::NAME),
        }
    }

    /// Create the channel for `K` up front. Registering on an undeclared kind
    /// creates it lazily, so this is only needed for introspection.
    pub fn declare<K: BusEvent>(&mut self) {
        self.channel_or_create::<K>();
    }

    /// Whether a channel for `K` exists.
    pub fn has_channel<K: BusEvent>(&self) -> bool {
        self.channels.contains_key(&TypeId::of::<K>())
    }

    /// Names of all channels, sorted.
    pub fn channel_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.channels.values().map(|c| c.name()).collect();
        names.sort_unstable();
        names
    }

    /// Register `handle` as an invoker of `K` and bind every known listener to it.
    ///
    /// Returns `false` and changes nothing if `handle` is already registered,
    /// so repeated registration never produces duplicate delivery.
    pub fn register_invoker<K: BusEvent>(&mut self, handle: Entity) -> bool {
        let added = self.channel_or_create::<K>().add_invoker(handle);
        if added {
            trace!("{}: invoker {:?} registered", K::NAME, handle);
        }
        added
    }

    /// Append a listener to `K` and bind it to every known invoker.
    ///
    /// `owner` ties the listener to an entity for [`remove_owner`](Self::remove_owner).
    /// Inside systems prefer [`listen`](crate::systems::eventbus::listen), which
    /// also makes the owner a bus member so despawning it prunes the listener.
    /// Callbacks have no identity, so every call adds a distinct listener.
    pub fn register_listener<K, F>(&mut self, owner: Option<Entity>, callback: F) -> ListenerId
    where
        K: BusEvent,
        F: for<'w, 's> FnMut(&K::Payload, &mut Commands<'w, 's>) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.channel_or_create::<K>()
            .add_listener(id, owner, Box::new(callback));
        trace!("{}: listener {:?} registered (owner {:?})", K::NAME, id, owner);
        id
    }

    /// Deliver `payload` to every listener bound to `handle`, in registration order.
    ///
    /// Returns how many listeners were called. An undeclared channel, an
    /// unknown invoker or an empty listener list is a silent no-op.
    pub fn fire<K: BusEvent>(
        &mut self,
        handle: Entity,
        payload: &K::Payload,
        commands: &mut Commands,
    ) -> usize {
        match self.channel_mut::<K>() {
            Some(channel) => channel.fire(handle, payload, commands),
            None => {
                trace!("{}: fired with no channel declared", K::NAME);
                0
            }
        }
    }

    /// Remove `handle` from the invokers of `K`.
    pub fn unregister_invoker<K: BusEvent>(&mut self, handle: Entity) -> bool {
        self.channel_mut::<K>()
            .is_some_and(|c| c.remove_invoker(handle))
    }

    /// Remove a listener from `K` and detach it from every invoker.
    pub fn unregister_listener<K: BusEvent>(&mut self, id: ListenerId) -> bool {
        self.channel_mut::<K>().is_some_and(|c| c.remove_listener(id))
    }

    /// Drop every invoker registration of `owner` and every listener it owns,
    /// across all channels. Returns the number of removed entries.
    pub fn remove_owner(&mut self, owner: Entity) -> usize {
        self.channels
            .values_mut()
            .map(|c| c.remove_owner(owner))
            .sum()
    }

    /// Number of invokers registered on `K`.
    pub fn invoker_count<K: BusEvent>(&self) -> usize {
        self.channel::<K>().map_or(0, |c| c.invokers.len())
    }

    /// Number of listeners registered on `K`.
    pub fn listener_count<K: BusEvent>(&self) -> usize {
        self.channel::<K>().map_or(0, |c| c.listeners.len())
    }

    /// Number of listeners bound to `handle` on `K`, `None` if it is not an invoker.
    pub fn attached_count<K: BusEvent>(&self, handle: Entity) -> Option<usize> {
        self.channel::<K>().and_then(|c| c.attached_count(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;
    use std::sync::{Arc, Mutex};

    struct Ping;
    impl BusEvent for Ping {
        type Payload = u32;
        const NAME: &'static str = "ping";
    }

    struct Pong;
    impl BusEvent for Pong {
        type Payload = u32;
        const NAME: &'static str = "pong";
    }

    fn recorder() -> (Arc<Mutex<Vec<(usize, u32)>>>, impl Fn(usize) -> ListenerFn<u32>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_make = log.clone();
        let make = move |tag: usize| -> ListenerFn<u32> {
            let log = log_for_make.clone();
            Box::new(move |value: &u32, _commands: &mut Commands| {
                log.lock().unwrap().push((tag, *value));
            })
        };
        (log, make)
    }

    // ==================== ORDER INDEPENDENCE ====================

    #[test]
    fn test_invoker_then_listener_delivers_once() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        bus.register_invoker::<Ping>(invoker);
        bus.register_listener::<Ping, _>(None, make(0));

        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(invoker, &7, &mut commands), 1);
        assert_eq!(*log.lock().unwrap(), vec![(0, 7)]);
    }

    #[test]
    fn test_listener_then_invoker_delivers_once() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        bus.register_listener::<Ping, _>(None, make(0));
        bus.register_invoker::<Ping>(invoker);

        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(invoker, &9, &mut commands), 1);
        assert_eq!(*log.lock().unwrap(), vec![(0, 9)]);
    }

    // ==================== FAN-OUT ====================

    #[test]
    fn test_fan_out_in_registration_order() {
        let mut world = World::new();
        let early = world.spawn_empty().id();
        let late = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        bus.register_invoker::<Ping>(early);
        for tag in 0..3 {
            bus.register_listener::<Ping, _>(None, make(tag));
        }
        bus.register_invoker::<Ping>(late);
        bus.register_listener::<Ping, _>(None, make(3));

        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(early, &1, &mut commands), 4);
        assert_eq!(bus.fire::<Ping>(late, &2, &mut commands), 4);
        let tags: Vec<usize> = log.lock().unwrap().iter().map(|(t, _)| *t).collect();
        assert_eq!(tags, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    // ==================== NO-OP FIRING ====================

    #[test]
    fn test_fire_without_channel_is_noop() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let mut bus = EventBus::new();
        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(invoker, &1, &mut commands), 0);
        assert!(!bus.has_channel::<Ping>());
    }

    #[test]
    fn test_fire_without_listeners_is_noop() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let mut bus = EventBus::new();
        bus.register_invoker::<Ping>(invoker);
        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(invoker, &1, &mut commands), 0);
    }

    #[test]
    fn test_fire_from_unknown_invoker_is_noop() {
        let mut world = World::new();
        let known = world.spawn_empty().id();
        let stranger = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();
        bus.register_invoker::<Ping>(known);
        bus.register_listener::<Ping, _>(None, make(0));

        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(stranger, &1, &mut commands), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    // ==================== IDEMPOTENCY ====================

    #[test]
    fn test_duplicate_invoker_registration_is_ignored() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        assert!(bus.register_invoker::<Ping>(invoker));
        bus.register_listener::<Ping, _>(None, make(0));
        assert!(!bus.register_invoker::<Ping>(invoker));
        assert_eq!(bus.invoker_count::<Ping>(), 1);

        let mut commands = world.commands();
        bus.fire::<Ping>(invoker, &5, &mut commands);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_kinds_sharing_payload_are_separate_channels() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();
        bus.register_invoker::<Ping>(invoker);
        bus.register_invoker::<Pong>(invoker);
        bus.register_listener::<Pong, _>(None, make(1));

        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(invoker, &3, &mut commands), 0);
        assert_eq!(bus.fire::<Pong>(invoker, &4, &mut commands), 1);
        assert_eq!(*log.lock().unwrap(), vec![(1, 4)]);
        assert_eq!(bus.channel_names(), vec!["ping", "pong"]);
    }

    // ==================== REMOVAL ====================

    #[test]
    fn test_unregister_listener_detaches_from_invokers() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();
        bus.register_invoker::<Ping>(invoker);
        let first = bus.register_listener::<Ping, _>(None, make(0));
        bus.register_listener::<Ping, _>(None, make(1));

        assert!(bus.unregister_listener::<Ping>(first));
        assert!(!bus.unregister_listener::<Ping>(first));
        assert_eq!(bus.attached_count::<Ping>(invoker), Some(1));

        let mut commands = world.commands();
        bus.fire::<Ping>(invoker, &2, &mut commands);
        assert_eq!(*log.lock().unwrap(), vec![(1, 2)]);
    }

    #[test]
    fn test_unregister_invoker_stops_delivery() {
        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();
        bus.register_invoker::<Ping>(invoker);
        bus.register_listener::<Ping, _>(None, make(0));

        assert!(bus.unregister_invoker::<Ping>(invoker));
        let mut commands = world.commands();
        assert_eq!(bus.fire::<Ping>(invoker, &2, &mut commands), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remove_owner_prunes_all_channels() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let other = world.spawn_empty().id();
        let (log, make) = recorder();
        let mut bus = EventBus::new();

        bus.register_invoker::<Ping>(owner);
        bus.register_invoker::<Pong>(owner);
        bus.register_invoker::<Ping>(other);
        bus.register_listener::<Ping, _>(Some(owner), make(0));
        bus.register_listener::<Ping, _>(None, make(1));

        assert_eq!(bus.remove_owner(owner), 3);
        assert_eq!(bus.invoker_count::<Ping>(), 1);
        assert_eq!(bus.invoker_count::<Pong>(), 0);
        assert_eq!(bus.listener_count::<Ping>(), 1);

        let mut commands = world.commands();
        bus.fire::<Ping>(other, &8, &mut commands);
        assert_eq!(*log.lock().unwrap(), vec![(1, 8)]);
    }

    // ==================== COMMANDS ====================

    #[test]
    fn test_listener_commands_apply_on_flush() {
        #[derive(bevy_ecs::prelude::Component)]
        struct Marked;

        let mut world = World::new();
        let invoker = world.spawn_empty().id();
        let mut bus = EventBus::new();
        bus.register_invoker::<Ping>(invoker);
        bus.register_listener::<Ping, _>(None, |_value, commands| {
            commands.spawn(Marked);
        });

        {
            let mut commands = world.commands();
            bus.fire::<Ping>(invoker, &0, &mut commands);
        }
        world.flush();

        let mut query = world.query::<&Marked>();
        assert_eq!(query.iter(&world).count(), 1);
    }
}
