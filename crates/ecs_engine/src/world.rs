//! The authoritative entity collection.
//!
//! The [`World`] holds every registered entity in insertion order. It is the
//! single source of truth for which entities exist; system caches are derived
//! from it.

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace};

use ecs_component::{Entity, EntityId, Family};

new_key_type! {
    /// Handle to an entity registered in a [`World`].
    ///
    /// Keys are generational: the key of a removed entity never resolves to
    /// an entity added later.
    pub struct EntityKey;
}

/// The canonical entity collection owned by an [`Engine`](crate::Engine).
#[derive(Debug, Default)]
pub struct World {
    /// Entity storage.
    entities: SlotMap<EntityKey, Entity>,
    /// Keys in insertion order; iteration and fetch follow this order.
    order: Vec<EntityKey>,
    /// Bumped on every membership change (add or remove).
    generation: u64,
    /// Set when an add or remove asked for systems to be notified.
    notify_requested: bool,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the keys of all entities matching `family`, in insertion order.
    ///
    /// The result is a snapshot: later additions or removals do not affect
    /// it.
    #[must_use]
    pub fn fetch(&self, family: &Family) -> Vec<EntityKey> {
        self.iter_keyed()
            .filter(|(_, entity)| family.matches(entity))
            .map(|(key, _)| key)
            .collect()
    }

    /// Append an entity to the collection.
    ///
    /// No identity deduplication is performed. When `notify` is set, the
    /// owning engine refreshes every system before control returns to the
    /// caller of the engine operation in progress.
    pub fn add_entity(&mut self, entity: Entity, notify: bool) -> EntityKey {
        let id = entity.id();
        let key = self.entities.insert(entity);
        self.order.push(key);
        self.generation += 1;
        self.notify_requested |= notify;
        trace!(%id, ?key, notify, "entity added");
        key
    }

    /// Remove the first entity (in insertion order) with the given id.
    ///
    /// Returns the removed entity, or `None` if no entity has that id. A
    /// missing entity is a no-op and never requests a notification.
    pub fn remove_entity(&mut self, id: EntityId, notify: bool) -> Option<Entity> {
        let Some(key) = self.find(id) else {
            debug!(%id, "remove of unknown entity ignored");
            return None;
        };
        self.remove_by_key(key, notify)
    }

    /// Remove the entity registered under `key`.
    pub fn remove_by_key(&mut self, key: EntityKey, notify: bool) -> Option<Entity> {
        let entity = self.entities.remove(key)?;
        if let Some(pos) = self.order.iter().position(|&k| k == key) {
            self.order.remove(pos);
        }
        self.generation += 1;
        self.notify_requested |= notify;
        trace!(id = %entity.id(), ?key, notify, "entity removed");
        Some(entity)
    }

    /// Returns the key of the first entity with the given id.
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<EntityKey> {
        self.order
            .iter()
            .copied()
            .find(|&key| self.entities.get(key).is_some_and(|e| e.id() == id))
    }

    /// Returns the entity registered under `key`.
    #[must_use]
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Returns the entity registered under `key`, mutably.
    #[must_use]
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Returns `true` if `key` refers to a registered entity.
    #[must_use]
    pub fn contains_key(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Iterate over all entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.iter_keyed().map(|(_, entity)| entity)
    }

    /// Iterate over `(key, entity)` pairs in insertion order.
    pub fn iter_keyed(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.order
            .iter()
            .filter_map(|&key| self.entities.get(key).map(|entity| (key, entity)))
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the membership generation, bumped on every add and remove.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if a notification has been requested since the last
    /// call to [`World::take_notify_request`].
    #[must_use]
    pub fn notify_requested(&self) -> bool {
        self.notify_requested
    }

    /// Clear and return the pending notification request.
    pub(crate) fn take_notify_request(&mut self) -> bool {
        std::mem::take(&mut self.notify_requested)
    }
}
