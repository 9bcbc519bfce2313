//! The [`System`] contract and the [`WorkingSet`] cache helper.
//!
//! A system is a stateful processor bound to the entities one [`Family`]
//! selects. Its cached working set is refreshed only when the engine
//! broadcasts a membership change; between broadcasts it may be stale.

use ecs_component::{EcsError, Family};

use crate::world::{EntityKey, World};

/// A polymorphic entity processor.
///
/// Concrete systems differ only in what they do inside [`System::update`].
/// The engine stores them as `Box<dyn System>` and drives them in
/// registration order.
pub trait System {
    /// Name used in log output. Defaults to the Rust type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Re-derive the cached working set from the world.
    ///
    /// Must be idempotent: calling it repeatedly without intervening entity
    /// mutation yields the same cached set.
    fn on_engine_change(&mut self, world: &World);

    /// Run one tick over the cached working set, mutating components in
    /// place.
    ///
    /// Entities are created or destroyed through [`World::add_entity`] and
    /// [`World::remove_entity`], never by editing caches.
    ///
    /// # Errors
    ///
    /// Component access failures are propagated to the engine, which aborts
    /// the tick.
    fn update(&mut self, world: &mut World) -> Result<(), EcsError>;
}

/// Freshness of a [`WorkingSet`] relative to the world it was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never refreshed.
    Uninitialized,
    /// Refreshed after the last membership change.
    Fresh,
    /// Entities were added or removed since the last refresh.
    Stale,
}

/// A family plus the cached keys of the entities it selected at the last
/// refresh.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    family: Family,
    entities: Vec<EntityKey>,
    refreshed_at: Option<u64>,
}

impl WorkingSet {
    /// Create an uninitialized working set for `family`.
    #[must_use]
    pub fn new(family: Family) -> Self {
        Self {
            family,
            entities: Vec::new(),
            refreshed_at: None,
        }
    }

    /// Re-fetch the matching entities from `world`.
    pub fn refresh(&mut self, world: &World) {
        self.entities = world.fetch(&self.family);
        self.refreshed_at = Some(world.generation());
    }

    /// Returns the freshness of the cache with respect to `world`.
    #[must_use]
    pub fn state(&self, world: &World) -> CacheState {
        match self.refreshed_at {
            None => CacheState::Uninitialized,
            Some(generation) if generation == world.generation() => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    /// The family this working set is derived from.
    #[must_use]
    pub fn family(&self) -> &Family {
        &self.family
    }

    /// The cached keys, in the world's insertion order at refresh time.
    #[must_use]
    pub fn keys(&self) -> &[EntityKey] {
        &self.entities
    }

    /// Iterate over the cached keys.
    pub fn iter(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.entities.iter().copied()
    }

    /// Returns the number of cached entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
