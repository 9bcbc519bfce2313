//! Entity type and identifier utilities.
//!
//! An [`Entity`] is an opaque [`EntityId`] plus the [`ComponentStore`] that
//! holds its components. Entities are created standalone, populated, and only
//! then handed to an engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::{AnyComponent, Component};
use crate::error::EcsError;
use crate::store::ComponentStore;

/// An opaque entity identifier.
///
/// Identifiers are random v4 UUIDs, so entities can be created anywhere
/// without coordinating through a shared counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A holder of components.
///
/// Holds at most one component per kind; attaching a second instance of the
/// same kind overwrites the first. Components are exclusively owned, and
/// removing one drops it.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    components: ComponentStore,
}

impl Entity {
    /// Create an empty entity with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(EntityId::new_v4())
    }

    /// Create an empty entity with the given identifier.
    ///
    /// Identity is not deduplicated anywhere, so two entities built with the
    /// same id are both accepted by the engine.
    #[must_use]
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            components: ComponentStore::new(),
        }
    }

    /// Builder form of [`Entity::attach`].
    #[must_use]
    pub fn with<T: Component>(mut self, component: T) -> Self {
        self.attach(component);
        self
    }

    /// Returns the entity identifier.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attach a component, replacing any component of the same kind.
    ///
    /// Returns the replaced component, if any.
    pub fn attach<T: Component>(&mut self, component: T) -> Option<T> {
        self.components.attach(component)
    }

    /// Remove the component of kind `T`. Returns `true` if one was removed.
    pub fn remove<T: Component>(&mut self) -> bool {
        self.components.remove::<T>()
    }

    /// Returns `true` if the entity has a component of kind `T`.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.components.contains::<T>()
    }

    /// Returns the component of kind `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity has no component
    /// of that kind, or [`EcsError::ComponentTypeMismatch`] if another Rust
    /// type was registered under the same component name.
    pub fn get<T: Component>(&self) -> Result<&T, EcsError> {
        let stored = self
            .components
            .get_raw(T::component_type_id())
            .ok_or_else(|| self.not_found::<T>())?;
        let found = stored.component_name();
        stored
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| self.mismatch::<T>(found))
    }

    /// Returns the component of kind `T`, mutably.
    ///
    /// # Errors
    ///
    /// Same as [`Entity::get`].
    pub fn get_mut<T: Component>(&mut self) -> Result<&mut T, EcsError> {
        let id = self.id;
        let stored = self
            .components
            .get_raw_mut(T::component_type_id())
            .ok_or(EcsError::ComponentNotFound {
                component: T::type_name(),
                entity: id,
            })?;
        let found = stored.component_name();
        stored
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(EcsError::ComponentTypeMismatch {
                expected: T::type_name(),
                found,
                entity: id,
            })
    }

    /// Returns the component store.
    #[must_use]
    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    /// Returns the component store, mutably.
    pub fn components_mut(&mut self) -> &mut ComponentStore {
        &mut self.components
    }

    /// Returns the stored components sorted by component name, for display.
    #[must_use]
    pub fn describe(&self) -> Vec<&dyn AnyComponent> {
        let mut all: Vec<&dyn AnyComponent> = self.components.iter().map(|c| c.as_ref()).collect();
        all.sort_by_key(|c| c.component_name());
        all
    }

    fn not_found<T: Component>(&self) -> EcsError {
        EcsError::ComponentNotFound {
            component: T::type_name(),
            entity: self.id,
        }
    }

    fn mismatch<T: Component>(&self, found: &'static str) -> EcsError {
        EcsError::ComponentTypeMismatch {
            expected: T::type_name(),
            found,
            entity: self.id,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocates monotonically increasing `u64` identifiers.
///
/// Owned by whoever hands out sequential ids (for example a spawner assigning
/// identifier components); never a process-wide counter. Once `u64::MAX` has
/// been handed out the allocator is exhausted and returns `None`.
#[derive(Debug)]
pub struct IdAllocator {
    next_id: Option<u64>,
    allocated: u64,
}

impl IdAllocator {
    /// Creates a new allocator whose first id is `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a new allocator whose first id is `first`.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next_id: Some(first),
            allocated: 0,
        }
    }

    /// Allocates the next id, or returns `None` if the id space is exhausted.
    pub fn allocate(&mut self) -> Option<u64> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        self.allocated += 1;
        Some(id)
    }

    /// Returns the id the next call to [`IdAllocator::allocate`] will return.
    #[must_use]
    pub fn peek(&self) -> Option<u64> {
        self.next_id
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.allocated
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
