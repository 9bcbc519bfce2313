//! Per-entity component storage.
//!
//! A [`ComponentStore`] holds at most one instance per component kind. The
//! slot-per-kind invariant is the key uniqueness of the underlying map.

use std::collections::HashMap;

use crate::component::{BoxedComponent, Component, ComponentTypeId};

/// Type-keyed storage for the components of a single entity.
#[derive(Debug, Default)]
pub struct ComponentStore {
    slots: HashMap<ComponentTypeId, BoxedComponent>,
}

impl ComponentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Insert a component, overwriting any existing component of the same kind.
    ///
    /// Returns the displaced component if the slot was occupied by the same
    /// Rust type.
    pub fn attach<T: Component>(&mut self, component: T) -> Option<T> {
        let previous = self.slots.insert(T::component_type_id(), Box::new(component))?;
        previous.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Insert an already boxed component, overwriting any existing component
    /// of the same kind.
    ///
    /// The slot is chosen from the value's own registered name, so a boxed
    /// value always lands where [`ComponentStore::contains`] looks for it.
    pub fn attach_boxed(&mut self, component: BoxedComponent) -> ComponentTypeId {
        let type_id = ComponentTypeId::from_name(component.component_name());
        self.slots.insert(type_id, component);
        type_id
    }

    /// Remove the component of kind `T`.
    ///
    /// Returns `true` if a component was removed.
    pub fn remove<T: Component>(&mut self) -> bool {
        self.remove_id(T::component_type_id())
    }

    /// Remove the component with the given kind identifier.
    ///
    /// Returns `true` if a component was removed.
    pub fn remove_id(&mut self, type_id: ComponentTypeId) -> bool {
        self.slots.remove(&type_id).is_some()
    }

    /// Returns `true` if a component of kind `T` is present.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.contains_id(T::component_type_id())
    }

    /// Returns `true` if a component with the given kind identifier is present.
    #[must_use]
    pub fn contains_id(&self, type_id: ComponentTypeId) -> bool {
        self.slots.contains_key(&type_id)
    }

    /// Returns the type-erased component stored under `type_id`.
    #[must_use]
    pub fn get_raw(&self, type_id: ComponentTypeId) -> Option<&BoxedComponent> {
        self.slots.get(&type_id)
    }

    /// Returns the type-erased component stored under `type_id`, mutably.
    #[must_use]
    pub fn get_raw_mut(&mut self, type_id: ComponentTypeId) -> Option<&mut BoxedComponent> {
        self.slots.get_mut(&type_id)
    }

    /// Returns the kind identifiers of all stored components, in no
    /// particular order.
    pub fn type_ids(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.slots.keys().copied()
    }

    /// Returns all stored components, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &BoxedComponent> {
        self.slots.values()
    }

    /// Returns the number of stored components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no component is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
