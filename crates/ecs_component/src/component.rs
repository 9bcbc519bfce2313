//! Core [`Component`] trait and associated metadata.
//!
//! Every piece of data attached to an entity must implement [`Component`].
//! Components carry no behaviour of their own; all behaviour lives in systems.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **registered name**
//! using the FNV-1a 64-bit hash algorithm. The ID is stable across runs and
//! builds, and is both hashable and ordered, which is all the per-entity store
//! and the family filters need from a component kind.

use std::any::Any;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// A unique identifier for a component kind, derived from its registered name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's name using the
    /// FNV-1a 64-bit hash algorithm.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentTypeId({:#018x})", self.0)
    }
}

/// A boxed, type-erased component as held by a [`ComponentStore`](crate::ComponentStore).
pub type BoxedComponent = Box<dyn AnyComponent>;

/// Descriptor of a component kind, used by [`Family`](crate::Family) filters.
///
/// Besides the kind identity it optionally carries a constructor producing a
/// default instance, which [`Family::create_entity`](crate::Family::create_entity)
/// relies on.
#[derive(Debug, Clone, Copy)]
pub struct ComponentMeta {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"Position"`).
    pub name: &'static str,
    /// Builds a default-constructed instance, if the kind supports it.
    pub default_fn: Option<fn() -> BoxedComponent>,
}

impl ComponentMeta {
    /// Descriptor for a kind without a default constructor.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: T::component_type_id(),
            name: T::type_name(),
            default_fn: None,
        }
    }

    /// Descriptor for a default-constructible kind.
    #[must_use]
    pub fn defaulted<T: Component + Default>() -> Self {
        Self {
            default_fn: Some(default_boxed::<T> as fn() -> BoxedComponent),
            ..Self::of::<T>()
        }
    }

    /// Returns `true` if instances of this kind can be default-constructed.
    #[must_use]
    pub fn is_default_constructible(&self) -> bool {
        self.default_fn.is_some()
    }
}

fn default_boxed<T: Component + Default>() -> BoxedComponent {
    Box::new(T::default())
}

/// The core component trait.
///
/// Components are exclusively owned by the entity they are attached to, so
/// the only requirements are `'static` (for downcasting), `Debug` (for
/// reading state back) and `Send + Sync` (so a host may process entities in
/// parallel inside a single system).
///
/// # Examples
///
/// ```rust
/// use ecs_component::{Component, ComponentMeta};
///
/// #[derive(Debug, Default)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str {
///         "Health"
///     }
///
///     fn meta() -> ComponentMeta {
///         ComponentMeta::defaulted::<Self>()
///     }
/// }
/// ```
pub trait Component: Any + Debug + Send + Sync {
    /// A human-readable name for this component type. Must be unique among
    /// the kinds used together in one engine.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Returns the [`ComponentTypeId`] for this component.
    ///
    /// The default implementation hashes [`Component::type_name()`] with
    /// FNV-1a 64-bit.
    fn component_type_id() -> ComponentTypeId
    where
        Self: Sized,
    {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Returns the [`ComponentMeta`] descriptor for this component type.
    ///
    /// Default-constructible kinds override this with
    /// [`ComponentMeta::defaulted`].
    fn meta() -> ComponentMeta
    where
        Self: Sized,
    {
        ComponentMeta::of::<Self>()
    }
}

/// Object-safe view of a component, implemented for every [`Component`].
pub trait AnyComponent: Any + Debug + Send + Sync {
    /// Upcast to [`Any`] for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast to [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcast an owned box, used when a removed or replaced value is handed back.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The registered name of the concrete component type.
    fn component_name(&self) -> &'static str;
}

impl<T: Component> AnyComponent for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn component_name(&self) -> &'static str {
        T::type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }

        fn meta() -> ComponentMeta {
            ComponentMeta::defaulted::<Self>()
        }
    }

    #[derive(Debug)]
    struct Velocity {
        #[allow(dead_code)]
        x: f32,
    }

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    #[test]
    fn test_component_type_id_is_stable() {
        assert_eq!(Health::component_type_id(), Health::component_type_id());
    }

    #[test]
    fn test_component_type_id_matches_from_name() {
        assert_eq!(
            Health::component_type_id(),
            ComponentTypeId::from_name("Health")
        );
        assert_eq!(ComponentTypeId::of::<Health>(), Health::component_type_id());
    }

    #[test]
    fn test_component_type_id_differs_between_types() {
        assert_ne!(Health::component_type_id(), Velocity::component_type_id());
    }

    #[test]
    fn test_fnv1a_known_vector() {
        // FNV-1a 64-bit of empty string is the offset basis itself.
        assert_eq!(
            ComponentTypeId::from_name(""),
            ComponentTypeId(0xcbf2_9ce4_8422_2325)
        );
        // FNV-1a 64-bit of "a".
        assert_eq!(
            ComponentTypeId::from_name("a"),
            ComponentTypeId(0xaf63_dc4c_8601_ec8c)
        );
    }

    #[test]
    fn test_meta_default_constructor() {
        let meta = Health::meta();
        assert_eq!(meta.name, "Health");
        assert!(meta.is_default_constructible());

        let built = (meta.default_fn.unwrap())();
        assert_eq!(built.component_name(), "Health");
        assert_eq!(
            built.as_any().downcast_ref::<Health>(),
            Some(&Health::default())
        );
    }

    #[test]
    fn test_meta_without_default_constructor() {
        let meta = Velocity::meta();
        assert_eq!(meta.type_id, Velocity::component_type_id());
        assert!(!meta.is_default_constructible());
    }
}
