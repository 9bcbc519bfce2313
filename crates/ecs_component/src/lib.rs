//! # ecs_component
//!
//! The "E" and "C" in ECS — defines what a component is, how an entity
//! stores its components, and how families select entities by component kind.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract all component data must satisfy.
//! - [`ComponentStore`] — one slot per component kind, keyed by [`ComponentTypeId`].
//! - [`Entity`] — an opaque [`EntityId`] plus its component store.
//! - [`Family`] — include-all / include-any / exclude filters over component kinds.
//! - [`IdAllocator`] — explicit sequential id allocation.
//! - [`EcsError`] — the error taxonomy shared by the ECS crates.

pub mod component;
pub mod entity;
pub mod error;
pub mod family;
pub mod store;

pub use component::{AnyComponent, BoxedComponent, Component, ComponentMeta, ComponentTypeId};
pub use entity::{Entity, EntityId, IdAllocator};
pub use error::EcsError;
pub use family::Family;
pub use store::ComponentStore;
