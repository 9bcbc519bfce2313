//! ECS error types.

use crate::entity::EntityId;

/// Errors that can occur while accessing entities and components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity has no component of the requested kind.
    #[error("component '{component}' not found on {entity}")]
    ComponentNotFound {
        /// Name of the requested component kind.
        component: &'static str,
        /// The entity that was queried.
        entity: EntityId,
    },

    /// The slot for the requested kind holds a different Rust type that was
    /// registered under the same component name.
    #[error("component '{expected}' on {entity} holds a different type registered as '{found}'")]
    ComponentTypeMismatch {
        /// Name of the requested component kind.
        expected: &'static str,
        /// Name reported by the stored value.
        found: &'static str,
        /// The entity that was queried.
        entity: EntityId,
    },

    /// A family asked to create an entity lists a kind that has no default
    /// constructor.
    #[error("component '{component}' cannot be default-constructed")]
    NotDefaultConstructible {
        /// Name of the offending component kind.
        component: &'static str,
    },

    /// No entity with this identifier is registered.
    #[error("{0} not found")]
    EntityNotFound(EntityId),
}
