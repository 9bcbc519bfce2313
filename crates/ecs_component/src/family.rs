//! Family filters over component kinds.
//!
//! A [`Family`] declares which entities a system is interested in through
//! three sets of component kinds:
//!
//! - **included** — the entity must have all of them,
//! - **elective** — the entity must have at least one of them (when the set
//!   is non-empty),
//! - **excluded** — the entity must have none of them.
//!
//! Matching is a pure function of the entity's current component kinds and
//! these three sets.

use std::collections::BTreeMap;

use crate::component::{ComponentMeta, ComponentTypeId};
use crate::entity::Entity;
use crate::error::EcsError;

/// A declarative membership filter over component kinds.
///
/// Built by chaining [`Family::all`], [`Family::elective`] and
/// [`Family::exclude`]; each call unions the given kinds into its set.
///
/// ```rust
/// use ecs_component::{Component, Entity, Family};
///
/// #[derive(Debug)]
/// struct Position;
/// impl Component for Position {
///     fn type_name() -> &'static str { "Position" }
/// }
///
/// #[derive(Debug)]
/// struct Frozen;
/// impl Component for Frozen {
///     fn type_name() -> &'static str { "Frozen" }
/// }
///
/// let family = Family::new().all([Position::meta()]).exclude([Frozen::meta()]);
/// assert!(family.matches(&Entity::new().with(Position)));
/// assert!(!family.matches(&Entity::new().with(Position).with(Frozen)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Family {
    included: BTreeMap<ComponentTypeId, ComponentMeta>,
    elective: BTreeMap<ComponentTypeId, ComponentMeta>,
    excluded: BTreeMap<ComponentTypeId, ComponentMeta>,
}

impl Family {
    /// Create a family with all three sets empty. It matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the entity to contain all of the given kinds.
    #[must_use]
    pub fn all(mut self, kinds: impl IntoIterator<Item = ComponentMeta>) -> Self {
        extend(&mut self.included, kinds);
        self
    }

    /// Require the entity to contain at least one of the given kinds.
    #[must_use]
    pub fn elective(mut self, kinds: impl IntoIterator<Item = ComponentMeta>) -> Self {
        extend(&mut self.elective, kinds);
        self
    }

    /// Require the entity to contain none of the given kinds.
    #[must_use]
    pub fn exclude(mut self, kinds: impl IntoIterator<Item = ComponentMeta>) -> Self {
        extend(&mut self.excluded, kinds);
        self
    }

    /// Checks whether an entity belongs to this family.
    ///
    /// Rules are evaluated in order:
    ///
    /// 1. any excluded kind present → no match;
    /// 2. every included kind present and no electives declared → match;
    /// 3. electives declared and at least one present → match;
    /// 4. otherwise → no match.
    ///
    /// Rule 3 does not consult the included set: with `all(A).elective(B)`
    /// an entity holding only `B` matches.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        let store = entity.components();

        if self.excluded.keys().any(|&id| store.contains_id(id)) {
            return false;
        }

        if self.elective.is_empty() && self.included.keys().all(|&id| store.contains_id(id)) {
            return true;
        }

        self.elective.keys().any(|&id| store.contains_id(id))
    }

    /// Creates an entity holding one default-constructed component per
    /// included kind, plus one per elective kind when `include_electives` is
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::NotDefaultConstructible`] for the first listed kind
    /// whose descriptor carries no default constructor.
    pub fn create_entity(&self, include_electives: bool) -> Result<Entity, EcsError> {
        let mut entity = Entity::new();

        let electives = if include_electives {
            Some(self.elective.values())
        } else {
            None
        };

        for meta in self.included.values().chain(electives.into_iter().flatten()) {
            let build = meta.default_fn.ok_or(EcsError::NotDefaultConstructible {
                component: meta.name,
            })?;
            entity.components_mut().attach_boxed(build());
        }

        Ok(entity)
    }

    /// Kinds the entity must all have.
    pub fn included(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.included.keys().copied()
    }

    /// Kinds of which the entity must have at least one.
    pub fn electives(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.elective.keys().copied()
    }

    /// Kinds the entity must not have.
    pub fn excluded(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.excluded.keys().copied()
    }

    /// Returns `true` if no kind has been added to any set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.elective.is_empty() && self.excluded.is_empty()
    }
}

fn extend(
    set: &mut BTreeMap<ComponentTypeId, ComponentMeta>,
    kinds: impl IntoIterator<Item = ComponentMeta>,
) {
    set.extend(kinds.into_iter().map(|meta| (meta.type_id, meta)));
}
