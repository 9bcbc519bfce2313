//! Demo component definitions for the ECS.
//!
//! These demonstrate how to define components that satisfy the [`Component`]
//! trait, and how a default-constructible kind advertises its constructor
//! through [`ComponentMeta::defaulted`].

use ecs_component::{Component, ComponentMeta, IdAllocator};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A 2D position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    /// World-space coordinates.
    pub value: Vec2,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            value: Vec2::new(x, y),
        }
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }

    fn meta() -> ComponentMeta {
        ComponentMeta::defaulted::<Self>()
    }
}

/// A 2D velocity, in world units per tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    /// Linear velocity.
    pub linear: Vec2,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self { linear: Vec2::ZERO };

    /// Create a new velocity.
    #[must_use]
    pub fn new(dx: f32, dy: f32) -> Self {
        Self {
            linear: Vec2::new(dx, dy),
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }

    fn meta() -> ComponentMeta {
        ComponentMeta::defaulted::<Self>()
    }
}

/// A sequential identifier.
///
/// Identifiers are handed out by an [`IdentifierSequence`], so this kind has
/// no default constructor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identifier {
    /// The assigned identifier.
    pub id: u64,
}

impl Component for Identifier {
    fn type_name() -> &'static str {
        "Identifier"
    }
}

/// Hands out [`Identifier`] components in sequence, starting at 0.
#[derive(Debug, Default)]
pub struct IdentifierSequence {
    ids: IdAllocator,
}

impl IdentifierSequence {
    /// Create a sequence starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next identifier component, or `None` once the id space
    /// is exhausted.
    pub fn next_identifier(&mut self) -> Option<Identifier> {
        self.ids.allocate().map(|id| Identifier { id })
    }

    /// Returns the number of identifiers handed out so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.ids.count()
    }
}

/// A map tile with an age counter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapTile {
    /// Tile column.
    pub px: i32,
    /// Tile row.
    pub py: i32,
    /// Ticks this tile has been alive.
    pub time: u64,
}

impl Component for MapTile {
    fn type_name() -> &'static str {
        "MapTile"
    }

    fn meta() -> ComponentMeta {
        ComponentMeta::defaulted::<Self>()
    }
}

/// Marker for entities that must not move.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frozen;

impl Component for Frozen {
    fn type_name() -> &'static str {
        "Frozen"
    }

    fn meta() -> ComponentMeta {
        ComponentMeta::defaulted::<Self>()
    }
}
