//! The demo systems.
//!
//! Each system caches the entities of one family and mutates their
//! components in place on every tick.

use glam::Vec2;
use tracing::trace;

use components::{Identifier, MapTile, Position, Velocity};
use ecs_component::{Component, EcsError, Family};
use ecs_engine::{System, World, WorkingSet};

/// Velocity scale applied by [`FrictionSystem`] every tick.
pub const FRICTION: f32 = 0.998;

/// Value [`IdentifierStampSystem`] writes into every identifier.
pub const STAMPED_ID: u64 = 999;

/// Integrates velocity into position.
pub struct MovementSystem {
    set: WorkingSet,
}

impl MovementSystem {
    /// Create the system; it selects `all(Velocity, Position)`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: WorkingSet::new(Family::new().all([Velocity::meta(), Position::meta()])),
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn on_engine_change(&mut self, world: &World) {
        self.set.refresh(world);
    }

    fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
        for key in self.set.iter() {
            let Some(entity) = world.get_mut(key) else {
                continue;
            };
            let velocity = entity.get::<Velocity>()?.linear;
            let position = entity.get_mut::<Position>()?;
            position.value += velocity;
            trace!(id = %entity.id(), "moved");
        }
        Ok(())
    }
}

/// Overwrites every identifier with [`STAMPED_ID`].
pub struct IdentifierStampSystem {
    set: WorkingSet,
}

impl IdentifierStampSystem {
    /// Create the system; it selects `all(Identifier)`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: WorkingSet::new(Family::new().all([Identifier::meta()])),
        }
    }
}

impl Default for IdentifierStampSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for IdentifierStampSystem {
    fn name(&self) -> &str {
        "identifier_stamp"
    }

    fn on_engine_change(&mut self, world: &World) {
        self.set.refresh(world);
    }

    fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
        for key in self.set.iter() {
            if let Some(entity) = world.get_mut(key) {
                entity.get_mut::<Identifier>()?.id = STAMPED_ID;
            }
        }
        Ok(())
    }
}

/// Snaps positions to whole units, rounding halves to even.
pub struct PositionRounderSystem {
    set: WorkingSet,
}

impl PositionRounderSystem {
    /// Create the system; it selects `all(Position)`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: WorkingSet::new(Family::new().all([Position::meta()])),
        }
    }
}

impl Default for PositionRounderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PositionRounderSystem {
    fn name(&self) -> &str {
        "position_rounder"
    }

    fn on_engine_change(&mut self, world: &World) {
        self.set.refresh(world);
    }

    fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
        for key in self.set.iter() {
            if let Some(entity) = world.get_mut(key) {
                let position = entity.get_mut::<Position>()?;
                position.value = Vec2::new(
                    position.value.x.round_ties_even(),
                    position.value.y.round_ties_even(),
                );
            }
        }
        Ok(())
    }
}

/// Damps every velocity by [`FRICTION`].
pub struct FrictionSystem {
    set: WorkingSet,
}

impl FrictionSystem {
    /// Create the system; it selects `all(Velocity)`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: WorkingSet::new(Family::new().all([Velocity::meta()])),
        }
    }
}

impl Default for FrictionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for FrictionSystem {
    fn name(&self) -> &str {
        "friction"
    }

    fn on_engine_change(&mut self, world: &World) {
        self.set.refresh(world);
    }

    fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
        for key in self.set.iter() {
            if let Some(entity) = world.get_mut(key) {
                entity.get_mut::<Velocity>()?.linear *= FRICTION;
            }
        }
        Ok(())
    }
}

/// Ages every map tile by one tick.
pub struct TileUpdateSystem {
    set: WorkingSet,
}

impl TileUpdateSystem {
    /// Create the system; it selects `all(MapTile)`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: WorkingSet::new(Family::new().all([MapTile::meta()])),
        }
    }
}

impl Default for TileUpdateSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TileUpdateSystem {
    fn name(&self) -> &str {
        "tile_update"
    }

    fn on_engine_change(&mut self, world: &World) {
        self.set.refresh(world);
    }

    fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
        for key in self.set.iter() {
            if let Some(entity) = world.get_mut(key) {
                entity.get_mut::<MapTile>()?.time += 1;
            }
        }
        Ok(())
    }
}
