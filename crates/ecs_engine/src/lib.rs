//! # ecs_engine
//!
//! The "S" in ECS and the orchestration around it.
//!
//! - [`World`] — the authoritative, insertion-ordered entity collection.
//! - [`System`] — the two-operation processor contract, with [`WorkingSet`]
//!   as the reusable cache of a system's matching entities.
//! - [`Engine`] — owns the world and the ordered systems, broadcasts
//!   membership changes and drives updates.
//! - [`TickLoop`] — runs the engine at a chosen cadence.
//!
//! ## Usage
//!
//! ```rust
//! use ecs_component::{Component, EcsError, Entity, Family};
//! use ecs_engine::{Engine, System, World, WorkingSet};
//!
//! #[derive(Debug)]
//! struct Age(u32);
//!
//! impl Component for Age {
//!     fn type_name() -> &'static str {
//!         "Age"
//!     }
//! }
//!
//! struct AgingSystem {
//!     set: WorkingSet,
//! }
//!
//! impl System for AgingSystem {
//!     fn on_engine_change(&mut self, world: &World) {
//!         self.set.refresh(world);
//!     }
//!
//!     fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
//!         for key in self.set.iter() {
//!             if let Some(entity) = world.get_mut(key) {
//!                 entity.get_mut::<Age>()?.0 += 1;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut engine = Engine::new().with_system(AgingSystem {
//!     set: WorkingSet::new(Family::new().all([Age::meta()])),
//! });
//! let key = engine.add_entity(Entity::new().with(Age(0)), true);
//! engine.update().unwrap();
//! assert_eq!(engine.entity(key).unwrap().get::<Age>().unwrap().0, 1);
//! ```

pub mod engine;
pub mod system;
pub mod tick;
pub mod world;

pub use engine::Engine;
pub use system::{CacheState, System, WorkingSet};
pub use tick::{TickConfig, TickError, TickLoop, TickReport};
pub use world::{EntityKey, World};
