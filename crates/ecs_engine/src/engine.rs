//! Engine orchestration.
//!
//! The [`Engine`] owns the [`World`] and the ordered list of systems. It
//! re-resolves every system's working set when membership changes (unless
//! the caller suppresses the notification) and drives per-tick updates.

use tracing::{debug, trace};

use ecs_component::{EcsError, Entity, EntityId, Family};

use crate::system::System;
use crate::world::{EntityKey, World};

/// Owns the authoritative entity collection and the registered systems.
///
/// Systems run in registration order, both for change notification and for
/// [`Engine::update`].
#[derive(Default)]
pub struct Engine {
    world: World,
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    /// Create an engine with no entities and no systems.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Engine::add_system`].
    #[must_use]
    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.add_system(system);
        self
    }

    /// Register a system at the end of the execution order.
    ///
    /// The system's cache stays uninitialized until the next notification.
    pub fn add_system(&mut self, system: impl System + 'static) {
        self.add_boxed_system(Box::new(system));
    }

    /// Register an already boxed system at the end of the execution order.
    pub fn add_boxed_system(&mut self, system: Box<dyn System>) {
        debug!(
            system = system.name(),
            position = self.systems.len(),
            "system registered"
        );
        self.systems.push(system);
    }

    /// Returns the keys of all entities matching `family`, in insertion order.
    #[must_use]
    pub fn fetch(&self, family: &Family) -> Vec<EntityKey> {
        self.world.fetch(family)
    }

    /// Append an entity; with `notify`, refresh every system before returning.
    pub fn add_entity(&mut self, entity: Entity, notify: bool) -> EntityKey {
        let key = self.world.add_entity(entity, notify);
        self.flush_notifications();
        key
    }

    /// Remove the first entity with the given id; with `notify`, refresh
    /// every system before returning.
    ///
    /// Returns the removed entity, or `None` (without notifying) if no
    /// entity has that id.
    pub fn remove_entity(&mut self, id: EntityId, notify: bool) -> Option<Entity> {
        let removed = self.world.remove_entity(id, notify);
        self.flush_notifications();
        removed
    }

    /// Refresh every system's working set, in registration order.
    ///
    /// Used after a batch of `add_entity`/`remove_entity` calls made with
    /// `notify = false`.
    pub fn notify_entity_change(&mut self) {
        self.world.take_notify_request();
        broadcast(&mut self.systems, &self.world);
    }

    /// Run one tick: call `update` on every system in registration order.
    ///
    /// No implicit refresh happens here; caches stale since the last
    /// notification stay stale. A notification requested by a system through
    /// the world is delivered right after that system's `update` returns.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a system; later systems do not run
    /// for this tick.
    pub fn update(&mut self) -> Result<(), EcsError> {
        for index in 0..self.systems.len() {
            let system = &mut self.systems[index];
            trace!(system = system.name(), "system update");
            system.update(&mut self.world)?;
            self.flush_notifications();
        }
        Ok(())
    }

    /// Returns the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Iterate over all entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.world.iter()
    }

    /// Returns the entity registered under `key`.
    #[must_use]
    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.world.get(key)
    }

    /// Returns the entity registered under `key`, mutably.
    #[must_use]
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.world.get_mut(key)
    }

    /// Returns the first entity with the given id, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no entity has that id.
    pub fn entity_by_id_mut(&mut self, id: EntityId) -> Result<&mut Entity, EcsError> {
        let key = self.world.find(id).ok_or(EcsError::EntityNotFound(id))?;
        self.world
            .get_mut(key)
            .ok_or(EcsError::EntityNotFound(id))
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Returns the names of the registered systems in execution order.
    #[must_use]
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    fn flush_notifications(&mut self) {
        if self.world.take_notify_request() {
            broadcast(&mut self.systems, &self.world);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("entities", &self.world.len())
            .field("systems", &self.system_names())
            .finish()
    }
}

fn broadcast(systems: &mut [Box<dyn System>], world: &World) {
    debug!(
        systems = systems.len(),
        entities = world.len(),
        generation = world.generation(),
        "notifying systems of entity change"
    );
    for system in systems {
        system.on_engine_change(world);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ecs_component::{Component, ComponentMeta};

    use super::*;
    use crate::system::{CacheState, WorkingSet};

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }

        fn meta() -> ComponentMeta {
            ComponentMeta::defaulted::<Self>()
        }
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }

        fn meta() -> ComponentMeta {
            ComponentMeta::defaulted::<Self>()
        }
    }

    #[derive(Debug, Default)]
    struct Counter(u32);

    impl Component for Counter {
        fn type_name() -> &'static str {
            "Counter"
        }
    }

    struct MovementSystem {
        set: WorkingSet,
    }

    impl MovementSystem {
        fn new() -> Self {
            Self {
                set: WorkingSet::new(Family::new().all([Position::meta(), Velocity::meta()])),
            }
        }
    }

    impl System for MovementSystem {
        fn on_engine_change(&mut self, world: &World) {
            self.set.refresh(world);
        }

        fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
            for key in self.set.iter() {
                let Some(entity) = world.get_mut(key) else {
                    continue;
                };
                let v = *entity.get::<Velocity>()?;
                let p = entity.get_mut::<Position>()?;
                p.x += v.dx;
                p.y += v.dy;
            }
            Ok(())
        }
    }

    /// Counts how many cached entities it visited per tick.
    struct CountingSystem {
        set: WorkingSet,
        visited: Rc<RefCell<Vec<usize>>>,
    }

    impl System for CountingSystem {
        fn on_engine_change(&mut self, world: &World) {
            self.set.refresh(world);
        }

        fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
            let mut count = 0;
            for key in self.set.iter() {
                if let Some(entity) = world.get_mut(key) {
                    entity.get_mut::<Counter>()?.0 += 1;
                    count += 1;
                }
            }
            self.visited.borrow_mut().push(count);
            Ok(())
        }
    }

    fn counting(visited: &Rc<RefCell<Vec<usize>>>) -> CountingSystem {
        CountingSystem {
            set: WorkingSet::new(Family::new().all([Counter::meta()])),
            visited: Rc::clone(visited),
        }
    }

    /// Records notification and update order into a shared log.
    struct RecordingSystem {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl System for RecordingSystem {
        fn name(&self) -> &str {
            self.label
        }

        fn on_engine_change(&mut self, _world: &World) {
            self.log.borrow_mut().push(format!("change:{}", self.label));
        }

        fn update(&mut self, _world: &mut World) -> Result<(), EcsError> {
            self.log.borrow_mut().push(format!("update:{}", self.label));
            Ok(())
        }
    }

    fn recorder(label: &'static str, log: &Rc<RefCell<Vec<String>>>) -> RecordingSystem {
        RecordingSystem {
            label,
            log: Rc::clone(log),
        }
    }

    /// Spawns one counter entity through the world on its first update.
    struct SpawnOnceSystem {
        spawned: bool,
    }

    impl System for SpawnOnceSystem {
        fn on_engine_change(&mut self, _world: &World) {}

        fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
            if !self.spawned {
                world.add_entity(Entity::new().with(Counter(0)), true);
                self.spawned = true;
            }
            Ok(())
        }
    }

    /// Removes one entity through the world on its first update.
    struct DespawnOnceSystem {
        target: Option<EntityId>,
    }

    impl System for DespawnOnceSystem {
        fn on_engine_change(&mut self, _world: &World) {}

        fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
            if let Some(id) = self.target.take() {
                world.remove_entity(id, true);
            }
            Ok(())
        }
    }

    /// Reads a component its family does not guarantee.
    struct BrokenSystem {
        set: WorkingSet,
    }

    impl System for BrokenSystem {
        fn on_engine_change(&mut self, world: &World) {
            self.set.refresh(world);
        }

        fn update(&mut self, world: &mut World) -> Result<(), EcsError> {
            for key in self.set.iter() {
                if let Some(entity) = world.get(key) {
                    entity.get::<Velocity>()?;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_movement_end_to_end() {
        let mut engine = Engine::new().with_system(MovementSystem::new());
        let e1 = Entity::new()
            .with(Position { x: 0.0, y: 0.0 })
            .with(Velocity { dx: 2.0, dy: 3.0 });
        let key = engine.add_entity(e1, true);

        engine.update().unwrap();

        let position = *engine.entity(key).unwrap().get::<Position>().unwrap();
        assert_eq!(position, Position { x: 2.0, y: 3.0 });
    }

    #[test]
    fn test_notify_order_follows_registration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new()
            .with_system(recorder("s1", &log))
            .with_system(recorder("s2", &log))
            .with_system(recorder("s3", &log));

        engine.notify_entity_change();

        assert_eq!(*log.borrow(), vec!["change:s1", "change:s2", "change:s3"]);
        assert_eq!(engine.system_names(), vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_update_order_follows_registration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new()
            .with_system(recorder("a", &log))
            .with_system(recorder("b", &log));

        engine.update().unwrap();

        assert_eq!(*log.borrow(), vec!["update:a", "update:b"]);
    }

    #[test]
    fn test_add_with_notify_refreshes_every_system() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new()
            .with_system(recorder("a", &log))
            .with_system(recorder("b", &log));

        engine.add_entity(Entity::new(), true);
        assert_eq!(*log.borrow(), vec!["change:a", "change:b"]);

        engine.add_entity(Entity::new(), false);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_stale_cache_until_notified() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new().with_system(counting(&visited));

        engine.add_entity(Entity::new().with(Counter(0)), true);
        engine.update().unwrap();

        // Added without notify: the cache still holds only the first entity.
        let late = engine.add_entity(Entity::new().with(Counter(0)), false);
        engine.update().unwrap();
        assert_eq!(engine.entity(late).unwrap().get::<Counter>().unwrap().0, 0);

        engine.notify_entity_change();
        engine.update().unwrap();
        assert_eq!(engine.entity(late).unwrap().get::<Counter>().unwrap().0, 1);

        assert_eq!(*visited.borrow(), vec![1, 1, 2]);
    }

    #[test]
    fn test_add_with_notify_ends_staleness() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new().with_system(counting(&visited));

        engine.add_entity(Entity::new().with(Counter(0)), false);
        engine.add_entity(Entity::new().with(Counter(0)), false);
        engine.update().unwrap();

        engine.add_entity(Entity::new().with(Counter(0)), true);
        engine.update().unwrap();

        assert_eq!(*visited.borrow(), vec![0, 3]);
    }

    #[test]
    fn test_remove_without_notify_skips_removed_entity() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new().with_system(counting(&visited));

        let doomed = Entity::new().with(Counter(0));
        let doomed_id = doomed.id();
        engine.add_entity(doomed, false);
        engine.add_entity(Entity::new().with(Counter(0)), false);
        engine.notify_entity_change();

        let removed = engine.remove_entity(doomed_id, false).unwrap();
        assert_eq!(removed.get::<Counter>().unwrap().0, 0);

        engine.update().unwrap();
        assert_eq!(*visited.borrow(), vec![1]);
        assert_eq!(engine.world().len(), 1);
    }

    #[test]
    fn test_remove_with_notify_refreshes_every_system() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let visited = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new()
            .with_system(recorder("a", &log))
            .with_system(counting(&visited))
            .with_system(recorder("b", &log));

        let doomed = Entity::new().with(Counter(0));
        let doomed_id = doomed.id();
        engine.add_entity(doomed, false);
        let kept = engine.add_entity(Entity::new().with(Counter(0)), true);
        engine.update().unwrap();
        log.borrow_mut().clear();

        assert!(engine.remove_entity(doomed_id, true).is_some());
        assert_eq!(*log.borrow(), vec!["change:a", "change:b"]);

        engine.update().unwrap();
        assert_eq!(*visited.borrow(), vec![2, 1]);
        assert_eq!(engine.entity(kept).unwrap().get::<Counter>().unwrap().0, 2);
        assert!(engine.world().find(doomed_id).is_none());
    }

    #[test]
    fn test_system_removal_notifies_before_next_system() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let doomed = Entity::new().with(Counter(0));
        let doomed_id = doomed.id();
        let mut engine = Engine::new()
            .with_system(DespawnOnceSystem {
                target: Some(doomed_id),
            })
            .with_system(counting(&visited));
        engine.add_entity(doomed, false);
        engine.add_entity(Entity::new().with(Counter(0)), true);

        engine.update().unwrap();
        engine.update().unwrap();

        assert_eq!(*visited.borrow(), vec![1, 1]);
        assert_eq!(engine.world().len(), 1);
        let counter = engine.entities().next().unwrap().get::<Counter>().unwrap().0;
        assert_eq!(counter, 2);
    }

    #[test]
    fn test_remove_missing_entity_is_noop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new().with_system(recorder("a", &log));

        assert!(engine.remove_entity(EntityId::new_v4(), true).is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_system_spawn_notifies_before_next_system() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new()
            .with_system(SpawnOnceSystem { spawned: false })
            .with_system(counting(&visited));

        engine.update().unwrap();
        engine.update().unwrap();

        assert_eq!(*visited.borrow(), vec![1, 1]);
        assert_eq!(engine.world().len(), 1);
        let counter = engine.entities().next().unwrap().get::<Counter>().unwrap().0;
        assert_eq!(counter, 2);
    }

    #[test]
    fn test_update_propagates_component_errors() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new()
            .with_system(BrokenSystem {
                set: WorkingSet::new(Family::new().all([Position::meta()])),
            })
            .with_system(recorder("after", &log));
        let entity = Entity::new().with(Position::default());
        let id = entity.id();
        engine.add_entity(entity, false);
        engine.notify_entity_change();
        log.borrow_mut().clear();

        let err = engine.update().unwrap_err();
        assert_eq!(
            err,
            EcsError::ComponentNotFound {
                component: "Velocity",
                entity: id
            }
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_fetch_does_not_cache() {
        let mut engine = Engine::new();
        let family = Family::new().all([Counter::meta()]);
        assert!(engine.fetch(&family).is_empty());
        engine.add_entity(Entity::new().with(Counter(0)), false);
        assert_eq!(engine.fetch(&family).len(), 1);
    }

    #[test]
    fn test_registered_system_starts_uninitialized() {
        let mut engine = Engine::new();
        engine.add_entity(Entity::new().with(Counter(0)), true);

        let mut set = WorkingSet::new(Family::new().all([Counter::meta()]));
        assert_eq!(set.state(engine.world()), CacheState::Uninitialized);
        set.refresh(engine.world());
        assert_eq!(set.state(engine.world()), CacheState::Fresh);
    }

    #[test]
    fn test_entity_by_id_mut() {
        let mut engine = Engine::new();
        let entity = Entity::new().with(Counter(4));
        let id = entity.id();
        engine.add_entity(entity, false);

        engine.entity_by_id_mut(id).unwrap().get_mut::<Counter>().unwrap().0 = 9;
        assert_eq!(engine.entities().next().unwrap().get::<Counter>().unwrap().0, 9);

        let missing = EntityId::new_v4();
        assert_eq!(
            engine.entity_by_id_mut(missing).unwrap_err(),
            EcsError::EntityNotFound(missing)
        );
    }

    #[test]
    fn test_create_entity_from_family_and_register() {
        let family = Family::new().all([Position::meta(), Velocity::meta()]);
        let mut engine = Engine::new().with_system(MovementSystem::new());
        let key = engine.add_entity(family.create_entity(false).unwrap(), true);
        engine.entity_mut(key).unwrap().attach(Velocity { dx: 1.0, dy: -1.0 });

        engine.update().unwrap();
        engine.update().unwrap();

        let position = *engine.entity(key).unwrap().get::<Position>().unwrap();
        assert_eq!(position, Position { x: 2.0, y: -2.0 });
    }
}
