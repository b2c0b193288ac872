use std::any::TypeId;
use std::collections::HashMap;

use crate::component::{Column, Component, ErasedColumn};
use crate::entity::{Entity, EntityAllocator};

/// The entity arena. Owns every entity handle and the components attached to them.
#[derive(Default)]
pub struct World {
    entities: EntityAllocator,
    columns: HashMap<TypeId, Box<dyn ErasedColumn>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Entity management ----

    /// Spawn a new entity with no components.
    pub fn spawn(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Despawn an entity, dropping all its components.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.deallocate(entity) {
            return false;
        }
        for column in self.columns.values_mut() {
            column.remove(entity.index());
        }
        true
    }

    /// Check whether an entity is alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ---- Component management ----

    fn column_mut<T: Component>(&mut self) -> &mut Column<T> {
        self.columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Column::<T>::new()))
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .expect("column is keyed by its own component TypeId")
    }

    fn column<T: Component>(&self) -> Option<&Column<T>> {
        self.columns
            .get(&TypeId::of::<T>())
            .and_then(|c| c.as_any().downcast_ref::<Column<T>>())
    }

    /// Attach a component, replacing any existing one of the same type.
    ///
    /// Returns `false` (and drops `component`) if the entity is dead.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        self.column_mut::<T>().insert(entity.index(), component);
        true
    }

    /// Get an immutable reference to a component on an entity.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.column::<T>()?.get(entity.index())
    }

    /// Get a mutable reference to a component on an entity.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.columns
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Column<T>>()?
            .get_mut(entity.index())
    }

    /// Detach a component from an entity. Returns `true` if it was present.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        self.columns
            .get_mut(&TypeId::of::<T>())
            .is_some_and(|column| column.remove(entity.index()))
    }

    /// Check whether an entity has a component of the given type.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    // ---- Iteration ----

    /// Iterate every live entity carrying a `T`, in storage order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.column::<T>()
            .into_iter()
            .flat_map(|column| column.iter())
            .filter_map(|(index, value)| Some((self.entities.live_at(index)?, value)))
    }

    /// Number of live entities carrying a `T`.
    pub fn count<T: Component>(&self) -> usize {
        self.column::<T>().map_or(0, |column| column.len())
    }
}
