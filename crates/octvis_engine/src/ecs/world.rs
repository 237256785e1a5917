//! ECS World implementation
//!
//! Entities live in a `SlotMap`; each component type gets its own
//! `SecondaryMap` keyed by entity, stored type-erased by `TypeId`. Iteration
//! follows slot order, so every query is deterministic for a given history of
//! creations and destructions.

use super::{Component, Entity};
use slotmap::{SecondaryMap, SlotMap};
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Dense storage for one component type
pub struct ComponentStorage<T: Component> {
    components: SecondaryMap<Entity, T>,
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self {
            components: SecondaryMap::new(),
        }
    }
}

impl<T: Component> ComponentStorage<T> {
    /// Component attached to `entity`, if any
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.components.get(entity)
    }

    /// Mutable component attached to `entity`, if any
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    /// Check whether `entity` has this component
    pub fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(entity)
    }

    /// Iterate `(entity, component)` in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter()
    }

    /// Iterate `(entity, component)` mutably in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.components.iter_mut()
    }
}

/// Type-erased view of a [`ComponentStorage`]
trait AnyStorage: Send + Sync {
    fn remove_entity(&mut self, entity: Entity);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyStorage for ComponentStorage<T> {
    fn remove_entity(&mut self, entity: Entity) {
        self.components.remove(entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// ECS World containing all entities and components
#[derive(Default)]
pub struct World {
    entities: SlotMap<Entity, ()>,
    component_storages: HashMap<TypeId, Box<dyn AnyStorage>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.entities.insert(())
    }

    /// Destroy an entity and detach all of its components
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if self.entities.remove(entity).is_none() {
            return false;
        }
        for storage in self.component_storages.values_mut() {
            storage.remove_entity(entity);
        }
        true
    }

    /// Check whether `entity` is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate all live entities in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    /// Attach a component to an entity, replacing any previous one of the same type
    ///
    /// Returns the stored component, or `None` if the entity is not alive.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<&mut T> {
        if !self.is_alive(entity) {
            log::warn!("add_component on dead entity {:?}", entity);
            return None;
        }
        let storage = self.storage_or_insert::<T>()?;
        storage.components.insert(entity, component);
        storage.components.get_mut(entity)
    }

    /// Detach a component from an entity, returning it
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.storage_mut::<T>()?.components.remove(entity)
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Check whether an entity has a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>().is_some_and(|s| s.contains(entity))
    }

    /// Storage for component type `T`, if any entity ever had one
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.component_storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    /// Mutable storage for component type `T`
    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    /// Iterate every entity having component `T`
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(ComponentStorage::iter)
    }

    /// Iterate every entity having component `T`, mutably
    pub fn query_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.storage_mut::<T>().into_iter().flat_map(ComponentStorage::iter_mut)
    }

    /// Grouped iteration over entities having both `A` and `B`
    pub fn query_pair<A: Component, B: Component>(&self) -> Vec<(Entity, &A, &B)> {
        let Some(others) = self.storage::<B>() else {
            return Vec::new();
        };
        self.query::<A>()
            .filter_map(|(entity, a)| others.get(entity).map(|b| (entity, a, b)))
            .collect()
    }

    /// Grouped mutable iteration over entities having both `A` and `B`
    ///
    /// `A` and `B` must be distinct component types.
    pub fn for_each_pair_mut<A, B, F>(&mut self, mut f: F)
    where
        A: Component,
        B: Component,
        F: FnMut(Entity, &mut A, &mut B),
    {
        if TypeId::of::<A>() == TypeId::of::<B>() {
            log::warn!("for_each_pair_mut called with the same component type twice");
            return;
        }

        // Lift B out so A and B can be borrowed mutably at the same time.
        let Some(mut lifted) = self.component_storages.remove(&TypeId::of::<B>()) else {
            return;
        };
        if let (Some(others), Some(storage)) = (
            lifted.as_any_mut().downcast_mut::<ComponentStorage<B>>(),
            self.storage_mut::<A>(),
        ) {
            for (entity, a) in storage.iter_mut() {
                if let Some(b) = others.get_mut(entity) {
                    f(entity, a, b);
                }
            }
        }
        self.component_storages.insert(TypeId::of::<B>(), lifted);
    }

    fn storage_or_insert<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.component_storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::default()))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }
}
