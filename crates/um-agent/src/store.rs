//! Entity storage indexed by `EntityId`.

use um_core::EntityId;

use crate::Entity;

/// All entities, with `entities[i].id == EntityId(i)`.
///
/// Built by [`EntityStoreBuilder`](crate::EntityStoreBuilder), which hands out
/// ids sequentially.  Entities are never removed during a run.
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    pub(crate) fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(|e| e.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }
}
