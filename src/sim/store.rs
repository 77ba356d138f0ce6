//! Id-keyed entity collections
//!
//! Entities are kept sorted by id. Ids are allocated monotonically, so this is
//! also insertion order and gives stable iteration across runs.
//!
//! Mutating while iterating: take an [`EntityStore::ids`] snapshot and resolve
//! each id with [`EntityStore::get`]. Entities removed along the way resolve
//! to `None` and the rest are visited exactly once.

use serde::{Deserialize, Serialize};

use super::state::EntityId;

/// Anything that can live in an [`EntityStore`]
pub trait Entity {
    fn id(&self) -> EntityId;
}

/// Live collection of one entity variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore<T> {
    items: Vec<T>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: EntityId) -> Result<usize, usize> {
        self.items.binary_search_by_key(&id, |e| e.id())
    }

    /// Insert an entity. An entity with the same id is replaced.
    pub fn add(&mut self, entity: T) {
        match self.position(entity.id()) {
            Ok(i) => self.items[i] = entity,
            Err(i) => self.items.insert(i, entity),
        }
    }

    /// Remove an entity by id. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.position(id).ok().map(|i| self.items.remove(i))
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.position(id).ok().map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        match self.position(id) {
            Ok(i) => Some(&mut self.items[i]),
            Err(_) => None,
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_ok()
    }

    /// Snapshot of the current ids, in iteration order
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|e| e.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Alias of [`len`](Self::len)
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove and return every entity
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy(u32);

    impl Entity for Dummy {
        fn id(&self) -> EntityId {
            EntityId(self.0)
        }
    }

    fn store_of(ids: &[u32]) -> EntityStore<Dummy> {
        let mut store = EntityStore::new();
        for &id in ids {
            store.add(Dummy(id));
        }
        store
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = store_of(&[1, 2, 3]);
        assert_eq!(store.remove(EntityId(2)), Some(Dummy(2)));
        assert_eq!(store.remove(EntityId(2)), None);
        assert_eq!(store.remove(EntityId(99)), None);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_iteration_is_sorted_by_id() {
        let store = store_of(&[5, 1, 3]);
        assert_eq!(store.ids(), vec![EntityId(1), EntityId(3), EntityId(5)]);
    }

    #[test]
    fn test_snapshot_iteration_tolerates_removal() {
        let mut store = store_of(&[1, 2, 3, 4, 5]);
        let mut visited = Vec::new();
        for id in store.ids() {
            if store.get(id).is_none() {
                continue;
            }
            visited.push(id.0);
            // Each visit removes itself and its successor
            store.remove(id);
            store.remove(EntityId(id.0 + 1));
        }
        assert_eq!(visited, vec![1, 3, 5]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_replaces_same_id() {
        let mut store = store_of(&[1]);
        store.add(Dummy(1));
        assert_eq!(store.len(), 1);
        assert!(store.contains(EntityId(1)));
    }

    #[test]
    fn test_drain_empties() {
        let mut store = store_of(&[1, 2]);
        let drained = store.drain();
        assert_eq!(drained.len(), 2);
        assert!(store.is_empty());
    }
}
