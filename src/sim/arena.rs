//! Id-keyed entity storage
//!
//! Entities keep the `EntityId` they were created with for their whole life.
//! Removal compacts the backing vector, so iteration order always equals
//! creation order and stays deterministic.

use serde::{Deserialize, Serialize};

/// Stable handle to an entity of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing ids shared by every arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Collection of one entity kind, sorted by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<T> {
    entries: Vec<(EntityId, T)>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `id`; ids must come from a shared `IdAllocator`
    pub fn insert(&mut self, id: EntityId, value: T) {
        debug_assert!(
            self.entries.last().is_none_or(|(last, _)| *last < id),
            "ids must be inserted in increasing order"
        );
        self.entries.push((id, value));
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |(k, _)| *k).ok()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.position(id).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.position(id).map(|i| &mut self.entries[i].1)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.position(id).map(|i| self.entries.remove(i).1)
    }

    /// Keep only entries for which `keep` returns true; returns removed ids
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId, &T) -> bool) -> Vec<EntityId> {
        let mut removed = Vec::new();
        self.entries.retain(|(id, value)| {
            let k = keep(*id, value);
            if !k {
                removed.push(*id);
            }
            k
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entries.iter().map(|(id, v)| (*id, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entries.iter_mut().map(|(id, v)| (*id, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Visit every unordered pair once, in creation order
    pub fn for_each_pair_mut(&mut self, mut f: impl FnMut((EntityId, &mut T), (EntityId, &mut T))) {
        for i in 0..self.entries.len() {
            let (head, tail) = self.entries.split_at_mut(i + 1);
            let (id_a, a) = &mut head[i];
            for (id_b, b) in tail.iter_mut() {
                f((*id_a, &mut *a), (*id_b, b));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_of(values: &[&'static str]) -> (Arena<&'static str>, Vec<EntityId>) {
        let mut ids = IdAllocator::default();
        let mut arena = Arena::new();
        let mut handles = Vec::new();
        for v in values {
            let id = ids.next_id();
            arena.insert(id, *v);
            handles.push(id);
        }
        (arena, handles)
    }

    #[test]
    fn test_ids_survive_removal() {
        let (mut arena, ids) = arena_of(&["a", "b", "c"]);
        assert_eq!(arena.remove(ids[1]), Some("b"));
        assert_eq!(arena.get(ids[2]), Some(&"c"));
        assert_eq!(arena.get(ids[1]), None);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_retain_reports_removed() {
        let (mut arena, ids) = arena_of(&["keep", "drop", "keep", "drop"]);
        let removed = arena.retain(|_, v| *v == "keep");
        assert_eq!(removed, vec![ids[1], ids[3]]);
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_pairs_visited_once() {
        let (mut arena, _) = arena_of(&["a", "b", "c", "d"]);
        let mut pairs = Vec::new();
        arena.for_each_pair_mut(|(a, _), (b, _)| pairs.push((a.0, b.0)));
        assert_eq!(pairs, vec![(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)]);
    }
}
