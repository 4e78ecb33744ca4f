use std::collections::{btree_map, BTreeMap};

use shared::{
    domain::{CharId, EpisodeId},
    protocol::{Character, Episode},
};

pub type CharacterIndex = SparseIndex<CharId, Character>;
pub type EpisodeIndex = SparseIndex<EpisodeId, Episode>;

/// Id-keyed storage where the slot index is the entity id.
///
/// Unoccupied ids are holes: `get` returns `None` for them and iteration
/// skips them, walking occupied slots in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseIndex<K, T> {
    slots: BTreeMap<K, T>,
}

impl<K: Ord + Copy, T> SparseIndex<K, T> {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Stores `value` at `id`, returning the previous occupant.
    pub fn insert(&mut self, id: K, value: T) -> Option<T> {
        self.slots.insert(id, value)
    }

    pub fn get(&self, id: K) -> Option<&T> {
        self.slots.get(&id)
    }

    pub fn contains(&self, id: K) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots.iter().map(|(id, value)| (*id, value))
    }

    pub fn ids(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.keys().copied()
    }

    pub fn values(&self) -> btree_map::Values<'_, K, T> {
        self.slots.values()
    }
}

impl<K: Ord + Copy, T> Default for SparseIndex<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy, T> FromIterator<(K, T)> for SparseIndex<K, T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl<'a, K: Ord + Copy, T> IntoIterator for &'a SparseIndex<K, T> {
    type Item = &'a T;
    type IntoIter = btree_map::Values<'a, K, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}
