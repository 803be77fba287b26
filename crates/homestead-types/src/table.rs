//! Copy-on-write placement tables.
//!
//! A [`Table`] is a `BTreeMap<PlacementId, T>` behind an [`Arc`]. Cloning a
//! [`GameState`](crate::GameState) therefore clones one pointer per table, and
//! a handler that touches a single plot pays for copying only the plots map.
//! Tables an action never touches keep sharing storage with the prior state,
//! which lets the delta audit skip them with a pointer comparison.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::PlacementId;

/// Ordered, copy-on-write map of placed entities keyed by [`PlacementId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<T>(Arc<BTreeMap<PlacementId, T>>);

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self(Arc::new(BTreeMap::new()))
    }
}

impl<T> Table<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry.
    pub fn get(&self, id: &PlacementId) -> Option<&T> {
        self.0.get(id)
    }

    /// Whether an entry with this id exists.
    pub fn contains(&self, id: &PlacementId) -> bool {
        self.0.contains_key(id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, PlacementId, T> {
        self.0.iter()
    }

    /// Iterate values in id order.
    pub fn values(&self) -> btree_map::Values<'_, PlacementId, T> {
        self.0.values()
    }

    /// Whether two tables share the same backing storage.
    ///
    /// Sharing implies equality; the converse does not hold.
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Table<T> {
    /// Mutable access to an entry, detaching shared storage only when the
    /// entry exists.
    pub fn get_mut(&mut self, id: &PlacementId) -> Option<&mut T> {
        if !self.0.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut self.0).get_mut(id)
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, id: PlacementId, value: T) -> Option<T> {
        Arc::make_mut(&mut self.0).insert(id, value)
    }

    /// Remove an entry, detaching shared storage only when the entry exists.
    pub fn remove(&mut self, id: &PlacementId) -> Option<T> {
        if !self.0.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut self.0).remove(id)
    }

    /// Mutable iteration over every entry. Always detaches shared storage.
    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, PlacementId, T> {
        Arc::make_mut(&mut self.0).iter_mut()
    }
}

impl<T> FromIterator<(PlacementId, T)> for Table<T> {
    fn from_iter<I: IntoIterator<Item = (PlacementId, T)>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = (&'a PlacementId, &'a T);
    type IntoIter = btree_map::Iter<'a, PlacementId, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Table<u32> {
        [(PlacementId::from("1"), 10), (PlacementId::from("2"), 20)]
            .into_iter()
            .collect()
    }

    #[test]
    fn clone_shares_until_written() {
        let original = sample();
        let mut copy = original.clone();
        assert!(copy.shares_storage(&original));

        if let Some(v) = copy.get_mut(&PlacementId::from("1")) {
            *v = 11;
        }
        assert!(!copy.shares_storage(&original));
        assert_eq!(original.get(&PlacementId::from("1")), Some(&10));
        assert_eq!(copy.get(&PlacementId::from("1")), Some(&11));
    }

    #[test]
    fn missing_entry_does_not_detach() {
        let original = sample();
        let mut copy = original.clone();
        assert!(copy.get_mut(&PlacementId::from("9")).is_none());
        assert!(copy.remove(&PlacementId::from("9")).is_none());
        assert!(copy.shares_storage(&original));
    }

    #[test]
    fn serializes_as_plain_map() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"1":10,"2":20}"#);
        let back: Table<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
