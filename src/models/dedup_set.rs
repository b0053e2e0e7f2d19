// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Insertion-ordered list of values kept unique on insert.
//!
//! Every relationship field and every record list in the data model is a
//! `DedupSet`. Membership is decided by structural (`PartialEq`) equality,
//! so composite values such as [`Entry`](crate::models::Entry) are compared
//! field by field, including any nested `DedupSet`.
//!
//! Insertion through `add`, `extend` or `collect` keeps values unique. The
//! one exception is [`DedupSet::edit_each`], which edits in place and may
//! leave equal elements behind.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered sequence of values with no duplicates under `PartialEq`.
///
/// Lookups are linear scans. The lists in this domain are short (members of
/// a group, tracks of a challenge) and element types such as
/// [`ExtendedEntry`](crate::models::ExtendedEntry) carry floats, so they
/// cannot be hashed.
#[derive(Clone)]
pub struct DedupSet<T> {
    items: Vec<T>,
}

impl<T> DedupSet<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Run `f` on every element in place; returns whether any call reported
    /// a change.
    ///
    /// Elements are never merged, even if an edit makes two of them equal.
    pub fn edit_each(&mut self, mut f: impl FnMut(&mut T) -> bool) -> bool {
        self.items.iter_mut().fold(false, |changed, item| f(item) || changed)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: PartialEq> DedupSet<T> {
    /// Check whether a value equal to `value` is present.
    pub fn has(&self, value: &T) -> bool {
        self.items.iter().any(|v| v == value)
    }

    /// Append `value` unless an equal value is already present.
    ///
    /// Returns `true` if the value was appended.
    pub fn add(&mut self, value: T) -> bool {
        if self.has(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Remove the value equal to `value`, keeping the order of the rest.
    ///
    /// Returns `true` if a value was removed.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.items.iter().position(|v| v == value) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Values of `self` that are not in `other`, in `self`'s order.
    pub fn difference<'a>(&'a self, other: &'a DedupSet<T>) -> impl Iterator<Item = &'a T> {
        self.items.iter().filter(move |v| !other.has(v))
    }
}

impl<T> Default for DedupSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two lists are equal when they hold the same elements, in any order.
///
/// This is what makes two records with the same date and the same tracks
/// duplicates even if their track lists were built in different orders.
impl<T: PartialEq> PartialEq for DedupSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|v| other.has(v))
    }
}

impl<T: fmt::Debug> fmt::Debug for DedupSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq> FromIterator<T> for DedupSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T: PartialEq> Extend<T> for DedupSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: PartialEq> From<Vec<T>> for DedupSet<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T> IntoIterator for DedupSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a DedupSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for DedupSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

/// Stored arrays may contain repeats (written by older clients or by hand);
/// they collapse to the first occurrence.
impl<'de, T: Deserialize<'de> + PartialEq> Deserialize<'de> for DedupSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

impl<T> DedupSet<T> {
    /// Read a stored array as written, keeping repeated elements.
    ///
    /// For lists whose elements may legitimately become equal after an
    /// [`edit_each`](Self::edit_each), such as group sessions that lost a
    /// participant.
    pub fn deserialize_verbatim<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Vec::<T>::deserialize(deserializer).map(|items| Self { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_twice_keeps_one_copy() {
        let mut list = DedupSet::new();
        assert!(list.add(1));
        assert!(!list.add(1));
        assert!(list.has(&1));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut list: DedupSet<u32> = vec![1, 2, 3].into();
        assert!(!list.remove(&7));
        assert_eq!(list.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_remove_preserves_order_of_rest() {
        let mut list: DedupSet<u32> = vec![4, 8, 15, 16, 23].into();
        assert!(list.remove(&15));
        assert!(!list.has(&15));
        assert_eq!(list.as_slice(), &[4, 8, 16, 23]);
    }

    #[test]
    fn test_from_vec_drops_repeats() {
        let list: DedupSet<&str> = vec!["a", "b", "a", "c", "b"].into();
        assert_eq!(list.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: DedupSet<u32> = vec![1, 2, 3].into();
        let b: DedupSet<u32> = vec![3, 1, 2].into();
        let c: DedupSet<u32> = vec![1, 2].into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_nested_lists_dedup_structurally() {
        let mut outer: DedupSet<DedupSet<u32>> = DedupSet::new();
        assert!(outer.add(vec![1, 2].into()));
        assert!(!outer.add(vec![2, 1].into()));
        assert!(outer.add(vec![1].into()));
        assert_eq!(outer.len(), 2);
    }

    #[test]
    fn test_difference() {
        let a: DedupSet<u32> = vec![1, 2, 3, 4].into();
        let b: DedupSet<u32> = vec![2, 4, 5].into();
        let only_a: Vec<u32> = a.difference(&b).copied().collect();
        assert_eq!(only_a, vec![1, 3]);
    }

    #[test]
    fn test_json_round_trip_dedups() {
        let list: DedupSet<String> = serde_json::from_str(r#"["x","y","x"]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["x","y"]"#);
    }

    #[test]
    fn test_edit_each_never_merges() {
        let mut list: DedupSet<Vec<u32>> = vec![vec![1, 2], vec![1]].into();
        assert!(list.edit_each(|v| {
            let before = v.len();
            v.retain(|x| *x != 2);
            v.len() != before
        }));
        assert_eq!(list.as_slice(), &[vec![1], vec![1]]);
        assert!(!list.edit_each(|_| false));
    }

    #[test]
    fn test_deserialize_verbatim_keeps_repeats() {
        let mut de = serde_json::Deserializer::from_str("[1, 1, 2]");
        let list = DedupSet::<u32>::deserialize_verbatim(&mut de).unwrap();
        assert_eq!(list.as_slice(), &[1, 1, 2]);
    }
}
