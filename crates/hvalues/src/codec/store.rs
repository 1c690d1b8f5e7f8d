// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw key-value stores the codec reads from and writes to.

use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Bound;

/// Flat string-to-string mapping.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<&str>;

    fn set(&mut self, key: &str, value: String);

    fn remove(&mut self, key: &str) -> Option<String>;

    /// Whether any key starts with `prefix`.
    fn has_prefix(&self, prefix: &str) -> bool;

    /// Number of keys in the store.
    fn key_count(&self) -> usize;
}

/// Insertion-ordered store.
///
/// Keys keep the position of their first insertion, so encoding a value tree
/// yields its declaration order. A sorted key set answers prefix queries.
#[derive(Clone, Default)]
pub struct FlatMap {
    entries: IndexMap<String, String>,
    sorted: BTreeSet<String>,
}

impl FlatMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        if let Some(slot) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(slot, value.into()));
        }
        self.sorted.insert(key.clone());
        self.entries.insert(key, value.into())
    }

    /// Remove a key; later keys keep their relative order.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.entries.shift_remove(key)?;
        self.sorted.remove(key);
        Some(removed)
    }

    /// Whether any key starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.sorted
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|k| k.starts_with(prefix))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries under `prefix`, with the prefix stripped.
    pub fn strip_prefix(&self, prefix: &str) -> FlatMap {
        self.iter()
            .filter_map(|(k, v)| k.strip_prefix(prefix).map(|rest| (rest, v)))
            .collect()
    }
}

impl KeyValueStore for FlatMap {
    fn get(&self, key: &str) -> Option<&str> {
        FlatMap::get(self, key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key, value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        FlatMap::remove(self, key)
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        FlatMap::has_prefix(self, prefix)
    }

    fn key_count(&self) -> usize {
        self.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FlatMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl PartialEq for FlatMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for FlatMap {}

impl fmt::Debug for FlatMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl KeyValueStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        BTreeMap::remove(self, key)
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|(k, _)| k.starts_with(prefix))
    }

    fn key_count(&self) -> usize {
        self.len()
    }
}

impl KeyValueStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        HashMap::remove(self, key)
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.keys().any(|k| k.starts_with(prefix))
    }

    fn key_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn KeyValueStore) {
        store.set("a.b", "1".into());
        store.set("a.c", "2".into());
        store.set("ab", "3".into());
        assert_eq!(store.get("a.b"), Some("1"));
        assert!(store.has_prefix("a."));
        assert!(store.has_prefix("ab"));
        assert!(!store.has_prefix("b"));
        assert_eq!(store.remove("a.b").as_deref(), Some("1"));
        assert_eq!(store.get("a.b"), None);
        assert!(store.has_prefix("a."));
        store.remove("a.c");
        assert!(!store.has_prefix("a."));
    }

    #[test]
    fn test_store_implementations_agree() {
        exercise(&mut FlatMap::new());
        exercise(&mut BTreeMap::<String, String>::new());
        exercise(&mut HashMap::<String, String>::new());
    }

    #[test]
    fn test_flat_map_keeps_first_insertion_order() {
        let mut map = FlatMap::new();
        map.insert("z", "1");
        map.insert("a", "2");
        map.insert("z", "3");
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(map.get("z"), Some("3"));
    }

    #[test]
    fn test_strip_prefix() {
        let map: FlatMap = [("app.x", "1"), ("other", "2"), ("app.y.z", "3")]
            .into_iter()
            .collect();
        let stripped = map.strip_prefix("app.");
        let keys: Vec<_> = stripped.keys().collect();
        assert_eq!(keys, vec!["x", "y.z"]);
    }

    #[test]
    fn test_remove_keeps_order_and_prefix_index() {
        let mut map: FlatMap = [("xs.1.y", "a"), ("xs.2.y", "b"), ("xs.3.y", "c")]
            .into_iter()
            .collect();
        assert_eq!(map.remove("xs.2.y").as_deref(), Some("b"));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["xs.1.y", "xs.3.y"]);
        assert!(!map.has_prefix("xs.2."));
        assert!(map.has_prefix("xs.3."));
        assert!(!map.has_prefix("xs.4."));

        map.insert("xs.2.y", "again");
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["xs.1.y", "xs.3.y", "xs.2.y"]);
        assert!(map.has_prefix("xs.2."));
        assert_eq!(KeyValueStore::key_count(&map), 3);
    }
}
