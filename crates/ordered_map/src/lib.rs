//! Ordered, string-keyed associative container.
//!
//! This is the sole intra-directory index used by the replication driver: a
//! directory's children and a node's extended-attribute maps are both
//! instances of [`OrderedMap`]. Traversal order is the only contractual
//! requirement — callers may supply a custom key comparator, but the default
//! is byte-wise lexicographic order over the key string, which gives
//! deterministic, platform-independent iteration regardless of on-disk
//! directory entry order.
//!
//! The container owns its keys and values; dropping it (or removing an
//! entry) drops the owned value. There is no separate disposer callback —
//! Rust's `Drop` plays that role, and nodes never hold cycles back to their
//! directory, so ownership is strictly tree-shaped (see `DESIGN.md`).

use std::cmp::Ordering;

/// A key comparator used to order entries within an [`OrderedMap`].
pub type KeyCompare = fn(&str, &str) -> Ordering;

/// Default key comparator: byte-wise lexicographic order.
#[must_use]
pub fn lexicographic(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Error returned when an insert collides with an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("key already exists")]
pub struct Exists;

/// An ordered map from `String` keys to values of type `V`.
///
/// Backed by a sorted `Vec` with binary search rather than a tree; any
/// balanced or unbalanced ordered structure satisfies the same contract, and
/// a flat sorted vector is the cheapest one for the directory sizes this
/// engine actually walks (few thousand entries at most).
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    cmp: KeyCompare,
}

impl<V: Clone> Clone for OrderedMap<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            cmp: self.cmp,
        }
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for OrderedMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(k, v)| (k, v))).finish()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedMap<V> {
    /// Creates an empty map ordered by [`lexicographic`] key comparison.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(lexicographic)
    }

    /// Creates an empty map ordered by a caller-supplied key comparator.
    #[must_use]
    pub fn with_comparator(cmp: KeyCompare) -> Self {
        Self {
            entries: Vec::new(),
            cmp,
        }
    }

    fn locate(&self, key: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(k, _)| (self.cmp)(k.as_str(), key))
    }

    /// Inserts `key` → `value`. Fails with [`Exists`] if `key` is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Result<(), Exists> {
        let key = key.into();
        match self.locate(&key) {
            Ok(_) => Err(Exists),
            Err(pos) => {
                self.entries.insert(pos, (key, value));
                Ok(())
            }
        }
    }

    /// Inserts `key` → `value`, overwriting any existing entry and
    /// returning the value it displaced.
    pub fn upsert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.locate(&key) {
            Ok(pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            Err(pos) => {
                self.entries.insert(pos, (key, value));
                None
            }
        }
    }

    /// Looks up `key`, returning a reference to its value if present.
    #[must_use]
    pub fn search(&self, key: &str) -> Option<&V> {
        self.locate(key).ok().map(|pos| &self.entries[pos].1)
    }

    /// Looks up `key`, returning a mutable reference to its value if present.
    pub fn search_mut(&mut self, key: &str) -> Option<&mut V> {
        self.locate(key).ok().map(move |pos| &mut self.entries[pos].1)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        self.locate(key).ok().map(|pos| self.entries.remove(pos).1)
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.locate(key).is_ok()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visits entries in key order, stopping at the first callback result
    /// that is `Some`, mirroring the "first non-zero result wins" contract.
    pub fn for_each<R>(&self, mut callback: impl FnMut(&str, &V) -> Option<R>) -> Option<R> {
        for (key, value) in &self.entries {
            if let Some(result) = callback(key, value) {
                return Some(result);
            }
        }
        None
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.upsert(k, v);
        }
        map
    }
}
