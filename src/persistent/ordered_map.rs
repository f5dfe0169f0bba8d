//! Persistent (immutable) insertion-ordered map.
//!
//! [`PersistentOrderedMap`] layers an insertion-order index on top of the
//! hash trie: the trie maps each key to its slot, and a
//! [`PersistentVector`] holds the entries in insertion order. Removing a key
//! leaves a hole in the vector; holes are compacted away once they outnumber
//! live entries.
//!
//! # Examples
//!
//! ```rust
//! use sharetrie::persistent::PersistentOrderedMap;
//!
//! let map = PersistentOrderedMap::new()
//!     .insert("z", 1)
//!     .insert("a", 2)
//!     .insert("z", 3);
//!
//! let entries: Vec<(&&str, &i32)> = map.iter().collect();
//! assert_eq!(entries, vec![(&"z", &3), (&"a", &2)]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};

use super::{
    PersistentHashMap, PersistentVector, PersistentVectorIterator, TransientHashMap,
    TransientVector,
};

/// Compaction never runs below this many slots.
const COMPACTION_THRESHOLD: usize = 32;

const fn needs_compaction(slots: usize, live: usize) -> bool {
    slots >= COMPACTION_THRESHOLD && slots >= live * 2
}

/// A persistent map that iterates in insertion order.
///
/// Re-inserting an existing key replaces its value in place and keeps its
/// original position.
#[derive(Clone)]
pub struct PersistentOrderedMap<K, V> {
    index: PersistentHashMap<K, usize>,
    entries: PersistentVector<Option<(K, V)>>,
}

impl<K, V> PersistentOrderedMap<K, V> {
    /// Creates a new empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            index: PersistentHashMap::new(),
            entries: PersistentVector::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns an iterator over entries in insertion order.
    #[must_use]
    pub fn iter(&self) -> PersistentOrderedMapIterator<'_, K, V> {
        PersistentOrderedMapIterator {
            slots: self.entries.iter(),
            remaining: self.len(),
        }
    }

    /// Returns an iterator over keys in insertion order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in insertion order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentOrderedMap<K, V> {
    /// Returns the value for `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key)?;
        self.entries
            .get(slot)?
            .as_ref()
            .map(|(_, value)| value)
    }

    /// Returns the value for `key`, or `default` if absent.
    #[must_use]
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Inserts or replaces an entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentOrderedMap;
    ///
    /// let map = PersistentOrderedMap::new().insert(2, "b").insert(1, "a");
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![2, 1]);
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        if let Some(&slot) = self.index.get(&key) {
            return Self {
                index: self.index.clone(),
                entries: self.entries.set(slot, Some((key, value))),
            };
        }
        Self {
            index: self.index.insert(key.clone(), self.entries.len()),
            entries: self.entries.push_back(Some((key, value))),
        }
    }

    /// Removes `key`, returning an equal map if it is absent.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&slot) = self.index.get(key) else {
            return self.clone();
        };
        let index = self.index.remove(key);
        if index.is_empty() {
            return Self::new();
        }
        let entries = if slot + 1 == self.entries.len() {
            self.entries.take(slot)
        } else {
            self.entries.set(slot, None)
        };
        if needs_compaction(entries.len(), index.len()) {
            tracing::trace!(
                slots = entries.len(),
                live = index.len(),
                "compacting ordered map"
            );
            return entries.iter().flatten().cloned().collect();
        }
        Self { index, entries }
    }

    /// Returns a map with the entries of `other` inserted after those of `self`.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        other
            .iter()
            .fold(self.clone(), |map, (key, value)| map.insert(key.clone(), value.clone()))
    }

    /// Returns an empty map.
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Opens a transient editing window over this map.
    #[must_use]
    pub fn as_mutable(&self) -> TransientOrderedMap<K, V> {
        TransientOrderedMap {
            index: self.index.as_mutable(),
            entries: self.entries.as_mutable(),
        }
    }

    /// Applies a batch of edits through a transient and returns the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentOrderedMap;
    ///
    /// let map = PersistentOrderedMap::new().insert("z", 0).with_mutations(|transient| {
    ///     transient.insert("b", 1);
    ///     transient.insert("a", 2);
    ///     transient.remove("z");
    /// });
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "a"]);
    /// ```
    #[must_use]
    pub fn with_mutations<F>(&self, mutator: F) -> Self
    where
        F: FnOnce(&mut TransientOrderedMap<K, V>),
    {
        let mut transient = self.as_mutable();
        mutator(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientOrderedMap Definition
// =============================================================================

/// An ordered map inside a transient editing window.
///
/// Pairs a transient key index with a transient entry vector; both edit their
/// own nodes in place. Removals leave holes that are compacted with the same
/// rule as [`PersistentOrderedMap::remove`].
pub struct TransientOrderedMap<K, V> {
    index: TransientHashMap<K, usize>,
    entries: TransientVector<Option<(K, V)>>,
}

static_assertions::assert_not_impl_any!(TransientOrderedMap<i32, i32>: Send, Sync);

impl<K, V> TransientOrderedMap<K, V> {
    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> TransientOrderedMap<K, V> {
    /// Creates an empty transient map.
    #[must_use]
    pub fn new() -> Self {
        PersistentOrderedMap::new().as_mutable()
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key)?;
        self.entries
            .get(slot)?
            .as_ref()
            .map(|(_, value)| value)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Inserts or replaces an entry; returns `true` if the key was new.
    ///
    /// A replaced entry keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if let Some(&slot) = self.index.get(&key) {
            self.entries.set(slot, Some((key, value)));
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push_back(Some((key, value)));
        true
    }

    /// Removes a key; returns `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&slot) = self.index.get(key) else {
            return false;
        };
        self.index.remove(key);
        if self.index.is_empty() {
            self.entries = TransientVector::new();
        } else if slot + 1 == self.entries.len() {
            self.entries.pop_back();
        } else {
            self.entries.set(slot, None);
        }
        if needs_compaction(self.entries.len(), self.index.len()) {
            self.compact();
        }
        true
    }

    /// Rebuilds the entry vector without holes and renumbers the index.
    fn compact(&mut self) {
        tracing::trace!(
            slots = self.entries.len(),
            live = self.index.len(),
            "compacting transient ordered map"
        );
        let slots = std::mem::take(&mut self.entries).as_immutable();
        for (slot, (key, value)) in slots.into_iter().flatten().enumerate() {
            self.index.insert(key.clone(), slot);
            self.entries.push_back(Some((key, value)));
        }
    }

    /// Closes the editing window and returns the resulting persistent map.
    #[must_use]
    pub fn as_immutable(self) -> PersistentOrderedMap<K, V> {
        PersistentOrderedMap {
            index: self.index.as_immutable(),
            entries: self.entries.as_immutable(),
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Default for TransientOrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Extend<(K, V)> for TransientOrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over entries of a [`PersistentOrderedMap`] in insertion order.
pub struct PersistentOrderedMapIterator<'a, K, V> {
    slots: PersistentVectorIterator<'a, Option<(K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for PersistentOrderedMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for PersistentOrderedMapIterator<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (key, value) = self.slots.by_ref().rev().flatten().next()?;
        self.remaining -= 1;
        Some((key, value))
    }
}

impl<K, V> ExactSizeIterator for PersistentOrderedMapIterator<'_, K, V> {}

impl<K, V> FusedIterator for PersistentOrderedMapIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentOrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentOrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientOrderedMap::new();
        transient.extend(iter);
        transient.as_immutable()
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentOrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentOrderedMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for PersistentOrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for PersistentOrderedMap<K, V> {}

impl<K: Hash, V: Hash> Hash for PersistentOrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentOrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentOrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for PersistentOrderedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentOrderedMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct OrderedVisitor<K, V>(std::marker::PhantomData<(K, V)>);

        impl<'de, K, V> serde::de::Visitor<'de> for OrderedVisitor<K, V>
        where
            K: serde::Deserialize<'de> + Clone + Hash + Eq,
            V: serde::Deserialize<'de> + Clone,
        {
            type Value = PersistentOrderedMap<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries.into_iter().collect())
            }
        }

        deserializer.deserialize_map(OrderedVisitor(std::marker::PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_insertion_order_survives_overwrite() {
        let map = PersistentOrderedMap::new()
            .insert("b", 1)
            .insert("a", 2)
            .insert("c", 3)
            .insert("a", 20);
        let keys: Vec<&str> = map.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(map.get("a"), Some(&20));
    }

    #[rstest]
    fn test_remove_leaves_hole_then_compacts() {
        let map: PersistentOrderedMap<usize, usize> = (0..64).map(|key| (key, key)).collect();
        let thinned = (0..40).fold(map.clone(), |map, key| map.remove(&key));
        assert_eq!(thinned.len(), 24);
        assert!(thinned.entries.len() < 64);
        assert_eq!(
            thinned.keys().copied().collect::<Vec<_>>(),
            (40..64).collect::<Vec<_>>()
        );
        assert_eq!(map.len(), 64);
    }

    #[rstest]
    fn test_remove_last_pops() {
        let map = PersistentOrderedMap::new().insert(1, 'a').insert(2, 'b');
        let removed = map.remove(&2);
        assert_eq!(removed.entries.len(), 1);
        assert_eq!(removed.insert(3, 'c').keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[rstest]
    fn test_iterates_backwards() {
        let map: PersistentOrderedMap<i32, i32> = [(3, 0), (1, 0), (2, 0)].into_iter().collect();
        let keys: Vec<i32> = map.keys().rev().copied().collect();
        assert_eq!(keys, vec![2, 1, 3]);
    }

    #[rstest]
    fn test_transient_batch_matches_persistent_chain() {
        let base: PersistentOrderedMap<i32, i32> = (0..10).map(|key| (key, key)).collect();
        let chained = base
            .insert(20, 20)
            .remove(&3)
            .insert(5, 50)
            .remove(&9)
            .insert(3, 30);
        let batched = base.with_mutations(|transient| {
            transient.insert(20, 20);
            transient.remove(&3);
            transient.insert(5, 50);
            transient.remove(&9);
            transient.insert(3, 30);
        });
        assert_eq!(batched, chained);
        assert_eq!(
            batched.keys().copied().collect::<Vec<_>>(),
            vec![0, 1, 2, 4, 5, 6, 7, 8, 20, 3]
        );
        assert_eq!(base.len(), 10);
        assert_eq!(base.get(&5), Some(&5));
    }

    #[rstest]
    fn test_transient_compacts_holes() {
        let map: PersistentOrderedMap<usize, usize> = (0..64).map(|key| (key, key)).collect();
        let mut transient = map.as_mutable();
        for key in 0..40 {
            assert!(transient.remove(&key));
        }
        assert!(!transient.remove(&0));
        assert_eq!(transient.len(), 24);
        assert_eq!(transient.get(&50), Some(&50));
        let thinned = transient.as_immutable();
        assert!(thinned.entries.len() < 64);
        assert_eq!(thinned.insert(100, 100).keys().last(), Some(&100));
        assert_eq!(
            thinned.keys().copied().collect::<Vec<_>>(),
            (40..64).collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn test_transient_emptied_resets_slots() {
        let mut transient = TransientOrderedMap::new();
        transient.insert("a", 1);
        transient.insert("b", 2);
        transient.remove("b");
        transient.remove("a");
        assert!(transient.is_empty());
        transient.insert("c", 3);
        let map = transient.as_immutable();
        assert_eq!(map.entries.len(), 1);
        assert_eq!(map.get("c"), Some(&3));
    }

    #[rstest]
    fn test_equality_is_order_sensitive() {
        let left = PersistentOrderedMap::new().insert(1, 1).insert(2, 2);
        let right = PersistentOrderedMap::new().insert(2, 2).insert(1, 1);
        assert_ne!(left, right);
        assert_eq!(left, left.clone());
    }
}
