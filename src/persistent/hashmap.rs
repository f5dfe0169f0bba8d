//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`PersistentHashMap`], an immutable hash map that uses
//! structural sharing, and [`TransientHashMap`], its batch-editing counterpart.
//!
//! # Overview
//!
//! Keys are hashed to 32 bits. Each trie level consumes 5 bits of the hash to
//! pick one of 32 slots in a bitmap-indexed node, so a path is at most seven
//! levels deep. Keys whose full hashes are equal share a collision node and
//! are told apart by equality.
//!
//! - O(log32 N) get, insert and remove
//! - O(1) len and `is_empty`
//! - an edit copies only the nodes on the path to the touched slot
//!
//! Removal always collapses: a node left holding a single entry is inlined into
//! its parent, and removing the last entry returns the canonical empty map.
//!
//! # Examples
//!
//! ```rust
//! use sharetrie::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2)
//!     .insert("three".to_string(), 3);
//!
//! assert_eq!(map.get("one"), Some(&1));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(updated.get("one"), Some(&100));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::rc::Rc;

use smallvec::{SmallVec, smallvec};

use super::ReferenceCounter;
use super::node::{BITS_PER_LEVEL, BitmapNode, slot_at};
use super::owner::{Owner, Stamped, editable};

// =============================================================================
// Hash computation
// =============================================================================

#[cfg(feature = "fxhash")]
type KeyHasher = rustc_hash::FxHasher;

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
type KeyHasher = ahash::AHasher;

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
type KeyHasher = std::collections::hash_map::DefaultHasher;

/// Computes the 32-bit trie hash of a key.
///
/// The hasher is built from fixed keys, so equal key sets always produce the
/// same trie layout and the same iteration order.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn hash_key<Q: Hash + ?Sized>(key: &Q) -> u32 {
    let hash = BuildHasherDefault::<KeyHasher>::default().hash_one(key);
    (hash ^ (hash >> 32)) as u32
}

#[inline]
const fn hash_slot(hash: u32, shift: u32) -> u32 {
    slot_at(hash as usize, shift)
}

// =============================================================================
// Node Definition
// =============================================================================

#[derive(Clone)]
struct Entry<K, V> {
    hash: u32,
    key: K,
    value: V,
}

#[derive(Clone)]
enum Child<K, V> {
    Entry(Entry<K, V>),
    Node(ReferenceCounter<Node<K, V>>),
}

/// Entries whose full 32-bit hashes are equal.
#[derive(Clone)]
struct CollisionNode<K, V> {
    owner: Option<Owner>,
    hash: u32,
    entries: SmallVec<[(K, V); 2]>,
}

#[derive(Clone)]
enum Node<K, V> {
    Bitmap(BitmapNode<Child<K, V>>),
    Collision(CollisionNode<K, V>),
}

impl<K: Clone, V: Clone> Stamped for Node<K, V> {
    fn owner(&self) -> Option<&Owner> {
        match self {
            Self::Bitmap(bitmap) => bitmap.owner.as_ref(),
            Self::Collision(collision) => collision.owner.as_ref(),
        }
    }

    fn set_owner(&mut self, owner: Option<Owner>) {
        match self {
            Self::Bitmap(bitmap) => bitmap.owner = owner,
            Self::Collision(collision) => collision.owner = owner,
        }
    }
}

/// Outcome of removing a key from a subtree.
enum Removal<K, V> {
    /// The subtree lost the key and keeps its shape.
    Removed,
    /// The subtree shrank to one entry, which the parent stores inline.
    Collapsed(Entry<K, V>),
    /// The subtree has no entries left.
    Emptied,
    /// The subtree shrank to a lone collision node, which the parent adopts.
    Hoisted(ReferenceCounter<Node<K, V>>),
}

type Root<K, V> = Option<ReferenceCounter<Node<K, V>>>;

// =============================================================================
// Trie operations
// =============================================================================

fn lookup<'a, K, V, Q>(root: Option<&'a Node<K, V>>, key: &Q) -> Option<(&'a K, &'a V)>
where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    let hash = hash_key(key);
    let mut node = root?;
    let mut shift = 0;
    loop {
        match node {
            Node::Bitmap(bitmap) => match bitmap.get(hash_slot(hash, shift))? {
                Child::Entry(entry) => {
                    return (entry.hash == hash && entry.key.borrow() == key)
                        .then_some((&entry.key, &entry.value));
                }
                Child::Node(child) => {
                    node = child;
                    shift += BITS_PER_LEVEL;
                }
            },
            Node::Collision(collision) => {
                if collision.hash != hash {
                    return None;
                }
                return collision
                    .entries
                    .iter()
                    .find(|(candidate, _)| (*candidate).borrow() == key)
                    .map(|(key, value)| (key, value));
            }
        }
    }
}

/// Inserts `key` under `root`, returning `true` if the key was not present.
fn insert_key<K: Clone + Hash + Eq, V: Clone>(
    root: &mut Root<K, V>,
    owner: Option<&Owner>,
    key: K,
    value: V,
) -> bool {
    let hash = hash_key(&key);
    let entry = Entry { hash, key, value };
    match root {
        Some(link) => insert_into(link, owner, entry, 0),
        None => {
            let slot = hash_slot(hash, 0);
            let node = BitmapNode::single(owner.cloned(), slot, Child::Entry(entry));
            *root = Some(ReferenceCounter::new(Node::Bitmap(node)));
            true
        }
    }
}

fn insert_into<K: Clone + Eq, V: Clone>(
    link: &mut ReferenceCounter<Node<K, V>>,
    owner: Option<&Owner>,
    entry: Entry<K, V>,
    shift: u32,
) -> bool {
    let node = editable(link, owner);
    let bitmap = match node {
        Node::Bitmap(bitmap) => bitmap,
        Node::Collision(collision) if collision.hash == entry.hash => {
            if let Some(existing) = collision
                .entries
                .iter_mut()
                .find(|(candidate, _)| *candidate == entry.key)
            {
                existing.1 = entry.value;
                return false;
            }
            collision.entries.push((entry.key, entry.value));
            return true;
        }
        Node::Collision(collision) => {
            let collision_hash = collision.hash;
            let displaced = std::mem::replace(node, Node::Bitmap(BitmapNode::empty(None)));
            *node = split_collision(owner, displaced, collision_hash, entry, shift);
            return true;
        }
    };

    let slot = hash_slot(entry.hash, shift);
    match bitmap.get_mut(slot) {
        None => {}
        Some(Child::Node(child)) => {
            return insert_into(child, owner, entry, shift + BITS_PER_LEVEL);
        }
        Some(Child::Entry(existing)) => {
            if existing.hash == entry.hash && existing.key == entry.key {
                existing.value = entry.value;
                return false;
            }
        }
    }

    if let Some(Child::Entry(existing)) = bitmap.remove(slot) {
        let merged = merge_entries(owner, existing, entry, shift + BITS_PER_LEVEL);
        bitmap.insert(slot, Child::Node(ReferenceCounter::new(merged)));
    } else {
        bitmap.insert(slot, Child::Entry(entry));
    }
    true
}

/// Builds the smallest subtree holding two entries that met at one slot.
fn merge_entries<K, V>(
    owner: Option<&Owner>,
    first: Entry<K, V>,
    second: Entry<K, V>,
    shift: u32,
) -> Node<K, V> {
    if first.hash == second.hash {
        return Node::Collision(CollisionNode {
            owner: owner.cloned(),
            hash: first.hash,
            entries: smallvec![(first.key, first.value), (second.key, second.value)],
        });
    }
    let first_slot = hash_slot(first.hash, shift);
    let second_slot = hash_slot(second.hash, shift);
    let bitmap = if first_slot == second_slot {
        let merged = merge_entries(owner, first, second, shift + BITS_PER_LEVEL);
        BitmapNode::single(
            owner.cloned(),
            first_slot,
            Child::Node(ReferenceCounter::new(merged)),
        )
    } else {
        BitmapNode::pair(
            owner.cloned(),
            (first_slot, Child::Entry(first)),
            (second_slot, Child::Entry(second)),
        )
    };
    Node::Bitmap(bitmap)
}

/// Pushes a collision node one level down next to an entry with another hash.
fn split_collision<K, V>(
    owner: Option<&Owner>,
    collision: Node<K, V>,
    collision_hash: u32,
    entry: Entry<K, V>,
    shift: u32,
) -> Node<K, V> {
    let collision_slot = hash_slot(collision_hash, shift);
    let entry_slot = hash_slot(entry.hash, shift);
    let bitmap = if collision_slot == entry_slot {
        let split = split_collision(owner, collision, collision_hash, entry, shift + BITS_PER_LEVEL);
        BitmapNode::single(
            owner.cloned(),
            collision_slot,
            Child::Node(ReferenceCounter::new(split)),
        )
    } else {
        BitmapNode::pair(
            owner.cloned(),
            (collision_slot, Child::Node(ReferenceCounter::new(collision))),
            (entry_slot, Child::Entry(entry)),
        )
    };
    Node::Bitmap(bitmap)
}

/// Removes `key` from under `root`, returning `true` if it was present.
fn remove_key<K, V, Q>(root: &mut Root<K, V>, owner: Option<&Owner>, key: &Q) -> bool
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Hash + Eq + ?Sized,
{
    if lookup(root.as_deref(), key).is_none() {
        return false;
    }
    let hash = hash_key(key);
    if let Some(link) = root.as_mut()
        && let Removal::Emptied = remove_from(link, owner, hash, key, 0)
    {
        *root = None;
    }
    true
}

/// Removes a key known to be present in the subtree behind `link`.
fn remove_from<K, V, Q>(
    link: &mut ReferenceCounter<Node<K, V>>,
    owner: Option<&Owner>,
    hash: u32,
    key: &Q,
    shift: u32,
) -> Removal<K, V>
where
    K: Clone + Borrow<Q>,
    V: Clone,
    Q: Eq + ?Sized,
{
    match editable(link, owner) {
        Node::Collision(collision) => {
            collision
                .entries
                .retain(|(candidate, _)| (*candidate).borrow() != key);
            match collision.entries.len() {
                0 => Removal::Emptied,
                1 => {
                    let (key, value) = collision.entries.remove(0);
                    Removal::Collapsed(Entry {
                        hash: collision.hash,
                        key,
                        value,
                    })
                }
                _ => Removal::Removed,
            }
        }
        Node::Bitmap(bitmap) => {
            let slot = hash_slot(hash, shift);
            let outcome = match bitmap.get_mut(slot) {
                Some(Child::Node(child)) => {
                    remove_from(child, owner, hash, key, shift + BITS_PER_LEVEL)
                }
                Some(Child::Entry(_)) => Removal::Emptied,
                None => Removal::Removed,
            };
            match outcome {
                Removal::Removed => {}
                Removal::Emptied => {
                    bitmap.remove(slot);
                }
                Removal::Collapsed(entry) => {
                    bitmap.insert(slot, Child::Entry(entry));
                }
                Removal::Hoisted(collision) => {
                    bitmap.insert(slot, Child::Node(collision));
                }
            }

            // Entries and collision nodes are both leaves; a lone leaf moves up.
            let lone_leaf = shift > 0
                && bitmap.len() == 1
                && match bitmap.children().first() {
                    Some(Child::Entry(_)) => true,
                    Some(Child::Node(child)) => matches!(**child, Node::Collision(_)),
                    None => false,
                };
            if bitmap.is_empty() {
                Removal::Emptied
            } else if lone_leaf {
                match bitmap.take_only() {
                    Some((_, Child::Entry(entry))) => Removal::Collapsed(entry),
                    Some((_, Child::Node(collision))) => Removal::Hoisted(collision),
                    None => Removal::Removed,
                }
            } else {
                Removal::Removed
            }
        }
    }
}

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on HAMT.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `contains_key` | O(log32 N)        |
/// | `len`          | O(1)              |
///
/// Iteration order is stable for a given set of keys but otherwise
/// unspecified.
///
/// # Examples
///
/// ```rust
/// use sharetrie::persistent::PersistentHashMap;
///
/// let map = PersistentHashMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
#[derive(Clone)]
pub struct PersistentHashMap<K, V> {
    /// Root node; `None` is the canonical empty map
    root: Root<K, V>,
    /// Number of entries
    length: usize,
}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if both maps share the same root node.
    ///
    /// Two empty maps always share the (absent) root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert(1, "one");
    /// let emptied = map.remove(&1);
    /// assert!(emptied.ptr_eq(&PersistentHashMap::new()));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Returns an iterator over key-value pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let sum: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(sum, 3);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator::new(self.root.as_deref(), self.length, false)
    }

    /// Returns an iterator over key-value pairs in the reverse of [`iter`](Self::iter) order.
    #[must_use]
    pub fn iter_rev(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator::new(self.root.as_deref(), self.length, true)
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let sum: i32 = map.values().sum();
    /// assert_eq!(sum, 3);
    /// ```
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Returns an empty map.
    #[inline]
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map containing a single key-value pair.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        lookup(self.root.as_deref(), key).map(|(_, value)| value)
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1);
    /// assert_eq!(map.get_or("a", &0), &1);
    /// assert_eq!(map.get_or("z", &0), &0);
    /// ```
    #[must_use]
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns the stored key and its value.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        lookup(self.root.as_deref(), key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        lookup(self.root.as_deref(), key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains the key, the value is replaced.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let map2 = map1.insert("key".to_string(), 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1));
    /// assert_eq!(map2.get("key"), Some(&2));
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let mut result = self.clone();
        if insert_key(&mut result.root, None, key, value) {
            result.length += 1;
        }
        result
    }

    /// Removes a key from the map.
    ///
    /// Removing an absent key returns a map sharing the original root.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.get("a"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut result = self.clone();
        if remove_key(&mut result.root, None, key) {
            result.length -= 1;
        }
        result
    }

    /// Replaces the value of an existing key with `function(value)`.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    /// let updated = map.update("count", |value| value + 1).unwrap();
    /// assert_eq!(updated.get("count"), Some(&11));
    /// assert!(map.update("missing", |value| value + 1).is_none());
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let (stored, value) = self.get_key_value(key)?;
        Some(self.insert(stored.clone(), function(value)))
    }

    /// Inserts, replaces or removes the value for `key`.
    ///
    /// The updater receives the current value, if any. Returning `Some`
    /// stores the new value; returning `None` removes the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    ///
    /// let updated = map.update_with("count", |value| value.map(|value| value + 1));
    /// assert_eq!(updated.get("count"), Some(&11));
    ///
    /// let inserted = map.update_with("fresh", |value| Some(value.copied().unwrap_or(100)));
    /// assert_eq!(inserted.get("fresh"), Some(&100));
    ///
    /// let removed = map.update_with("count", |_| None);
    /// assert_eq!(removed.get("count"), None);
    /// ```
    #[must_use]
    pub fn update_with<Q, F>(&self, key: &Q, updater: F) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let current = self.get_key_value(key);
        match (current, updater(current.map(|(_, value)| value))) {
            (Some((stored, _)), Some(value)) => self.insert(stored.clone(), value),
            (Some(_), None) => self.remove(key),
            (None, Some(value)) => self.insert(key.to_owned(), value),
            (None, None) => self.clone(),
        }
    }

    /// Merges two maps, with values from `other` taking precedence on key conflicts.
    ///
    /// Merging into an empty map returns `other` itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let map2 = PersistentHashMap::new().insert("b", 20).insert("c", 3);
    ///
    /// let merged = map1.merge(&map2);
    /// assert_eq!(merged.get("b"), Some(&20));
    /// assert_eq!(merged.len(), 3);
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.with_mutations(|transient| {
            for (key, value) in other {
                transient.insert(key.clone(), value.clone());
            }
        })
    }

    /// Merges two maps, resolving key conflicts with `merger(existing, incoming)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let map2 = PersistentHashMap::new().insert("b", 20);
    ///
    /// let merged = map1.merge_with(&map2, |existing, incoming| existing + incoming);
    /// assert_eq!(merged.get("b"), Some(&22));
    /// ```
    #[must_use]
    pub fn merge_with<F>(&self, other: &Self, mut merger: F) -> Self
    where
        F: FnMut(&V, &V) -> V,
    {
        self.with_mutations(|transient| {
            for (key, value) in other {
                let merged = match transient.get(key) {
                    Some(existing) => merger(existing, value),
                    None => value.clone(),
                };
                transient.insert(key.clone(), merged);
            }
        })
    }

    /// Opens a transient editing window over this map.
    ///
    /// The returned [`TransientHashMap`] edits nodes in place while it owns them
    /// exclusively; `self` is never affected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert(1, "one");
    /// let mut transient = map.as_mutable();
    /// transient.insert(2, "two");
    /// let extended = transient.as_immutable();
    ///
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(extended.len(), 2);
    /// ```
    #[must_use]
    pub fn as_mutable(&self) -> TransientHashMap<K, V> {
        tracing::trace!(length = self.length, "opening transient hash map");
        TransientHashMap {
            root: self.root.clone(),
            length: self.length,
            owner: Owner::new(),
            _marker: PhantomData,
        }
    }

    /// Applies a batch of edits through a transient and returns the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<i32, i32> = PersistentHashMap::new().with_mutations(|transient| {
    ///     for index in 0..100 {
    ///         transient.insert(index, index * 2);
    ///     }
    /// });
    /// assert_eq!(map.len(), 100);
    /// assert_eq!(map.get(&50), Some(&100));
    /// ```
    #[must_use]
    pub fn with_mutations<F>(&self, mutator: F) -> Self
    where
        F: FnOnce(&mut TransientHashMap<K, V>),
    {
        let mut transient = self.as_mutable();
        mutator(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientHashMap Definition
// =============================================================================

/// A hash map inside a transient editing window.
///
/// Nodes created or copied by this transient carry its ownership token and are
/// edited in place by later writes. Nodes still shared with persistent maps
/// are copied first, so no persistent map ever observes a change.
///
/// `TransientHashMap` is neither `Send` nor `Sync`: the window has exactly one
/// owner. Call [`as_immutable`](Self::as_immutable) to publish the result.
///
/// # Examples
///
/// ```rust
/// use sharetrie::persistent::TransientHashMap;
///
/// let mut transient = TransientHashMap::new();
/// transient.insert("a", 1);
/// transient.insert("b", 2);
/// transient.remove("a");
/// let map = transient.as_immutable();
/// assert_eq!(map.len(), 1);
/// ```
pub struct TransientHashMap<K, V> {
    root: Root<K, V>,
    length: usize,
    owner: Owner,
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientHashMap<i32, i32>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientHashMap<String, String>: Send, Sync);

impl<K, V> TransientHashMap<K, V> {
    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if there are no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl<K: Clone + Hash + Eq, V: Clone> TransientHashMap<K, V> {
    /// Creates an empty transient map.
    #[must_use]
    pub fn new() -> Self {
        PersistentHashMap::new().as_mutable()
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        lookup(self.root.as_deref(), key).map(|(_, value)| value)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        lookup(self.root.as_deref(), key).is_some()
    }

    /// Inserts or replaces a value; returns `true` if the key was new.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let added = insert_key(&mut self.root, Some(&self.owner), key, value);
        if added {
            self.length += 1;
        }
        added
    }

    /// Removes a key; returns `true` if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = remove_key(&mut self.root, Some(&self.owner), key);
        if removed {
            self.length -= 1;
        }
        removed
    }

    /// Inserts, replaces or removes the value for `key` in place.
    ///
    /// See [`PersistentHashMap::update_with`].
    pub fn update_with<Q, F>(&mut self, key: &Q, updater: F)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let current = lookup(self.root.as_deref(), key);
        let stored = current.map(|(stored, _)| stored.clone());
        match (stored, updater(current.map(|(_, value)| value))) {
            (Some(stored), Some(value)) => {
                self.insert(stored, value);
            }
            (Some(_), None) => {
                self.remove(key);
            }
            (None, Some(value)) => {
                self.insert(key.to_owned(), value);
            }
            (None, None) => {}
        }
    }

    /// Closes the editing window and returns the resulting persistent map.
    ///
    /// The root's ownership token is cleared when the root is not shared.
    #[must_use]
    pub fn as_immutable(mut self) -> PersistentHashMap<K, V> {
        if let Some(root) = self.root.as_mut()
            && let Some(node) = ReferenceCounter::get_mut(root)
        {
            node.set_owner(None);
        }
        tracing::trace!(length = self.length, "closing transient hash map");
        PersistentHashMap {
            root: self.root,
            length: self.length,
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Default for TransientHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

enum Frame<'a, K, V> {
    Children(std::slice::Iter<'a, Child<K, V>>),
    Collision(std::slice::Iter<'a, (K, V)>),
}

impl<'a, K, V> Frame<'a, K, V> {
    fn of(node: &'a Node<K, V>) -> Self {
        match node {
            Node::Bitmap(bitmap) => Self::Children(bitmap.children().iter()),
            Node::Collision(collision) => Self::Collision(collision.entries.iter()),
        }
    }
}

/// An iterator over key-value pairs of a [`PersistentHashMap`].
///
/// Walks the trie depth first with an explicit stack, in either direction.
pub struct PersistentHashMapIterator<'a, K, V> {
    stack: Vec<Frame<'a, K, V>>,
    remaining: usize,
    reverse: bool,
}

impl<'a, K, V> PersistentHashMapIterator<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, length: usize, reverse: bool) -> Self {
        Self {
            stack: root.map(Frame::of).into_iter().collect(),
            remaining: length,
            reverse,
        }
    }
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.last_mut() {
            match frame {
                Frame::Children(children) => {
                    let child = if self.reverse {
                        children.next_back()
                    } else {
                        children.next()
                    };
                    match child {
                        Some(Child::Entry(entry)) => {
                            self.remaining -= 1;
                            return Some((&entry.key, &entry.value));
                        }
                        Some(Child::Node(node)) => self.stack.push(Frame::of(node)),
                        None => {
                            self.stack.pop();
                        }
                    }
                }
                Frame::Collision(entries) => {
                    let entry = if self.reverse {
                        entries.next_back()
                    } else {
                        entries.next()
                    };
                    if let Some((key, value)) = entry {
                        self.remaining -= 1;
                        return Some((key, value));
                    }
                    self.stack.pop();
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {}

impl<K, V> FusedIterator for PersistentHashMapIterator<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHashMap::new();
        for (key, value) in iter {
            transient.insert(key, value);
        }
        transient.as_immutable()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Extend<(K, V)> for TransientHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Clone, V: Clone> IntoIterator for PersistentHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if self.ptr_eq(other) {
            return true;
        }
        self.iter()
            .all(|(key, value)| other.get(key).is_some_and(|found| found == value))
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

impl<K: Hash, V: Hash> Hash for PersistentHashMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let builder = BuildHasherDefault::<KeyHasher>::default();
        let combined = self.iter().fold(0u64, |accumulator, entry| {
            accumulator.wrapping_add(builder.hash_one(entry))
        });
        state.write_usize(self.length);
        state.write_u64(combined);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentHashMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentHashMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
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
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for PersistentHashMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentHashMapVisitor<K, V> {
    marker: PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for PersistentHashMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentHashMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut transient = TransientHashMap::new();
        while let Some((key, value)) = access.next_entry()? {
            transient.insert(key, value);
        }
        Ok(transient.as_immutable())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentHashMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentHashMapVisitor {
            marker: PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
