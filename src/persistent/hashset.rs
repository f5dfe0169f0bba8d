//! Persistent (immutable) hash set based on HAMT.
//!
//! [`PersistentHashSet`] is a [`PersistentHashMap`] whose values are `()`;
//! every trie property of the map (structural sharing, collision handling,
//! collapse on removal) carries over unchanged.
//!
//! # Examples
//!
//! ```rust
//! use sharetrie::persistent::PersistentHashSet;
//!
//! let set = PersistentHashSet::new().insert(1).insert(2).insert(3);
//! assert!(set.contains(&1));
//!
//! let other: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
//! assert_eq!(set.union(&other).len(), 4);
//! assert_eq!(set.intersection(&other).len(), 2);
//! assert_eq!(set.difference(&other).len(), 1);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::rc::Rc;

use super::{PersistentHashMap, PersistentHashMapIterator, TransientHashMap};

// =============================================================================
// PersistentHashSet Definition
// =============================================================================

/// A persistent (immutable) hash set based on HAMT.
///
/// # Time Complexity
///
/// | Operation      | Complexity   |
/// |----------------|--------------|
/// | `contains`     | O(log32 N)   |
/// | `insert`       | O(log32 N)   |
/// | `remove`       | O(log32 N)   |
/// | `union`        | O(m log32 N) |
/// | `len`          | O(1)         |
#[derive(Clone)]
pub struct PersistentHashSet<T> {
    inner: PersistentHashMap<T, ()>,
}

impl<T> PersistentHashSet<T> {
    /// Creates a new empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: PersistentHashMap::new(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if both sets share the same root node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// Returns an iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter(),
        }
    }

    /// Returns an iterator over the elements in the reverse of [`iter`](Self::iter) order.
    #[must_use]
    pub fn iter_rev(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter_rev(),
        }
    }

    /// Returns an empty set.
    #[inline]
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> PersistentHashSet<T> {
    /// Creates a set containing a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }

    /// Returns `true` if the set contains the element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::singleton("a".to_string());
    /// assert!(set.contains("a"));
    /// assert!(!set.contains("b"));
    /// ```
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Adds an element. Adding a present element returns an equal set.
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Removes an element.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns every element present in either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            inner: self.inner.merge(&other.inner),
        }
    }

    /// Returns the elements present in both sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashSet;
    ///
    /// let left: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    /// let right: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
    /// let both = left.intersection(&right);
    /// assert!(both.contains(&2) && both.contains(&3) && !both.contains(&1));
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.with_mutations(|transient| {
            for element in self {
                if !other.contains(element) {
                    transient.remove(element);
                }
            }
        })
    }

    /// Returns the elements of `self` absent from `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.with_mutations(|transient| {
            for element in other {
                transient.remove(element);
            }
        })
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Opens a transient editing window over this set.
    #[must_use]
    pub fn as_mutable(&self) -> TransientHashSet<T> {
        TransientHashSet {
            inner: self.inner.as_mutable(),
            _marker: PhantomData,
        }
    }

    /// Applies a batch of edits through a transient and returns the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().with_mutations(|transient| {
    ///     for element in 0..10 {
    ///         transient.insert(element % 4);
    ///     }
    /// });
    /// assert_eq!(set.len(), 4);
    /// ```
    #[must_use]
    pub fn with_mutations<F>(&self, mutator: F) -> Self
    where
        F: FnOnce(&mut TransientHashSet<T>),
    {
        let mut transient = self.as_mutable();
        mutator(&mut transient);
        transient.as_immutable()
    }
}

// =============================================================================
// TransientHashSet Definition
// =============================================================================

/// A hash set inside a transient editing window.
///
/// `PhantomData<Rc<()>>` keeps the transient `!Send` and `!Sync`.
///
/// # Examples
///
/// ```rust
/// use sharetrie::persistent::TransientHashSet;
///
/// let mut transient = TransientHashSet::new();
/// assert!(transient.insert(1));
/// assert!(!transient.insert(1));
/// let set = transient.as_immutable();
/// assert_eq!(set.len(), 1);
/// ```
pub struct TransientHashSet<T> {
    inner: TransientHashMap<T, ()>,
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientHashSet<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(TransientHashSet<String>: Send, Sync);

impl<T> TransientHashSet<T> {
    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone + Hash + Eq> TransientHashSet<T> {
    /// Creates an empty transient set.
    #[must_use]
    pub fn new() -> Self {
        PersistentHashSet::new().as_mutable()
    }

    /// Returns `true` if the element is present.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Adds an element; returns `true` if it was not present.
    pub fn insert(&mut self, element: T) -> bool {
        self.inner.insert(element, ())
    }

    /// Removes an element; returns `true` if it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(element)
    }

    /// Closes the editing window and returns the resulting persistent set.
    #[must_use]
    pub fn as_immutable(self) -> PersistentHashSet<T> {
        PersistentHashSet {
            inner: self.inner.as_immutable(),
        }
    }
}

impl<T: Clone + Hash + Eq> Default for TransientHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: PersistentHashMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for PersistentHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|element| (element, ())).collect(),
        }
    }
}

impl<T: Clone + Hash + Eq> Extend<T> for TransientHashSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentHashSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Hash + Eq> PartialEq for PersistentHashSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Clone + Hash + Eq> Eq for PersistentHashSet<T> {}

impl<T: Hash> Hash for PersistentHashSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentHashSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentHashSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentHashSet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentHashSet<T>
where
    T: serde::Deserialize<'de> + Clone + Hash + Eq,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let elements: Vec<T> = serde::Deserialize::deserialize(deserializer)?;
        Ok(elements.into_iter().collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
