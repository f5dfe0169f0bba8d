//! Set lazy sequences, where every item is its own key.

use std::hash::Hash;

use super::seq::{Entries, Seq, Source};
use super::{Flavor, Flavored, IndexedSeq, KeyedSeq};
use crate::persistent::{PersistentHashMap, PersistentHashSet, PersistentOrderedMap};

/// A lazy sequence whose items double as their keys.
///
/// # Examples
///
/// ```rust
/// use sharetrie::persistent::PersistentHashSet;
///
/// let set: PersistentHashSet<i32> = (1..=6).collect();
/// let evens = set.to_seq().filter(|value| value % 2 == 0).to_set();
/// assert_eq!(evens.len(), 3);
/// ```
pub struct SetSeq<T> {
    seq: Seq<T>,
}

impl<T> Flavored for SetSeq<T> {
    const FLAVOR: Flavor = Flavor::Set;
}

value_operators!(SetSeq);

impl<T: Clone + 'static> SetSeq<T> {
    pub(crate) const fn from_seq(seq: Seq<T>) -> Self {
        Self { seq }
    }

    /// Creates a sequence over the given values.
    pub fn of<I: IntoIterator<Item = T>>(values: I) -> Self {
        values.into_iter().collect()
    }

    /// Views the items as entries keyed by themselves.
    #[must_use]
    pub fn to_keyed_seq(&self) -> KeyedSeq<T, T> {
        KeyedSeq::from_seq(self.seq.map(|value: T| (value.clone(), value)))
    }

    /// Views the items as an indexed sequence.
    #[must_use]
    pub fn to_indexed_seq(&self) -> IndexedSeq<T> {
        IndexedSeq::from_seq(self.seq.clone())
    }

    /// Collects the items into a map from each item to itself.
    #[must_use]
    pub fn to_map(&self) -> PersistentHashMap<T, T>
    where
        T: Hash + Eq,
    {
        self.seq.iter().map(|value| (value.clone(), value)).collect()
    }

    /// Collects the items into an ordered map from each item to itself.
    #[must_use]
    pub fn to_ordered_map(&self) -> PersistentOrderedMap<T, T>
    where
        T: Hash + Eq,
    {
        self.seq.iter().map(|value| (value.clone(), value)).collect()
    }
}

struct HashSetSource<T>(PersistentHashSet<T>);

impl<T: Clone> Source<T> for HashSetSource<T> {
    fn size(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn entries(&self, reverse: bool) -> Entries<'_, T> {
        if reverse {
            Box::new(self.0.iter_rev().cloned())
        } else {
            Box::new(self.0.iter().cloned())
        }
    }
}

impl<T: Clone + 'static> PersistentHashSet<T> {
    /// Returns a lazy set view of the set.
    #[must_use]
    pub fn to_seq(&self) -> SetSeq<T> {
        SetSeq::from_seq(Seq::new(HashSetSource(self.clone())))
    }
}
