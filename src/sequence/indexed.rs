//! Indexed lazy sequences.
//!
//! An [`IndexedSeq`] behaves like an array: an item's key is its position,
//! and every operator that drops, adds or reorders items renumbers the
//! result from 0.

use std::fmt::Display;

use super::seq::{Entries, Seq, Source};
use super::{Flavor, Flavored, KeyedSeq, SetSeq};
use crate::persistent::{
    PersistentHashMap, PersistentOrderedMap, PersistentStack, PersistentVector, resolve_index,
};

/// A lazy sequence whose keys are positions.
///
/// # Examples
///
/// ```rust
/// use sharetrie::sequence::IndexedSeq;
///
/// let seq = IndexedSeq::of(0..100);
/// let reversed = seq.reverse().take(3);
/// assert_eq!(
///     reversed.entries().collect::<Vec<_>>(),
///     vec![(0, 99), (1, 98), (2, 97)]
/// );
/// ```
pub struct IndexedSeq<T> {
    seq: Seq<T>,
}

impl<T> Flavored for IndexedSeq<T> {
    const FLAVOR: Flavor = Flavor::Indexed;
}

value_operators!(IndexedSeq);

impl<T: Clone + 'static> IndexedSeq<T> {
    pub(crate) const fn from_seq(seq: Seq<T>) -> Self {
        Self { seq }
    }

    /// Creates a sequence over the given values.
    pub fn of<I: IntoIterator<Item = T>>(values: I) -> Self {
        values.into_iter().collect()
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.seq.iter().nth(index)
    }

    /// Returns `(position, item)` pairs front to back.
    pub fn entries(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.seq.iter().enumerate()
    }

    /// Returns the `(position, item)` pairs as an indexed sequence.
    #[must_use]
    pub fn entry_seq(&self) -> IndexedSeq<(usize, T)> {
        IndexedSeq::from_seq(self.seq.enumerate())
    }

    /// Removes `remove_count` items at `index` and inserts `values` there.
    ///
    /// A negative `index` counts back from the end; out-of-range indices
    /// clamp to the sequence bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::sequence::IndexedSeq;
    ///
    /// let seq = IndexedSeq::of([1, 2, 3]);
    /// assert_eq!(seq.splice(3, 1, []).to_vec(), vec![1, 2, 3]);
    /// assert_eq!(seq.splice(-1, 1, [9]).to_vec(), vec![1, 2, 9]);
    /// ```
    #[must_use]
    pub fn splice<I>(&self, index: isize, remove_count: usize, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let inserted: Vec<T> = values.into_iter().collect();
        if remove_count == 0 && inserted.is_empty() {
            return self.clone();
        }
        let start = resolve_index(index, self.count());
        let head = self.seq.take(start);
        let tail = self.seq.skip(start.saturating_add(remove_count));
        Self::from_seq(head.concat(&[Seq::from_vec(inserted), tail]))
    }

    /// Places `separator` between every pair of items.
    #[must_use]
    pub fn interpose(&self, separator: T) -> Self {
        Self::from_seq(self.seq.interpose(separator))
    }

    /// Replaces every item with the items `mapper` returns for it.
    #[must_use]
    pub fn flat_map<U, I, F>(&self, mapper: F) -> IndexedSeq<U>
    where
        U: Clone + 'static,
        I: IntoIterator<Item = U>,
        F: Fn(&T) -> I + 'static,
    {
        IndexedSeq::from_seq(
            self.seq
                .flat_map(move |value| mapper(&value).into_iter().collect()),
        )
    }

    /// Returns the position of the first item matching `predicate`.
    pub fn find_index<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        self.seq.iter().position(|value| predicate(&value))
    }

    /// Returns the position of the last item matching `predicate`.
    pub fn find_last_index<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        let offset = self.seq.entries(true).position(|value| predicate(&value))?;
        Some(self.count() - 1 - offset)
    }

    /// Returns the position of the first item equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_index(|candidate| candidate == value)
    }

    /// Returns the position of the last item equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_last_index(|candidate| candidate == value)
    }

    /// Joins the items' display forms with `separator`.
    pub fn join(&self, separator: &str) -> String
    where
        T: Display,
    {
        self.seq
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Freezes the current positions into keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::sequence::IndexedSeq;
    ///
    /// let keyed = IndexedSeq::of(0..100)
    ///     .reverse()
    ///     .to_keyed_seq()
    ///     .skip(10)
    ///     .take(2)
    ///     .reverse();
    /// assert_eq!(keyed.to_vec(), vec![(11, 88), (10, 89)]);
    /// ```
    #[must_use]
    pub fn to_keyed_seq(&self) -> KeyedSeq<usize, T> {
        KeyedSeq::from_seq(self.seq.enumerate())
    }

    /// Views the items as a set sequence.
    #[must_use]
    pub fn to_set_seq(&self) -> SetSeq<T> {
        SetSeq::from_seq(self.seq.clone())
    }

    /// Collects the items into a map keyed by position.
    #[must_use]
    pub fn to_map(&self) -> PersistentHashMap<usize, T> {
        self.seq.iter().enumerate().collect()
    }

    /// Collects the items into an ordered map keyed by position.
    #[must_use]
    pub fn to_ordered_map(&self) -> PersistentOrderedMap<usize, T> {
        self.seq.iter().enumerate().collect()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> IndexedSeq<(K, V)> {
    /// Treats each `(key, value)` item as an entry of a keyed sequence.
    #[must_use]
    pub fn from_entry_seq(&self) -> KeyedSeq<K, V> {
        KeyedSeq::from_seq(self.seq.clone())
    }
}

impl<T> IndexedSeq<T>
where
    T: IntoIterator + Clone + 'static,
    T::Item: Clone + 'static,
{
    /// Flattens one level of nesting.
    #[must_use]
    pub fn flatten(&self) -> IndexedSeq<T::Item> {
        IndexedSeq::from_seq(self.seq.flat_map(|value| value.into_iter().collect()))
    }
}

/// An indexed sequence equals a keyed one when their `(key, value)` pairs
/// agree in order.
impl<T: Clone + PartialEq + 'static> PartialEq<KeyedSeq<usize, T>> for IndexedSeq<T> {
    fn eq(&self, other: &KeyedSeq<usize, T>) -> bool {
        self.entries().eq(other.iter())
    }
}

// =============================================================================
// Container Sources
// =============================================================================

struct VectorSource<T>(PersistentVector<T>);

impl<T: Clone> Source<T> for VectorSource<T> {
    fn size(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn entries(&self, reverse: bool) -> Entries<'_, T> {
        if reverse {
            Box::new(self.0.iter().rev().cloned())
        } else {
            Box::new(self.0.iter().cloned())
        }
    }
}

/// Forward-only: reversing a stack view goes through the sequence cache.
struct StackSource<T>(PersistentStack<T>);

impl<T: Clone> Source<T> for StackSource<T> {
    fn size(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn reversible(&self) -> bool {
        false
    }

    fn entries(&self, _reverse: bool) -> Entries<'_, T> {
        Box::new(self.0.iter().cloned())
    }
}

impl<T: Clone + 'static> PersistentVector<T> {
    /// Returns a lazy indexed view of the vector.
    #[must_use]
    pub fn to_seq(&self) -> IndexedSeq<T> {
        IndexedSeq::from_seq(Seq::new(VectorSource(self.clone())))
    }
}

impl<T: Clone + 'static> PersistentStack<T> {
    /// Returns a lazy indexed view of the stack, top first.
    #[must_use]
    pub fn to_seq(&self) -> IndexedSeq<T> {
        IndexedSeq::from_seq(Seq::new(StackSource(self.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_filter_skip_take_renumbers() {
        let seq = IndexedSeq::of(0..100)
            .filter(|value| value % 2 == 0)
            .skip(10)
            .take(5);
        assert_eq!(
            seq.entries().collect::<Vec<_>>(),
            vec![(0, 20), (1, 22), (2, 24), (3, 26), (4, 28)]
        );
    }

    #[rstest]
    fn test_double_reverse_renumbers() {
        let seq = IndexedSeq::of(0..100).reverse().skip(10).take(5).reverse();
        assert_eq!(
            seq.entries().collect::<Vec<_>>(),
            vec![(0, 85), (1, 86), (2, 87), (3, 88), (4, 89)]
        );
    }

    #[rstest]
    #[case(0, 0, vec![9], vec![9, 1, 2, 3])]
    #[case(1, 1, vec![], vec![1, 3])]
    #[case(-1, 5, vec![7, 8], vec![1, 2, 7, 8])]
    #[case(10, 0, vec![4], vec![1, 2, 3, 4])]
    fn test_splice(
        #[case] index: isize,
        #[case] remove_count: usize,
        #[case] values: Vec<i32>,
        #[case] expected: Vec<i32>,
    ) {
        let seq = IndexedSeq::of([1, 2, 3]);
        assert_eq!(seq.splice(index, remove_count, values).to_vec(), expected);
    }

    #[rstest]
    fn test_flat_map_and_flatten() {
        let seq = IndexedSeq::of([1, 2, 3]);
        assert_eq!(
            seq.flat_map(|value| vec![*value; *value as usize]).to_vec(),
            vec![1, 2, 2, 3, 3, 3]
        );
        let nested = IndexedSeq::of([vec![1, 2], vec![], vec![3]]);
        assert_eq!(nested.flatten().to_vec(), vec![1, 2, 3]);
        assert_eq!(nested.flatten().reverse().to_vec(), vec![3, 2, 1]);
    }

    #[rstest]
    fn test_index_searches() {
        let seq = IndexedSeq::of([5, 1, 5, 2]);
        assert_eq!(seq.index_of(&5), Some(0));
        assert_eq!(seq.last_index_of(&5), Some(2));
        assert_eq!(seq.find_last_index(|value| *value < 3), Some(3));
        assert_eq!(seq.index_of(&9), None);
    }

    #[rstest]
    fn test_sort_max_min_join() {
        let seq = IndexedSeq::of([3, 1, 2]);
        assert_eq!(seq.sort().to_vec(), vec![1, 2, 3]);
        assert_eq!(seq.sort_by(|left, right| right.cmp(left)).to_vec(), vec![3, 2, 1]);
        assert_eq!(seq.max(), Some(3));
        assert_eq!(seq.min(), Some(1));
        assert_eq!(seq.join("-"), "3-1-2");
    }

    #[rstest]
    fn test_sorts_and_extremes_by_key() {
        let seq = IndexedSeq::of(["pear", "fig", "banana", "kiwi"]);
        assert_eq!(
            seq.sort_by_key(|name| name.len()).to_vec(),
            vec!["fig", "pear", "kiwi", "banana"]
        );
        assert_eq!(seq.max_by_key(|name| name.len()), Some("banana"));
        assert_eq!(seq.min_by_key(|name| name.len()), Some("fig"));
        assert_eq!(seq.min_by_key(|name| name.len() % 2), Some("pear"));
        assert_eq!(seq.min_by(|left, right| left.cmp(right)), Some("banana"));
    }

    #[rstest]
    fn test_group_by_keeps_indexed_groups() {
        let groups = IndexedSeq::of(1..=7).group_by(|value| value % 3);
        assert_eq!(groups.key_seq().to_vec(), vec![1, 2, 0]);
        let ones = groups.get(&1).unwrap();
        assert_eq!(ones.flavor(), Flavor::Indexed);
        assert_eq!(ones.entries().collect::<Vec<_>>(), vec![(0, 1), (1, 4), (2, 7)]);
    }

    #[rstest]
    fn test_right_folds() {
        let seq = IndexedSeq::of(["a", "b", "c"]);
        assert_eq!(
            seq.fold_right(String::new(), |joined, value| joined + value),
            "cba"
        );
        let digits = IndexedSeq::of([1, 2, 3]);
        assert_eq!(digits.reduce_right(|total, value| total * 10 + value), Some(321));
        assert_eq!(IndexedSeq::<i32>::default().reduce_right(|left, _| left), None);
    }

    #[rstest]
    fn test_stack_view_reverses_through_cache() {
        let stack: PersistentStack<i32> = [1, 2, 3].into_iter().collect();
        let seq = stack.to_seq();
        assert_eq!(seq.reverse().to_vec(), vec![3, 2, 1]);
        assert_eq!(seq.last(), Some(3));
    }

    #[rstest]
    fn test_equals_keyed_view() {
        let seq = IndexedSeq::of([4, 5, 6]);
        assert!(seq == seq.to_keyed_seq());
        assert!(seq.reverse() != seq.to_keyed_seq());
    }
}
