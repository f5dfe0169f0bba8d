//! Lazy sequences.
//!
//! Every container can be viewed as a lazy sequence with `to_seq`. Operators
//! on a sequence return a new sequence describing the pending work; nothing
//! is evaluated until the sequence is iterated, counted or converted.
//!
//! Sequences come in three flavors that differ only in how keys are treated:
//!
//! - [`IndexedSeq`]: keys are positions, renumbered from 0 after every
//!   operator that changes the number or order of items
//! - [`KeyedSeq`]: every item keeps its original key
//! - [`SetSeq`]: an item is its own key
//!
//! [`IndexedSeq::to_keyed_seq`] freezes the current positions into keys, so
//! later operators keep them.
//!
//! # Examples
//!
//! ```rust
//! use sharetrie::sequence::IndexedSeq;
//!
//! let numbers: IndexedSeq<i32> = (0..100).collect();
//!
//! let indexed = numbers.filter(|value| value % 2 == 0).skip(10).take(5);
//! assert_eq!(
//!     indexed.entries().collect::<Vec<_>>(),
//!     vec![(0, 20), (1, 22), (2, 24), (3, 26), (4, 28)]
//! );
//!
//! let keyed = numbers.to_keyed_seq().filter(|_, value| value % 2 == 0).skip(10).take(5);
//! assert_eq!(
//!     keyed.to_vec(),
//!     vec![(20, 20), (22, 22), (24, 24), (26, 26), (28, 28)]
//! );
//! ```

use std::fmt;

/// Operators that never look inside an item, shared by every flavor.
macro_rules! structural_operators {
    ($flavor:ident < $($param:ident),+ >, $item:ty) => {
        impl<$($param: Clone + 'static),+> $flavor<$($param),+> {
            /// Returns the key semantics of this sequence.
            #[must_use]
            pub const fn flavor(&self) -> $crate::sequence::Flavor {
                <Self as $crate::sequence::Flavored>::FLAVOR
            }

            /// Returns the number of items when it is known without iterating.
            #[must_use]
            pub fn size(&self) -> Option<usize> {
                self.seq.size()
            }

            /// Iterates the items front to back.
            pub fn iter(&self) -> impl Iterator<Item = $item> + '_ {
                self.seq.iter()
            }

            /// Keeps the first `count` items.
            #[must_use]
            pub fn take(&self, count: usize) -> Self {
                Self::from_seq(self.seq.take(count))
            }

            /// Drops the first `count` items.
            #[must_use]
            pub fn skip(&self, count: usize) -> Self {
                Self::from_seq(self.seq.skip(count))
            }

            /// Keeps the last `count` items.
            #[must_use]
            pub fn take_last(&self, count: usize) -> Self {
                Self::from_seq(self.seq.reverse().take(count).reverse())
            }

            /// Drops the last `count` items.
            #[must_use]
            pub fn skip_last(&self, count: usize) -> Self {
                Self::from_seq(self.seq.reverse().skip(count).reverse())
            }

            /// Every item but the first.
            #[must_use]
            pub fn rest(&self) -> Self {
                self.skip(1)
            }

            /// Every item but the last.
            #[must_use]
            pub fn butlast(&self) -> Self {
                self.skip_last(1)
            }

            /// Reverses the iteration order.
            #[must_use]
            pub fn reverse(&self) -> Self {
                Self::from_seq(self.seq.reverse())
            }

            /// Items in `begin..end`; negative bounds count back from the end.
            #[must_use]
            pub fn slice(&self, begin: isize, end: Option<isize>) -> Self {
                Self::from_seq(self.seq.slice(begin, end))
            }

            /// Appends the items of `other`.
            #[must_use]
            pub fn concat(&self, other: &Self) -> Self {
                Self::from_seq(self.seq.concat(std::slice::from_ref(&other.seq)))
            }

            /// Evaluates once and serves later passes from the cached items.
            #[must_use]
            pub fn cache_result(&self) -> Self {
                Self::from_seq(self.seq.cache_result())
            }

            /// Returns the number of items, memoizing it when a pass was needed.
            #[must_use]
            pub fn count(&self) -> usize {
                self.seq.count()
            }

            /// Collects the items into a `Vec`.
            #[must_use]
            pub fn to_vec(&self) -> Vec<$item> {
                self.seq.to_vec()
            }
        }

        impl<$($param),+> Clone for $flavor<$($param),+> {
            fn clone(&self) -> Self {
                Self {
                    seq: self.seq.clone(),
                }
            }
        }

        impl<$($param: Clone + 'static),+> Default for $flavor<$($param),+> {
            fn default() -> Self {
                Self::from_seq($crate::sequence::seq::Seq::empty())
            }
        }

        impl<$($param: Clone + 'static),+> FromIterator<$item> for $flavor<$($param),+> {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                Self::from_seq($crate::sequence::seq::Seq::from_vec(iter.into_iter().collect()))
            }
        }

        impl<$($param: Clone + 'static),+> IntoIterator for $flavor<$($param),+> {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<$item>;

            fn into_iter(self) -> Self::IntoIter {
                self.seq.to_vec().into_iter()
            }
        }

        impl<$($param: Clone + PartialEq + 'static),+> PartialEq for $flavor<$($param),+> {
            fn eq(&self, other: &Self) -> bool {
                self.seq.equals(&other.seq)
            }
        }
    };
}

/// Operators shared by the flavors whose items are plain values.
macro_rules! value_operators {
    ($flavor:ident) => {
        structural_operators!($flavor<T>, T);

        impl<T: Clone + 'static> $flavor<T> {
            /// Visits items until `visit` breaks.
            ///
            /// Returns the number of items visited, including the one that
            /// stopped iteration.
            pub fn for_each<F>(&self, visit: F) -> usize
            where
                F: FnMut(T) -> std::ops::ControlFlow<()>,
            {
                self.seq.for_each(visit)
            }

            /// Lazily transforms every item.
            #[must_use]
            pub fn map<U, F>(&self, mapper: F) -> $flavor<U>
            where
                U: Clone + 'static,
                F: Fn(&T) -> U + 'static,
            {
                $flavor::from_seq(self.seq.map(move |value| mapper(&value)))
            }

            /// Keeps the items matching `predicate`. The size becomes unknown.
            #[must_use]
            pub fn filter<F>(&self, predicate: F) -> Self
            where
                F: Fn(&T) -> bool + 'static,
            {
                Self::from_seq(self.seq.filter(predicate))
            }

            /// Drops the items matching `predicate`.
            #[must_use]
            pub fn filter_not<F>(&self, predicate: F) -> Self
            where
                F: Fn(&T) -> bool + 'static,
            {
                Self::from_seq(self.seq.filter(move |value| !predicate(value)))
            }

            /// Keeps items while `predicate` holds.
            #[must_use]
            pub fn take_while<F>(&self, predicate: F) -> Self
            where
                F: Fn(&T) -> bool + 'static,
            {
                Self::from_seq(self.seq.take_while(predicate))
            }

            /// Drops items while `predicate` holds.
            #[must_use]
            pub fn skip_while<F>(&self, predicate: F) -> Self
            where
                F: Fn(&T) -> bool + 'static,
            {
                Self::from_seq(self.seq.skip_while(predicate))
            }

            /// Keeps items until `predicate` first holds.
            #[must_use]
            pub fn take_until<F>(&self, predicate: F) -> Self
            where
                F: Fn(&T) -> bool + 'static,
            {
                Self::from_seq(self.seq.take_while(move |value| !predicate(value)))
            }

            /// Drops items until `predicate` first holds.
            #[must_use]
            pub fn skip_until<F>(&self, predicate: F) -> Self
            where
                F: Fn(&T) -> bool + 'static,
            {
                Self::from_seq(self.seq.skip_while(move |value| !predicate(value)))
            }

            /// Counts the items matching `predicate`.
            pub fn count_where<F>(&self, predicate: F) -> usize
            where
                F: Fn(&T) -> bool,
            {
                self.seq.iter().filter(|value| predicate(value)).count()
            }

            /// Groups items by `grouper` and counts each group in one eager pass.
            pub fn count_by<G, F>(&self, grouper: F) -> $crate::sequence::KeyedSeq<G, usize>
            where
                G: Clone + std::hash::Hash + Eq + 'static,
                F: Fn(&T) -> G,
            {
                let mut counts = $crate::persistent::TransientHashMap::new();
                for value in self.seq.iter() {
                    let group = grouper(&value);
                    let count = counts.get(&group).copied().unwrap_or(0);
                    counts.insert(group, count + 1);
                }
                counts.as_immutable().to_seq()
            }

            /// Splits the items into sequences of this flavor, one per group.
            ///
            /// Evaluates eagerly. Groups appear in order of their first item.
            pub fn group_by<G, F>(&self, grouper: F) -> $crate::sequence::KeyedSeq<G, Self>
            where
                G: Clone + std::hash::Hash + Eq + 'static,
                F: Fn(&T) -> G,
            {
                self.seq
                    .grouped_by(grouper)
                    .into_iter()
                    .map(|(group, members)| (group, Self::from_seq(members)))
                    .collect()
            }

            /// Folds the items front to back.
            pub fn fold<A, F>(&self, initial: A, function: F) -> A
            where
                F: FnMut(A, T) -> A,
            {
                self.seq.iter().fold(initial, function)
            }

            /// Folds the items back to front.
            pub fn fold_right<A, F>(&self, initial: A, function: F) -> A
            where
                F: FnMut(A, T) -> A,
            {
                self.seq.entries(true).fold(initial, function)
            }

            /// Folds the items using the first one as the initial value.
            pub fn reduce<F>(&self, function: F) -> Option<T>
            where
                F: FnMut(T, T) -> T,
            {
                self.seq.iter().reduce(function)
            }

            /// Folds the items back to front, starting from the last one.
            pub fn reduce_right<F>(&self, function: F) -> Option<T>
            where
                F: FnMut(T, T) -> T,
            {
                self.seq.entries(true).reduce(function)
            }

            /// Returns `true` if every item matches `predicate`.
            pub fn every<F>(&self, predicate: F) -> bool
            where
                F: Fn(&T) -> bool,
            {
                self.seq.iter().all(|value| predicate(&value))
            }

            /// Returns `true` if any item matches `predicate`.
            pub fn some<F>(&self, predicate: F) -> bool
            where
                F: Fn(&T) -> bool,
            {
                self.seq.iter().any(|value| predicate(&value))
            }

            /// Returns the first item matching `predicate`.
            pub fn find<F>(&self, predicate: F) -> Option<T>
            where
                F: Fn(&T) -> bool,
            {
                self.seq.iter().find(|value| predicate(value))
            }

            /// Returns the last item matching `predicate`.
            pub fn find_last<F>(&self, predicate: F) -> Option<T>
            where
                F: Fn(&T) -> bool,
            {
                self.seq.entries(true).find(|value| predicate(value))
            }

            /// Returns the first item.
            #[must_use]
            pub fn first(&self) -> Option<T> {
                self.seq.iter().next()
            }

            /// Returns the last item.
            #[must_use]
            pub fn last(&self) -> Option<T> {
                self.seq.entries(true).next()
            }

            /// Returns `true` if some item equals `value`.
            pub fn contains(&self, value: &T) -> bool
            where
                T: PartialEq,
            {
                self.seq.iter().any(|candidate| candidate == *value)
            }

            /// Sorts the items. Evaluates eagerly.
            #[must_use]
            pub fn sort(&self) -> Self
            where
                T: Ord,
            {
                self.sort_by(Ord::cmp)
            }

            /// Sorts the items with `compare`. Evaluates eagerly; the sort is stable.
            #[must_use]
            pub fn sort_by<F>(&self, compare: F) -> Self
            where
                F: FnMut(&T, &T) -> std::cmp::Ordering,
            {
                Self::from_seq(self.seq.sorted_by(compare))
            }

            /// Sorts the items by the key `mapper` computes, once per item.
            #[must_use]
            pub fn sort_by_key<C, F>(&self, mapper: F) -> Self
            where
                C: Ord,
                F: FnMut(&T) -> C,
            {
                Self::from_seq(self.seq.sorted_by_key(mapper))
            }

            /// Returns the greatest item; the first one wins among equals.
            pub fn max(&self) -> Option<T>
            where
                T: Ord,
            {
                self.max_by(Ord::cmp)
            }

            /// Returns the least item; the first one wins among equals.
            pub fn min(&self) -> Option<T>
            where
                T: Ord,
            {
                self.min_by(Ord::cmp)
            }

            /// Returns the greatest item under `compare`.
            pub fn max_by<F>(&self, compare: F) -> Option<T>
            where
                F: FnMut(&T, &T) -> std::cmp::Ordering,
            {
                self.seq.extreme_by(compare, std::cmp::Ordering::Greater)
            }

            /// Returns the least item under `compare`.
            pub fn min_by<F>(&self, compare: F) -> Option<T>
            where
                F: FnMut(&T, &T) -> std::cmp::Ordering,
            {
                self.seq.extreme_by(compare, std::cmp::Ordering::Less)
            }

            /// Returns the item whose `mapper` key is greatest.
            pub fn max_by_key<C, F>(&self, mapper: F) -> Option<T>
            where
                C: Ord,
                F: Fn(&T) -> C,
            {
                self.max_by(|left, right| mapper(left).cmp(&mapper(right)))
            }

            /// Returns the item whose `mapper` key is least.
            pub fn min_by_key<C, F>(&self, mapper: F) -> Option<T>
            where
                C: Ord,
                F: Fn(&T) -> C,
            {
                self.min_by(|left, right| mapper(left).cmp(&mapper(right)))
            }

            /// Collects the items into a vector.
            #[must_use]
            pub fn to_vector(&self) -> $crate::persistent::PersistentVector<T> {
                self.seq.iter().collect()
            }

            /// Collects the items into a stack, first item on top.
            #[must_use]
            pub fn to_stack(&self) -> $crate::persistent::PersistentStack<T> {
                self.seq.iter().collect()
            }

            /// Collects the items into a set.
            #[must_use]
            pub fn to_set(&self) -> $crate::persistent::PersistentHashSet<T>
            where
                T: std::hash::Hash + Eq,
            {
                self.seq.iter().collect()
            }
        }

        impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for $flavor<T> {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.debug_list().entries(self.seq.iter()).finish()
            }
        }

        impl<T: Clone + std::fmt::Display + 'static> std::fmt::Display for $flavor<T> {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::sequence::write_items(formatter, <Self as $crate::sequence::Flavored>::FLAVOR, self.seq.iter())
            }
        }
    };
}

mod indexed;
mod keyed;
pub(crate) mod seq;
mod set;

pub use indexed::IndexedSeq;
pub use keyed::KeyedSeq;
pub use set::SetSeq;

/// Key semantics of a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// Keys are positions.
    Indexed,
    /// Keys survive every operator.
    Keyed,
    /// Each item is its own key.
    Set,
}

/// Associates each public sequence type with its flavor.
pub(crate) trait Flavored {
    const FLAVOR: Flavor;
}

impl Flavor {
    const fn brackets(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Indexed => ("Seq", "[", "]"),
            Self::Keyed => ("Seq", "{", "}"),
            Self::Set => ("Set", "{", "}"),
        }
    }
}

/// Writes `Seq [ 1, 2 ]`, `Seq { a: 1 }` or `Set { 1, 2 }`.
pub(crate) fn write_items<I>(formatter: &mut fmt::Formatter<'_>, flavor: Flavor, items: I) -> fmt::Result
where
    I: Iterator,
    I::Item: fmt::Display,
{
    let (name, open, close) = flavor.brackets();
    write!(formatter, "{name} {open}")?;
    for (position, item) in items.enumerate() {
        if position > 0 {
            write!(formatter, ",")?;
        }
        write!(formatter, " {item}")?;
    }
    write!(formatter, " {close}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Flavor::Indexed, ("Seq", "[", "]"))]
    #[case(Flavor::Keyed, ("Seq", "{", "}"))]
    #[case(Flavor::Set, ("Set", "{", "}"))]
    fn test_brackets(#[case] flavor: Flavor, #[case] expected: (&str, &str, &str)) {
        assert_eq!(flavor.brackets(), expected);
    }

    #[rstest]
    fn test_display_per_flavor() {
        let indexed: IndexedSeq<i32> = [1, 2].into_iter().collect();
        assert_eq!(indexed.to_string(), "Seq [ 1, 2 ]");
        let set: SetSeq<i32> = std::iter::once(7).collect();
        assert_eq!(set.to_string(), "Set { 7 }");
        let empty: IndexedSeq<i32> = IndexedSeq::default();
        assert_eq!(empty.to_string(), "Seq [ ]");
    }
}
