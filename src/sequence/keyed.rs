//! Keyed lazy sequences.
//!
//! A [`KeyedSeq`] carries `(key, value)` entries, and every operator keeps
//! each surviving entry's original key. Predicates and mappers receive the
//! key first, the way `HashMap::retain` does.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::ops::ControlFlow;

use super::seq::{Entries, Seq, Source};
use super::{Flavor, Flavored, IndexedSeq, SetSeq, write_items};
use crate::persistent::{
    PersistentHashMap, PersistentHashSet, PersistentOrderedMap, PersistentStack,
    PersistentVector, TransientHashMap,
};

/// A lazy sequence of `(key, value)` entries whose keys survive every operator.
///
/// # Examples
///
/// ```rust
/// use sharetrie::persistent::PersistentHashMap;
///
/// let map: PersistentHashMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3), ("d", 4)]
///     .into_iter()
///     .collect();
/// let grouped = map.to_seq().count_by(|_, value| value % 2);
/// assert_eq!(grouped.get(&1), Some(2));
/// assert_eq!(grouped.get(&0), Some(2));
/// ```
pub struct KeyedSeq<K, V> {
    seq: Seq<(K, V)>,
}

impl<K, V> Flavored for KeyedSeq<K, V> {
    const FLAVOR: Flavor = Flavor::Keyed;
}

structural_operators!(KeyedSeq<K, V>, (K, V));

impl<K: Clone + 'static, V: Clone + 'static> KeyedSeq<K, V> {
    pub(crate) const fn from_seq(seq: Seq<(K, V)>) -> Self {
        Self { seq }
    }

    /// Creates a sequence over the given entries.
    pub fn of<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        entries.into_iter().collect()
    }

    /// Visits entries until `visit` breaks.
    ///
    /// Returns the number of entries visited, including the one that
    /// stopped iteration.
    pub fn for_each<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(K, V) -> ControlFlow<()>,
    {
        self.seq.for_each(|(key, value)| visit(key, value))
    }

    /// Lazily transforms every value, keeping keys.
    #[must_use]
    pub fn map<U, F>(&self, mapper: F) -> KeyedSeq<K, U>
    where
        U: Clone + 'static,
        F: Fn(&K, &V) -> U + 'static,
    {
        KeyedSeq::from_seq(self.seq.map(move |(key, value)| {
            let mapped = mapper(&key, &value);
            (key, mapped)
        }))
    }

    /// Lazily transforms every key, keeping values.
    #[must_use]
    pub fn map_keys<J, F>(&self, mapper: F) -> KeyedSeq<J, V>
    where
        J: Clone + 'static,
        F: Fn(&K, &V) -> J + 'static,
    {
        KeyedSeq::from_seq(self.seq.map(move |(key, value)| (mapper(&key, &value), value)))
    }

    /// Lazily transforms whole entries.
    #[must_use]
    pub fn map_entries<J, U, F>(&self, mapper: F) -> KeyedSeq<J, U>
    where
        J: Clone + 'static,
        U: Clone + 'static,
        F: Fn(&K, &V) -> (J, U) + 'static,
    {
        KeyedSeq::from_seq(self.seq.map(move |(key, value)| mapper(&key, &value)))
    }

    /// Replaces every entry with the entries `mapper` returns for it.
    #[must_use]
    pub fn flat_map<J, U, I, F>(&self, mapper: F) -> KeyedSeq<J, U>
    where
        J: Clone + 'static,
        U: Clone + 'static,
        I: IntoIterator<Item = (J, U)>,
        F: Fn(&K, &V) -> I + 'static,
    {
        KeyedSeq::from_seq(
            self.seq
                .flat_map(move |(key, value)| mapper(&key, &value).into_iter().collect()),
        )
    }

    /// Replaces every entry with the entries of its value; outer keys are dropped.
    #[must_use]
    pub fn flatten<J, U>(&self) -> KeyedSeq<J, U>
    where
        V: IntoIterator<Item = (J, U)>,
        J: Clone + 'static,
        U: Clone + 'static,
    {
        KeyedSeq::from_seq(self.seq.flat_map(|(_, value)| value.into_iter().collect()))
    }

    /// Swaps keys and values.
    #[must_use]
    pub fn flip(&self) -> KeyedSeq<V, K> {
        KeyedSeq::from_seq(self.seq.map(|(key, value)| (value, key)))
    }

    /// Keeps the entries matching `predicate`. The size becomes unknown.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&K, &V) -> bool + 'static,
    {
        Self::from_seq(self.seq.filter(move |(key, value)| predicate(key, value)))
    }

    /// Drops the entries matching `predicate`.
    #[must_use]
    pub fn filter_not<F>(&self, predicate: F) -> Self
    where
        F: Fn(&K, &V) -> bool + 'static,
    {
        Self::from_seq(self.seq.filter(move |(key, value)| !predicate(key, value)))
    }

    /// Keeps entries while `predicate` holds.
    #[must_use]
    pub fn take_while<F>(&self, predicate: F) -> Self
    where
        F: Fn(&K, &V) -> bool + 'static,
    {
        Self::from_seq(self.seq.take_while(move |(key, value)| predicate(key, value)))
    }

    /// Drops entries while `predicate` holds.
    #[must_use]
    pub fn skip_while<F>(&self, predicate: F) -> Self
    where
        F: Fn(&K, &V) -> bool + 'static,
    {
        Self::from_seq(self.seq.skip_while(move |(key, value)| predicate(key, value)))
    }

    /// Keeps entries until `predicate` first holds.
    #[must_use]
    pub fn take_until<F>(&self, predicate: F) -> Self
    where
        F: Fn(&K, &V) -> bool + 'static,
    {
        Self::from_seq(self.seq.take_while(move |(key, value)| !predicate(key, value)))
    }

    /// Drops entries until `predicate` first holds.
    #[must_use]
    pub fn skip_until<F>(&self, predicate: F) -> Self
    where
        F: Fn(&K, &V) -> bool + 'static,
    {
        Self::from_seq(self.seq.skip_while(move |(key, value)| !predicate(key, value)))
    }

    /// Counts the entries matching `predicate`.
    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K, &V) -> bool,
    {
        self.seq
            .iter()
            .filter(|(key, value)| predicate(key, value))
            .count()
    }

    /// Groups entries by `grouper` and counts each group in one eager pass.
    pub fn count_by<G, F>(&self, grouper: F) -> KeyedSeq<G, usize>
    where
        G: Clone + Hash + Eq + 'static,
        F: Fn(&K, &V) -> G,
    {
        let mut counts = TransientHashMap::new();
        for (key, value) in self.seq.iter() {
            let group = grouper(&key, &value);
            let count = counts.get(&group).copied().unwrap_or(0);
            counts.insert(group, count + 1);
        }
        counts.as_immutable().to_seq()
    }

    /// Splits the entries into keyed sequences, one per group.
    ///
    /// Evaluates eagerly. Groups appear in order of their first entry, and
    /// every entry keeps its key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::sequence::KeyedSeq;
    ///
    /// let seq = KeyedSeq::of([("a", 1), ("b", 2), ("c", 3)]);
    /// let groups = seq.group_by(|_, value| value % 2 == 0);
    /// assert_eq!(groups.get(&false).unwrap().to_vec(), vec![("a", 1), ("c", 3)]);
    /// ```
    pub fn group_by<G, F>(&self, grouper: F) -> KeyedSeq<G, Self>
    where
        G: Clone + Hash + Eq + 'static,
        F: Fn(&K, &V) -> G,
    {
        self.seq
            .grouped_by(|(key, value)| grouper(key, value))
            .into_iter()
            .map(|(group, members)| (group, Self::from_seq(members)))
            .collect()
    }

    /// Folds the entries front to back.
    pub fn fold<A, F>(&self, initial: A, mut function: F) -> A
    where
        F: FnMut(A, K, V) -> A,
    {
        self.seq
            .iter()
            .fold(initial, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Folds the entries back to front.
    pub fn fold_right<A, F>(&self, initial: A, mut function: F) -> A
    where
        F: FnMut(A, K, V) -> A,
    {
        self.seq
            .entries(true)
            .fold(initial, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Folds the values using the first one as the initial value.
    pub fn reduce<F>(&self, function: F) -> Option<V>
    where
        F: FnMut(V, V) -> V,
    {
        self.seq.iter().map(|(_, value)| value).reduce(function)
    }

    /// Folds the values back to front, starting from the last one.
    pub fn reduce_right<F>(&self, function: F) -> Option<V>
    where
        F: FnMut(V, V) -> V,
    {
        self.seq.entries(true).map(|(_, value)| value).reduce(function)
    }

    /// Returns `true` if every entry matches `predicate`.
    pub fn every<F>(&self, predicate: F) -> bool
    where
        F: Fn(&K, &V) -> bool,
    {
        self.seq.iter().all(|(key, value)| predicate(&key, &value))
    }

    /// Returns `true` if any entry matches `predicate`.
    pub fn some<F>(&self, predicate: F) -> bool
    where
        F: Fn(&K, &V) -> bool,
    {
        self.seq.iter().any(|(key, value)| predicate(&key, &value))
    }

    /// Returns the value of the first entry matching `predicate`.
    pub fn find<F>(&self, predicate: F) -> Option<V>
    where
        F: Fn(&K, &V) -> bool,
    {
        self.find_entry(false, predicate).map(|(_, value)| value)
    }

    /// Returns the value of the last entry matching `predicate`.
    pub fn find_last<F>(&self, predicate: F) -> Option<V>
    where
        F: Fn(&K, &V) -> bool,
    {
        self.find_entry(true, predicate).map(|(_, value)| value)
    }

    /// Returns the key of the first entry matching `predicate`.
    pub fn find_key<F>(&self, predicate: F) -> Option<K>
    where
        F: Fn(&K, &V) -> bool,
    {
        self.find_entry(false, predicate).map(|(key, _)| key)
    }

    /// Returns the key of the last entry matching `predicate`.
    pub fn find_last_key<F>(&self, predicate: F) -> Option<K>
    where
        F: Fn(&K, &V) -> bool,
    {
        self.find_entry(true, predicate).map(|(key, _)| key)
    }

    fn find_entry<F>(&self, reverse: bool, predicate: F) -> Option<(K, V)>
    where
        F: Fn(&K, &V) -> bool,
    {
        self.seq
            .entries(reverse)
            .find(|(key, value)| predicate(key, value))
    }

    /// Returns the first value.
    #[must_use]
    pub fn first(&self) -> Option<V> {
        self.seq.iter().next().map(|(_, value)| value)
    }

    /// Returns the last value.
    #[must_use]
    pub fn last(&self) -> Option<V> {
        self.seq.entries(true).next().map(|(_, value)| value)
    }

    /// Sorts the entries by value. Evaluates eagerly; keys travel with their values.
    #[must_use]
    pub fn sort(&self) -> Self
    where
        V: Ord,
    {
        self.sort_by(Ord::cmp)
    }

    /// Sorts the entries by comparing values with `compare`. The sort is stable.
    #[must_use]
    pub fn sort_by<F>(&self, mut compare: F) -> Self
    where
        F: FnMut(&V, &V) -> Ordering,
    {
        Self::from_seq(self.seq.sorted_by(|(_, left), (_, right)| compare(left, right)))
    }

    /// Sorts the entries by the key `mapper` computes, once per entry.
    #[must_use]
    pub fn sort_by_key<C, F>(&self, mut mapper: F) -> Self
    where
        C: Ord,
        F: FnMut(&K, &V) -> C,
    {
        Self::from_seq(self.seq.sorted_by_key(|(key, value)| mapper(key, value)))
    }

    /// Returns the greatest value; the first one wins among equals.
    pub fn max(&self) -> Option<V>
    where
        V: Ord,
    {
        self.max_by(Ord::cmp)
    }

    /// Returns the least value; the first one wins among equals.
    pub fn min(&self) -> Option<V>
    where
        V: Ord,
    {
        self.min_by(Ord::cmp)
    }

    /// Returns the greatest value under `compare`.
    pub fn max_by<F>(&self, compare: F) -> Option<V>
    where
        F: FnMut(&V, &V) -> Ordering,
    {
        self.extreme_value(compare, Ordering::Greater)
    }

    /// Returns the least value under `compare`.
    pub fn min_by<F>(&self, compare: F) -> Option<V>
    where
        F: FnMut(&V, &V) -> Ordering,
    {
        self.extreme_value(compare, Ordering::Less)
    }

    fn extreme_value<F>(&self, mut compare: F, wanted: Ordering) -> Option<V>
    where
        F: FnMut(&V, &V) -> Ordering,
    {
        self.seq
            .extreme_by(|(_, left), (_, right)| compare(left, right), wanted)
            .map(|(_, value)| value)
    }

    /// Returns the value of the entry whose `mapper` key is greatest.
    pub fn max_by_key<C, F>(&self, mapper: F) -> Option<V>
    where
        C: Ord,
        F: Fn(&K, &V) -> C,
    {
        self.extreme_by_key(mapper, Ordering::Greater)
    }

    /// Returns the value of the entry whose `mapper` key is least.
    pub fn min_by_key<C, F>(&self, mapper: F) -> Option<V>
    where
        C: Ord,
        F: Fn(&K, &V) -> C,
    {
        self.extreme_by_key(mapper, Ordering::Less)
    }

    fn extreme_by_key<C, F>(&self, mapper: F, wanted: Ordering) -> Option<V>
    where
        C: Ord,
        F: Fn(&K, &V) -> C,
    {
        self.seq
            .extreme_by(
                |(left_key, left), (right_key, right)| {
                    mapper(left_key, left).cmp(&mapper(right_key, right))
                },
                wanted,
            )
            .map(|(_, value)| value)
    }

    /// Returns the value stored under `key`. Linear in the number of entries.
    pub fn get(&self, key: &K) -> Option<V>
    where
        K: PartialEq,
    {
        self.seq
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    /// Returns the value under `key`, or `default` when absent.
    pub fn get_or(&self, key: &K, default: V) -> V
    where
        K: PartialEq,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if some entry has `key`.
    pub fn contains_key(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        self.seq.iter().any(|(candidate, _)| candidate == *key)
    }

    /// Returns `true` if some entry has a value equal to `value`.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.seq.iter().any(|(_, candidate)| candidate == *value)
    }

    /// The keys as an indexed sequence.
    #[must_use]
    pub fn key_seq(&self) -> IndexedSeq<K> {
        IndexedSeq::from_seq(self.seq.map(|(key, _)| key))
    }

    /// The values as an indexed sequence.
    #[must_use]
    pub fn value_seq(&self) -> IndexedSeq<V> {
        IndexedSeq::from_seq(self.seq.map(|(_, value)| value))
    }

    /// The entries as an indexed sequence of pairs.
    #[must_use]
    pub fn entry_seq(&self) -> IndexedSeq<(K, V)> {
        IndexedSeq::from_seq(self.seq.clone())
    }

    /// Discards keys; the values become positions-keyed.
    #[must_use]
    pub fn to_indexed_seq(&self) -> IndexedSeq<V> {
        self.value_seq()
    }

    /// Discards keys and views the values as a set sequence.
    #[must_use]
    pub fn to_set_seq(&self) -> SetSeq<V> {
        SetSeq::from_seq(self.seq.map(|(_, value)| value))
    }

    /// Collects the values into a vector.
    #[must_use]
    pub fn to_vector(&self) -> PersistentVector<V> {
        self.seq.iter().map(|(_, value)| value).collect()
    }

    /// Collects the values into a stack, first value on top.
    #[must_use]
    pub fn to_stack(&self) -> PersistentStack<V> {
        self.seq.iter().map(|(_, value)| value).collect()
    }

    /// Collects the values into a set.
    #[must_use]
    pub fn to_set(&self) -> PersistentHashSet<V>
    where
        V: Hash + Eq,
    {
        self.seq.iter().map(|(_, value)| value).collect()
    }

    /// Collects the entries into a map; later entries win on duplicate keys.
    #[must_use]
    pub fn to_map(&self) -> PersistentHashMap<K, V>
    where
        K: Hash + Eq,
    {
        self.seq.iter().collect()
    }

    /// Collects the entries into an insertion-ordered map.
    #[must_use]
    pub fn to_ordered_map(&self) -> PersistentOrderedMap<K, V>
    where
        K: Hash + Eq,
    {
        self.seq.iter().collect()
    }
}

impl<T: Clone + PartialEq + 'static> PartialEq<IndexedSeq<T>> for KeyedSeq<usize, T> {
    fn eq(&self, other: &IndexedSeq<T>) -> bool {
        other == self
    }
}

impl<K, V> fmt::Debug for KeyedSeq<K, V>
where
    K: Clone + fmt::Debug + 'static,
    V: Clone + fmt::Debug + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.seq.iter()).finish()
    }
}

impl<K, V> fmt::Display for KeyedSeq<K, V>
where
    K: Clone + fmt::Display + 'static,
    V: Clone + fmt::Display + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.seq.iter().map(|(key, value)| format!("{key}: {value}"));
        write_items(formatter, Self::FLAVOR, entries)
    }
}

// =============================================================================
// Container Sources
// =============================================================================

struct HashMapSource<K, V>(PersistentHashMap<K, V>);

impl<K: Clone, V: Clone> Source<(K, V)> for HashMapSource<K, V> {
    fn size(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn entries(&self, reverse: bool) -> Entries<'_, (K, V)> {
        let entries = if reverse {
            self.0.iter_rev()
        } else {
            self.0.iter()
        };
        Box::new(entries.map(|(key, value)| (key.clone(), value.clone())))
    }
}

struct OrderedMapSource<K, V>(PersistentOrderedMap<K, V>);

impl<K: Clone, V: Clone> Source<(K, V)> for OrderedMapSource<K, V> {
    fn size(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn entries(&self, reverse: bool) -> Entries<'_, (K, V)> {
        let entries = self.0.iter().map(|(key, value)| (key.clone(), value.clone()));
        if reverse {
            Box::new(entries.rev())
        } else {
            Box::new(entries)
        }
    }
}

impl<K: Clone + 'static, V: Clone + 'static> PersistentHashMap<K, V> {
    /// Returns a lazy keyed view of the map.
    #[must_use]
    pub fn to_seq(&self) -> KeyedSeq<K, V> {
        KeyedSeq::from_seq(Seq::new(HashMapSource(self.clone())))
    }

    /// Returns the keys as a lazy indexed sequence.
    #[must_use]
    pub fn key_seq(&self) -> IndexedSeq<K> {
        self.to_seq().key_seq()
    }

    /// Returns the values as a lazy indexed sequence.
    #[must_use]
    pub fn value_seq(&self) -> IndexedSeq<V> {
        self.to_seq().value_seq()
    }

    /// Returns the entries as a lazy indexed sequence of pairs.
    #[must_use]
    pub fn entry_seq(&self) -> IndexedSeq<(K, V)> {
        self.to_seq().entry_seq()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> PersistentOrderedMap<K, V> {
    /// Returns a lazy keyed view of the map in insertion order.
    #[must_use]
    pub fn to_seq(&self) -> KeyedSeq<K, V> {
        KeyedSeq::from_seq(Seq::new(OrderedMapSource(self.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn hundred() -> KeyedSeq<usize, usize> {
        IndexedSeq::of(0..100).to_keyed_seq()
    }

    #[rstest]
    fn test_filter_skip_take_keeps_keys() {
        let seq = hundred().filter(|_, value| value % 2 == 0).skip(10).take(5);
        assert_eq!(
            seq.to_vec(),
            vec![(20, 20), (22, 22), (24, 24), (26, 26), (28, 28)]
        );
    }

    #[rstest]
    fn test_reverse_keeps_keys() {
        assert_eq!(
            hundred().reverse().take(3).to_vec(),
            vec![(99, 99), (98, 98), (97, 97)]
        );
    }

    #[rstest]
    fn test_freezing_after_reverse() {
        let seq = IndexedSeq::of(0..100)
            .reverse()
            .to_keyed_seq()
            .skip(10)
            .take(5)
            .reverse();
        assert_eq!(
            seq.to_vec(),
            vec![(14, 85), (13, 86), (12, 87), (11, 88), (10, 89)]
        );
    }

    #[rstest]
    fn test_count_by_over_map() {
        let map: PersistentHashMap<&str, i32> =
            [("a", 1), ("b", 2), ("c", 3), ("d", 4)].into_iter().collect();
        let grouped = map.to_seq().count_by(|_, value| value % 2);
        assert_eq!(grouped.count(), 2);
        assert_eq!(grouped.get(&1), Some(2));
        assert_eq!(grouped.get(&0), Some(2));
    }

    #[rstest]
    fn test_map_keys_flip_and_lookups() {
        let seq = KeyedSeq::of([("a", 1), ("b", 2)]);
        let flipped = seq.flip();
        assert_eq!(flipped.get(&2), Some("b"));
        let shouted = seq.map_keys(|key, _| key.to_uppercase());
        assert_eq!(shouted.key_seq().to_vec(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(seq.find_key(|_, value| *value > 1), Some("b"));
        assert!(seq.contains_key(&"a"));
        assert!(!seq.contains(&3));
    }

    #[rstest]
    fn test_ordered_map_view() {
        let map = PersistentOrderedMap::new().insert("z", 1).insert("a", 2);
        let seq = map.to_seq();
        assert_eq!(seq.to_vec(), vec![("z", 1), ("a", 2)]);
        assert_eq!(seq.reverse().to_vec(), vec![("a", 2), ("z", 1)]);
    }

    #[rstest]
    fn test_to_map_round_trip() {
        let map: PersistentHashMap<i32, i32> = (0..50).map(|key| (key, key * key)).collect();
        assert_eq!(map.to_seq().to_map(), map);
    }

    #[rstest]
    fn test_group_by_keeps_keys_in_each_group() {
        let groups = hundred().take(6).group_by(|key, _| key % 3 == 0);
        assert_eq!(groups.key_seq().to_vec(), vec![true, false]);
        let multiples = groups.get(&true).unwrap();
        assert_eq!(multiples.flavor(), Flavor::Keyed);
        assert_eq!(multiples.to_vec(), vec![(0, 0), (3, 3)]);
        assert_eq!(
            groups.get(&false).unwrap().key_seq().to_vec(),
            vec![1, 2, 4, 5]
        );
    }

    #[rstest]
    fn test_flat_map_and_flatten_entries() {
        let seq = KeyedSeq::of([("a", 2), ("b", 1)]);
        let expanded = seq.flat_map(|key, count| {
            let key = *key;
            (0..*count).map(move |slot| (format!("{key}{slot}"), slot))
        });
        assert_eq!(
            expanded.to_vec(),
            vec![("a0".to_string(), 0), ("a1".to_string(), 1), ("b0".to_string(), 0)]
        );
        assert_eq!(expanded.reverse().key_seq().first(), Some("b0".to_string()));

        let nested = KeyedSeq::of([("outer", vec![("x", 1), ("y", 2)]), ("empty", vec![])]);
        assert_eq!(nested.flatten().to_vec(), vec![("x", 1), ("y", 2)]);
    }

    #[rstest]
    fn test_sort_keeps_keys_with_values() {
        let seq = KeyedSeq::of([("c", 3), ("a", 1), ("b", 2)]);
        assert_eq!(seq.sort().to_vec(), vec![("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(
            seq.sort_by(|left, right| right.cmp(left)).key_seq().to_vec(),
            vec!["c", "b", "a"]
        );
        assert_eq!(
            seq.sort_by_key(|key, _| *key).value_seq().to_vec(),
            vec![1, 2, 3]
        );
    }

    #[rstest]
    fn test_extremes_and_right_folds() {
        let seq = KeyedSeq::of([("a", 3), ("bb", 1), ("c", 3), ("ddd", 0)]);
        assert_eq!(seq.max(), Some(3));
        assert_eq!(seq.min(), Some(0));
        assert_eq!(seq.max_by_key(|key, _| key.len()), Some(0));
        assert_eq!(seq.min_by_key(|key, value| (key.len(), *value)), Some(3));
        assert_eq!(seq.max_by(|left, right| right.cmp(left)), Some(0));
        assert_eq!(
            seq.fold_right(String::new(), |joined, key, _| joined + key),
            "dddcbba"
        );
        assert_eq!(seq.reduce_right(|total, value| total * 10 + value), Some(313));
    }

    #[rstest]
    fn test_display() {
        let seq = KeyedSeq::of([("a", 1)]);
        assert_eq!(seq.to_string(), "Seq { a: 1 }");
    }
}
