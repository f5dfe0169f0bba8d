//! Flavor-agnostic lazy sequence engine.
//!
//! A [`Seq`] is a shared descriptor over a [`Source`]: something that can
//! produce its items front to back, and usually back to front. Operators
//! wrap the upstream descriptor in a new source and never touch the old one,
//! so composing an operator is O(1) and nothing runs until iteration.
//!
//! Reversal asks the source for backward iteration. Sources that cannot
//! iterate backward (for example `take_while`, or `take` over a sequence of
//! unknown size) are materialized once into the descriptor's cache, which is
//! then walked from the back.

use std::cell::{Cell, OnceCell};
use std::cmp::Ordering;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::rc::Rc;

use crate::persistent::{TransientHashMap, resolve_index};

/// Boxed pull iterator over the items of a source.
pub(crate) type Entries<'a, E> = Box<dyn Iterator<Item = E> + 'a>;

/// A producer of sequence items.
pub(crate) trait Source<E> {
    /// Exact number of items, when known without iterating.
    fn size(&self) -> Option<usize>;

    /// Whether `entries(true)` can run without materializing this source.
    fn reversible(&self) -> bool {
        true
    }

    /// Iterates the items, from the back when `reverse` is set.
    fn entries(&self, reverse: bool) -> Entries<'_, E>;
}

struct Inner<E> {
    source: Box<dyn Source<E>>,
    size: Cell<Option<usize>>,
    cache: OnceCell<Rc<[E]>>,
}

/// Shared lazy sequence descriptor.
pub(crate) struct Seq<E> {
    inner: Rc<Inner<E>>,
}

impl<E> Clone for Seq<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Clone + 'static> Seq<E> {
    pub(crate) fn new(source: impl Source<E> + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                source: Box::new(source),
                size: Cell::new(None),
                cache: OnceCell::new(),
            }),
        }
    }

    pub(crate) fn from_vec(items: Vec<E>) -> Self {
        Self::new(Materialized(items.into()))
    }

    pub(crate) fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn size(&self) -> Option<usize> {
        self.inner.size.get().or_else(|| self.inner.source.size())
    }

    fn materialize(&self) -> &Rc<[E]> {
        self.inner.cache.get_or_init(|| {
            let items: Rc<[E]> = self.inner.source.entries(false).collect();
            self.inner.size.set(Some(items.len()));
            tracing::trace!(size = items.len(), "materialized sequence");
            items
        })
    }

    pub(crate) fn entries(&self, reverse: bool) -> Entries<'_, E> {
        if let Some(items) = self.inner.cache.get() {
            return iterate_slice(items, reverse);
        }
        if reverse && !self.inner.source.reversible() {
            tracing::trace!("materializing forward-only sequence to reverse it");
            return iterate_slice(self.materialize(), true);
        }
        self.inner.source.entries(reverse)
    }

    pub(crate) fn iter(&self) -> Entries<'_, E> {
        self.entries(false)
    }

    pub(crate) fn to_vec(&self) -> Vec<E> {
        self.iter().collect()
    }

    /// Materializes once and pins the size; later passes read the cache.
    pub(crate) fn cache_result(&self) -> Self {
        self.materialize();
        self.clone()
    }

    /// Returns the size, running and memoizing one full pass when unknown.
    pub(crate) fn count(&self) -> usize {
        if let Some(size) = self.size() {
            return size;
        }
        let size = self.iter().count();
        self.inner.size.set(Some(size));
        tracing::trace!(size, "memoized sequence size");
        size
    }

    /// Visits items until `visit` breaks; returns how many were visited,
    /// counting the one that stopped iteration.
    pub(crate) fn for_each(&self, mut visit: impl FnMut(E) -> ControlFlow<()>) -> usize {
        let mut visited = 0;
        for item in self.iter() {
            visited += 1;
            if visit(item).is_break() {
                break;
            }
        }
        visited
    }

    pub(crate) fn map<F: Clone + 'static>(&self, mapper: impl Fn(E) -> F + 'static) -> Seq<F> {
        Seq::new(Mapped {
            upstream: self.clone(),
            mapper: Box::new(mapper),
        })
    }

    pub(crate) fn filter(&self, predicate: impl Fn(&E) -> bool + 'static) -> Self {
        Self::new(Filtered {
            upstream: self.clone(),
            predicate: Box::new(predicate),
        })
    }

    pub(crate) fn reverse(&self) -> Self {
        Self::new(Reversed {
            upstream: self.clone(),
        })
    }

    pub(crate) fn take(&self, count: usize) -> Self {
        if self.size().is_some_and(|size| size <= count) {
            return self.clone();
        }
        Self::new(Taken {
            upstream: self.clone(),
            count,
        })
    }

    pub(crate) fn skip(&self, count: usize) -> Self {
        if count == 0 {
            return self.clone();
        }
        Self::new(Skipped {
            upstream: self.clone(),
            count,
        })
    }

    pub(crate) fn take_while(&self, predicate: impl Fn(&E) -> bool + 'static) -> Self {
        Self::new(Guarded {
            upstream: self.clone(),
            predicate: Box::new(predicate),
            taking: true,
        })
    }

    pub(crate) fn skip_while(&self, predicate: impl Fn(&E) -> bool + 'static) -> Self {
        Self::new(Guarded {
            upstream: self.clone(),
            predicate: Box::new(predicate),
            taking: false,
        })
    }

    /// Items in `begin..end`; negative bounds count back from the end, which
    /// requires the size and may run one counting pass.
    pub(crate) fn slice(&self, begin: isize, end: Option<isize>) -> Self {
        if begin == 0 && end.is_none() {
            return self.clone();
        }
        let (begin, end) = if begin < 0 || end.is_some_and(|end| end < 0) {
            let size = self.count();
            (
                resolve_index(begin, size),
                end.map(|end| resolve_index(end, size)),
            )
        } else {
            (begin.unsigned_abs(), end.map(isize::unsigned_abs))
        };
        let skipped = self.skip(begin);
        match end {
            None => skipped,
            Some(end) => skipped.take(end.saturating_sub(begin)),
        }
    }

    pub(crate) fn concat(&self, others: &[Self]) -> Self {
        if others.is_empty() {
            return self.clone();
        }
        let mut parts = Vec::with_capacity(others.len() + 1);
        parts.push(self.clone());
        parts.extend(others.iter().cloned());
        Self::new(Concatenated { parts })
    }

    pub(crate) fn flat_map<F: Clone + 'static>(
        &self,
        mapper: impl Fn(E) -> Vec<F> + 'static,
    ) -> Seq<F> {
        Seq::new(FlatMapped {
            upstream: self.clone(),
            mapper: Box::new(mapper),
        })
    }

    pub(crate) fn interpose(&self, separator: E) -> Self {
        Self::new(Interposed {
            upstream: self.clone(),
            separator,
        })
    }

    /// Freezes the current positions into keys.
    pub(crate) fn enumerate(&self) -> Seq<(usize, E)> {
        Seq::new(Enumerated {
            upstream: self.clone(),
        })
    }

    /// Stable eager sort.
    pub(crate) fn sorted_by(&self, compare: impl FnMut(&E, &E) -> Ordering) -> Self {
        let mut items = self.to_vec();
        items.sort_by(compare);
        Self::from_vec(items)
    }

    /// Stable eager sort that computes each item's key once.
    pub(crate) fn sorted_by_key<C: Ord>(&self, key: impl FnMut(&E) -> C) -> Self {
        let mut items = self.to_vec();
        items.sort_by_cached_key(key);
        Self::from_vec(items)
    }

    /// The item `compare` ranks as `wanted` against every other; the first
    /// one wins among equals.
    pub(crate) fn extreme_by(
        &self,
        mut compare: impl FnMut(&E, &E) -> Ordering,
        wanted: Ordering,
    ) -> Option<E> {
        self.iter()
            .reduce(|best, item| if compare(&item, &best) == wanted { item } else { best })
    }

    /// Splits the items into groups in one eager pass.
    ///
    /// Groups are listed in order of first appearance and keep the relative
    /// order of their items.
    pub(crate) fn grouped_by<G>(&self, grouper: impl Fn(&E) -> G) -> Vec<(G, Self)>
    where
        G: Clone + Hash + Eq,
    {
        let mut slots: TransientHashMap<G, usize> = TransientHashMap::new();
        let mut groups: Vec<(G, Vec<E>)> = Vec::new();
        for item in self.iter() {
            let group = grouper(&item);
            if let Some((_, members)) = slots.get(&group).and_then(|&slot| groups.get_mut(slot)) {
                members.push(item);
            } else {
                slots.insert(group.clone(), groups.len());
                groups.push((group, vec![item]));
            }
        }
        tracing::trace!(groups = groups.len(), "grouped sequence");
        groups
            .into_iter()
            .map(|(group, members)| (group, Self::from_vec(members)))
            .collect()
    }

    pub(crate) fn equals(&self, other: &Self) -> bool
    where
        E: PartialEq,
    {
        if self.ptr_eq(other) {
            return true;
        }
        if let (Some(left), Some(right)) = (self.size(), other.size())
            && left != right
        {
            return false;
        }
        self.iter().eq(other.iter())
    }
}

fn iterate_slice<E: Clone>(items: &[E], reverse: bool) -> Entries<'_, E> {
    if reverse {
        Box::new(items.iter().rev().cloned())
    } else {
        Box::new(items.iter().cloned())
    }
}

// =============================================================================
// Sources
// =============================================================================

struct Materialized<E>(Rc<[E]>);

impl<E: Clone> Source<E> for Materialized<E> {
    fn size(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn entries(&self, reverse: bool) -> Entries<'_, E> {
        iterate_slice(&self.0, reverse)
    }
}

struct Mapped<E, F> {
    upstream: Seq<E>,
    mapper: Box<dyn Fn(E) -> F>,
}

impl<E: Clone + 'static, F> Source<F> for Mapped<E, F> {
    fn size(&self) -> Option<usize> {
        self.upstream.size()
    }

    fn entries(&self, reverse: bool) -> Entries<'_, F> {
        Box::new(self.upstream.entries(reverse).map(&self.mapper))
    }
}

struct Filtered<E> {
    upstream: Seq<E>,
    predicate: Box<dyn Fn(&E) -> bool>,
}

impl<E: Clone + 'static> Source<E> for Filtered<E> {
    fn size(&self) -> Option<usize> {
        None
    }

    fn entries(&self, reverse: bool) -> Entries<'_, E> {
        Box::new(self.upstream.entries(reverse).filter(|item| (self.predicate)(item)))
    }
}

struct Reversed<E> {
    upstream: Seq<E>,
}

impl<E: Clone + 'static> Source<E> for Reversed<E> {
    fn size(&self) -> Option<usize> {
        self.upstream.size()
    }

    fn entries(&self, reverse: bool) -> Entries<'_, E> {
        self.upstream.entries(!reverse)
    }
}

struct Taken<E> {
    upstream: Seq<E>,
    count: usize,
}

impl<E: Clone + 'static> Source<E> for Taken<E> {
    fn size(&self) -> Option<usize> {
        self.upstream.size().map(|size| size.min(self.count))
    }

    fn reversible(&self) -> bool {
        self.upstream.size().is_some()
    }

    fn entries(&self, reverse: bool) -> Entries<'_, E> {
        if reverse {
            let size = self.upstream.count();
            Box::new(self.upstream.entries(true).skip(size.saturating_sub(self.count)))
        } else {
            Box::new(self.upstream.entries(false).take(self.count))
        }
    }
}

struct Skipped<E> {
    upstream: Seq<E>,
    count: usize,
}

impl<E: Clone + 'static> Source<E> for Skipped<E> {
    fn size(&self) -> Option<usize> {
        self.upstream.size().map(|size| size.saturating_sub(self.count))
    }

    fn reversible(&self) -> bool {
        self.upstream.size().is_some()
    }

    fn entries(&self, reverse: bool) -> Entries<'_, E> {
        if reverse {
            let size = self.upstream.count();
            Box::new(self.upstream.entries(true).take(size.saturating_sub(self.count)))
        } else {
            Box::new(self.upstream.entries(false).skip(self.count))
        }
    }
}

/// `take_while` (`taking`) or `skip_while`; forward only.
struct Guarded<E> {
    upstream: Seq<E>,
    predicate: Box<dyn Fn(&E) -> bool>,
    taking: bool,
}

impl<E: Clone + 'static> Source<E> for Guarded<E> {
    fn size(&self) -> Option<usize> {
        None
    }

    fn reversible(&self) -> bool {
        false
    }

    fn entries(&self, _reverse: bool) -> Entries<'_, E> {
        let upstream = self.upstream.entries(false);
        if self.taking {
            Box::new(upstream.take_while(|item| (self.predicate)(item)))
        } else {
            Box::new(upstream.skip_while(|item| (self.predicate)(item)))
        }
    }
}

struct Concatenated<E> {
    parts: Vec<Seq<E>>,
}

impl<E: Clone + 'static> Source<E> for Concatenated<E> {
    fn size(&self) -> Option<usize> {
        self.parts.iter().map(Seq::size).sum()
    }

    fn entries(&self, reverse: bool) -> Entries<'_, E> {
        if reverse {
            Box::new(self.parts.iter().rev().flat_map(|part| part.entries(true)))
        } else {
            Box::new(self.parts.iter().flat_map(|part| part.entries(false)))
        }
    }
}

struct FlatMapped<E, F> {
    upstream: Seq<E>,
    mapper: Box<dyn Fn(E) -> Vec<F>>,
}

impl<E: Clone + 'static, F> Source<F> for FlatMapped<E, F> {
    fn size(&self) -> Option<usize> {
        None
    }

    fn entries(&self, reverse: bool) -> Entries<'_, F> {
        Box::new(self.upstream.entries(reverse).flat_map(move |item| {
            let mut expanded = (self.mapper)(item);
            if reverse {
                expanded.reverse();
            }
            expanded
        }))
    }
}

struct Interposed<E> {
    upstream: Seq<E>,
    separator: E,
}

impl<E: Clone + 'static> Source<E> for Interposed<E> {
    fn size(&self) -> Option<usize> {
        self.upstream
            .size()
            .map(|size| (size * 2).saturating_sub(1))
    }

    fn entries(&self, reverse: bool) -> Entries<'_, E> {
        Box::new(
            self.upstream
                .entries(reverse)
                .enumerate()
                .flat_map(|(position, item)| {
                    let separator = (position > 0).then(|| self.separator.clone());
                    separator.into_iter().chain(std::iter::once(item))
                }),
        )
    }
}

struct Enumerated<E> {
    upstream: Seq<E>,
}

impl<E: Clone + 'static> Source<(usize, E)> for Enumerated<E> {
    fn size(&self) -> Option<usize> {
        self.upstream.size()
    }

    fn entries(&self, reverse: bool) -> Entries<'_, (usize, E)> {
        if reverse {
            let last = self.upstream.count().saturating_sub(1);
            Box::new(
                self.upstream
                    .entries(true)
                    .enumerate()
                    .map(move |(offset, item)| (last - offset, item)),
            )
        } else {
            Box::new(self.upstream.entries(false).enumerate())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::RefCell;

    /// Forward-only source that records how many passes it served.
    struct Counted {
        items: Vec<i32>,
        passes: Rc<Cell<usize>>,
    }

    impl Source<i32> for Counted {
        fn size(&self) -> Option<usize> {
            None
        }

        fn reversible(&self) -> bool {
            false
        }

        fn entries(&self, _reverse: bool) -> Entries<'_, i32> {
            self.passes.set(self.passes.get() + 1);
            Box::new(self.items.iter().copied())
        }
    }

    fn counted(items: Vec<i32>) -> (Seq<i32>, Rc<Cell<usize>>) {
        let passes = Rc::new(Cell::new(0));
        let seq = Seq::new(Counted {
            items,
            passes: Rc::clone(&passes),
        });
        (seq, passes)
    }

    #[rstest]
    fn test_operators_are_lazy() {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&visited);
        let seq = Seq::from_vec((0..10).collect()).map(move |item: i32| {
            log.borrow_mut().push(item);
            item * 2
        });
        assert!(visited.borrow().is_empty());
        assert_eq!(seq.take(2).to_vec(), vec![0, 2]);
        assert_eq!(*visited.borrow(), vec![0, 1]);
    }

    #[rstest]
    fn test_reverse_of_forward_only_materializes_once() {
        let (seq, passes) = counted(vec![1, 2, 3]);
        assert_eq!(seq.reverse().to_vec(), vec![3, 2, 1]);
        assert_eq!(seq.reverse().to_vec(), vec![3, 2, 1]);
        assert_eq!(passes.get(), 1);
        assert_eq!(seq.size(), Some(3));
    }

    #[rstest]
    fn test_cache_result_pins_size() {
        let (seq, passes) = counted(vec![1, 2, 3, 4]);
        let filtered = seq.filter(|item| item % 2 == 0);
        assert_eq!(filtered.size(), None);
        let cached = filtered.cache_result();
        assert_eq!(cached.size(), Some(2));
        assert_eq!(cached.to_vec(), vec![2, 4]);
        assert_eq!(cached.to_vec(), vec![2, 4]);
        assert_eq!(passes.get(), 1);
    }

    #[rstest]
    fn test_count_memoizes() {
        let seq = Seq::from_vec(vec![1, 2, 3, 4, 5, 6]).filter(|item| item % 2 == 0);
        assert_eq!(seq.size(), None);
        assert_eq!(seq.count(), 3);
        assert_eq!(seq.size(), Some(3));
    }

    #[rstest]
    fn test_for_each_counts_the_stopping_item() {
        let seq = Seq::from_vec(vec![1, 2, 3, 4]);
        let visited = seq.for_each(|item| {
            if item == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, 2);
        assert_eq!(seq.for_each(|_| ControlFlow::Continue(())), 4);
    }

    #[rstest]
    #[case(0, None, vec![0, 1, 2, 3, 4])]
    #[case(1, Some(3), vec![1, 2])]
    #[case(-2, None, vec![3, 4])]
    #[case(1, Some(-1), vec![1, 2, 3])]
    #[case(4, Some(2), vec![])]
    fn test_slice(#[case] begin: isize, #[case] end: Option<isize>, #[case] expected: Vec<i32>) {
        let seq = Seq::from_vec((0..5).collect());
        assert_eq!(seq.slice(begin, end).to_vec(), expected);
    }

    #[rstest]
    fn test_take_over_unknown_size_reverses_through_cache() {
        let seq = Seq::from_vec((0..10).collect()).filter(|item| item % 3 == 0);
        assert_eq!(seq.take(3).reverse().to_vec(), vec![6, 3, 0]);
    }

    #[rstest]
    fn test_interpose_both_directions() {
        let seq = Seq::from_vec(vec![1, 2, 3]).interpose(0);
        assert_eq!(seq.size(), Some(5));
        assert_eq!(seq.to_vec(), vec![1, 0, 2, 0, 3]);
        assert_eq!(seq.reverse().to_vec(), vec![3, 0, 2, 0, 1]);
    }

    #[rstest]
    fn test_enumerate_reverse_keeps_positions() {
        let seq = Seq::from_vec(vec!['a', 'b', 'c']).enumerate();
        assert_eq!(seq.reverse().to_vec(), vec![(2, 'c'), (1, 'b'), (0, 'a')]);
    }

    #[rstest]
    fn test_grouped_by_keeps_first_appearance_order() {
        let seq = Seq::from_vec(vec![5, 2, 8, 3, 4, 7]);
        let groups: Vec<(bool, Vec<i32>)> = seq
            .grouped_by(|item| item % 2 == 0)
            .into_iter()
            .map(|(group, members)| (group, members.to_vec()))
            .collect();
        assert_eq!(groups, vec![(false, vec![5, 3, 7]), (true, vec![2, 8, 4])]);
    }

    #[rstest]
    fn test_extreme_by_prefers_first_among_equals() {
        let seq = Seq::from_vec(vec![(1, 'a'), (3, 'b'), (3, 'c'), (0, 'd')]);
        let by_rank = |left: &(i32, char), right: &(i32, char)| left.0.cmp(&right.0);
        assert_eq!(seq.extreme_by(by_rank, Ordering::Greater), Some((3, 'b')));
        assert_eq!(seq.extreme_by(by_rank, Ordering::Less), Some((0, 'd')));
        assert_eq!(Seq::<i32>::empty().extreme_by(Ord::cmp, Ordering::Less), None);
    }

    #[rstest]
    fn test_concat_reverse() {
        let left = Seq::from_vec(vec![1, 2]);
        let right = Seq::from_vec(vec![3]);
        let joined = left.concat(&[right]);
        assert_eq!(joined.size(), Some(3));
        assert_eq!(joined.reverse().to_vec(), vec![3, 2, 1]);
    }
}
