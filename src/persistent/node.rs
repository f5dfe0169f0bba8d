//! Bitmap-indexed trie node shared by the hash trie and the index trie.
//!
//! A node addresses up to [`BRANCHING_FACTOR`] slots. Only occupied slots are
//! stored: bit `i` of the bitmap is set iff slot `i` is present, and its child
//! lives at position `popcount(bitmap & ((1 << i) - 1))` of the dense array.

use std::iter::Zip;
use std::slice;

use super::owner::Owner;

// =============================================================================
// Constants
// =============================================================================

/// Bits of hash or index consumed per trie level.
pub(crate) const BITS_PER_LEVEL: u32 = 5;

/// Slots per node (2^5 = 32).
pub(crate) const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Mask selecting one level's slot.
pub(crate) const MASK: usize = BRANCHING_FACTOR - 1;

/// Slot addressed by `value` at the level consuming bits from `shift` upward.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn slot_at(value: usize, shift: u32) -> u32 {
    ((value >> shift) & MASK) as u32
}

// =============================================================================
// BitmapNode
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct BitmapNode<C> {
    pub(crate) owner: Option<Owner>,
    bitmap: u32,
    children: Vec<C>,
}

impl<C> BitmapNode<C> {
    pub(crate) const fn empty(owner: Option<Owner>) -> Self {
        Self {
            owner,
            bitmap: 0,
            children: Vec::new(),
        }
    }

    pub(crate) fn single(owner: Option<Owner>, slot: u32, child: C) -> Self {
        Self {
            owner,
            bitmap: bit(slot),
            children: vec![child],
        }
    }

    /// Node holding two children at distinct slots.
    pub(crate) fn pair(owner: Option<Owner>, first: (u32, C), second: (u32, C)) -> Self {
        debug_assert_ne!(first.0, second.0);
        let bitmap = bit(first.0) | bit(second.0);
        let children = if first.0 < second.0 {
            vec![first.1, second.1]
        } else {
            vec![second.1, first.1]
        };
        Self {
            owner,
            bitmap,
            children,
        }
    }

    /// Node whose slots `0..children.len()` are all occupied.
    pub(crate) fn dense(owner: Option<Owner>, children: Vec<C>) -> Self {
        debug_assert!(children.len() <= BRANCHING_FACTOR);
        let bitmap = match children.len() {
            BRANCHING_FACTOR => u32::MAX,
            length => (1u32 << length) - 1,
        };
        Self {
            owner,
            bitmap,
            children,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.bitmap == 0
    }

    #[inline]
    pub(crate) const fn bitmap(&self) -> u32 {
        self.bitmap
    }

    #[inline]
    pub(crate) fn children(&self) -> &[C] {
        &self.children
    }

    #[inline]
    const fn position(&self, slot: u32) -> usize {
        (self.bitmap & (bit(slot) - 1)).count_ones() as usize
    }

    #[inline]
    pub(crate) const fn contains(&self, slot: u32) -> bool {
        self.bitmap & bit(slot) != 0
    }

    pub(crate) fn get(&self, slot: u32) -> Option<&C> {
        if self.contains(slot) {
            self.children.get(self.position(slot))
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, slot: u32) -> Option<&mut C> {
        if self.contains(slot) {
            let position = self.position(slot);
            self.children.get_mut(position)
        } else {
            None
        }
    }

    /// Places `child` at `slot`, returning whatever occupied it before.
    pub(crate) fn insert(&mut self, slot: u32, child: C) -> Option<C> {
        let position = self.position(slot);
        if self.contains(slot) {
            Some(std::mem::replace(&mut self.children[position], child))
        } else {
            self.bitmap |= bit(slot);
            self.children.insert(position, child);
            None
        }
    }

    pub(crate) fn remove(&mut self, slot: u32) -> Option<C> {
        if self.contains(slot) {
            let position = self.position(slot);
            self.bitmap &= !bit(slot);
            Some(self.children.remove(position))
        } else {
            None
        }
    }

    pub(crate) fn get_or_insert_with(&mut self, slot: u32, create: impl FnOnce() -> C) -> &mut C {
        let position = self.position(slot);
        if !self.contains(slot) {
            self.bitmap |= bit(slot);
            self.children.insert(position, create());
        }
        &mut self.children[position]
    }

    /// Removes the only child, if there is exactly one.
    pub(crate) fn take_only(&mut self) -> Option<(u32, C)> {
        if self.children.len() == 1 {
            let slot = self.bitmap.trailing_zeros();
            self.bitmap = 0;
            self.children.pop().map(|child| (slot, child))
        } else {
            None
        }
    }

    /// Drops every slot after `slot`.
    pub(crate) fn truncate_after(&mut self, slot: u32) {
        let keep = if slot as usize >= MASK {
            u32::MAX
        } else {
            (bit(slot) << 1) - 1
        };
        self.bitmap &= keep;
        self.children.truncate(self.bitmap.count_ones() as usize);
    }

    /// Drops every slot before `slot`.
    pub(crate) fn clear_before(&mut self, slot: u32) {
        let dropped = (self.bitmap & (bit(slot) - 1)).count_ones() as usize;
        self.bitmap &= !(bit(slot) - 1);
        self.children.drain(..dropped);
    }

    /// Occupied slots with their children, in slot order from either end.
    pub(crate) fn iter(&self) -> Zip<Slots, slice::Iter<'_, C>> {
        Slots(self.bitmap).zip(self.children.iter())
    }
}

#[inline]
const fn bit(slot: u32) -> u32 {
    1u32 << slot
}

// =============================================================================
// Slots
// =============================================================================

/// Iterator over the set bits of a bitmap, lowest first.
#[derive(Clone, Debug)]
pub(crate) struct Slots(u32);

impl Iterator for Slots {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            let slot = self.0.trailing_zeros();
            self.0 &= self.0 - 1;
            Some(slot)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.0.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Slots {
    fn next_back(&mut self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            let slot = 31 - self.0.leading_zeros();
            self.0 &= !bit(slot);
            Some(slot)
        }
    }
}

impl ExactSizeIterator for Slots {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn node_with(slots: &[u32]) -> BitmapNode<u32> {
        let mut node = BitmapNode::empty(None);
        for &slot in slots {
            node.insert(slot, slot * 10);
        }
        node
    }

    fn assert_popcount_invariant<C>(node: &BitmapNode<C>) {
        assert_eq!(node.bitmap().count_ones() as usize, node.len());
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(5, 0, 5)]
    #[case(37, 0, 5)]
    #[case(37, 5, 1)]
    #[case(1024, 10, 1)]
    #[case(usize::MAX, 30, 31)]
    fn test_slot_at(#[case] value: usize, #[case] shift: u32, #[case] expected: u32) {
        assert_eq!(slot_at(value, shift), expected);
    }

    #[rstest]
    fn test_insert_keeps_slot_order() {
        let node = node_with(&[7, 2, 31, 0]);
        assert_popcount_invariant(&node);
        let slots: Vec<u32> = node.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![0, 2, 7, 31]);
        assert_eq!(node.get(7), Some(&70));
        assert_eq!(node.get(3), None);
    }

    #[rstest]
    fn test_insert_replaces_existing() {
        let mut node = node_with(&[4]);
        assert_eq!(node.insert(4, 99), Some(40));
        assert_eq!(node.get(4), Some(&99));
        assert_popcount_invariant(&node);
    }

    #[rstest]
    fn test_remove() {
        let mut node = node_with(&[1, 3, 5]);
        assert_eq!(node.remove(3), Some(30));
        assert_eq!(node.remove(3), None);
        assert_popcount_invariant(&node);
        assert_eq!(node.len(), 2);
    }

    #[rstest]
    fn test_take_only() {
        let mut node = node_with(&[9]);
        assert_eq!(node.take_only(), Some((9, 90)));
        assert!(node.is_empty());
        let mut crowded = node_with(&[1, 2]);
        assert_eq!(crowded.take_only(), None);
    }

    #[rstest]
    fn test_truncate_after() {
        let mut node = node_with(&[0, 4, 8, 31]);
        node.truncate_after(4);
        assert_popcount_invariant(&node);
        let slots: Vec<u32> = node.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![0, 4]);

        let mut full = node_with(&[0, 31]);
        full.truncate_after(31);
        assert_eq!(full.len(), 2);
    }

    #[rstest]
    fn test_clear_before() {
        let mut node = node_with(&[0, 4, 8, 31]);
        node.clear_before(5);
        assert_popcount_invariant(&node);
        let children: Vec<u32> = node.iter().map(|(_, child)| *child).collect();
        assert_eq!(children, vec![80, 310]);
    }

    #[rstest]
    fn test_iter_from_back() {
        let node = node_with(&[3, 17, 30]);
        let slots: Vec<u32> = node.iter().rev().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![30, 17, 3]);
    }

    #[rstest]
    fn test_dense() {
        let node = BitmapNode::dense(None, (0..32).collect::<Vec<u32>>());
        assert_eq!(node.bitmap(), u32::MAX);
        assert_eq!(node.get(31), Some(&31));
        let short = BitmapNode::dense(None, vec![1, 2, 3]);
        assert_eq!(short.bitmap(), 0b111);
    }

    #[rstest]
    fn test_get_or_insert_with() {
        let mut node = node_with(&[2]);
        *node.get_or_insert_with(6, || 0) += 1;
        *node.get_or_insert_with(2, || 0) += 1;
        assert_eq!(node.get(6), Some(&1));
        assert_eq!(node.get(2), Some(&21));
        assert_popcount_invariant(&node);
    }
}
