//! Persistent (immutable) vector based on a bitmap-indexed index trie.
//!
//! This module provides [`PersistentVector`], an immutable vector that uses
//! structural sharing, and [`TransientVector`], its batch-editing counterpart.
//!
//! # Overview
//!
//! Elements live in 32-way trie nodes addressed by 5-bit slices of their raw
//! index, plus a tail leaf holding the last (up to) 32 elements outside the
//! trie. The visible window is `origin..capacity` in raw index space:
//!
//! - pushing and popping at the back work on the tail, touching the trie only
//!   when a full tail is folded in or an empty one is refilled
//! - removing from the front advances `origin` and trims the left edge; the
//!   root is replaced by its only covering child once the window fits in it
//! - adding to the front grows a new root above the old one, placing the old
//!   root in slot 1 so that fresh slots open up before it
//!
//! All of these go through one bounds routine, so every structural size change
//! shares a single implementation.
//!
//! # Examples
//!
//! ```rust
//! use sharetrie::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Some(&50));
//!
//! let updated = vector.set(50, 999);
//! assert_eq!(vector.get(50), Some(&50));
//! assert_eq!(updated.get(50), Some(&999));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::rc::Rc;

use super::ReferenceCounter;
use super::node::{BITS_PER_LEVEL, BRANCHING_FACTOR, BitmapNode, MASK, slot_at};
use super::owner::{Owner, Stamped, editable};

// =============================================================================
// Node Definition
// =============================================================================

type Link<T> = ReferenceCounter<VNode<T>>;

#[derive(Clone)]
enum VNode<T> {
    Branch(BitmapNode<Link<T>>),
    Leaf(BitmapNode<T>),
}

impl<T> VNode<T> {
    fn as_branch(&self) -> Option<&BitmapNode<Link<T>>> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Leaf(_) => None,
        }
    }

    fn as_leaf(&self) -> Option<&BitmapNode<T>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Branch(_) => None,
        }
    }

    const fn bitmap(&self) -> u32 {
        match self {
            Self::Branch(branch) => branch.bitmap(),
            Self::Leaf(leaf) => leaf.bitmap(),
        }
    }
}

impl<T: Clone> Stamped for VNode<T> {
    fn owner(&self) -> Option<&Owner> {
        match self {
            Self::Branch(branch) => branch.owner.as_ref(),
            Self::Leaf(leaf) => leaf.owner.as_ref(),
        }
    }

    fn set_owner(&mut self, owner: Option<Owner>) {
        match self {
            Self::Branch(branch) => branch.owner = owner,
            Self::Leaf(leaf) => leaf.owner = owner,
        }
    }
}

fn empty_branch<T>(owner: &Owner) -> Link<T> {
    ReferenceCounter::new(VNode::Branch(BitmapNode::empty(Some(owner.clone()))))
}

fn empty_leaf<T>(owner: &Owner) -> Link<T> {
    ReferenceCounter::new(VNode::Leaf(BitmapNode::empty(Some(owner.clone()))))
}

/// Raw index of the first element held by the tail of a trie of `capacity`.
#[inline]
const fn tail_offset(capacity: usize) -> usize {
    if capacity < BRANCHING_FACTOR {
        0
    } else {
        ((capacity - 1) >> BITS_PER_LEVEL) << BITS_PER_LEVEL
    }
}

/// Returns `true` if `raw` fits under a root at `level`.
#[inline]
fn covered(raw: usize, level: u32) -> bool {
    raw.checked_shr(level + BITS_PER_LEVEL).unwrap_or(0) == 0
}

/// Bitmap with every slot up to and including `slot` set.
#[inline]
const fn slots_through(slot: u32) -> u32 {
    if slot as usize >= MASK {
        u32::MAX
    } else {
        (1u32 << (slot + 1)) - 1
    }
}

// =============================================================================
// Trie editing
// =============================================================================

fn assoc_in<T: Clone>(link: &mut Link<T>, owner: &Owner, level: u32, raw: usize, value: T) {
    match editable(link, Some(owner)) {
        VNode::Leaf(leaf) => {
            leaf.insert(slot_at(raw, 0), value);
        }
        VNode::Branch(branch) => {
            let child = branch.get_or_insert_with(slot_at(raw, level), || {
                if level == BITS_PER_LEVEL {
                    empty_leaf(owner)
                } else {
                    empty_branch(owner)
                }
            });
            assoc_in(child, owner, level - BITS_PER_LEVEL, raw, value);
        }
    }
}

/// Hangs a full tail leaf into the trie at raw index `offset`.
fn graft_tail<T: Clone>(root: &mut Link<T>, owner: &Owner, level: u32, offset: usize, tail: Link<T>) {
    let mut link = root;
    let mut level = level;
    loop {
        let VNode::Branch(branch) = editable(link, Some(owner)) else {
            return;
        };
        let slot = slot_at(offset, level);
        if level == BITS_PER_LEVEL {
            branch.insert(slot, tail);
            return;
        }
        link = branch.get_or_insert_with(slot, || empty_branch(owner));
        level -= BITS_PER_LEVEL;
    }
}

fn trims_after<T>(node: &VNode<T>, level: u32, last: usize) -> bool {
    let slot = slot_at(last, level);
    if node.bitmap() & !slots_through(slot) != 0 {
        return true;
    }
    match node {
        VNode::Branch(branch) => branch
            .get(slot)
            .is_some_and(|child| trims_after(child, level - BITS_PER_LEVEL, last)),
        VNode::Leaf(_) => false,
    }
}

fn trims_before<T>(node: &VNode<T>, level: u32, first: usize) -> bool {
    let slot = slot_at(first, level);
    if node.bitmap() & ((1u32 << slot) - 1) != 0 {
        return true;
    }
    match node {
        VNode::Branch(branch) => branch
            .get(slot)
            .is_some_and(|child| trims_before(child, level - BITS_PER_LEVEL, first)),
        VNode::Leaf(_) => false,
    }
}

/// Drops every element after raw index `last` from the subtree at `level`.
fn remove_after<T: Clone>(link: &mut Link<T>, owner: &Owner, level: u32, last: usize) {
    if !trims_after(link, level, last) {
        return;
    }
    let slot = slot_at(last, level);
    match editable(link, Some(owner)) {
        VNode::Leaf(leaf) => leaf.truncate_after(slot),
        VNode::Branch(branch) => {
            branch.truncate_after(slot);
            if let Some(child) = branch.get_mut(slot) {
                remove_after(child, owner, level - BITS_PER_LEVEL, last);
            }
        }
    }
}

/// Drops every element before raw index `first` from the subtree at `level`.
fn remove_before<T: Clone>(link: &mut Link<T>, owner: &Owner, level: u32, first: usize) {
    if !trims_before(link, level, first) {
        return;
    }
    let slot = slot_at(first, level);
    match editable(link, Some(owner)) {
        VNode::Leaf(leaf) => leaf.clear_before(slot),
        VNode::Branch(branch) => {
            branch.clear_before(slot);
            if let Some(child) = branch.get_mut(slot) {
                remove_before(child, owner, level - BITS_PER_LEVEL, first);
            }
        }
    }
}

fn clear_owner<T: Clone>(link: &mut Option<Link<T>>) {
    if let Some(link) = link.as_mut()
        && let Some(node) = ReferenceCounter::get_mut(link)
    {
        node.set_owner(None);
    }
}

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on an index trie with a tail buffer.
///
/// # Time Complexity
///
/// | Operation     | Complexity            |
/// |---------------|-----------------------|
/// | `get`         | O(log32 N)            |
/// | `set`         | O(log32 N)            |
/// | `push_back`   | O(1) amortized        |
/// | `pop_back`    | O(1) amortized        |
/// | `push_front`  | O(log32 N)            |
/// | `pop_front`   | O(log32 N)            |
/// | `slice`       | O(log32 N)            |
/// | `len`         | O(1)                  |
///
/// # Examples
///
/// ```rust
/// use sharetrie::persistent::PersistentVector;
///
/// let vector = PersistentVector::new().push_back(1).push_back(2).push_front(0);
/// assert_eq!(vector.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
/// ```
#[derive(Clone)]
pub struct PersistentVector<T> {
    /// Raw index of the first visible element
    origin: usize,
    /// Raw index one past the last visible element
    capacity: usize,
    /// Shift of the root node; leaves sit at shift 0
    level: u32,
    root: Option<Link<T>>,
    tail: Option<Link<T>>,
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            origin: 0,
            capacity: 0,
            level: BITS_PER_LEVEL,
            root: None,
            tail: None,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.capacity - self.origin
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.capacity == self.origin
    }

    /// Returns `true` if both vectors share the same trie and window.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        fn same<T>(left: Option<&Link<T>>, right: Option<&Link<T>>) -> bool {
            match (left, right) {
                (None, None) => true,
                (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
                _ => false,
            }
        }
        self.origin == other.origin
            && self.capacity == other.capacity
            && same(self.root.as_ref(), other.root.as_ref())
            && same(self.tail.as_ref(), other.tail.as_ref())
    }

    fn leaf_link(&self, raw: usize) -> Option<&Link<T>> {
        if raw >= tail_offset(self.capacity) {
            return self.tail.as_ref();
        }
        if !covered(raw, self.level) {
            return None;
        }
        let mut link = self.root.as_ref()?;
        let mut level = self.level;
        while level > 0 {
            link = link.as_branch()?.get(slot_at(raw, level))?;
            level -= BITS_PER_LEVEL;
        }
        Some(link)
    }

    fn leaf_for(&self, raw: usize) -> Option<&BitmapNode<T>> {
        self.leaf_link(raw)?.as_leaf()
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..10).collect();
    /// assert_eq!(vector.get(3), Some(&3));
    /// assert_eq!(vector.get(10), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let raw = self.origin + index;
        self.leaf_for(raw)?.get(slot_at(raw, 0))
    }

    /// Returns the element at `index`, or `default` when out of range.
    #[must_use]
    pub fn get_or<'a>(&'a self, index: usize, default: &'a T) -> &'a T {
        self.get(index).unwrap_or(default)
    }

    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns a double-ended iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator {
            vector: self,
            front: 0,
            back: self.len(),
            front_leaf: None,
            back_leaf: None,
        }
    }

    /// Returns an empty vector.
    #[inline]
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Creates a vector containing a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().push_back(element)
    }

    fn clear_in_place(&mut self) {
        *self = Self::new();
    }

    /// Moves the visible window to `origin + begin .. end`.
    ///
    /// `end` is relative to the current origin when non-negative, relative to
    /// the current capacity when negative, and left unchanged when `None`.
    /// Slots opened by growth are left empty for the caller to fill.
    #[allow(
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::too_many_lines
    )]
    fn set_bounds(&mut self, owner: &Owner, begin: isize, end: Option<isize>) {
        let mut old_origin = self.origin as isize;
        let mut old_capacity = self.capacity as isize;
        let mut new_origin = old_origin + begin;
        let mut new_capacity = match end {
            None => old_capacity,
            Some(end) if end < 0 => old_capacity + end,
            Some(end) => old_origin + end,
        };
        if new_origin == old_origin && new_capacity == old_capacity {
            return;
        }
        if new_origin >= new_capacity {
            self.clear_in_place();
            return;
        }

        let shrinking_tail = new_capacity > 0
            && tail_offset(new_capacity as usize) < tail_offset(self.capacity);
        let relocated_tail = if shrinking_tail {
            self.leaf_link(new_capacity as usize - 1).cloned()
        } else {
            None
        };

        let mut new_level = self.level;
        let mut new_root = self.root.take();
        let old_tail = self.tail.take();

        // Grow upward at the front; the old root becomes slot 1 of its new parent.
        let mut offset: isize = 0;
        while new_origin + offset < 0 {
            let mut parent = BitmapNode::empty(Some(owner.clone()));
            if let Some(root) = new_root.take().filter(|root| root.bitmap() != 0) {
                parent.insert(1, root);
            }
            new_root = Some(ReferenceCounter::new(VNode::Branch(parent)));
            new_level += BITS_PER_LEVEL;
            offset += 1 << new_level;
            tracing::trace!(level = new_level, "vector trie grew at the front");
        }
        if offset != 0 {
            new_origin += offset;
            old_origin += offset;
            new_capacity += offset;
            old_capacity += offset;
        }

        let old_tail_offset = tail_offset(old_capacity as usize) as isize;
        let new_tail_offset = tail_offset(new_capacity as usize) as isize;

        // Grow upward at the back; the old root becomes slot 0 of its new parent.
        while !covered(new_tail_offset as usize, new_level) {
            let mut parent = BitmapNode::empty(Some(owner.clone()));
            if let Some(root) = new_root.take().filter(|root| root.bitmap() != 0) {
                parent.insert(0, root);
            }
            new_root = Some(ReferenceCounter::new(VNode::Branch(parent)));
            new_level += BITS_PER_LEVEL;
            tracing::trace!(level = new_level, "vector trie grew at the back");
        }

        let mut new_tail = match new_tail_offset.cmp(&old_tail_offset) {
            std::cmp::Ordering::Equal => old_tail,
            std::cmp::Ordering::Less => relocated_tail,
            std::cmp::Ordering::Greater => {
                if let Some(tail) = old_tail
                    && new_origin < old_capacity
                    && tail.bitmap() != 0
                {
                    let root = new_root.get_or_insert_with(|| empty_branch(owner));
                    graft_tail(root, owner, new_level, old_tail_offset as usize, tail);
                }
                Some(empty_leaf(owner))
            }
        };

        if new_capacity < old_capacity
            && let Some(tail) = new_tail.as_mut()
        {
            remove_after(tail, owner, 0, new_capacity as usize - 1);
        }

        if new_origin >= new_tail_offset {
            // The whole window fits in the tail.
            new_origin -= new_tail_offset;
            new_capacity -= new_tail_offset;
            new_level = BITS_PER_LEVEL;
            new_root = None;
            if let Some(tail) = new_tail.as_mut() {
                remove_before(tail, owner, 0, new_origin as usize);
            }
        } else if new_origin > old_origin || new_tail_offset < old_tail_offset {
            // Re-root at the smallest subtree covering the window, then trim its edges.
            let mut dropped: isize = 0;
            while new_level > BITS_PER_LEVEL {
                let Some(root) = new_root.as_ref() else {
                    break;
                };
                let begin_slot = slot_at(new_origin as usize, new_level);
                if begin_slot != slot_at(new_tail_offset as usize, new_level) {
                    break;
                }
                dropped += (begin_slot as isize) << new_level;
                let child = root
                    .as_branch()
                    .and_then(|branch| branch.get(begin_slot))
                    .cloned();
                new_root = child;
                new_level -= BITS_PER_LEVEL;
                tracing::trace!(level = new_level, "vector trie re-rooted");
            }

            if let Some(root) = new_root.as_mut() {
                if new_origin > old_origin {
                    remove_before(root, owner, new_level, (new_origin - dropped) as usize);
                }
                if new_tail_offset < old_tail_offset {
                    remove_after(root, owner, new_level, (new_tail_offset - dropped - 1) as usize);
                }
            }
            new_origin -= dropped;
            new_capacity -= dropped;
        }

        self.origin = new_origin as usize;
        self.capacity = new_capacity as usize;
        self.level = new_level;
        self.root = new_root;
        self.tail = new_tail;
    }

    /// Stores `value` at `index`, which must lie inside the window.
    fn assoc(&mut self, owner: &Owner, index: usize, value: T) {
        let raw = self.origin + index;
        if raw >= tail_offset(self.capacity) {
            let tail = self.tail.get_or_insert_with(|| empty_leaf(owner));
            if let VNode::Leaf(leaf) = editable(tail, Some(owner)) {
                leaf.insert(slot_at(raw, 0), value);
            }
        } else {
            let level = self.level;
            let root = self.root.get_or_insert_with(|| empty_branch(owner));
            assoc_in(root, owner, level, raw, value);
        }
    }

    fn append_in(&mut self, owner: &Owner, values: impl IntoIterator<Item = T>) {
        for value in values {
            let index = self.len();
            #[allow(clippy::cast_possible_wrap)]
            self.set_bounds(owner, 0, Some(index as isize + 1));
            self.assoc(owner, index, value);
        }
    }

    fn prepend_in(&mut self, owner: &Owner, values: Vec<T>) {
        #[allow(clippy::cast_possible_wrap)]
        let count = values.len() as isize;
        if count == 0 {
            return;
        }
        self.set_bounds(owner, -count, None);
        for (index, value) in values.into_iter().enumerate() {
            self.assoc(owner, index, value);
        }
    }

    /// Truncates to `size`, or grows to it with clones of `fill`.
    #[allow(clippy::cast_possible_wrap)]
    fn resize_in(&mut self, owner: &Owner, size: usize, fill: T) {
        let length = self.len();
        if size == length {
            return;
        }
        self.set_bounds(owner, 0, Some(size as isize));
        for index in length..size {
            self.assoc(owner, index, fill.clone());
        }
    }

    /// Applies one edit to a copy of `self` under a fresh ownership token.
    fn edited(&self, edit: impl FnOnce(&mut Self, &Owner)) -> Self {
        let mut result = self.clone();
        let owner = Owner::new();
        edit(&mut result, &owner);
        result
    }

    /// Replaces the element at `index`.
    ///
    /// `index == len()` appends; an index beyond that returns an equal vector.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..3).collect();
    /// assert_eq!(vector.set(1, 10).get(1), Some(&10));
    /// assert_eq!(vector.set(3, 3).len(), 4);
    /// assert_eq!(vector.set(9, 9).len(), 3);
    /// ```
    #[must_use]
    pub fn set(&self, index: usize, value: T) -> Self {
        match index.cmp(&self.len()) {
            std::cmp::Ordering::Less => self.edited(|vector, owner| vector.assoc(owner, index, value)),
            std::cmp::Ordering::Equal => self.push_back(value),
            std::cmp::Ordering::Greater => self.clone(),
        }
    }

    /// Replaces the element at `index` with `function(element)`.
    ///
    /// Returns `None` if `index` is out of range.
    #[must_use]
    pub fn update<F>(&self, index: usize, function: F) -> Option<Self>
    where
        F: FnOnce(&T) -> T,
    {
        let value = function(self.get(index)?);
        Some(self.set(index, value))
    }

    /// Appends an element.
    ///
    /// # Complexity
    ///
    /// O(1) amortized
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new().push_back(1).push_back(2);
    /// assert_eq!(vector.len(), 2);
    /// assert_eq!(vector.last(), Some(&2));
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        self.edited(|vector, owner| vector.append_in(owner, std::iter::once(element)))
    }

    /// Appends every element of `elements`, in order.
    #[must_use]
    pub fn push_back_many<I: IntoIterator<Item = T>>(&self, elements: I) -> Self {
        self.edited(|vector, owner| vector.append_in(owner, elements))
    }

    /// Removes the last element, returning the shortened vector and the element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..3).collect();
    /// let (rest, last) = vector.pop_back().unwrap();
    /// assert_eq!(last, 2);
    /// assert_eq!(rest.len(), 2);
    /// ```
    #[must_use]
    pub fn pop_back(&self) -> Option<(Self, T)> {
        let last = self.last()?.clone();
        Some((self.edited(|vector, owner| vector.set_bounds(owner, 0, Some(-1))), last))
    }

    /// Inserts an element at the front.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new().push_back(2).push_front(1);
    /// assert_eq!(vector.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn push_front(&self, element: T) -> Self {
        self.edited(|vector, owner| vector.prepend_in(owner, vec![element]))
    }

    /// Inserts `elements` at the front, keeping their order.
    #[must_use]
    pub fn push_front_many<I: IntoIterator<Item = T>>(&self, elements: I) -> Self {
        let elements: Vec<T> = elements.into_iter().collect();
        self.edited(|vector, owner| vector.prepend_in(owner, elements))
    }

    /// Removes the first element, returning the shortened vector and the element.
    #[must_use]
    pub fn pop_front(&self) -> Option<(Self, T)> {
        let first = self.first()?.clone();
        Some((self.edited(|vector, owner| vector.set_bounds(owner, 1, None)), first))
    }

    /// Removes the element at `index`, shifting later elements down.
    ///
    /// Out-of-range indices return an equal vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..5).collect();
    /// let removed = vector.remove(2);
    /// assert_eq!(removed.iter().copied().collect::<Vec<_>>(), vec![0, 1, 3, 4]);
    /// assert_eq!(vector.remove(9), vector);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn remove(&self, index: usize) -> Self {
        let length = self.len();
        if index >= length {
            self.clone()
        } else if index == 0 {
            self.edited(|vector, owner| vector.set_bounds(owner, 1, None))
        } else if index == length - 1 {
            self.edited(|vector, owner| vector.set_bounds(owner, 0, Some(-1)))
        } else {
            self.splice(index as isize, 1, std::iter::empty())
        }
    }

    /// Returns the elements in `begin..end`.
    ///
    /// Negative indices count back from the end; `None` as `end` means the
    /// end of the vector. Indices are clamped to `0..=len()`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..10).collect();
    /// let middle = vector.slice(2, Some(-2));
    /// assert_eq!(middle.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6, 7]);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn slice(&self, begin: isize, end: Option<isize>) -> Self {
        let length = self.len();
        let begin = resolve_index(begin, length);
        let end = end.map_or(length, |end| resolve_index(end, length));
        if begin == 0 && end == length {
            return self.clone();
        }
        if begin >= end {
            return Self::new();
        }
        self.edited(|vector, owner| vector.set_bounds(owner, begin as isize, Some(end as isize)))
    }

    /// Returns the first `count` elements.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn take(&self, count: usize) -> Self {
        self.slice(0, Some(count.min(self.len()) as isize))
    }

    /// Returns every element after the first `count`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn skip(&self, count: usize) -> Self {
        self.slice(count.min(self.len()) as isize, None)
    }

    /// Removes `remove_count` elements at `index` and inserts `values` there.
    ///
    /// Follows array splice rules: a negative `index` counts back from the
    /// end, and out-of-range indices clamp to `0..=len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let spliced = vector.splice(1, 1, [20, 21]);
    /// assert_eq!(spliced.iter().copied().collect::<Vec<_>>(), vec![1, 20, 21, 3]);
    /// let from_end = vector.splice(-1, 5, []);
    /// assert_eq!(from_end.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn splice<I>(&self, index: isize, remove_count: usize, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let length = self.len();
        let start = resolve_index(index, length);
        let end = start.saturating_add(remove_count).min(length);
        let head = self.slice(0, Some(start as isize));
        head.edited(|vector, owner| {
            vector.append_in(owner, values);
            vector.append_in(owner, self.iter().skip(end).cloned());
        })
    }

    /// Returns a vector of exactly `size` elements.
    ///
    /// A smaller `size` keeps the first `size` elements; a larger one pads
    /// the back with clones of `fill`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..3).collect();
    /// let grown = vector.set_size(5, -1);
    /// assert_eq!(grown.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, -1, -1]);
    /// assert_eq!(vector.set_size(1, -1).len(), 1);
    /// ```
    #[must_use]
    pub fn set_size(&self, size: usize, fill: T) -> Self {
        if size == self.len() {
            return self.clone();
        }
        self.edited(|vector, owner| vector.resize_in(owner, size, fill))
    }

    /// Returns `self` followed by the elements of `other`.
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        self.push_back_many(other.iter().cloned())
    }

    /// Opens a transient editing window over this vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..3).collect();
    /// let mut transient = vector.as_mutable();
    /// transient.push_back(3);
    /// transient.set(0, 100);
    /// let edited = transient.as_immutable();
    ///
    /// assert_eq!(vector.get(0), Some(&0));
    /// assert_eq!(edited.get(0), Some(&100));
    /// assert_eq!(edited.len(), 4);
    /// ```
    #[must_use]
    pub fn as_mutable(&self) -> TransientVector<T> {
        tracing::trace!(length = self.len(), "opening transient vector");
        TransientVector {
            vector: self.clone(),
            owner: Owner::new(),
            _marker: PhantomData,
        }
    }

    /// Applies a batch of edits through a transient and returns the result.
    #[must_use]
    pub fn with_mutations<F>(&self, mutator: F) -> Self
    where
        F: FnOnce(&mut TransientVector<T>),
    {
        let mut transient = self.as_mutable();
        mutator(&mut transient);
        transient.as_immutable()
    }
}

/// Clamps an array-style index (negative counts from the end) to `0..=length`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub(crate) const fn resolve_index(index: isize, length: usize) -> usize {
    if index < 0 {
        let from_end = length as isize + index;
        if from_end < 0 { 0 } else { from_end as usize }
    } else if index as usize > length {
        length
    } else {
        index as usize
    }
}

// =============================================================================
// TransientVector Definition
// =============================================================================

/// A vector inside a transient editing window.
///
/// Nodes created or copied by this transient are edited in place by later
/// writes; nodes still shared with persistent vectors are copied first.
///
/// # Examples
///
/// ```rust
/// use sharetrie::persistent::TransientVector;
///
/// let mut transient = TransientVector::new();
/// for element in 0..100 {
///     transient.push_back(element);
/// }
/// assert_eq!(transient.pop_front(), Some(0));
/// let vector = transient.as_immutable();
/// assert_eq!(vector.len(), 99);
/// ```
pub struct TransientVector<T> {
    vector: PersistentVector<T>,
    owner: Owner,
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientVector<i32>: Send, Sync);

impl<T> TransientVector<T> {
    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.vector.len()
    }

    /// Returns `true` if there are no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Returns a reference to the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.vector.get(index)
    }
}

impl<T: Clone> TransientVector<T> {
    /// Creates an empty transient vector.
    #[must_use]
    pub fn new() -> Self {
        PersistentVector::new().as_mutable()
    }

    /// Replaces the element at `index`; `index == len()` appends.
    ///
    /// Returns `false` and changes nothing when `index > len()`.
    pub fn set(&mut self, index: usize, value: T) -> bool {
        match index.cmp(&self.len()) {
            std::cmp::Ordering::Less => {
                self.vector.assoc(&self.owner, index, value);
                true
            }
            std::cmp::Ordering::Equal => {
                self.push_back(value);
                true
            }
            std::cmp::Ordering::Greater => false,
        }
    }

    /// Appends an element.
    pub fn push_back(&mut self, value: T) {
        self.vector.append_in(&self.owner, std::iter::once(value));
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.vector.last()?.clone();
        self.vector.set_bounds(&self.owner, 0, Some(-1));
        Some(last)
    }

    /// Inserts an element at the front.
    pub fn push_front(&mut self, value: T) {
        self.vector.prepend_in(&self.owner, vec![value]);
    }

    /// Removes and returns the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        let first = self.vector.first()?.clone();
        self.vector.set_bounds(&self.owner, 1, None);
        Some(first)
    }

    /// Truncates to `size`, or grows to it with clones of `fill`.
    pub fn set_size(&mut self, size: usize, fill: T) {
        self.vector.resize_in(&self.owner, size, fill);
    }

    /// Closes the editing window and returns the resulting persistent vector.
    #[must_use]
    pub fn as_immutable(mut self) -> PersistentVector<T> {
        clear_owner(&mut self.vector.root);
        clear_owner(&mut self.vector.tail);
        tracing::trace!(length = self.vector.len(), "closing transient vector");
        self.vector
    }
}

impl<T: Clone> Default for TransientVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// A double-ended iterator over elements of a [`PersistentVector`].
///
/// Each end remembers the leaf it last read, so a full pass costs one trie
/// descent per 32 elements.
pub struct PersistentVectorIterator<'a, T> {
    vector: &'a PersistentVector<T>,
    front: usize,
    back: usize,
    front_leaf: Option<(usize, &'a BitmapNode<T>)>,
    back_leaf: Option<(usize, &'a BitmapNode<T>)>,
}

impl<'a, T> PersistentVectorIterator<'a, T> {
    fn read(
        vector: &'a PersistentVector<T>,
        cached: &mut Option<(usize, &'a BitmapNode<T>)>,
        index: usize,
    ) -> Option<&'a T> {
        let raw = vector.origin + index;
        let block = raw & !MASK;
        let leaf = match *cached {
            Some((cached_block, leaf)) if cached_block == block => leaf,
            _ => {
                let leaf = vector.leaf_for(raw)?;
                *cached = Some((block, leaf));
                leaf
            }
        };
        leaf.get(slot_at(raw, 0))
    }
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let index = self.front;
            self.front += 1;
            if let Some(element) = Self::read(self.vector, &mut self.front_leaf, index) {
                return Some(element);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for PersistentVectorIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            self.back -= 1;
            if let Some(element) = Self::read(self.vector, &mut self.back_leaf, self.back) {
                return Some(element);
            }
        }
        None
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {}

impl<T> FusedIterator for PersistentVectorIterator<'_, T> {}

/// An owning iterator over elements of a [`PersistentVector`].
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    front: usize,
    back: usize,
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        let element = self.vector.get(self.front).cloned();
        self.front += 1;
        element
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for PersistentVectorIntoIterator<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.vector.get(self.back).cloned()
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = TransientVector::new();
        transient.extend(iter);
        transient.as_immutable()
    }
}

impl<T: Clone> Extend<T> for TransientVector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.vector.append_in(&self.owner, iter);
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let back = self.len();
        PersistentVectorIntoIterator {
            vector: self,
            front: 0,
            back,
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentVector<T>
where
    T: serde::Deserialize<'de> + Clone,
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
