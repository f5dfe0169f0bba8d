//! Persistent (immutable) stack.
//!
//! This module provides [`PersistentStack`], a singly-linked list whose head
//! is the top of the stack.
//!
//! # Overview
//!
//! - O(1) `push`, `pop` and `peek`
//! - O(n) index access
//! - `push_all` keeps the order of its input, so the first element ends on top
//!
//! Pushing shares every existing node with the original stack:
//!
//! ```text
//! stack:               2 -> 3 -> nil
//! stack.push(1):  1 -> [2 -> 3 -> nil]
//! ```
//!
//! # Examples
//!
//! ```rust
//! use sharetrie::persistent::PersistentStack;
//!
//! let stack = PersistentStack::new().push(3).push(2).push(1);
//! assert_eq!(stack.peek(), Some(&1));
//!
//! let popped = stack.pop();
//! assert_eq!(stack.len(), 3);
//! assert_eq!(popped.peek(), Some(&2));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use super::ReferenceCounter;

struct Node<T> {
    element: T,
    next: Option<ReferenceCounter<Self>>,
}

/// A persistent (immutable) stack backed by a singly-linked list.
///
/// # Time Complexity
///
/// | Operation  | Complexity |
/// |------------|------------|
/// | `push`     | O(1)       |
/// | `pop`      | O(1)       |
/// | `peek`     | O(1)       |
/// | `len`      | O(1)       |
/// | `get`      | O(n)       |
/// | `push_all` | O(m)       |
pub struct PersistentStack<T> {
    head: Option<ReferenceCounter<Node<T>>>,
    length: usize,
}

impl<T> PersistentStack<T> {
    /// Creates a new empty stack.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: None,
            length: 0,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the stack is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the top element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::new().push(1).push(2);
    /// assert_eq!(stack.peek(), Some(&2));
    /// ```
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.head.as_ref().map(|node| &node.element)
    }

    /// Returns the element `index` positions below the top.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    /// Returns `true` if both stacks share the same top node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (None, None) => true,
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Pushes an element on top.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        Self {
            head: Some(ReferenceCounter::new(Node {
                element,
                next: self.head.clone(),
            })),
            length: self.length + 1,
        }
    }

    /// Pushes every element of `elements` so that the first one ends on top.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sharetrie::persistent::PersistentStack;
    ///
    /// let stack = PersistentStack::new().push(9).push_all([1, 2, 3]);
    /// assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 9]);
    /// ```
    #[must_use]
    pub fn push_all<I: IntoIterator<Item = T>>(&self, elements: I) -> Self {
        let elements: Vec<T> = elements.into_iter().collect();
        elements
            .into_iter()
            .rev()
            .fold(self.clone(), |stack, element| stack.push(element))
    }

    /// Removes the top element.
    ///
    /// Popping an empty stack returns an empty stack.
    #[must_use]
    pub fn pop(&self) -> Self {
        self.head.as_ref().map_or_else(Self::new, |node| Self {
            head: node.next.clone(),
            length: self.length - 1,
        })
    }

    /// Returns an empty stack.
    #[inline]
    #[must_use]
    pub const fn clear(&self) -> Self {
        Self::new()
    }

    /// Returns an iterator from the top of the stack down.
    #[must_use]
    pub fn iter(&self) -> PersistentStackIterator<'_, T> {
        PersistentStackIterator {
            current: self.head.as_deref(),
            remaining: self.length,
        }
    }

    /// Returns the elements from the bottom of the stack up.
    ///
    /// A linked list has no backward links, so this collects references first.
    pub fn iter_rev(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.iter().collect::<Vec<_>>().into_iter().rev()
    }
}

impl<T> Clone for PersistentStack<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            length: self.length,
        }
    }
}

impl<T> Drop for PersistentStack<T> {
    // Unlinks uniquely owned nodes one by one instead of recursing through `next`.
    fn drop(&mut self) {
        let mut current = self.head.take();
        while let Some(node) = current {
            match ReferenceCounter::try_unwrap(node) {
                Ok(mut node) => current = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over references to elements of a [`PersistentStack`].
pub struct PersistentStackIterator<'a, T> {
    current: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for PersistentStackIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.current.map(|node| {
            self.current = node.next.as_deref();
            self.remaining -= 1;
            &node.element
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentStackIterator<'_, T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentStack<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentStack<T> {
    /// Builds a stack whose top is the first element of the iterator.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new().push_all(iter)
    }
}

impl<'a, T> IntoIterator for &'a PersistentStack<T> {
    type Item = &'a T;
    type IntoIter = PersistentStackIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PersistentStack<T> {}

impl<T: Hash> Hash for PersistentStack<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
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
impl<T: serde::Serialize> serde::Serialize for PersistentStack<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for PersistentStack<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let elements: Vec<T> = serde::Deserialize::deserialize(deserializer)?;
        Ok(elements.into_iter().collect())
    }
}
