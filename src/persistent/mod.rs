//! Persistent (immutable) data structures.
//!
//! This module provides immutable containers that use structural sharing to
//! minimize copying:
//!
//! - [`PersistentHashMap`]: Persistent hash map (HAMT)
//! - [`PersistentHashSet`]: Persistent hash set (based on HAMT)
//! - [`PersistentVector`]: Persistent vector (index trie with a tail buffer)
//! - [`PersistentStack`]: Persistent stack (singly-linked list)
//! - [`PersistentOrderedMap`]: Insertion-ordered map (HAMT plus an order vector)
//!
//! # Structural Sharing
//!
//! Every operation that looks like a mutation returns a new container. The
//! new version shares every node the edit did not touch, so a single update
//! allocates only the nodes on one root-to-leaf path.
//!
//! # Transients
//!
//! The map, set and vector can open a transient editing window with
//! `as_mutable` (or `with_mutations`). Inside the window, nodes created by the
//! window carry its ownership token and are edited in place; everything else
//! is copied on first write. `as_immutable` closes the window, and no holder
//! of an earlier or later persistent value can observe the in-place edits.
//!
//! # Examples
//!
//! ## `PersistentHashMap`
//!
//! ```rust
//! use sharetrie::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//! assert_eq!(map.get("one"), Some(&1));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! ## `PersistentVector`
//!
//! ```rust
//! use sharetrie::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! let shifted = vector.pop_front().map(|(rest, _)| rest).unwrap();
//! assert_eq!(shifted.first(), Some(&1));
//! assert_eq!(vector.first(), Some(&0));
//! ```
//!
//! ## Batch edits
//!
//! ```rust
//! use sharetrie::persistent::PersistentHashSet;
//!
//! let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
//! let edited = set.with_mutations(|transient| {
//!     transient.insert(4);
//!     transient.remove(&1);
//! });
//! assert_eq!(set.len(), 3);
//! assert_eq!(edited.len(), 3);
//! assert!(edited.contains(&4));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod hashmap;
mod hashset;
mod node;
mod ordered_map;
mod owner;
mod stack;
mod vector;

pub use hashmap::PersistentHashMap;
pub use hashmap::PersistentHashMapIntoIterator;
pub use hashmap::PersistentHashMapIterator;
pub use hashmap::TransientHashMap;
pub use hashset::PersistentHashSet;
pub use hashset::PersistentHashSetIterator;
pub use hashset::TransientHashSet;
pub use ordered_map::PersistentOrderedMap;
pub use ordered_map::PersistentOrderedMapIterator;
pub use ordered_map::TransientOrderedMap;
pub use stack::PersistentStack;
pub use stack::PersistentStackIterator;
pub use vector::PersistentVector;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;
pub use vector::TransientVector;

pub(crate) use vector::resolve_index;

// =============================================================================
// Tests
// =============================================================================
