//! # sharetrie
//!
//! Persistent collections with structural sharing.
//!
//! ## Overview
//!
//! Every operation that looks like a mutation returns a new collection and
//! leaves the receiver, and every reference previously taken from it, intact.
//! Unchanged subtrees are shared between versions, so an edit allocates only
//! the path from the touched slot up to the root.
//!
//! - **Hash maps and sets**: [`PersistentHashMap`](persistent::PersistentHashMap) and
//!   [`PersistentHashSet`](persistent::PersistentHashSet), built on a hash array mapped trie
//! - **Vectors**: [`PersistentVector`](persistent::PersistentVector), an index trie with a tail
//!   buffer and a movable origin
//! - **Stacks**: [`PersistentStack`](persistent::PersistentStack), a shared singly-linked list
//! - **Ordered maps**: [`PersistentOrderedMap`](persistent::PersistentOrderedMap), iterating in
//!   insertion order
//! - **Transients**: `as_mutable` / `with_mutations` batch edits that mutate nodes in place
//!   while they are exclusively owned by the batch
//! - **Lazy sequences**: [`IndexedSeq`](sequence::IndexedSeq), [`KeyedSeq`](sequence::KeyedSeq)
//!   and [`SetSeq`](sequence::SetSeq), deferred operator chains over any collection
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes through `Arc` instead of `Rc`
//! - `fxhash`: hash keys with `FxHasher`
//! - `ahash`: hash keys with `AHasher`
//! - `serde`: `Serialize` / `Deserialize` for every collection
//! - `json`: build collections from `serde_json::Value` (default)
//!
//! ## Example
//!
//! ```rust
//! use sharetrie::prelude::*;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! let evens = vector.to_seq().filter(|value| value % 2 == 0).skip(10).take(5);
//! assert_eq!(evens.to_vec(), vec![20, 22, 24, 26, 28]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the collections, the lazy sequences and the construction error.
///
/// # Usage
///
/// ```rust
/// use sharetrie::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::ConstructError;
    pub use crate::persistent::*;
    pub use crate::sequence::*;
}

pub mod error;
pub mod persistent;
pub mod sequence;

#[cfg(feature = "json")]
pub mod construct;
