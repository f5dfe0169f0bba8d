//! Ownership tokens for transient editing windows.
//!
//! Every trie node carries an optional [`Owner`]. A write may change a node in
//! place only when the node carries the writer's token and nothing else holds
//! a reference to it; any other node is copied, the copy is stamped with the
//! writer's token and the copy is edited instead. Persistent operations write
//! with no token at all, so they always copy.

use std::fmt;

use super::ReferenceCounter;

/// Identity of one editing window.
///
/// Two tokens are the same owner only if they were cloned from the same
/// [`Owner::new`] call. The token allocates so that its address stays unique
/// for as long as any node still carries it.
#[derive(Clone)]
pub(crate) struct Owner(ReferenceCounter<()>);

impl Owner {
    /// Mints a token distinct from every other live token.
    pub(crate) fn new() -> Self {
        Self(ReferenceCounter::new(()))
    }

    /// Returns `true` if both tokens come from the same window.
    #[inline]
    pub(crate) fn is(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Owner({:p})", ReferenceCounter::as_ptr(&self.0))
    }
}

/// A node that records which editing window created it.
pub(crate) trait Stamped: Clone {
    /// The window that may still edit this node in place.
    fn owner(&self) -> Option<&Owner>;

    /// Replaces the token carried by this node.
    fn set_owner(&mut self, owner: Option<Owner>);
}

/// Returns `true` if `node` may be edited in place by `owner`.
#[inline]
pub(crate) fn owned_by<N: Stamped>(node: &N, owner: Option<&Owner>) -> bool {
    matches!((node.owner(), owner), (Some(stamp), Some(owner)) if stamp.is(owner))
}

/// Returns a mutable view of the node behind `link` that is safe to edit.
///
/// The node is reused when it is stamped with `owner` and `link` is its only
/// reference. Otherwise `link` is repointed at a fresh copy stamped with
/// `owner`, leaving the shared original untouched.
pub(crate) fn editable<'a, N: Stamped>(
    link: &'a mut ReferenceCounter<N>,
    owner: Option<&Owner>,
) -> &'a mut N {
    let reusable = owned_by(&**link, owner) && ReferenceCounter::get_mut(link).is_some();
    if !reusable {
        let mut copy: N = (**link).clone();
        copy.set_owner(owner.cloned());
        *link = ReferenceCounter::new(copy);
    }
    ReferenceCounter::make_mut(link)
}
