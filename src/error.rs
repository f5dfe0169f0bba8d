//! Construction errors.
//!
//! Building a collection from dynamic input can fail in two ways: the input is
//! a scalar where a collection of entries was required, or one of the entries
//! is not a `[key, value]` pair. Lookups and out-of-range edits never fail;
//! they report absence through `Option` or return an equal collection.

use thiserror::Error;

/// Error raised when dynamic input cannot be turned into a collection.
///
/// Nothing is partially built: the constructor returns this error before
/// handing out any collection.
///
/// # Examples
///
/// ```
/// use sharetrie::error::ConstructError;
///
/// let error = ConstructError::ExpectedIterable { value: "3".to_string() };
/// assert_eq!(error.to_string(), "Expected iterable: 3");
///
/// let error = ConstructError::MalformedEntry { position: 0, element: "1".to_string() };
/// assert_eq!(error.to_string(), "Expected [K, V] tuple: 1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConstructError {
    /// A scalar was supplied where an iterable of entries was required.
    #[error("Expected iterable: {value}")]
    ExpectedIterable {
        /// Rendering of the offending value
        value: String,
    },
    /// An element of an entry list was not a two-part `[key, value]` pair.
    #[error("Expected [K, V] tuple: {element}")]
    MalformedEntry {
        /// Position of the element in the input
        position: usize,
        /// Rendering of the offending element
        element: String,
    },
}

impl ConstructError {
    /// Returns the position of the malformed element, if the error has one.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::ExpectedIterable { .. } => None,
            Self::MalformedEntry { position, .. } => Some(*position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_expected_iterable_display() {
        let error = ConstructError::ExpectedIterable {
            value: "true".to_string(),
        };
        assert_eq!(error.to_string(), "Expected iterable: true");
        assert_eq!(error.position(), None);
    }

    #[rstest]
    fn test_malformed_entry_display() {
        let error = ConstructError::MalformedEntry {
            position: 2,
            element: "[1]".to_string(),
        };
        assert_eq!(error.to_string(), "Expected [K, V] tuple: [1]");
        assert_eq!(error.position(), Some(2));
    }

    #[rstest]
    fn test_error_trait() {
        let error = ConstructError::ExpectedIterable {
            value: "1".to_string(),
        };
        let _: &dyn std::error::Error = &error;
    }
}
