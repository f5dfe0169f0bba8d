//! Construction from dynamic JSON input.
//!
//! Maps and keyed sequences accept an object (its entries) or an array of
//! `[key, value]` pairs. Vectors, stacks and indexed sequences accept an
//! array (its elements) or an object (its values). Object entries keep their
//! source order. Anything else is rejected with a [`ConstructError`] before
//! any collection is built.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use sharetrie::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::from_json(&json!([["a", 1], [2, "b"]])).unwrap();
//! assert_eq!(map.get("a"), Some(&json!(1)));
//! assert_eq!(map.get("2"), Some(&json!("b")));
//!
//! let error = PersistentHashMap::from_json(&json!(3)).unwrap_err();
//! assert_eq!(error.to_string(), "Expected iterable: 3");
//! ```

use serde_json::Value;

use crate::error::ConstructError;
use crate::persistent::{PersistentHashMap, PersistentOrderedMap, PersistentStack, PersistentVector};
use crate::sequence::{IndexedSeq, KeyedSeq};

fn rejected(error: ConstructError) -> ConstructError {
    tracing::debug!(%error, "rejected construction input");
    error
}

/// Scalar keys are stringified; arrays and objects cannot be keys.
fn key_of(key: &Value) -> Option<String> {
    match key {
        Value::String(key) => Some(key.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn entry_of(position: usize, element: &Value) -> Result<(String, Value), ConstructError> {
    if let Value::Array(pair) = element
        && let [key, value] = pair.as_slice()
        && let Some(key) = key_of(key)
    {
        return Ok((key, value.clone()));
    }
    Err(rejected(ConstructError::MalformedEntry {
        position,
        element: element.to_string(),
    }))
}

fn entries_of(input: &Value) -> Result<Vec<(String, Value)>, ConstructError> {
    match input {
        Value::Object(object) => Ok(object
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()),
        Value::Array(elements) => elements
            .iter()
            .enumerate()
            .map(|(position, element)| entry_of(position, element))
            .collect(),
        scalar => Err(rejected(ConstructError::ExpectedIterable {
            value: scalar.to_string(),
        })),
    }
}

fn values_of(input: &Value) -> Result<Vec<Value>, ConstructError> {
    match input {
        Value::Array(elements) => Ok(elements.clone()),
        Value::Object(object) => Ok(object.values().cloned().collect()),
        scalar => Err(rejected(ConstructError::ExpectedIterable {
            value: scalar.to_string(),
        })),
    }
}

impl PersistentHashMap<String, Value> {
    /// Builds a map from a JSON object or an array of `[key, value]` pairs.
    ///
    /// # Errors
    ///
    /// [`ConstructError::ExpectedIterable`] for a scalar input and
    /// [`ConstructError::MalformedEntry`] for an array element that is not a
    /// pair with a scalar key.
    pub fn from_json(input: &Value) -> Result<Self, ConstructError> {
        Ok(entries_of(input)?.into_iter().collect())
    }

    /// Converts the map into a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

impl PersistentOrderedMap<String, Value> {
    /// Builds an ordered map, keeping the order of the input entries.
    ///
    /// # Errors
    ///
    /// Same rules as [`PersistentHashMap::from_json`].
    pub fn from_json(input: &Value) -> Result<Self, ConstructError> {
        Ok(entries_of(input)?.into_iter().collect())
    }
}

impl KeyedSeq<String, Value> {
    /// Builds a keyed sequence from a JSON object or an array of pairs.
    ///
    /// # Errors
    ///
    /// Same rules as [`PersistentHashMap::from_json`].
    pub fn from_json(input: &Value) -> Result<Self, ConstructError> {
        Ok(entries_of(input)?.into_iter().collect())
    }
}

impl PersistentVector<Value> {
    /// Builds a vector from a JSON array, or from the values of an object.
    ///
    /// # Errors
    ///
    /// [`ConstructError::ExpectedIterable`] for a scalar input.
    pub fn from_json(input: &Value) -> Result<Self, ConstructError> {
        Ok(values_of(input)?.into_iter().collect())
    }

    /// Converts the vector into a JSON array.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().cloned().collect())
    }
}

impl PersistentStack<Value> {
    /// Builds a stack whose top is the first element of the input.
    ///
    /// # Errors
    ///
    /// [`ConstructError::ExpectedIterable`] for a scalar input.
    pub fn from_json(input: &Value) -> Result<Self, ConstructError> {
        Ok(values_of(input)?.into_iter().collect())
    }

    /// Converts the stack into a JSON array, top first.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().cloned().collect())
    }
}

impl IndexedSeq<Value> {
    /// Builds an indexed sequence from a JSON array, or from the values of an object.
    ///
    /// # Errors
    ///
    /// [`ConstructError::ExpectedIterable`] for a scalar input.
    pub fn from_json(input: &Value) -> Result<Self, ConstructError> {
        Ok(values_of(input)?.into_iter().collect())
    }
}
