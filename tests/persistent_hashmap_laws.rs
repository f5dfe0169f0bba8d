//! Property-based tests for PersistentHashMap.
//!
//! Every operation is checked against `std::collections::HashMap` as a model.

use proptest::prelude::*;
use sharetrie::persistent::PersistentHashMap;
use std::collections::HashMap;

// =============================================================================
// Strategy for generating test data
// =============================================================================

fn arbitrary_key() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn arbitrary_entries() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec((arbitrary_key(), any::<i32>()), 0..200)
}

#[derive(Clone, Debug)]
enum Operation {
    Insert(String, i32),
    Remove(String),
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(
        prop_oneof![
            (arbitrary_key(), any::<i32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
            arbitrary_key().prop_map(Operation::Remove),
        ],
        0..300,
    )
}

// =============================================================================
// Get-Insert Law: map.insert(k, v).get(&k) == Some(&v)
// =============================================================================

proptest! {
    #[test]
    fn prop_get_insert_law(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in any::<i32>()
    ) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key.clone(), value);

        prop_assert_eq!(inserted.get(&key), Some(&value));
    }
}

// =============================================================================
// Get-Insert-Other Law: k1 != k2 => map.insert(k1, v).get(&k2) == map.get(&k2)
// =============================================================================

proptest! {
    #[test]
    fn prop_get_insert_other_law(
        entries in arbitrary_entries(),
        key1 in arbitrary_key(),
        key2 in arbitrary_key(),
        value in any::<i32>()
    ) {
        prop_assume!(key1 != key2);

        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key1, value);

        prop_assert_eq!(inserted.get(&key2), map.get(&key2));
    }
}

// =============================================================================
// Remove-Get Law: map.remove(&k).get(&k) == None
// =============================================================================

proptest! {
    #[test]
    fn prop_remove_get_law(entries in arbitrary_entries(), key in arbitrary_key()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let removed = map.remove(&key);

        prop_assert_eq!(removed.get(&key), None);
        prop_assert_eq!(
            removed.len(),
            map.len() - usize::from(map.contains_key(&key))
        );
    }
}

// =============================================================================
// Model agreement and persistence
// =============================================================================

proptest! {
    #[test]
    fn prop_operations_agree_with_model(operations in arbitrary_operations()) {
        let mut model: HashMap<String, i32> = HashMap::new();
        let mut map = PersistentHashMap::new();
        let mut history = Vec::new();

        for operation in operations {
            history.push((map.clone(), model.clone()));
            match operation {
                Operation::Insert(key, value) => {
                    model.insert(key.clone(), value);
                    map = map.insert(key, value);
                }
                Operation::Remove(key) => {
                    model.remove(&key);
                    map = map.remove(&key);
                }
            }
            prop_assert_eq!(map.len(), model.len());
        }

        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(value));
        }
        prop_assert_eq!(map.iter().count(), model.len());

        // Earlier versions never observe later edits.
        for (version, snapshot) in history {
            prop_assert_eq!(version.len(), snapshot.len());
            for (key, value) in &snapshot {
                prop_assert_eq!(version.get(key), Some(value));
            }
        }
    }

    #[test]
    fn prop_equal_content_is_equal_and_hashes_alike(entries in arbitrary_entries()) {
        use std::hash::{BuildHasher, RandomState};

        let forward: PersistentHashMap<String, i32> = entries.iter().cloned().collect();
        let model: HashMap<String, i32> = entries.into_iter().collect();
        let rebuilt: PersistentHashMap<String, i32> = model.into_iter().collect();

        prop_assert_eq!(&forward, &rebuilt);
        let state = RandomState::new();
        prop_assert_eq!(state.hash_one(&forward), state.hash_one(&rebuilt));
    }

    #[test]
    fn prop_transient_batch_matches_persistent_chain(entries in arbitrary_entries()) {
        let chained = entries
            .iter()
            .fold(PersistentHashMap::new(), |map, (key, value)| map.insert(key.clone(), *value));
        let batched = PersistentHashMap::new().with_mutations(|transient| {
            for (key, value) in &entries {
                transient.insert(key.clone(), *value);
            }
        });

        prop_assert_eq!(chained, batched);
    }
}
