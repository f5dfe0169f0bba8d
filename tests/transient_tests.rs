//! Tests for transient editing windows.
//!
//! A transient may edit nodes it created in place, but the persistent value
//! it was opened from must never change.

use rstest::rstest;
use sharetrie::persistent::{
    PersistentHashMap, PersistentHashSet, PersistentOrderedMap, PersistentVector,
    TransientHashMap, TransientOrderedMap, TransientVector,
};

#[rstest]
fn test_hashmap_transient_leaves_source_untouched() {
    let source: PersistentHashMap<i32, i32> = (0..1000).map(|key| (key, key)).collect();
    let mut transient = source.as_mutable();
    for key in 0..1000 {
        transient.insert(key, -key);
    }
    for key in 1000..1500 {
        assert!(transient.insert(key, key));
    }
    assert!(transient.remove(&0));
    assert!(!transient.remove(&0));
    let edited = transient.as_immutable();

    assert_eq!(edited.len(), 1499);
    assert_eq!(edited.get(&5), Some(&-5));
    assert_eq!(source.len(), 1000);
    assert!((0..1000).all(|key| source.get(&key) == Some(&key)));
}

#[rstest]
fn test_hashmap_transient_reports_membership() {
    let mut transient: TransientHashMap<String, i32> = TransientHashMap::new();
    assert!(transient.is_empty());
    assert!(transient.insert("a".to_string(), 1));
    assert!(!transient.insert("a".to_string(), 2));
    assert_eq!(transient.get("a"), Some(&2));
    assert!(transient.contains_key("a"));
    transient.update_with("a", |value| value.map(|value| value * 10));
    assert_eq!(transient.get("a"), Some(&20));
    assert_eq!(transient.len(), 1);
}

#[rstest]
fn test_two_transients_from_one_source_are_independent() {
    let source: PersistentHashMap<i32, i32> = (0..100).map(|key| (key, 0)).collect();
    let first = source.with_mutations(|transient| {
        transient.insert(1, 1);
    });
    let second = source.with_mutations(|transient| {
        transient.insert(1, 2);
    });
    assert_eq!(first.get(&1), Some(&1));
    assert_eq!(second.get(&1), Some(&2));
    assert_eq!(source.get(&1), Some(&0));
}

#[rstest]
fn test_published_map_is_not_edited_by_later_persistent_inserts() {
    let published = PersistentHashMap::new().with_mutations(|transient| {
        for key in 0..64 {
            transient.insert(key, key);
        }
    });
    let snapshot = published.clone();
    let next = published.insert(0, 100);
    assert_eq!(snapshot.get(&0), Some(&0));
    assert_eq!(next.get(&0), Some(&100));
}

#[rstest]
fn test_vector_transient_mixed_edits() {
    let source: PersistentVector<i32> = (0..100).collect();
    let mut transient = source.as_mutable();
    transient.push_front(-1);
    transient.push_back(100);
    assert!(transient.set(1, 42));
    assert!(!transient.set(500, 0));
    assert_eq!(transient.pop_front(), Some(-1));
    assert_eq!(transient.pop_back(), Some(100));
    assert_eq!(transient.get(0), Some(&42));
    let edited = transient.as_immutable();

    assert_eq!(edited.len(), 100);
    assert_eq!(edited.get(0), Some(&42));
    assert_eq!(source.get(0), Some(&0));
}

#[rstest]
fn test_vector_transient_matches_persistent_chain() {
    let chained = (0..5000).fold(PersistentVector::new(), |vector, element| {
        if element % 4 == 0 { vector.push_front(element) } else { vector.push_back(element) }
    });
    let mut transient = TransientVector::new();
    for element in 0..5000 {
        if element % 4 == 0 {
            transient.push_front(element);
        } else {
            transient.push_back(element);
        }
    }
    assert_eq!(transient.as_immutable(), chained);
}

#[rstest]
fn test_vector_transient_drains_to_empty() {
    let mut transient = (0..70).collect::<PersistentVector<i32>>().as_mutable();
    let mut drained = Vec::new();
    while let Some(element) = transient.pop_back() {
        drained.push(element);
    }
    assert!(transient.is_empty());
    assert_eq!(drained, (0..70).rev().collect::<Vec<_>>());
    assert!(transient.as_immutable().is_empty());
}

#[rstest]
fn test_set_transient_leaves_source_untouched() {
    let source: PersistentHashSet<i32> = (0..10).collect();
    let edited = source.with_mutations(|transient| {
        transient.remove(&3);
        transient.insert(30);
    });
    assert!(source.contains(&3));
    assert!(!source.contains(&30));
    assert!(!edited.contains(&3));
    assert!(edited.contains(&30));
}

#[rstest]
fn test_ordered_map_transient_matches_persistent_chain() {
    let source: PersistentOrderedMap<i32, i32> = (0..200).map(|key| (key, key)).collect();
    let chained = (0..150)
        .filter(|key| key % 3 != 0)
        .fold(source.clone(), |map, key| map.remove(&key))
        .insert(7, -7)
        .insert(1000, 1000);

    let mut transient = source.as_mutable();
    for key in (0..150).filter(|key| key % 3 != 0) {
        assert!(transient.remove(&key));
    }
    assert!(!transient.insert(0, 0));
    assert!(transient.insert(7, -7));
    assert!(transient.insert(1000, 1000));
    let batched = transient.as_immutable();

    assert_eq!(batched, chained);
    assert_eq!(batched.keys().take(3).copied().collect::<Vec<_>>(), vec![0, 3, 6]);
    assert_eq!(batched.keys().rev().take(2).copied().collect::<Vec<_>>(), vec![1000, 7]);
    assert_eq!(source.len(), 200);
    assert_eq!(source.get(&1), Some(&1));
}

#[rstest]
fn test_ordered_map_transient_from_scratch() {
    let mut transient = TransientOrderedMap::new();
    transient.extend([("b", 2), ("a", 1), ("b", 20)]);
    assert_eq!(transient.len(), 2);
    assert_eq!(transient.get("b"), Some(&20));
    assert!(transient.contains_key("a"));
    let map = transient.as_immutable();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "a"]);
}

#[rstest]
fn test_vector_transient_set_size() {
    let mut transient: TransientVector<i32> = TransientVector::new();
    transient.set_size(3, 7);
    assert!(transient.set(1, 0));
    let vector = transient.as_immutable();
    assert_eq!(vector.iter().copied().collect::<Vec<_>>(), vec![7, 0, 7]);
}
