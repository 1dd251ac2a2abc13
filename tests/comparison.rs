//! Comparison tests between TieredVec and std::Vec
//!
//! This module provides property-based testing that compares the behavior of
//! TieredVec with std::Vec to catch behavioral discrepancies, and checks the
//! tier layout after every step.

use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tiered_vec::{Snapshot, TieredVec, TieredVecError, Vector2D};

// ============================================================================
// COMPARISON TESTING INFRASTRUCTURE
// ============================================================================

/// Operations that can be applied to a vector for comparison testing.
#[derive(Debug, Clone)]
enum VecOp<T> {
    Push(T),
    Pop,
    Clear,
    Insert(usize, T),
    Remove(usize),
    Set(usize, T),
    Sort,
    Extend(Vec<T>),
}

/// Apply an operation to both vectors and compare results.
fn apply_op<T: Clone + Ord + std::fmt::Debug>(
    std_vec: &mut Vec<T>,
    tiered: &mut TieredVec<T>,
    op: &VecOp<T>,
) {
    match op {
        VecOp::Push(v) => {
            std_vec.push(v.clone());
            tiered.push(v.clone());
        }
        VecOp::Pop => {
            assert_eq!(std_vec.pop(), tiered.pop(), "pop() mismatch");
        }
        VecOp::Clear => {
            std_vec.clear();
            tiered.clear();
        }
        VecOp::Insert(idx, v) => {
            let result = tiered.insert(*idx, v.clone());
            if *idx <= std_vec.len() {
                std_vec.insert(*idx, v.clone());
                assert_eq!(result, Ok(()), "insert({idx}) mismatch");
            } else {
                assert_eq!(
                    result,
                    Err(TieredVecError::OutOfRange {
                        index: *idx,
                        len: std_vec.len()
                    })
                );
            }
        }
        VecOp::Remove(idx) => {
            let result = tiered.remove(*idx);
            if *idx < std_vec.len() {
                assert_eq!(Ok(std_vec.remove(*idx)), result, "remove({idx}) mismatch");
            } else {
                assert!(result.is_err(), "remove({idx}) past the end succeeded");
            }
        }
        VecOp::Set(idx, v) => {
            if let Some(slot) = std_vec.get_mut(*idx) {
                *slot = v.clone();
                *tiered.get_mut(*idx).unwrap() = v.clone();
            } else {
                assert!(tiered.get_mut(*idx).is_err());
            }
        }
        VecOp::Sort => {
            std_vec.sort();
            tiered.sort();
        }
        VecOp::Extend(vals) => {
            std_vec.extend(vals.iter().cloned());
            tiered.extend(vals.iter().cloned());
        }
    }
}

/// Verify that both vectors have the same content.
fn assert_vecs_equal<T: Clone + PartialEq + std::fmt::Debug>(
    std_vec: &[T],
    tiered: &TieredVec<T>,
) {
    assert_eq!(std_vec.len(), tiered.len(), "length mismatch");
    assert_eq!(std_vec.is_empty(), tiered.is_empty(), "is_empty mismatch");

    for (i, (std_elem, tiered_elem)) in std_vec.iter().zip(tiered.iter()).enumerate() {
        assert_eq!(std_elem, tiered_elem, "element mismatch at index {}", i);
    }

    assert_eq!(std_vec.first(), tiered.first(), "first() mismatch");
    assert_eq!(std_vec.last(), tiered.last(), "last() mismatch");

    for i in 0..std_vec.len() {
        assert_eq!(std_vec.get(i), tiered.get(i).ok(), "get({}) mismatch", i);
    }

    // Out of bounds should fail
    assert!(tiered.get(tiered.len()).is_err());
    assert!(tiered.get(usize::MAX).is_err());
}

/// Verify the tier layout: every tier but the last is full, the last is
/// non-empty unless it is the only one, and no more tiers exist than needed.
fn assert_tier_layout<T>(tiered: &TieredVec<T>) {
    let base = tiered.base_capacity();
    let lens: Vec<usize> = tiered.tiers().map(|tier| tier.len()).collect();
    assert_eq!(lens.len(), tiered.tier_count());
    assert!(!lens.is_empty(), "no tiers");

    let (last, full) = lens.split_last().unwrap();
    for (n, &len) in full.iter().enumerate() {
        assert_eq!(len, base << n, "tier {} of {:?} not full", n, lens);
    }
    assert!(*last <= base << full.len(), "tier overflow in {:?}", lens);
    if lens.len() > 1 {
        assert!(*last > 0, "empty trailing tier in {:?}", lens);
    }

    assert_eq!(lens.iter().sum::<usize>(), tiered.len());
    let start_of_last = base * ((1 << full.len()) - 1);
    assert_eq!(tiered.capacity(), start_of_last + (base << full.len()));
}

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Strategy for generating a single vector operation.
fn vec_op_strategy() -> impl Strategy<Value = VecOp<i32>> {
    prop_oneof![
        4 => any::<i32>().prop_map(VecOp::Push),
        2 => Just(VecOp::Pop),
        1 => Just(VecOp::Clear),
        3 => (0usize..60, any::<i32>()).prop_map(|(idx, v)| VecOp::Insert(idx, v)),
        3 => (0usize..60).prop_map(VecOp::Remove),
        1 => (0usize..60, any::<i32>()).prop_map(|(idx, v)| VecOp::Set(idx, v)),
        1 => Just(VecOp::Sort),
        1 => prop::collection::vec(any::<i32>(), 0..30).prop_map(VecOp::Extend),
    ]
}

/// Strategy for generating a sequence of operations.
fn ops_sequence_strategy() -> impl Strategy<Value = Vec<VecOp<i32>>> {
    prop::collection::vec(vec_op_strategy(), 0..150)
}

fn base_capacity_strategy() -> impl Strategy<Value = usize> {
    1usize..6
}

fn tiered_from<T>(base: usize, values: impl IntoIterator<Item = T>) -> TieredVec<T> {
    let mut tiered = TieredVec::new(base).unwrap();
    tiered.extend(values);
    tiered
}

// ============================================================================
// PROPTEST TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Test that a random sequence of operations produces identical results.
    #[test]
    fn proptest_operations_match(
        base in base_capacity_strategy(),
        ops in ops_sequence_strategy(),
    ) {
        let mut std_vec: Vec<i32> = Vec::new();
        let mut tiered: TieredVec<i32> = TieredVec::new(base).unwrap();

        for op in &ops {
            apply_op(&mut std_vec, &mut tiered, op);
            assert_vecs_equal(&std_vec, &tiered);
            assert_tier_layout(&tiered);
        }
    }

    /// Test push followed by iteration.
    #[test]
    fn proptest_push_and_iter(
        base in base_capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..500),
    ) {
        let mut tiered = TieredVec::new(base).unwrap();
        for v in &values {
            tiered.push(*v);
        }
        assert_tier_layout(&tiered);

        let collected: Vec<_> = tiered.iter().copied().collect();
        prop_assert_eq!(&collected, &values);

        let flattened: Vec<_> = tiered.tiers().flatten().copied().collect();
        prop_assert_eq!(&flattened, &values);

        let reversed: Vec<_> = tiered.clone().into_iter().rev().collect();
        let expected: Vec<_> = values.iter().rev().copied().collect();
        prop_assert_eq!(reversed, expected);

        let owned: Vec<_> = tiered.into_iter().collect();
        prop_assert_eq!(owned, values);
    }

    /// Test that insert followed by remove at the same index is a no-op.
    #[test]
    fn proptest_insert_remove_inverse(
        base in base_capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..200),
        pos in any::<prop::sample::Index>(),
        v in any::<i32>(),
    ) {
        let mut tiered = tiered_from(base, values.iter().copied());
        let tier_count = tiered.tier_count();
        let idx = pos.index(values.len() + 1);

        tiered.insert(idx, v).unwrap();
        prop_assert_eq!(tiered.get(idx), Ok(&v));
        assert_tier_layout(&tiered);

        prop_assert_eq!(tiered.remove(idx), Ok(v));
        assert_tier_layout(&tiered);
        prop_assert_eq!(tiered.tier_count(), tier_count);
        prop_assert!(tiered.iter().eq(values.iter()));
    }

    /// Test that remove followed by insert of the removed value at the same
    /// index restores the sequence and its tiers.
    #[test]
    fn proptest_remove_insert_inverse(
        base in base_capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 1..200),
        pos in any::<prop::sample::Index>(),
    ) {
        let mut tiered = tiered_from(base, values.iter().copied());
        let text = tiered.to_string();
        let tier_count = tiered.tier_count();
        let idx = pos.index(values.len());

        let removed = tiered.remove(idx).unwrap();
        prop_assert_eq!(removed, values[idx]);
        assert_tier_layout(&tiered);

        tiered.insert(idx, removed).unwrap();
        assert_tier_layout(&tiered);
        prop_assert_eq!(tiered.tier_count(), tier_count);
        prop_assert_eq!(tiered.to_string(), text);
    }

    /// Test that sort produces the same result as a stable slice sort.
    #[test]
    fn proptest_sort(
        base in base_capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..300),
    ) {
        let mut std_vec = values.clone();
        let mut tiered = tiered_from(base, values);
        let tier_count = tiered.tier_count();

        std_vec.sort();
        tiered.sort();

        prop_assert!(tiered.iter().eq(std_vec.iter()));
        prop_assert!(tiered.is_sorted());
        prop_assert_eq!(tiered.tier_count(), tier_count);
        assert_tier_layout(&tiered);

        // Sorting a sorted vector changes nothing
        let snapshot = tiered.snapshot();
        tiered.sort();
        prop_assert_eq!(tiered.snapshot(), snapshot);
    }

    /// Test that sorting keeps equal keys in their original order.
    #[test]
    fn proptest_sort_by_key_stable(
        base in base_capacity_strategy(),
        keys in prop::collection::vec(0u8..8, 0..200),
    ) {
        let tagged: Vec<(u8, usize)> = keys.into_iter().zip(0..).collect();
        let mut std_vec = tagged.clone();
        let mut tiered = tiered_from(base, tagged);

        std_vec.sort_by_key(|pair| pair.0);
        tiered.sort_by_key(|pair| pair.0);

        prop_assert!(tiered.iter().eq(std_vec.iter()));
    }

    /// Test that is_sorted matches the slice method.
    #[test]
    fn proptest_is_sorted(values in prop::collection::vec(0i32..10, 0..50)) {
        let tiered: TieredVec<i32> = values.iter().copied().collect();
        let expected = values.windows(2).all(|pair| pair[0] <= pair[1]);
        prop_assert_eq!(tiered.is_sorted(), expected);
    }

    /// Test that contains matches the slice method.
    #[test]
    fn proptest_contains(
        values in prop::collection::vec(0i32..100, 0..100),
        needle in 0i32..100,
    ) {
        let tiered: TieredVec<i32> = values.iter().copied().collect();
        prop_assert_eq!(tiered.contains(&needle), values.contains(&needle));
    }

    /// Test that equality and hashing depend on the elements alone.
    #[test]
    fn proptest_eq_hash(
        a in base_capacity_strategy(),
        b in base_capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..100),
    ) {
        let left = tiered_from(a, values.iter().copied());
        let right = tiered_from(b, values.iter().copied());
        prop_assert_eq!(&left, &right);

        let hash = |v: &TieredVec<i32>| {
            let mut hasher = DefaultHasher::new();
            v.hash(&mut hasher);
            hasher.finish()
        };
        prop_assert_eq!(hash(&left), hash(&right));
    }

    /// Test that a snapshot restores the same contents and layout.
    #[test]
    fn proptest_snapshot_restore(
        base in base_capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..200),
    ) {
        let tiered = tiered_from(base, values);
        let restored = TieredVec::from_snapshot(tiered.snapshot()).unwrap();

        prop_assert_eq!(restored.base_capacity(), tiered.base_capacity());
        prop_assert_eq!(restored.tier_count(), tiered.tier_count());
        prop_assert_eq!(restored.to_string(), tiered.to_string());
    }

    /// Test that the display form has one line per tier.
    #[test]
    fn proptest_display_lines(
        base in base_capacity_strategy(),
        values in prop::collection::vec(0u8..10, 0..100),
    ) {
        let tiered = tiered_from(base, values);
        let text = tiered.to_string();
        prop_assert!(text.starts_with('[') && text.ends_with(']'));
        prop_assert_eq!(text.lines().count(), tiered.tier_count().max(1));

        let inner = &text[1..text.len() - 1];
        for (line, tier) in inner.split('\n').zip(tiered.tiers()) {
            let expected: Vec<String> = tier.map(|v| v.to_string()).collect();
            prop_assert_eq!(line, expected.join(", "));
        }
    }
}

// ============================================================================
// SCENARIO TESTS
// ============================================================================

#[test]
fn test_push_fills_tiers_in_order() {
    let mut tiered = TieredVec::new(2).unwrap();
    let expected = [
        "[1]",
        "[1, 2]",
        "[1, 2\n3]",
        "[1, 2\n3, 4]",
        "[1, 2\n3, 4, 5]",
        "[1, 2\n3, 4, 5, 6]",
        "[1, 2\n3, 4, 5, 6\n7]",
    ];
    for (value, text) in (1..=7).zip(expected) {
        tiered.push(value);
        assert_eq!(tiered.to_string(), text);
    }
    assert_eq!(tiered.tier_count(), 3);
    assert_eq!(tiered.get(4), Ok(&5));
}

#[test]
fn test_remove_front_drops_trailing_tier() {
    let mut tiered = tiered_from(2, 1..=7);
    assert_eq!(tiered.remove(0), Ok(1));
    assert_eq!(tiered.to_string(), "[2, 3\n4, 5, 6, 7]");
    assert_eq!(tiered.tier_count(), 2);

    // Putting it back reopens the third tier
    tiered.insert(0, 1).unwrap();
    assert_eq!(tiered.to_string(), "[1, 2\n3, 4, 5, 6\n7]");
    assert_eq!(tiered.tier_count(), 3);
}

#[test]
fn test_sort_redistributes_across_tiers() {
    let mut tiered = tiered_from(2, [5, 3, 1, 4, 2]);
    assert_eq!(tiered.to_string(), "[5, 3\n1, 4, 2]");
    tiered.sort();
    assert_eq!(tiered.to_string(), "[1, 2\n3, 4, 5]");
}

#[test]
fn test_base_capacity_one() {
    let mut tiered = TieredVec::new(1).unwrap();
    tiered.extend(0..15);
    let lens: Vec<usize> = tiered.tiers().map(|tier| tier.len()).collect();
    assert_eq!(lens, vec![1, 2, 4, 8]);
    assert_eq!(tiered.len(), tiered.capacity());

    tiered.push(15);
    assert_eq!(tiered.tier_count(), 5);
    assert_eq!(tiered.pop(), Some(15));
    assert_eq!(tiered.tier_count(), 4);
}

#[test]
fn test_boundaries() {
    let mut tiered = tiered_from(3, 0..10);
    let len = tiered.len();

    assert_eq!(tiered.get(len - 1), Ok(&9));
    assert_eq!(
        tiered.get(len),
        Err(TieredVecError::OutOfRange { index: len, len })
    );
    assert_eq!(
        tiered.insert(len + 1, 0),
        Err(TieredVecError::OutOfRange {
            index: len + 1,
            len
        })
    );
    assert_eq!(
        tiered.remove(len),
        Err(TieredVecError::OutOfRange { index: len, len })
    );

    // Inserting at len appends
    tiered.insert(len, 10).unwrap();
    assert_eq!(tiered.last(), Some(&10));

    // Failed operations leave the contents untouched
    assert!(tiered.iter().copied().eq(0..11));
}

#[test]
fn test_empty_container() {
    let mut tiered: TieredVec<i32> = TieredVec::new(4).unwrap();
    assert_eq!(tiered.to_string(), "[]");
    assert_eq!(tiered.tier_count(), 1);
    assert!(tiered.get(0).is_err());
    assert!(tiered.remove(0).is_err());
    assert_eq!(tiered.pop(), None);

    tiered.sort();
    assert!(tiered.is_empty());
    assert!(tiered.is_sorted());
    assert_eq!(tiered.iter().next(), None);
}

#[test]
fn test_zero_base_capacity_rejected() {
    assert_eq!(
        TieredVec::<i32>::new(0).unwrap_err(),
        TieredVecError::InvalidBaseCapacity
    );
    let snapshot = Snapshot {
        base_capacity: 0,
        len: 0,
        elements: Vec::<i32>::new(),
    };
    assert!(TieredVec::from_snapshot(snapshot).is_err());
}

#[test]
fn test_vector2d_sort_by_magnitude() {
    let mut tiered = TieredVec::new(2).unwrap();
    tiered.extend([
        Vector2D::new(3.0, 4.0),
        Vector2D::new(0.0, 1.0),
        Vector2D::new(-6.0, 8.0),
        Vector2D::new(1.0, 0.0),
        Vector2D::new(0.0, -2.0),
    ]);
    tiered.sort_by(Vector2D::cmp_magnitude);

    let magnitudes: Vec<f64> = tiered.iter().map(Vector2D::magnitude).collect();
    assert_eq!(magnitudes, vec![1.0, 1.0, 2.0, 5.0, 10.0]);
    // Equal magnitudes keep their insertion order
    assert_eq!(tiered[0], Vector2D::new(0.0, 1.0));
    assert_eq!(tiered[1], Vector2D::new(1.0, 0.0));
    assert_eq!(
        tiered.to_string(),
        "[(0, 1), (1, 0)\n(0, -2), (3, 4), (-6, 8)]"
    );
}

#[test]
fn test_vector2d_json_round_trip() {
    let mut tiered = TieredVec::new(1).unwrap();
    tiered.extend([Vector2D::new(1.5, -2.0), Vector2D::new(0.0, 0.25)]);

    let json = serde_json::to_string(&tiered).unwrap();
    assert_eq!(
        json,
        r#"{"base_capacity":1,"len":2,"elements":[{"x":1.5,"y":-2.0},{"x":0.0,"y":0.25}]}"#
    );

    let restored: TieredVec<Vector2D> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, tiered);
    assert_eq!(restored.tier_count(), 2);
}

#[test]
fn test_large_insert_remove_front() {
    let mut tiered = TieredVec::new(4).unwrap();
    let mut std_vec = Vec::new();
    for i in 0..2000 {
        tiered.insert(0, i).unwrap();
        std_vec.insert(0, i);
    }
    assert!(tiered.iter().eq(std_vec.iter()));

    for _ in 0..1500 {
        assert_eq!(tiered.remove(0).ok(), Some(std_vec.remove(0)));
    }
    assert_vecs_equal(&std_vec, &tiered);
    assert_tier_layout(&tiered);
}
