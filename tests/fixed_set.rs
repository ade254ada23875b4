use std::collections::BTreeSet;

use fixed_rbtree::{ColorCompactness, EmbeddedColor, Error, Fallible, FixedSet, Natural, PackedColor, Reverse};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Capacity of the sets under test.
const CAPACITY: usize = 96;

type Checked<L> = FixedSet<i32, CAPACITY, Natural, Fallible, L>;

/// Generates values in a range suitable for causing collisions.
fn value_strategy() -> impl Strategy<Value = i32> {
    -250i32..250i32
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i32),
    Remove(i32),
    Take(i32),
    EraseRange(i32, i32),
    Contains(i32),
    Find(i32),
    First,
    Last,
    PopFirst,
    PopLast,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        8 => value_strategy().prop_map(SetOp::Insert),
        3 => value_strategy().prop_map(SetOp::Remove),
        1 => value_strategy().prop_map(SetOp::Take),
        1 => (value_strategy(), 0i32..30).prop_map(|(start, width)| SetOp::EraseRange(start, start + width)),
        2 => value_strategy().prop_map(SetOp::Contains),
        1 => value_strategy().prop_map(SetOp::Find),
        1 => Just(SetOp::First),
        1 => Just(SetOp::Last),
        1 => Just(SetOp::PopFirst),
        1 => Just(SetOp::PopLast),
    ]
}

fn replay<L: ColorCompactness>(ops: &[SetOp]) -> Result<(), TestCaseError> {
    let mut fixed: Checked<L> = FixedSet::new();
    let mut model: BTreeSet<i32> = BTreeSet::new();

    for op in ops {
        match *op {
            SetOp::Insert(x) => {
                let result = fixed.insert(x);
                if !model.contains(&x) && model.len() == CAPACITY {
                    prop_assert!(matches!(result, Err(Error::CapacityExceeded(_))), "insert({})", x);
                } else {
                    prop_assert_eq!(result, Ok(model.insert(x)), "insert({})", x);
                }
            }
            SetOp::Remove(x) => {
                prop_assert_eq!(fixed.remove(&x), model.remove(&x), "remove({})", x);
            }
            SetOp::Take(x) => {
                prop_assert_eq!(fixed.take(&x), model.take(&x), "take({})", x);
            }
            SetOp::EraseRange(start, end) => {
                let expected = model.range(end..).next().copied();
                model.retain(|x| !(start..end).contains(x));
                prop_assert_eq!(fixed.erase_range(start..end).copied(), expected, "erase_range({}..{})", start, end);
            }
            SetOp::Contains(x) => {
                prop_assert_eq!(fixed.contains(&x), model.contains(&x), "contains({})", x);
                prop_assert_eq!(fixed.get(&x), model.get(&x), "get({})", x);
            }
            SetOp::Find(x) => {
                let cursor = fixed.find(&x);
                prop_assert_eq!(cursor.is_past_last(), !model.contains(&x), "find({})", x);
                prop_assert_eq!(cursor.key(), model.get(&x));
            }
            SetOp::First => {
                prop_assert_eq!(fixed.first(), model.first());
            }
            SetOp::Last => {
                prop_assert_eq!(fixed.last(), model.last());
            }
            SetOp::PopFirst => {
                prop_assert_eq!(fixed.pop_first(), model.pop_first());
            }
            SetOp::PopLast => {
                prop_assert_eq!(fixed.pop_last(), model.pop_last());
            }
        }

        prop_assert_eq!(fixed.len(), model.len(), "len mismatch after {:?}", op);
        prop_assert_eq!(fixed.check_invariants(), Ok(()), "invariants broken after {:?}", op);
    }

    prop_assert!(fixed.iter().eq(model.iter()));
    prop_assert!(fixed.into_iter().rev().eq(model.into_iter().rev()));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence on both a FixedSet and a BTreeSet.
    #[test]
    fn set_ops_match_btreeset(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        replay::<EmbeddedColor>(&ops)?;
    }

    #[test]
    fn packed_set_ops_match_btreeset(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        replay::<PackedColor>(&ops)?;
    }

    /// Range iteration and retain agree with BTreeSet.
    #[test]
    fn range_and_retain_match_btreeset(
        values in proptest::collection::vec(value_strategy(), 0..CAPACITY),
        start in value_strategy(),
        width in 0i32..150,
    ) {
        let mut fixed: FixedSet<i32, CAPACITY> = values.iter().copied().collect();
        let mut model: BTreeSet<i32> = values.iter().copied().collect();

        let end = start + width;
        prop_assert!(fixed.range(start..end).eq(model.range(start..end)));
        prop_assert!(fixed.range(start..=end).rev().eq(model.range(start..=end).rev()));

        fixed.retain(|x| x % 4 != 1);
        model.retain(|x| x % 4 != 1);
        prop_assert!(fixed.iter().eq(model.iter()));
        prop_assert_eq!(fixed.check_invariants(), Ok(()));
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn capacity_boundary_is_reported() {
    let mut set: FixedSet<u8, 3, Natural, Fallible> = FixedSet::new();
    for x in [3, 1, 2] {
        assert_eq!(set.insert(x), Ok(true));
    }
    assert!(set.is_full());
    assert_eq!(set.insert(2), Ok(false));
    assert!(matches!(set.insert(4), Err(Error::CapacityExceeded(error)) if error.capacity == 3));

    assert!(FixedSet::<u8, 3, Natural, Fallible>::from_values([1, 2, 3, 4]).is_err());
}

#[test]
#[should_panic(expected = "capacity of 2 exceeded")]
fn fatal_policy_panics_beyond_capacity() {
    let _set: FixedSet<u8, 2> = FixedSet::from([1, 2, 3]);
}

#[test]
fn equality_ignores_insertion_order_and_capacity() {
    let a: FixedSet<&str, 4> = FixedSet::from(["x", "y", "z"]);
    let b: FixedSet<&str, 32> = FixedSet::from(["z", "x", "y"]);
    let c: FixedSet<&str, 4> = FixedSet::from(["x", "y"]);

    assert!(a == b);
    assert!(a != c);
    assert_eq!(format!("{a:?}"), r#"{"x", "y", "z"}"#);
}

#[test]
fn reverse_iteration_mirrors_forward() {
    let set: FixedSet<i32, 64> = (0..50).map(|x| (x * 13) % 50).collect();
    let forward: Vec<_> = set.iter().copied().collect();
    let mut backward: Vec<_> = set.iter().rev().copied().collect();
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(forward, (0..50).collect::<Vec<_>>());
}

#[test]
fn reverse_comparator_and_extend() {
    let mut set: FixedSet<i32, 8, Reverse> = FixedSet::default();
    set.extend([1, 5, 3]);
    set.extend(&[4, 5]);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![5, 4, 3, 1]);
    assert_eq!(set.erase_range(4..=3), Some(&1));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![5, 1]);
}
