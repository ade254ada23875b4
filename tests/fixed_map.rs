use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use fixed_rbtree::fixed_map::Entry;
use fixed_rbtree::{
    CapacityExceeded, CheckingPolicy, ColorCompactness, EmbeddedColor, Error, Fallible, FixedMap, FnComparator,
    KeyNotFound, Natural, PackedColor, Reverse,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Capacity of the maps under test. Small next to the key range so that sequences hit the limit.
const CAPACITY: usize = 128;

type Checked<L> = FixedMap<i64, i64, CAPACITY, Natural, Fallible, L>;

/// Generates keys in a range suitable for causing collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -300i64..300i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    InsertOrAssign(i64, i64),
    GetOrInsertDefault(i64),
    EntryAddAssign(i64, i64),
    Remove(i64),
    Erase(i64),
    EraseRange(i64, i64),
    RemoveViaCursor(i64),
    Get(i64),
    At(i64),
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        8 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::InsertOrAssign(k, v)),
        1 => key_strategy().prop_map(MapOp::GetOrInsertDefault),
        2 => (key_strategy(), -100i64..100).prop_map(|(k, v)| MapOp::EntryAddAssign(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Erase),
        1 => (key_strategy(), 0i64..40).prop_map(|(start, width)| MapOp::EraseRange(start, start + width)),
        1 => key_strategy().prop_map(MapOp::RemoveViaCursor),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::At),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

/// Replays `ops` on a `FixedMap` and a `BTreeMap`, predicting capacity failures from the model.
fn replay<L: ColorCompactness>(ops: &[MapOp]) -> Result<(), TestCaseError> {
    let mut fixed: Checked<L> = FixedMap::new();
    let mut model: BTreeMap<i64, i64> = BTreeMap::new();

    for op in ops {
        let full = model.len() == CAPACITY;
        match *op {
            MapOp::Insert(k, v) => {
                let result = fixed.insert(k, v).map(|(_, inserted)| inserted);
                if model.contains_key(&k) {
                    prop_assert_eq!(result, Ok(false), "insert({}, {})", k, v);
                } else if full {
                    prop_assert!(matches!(result, Err(Error::CapacityExceeded(_))), "insert({}, {})", k, v);
                } else {
                    prop_assert_eq!(result, Ok(true), "insert({}, {})", k, v);
                    model.insert(k, v);
                }
            }
            MapOp::InsertOrAssign(k, v) => {
                let result = fixed.insert_or_assign(k, v).map(|(_, inserted)| inserted);
                if full && !model.contains_key(&k) {
                    prop_assert!(result.is_err(), "insert_or_assign({}, {})", k, v);
                } else {
                    prop_assert_eq!(result, Ok(model.insert(k, v).is_none()), "insert_or_assign({}, {})", k, v);
                }
            }
            MapOp::GetOrInsertDefault(k) => {
                let result = fixed.get_or_insert_default(k).map(|v| *v);
                if full && !model.contains_key(&k) {
                    prop_assert!(result.is_err(), "get_or_insert_default({})", k);
                } else {
                    prop_assert_eq!(result, Ok(*model.entry(k).or_default()), "get_or_insert_default({})", k);
                }
            }
            MapOp::EntryAddAssign(k, v) => {
                let result = fixed.entry(k).and_modify(|x| *x = x.wrapping_add(v)).or_insert(v).map(|x| *x);
                if full && !model.contains_key(&k) {
                    prop_assert!(result.is_err(), "entry({})", k);
                } else {
                    let expected = *model.entry(k).and_modify(|x| *x = x.wrapping_add(v)).or_insert(v);
                    prop_assert_eq!(result, Ok(expected), "entry({})", k);
                }
            }
            MapOp::Remove(k) => {
                prop_assert_eq!(fixed.remove(&k), model.remove(&k), "remove({})", k);
            }
            MapOp::Erase(k) => {
                prop_assert_eq!(fixed.erase(&k), usize::from(model.remove(&k).is_some()), "erase({})", k);
            }
            MapOp::EraseRange(start, end) => {
                let expected_next = model.range(end..).next().map(|(k, _)| *k);
                model.retain(|k, _| !(start..end).contains(k));
                let cursor = fixed.erase_range(start..end);
                prop_assert_eq!(cursor.key().copied(), expected_next, "erase_range({}..{})", start, end);
                prop_assert_eq!(cursor.is_past_last(), expected_next.is_none());
            }
            MapOp::RemoveViaCursor(k) => {
                let mut cursor = fixed.find_mut(&k);
                if cursor.is_past_last() {
                    prop_assert!(!model.contains_key(&k), "find_mut({})", k);
                } else {
                    let expected_next = model.range(k + 1..).next().map(|(k, _)| *k);
                    prop_assert_eq!(cursor.remove_current(), (k, model.remove(&k).unwrap_or_default()));
                    prop_assert_eq!(cursor.key().copied(), expected_next, "successor of {}", k);
                }
            }
            MapOp::Get(k) => {
                prop_assert_eq!(fixed.get(&k), model.get(&k), "get({})", k);
                prop_assert_eq!(fixed.count(&k), usize::from(model.contains_key(&k)));
            }
            MapOp::At(k) => match model.get(&k) {
                Some(v) => prop_assert_eq!(fixed.at(&k), Ok(v), "at({})", k),
                None => match fixed.at(&k) {
                    Err(Error::KeyNotFound(error)) => prop_assert_eq!(error.size, model.len()),
                    other => prop_assert!(false, "at({}) returned {:?}", k, other),
                },
            },
            MapOp::PopFirst => {
                prop_assert_eq!(fixed.pop_first(), model.pop_first(), "pop_first");
            }
            MapOp::PopLast => {
                prop_assert_eq!(fixed.pop_last(), model.pop_last(), "pop_last");
            }
        }

        prop_assert_eq!(fixed.len(), model.len(), "len mismatch after {:?}", op);
        prop_assert_eq!(fixed.is_full(), model.len() == CAPACITY);
        prop_assert_eq!(fixed.check_invariants(), Ok(()), "invariants broken after {:?}", op);
    }

    prop_assert!(fixed.iter().eq(model.iter()));
    prop_assert!(fixed.iter().rev().eq(model.iter().rev()));
    Ok(())
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence on both a FixedMap and a BTreeMap and asserts
    /// identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        replay::<EmbeddedColor>(&ops)?;
    }

    /// The packed color layout behaves exactly like the embedded one.
    #[test]
    fn packed_map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        replay::<PackedColor>(&ops)?;
    }

    /// Tests that iteration order matches BTreeMap after random insertions.
    #[test]
    fn iter_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..CAPACITY)) {
        let mut fixed: FixedMap<i64, i64, CAPACITY> = FixedMap::new();
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();

        for &(k, v) in &entries {
            fixed.insert(k, v);
            model.entry(k).or_insert(v);
        }

        prop_assert_eq!(fixed.iter().len(), model.len());
        prop_assert!(fixed.iter().eq(model.iter()));
        prop_assert!(fixed.keys().eq(model.keys()));
        prop_assert!(fixed.values().eq(model.values()));
        prop_assert!(fixed.clone().into_iter().eq(model.clone()));
        prop_assert!(fixed.into_iter().rev().eq(model.into_iter().rev()));
    }

    /// Range iteration agrees with BTreeMap from both ends.
    #[test]
    fn range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..CAPACITY),
        start in key_strategy(),
        width in 0i64..200,
    ) {
        let fixed: FixedMap<i64, i64, CAPACITY> = entries.iter().copied().collect();
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();
        for &(k, v) in &entries {
            model.entry(k).or_insert(v);
        }

        let end = start + width;
        prop_assert!(fixed.range(start..end).eq(model.range(start..end)));
        prop_assert!(fixed.range(start..=end).rev().eq(model.range(start..=end).rev()));
        prop_assert!(fixed.range(..end).eq(model.range(..end)));
        prop_assert!(fixed.range(start..).eq(model.range(start..)));
    }

    /// Retain removes exactly the rejected entries.
    #[test]
    fn retain_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..CAPACITY)) {
        let mut fixed: FixedMap<i64, i64, CAPACITY, Natural, Fallible> =
            FixedMap::<i64, i64, CAPACITY, Natural, Fallible>::from_entries(entries.iter().copied()).unwrap();
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();
        for &(k, v) in &entries {
            model.entry(k).or_insert(v);
        }

        fixed.retain(|k, v| {
            *v = v.wrapping_mul(3);
            k % 3 != 0
        });
        model.retain(|k, v| {
            *v = v.wrapping_mul(3);
            k % 3 != 0
        });

        prop_assert!(fixed.iter().eq(model.iter()));
        prop_assert_eq!(fixed.check_invariants(), Ok(()));
    }

    /// Equal contents hash equally, regardless of insertion order and capacity.
    #[test]
    fn equal_maps_hash_equally(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..64)) {
        let forward: FixedMap<i64, i64, 64> = entries.iter().copied().collect();
        let mut backward: FixedMap<i64, i64, 256, Natural, Fallible, PackedColor> = FixedMap::new();
        for (k, v) in forward.iter().rev() {
            backward.insert(*k, *v).unwrap();
        }

        prop_assert!(forward == backward);

        let mut forward_hasher = DefaultHasher::new();
        let mut backward_hasher = DefaultHasher::new();
        forward.hash(&mut forward_hasher);
        backward.hash(&mut backward_hasher);
        prop_assert_eq!(forward_hasher.finish(), backward_hasher.finish());
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn insert_then_erase_one_key() {
    let mut map: FixedMap<char, i32, 4> = FixedMap::new();
    map.insert('B', 20);
    map.insert('D', 40);
    assert_eq!(map.len(), 2);
    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&'B', &20), (&'D', &40)]);

    assert_eq!(map.erase(&'B'), 1);
    assert!(!map.contains_key(&'B'));
    assert_eq!(map.len(), 1);
}

#[test]
fn iteration_follows_key_order() {
    let mut map: FixedMap<char, i32, 4> = FixedMap::new();
    for (key, value) in [('C', 30), ('D', 40), ('A', 10), ('B', 20)] {
        map.insert(key, value);
    }

    assert_eq!(map.keys().copied().collect::<String>(), "ABCD");
    assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![10, 20, 30, 40]);
    assert_eq!(map.find(&'C').value(), Some(&30));
    assert_eq!(*map.at(&'C'), 30);
}

#[test]
fn duplicate_insert_keeps_original_value() {
    let mut map: FixedMap<&str, i32, 4> = FixedMap::new();
    assert!(map.insert("k", 1).1);

    let (cursor, inserted) = map.insert("k", 2);
    assert!(!inserted);
    assert_eq!(cursor.value(), Some(&1));
    assert_eq!(map["k"], 1);
}

#[test]
fn capacity_boundary_is_reported() {
    let mut map: FixedMap<u32, u32, 8, Natural, Fallible> = FixedMap::new();
    for key in 0..8 {
        map.insert(key, key).unwrap();
    }
    assert!(map.is_full());
    assert_eq!(map.remaining_capacity(), 0);

    match map.insert(8, 8) {
        Err(Error::CapacityExceeded(error)) => assert_eq!(error.capacity, 8),
        other => panic!("expected a capacity error, got {other:?}"),
    }

    // Freeing one slot makes room again.
    map.erase(&3);
    assert!(map.insert(8, 8).unwrap().1);
    map.check_invariants().unwrap();
}

#[test]
#[should_panic(expected = "capacity")]
fn fatal_policy_panics_beyond_capacity() {
    let mut map: FixedMap<u32, u32, 2> = FixedMap::new();
    map.insert(1, 1);
    map.insert(2, 2);
    map.insert(3, 3);
}

#[test]
#[should_panic(expected = "key not found among 1 entries")]
fn fatal_policy_panics_on_missing_key() {
    let map: FixedMap<u32, u32, 2> = FixedMap::from([(1, 1)]);
    let _ = map.at(&2);
}

#[test]
fn reverse_iteration_mirrors_forward() {
    let map: FixedMap<i32, i32, 32> = (0..20).map(|x| ((x * 7) % 20, x)).collect();

    let forward: Vec<_> = map.iter().collect();
    let mut backward: Vec<_> = map.iter().rev().collect();
    backward.reverse();
    assert_eq!(forward, backward);

    // Meeting in the middle yields every entry once.
    let mut iter = map.iter();
    let mut seen = 0;
    while let (Some(_), back) = (iter.next(), iter.next_back()) {
        seen += 1 + usize::from(back.is_some());
    }
    assert_eq!(seen, 20);
}

#[test]
fn equality_ignores_insertion_order_and_capacity() {
    let a: FixedMap<i32, &str, 4> = FixedMap::from([(1, "a"), (2, "b"), (3, "c")]);
    let b: FixedMap<i32, &str, 16> = FixedMap::from([(3, "c"), (1, "a"), (2, "b")]);
    let c: FixedMap<i32, &str, 8> = FixedMap::from([(3, "c"), (1, "a"), (2, "x")]);

    assert!(a == b);
    assert!(b == a);
    assert!(a != c);
}

#[test]
fn erase_range_removes_half_open_range() {
    let mut map: FixedMap<i32, i32, 16> = (0..10).map(|x| (x, x * x)).collect();

    let cursor = map.erase_range(2..5);
    assert_eq!(cursor.key(), Some(&5));
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 1, 5, 6, 7, 8, 9]);

    assert!(map.erase_range(8..).is_past_last());
    assert!(map.erase_range(100..200).is_past_last());
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 1, 5, 6, 7]);
    map.check_invariants().unwrap();
}

#[test]
fn cursor_sentinels_are_distinct_and_absorbing() {
    let map: FixedMap<i32, i32, 4> = FixedMap::from([(1, 10), (2, 20)]);

    let mut cursor = map.cursor_back();
    cursor.advance();
    assert!(cursor.is_past_last());
    cursor.advance();
    assert!(cursor.is_past_last());
    assert_eq!(cursor, map.cursor_past_last());

    let mut cursor = map.cursor_front();
    cursor.recede();
    assert!(cursor.is_before_first());
    cursor.recede();
    assert_eq!(cursor, map.cursor_before_first());
    assert_ne!(map.cursor_before_first(), map.cursor_past_last());

    cursor.advance();
    assert_eq!(cursor.pair().map(|pair| pair.into_tuple()), Some((&1, &10)));

    let empty: FixedMap<i32, i32, 4> = FixedMap::new();
    assert!(empty.cursor_front().is_past_last());
    assert!(empty.cursor_back().is_before_first());
}

#[test]
fn slot_indices_survive_unrelated_deletions() {
    let mut map: FixedMap<i32, i32, 64> = (0..50).map(|x| (x, x)).collect();
    let before: Vec<_> = (0..50).map(|k| map.find(&k).node_index()).collect();

    for key in (0..50).filter(|k| k % 3 == 0) {
        map.erase(&key);
    }
    for key in 100..110 {
        map.insert(key, key);
    }

    for key in (0..50).filter(|k| k % 3 != 0) {
        assert_eq!(map.find(&key).node_index(), before[key as usize], "slot of {key} moved");
    }
}

#[test]
fn cursor_mut_edits_values_in_place() {
    let mut map: FixedMap<i32, String, 8> = (1..=4).map(|x| (x, x.to_string())).collect();

    let mut cursor = map.cursor_front_mut();
    while let Some(mut pair) = cursor.pair_mut() {
        pair.value_mut().push('!');
        cursor.advance();
    }
    assert!(cursor.is_past_last());

    let mut cursor = map.find_mut(&3);
    assert_eq!(cursor.remove_current(), (3, "3!".to_string()));
    assert_eq!(cursor.key(), Some(&4));

    assert_eq!(map.values().cloned().collect::<Vec<_>>(), vec!["1!", "2!", "4!"]);
}

#[test]
fn entry_api_counts_words() {
    let mut count: FixedMap<&str, usize, 8> = FixedMap::new();
    for word in "the cat and the hat and the bat".split(' ') {
        *count.entry(word).or_insert(0) += 1;
    }
    assert_eq!(count["the"], 3);
    assert_eq!(count["and"], 2);

    match count.entry("cat") {
        Entry::Occupied(o) => assert_eq!(o.remove_entry(), ("cat", 1)),
        Entry::Vacant(_) => panic!("cat is present"),
    }
    assert_eq!(count.len(), 4);
}

#[test]
fn custom_comparators_order_entries() {
    let reversed: FixedMap<i32, (), 8, Reverse> = [(1, ()), (3, ()), (2, ())].into_iter().collect();
    assert_eq!(reversed.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
    assert!(reversed.range(3..1).map(|(k, _)| *k).eq([3, 2]));

    let case_insensitive = FnComparator(|a: &&str, b: &&str| a.to_lowercase().cmp(&b.to_lowercase()));
    let mut map: FixedMap<&str, i32, 8, _> = FixedMap::with_comparator(case_insensitive);
    map.insert("b", 1);
    map.insert("A", 2);
    assert!(!map.insert("B", 3).1);
    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&"A", &2), (&"b", &1)]);
}

#[test]
fn empty_map_is_const_constructible() {
    static EMPTY: FixedMap<u8, u8, 16> = FixedMap::new();
    assert!(EMPTY.is_empty());
    assert_eq!(EMPTY.max_size(), 16);
    assert_eq!(EMPTY.first_key_value(), None);
}

thread_local! {
    static COMPARISONS: Cell<usize> = const { Cell::new(0) };
}

fn counting_cmp(a: &i64, b: &i64) -> Ordering {
    COMPARISONS.with(|calls| calls.set(calls.get() + 1));
    a.cmp(b)
}

type Counted = FixedMap<i64, i64, 64, FnComparator<fn(&i64, &i64) -> Ordering>, Fallible>;

fn comparisons_during(f: impl FnOnce()) -> usize {
    COMPARISONS.with(|calls| calls.set(0));
    f();
    COMPARISONS.with(Cell::get)
}

#[test]
fn insertions_descend_the_tree_once() {
    let mut base = Counted::with_comparator(FnComparator(counting_cmp as fn(&i64, &i64) -> Ordering));
    for k in (0..64).step_by(2) {
        base.insert(k, k).unwrap();
    }

    let ops: [(&str, fn(&mut Counted, i64)); 6] = [
        ("insert", |m, k| {
            m.insert(k, -1).unwrap();
        }),
        ("insert_or_assign", |m, k| {
            m.insert_or_assign(k, -1).unwrap();
        }),
        ("try_emplace", |m, k| {
            m.try_emplace(k, || -1).unwrap();
        }),
        ("emplace", |m, k| {
            m.emplace((k, -1)).unwrap();
        }),
        ("entry().or_insert", |m, k| {
            m.entry(k).or_insert(-1).unwrap();
        }),
        ("entry().insert", |m, k| match m.entry(k) {
            Entry::Vacant(vacant) => {
                vacant.insert(-1).unwrap();
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(-1);
            }
        }),
    ];

    // Even keys are present, odd keys and both ends are absent.
    for key in -1..=65 {
        let lookup = comparisons_during(|| {
            base.contains_key(&key);
        });
        for (name, op) in ops {
            let mut map = base.clone();
            let used = comparisons_during(|| op(&mut map, key));
            assert!(used <= lookup, "{name}({key}) compared {used} times, a lookup compares {lookup} times");
            assert!(map.contains_key(&key));
            assert_eq!(map.check_invariants(), Ok(()));
        }
    }
}

/// Reports failures as messages that name the missing key.
struct Describe;

impl CheckingPolicy for Describe {
    type Outcome<T> = Result<T, String>;

    fn success<T>(value: T) -> Result<T, String> {
        Ok(value)
    }

    fn out_of_range<Q: ?Sized + fmt::Debug, T>(key: &Q, error: KeyNotFound) -> Result<T, String> {
        Err(format!("{key:?} not among {} entries", error.size))
    }

    fn capacity_exceeded<T>(error: CapacityExceeded) -> Result<T, String> {
        Err(format!("full at {}", error.capacity))
    }
}

#[test]
fn checking_policy_receives_missing_key() {
    let mut map: FixedMap<&str, u32, 2, Natural, Describe> = FixedMap::new();
    map.insert("a", 1).unwrap();
    assert_eq!(map.at("a"), Ok(&1));
    assert_eq!(map.at("zz"), Err(r#""zz" not among 1 entries"#.to_string()));
    assert_eq!(map.at_mut("b").map(|v| *v), Err(r#""b" not among 1 entries"#.to_string()));

    map.insert("b", 2).unwrap();
    assert_eq!(map.insert("c", 3).map(|(_, inserted)| inserted), Err("full at 2".to_string()));
}

#[test]
#[should_panic(expected = ": -5")]
fn fatal_policy_names_missing_key() {
    let map: FixedMap<i64, i64, 4> = FixedMap::from([(1, 1)]);
    let _ = map.at(&-5);
}
