//! Property-based tests: both engines against a `Vec` reference.

use biglist::BigList;
use biglist::GapList;
use biglist::Sequence;
use proptest::prelude::*;

// =============================================================================
// Test helpers
// =============================================================================

/// One edit. Positions are fractions of the current length.
#[derive(Clone, Debug)]
enum Op {
    Insert { at: f64, value: i32 },
    Remove { at: f64 },
    Set { at: f64, value: i32 },
    Push(i32),
    PushFront(i32),
    Pop,
    PopFront,
    InsertAll { at: f64, values: Vec<i32> },
    RemoveRange { at: f64, len: f64 },
    SortRange { at: f64, len: f64 },
    ReverseRange { at: f64, len: f64 },
    RotateRange { at: f64, len: f64, distance: isize },
    FillRange { at: f64, len: f64, value: i32 },
    DrainRange { at: f64, len: f64 },
    /// Drop every element divisible by `modulus`.
    Retain { modulus: i32 },
    LastIndexOf { at: f64 },
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0.0..=1.0f64, 0..1000i32).prop_map(|(at, value)| Op::Insert { at, value }),
        3 => (0.0..=1.0f64).prop_map(|at| Op::Remove { at }),
        2 => (0.0..=1.0f64, 0..1000i32).prop_map(|(at, value)| Op::Set { at, value }),
        3 => (0..1000i32).prop_map(Op::Push),
        2 => (0..1000i32).prop_map(Op::PushFront),
        1 => Just(Op::Pop),
        1 => Just(Op::PopFront),
        2 => (0.0..=1.0f64, prop::collection::vec(0..1000i32, 0..40))
            .prop_map(|(at, values)| Op::InsertAll { at, values }),
        1 => (0.0..=1.0f64, 0.0..=0.6f64).prop_map(|(at, len)| Op::RemoveRange { at, len }),
        1 => (0.0..=1.0f64, 0.0..=1.0f64).prop_map(|(at, len)| Op::SortRange { at, len }),
        1 => (0.0..=1.0f64, 0.0..=1.0f64).prop_map(|(at, len)| Op::ReverseRange { at, len }),
        1 => (0.0..=1.0f64, 0.0..=1.0f64, -60..60isize)
            .prop_map(|(at, len, distance)| Op::RotateRange { at, len, distance }),
        1 => (0.0..=1.0f64, 0.0..=0.5f64, 0..1000i32).prop_map(|(at, len, value)| Op::FillRange { at, len, value }),
        1 => (0.0..=1.0f64, 0.0..=0.6f64).prop_map(|(at, len)| Op::DrainRange { at, len }),
        1 => (2..8i32).prop_map(|modulus| Op::Retain { modulus }),
        1 => (0.0..=1.0f64).prop_map(|at| Op::LastIndexOf { at }),
    ]
}

/// Scale `fraction` onto `0..=bound`.
fn pick(fraction: f64, bound: usize) -> usize {
    return ((fraction * bound as f64) as usize).min(bound);
}

fn pick_range(at: f64, len: f64, total: usize) -> std::ops::Range<usize> {
    let start = pick(at, total);
    let end = start + pick(len, total - start);
    return start..end;
}

fn apply<S: Sequence<i32>>(seq: &mut S, reference: &mut Vec<i32>, op: &Op) {
    let len = reference.len();
    match op {
        Op::Insert { at, value } => {
            let index = pick(*at, len);
            seq.insert(index, *value).unwrap();
            reference.insert(index, *value);
        }
        Op::Remove { at } => {
            if len == 0 {
                assert!(seq.remove(0).is_err());
                return;
            }
            let index = pick(*at, len - 1);
            assert_eq!(seq.remove(index).unwrap(), reference.remove(index));
        }
        Op::Set { at, value } => {
            if len == 0 {
                assert!(seq.set(0, *value).is_err());
                return;
            }
            let index = pick(*at, len - 1);
            let old = std::mem::replace(&mut reference[index], *value);
            assert_eq!(seq.set(index, *value).unwrap(), old);
        }
        Op::Push(value) => {
            seq.push(*value).unwrap();
            reference.push(*value);
        }
        Op::PushFront(value) => {
            seq.push_front(*value).unwrap();
            reference.insert(0, *value);
        }
        Op::Pop => {
            assert_eq!(seq.pop().unwrap(), reference.pop());
        }
        Op::PopFront => {
            let expected = if reference.is_empty() { None } else { Some(reference.remove(0)) };
            assert_eq!(seq.pop_front().unwrap(), expected);
        }
        Op::InsertAll { at, values } => {
            let index = pick(*at, len);
            seq.insert_all(index, values.clone()).unwrap();
            reference.splice(index..index, values.iter().copied());
        }
        Op::RemoveRange { at, len: fraction } => {
            let range = pick_range(*at, *fraction, len);
            seq.remove_range(range.clone()).unwrap();
            reference.drain(range);
        }
        Op::SortRange { at, len: fraction } => {
            let range = pick_range(*at, *fraction, len);
            seq.sort_range_by(range.clone(), |a, b| a.cmp(b)).unwrap();
            reference[range].sort();
        }
        Op::ReverseRange { at, len: fraction } => {
            let range = pick_range(*at, *fraction, len);
            seq.reverse_range(range.clone()).unwrap();
            reference[range].reverse();
        }
        Op::RotateRange { at, len: fraction, distance } => {
            let range = pick_range(*at, *fraction, len);
            seq.rotate_range(range.clone(), *distance).unwrap();
            if range.len() > 1 {
                let shift = distance.rem_euclid(range.len() as isize) as usize;
                reference[range].rotate_right(shift);
            }
        }
        Op::FillRange { at, len: fraction, value } => {
            let range = pick_range(*at, *fraction, len);
            seq.fill_range(range.clone(), *value).unwrap();
            reference[range].fill(*value);
        }
        Op::DrainRange { at, len: fraction } => {
            let range = pick_range(*at, *fraction, len);
            let drained = seq.drain_range(range.clone()).unwrap();
            assert_eq!(drained, reference.drain(range).collect::<Vec<_>>());
        }
        Op::Retain { modulus } => {
            let removed = seq.retain(|x| x % modulus != 0).unwrap();
            reference.retain(|x| x % modulus != 0);
            assert_eq!(removed, len - reference.len());
        }
        Op::LastIndexOf { at } => {
            if len == 0 {
                assert_eq!(seq.last_index_of(&0), None);
                return;
            }
            let value = reference[pick(*at, len - 1)];
            assert_eq!(seq.last_index_of(&value), reference.iter().rposition(|&x| x == value));
            assert_eq!(seq.index_of(&value), reference.iter().position(|&x| x == value));
        }
    }
}

fn contents<S: Sequence<i32>>(seq: &S) -> Vec<i32> {
    return (0..seq.len()).map(|i| *seq.get(i).unwrap()).collect();
}

/// Number of maximal runs of empty slots, treating the array as circular.
fn empty_runs(occupied: &[bool]) -> usize {
    if occupied.is_empty() {
        return 0;
    }
    if occupied.iter().all(|&slot| !slot) {
        return 1;
    }
    let n = occupied.len();
    return (0..n).filter(|&i| !occupied[i] && occupied[(i + n - 1) % n]).count();
}

// =============================================================================
// Reference equivalence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn gap_list_matches_vec(ops in prop::collection::vec(arbitrary_op(), 1..120)) {
        let mut list = GapList::new();
        let mut reference = Vec::new();
        for op in &ops {
            apply(&mut list, &mut reference, op);
            list.check_invariants();
        }
        prop_assert_eq!(contents(&list), reference.clone());
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), reference.clone());
        prop_assert_eq!(list.iter().rev().count(), reference.len());
    }

    #[test]
    fn big_list_matches_vec(
        block_size in 1usize..12,
        ops in prop::collection::vec(arbitrary_op(), 1..120),
    ) {
        let mut list = BigList::with_block_size(block_size);
        let mut reference = Vec::new();
        for op in &ops {
            apply(&mut list, &mut reference, op);
            list.check_invariants();
        }
        prop_assert_eq!(contents(&list), reference.clone());
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), reference.clone());
        prop_assert_eq!(list.block_sizes().iter().sum::<usize>(), reference.len());
    }

    /// Random access after sequential access must not trust a stale window.
    #[test]
    fn big_list_random_reads(
        block_size in 2usize..16,
        len in 0usize..300,
        reads in prop::collection::vec(0.0..1.0f64, 1..60),
    ) {
        let mut list = BigList::with_block_size(block_size);
        for i in 0..len {
            list.push(i as i32).unwrap();
        }
        for fraction in reads {
            if len == 0 {
                prop_assert_eq!(list.get(0), None);
                continue;
            }
            let index = pick(fraction, len - 1);
            prop_assert_eq!(list.get(index), Some(&(index as i32)));
        }
        list.check_invariants();
    }
}

// =============================================================================
// Copy-on-write isolation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    #[test]
    fn clone_is_isolated_from_edits(
        block_size in 1usize..10,
        setup in prop::collection::vec(arbitrary_op(), 0..60),
        edits in prop::collection::vec(arbitrary_op(), 1..60),
    ) {
        let mut original = BigList::with_block_size(block_size);
        let mut reference = Vec::new();
        for op in &setup {
            apply(&mut original, &mut reference, op);
        }

        let mut copy = original.clone();
        prop_assert_eq!(original.shared_block_count(), original.block_count());
        prop_assert_eq!(&copy, &original);

        let mut copy_reference = reference.clone();
        for op in &edits {
            apply(&mut copy, &mut copy_reference, op);
        }
        prop_assert_eq!(contents(&original), reference.clone());
        prop_assert_eq!(contents(&copy), copy_reference.clone());

        // And the other way around.
        let snapshot = copy_reference.clone();
        for op in &edits {
            apply(&mut original, &mut reference, op);
        }
        prop_assert_eq!(contents(&copy), snapshot);
        prop_assert_eq!(contents(&original), reference);

        original.check_invariants();
        copy.check_invariants();
    }
}

// =============================================================================
// Gap integrity
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn gap_stays_one_region(ops in prop::collection::vec(arbitrary_op(), 1..150)) {
        let mut list = GapList::new();
        let mut reference = Vec::new();
        for op in &ops {
            apply(&mut list, &mut reference, op);
            let occupied = list.occupied_slots();
            prop_assert_eq!(occupied.len(), list.capacity());
            prop_assert_eq!(occupied.iter().filter(|&&slot| slot).count(), list.len());
            let limit = if list.gap_len() == 0 { 1 } else { 2 };
            prop_assert!(empty_runs(&occupied) <= limit);
        }
    }

    #[test]
    fn trim_and_normalize_are_idempotent(ops in prop::collection::vec(arbitrary_op(), 1..80)) {
        let mut list = GapList::new();
        let mut reference = Vec::new();
        for op in &ops {
            apply(&mut list, &mut reference, op);
        }

        list.normalize();
        let once = (list.capacity(), list.occupied_slots());
        list.normalize();
        prop_assert_eq!((list.capacity(), list.occupied_slots()), once);

        list.trim_to_size().unwrap();
        let once = (list.capacity(), list.occupied_slots());
        list.trim_to_size().unwrap();
        prop_assert_eq!((list.capacity(), list.occupied_slots()), once);
        prop_assert_eq!(list.capacity(), reference.len());
        prop_assert_eq!(contents(&list), reference);
    }
}
