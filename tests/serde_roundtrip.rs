//! Serialization round trips through `serde_json`.

#![cfg(feature = "serde")]

use biglist::BigList;
use biglist::GapList;
use biglist::Sequence;
use proptest::prelude::*;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Document {
    title: String,
    lines: BigList<String>,
    marks: GapList<u32>,
}

#[test]
fn nested_in_a_struct() {
    let mut lines = BigList::with_block_size(3);
    for i in 0..10 {
        lines.push(format!("line {}", i)).unwrap();
    }
    lines.insert(4, "inserted".to_string()).unwrap();
    let mut marks = GapList::new();
    marks.push_front(2).unwrap();
    marks.push_front(1).unwrap();
    marks.push(3).unwrap();

    let doc = Document {
        title: "notes".to_string(),
        lines,
        marks,
    };
    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.lines.block_size(), 3);
    back.lines.check_invariants();
    back.marks.check_invariants();
}

#[test]
fn layout_is_not_persisted() {
    let mut list: GapList<i32> = (0..10).collect();
    list.remove(5).unwrap();
    assert!(list.gap_len() > 0);
    let back: GapList<i32> = serde_json::from_str(&serde_json::to_string(&list).unwrap()).unwrap();
    assert_eq!(back, list);
    assert_eq!(back.gap_len(), 0);
}

#[test]
fn empty_lists() {
    let empty: BigList<u8> = BigList::with_block_size(7);
    let json = serde_json::to_string(&empty).unwrap();
    assert_eq!(json, "[7,[]]");
    let back: BigList<u8> = serde_json::from_str(&json).unwrap();
    assert!(back.is_empty());
    assert_eq!(back.block_size(), 7);
}

#[test]
fn largest_block_size_is_accepted() {
    let mut list: BigList<u8> = serde_json::from_str("[18446744073709551615,[1,2]]").unwrap();
    assert_eq!(list.block_size(), u64::MAX as usize);
    list.push(3).unwrap();
    list.insert(1, 9).unwrap();
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 9, 2, 3]);
    assert_eq!(serde_json::to_string(&list).unwrap(), "[18446744073709551615,[1,9,2,3]]");
    list.check_invariants();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn big_list_round_trip(
        block_size in 1usize..20,
        values in prop::collection::vec(any::<i64>(), 0..200),
    ) {
        let mut list = BigList::with_block_size(block_size);
        list.insert_all(0, values.clone()).unwrap();
        let json = serde_json::to_string(&list).unwrap();
        let back: BigList<i64> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.iter().copied().collect::<Vec<_>>(), values);
        prop_assert_eq!(&back, &list);
        back.check_invariants();
    }
}
