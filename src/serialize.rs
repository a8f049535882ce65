//! Serde framing for both engines.
//!
//! A `GapList` is written as a plain sequence: element count, then the
//! elements in order. A `BigList` is a pair of its block size and that same
//! element sequence. No layout is persisted; reading replays every element
//! through the normal append path.

use std::fmt;
use std::marker::PhantomData;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use serde::de::DeserializeSeed;
use serde::de::SeqAccess;
use serde::de::Visitor;
use serde::ser::SerializeSeq;
use serde::ser::SerializeTuple;

use crate::big_list::BigList;
use crate::gap_list::GapList;

// --- GapList ---

impl<T: Serialize> Serialize for GapList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for elem in self.iter() {
            seq.serialize_element(elem)?;
        }
        return seq.end();
    }
}

struct GapListVisitor<T> {
    marker: PhantomData<T>,
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for GapListVisitor<T> {
    type Value = GapList<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str("a sequence of elements");
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<GapList<T>, A::Error> {
        // Length prefixes are untrusted.
        let capacity = seq.size_hint().unwrap_or(0).min(4096);
        let mut list = GapList::with_capacity(capacity);
        while let Some(elem) = seq.next_element()? {
            let at = list.len();
            list.do_insert(at, elem);
        }
        return Ok(list);
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for GapList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<GapList<T>, D::Error> {
        return deserializer.deserialize_seq(GapListVisitor { marker: PhantomData });
    }
}

// --- BigList ---

struct Elements<'a, T> {
    list: &'a BigList<T>,
}

impl<T: Serialize> Serialize for Elements<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.list.len()))?;
        for elem in self.list.iter() {
            seq.serialize_element(elem)?;
        }
        return seq.end();
    }
}

impl<T: Serialize> Serialize for BigList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.block_size())?;
        tuple.serialize_element(&Elements { list: self })?;
        return tuple.end();
    }
}

/// Appends a serialized element sequence to an existing list.
struct AppendElements<'a, T> {
    list: &'a mut BigList<T>,
}

impl<'de, T> DeserializeSeed<'de> for AppendElements<'_, T>
where
    T: Deserialize<'de> + Clone,
{
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        return deserializer.deserialize_seq(self);
    }
}

impl<'de, T> Visitor<'de> for AppendElements<'_, T>
where
    T: Deserialize<'de> + Clone,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str("a sequence of elements");
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        while let Some(elem) = seq.next_element()? {
            let at = self.list.len();
            self.list.do_insert(at, elem);
        }
        return Ok(());
    }
}

struct BigListVisitor<T> {
    marker: PhantomData<T>,
}

impl<'de, T> Visitor<'de> for BigListVisitor<T>
where
    T: Deserialize<'de> + Clone,
{
    type Value = BigList<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str("a block size followed by a sequence of elements");
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<BigList<T>, A::Error> {
        let block_size: usize = match seq.next_element()? {
            Some(block_size) => block_size,
            None => return Err(de::Error::invalid_length(0, &self)),
        };
        if block_size == 0 {
            return Err(de::Error::invalid_value(
                de::Unexpected::Unsigned(0),
                &"a positive block size",
            ));
        }
        let mut list = BigList::with_block_size(block_size);
        if seq.next_element_seed(AppendElements { list: &mut list })?.is_none() {
            return Err(de::Error::invalid_length(1, &self));
        }
        return Ok(list);
    }
}

impl<'de, T> Deserialize<'de> for BigList<T>
where
    T: Deserialize<'de> + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<BigList<T>, D::Error> {
        return deserializer.deserialize_tuple(2, BigListVisitor { marker: PhantomData });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sequence::Sequence;

    #[test]
    fn gap_list_framing() {
        let mut list: GapList<i32> = (0..6).collect();
        list.insert(3, 99).unwrap();
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, "[0,1,2,99,3,4,5]");
        let back: GapList<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
        back.check_invariants();
    }

    #[test]
    fn big_list_framing() {
        let list: BigList<u32> = {
            let mut list = BigList::with_block_size(4);
            list.extend(0..10);
            list
        };
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, "[4,[0,1,2,3,4,5,6,7,8,9]]");
        let back: BigList<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.block_size(), 4);
        assert_eq!(back, list);
        back.check_invariants();
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let result: Result<BigList<u32>, _> = serde_json::from_str("[0,[1,2]]");
        assert!(result.is_err());
    }

    #[test]
    fn missing_elements_are_rejected() {
        let result: Result<BigList<u32>, _> = serde_json::from_str("[8]");
        assert!(result.is_err());
    }
}
