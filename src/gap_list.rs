//! Gap List
//!
//! A circular array with one relocatable free region (the gap). Edits
//! close to the previous edit only move the elements between the gap and
//! the new position, so localized editing is O(1) amortized while random
//! access stays O(1).
//!
//! Layout, for a buffer of capacity `cap`:
//! - Logical element `i` lives at physical slot
//!   `(start + i + (i >= gap_index ? gap_size : 0)) % cap`.
//! - The occupied span starts at `start` and covers `size + gap_size`
//!   slots. Everything outside it is the head/tail free region.
//! - When present, the gap sits strictly inside the data
//!   (`0 < gap_index < size`). A gap that would touch either end is folded
//!   into the free region instead.
//! - Every slot that does not hold an element holds `None`, so removed
//!   elements are dropped immediately.
//!
//! Operations:
//! - get/set: O(1)
//! - insert/remove at either end: O(1) amortized
//! - insert/remove at the gap: O(1)
//! - insert/remove elsewhere: O(distance to the gap, the head or the tail,
//!   whichever is smallest)

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Index;
use std::ops::Range;

use tracing::trace;

use crate::error::Result;
use crate::error::check_index;
use crate::error::check_insert_index;
use crate::error::check_range;
use crate::sequence::Sequence;
use crate::sequence::SequenceFactory;

/// Capacity floor applied whenever the buffer grows.
pub const DEFAULT_CAPACITY: usize = 10;

/// A gap-buffer sequence over a circular array.
pub struct GapList<T> {
    /// Slot array; its length is the capacity.
    values: Vec<Option<T>>,
    /// Physical slot of logical element 0.
    start: usize,
    /// Number of elements.
    size: usize,
    /// Number of slots in the gap (0 = no gap).
    gap_size: usize,
    /// Logical index the gap sits before. Meaningless when `gap_size == 0`.
    gap_index: usize,
    /// Which end of the gap absorbs the next insertion at `gap_index`.
    /// `true` keeps the gap in front of the new element (repeated inserts
    /// at one index), `false` moves it behind (inserts walking forward).
    gap_add_right: bool,
}

fn occupied<T>(slot: &Option<T>) -> &T {
    match slot {
        Some(elem) => return elem,
        None => panic!("gap list slot read as an element but holds none"),
    }
}

impl<T> GapList<T> {
    /// Create an empty list. No storage is allocated until the first insert.
    pub fn new() -> GapList<T> {
        return GapList::with_capacity(0);
    }

    /// Create an empty list with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> GapList<T> {
        let mut values = Vec::with_capacity(capacity);
        values.resize_with(capacity, || None);
        return GapList {
            values,
            start: 0,
            size: 0,
            gap_size: 0,
            gap_index: 0,
            gap_add_right: false,
        };
    }

    /// Take ownership of `vec` without copying the elements twice.
    pub fn from_vec(vec: Vec<T>) -> GapList<T> {
        let size = vec.len();
        return GapList {
            values: vec.into_iter().map(Some).collect(),
            start: 0,
            size,
            gap_size: 0,
            gap_index: 0,
            gap_add_right: false,
        };
    }

    pub fn len(&self) -> usize {
        return self.size;
    }

    pub fn is_empty(&self) -> bool {
        return self.size == 0;
    }

    pub fn capacity(&self) -> usize {
        return self.values.len();
    }

    /// Size of the gap. Zero when the data is contiguous.
    pub fn gap_len(&self) -> usize {
        return self.gap_size;
    }

    /// Occupancy of each physical slot, in physical order.
    ///
    /// Exposes the layout for diagnostics; callers never need it for
    /// correctness.
    pub fn occupied_slots(&self) -> Vec<bool> {
        return self.values.iter().map(Option::is_some).collect();
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        return self.values[self.physical(index)].as_ref();
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.size {
            return None;
        }
        let phys = self.physical(index);
        return self.values[phys].as_mut();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        return Iter {
            list: self,
            front: 0,
            back: self.size,
        };
    }

    // --- Layout helpers ---

    #[inline]
    fn physical(&self, index: usize) -> usize {
        let mut offset = self.start + index;
        if self.gap_size > 0 && index >= self.gap_index {
            offset += self.gap_size;
        }
        return offset % self.values.len();
    }

    /// Physical slot one past the last element.
    #[inline]
    fn end(&self) -> usize {
        return (self.start + self.size + self.gap_size) % self.values.len();
    }

    /// Physical slot of the first gap slot.
    #[inline]
    fn gap_start(&self) -> usize {
        return (self.start + self.gap_index) % self.values.len();
    }

    /// Slots in the head/tail free region.
    #[inline]
    fn free(&self) -> usize {
        return self.values.len() - self.size - self.gap_size;
    }

    /// Move `count` physically consecutive slots starting at `from` forward
    /// by `by` slots. Vacated slots are left as `None`.
    fn shift_forward(&mut self, from: usize, count: usize, by: usize) {
        let cap = self.values.len();
        for j in (0..count).rev() {
            let src = (from + j) % cap;
            let dst = (from + j + by) % cap;
            self.values[dst] = self.values[src].take();
        }
    }

    /// Move `count` physically consecutive slots starting at `from` back
    /// by `by` slots. Vacated slots are left as `None`.
    fn shift_backward(&mut self, from: usize, count: usize, by: usize) {
        let cap = self.values.len();
        for j in 0..count {
            let src = (from + j) % cap;
            let dst = (from + j + cap - by) % cap;
            self.values[dst] = self.values[src].take();
        }
    }

    /// Relocate the existing gap so that it sits before logical `index`.
    /// Only the elements between the old and new position move.
    fn move_gap_to(&mut self, index: usize) {
        let gap = self.gap_size;
        if index < self.gap_index {
            let from = self.physical(index);
            self.shift_forward(from, self.gap_index - index, gap);
        } else if index > self.gap_index {
            let from = self.physical(self.gap_index);
            self.shift_backward(from, index - self.gap_index, gap);
        }
        self.gap_index = index;
    }

    /// Fold a gap that touches either end into the free region.
    fn absorb_gap(&mut self) {
        if self.gap_size > 0 {
            if self.gap_index == 0 {
                self.start = (self.start + self.gap_size) % self.values.len();
                self.gap_size = 0;
            } else if self.gap_index == self.size {
                self.gap_size = 0;
            }
        }
        if self.gap_size == 0 {
            self.gap_index = 0;
        }
    }

    /// Remove the gap, moving whichever side of it is shorter.
    fn close_gap(&mut self) {
        if self.gap_size == 0 {
            return;
        }
        if self.gap_index <= self.size - self.gap_index {
            self.move_gap_to(0);
        } else {
            self.move_gap_to(self.size);
        }
        self.absorb_gap();
    }

    /// Turn the whole free region into a gap before logical `index`,
    /// moving the shorter side of the data. Requires no gap and free slots.
    fn open_gap(&mut self, index: usize) {
        let cap = self.values.len();
        let free = self.free();
        if index <= self.size - index {
            self.shift_backward(self.start, index, free);
            self.start = (self.start + cap - free) % cap;
        } else {
            let from = (self.start + index) % cap;
            self.shift_forward(from, self.size - index, free);
        }
        self.gap_index = index;
        self.gap_size = free;
    }

    /// Claim one gap slot for an element inserted at `gap_index`.
    fn consume_gap_slot(&mut self) -> usize {
        let cap = self.values.len();
        let phys;
        if self.gap_add_right {
            phys = (self.gap_start() + self.gap_size - 1) % cap;
        } else {
            phys = self.gap_start();
            self.gap_index += 1;
        }
        self.gap_size -= 1;
        return phys;
    }

    /// Copy the elements into a fresh flat array of `capacity` slots.
    fn rebuild(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.size);
        let mut values = Vec::with_capacity(capacity);
        for index in 0..self.size {
            let phys = self.physical(index);
            values.push(self.values[phys].take());
        }
        values.resize_with(capacity, || None);
        self.values = values;
        self.start = 0;
        self.gap_size = 0;
        self.gap_index = 0;
    }

    fn grow(&mut self, min_capacity: usize) {
        let old = self.values.len();
        let new = DEFAULT_CAPACITY.max(old + old / 2).max(min_capacity);
        trace!(old, new, len = self.size, "gap list grow");
        self.rebuild(new);
    }

    /// Flatten the layout: elements in `values[0..len]`, no gap.
    pub fn normalize(&mut self) {
        if self.start == 0 && self.gap_size == 0 {
            return;
        }
        trace!(len = self.size, gap = self.gap_size, "gap list normalize");
        let capacity = self.values.len();
        self.rebuild(capacity);
    }

    // --- Core operations ---

    pub(crate) fn do_insert(&mut self, index: usize, elem: T) {
        if self.size == self.values.len() {
            self.grow(self.size + 1);
        }
        let cap = self.values.len();
        let free = self.free();
        let phys;

        if index == self.size && free > 0 {
            phys = self.end();
        } else if index == 0 && free > 0 {
            self.start = (self.start + cap - 1) % cap;
            phys = self.start;
            if self.gap_size > 0 {
                self.gap_index += 1;
            }
        } else if self.gap_size > 0 && index == self.gap_index {
            self.gap_add_right = index + 1 == self.gap_index;
            phys = self.consume_gap_slot();
        } else if self.gap_size == 0 {
            self.open_gap(index);
            self.gap_add_right = false;
            phys = self.consume_gap_slot();
        } else {
            self.gap_add_right = index + 1 == self.gap_index;
            let gap_cost = index.abs_diff(self.gap_index);
            if free > 0 && index < self.gap_index && index < gap_cost {
                // Shift the head back by one slot instead.
                self.shift_backward(self.start, index, 1);
                self.start = (self.start + cap - 1) % cap;
                self.gap_index += 1;
                phys = (self.start + index) % cap;
            } else if free > 0 && index > self.gap_index && self.size - index < gap_cost {
                // Shift the tail forward by one slot instead.
                phys = self.physical(index);
                self.shift_forward(phys, self.size - index, 1);
            } else {
                self.move_gap_to(index);
                phys = self.consume_gap_slot();
            }
        }

        self.values[phys] = Some(elem);
        self.size += 1;
        self.absorb_gap();
        self.debug_check();
    }

    pub(crate) fn do_remove(&mut self, index: usize) -> T {
        let cap = self.values.len();
        let phys;

        if index == self.size - 1 {
            phys = self.physical(index);
        } else if index == 0 {
            phys = self.start;
            self.start = (self.start + 1) % cap;
            if self.gap_size > 0 {
                self.gap_index -= 1;
            }
        } else if self.gap_size == 0 {
            phys = self.physical(index);
            self.gap_index = index;
            self.gap_size = 1;
        } else if index == self.gap_index {
            phys = self.physical(index);
            self.gap_size += 1;
        } else if index + 1 == self.gap_index {
            phys = self.physical(index);
            self.gap_index -= 1;
            self.gap_size += 1;
        } else {
            let gap_cost = index.abs_diff(self.gap_index);
            if index < self.gap_index && index < gap_cost {
                // Close the hole by moving the head up one slot.
                phys = self.physical(index);
                let elem = self.values[phys].take();
                self.shift_forward(self.start, index, 1);
                self.start = (self.start + 1) % cap;
                self.gap_index -= 1;
                return self.finish_remove(elem);
            } else if index > self.gap_index && self.size - 1 - index < gap_cost {
                // Close the hole by moving the tail down one slot.
                phys = self.physical(index);
                let elem = self.values[phys].take();
                self.shift_backward((phys + 1) % cap, self.size - 1 - index, 1);
                return self.finish_remove(elem);
            } else {
                self.move_gap_to(index);
                phys = self.physical(index);
                self.gap_size += 1;
            }
        }

        let elem = self.values[phys].take();
        return self.finish_remove(elem);
    }

    fn finish_remove(&mut self, elem: Option<T>) -> T {
        self.size -= 1;
        self.absorb_gap();
        if self.size == 0 {
            self.start = 0;
        }
        self.debug_check();
        match elem {
            Some(elem) => return elem,
            None => panic!("gap list removed an empty slot"),
        }
    }

    pub(crate) fn do_insert_all(&mut self, index: usize, items: Vec<T>) {
        let count = items.len();
        if count == 0 {
            return;
        }
        if self.size + count > self.values.len() {
            self.grow(self.size + count);
        }
        self.close_gap();
        let cap = self.values.len();
        if index <= self.size - index {
            self.shift_backward(self.start, index, count);
            self.start = (self.start + cap - count) % cap;
        } else {
            let from = (self.start + index) % cap;
            self.shift_forward(from, self.size - index, count);
        }
        for (offset, item) in items.into_iter().enumerate() {
            self.values[(self.start + index + offset) % cap] = Some(item);
        }
        self.size += count;
        self.debug_check();
    }

    pub(crate) fn do_set(&mut self, index: usize, elem: T) -> T {
        let phys = self.physical(index);
        return occupied_owned(self.values[phys].replace(elem));
    }

    /// Remove the elements in `range` and return them in order.
    pub fn drain_range(&mut self, range: Range<usize>) -> Result<Vec<T>> {
        check_range(range.start, range.end, self.size)?;
        return Ok(self.do_drain(range));
    }

    pub(crate) fn do_drain(&mut self, range: Range<usize>) -> Vec<T> {
        let count = range.len();
        if count == 0 {
            return Vec::new();
        }
        if count == 1 {
            return vec![self.do_remove(range.start)];
        }
        self.close_gap();
        let cap = self.values.len();
        let mut removed = Vec::with_capacity(count);
        for index in range.clone() {
            let elem = self.values[(self.start + index) % cap].take();
            removed.push(occupied_owned(elem));
        }
        if range.start <= self.size - range.end {
            self.shift_forward(self.start, range.start, count);
            self.start = (self.start + count) % cap;
        } else {
            let from = (self.start + range.end) % cap;
            self.shift_backward(from, self.size - range.end, count);
        }
        self.size -= count;
        if self.size == 0 {
            self.start = 0;
        }
        self.debug_check();
        return removed;
    }

    /// Move every element out, leaving the list empty.
    pub fn take_all(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.size);
        for index in 0..self.size {
            let phys = self.physical(index);
            out.push(occupied_owned(self.values[phys].take()));
        }
        self.size = 0;
        self.start = 0;
        self.gap_size = 0;
        self.gap_index = 0;
        return out;
    }

    // --- Invariant checking ---

    /// Walk every slot and panic if the layout is inconsistent.
    ///
    /// O(capacity). Intended for tests and development builds only.
    pub fn check_invariants(&self) {
        let cap = self.values.len();
        assert!(
            self.size + self.gap_size <= cap,
            "INVARIANT VIOLATED: size={} + gap={} > capacity={}",
            self.size, self.gap_size, cap
        );
        if cap == 0 {
            return;
        }
        assert!(self.start < cap, "INVARIANT VIOLATED: start={} >= capacity={}", self.start, cap);
        if self.gap_size > 0 {
            assert!(
                self.gap_index > 0 && self.gap_index < self.size,
                "INVARIANT VIOLATED: gap_index={} touches an end (size={})",
                self.gap_index, self.size
            );
        }

        let mut is_element = vec![false; cap];
        for index in 0..self.size {
            let phys = self.physical(index);
            assert!(!is_element[phys], "INVARIANT VIOLATED: slot {} mapped twice", phys);
            assert!(self.values[phys].is_some(), "INVARIANT VIOLATED: element {} at empty slot {}", index, phys);
            is_element[phys] = true;
        }
        for offset in 0..self.gap_size {
            let phys = (self.gap_start() + offset) % cap;
            assert!(!is_element[phys], "INVARIANT VIOLATED: gap slot {} holds an element", phys);
        }
        let occupied_count = self.values.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(
            occupied_count, self.size,
            "INVARIANT VIOLATED: {} occupied slots != size {}",
            occupied_count, self.size
        );
    }

    #[cfg(feature = "check-invariants")]
    fn debug_check(&self) {
        self.check_invariants();
    }

    #[cfg(not(feature = "check-invariants"))]
    #[inline(always)]
    fn debug_check(&self) {}
}

fn occupied_owned<T>(slot: Option<T>) -> T {
    match slot {
        Some(elem) => return elem,
        None => panic!("gap list slot moved out as an element but holds none"),
    }
}

impl<T> Sequence<T> for GapList<T> {
    fn len(&self) -> usize {
        return self.size;
    }

    fn capacity(&self) -> usize {
        return self.values.len();
    }

    fn get(&self, index: usize) -> Option<&T> {
        return GapList::get(self, index);
    }

    fn set(&mut self, index: usize, elem: T) -> Result<T> {
        check_index(index, self.size)?;
        return Ok(self.do_set(index, elem));
    }

    fn insert(&mut self, index: usize, elem: T) -> Result<()> {
        check_insert_index(index, self.size)?;
        self.do_insert(index, elem);
        return Ok(());
    }

    fn remove(&mut self, index: usize) -> Result<T> {
        check_index(index, self.size)?;
        return Ok(self.do_remove(index));
    }

    fn insert_all<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        check_insert_index(index, self.size)?;
        let mut items: Vec<T> = items.into_iter().collect();
        match items.len() {
            0 => {}
            1 => {
                if let Some(item) = items.pop() {
                    self.do_insert(index, item);
                }
            }
            _ => self.do_insert_all(index, items),
        }
        return Ok(());
    }

    fn remove_range(&mut self, range: Range<usize>) -> Result<()> {
        check_range(range.start, range.end, self.size)?;
        self.do_drain(range);
        return Ok(());
    }

    fn drain_range(&mut self, range: Range<usize>) -> Result<Vec<T>>
    where
        T: Clone,
    {
        return GapList::drain_range(self, range);
    }

    /// Compacts the survivors into a flat layout in one pass.
    fn retain<F>(&mut self, mut keep: F) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.size;
        for elem in self.take_all() {
            if keep(&elem) {
                self.values[self.size] = Some(elem);
                self.size += 1;
            }
        }
        self.debug_check();
        return Ok(before - self.size);
    }

    fn sort_range_by<F>(&mut self, range: Range<usize>, mut compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        check_range(range.start, range.end, self.size)?;
        if range.len() < 2 {
            return Ok(());
        }
        self.normalize();
        self.values[range].sort_by(|a, b| compare(occupied(a), occupied(b)));
        return Ok(());
    }

    fn ensure_capacity(&mut self, min_capacity: usize) -> Result<()> {
        if min_capacity > self.values.len() {
            self.grow(min_capacity);
        }
        return Ok(());
    }

    fn trim_to_size(&mut self) -> Result<()> {
        if self.values.len() == self.size && self.start == 0 && self.gap_size == 0 {
            return Ok(());
        }
        trace!(capacity = self.values.len(), len = self.size, "gap list trim");
        self.rebuild(self.size);
        return Ok(());
    }

    fn clear(&mut self) -> Result<()> {
        for slot in self.values.iter_mut() {
            *slot = None;
        }
        self.size = 0;
        self.start = 0;
        self.gap_size = 0;
        self.gap_index = 0;
        return Ok(());
    }

    fn swap(&mut self, a: usize, b: usize) -> Result<()>
    where
        T: Clone,
    {
        check_index(a, self.size)?;
        check_index(b, self.size)?;
        let (pa, pb) = (self.physical(a), self.physical(b));
        self.values.swap(pa, pb);
        return Ok(());
    }
}

impl<T> SequenceFactory<T> for GapList<T> {
    fn empty_like(&self, capacity: usize) -> GapList<T> {
        return GapList::with_capacity(capacity);
    }
}

impl<T> Default for GapList<T> {
    fn default() -> GapList<T> {
        return GapList::new();
    }
}

/// Copies keep the capacity but not the layout: the copy is flat.
impl<T: Clone> Clone for GapList<T> {
    fn clone(&self) -> GapList<T> {
        let mut values = Vec::with_capacity(self.values.len());
        values.extend(self.iter().cloned().map(Some));
        values.resize_with(self.values.len(), || None);
        return GapList {
            values,
            start: 0,
            size: self.size,
            gap_size: 0,
            gap_index: 0,
            gap_add_right: false,
        };
    }
}

impl<T: fmt::Debug> fmt::Debug for GapList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_list().entries(self.iter()).finish();
    }
}

impl<T: PartialEq> PartialEq for GapList<T> {
    fn eq(&self, other: &GapList<T>) -> bool {
        return self.size == other.size && self.iter().eq(other.iter());
    }
}

impl<T: Eq> Eq for GapList<T> {}

impl<T: Hash> Hash for GapList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.size.hash(state);
        for elem in self.iter() {
            elem.hash(state);
        }
    }
}

impl<T> Index<usize> for GapList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(elem) => return elem,
            None => panic!("index {} out of bounds (len: {})", index, self.size),
        }
    }
}

impl<T> FromIterator<T> for GapList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> GapList<T> {
        return GapList::from_vec(iter.into_iter().collect());
    }
}

impl<T> Extend<T> for GapList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let items: Vec<T> = iter.into_iter().collect();
        if !items.is_empty() {
            let at = self.size;
            self.do_insert_all(at, items);
        }
    }
}

impl<T> From<Vec<T>> for GapList<T> {
    fn from(vec: Vec<T>) -> GapList<T> {
        return GapList::from_vec(vec);
    }
}

/// Borrowing iterator over a [`GapList`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    list: &'a GapList<T>,
    front: usize,
    back: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        return Iter {
            list: self.list,
            front: self.front,
            back: self.back,
        };
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        let elem = self.list.get(self.front);
        self.front += 1;
        return elem;
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        return (remaining, Some(remaining));
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        return self.list.get(self.back);
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a GapList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

/// Owning iterator over a [`GapList`]; pops from either end in O(1).
#[derive(Debug)]
pub struct IntoIter<T> {
    list: GapList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.list.is_empty() {
            return None;
        }
        return Some(self.list.do_remove(0));
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.list.len(), Some(self.list.len()));
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.list.is_empty() {
            return None;
        }
        let last = self.list.len() - 1;
        return Some(self.list.do_remove(last));
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for GapList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        return IntoIter { list: self };
    }
}
