//! The operation set shared by every sequence engine.
//!
//! [`GapList`](crate::GapList) and [`BigList`](crate::BigList) implement
//! [`Sequence`] directly; [`Immutable`](crate::Immutable) implements it by
//! forwarding reads and refusing writes. Mutating methods return
//! [`Result`] so that a read-only view can refuse them without panicking.
//!
//! Range arguments are half-open `start..end` logical index ranges.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::Result;
use crate::error::check_index;
use crate::error::check_range;

/// An indexed sequence with random access and positional edits.
pub trait Sequence<T> {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Number of elements the sequence can hold before reallocating.
    fn capacity(&self) -> usize;

    /// Element at `index`, or `None` if out of bounds.
    fn get(&self, index: usize) -> Option<&T>;

    /// Replace the element at `index`, returning the old one.
    fn set(&mut self, index: usize, elem: T) -> Result<T>;

    /// Insert `elem` so that it ends up at `index` (`0..=len`).
    fn insert(&mut self, index: usize, elem: T) -> Result<()>;

    /// Remove and return the element at `index`.
    fn remove(&mut self, index: usize) -> Result<T>;

    /// Insert all `items` starting at `index`, keeping their order.
    fn insert_all<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>;

    /// Remove every element in `range`.
    fn remove_range(&mut self, range: Range<usize>) -> Result<()>;

    /// Sort the elements in `range` with a stable sort.
    fn sort_range_by<F>(&mut self, range: Range<usize>, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering;

    /// Make room for at least `min_capacity` elements without reallocating.
    fn ensure_capacity(&mut self, min_capacity: usize) -> Result<()>;

    /// Release spare capacity.
    fn trim_to_size(&mut self) -> Result<()>;

    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    fn first(&self) -> Option<&T> {
        return self.get(0);
    }

    fn last(&self) -> Option<&T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        return self.get(len - 1);
    }

    /// Append `elem` at the tail.
    fn push(&mut self, elem: T) -> Result<()> {
        let len = self.len();
        return self.insert(len, elem);
    }

    /// Prepend `elem` at the head.
    fn push_front(&mut self, elem: T) -> Result<()> {
        return self.insert(0, elem);
    }

    /// Remove the tail element. `Ok(None)` if the sequence is empty.
    fn pop(&mut self) -> Result<Option<T>> {
        let len = self.len();
        if len == 0 {
            return Ok(None);
        }
        return self.remove(len - 1).map(Some);
    }

    /// Remove the head element. `Ok(None)` if the sequence is empty.
    fn pop_front(&mut self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        return self.remove(0).map(Some);
    }

    /// Remove every element.
    fn clear(&mut self) -> Result<()> {
        let len = self.len();
        return self.remove_range(0..len);
    }

    /// Keep only the elements in `range`.
    fn crop(&mut self, range: Range<usize>) -> Result<()> {
        let len = self.len();
        check_range(range.start, range.end, len)?;
        self.remove_range(range.end..len)?;
        return self.remove_range(0..range.start);
    }

    /// Overwrite consecutive elements starting at `index` with `items`.
    ///
    /// Fails without writing anything if the items would run past the end.
    fn set_all<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        check_range(index, index.saturating_add(items.len()), self.len())?;
        for (offset, item) in items.into_iter().enumerate() {
            self.set(index + offset, item)?;
        }
        return Ok(());
    }

    /// Clone the elements in `range` into a `Vec`.
    fn get_range(&self, range: Range<usize>) -> Result<Vec<T>>
    where
        T: Clone,
    {
        check_range(range.start, range.end, self.len())?;
        let mut out = Vec::with_capacity(range.len());
        for index in range {
            if let Some(elem) = self.get(index) {
                out.push(elem.clone());
            }
        }
        return Ok(out);
    }

    /// Exchange the elements at `a` and `b`.
    fn swap(&mut self, a: usize, b: usize) -> Result<()>
    where
        T: Clone,
    {
        let len = self.len();
        check_index(a, len)?;
        check_index(b, len)?;
        if a == b {
            return Ok(());
        }
        let elem_a = match self.get(a) {
            Some(elem) => elem.clone(),
            None => return Ok(()),
        };
        let elem_b = self.set(b, elem_a)?;
        self.set(a, elem_b)?;
        return Ok(());
    }

    /// Reverse the order of the elements in `range`.
    fn reverse_range(&mut self, range: Range<usize>) -> Result<()>
    where
        T: Clone,
    {
        check_range(range.start, range.end, self.len())?;
        if range.is_empty() {
            return Ok(());
        }
        let mut lo = range.start;
        let mut hi = range.end - 1;
        while lo < hi {
            self.swap(lo, hi)?;
            lo += 1;
            hi -= 1;
        }
        return Ok(());
    }

    /// Rotate the elements in `range` by `distance` places. A positive
    /// distance moves elements towards the end, wrapping around to the start
    /// of the range; a negative one moves them towards the start.
    fn rotate_range(&mut self, range: Range<usize>, distance: isize) -> Result<()>
    where
        T: Clone,
    {
        let mut items = self.get_range(range.clone())?;
        if items.len() < 2 {
            return Ok(());
        }
        let shift = distance.rem_euclid(items.len() as isize) as usize;
        if shift == 0 {
            return Ok(());
        }
        items.rotate_right(shift);
        return self.set_all(range.start, items);
    }

    /// Overwrite every element in `range` with a clone of `elem`.
    fn fill_range(&mut self, range: Range<usize>, elem: T) -> Result<()>
    where
        T: Clone,
    {
        check_range(range.start, range.end, self.len())?;
        for index in range {
            self.set(index, elem.clone())?;
        }
        return Ok(());
    }

    /// Remove the elements in `range` and return them in order.
    fn drain_range(&mut self, range: Range<usize>) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let out = self.get_range(range.clone())?;
        self.remove_range(range)?;
        return Ok(out);
    }

    /// Keep only the elements for which `keep` returns `true`, in order.
    /// Returns the number of elements removed.
    fn retain<F>(&mut self, mut keep: F) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        let mut index = 0;
        let mut removed = 0;
        while index < self.len() {
            let kept = match self.get(index) {
                Some(elem) => keep(elem),
                None => break,
            };
            if kept {
                index += 1;
            } else {
                self.remove(index)?;
                removed += 1;
            }
        }
        return Ok(removed);
    }

    /// Position of the first element equal to `elem`.
    fn index_of(&self, elem: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return (0..self.len()).find(|&i| self.get(i) == Some(elem));
    }

    /// Position of the last element equal to `elem`.
    fn last_index_of(&self, elem: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        return (0..self.len()).rev().find(|&i| self.get(i) == Some(elem));
    }

    fn contains(&self, elem: &T) -> bool
    where
        T: PartialEq,
    {
        return self.index_of(elem).is_some();
    }

    /// Binary search the sorted sub-range `range`.
    ///
    /// The inner result follows `slice::binary_search_by`: `Ok(i)` is the
    /// absolute index of a match, `Err(i)` the absolute insertion point.
    fn binary_search_range_by<F>(&self, range: Range<usize>, mut f: F) -> Result<std::result::Result<usize, usize>>
    where
        F: FnMut(&T) -> Ordering,
    {
        check_range(range.start, range.end, self.len())?;
        let mut lo = range.start;
        let mut hi = range.end;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let Some(elem) = self.get(mid) else {
                break;
            };
            match f(elem) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(Ok(mid)),
            }
        }
        return Ok(Err(lo));
    }
}

/// Sequences that can create fresh instances of their own kind.
///
/// Read-only views cannot, which is why this is split from [`Sequence`].
pub trait SequenceFactory<T>: Sequence<T> + Sized {
    /// An empty sequence of the same kind and configuration, sized for
    /// roughly `capacity` elements.
    fn empty_like(&self, capacity: usize) -> Self;

    /// A new sequence of the same kind holding a clone of `range`.
    fn copy_range(&self, range: Range<usize>) -> Result<Self>
    where
        T: Clone,
    {
        let items = self.get_range(range)?;
        let mut out = self.empty_like(items.len());
        out.insert_all(0, items)?;
        return Ok(out);
    }
}
