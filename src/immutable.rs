//! Read-only view over any sequence engine.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::ops::Range;

use crate::big_list::BigList;
use crate::error::Result;
use crate::error::SequenceError;
use crate::gap_list::GapList;
use crate::sequence::Sequence;

/// Forwards reads to the wrapped sequence and fails every mutation with
/// [`SequenceError::Unsupported`], leaving the sequence untouched.
///
/// The view wraps a pointer (`&S`, `Box<S>`, `Rc<S>`, `Arc<S>`, ...) rather
/// than a copy, so it always shows the current contents of the underlying
/// sequence.
pub struct Immutable<P> {
    inner: P,
}

impl<P> Immutable<P> {
    pub fn new(inner: P) -> Immutable<P> {
        return Immutable { inner };
    }

    pub fn into_inner(self) -> P {
        return self.inner;
    }
}

impl<P: Deref> Immutable<P> {
    /// The wrapped sequence, for reads outside the [`Sequence`] trait.
    pub fn get_ref(&self) -> &P::Target {
        return &self.inner;
    }
}

impl<T> GapList<T> {
    pub fn immutable(&self) -> Immutable<&GapList<T>> {
        return Immutable::new(self);
    }
}

impl<T> BigList<T> {
    pub fn immutable(&self) -> Immutable<&BigList<T>> {
        return Immutable::new(self);
    }
}

impl<T, P> Sequence<T> for Immutable<P>
where
    P: Deref,
    P::Target: Sequence<T>,
{
    fn len(&self) -> usize {
        return self.inner.len();
    }

    fn capacity(&self) -> usize {
        return self.inner.capacity();
    }

    fn get(&self, index: usize) -> Option<&T> {
        return self.inner.get(index);
    }

    fn set(&mut self, _index: usize, _elem: T) -> Result<T> {
        return Err(SequenceError::unsupported("set"));
    }

    fn insert(&mut self, _index: usize, _elem: T) -> Result<()> {
        return Err(SequenceError::unsupported("insert"));
    }

    fn remove(&mut self, _index: usize) -> Result<T> {
        return Err(SequenceError::unsupported("remove"));
    }

    fn insert_all<I>(&mut self, _index: usize, _items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        return Err(SequenceError::unsupported("insert_all"));
    }

    fn remove_range(&mut self, _range: Range<usize>) -> Result<()> {
        return Err(SequenceError::unsupported("remove_range"));
    }

    fn sort_range_by<F>(&mut self, _range: Range<usize>, _compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        return Err(SequenceError::unsupported("sort_range_by"));
    }

    fn ensure_capacity(&mut self, _min_capacity: usize) -> Result<()> {
        return Err(SequenceError::unsupported("ensure_capacity"));
    }

    fn trim_to_size(&mut self) -> Result<()> {
        return Err(SequenceError::unsupported("trim_to_size"));
    }

    // The defaults below would succeed as no-ops on empty input, so they are
    // refused up front as well.

    fn push(&mut self, _elem: T) -> Result<()> {
        return Err(SequenceError::unsupported("push"));
    }

    fn push_front(&mut self, _elem: T) -> Result<()> {
        return Err(SequenceError::unsupported("push_front"));
    }

    fn pop(&mut self) -> Result<Option<T>> {
        return Err(SequenceError::unsupported("pop"));
    }

    fn pop_front(&mut self) -> Result<Option<T>> {
        return Err(SequenceError::unsupported("pop_front"));
    }

    fn clear(&mut self) -> Result<()> {
        return Err(SequenceError::unsupported("clear"));
    }

    fn crop(&mut self, _range: Range<usize>) -> Result<()> {
        return Err(SequenceError::unsupported("crop"));
    }

    fn set_all<I>(&mut self, _index: usize, _items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        return Err(SequenceError::unsupported("set_all"));
    }

    fn swap(&mut self, _a: usize, _b: usize) -> Result<()>
    where
        T: Clone,
    {
        return Err(SequenceError::unsupported("swap"));
    }

    fn reverse_range(&mut self, _range: Range<usize>) -> Result<()>
    where
        T: Clone,
    {
        return Err(SequenceError::unsupported("reverse_range"));
    }

    fn rotate_range(&mut self, _range: Range<usize>, _distance: isize) -> Result<()>
    where
        T: Clone,
    {
        return Err(SequenceError::unsupported("rotate_range"));
    }

    fn fill_range(&mut self, _range: Range<usize>, _elem: T) -> Result<()>
    where
        T: Clone,
    {
        return Err(SequenceError::unsupported("fill_range"));
    }

    fn drain_range(&mut self, _range: Range<usize>) -> Result<Vec<T>>
    where
        T: Clone,
    {
        return Err(SequenceError::unsupported("drain_range"));
    }

    fn retain<F>(&mut self, _keep: F) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        return Err(SequenceError::unsupported("retain"));
    }
}

impl<P> fmt::Debug for Immutable<P>
where
    P: Deref,
    P::Target: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_tuple("Immutable").field(&&*self.inner).finish();
    }
}
