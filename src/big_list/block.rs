//! Copy-on-write storage unit of a [`BigList`](crate::BigList).

use std::sync::Arc;

use tracing::trace;

use crate::gap_list::GapList;

/// One bounded run of elements, shared between copies of a list until one
/// of them writes to it.
///
/// The reference count is the `Arc` strong count, so releases from
/// independent owners never race. Dropping a `Block` is the release.
pub(crate) struct Block<T> {
    values: Arc<GapList<T>>,
}

impl<T> Block<T> {
    pub(crate) fn new(capacity: usize) -> Block<T> {
        return Block {
            values: Arc::new(GapList::with_capacity(capacity)),
        };
    }

    pub(crate) fn from_vec(items: Vec<T>) -> Block<T> {
        return Block {
            values: Arc::new(GapList::from_vec(items)),
        };
    }

    /// Number of owners currently holding this block.
    pub(crate) fn ref_count(&self) -> usize {
        return Arc::strong_count(&self.values);
    }

    pub(crate) fn is_shared(&self) -> bool {
        return self.ref_count() > 1;
    }

    /// Take another reference to the same storage.
    pub(crate) fn share(&self) -> Block<T> {
        return Block {
            values: Arc::clone(&self.values),
        };
    }

    pub(crate) fn len(&self) -> usize {
        return self.values.len();
    }

    pub(crate) fn capacity(&self) -> usize {
        return self.values.capacity();
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        return self.values.get(index);
    }

    pub(crate) fn values(&self) -> &GapList<T> {
        return &self.values;
    }
}

impl<T: Clone> Block<T> {
    /// Exclusive access to the storage, copying it first if it is shared.
    pub(crate) fn make_mut(&mut self) -> &mut GapList<T> {
        if self.is_shared() {
            trace!(len = self.len(), refs = self.ref_count(), "block copy on write");
        }
        return Arc::make_mut(&mut self.values);
    }

    /// Move the elements out. They are cloned only if another list still
    /// shares this block.
    pub(crate) fn into_vec(self) -> Vec<T> {
        let mut values = Arc::unwrap_or_clone(self.values);
        return values.take_all();
    }
}

impl<T> Clone for Block<T> {
    fn clone(&self) -> Block<T> {
        return self.share();
    }
}
