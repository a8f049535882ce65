//! Big List
//!
//! A sequence split into blocks of at most `block_size` elements. Each
//! block is a [`GapList`] behind a reference-counted [`Block`], and the
//! blocks hang off a threaded AVL tree ordered by position.
//!
//! Design decisions:
//!
//! 1. **Cursor window**: the block touched last is remembered together
//!    with its index range. Sequential access inside that range skips the
//!    tree walk entirely. Size changes made through the window are kept as
//!    a pending delta and pushed into the tree only when another block is
//!    needed or the tree changes shape.
//!
//! 2. **Fill threshold**: inserts at the very head or tail fill a block to
//!    95% only, then start a fresh dedicated block. Inserts elsewhere fill
//!    a block completely and then split it in half.
//!
//! 3. **Merge threshold**: a block that drops below 35% is merged into a
//!    neighbor that is itself below 35% (left neighbor first). Removals at
//!    the head or tail never merge, so draining from an end stays cheap.
//!
//! 4. **Copy-on-write**: `clone()` copies the tree nodes but shares every
//!    block. A write to a shared block copies just that block first.
//!
//! The cursor window lives in a `Cell`, so even reads mutate it. A
//! `BigList` is therefore not `Sync`.

mod block;
mod tree;

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Index;
use std::ops::Range;

use tracing::debug;
use tracing::trace;

use crate::error::Result;
use crate::error::check_index;
use crate::error::check_insert_index;
use crate::error::check_range;
use crate::gap_list::GapList;
use crate::sequence::Sequence;
use crate::sequence::SequenceFactory;

use block::Block;
use tree::NodeId;
use tree::Tree;

/// Block size used by [`BigList::new`].
pub const DEFAULT_BLOCK_SIZE: usize = 1000;

/// Head and tail blocks are filled to this percentage before a new block
/// is started.
pub const FILL_THRESHOLD_PERCENT: usize = 95;

/// Blocks below this percentage of the block size are merge candidates.
pub const MERGE_THRESHOLD_PERCENT: usize = 35;

/// The most recently used block and the logical range it covers.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    node: NodeId,
    /// Index of the block's first element.
    start: usize,
    /// Index one past the block's last element.
    end: usize,
    /// Size change of this block not yet applied to the tree counts.
    pending: isize,
}

/// A block-tree sequence with cheap copies.
pub struct BigList<T> {
    block_size: usize,
    len: usize,
    tree: Tree<T>,
    cursor: Cell<Option<Cursor>>,
}

impl<T> BigList<T> {
    /// Create an empty list with [`DEFAULT_BLOCK_SIZE`].
    pub fn new() -> BigList<T> {
        return BigList::with_block_size(DEFAULT_BLOCK_SIZE);
    }

    /// Create an empty list whose blocks hold at most `block_size` elements.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    pub fn with_block_size(block_size: usize) -> BigList<T> {
        assert!(block_size > 0, "block size must be positive");
        return BigList {
            block_size,
            len: 0,
            tree: Tree::new(Block::new(0)),
            cursor: Cell::new(None),
        };
    }

    pub fn block_size(&self) -> usize {
        return self.block_size;
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Number of blocks. An empty list still owns one empty block.
    pub fn block_count(&self) -> usize {
        return self.tree.node_count();
    }

    /// Size of every block, in list order.
    pub fn block_sizes(&self) -> Vec<usize> {
        return self.tree.ids().into_iter().map(|id| self.tree.block(id).len()).collect();
    }

    /// Number of blocks currently shared with another list.
    pub fn shared_block_count(&self) -> usize {
        return self.tree.ids().into_iter().filter(|&id| self.tree.block(id).is_shared()).count();
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let cursor = self.locate(index, false);
        return self.tree.block(cursor.node).get(index - cursor.start);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        return Iter {
            list: self,
            node: Some(self.tree.first()),
            pos: 0,
            remaining: self.len,
        };
    }

    /// `block_size * 95%`, rounded up. Split into whole hundreds and the
    /// remainder so that no block size overflows.
    fn fill_limit(&self) -> usize {
        let whole = self.block_size / 100 * FILL_THRESHOLD_PERCENT;
        let rest = (self.block_size % 100 * FILL_THRESHOLD_PERCENT).div_ceil(100);
        return (whole + rest).max(1);
    }

    /// `block_size * 35%`, rounded down.
    fn merge_limit(&self) -> usize {
        let whole = self.block_size / 100 * MERGE_THRESHOLD_PERCENT;
        let rest = self.block_size % 100 * MERGE_THRESHOLD_PERCENT / 100;
        return (whole + rest).max(1);
    }

    // --- Cursor window ---

    /// Push the window's pending size change into the tree.
    fn flush(&self) {
        if let Some(mut cursor) = self.cursor.get() {
            if cursor.pending != 0 {
                self.tree.propagate(cursor.node, cursor.pending);
                cursor.pending = 0;
                self.cursor.set(Some(cursor));
            }
        }
    }

    /// Resolve `index` to its block, reusing the window when possible.
    /// With `insert`, the position just past the window also matches.
    fn locate(&self, index: usize, insert: bool) -> Cursor {
        if let Some(cursor) = self.cursor.get() {
            if index >= cursor.start && (index < cursor.end || (insert && index == cursor.end)) {
                return cursor;
            }
        }
        self.flush();
        let (node, start) = if insert && index == self.len {
            let last = self.tree.last();
            (last, self.len - self.tree.block(last).len())
        } else {
            self.tree.locate(index)
        };
        let cursor = Cursor {
            node,
            start,
            end: start + self.tree.block(node).len(),
            pending: 0,
        };
        self.cursor.set(Some(cursor));
        return cursor;
    }

    fn set_cursor(&self, node: NodeId, start: usize, end: usize) {
        self.cursor.set(Some(Cursor { node, start, end, pending: 0 }));
    }

    // --- Invariant checking ---

    /// Verify the tree, every block and the cursor window. Panics on the
    /// first inconsistency.
    ///
    /// Superlinear. Intended for tests and development builds only.
    pub fn check_invariants(&self) {
        self.flush();
        self.tree.check_invariants();
        assert_eq!(
            self.tree.total_len(),
            self.len,
            "INVARIANT VIOLATED: tree holds {} elements, list says {}",
            self.tree.total_len(),
            self.len
        );
        let ids = self.tree.ids();
        for &id in &ids {
            let block = self.tree.block(id);
            block.values().check_invariants();
            assert!(
                block.len() <= self.block_size,
                "INVARIANT VIOLATED: block of {} exceeds block size {}",
                block.len(),
                self.block_size
            );
            if ids.len() > 1 {
                assert!(block.len() > 0, "INVARIANT VIOLATED: empty block in multi-block list");
            }
        }
        if let Some(cursor) = self.cursor.get() {
            let block_len = self.tree.block(cursor.node).len();
            assert_eq!(cursor.end - cursor.start, block_len, "INVARIANT VIOLATED: cursor window size");
            if block_len > 0 {
                assert_eq!(
                    self.tree.locate(cursor.start),
                    (cursor.node, cursor.start),
                    "INVARIANT VIOLATED: cursor window position"
                );
            }
        }
    }

    #[cfg(feature = "check-invariants")]
    fn debug_check(&self) {
        self.check_invariants();
    }

    #[cfg(not(feature = "check-invariants"))]
    #[inline(always)]
    fn debug_check(&self) {}
}

impl<T: Clone> BigList<T> {
    fn block_mut(&mut self, node: NodeId) -> &mut GapList<T> {
        return self.tree.block_mut(node).make_mut();
    }

    /// A new block holding just `elem`. Storage grows on demand, so a huge
    /// block size never turns into a huge allocation.
    fn single_block(&self, elem: T) -> Block<T> {
        let mut block = Block::new(self.block_size.min(DEFAULT_BLOCK_SIZE));
        block.make_mut().do_insert(0, elem);
        return block;
    }

    /// Mutable access to the element at `index`, copying its block first if
    /// it is shared.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let cursor = self.locate(index, false);
        return self.block_mut(cursor.node).get_mut(index - cursor.start);
    }

    // --- Core operations ---

    fn do_set(&mut self, index: usize, elem: T) -> T {
        let cursor = self.locate(index, false);
        return self.block_mut(cursor.node).do_set(index - cursor.start, elem);
    }

    pub(crate) fn do_insert(&mut self, index: usize, elem: T) {
        let cursor = self.locate(index, true);
        let pos = index - cursor.start;
        let block_len = cursor.end - cursor.start;
        let limit = if index == 0 || index == self.len {
            self.fill_limit()
        } else {
            self.block_size
        };

        if block_len < limit {
            self.block_mut(cursor.node).do_insert(pos, elem);
            self.cursor.set(Some(Cursor {
                end: cursor.end + 1,
                pending: cursor.pending + 1,
                ..cursor
            }));
        } else if index == self.len {
            self.flush();
            let block = self.single_block(elem);
            let node = self.tree.insert_after(cursor.node, block);
            trace!(index, blocks = self.tree.node_count(), "big list new tail block");
            self.set_cursor(node, index, index + 1);
        } else if index == 0 {
            self.flush();
            let block = self.single_block(elem);
            let node = self.tree.insert_before(cursor.node, block);
            trace!(blocks = self.tree.node_count(), "big list new head block");
            self.set_cursor(node, 0, 1);
        } else {
            self.split_insert(cursor, pos, elem);
        }

        self.len += 1;
        self.debug_check();
    }

    /// Split the full block under `cursor` in half and insert `elem` at
    /// block-local `pos` into whichever half it belongs to.
    fn split_insert(&mut self, cursor: Cursor, pos: usize, elem: T) {
        self.flush();
        let node = cursor.node;
        if self.tree.block(node).len() < 2 {
            // Nothing to split; the element gets a block of its own.
            let block = self.single_block(elem);
            let added = if pos == 0 {
                self.tree.insert_before(node, block)
            } else {
                self.tree.insert_after(node, block)
            };
            let start = cursor.start + pos;
            self.set_cursor(added, start, start + 1);
            return;
        }
        let values = self.block_mut(node);
        let block_len = values.len();
        let keep = block_len - block_len / 2;
        let moved = values.do_drain(keep..block_len);
        let moved_len = moved.len();
        self.tree.propagate(node, -(moved_len as isize));
        let right = self.tree.insert_after(node, Block::from_vec(moved));
        trace!(at = cursor.start + keep, left = keep, right = moved_len, "big list split block");

        if pos < keep {
            self.block_mut(node).do_insert(pos, elem);
            self.tree.propagate(node, 1);
            self.set_cursor(node, cursor.start, cursor.start + keep + 1);
        } else {
            self.block_mut(right).do_insert(pos - keep, elem);
            self.tree.propagate(right, 1);
            let start = cursor.start + keep;
            self.set_cursor(right, start, start + moved_len + 1);
        }
    }

    fn do_remove(&mut self, index: usize) -> T {
        let cursor = self.locate(index, false);
        let elem = self.block_mut(cursor.node).do_remove(index - cursor.start);
        let at_edge = index == 0 || index == self.len - 1;
        self.len -= 1;
        self.cursor.set(Some(Cursor {
            end: cursor.end - 1,
            pending: cursor.pending - 1,
            ..cursor
        }));

        let block_len = cursor.end - cursor.start - 1;
        if block_len == 0 {
            if self.tree.node_count() > 1 {
                self.flush();
                self.tree.remove(cursor.node);
                self.cursor.set(None);
                trace!(index, blocks = self.tree.node_count(), "big list dropped empty block");
            }
        } else if block_len < self.merge_limit() && !at_edge {
            self.merge(cursor.node);
        }

        self.debug_check();
        return elem;
    }

    /// Fold an under-full block into a neighbor that is under-full too.
    fn merge(&mut self, node: NodeId) {
        self.flush();
        let limit = self.merge_limit();
        let neighbor = match self.tree.prev(node) {
            Some(left) if self.tree.block(left).len() < limit => Some((left, true)),
            _ => match self.tree.next(node) {
                Some(right) if self.tree.block(right).len() < limit => Some((right, false)),
                _ => None,
            },
        };
        let Some((neighbor, into_left)) = neighbor else {
            return;
        };

        let items = self.block_mut(node).take_all();
        let count = items.len() as isize;
        self.tree.propagate(node, -count);
        let target = self.block_mut(neighbor);
        let at = if into_left { target.len() } else { 0 };
        target.do_insert_all(at, items);
        self.tree.propagate(neighbor, count);
        self.tree.remove(node);
        self.cursor.set(None);
        debug!(moved = count, into_left, blocks = self.tree.node_count(), "big list merged block");
    }

    fn do_insert_all(&mut self, index: usize, mut items: Vec<T>) {
        let count = items.len();
        if count == 0 {
            return;
        }
        if count == 1 {
            if let Some(elem) = items.pop() {
                self.do_insert(index, elem);
            }
            return;
        }

        self.flush();
        let cursor = self.locate(index, true);
        let node = cursor.node;
        let pos = index - cursor.start;
        let block_len = cursor.end - cursor.start;

        if block_len + count <= self.block_size {
            self.block_mut(node).do_insert_all(pos, items);
            self.tree.propagate(node, count as isize);
            self.len += count;
            self.set_cursor(node, cursor.start, cursor.end + count);
            self.debug_check();
            return;
        }

        // The block keeps its head; its tail is re-added after the new items.
        let tail = self.block_mut(node).do_drain(pos..block_len);
        self.tree.propagate(node, -(tail.len() as isize));
        items.extend(tail);

        let head_len = pos;
        let total = head_len + items.len();
        let block_count = total.div_ceil(self.block_size);
        let first_share = total.div_ceil(block_count);
        let mut remaining = items.len();
        let mut incoming = items.into_iter();
        let mut blocks_left;

        if head_len < first_share {
            let fill = first_share - head_len;
            let chunk: Vec<T> = incoming.by_ref().take(fill).collect();
            self.block_mut(node).do_insert_all(head_len, chunk);
            self.tree.propagate(node, fill as isize);
            remaining -= fill;
            blocks_left = block_count - 1;
        } else {
            blocks_left = remaining.div_ceil(self.block_size);
        }

        let mut previous = node;
        while remaining > 0 {
            let size = remaining.div_ceil(blocks_left);
            let chunk: Vec<T> = incoming.by_ref().take(size).collect();
            previous = self.tree.insert_after(previous, Block::from_vec(chunk));
            remaining -= size;
            blocks_left -= 1;
        }
        trace!(index, count, blocks = self.tree.node_count(), "big list bulk insert");

        self.len += count;
        self.cursor.set(None);
        self.debug_check();
    }

    /// Remove `range` chunk by chunk. With `collect`, the removed elements
    /// are returned in order; otherwise the result is empty.
    fn do_remove_range(&mut self, range: Range<usize>, collect: bool) -> Vec<T> {
        self.flush();
        self.cursor.set(None);
        let mut removed = Vec::with_capacity(if collect { range.len() } else { 0 });
        let mut remaining = range.len();
        while remaining > 0 {
            let (node, block_start) = self.tree.locate(range.start);
            let block_len = self.tree.block(node).len();
            let pos = range.start - block_start;
            let take = (block_len - pos).min(remaining);
            if take == block_len && self.tree.node_count() > 1 {
                let block = self.tree.remove(node);
                if collect {
                    removed.extend(block.into_vec());
                }
            } else {
                let drained = self.block_mut(node).do_drain(pos..pos + take);
                self.tree.propagate(node, -(take as isize));
                if collect {
                    removed.extend(drained);
                }
            }
            remaining -= take;
        }
        self.len -= range.len();
        self.debug_check();
        return removed;
    }

    /// Remove the elements in `range` and return them in order.
    pub fn drain_range(&mut self, range: Range<usize>) -> Result<Vec<T>> {
        check_range(range.start, range.end, self.len)?;
        match range.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![self.do_remove(range.start)]),
            _ => return Ok(self.do_remove_range(range, true)),
        }
    }
}

impl<T: Clone> Sequence<T> for BigList<T> {
    fn len(&self) -> usize {
        return self.len;
    }

    /// Sum of the block capacities.
    fn capacity(&self) -> usize {
        return self.tree.ids().into_iter().map(|id| self.tree.block(id).capacity()).sum();
    }

    fn get(&self, index: usize) -> Option<&T> {
        return BigList::get(self, index);
    }

    fn set(&mut self, index: usize, elem: T) -> Result<T> {
        check_index(index, self.len)?;
        return Ok(self.do_set(index, elem));
    }

    fn insert(&mut self, index: usize, elem: T) -> Result<()> {
        check_insert_index(index, self.len)?;
        self.do_insert(index, elem);
        return Ok(());
    }

    fn remove(&mut self, index: usize) -> Result<T> {
        check_index(index, self.len)?;
        return Ok(self.do_remove(index));
    }

    fn insert_all<I>(&mut self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        check_insert_index(index, self.len)?;
        self.do_insert_all(index, items.into_iter().collect());
        return Ok(());
    }

    fn remove_range(&mut self, range: Range<usize>) -> Result<()> {
        check_range(range.start, range.end, self.len)?;
        match range.len() {
            0 => {}
            1 => {
                self.do_remove(range.start);
            }
            _ => {
                self.do_remove_range(range, false);
            }
        }
        return Ok(());
    }

    fn drain_range(&mut self, range: Range<usize>) -> Result<Vec<T>> {
        return BigList::drain_range(self, range);
    }

    fn sort_range_by<F>(&mut self, range: Range<usize>, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        check_range(range.start, range.end, self.len)?;
        if range.len() < 2 {
            return Ok(());
        }
        let mut items = self.get_range(range.clone())?;
        items.sort_by(compare);
        for (offset, item) in items.into_iter().enumerate() {
            self.do_set(range.start + offset, item);
        }
        return Ok(());
    }

    /// Only a single-block list reserves room, and never more than one
    /// block's worth.
    fn ensure_capacity(&mut self, min_capacity: usize) -> Result<()> {
        if self.tree.node_count() == 1 {
            let node = self.tree.first();
            let capacity = min_capacity.min(self.block_size);
            self.block_mut(node).ensure_capacity(capacity)?;
        }
        return Ok(());
    }

    /// Trims every block this list owns exclusively. Shared blocks are left
    /// alone rather than copied.
    fn trim_to_size(&mut self) -> Result<()> {
        for id in self.tree.ids() {
            if !self.tree.block(id).is_shared() {
                self.block_mut(id).trim_to_size()?;
            }
        }
        return Ok(());
    }

    fn clear(&mut self) -> Result<()> {
        self.tree = Tree::new(Block::new(0));
        self.len = 0;
        self.cursor.set(None);
        return Ok(());
    }
}

impl<T: Clone> SequenceFactory<T> for BigList<T> {
    fn empty_like(&self, capacity: usize) -> BigList<T> {
        return BigList {
            block_size: self.block_size,
            len: 0,
            tree: Tree::new(Block::new(capacity.min(self.block_size))),
            cursor: Cell::new(None),
        };
    }
}

impl<T> Default for BigList<T> {
    fn default() -> BigList<T> {
        return BigList::new();
    }
}

/// Shares every block with the original; cost is proportional to the
/// number of blocks, not elements.
impl<T> Clone for BigList<T> {
    fn clone(&self) -> BigList<T> {
        self.flush();
        return BigList {
            block_size: self.block_size,
            len: self.len,
            tree: self.tree.clone(),
            cursor: Cell::new(self.cursor.get()),
        };
    }
}

impl<T: fmt::Debug> fmt::Debug for BigList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_list().entries(self.iter()).finish();
    }
}

impl<T: PartialEq> PartialEq for BigList<T> {
    fn eq(&self, other: &BigList<T>) -> bool {
        return self.len == other.len && self.iter().eq(other.iter());
    }
}

impl<T: Eq> Eq for BigList<T> {}

impl<T: Hash> Hash for BigList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for elem in self.iter() {
            elem.hash(state);
        }
    }
}

impl<T> Index<usize> for BigList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(elem) => return elem,
            None => panic!("index {} out of bounds (len: {})", index, self.len),
        }
    }
}

impl<T: Clone> FromIterator<T> for BigList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> BigList<T> {
        let mut list = BigList::new();
        list.extend(iter);
        return list;
    }
}

impl<T: Clone> Extend<T> for BigList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let at = self.len;
        self.do_insert_all(at, iter.into_iter().collect());
    }
}

/// Borrowing iterator over a [`BigList`]; walks the block chain.
pub struct Iter<'a, T> {
    list: &'a BigList<T>,
    node: Option<NodeId>,
    pos: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        while let Some(node) = self.node {
            let block = self.list.tree.block(node);
            if self.pos < block.len() {
                let elem = block.get(self.pos);
                self.pos += 1;
                self.remaining -= 1;
                return elem;
            }
            self.node = self.list.tree.next(node);
            self.pos = 0;
        }
        return None;
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a BigList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}
