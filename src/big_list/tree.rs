//! Threaded AVL tree of blocks.
//!
//! Nodes live in a `Slab` and refer to each other by key. Each node stores
//! the element count of its whole subtree, so the block holding a logical
//! index is found by summing left-subtree counts on the way down.
//!
//! A side without a child is threaded to the in-order neighbor instead
//! (`Link::Thread`), which makes stepping to the previous or next block
//! O(1) for leaves. Only the first node's left side and the last node's
//! right side are `Link::Absent`.
//!
//! Subtree counts are `Cell`s so that a pending size change can be
//! propagated from a `&self` read path. The owning list is single-threaded.

use std::cell::Cell;

use rustc_hash::FxHashSet;
use slab::Slab;
use smallvec::SmallVec;

use super::block::Block;

pub(crate) type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Link {
    /// No neighbor on this side: first or last node.
    Absent,
    /// A child subtree.
    Child(NodeId),
    /// No child; points at the in-order neighbor.
    Thread(NodeId),
}

impl Link {
    fn child(self) -> Option<NodeId> {
        match self {
            Link::Child(id) => return Some(id),
            _ => return None,
        }
    }
}

pub(crate) struct Node<T> {
    block: Block<T>,
    parent: Option<NodeId>,
    left: Link,
    right: Link,
    /// Leaf = 1.
    height: u32,
    /// Elements in this subtree, this node's block included.
    len: Cell<usize>,
}

impl<T> Clone for Node<T> {
    /// The block is shared, not copied.
    fn clone(&self) -> Node<T> {
        return Node {
            block: self.block.share(),
            parent: self.parent,
            left: self.left,
            right: self.right,
            height: self.height,
            len: self.len.clone(),
        };
    }
}

pub(crate) struct Tree<T> {
    nodes: Slab<Node<T>>,
    root: NodeId,
}

impl<T> Clone for Tree<T> {
    /// Builds a parallel set of nodes over the same blocks. Cost is
    /// proportional to the number of blocks.
    fn clone(&self) -> Tree<T> {
        return Tree {
            nodes: self.nodes.clone(),
            root: self.root,
        };
    }
}

impl<T> Tree<T> {
    pub(crate) fn new(block: Block<T>) -> Tree<T> {
        let mut nodes = Slab::new();
        let len = block.len();
        let root = nodes.insert(Node {
            block,
            parent: None,
            left: Link::Absent,
            right: Link::Absent,
            height: 1,
            len: Cell::new(len),
        });
        return Tree { nodes, root };
    }

    pub(crate) fn node_count(&self) -> usize {
        return self.nodes.len();
    }

    /// Total number of elements, as recorded at the root.
    pub(crate) fn total_len(&self) -> usize {
        return self.nodes[self.root].len.get();
    }

    pub(crate) fn block(&self, id: NodeId) -> &Block<T> {
        return &self.nodes[id].block;
    }

    pub(crate) fn block_mut(&mut self, id: NodeId) -> &mut Block<T> {
        return &mut self.nodes[id].block;
    }

    fn left_child(&self, id: NodeId) -> Option<NodeId> {
        return self.nodes[id].left.child();
    }

    fn right_child(&self, id: NodeId) -> Option<NodeId> {
        return self.nodes[id].right.child();
    }

    fn subtree_len(&self, id: Option<NodeId>) -> usize {
        return id.map_or(0, |id| self.nodes[id].len.get());
    }

    fn height(&self, id: Option<NodeId>) -> u32 {
        return id.map_or(0, |id| self.nodes[id].height);
    }

    // --- Navigation ---

    fn min(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left_child(id) {
            id = left;
        }
        return id;
    }

    fn max(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.right_child(id) {
            id = right;
        }
        return id;
    }

    pub(crate) fn first(&self) -> NodeId {
        return self.min(self.root);
    }

    pub(crate) fn last(&self) -> NodeId {
        return self.max(self.root);
    }

    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id].right {
            Link::Child(right) => return Some(self.min(right)),
            Link::Thread(next) => return Some(next),
            Link::Absent => return None,
        }
    }

    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id].left {
            Link::Child(left) => return Some(self.max(left)),
            Link::Thread(prev) => return Some(prev),
            Link::Absent => return None,
        }
    }

    /// Node whose block holds logical `index`, plus the index of the
    /// block's first element. `index == total_len` resolves to the last
    /// node. Subtree counts must be up to date.
    pub(crate) fn locate(&self, index: usize) -> (NodeId, usize) {
        let mut id = self.root;
        let mut offset = 0;
        loop {
            let left = self.left_child(id);
            let left_len = self.subtree_len(left);
            if let Some(left) = left {
                if index < offset + left_len {
                    id = left;
                    continue;
                }
            }
            let block_start = offset + left_len;
            let block_end = block_start + self.nodes[id].block.len();
            if index < block_end {
                return (id, block_start);
            }
            match self.right_child(id) {
                Some(right) => {
                    offset = block_end;
                    id = right;
                }
                None => return (id, block_start),
            }
        }
    }

    /// Apply a size change of `delta` elements in `id`'s block to `id` and
    /// every ancestor.
    pub(crate) fn propagate(&self, id: NodeId, delta: isize) {
        if delta == 0 {
            return;
        }
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &self.nodes[id];
            node.len.set(node.len.get().wrapping_add_signed(delta));
            current = node.parent;
        }
    }

    // --- Structural changes ---

    fn update(&mut self, id: NodeId) {
        let left = self.left_child(id);
        let right = self.right_child(id);
        let height = 1 + self.height(left).max(self.height(right));
        let len = self.subtree_len(left) + self.subtree_len(right) + self.nodes[id].block.len();
        let node = &mut self.nodes[id];
        node.height = height;
        node.len.set(len);
    }

    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = &mut self.nodes[parent];
                if node.left == Link::Child(old) {
                    node.left = Link::Child(new);
                } else {
                    node.right = Link::Child(new);
                }
            }
        }
    }

    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.right_child(x) else {
            panic!("rotate_left on node {} without right child", x);
        };
        match self.nodes[y].left {
            Link::Child(inner) => {
                self.nodes[x].right = Link::Child(inner);
                self.nodes[inner].parent = Some(x);
            }
            _ => self.nodes[x].right = Link::Thread(y),
        }
        self.nodes[y].left = Link::Child(x);
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.nodes[x].parent = Some(y);
        self.replace_child(parent, x, y);
        self.update(x);
        self.update(y);
        return y;
    }

    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.left_child(x) else {
            panic!("rotate_right on node {} without left child", x);
        };
        match self.nodes[y].right {
            Link::Child(inner) => {
                self.nodes[x].left = Link::Child(inner);
                self.nodes[inner].parent = Some(x);
            }
            _ => self.nodes[x].left = Link::Thread(y),
        }
        self.nodes[y].right = Link::Child(x);
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.nodes[x].parent = Some(y);
        self.replace_child(parent, x, y);
        self.update(x);
        self.update(y);
        return y;
    }

    /// Recompute `id` and rotate if its subtrees differ in height by 2.
    /// Returns the root of the (possibly new) subtree.
    fn balance(&mut self, id: NodeId) -> NodeId {
        self.update(id);
        let left = self.left_child(id);
        let right = self.right_child(id);
        let left_height = self.height(left) as i64;
        let right_height = self.height(right) as i64;

        if left_height - right_height > 1 {
            if let Some(left) = left {
                let outer = self.height(self.left_child(left));
                let inner = self.height(self.right_child(left));
                if outer < inner {
                    self.rotate_left(left);
                }
            }
            return self.rotate_right(id);
        }
        if right_height - left_height > 1 {
            if let Some(right) = right {
                let outer = self.height(self.right_child(right));
                let inner = self.height(self.left_child(right));
                if outer < inner {
                    self.rotate_right(right);
                }
            }
            return self.rotate_left(id);
        }
        return id;
    }

    /// Rebalance and recount from `from` up to the root.
    fn retrace(&mut self, from: Option<NodeId>) {
        let mut current = from;
        while let Some(id) = current {
            let top = self.balance(id);
            current = self.nodes[top].parent;
        }
    }

    fn new_node(&mut self, block: Block<T>, parent: NodeId, left: Link, right: Link) -> NodeId {
        let len = block.len();
        return self.nodes.insert(Node {
            block,
            parent: Some(parent),
            left,
            right,
            height: 1,
            len: Cell::new(len),
        });
    }

    /// Insert `block` as the in-order successor of `id`.
    pub(crate) fn insert_after(&mut self, id: NodeId, block: Block<T>) -> NodeId {
        match self.nodes[id].right {
            Link::Child(right) => {
                let host = self.min(right);
                let new = self.new_node(block, host, Link::Thread(id), Link::Thread(host));
                self.nodes[host].left = Link::Child(new);
                self.retrace(Some(host));
                return new;
            }
            outer => {
                let new = self.new_node(block, id, Link::Thread(id), outer);
                self.nodes[id].right = Link::Child(new);
                self.retrace(Some(id));
                return new;
            }
        }
    }

    /// Insert `block` as the in-order predecessor of `id`.
    pub(crate) fn insert_before(&mut self, id: NodeId, block: Block<T>) -> NodeId {
        match self.nodes[id].left {
            Link::Child(left) => {
                let host = self.max(left);
                let new = self.new_node(block, host, Link::Thread(host), Link::Thread(id));
                self.nodes[host].right = Link::Child(new);
                self.retrace(Some(host));
                return new;
            }
            outer => {
                let new = self.new_node(block, id, outer, Link::Thread(id));
                self.nodes[id].left = Link::Child(new);
                self.retrace(Some(id));
                return new;
            }
        }
    }

    /// Unlink `id` and return its block.
    ///
    /// A node with two children trades blocks with its successor, which is
    /// then unlinked in its place, so other node keys may now name
    /// different blocks. Must not be called on the last remaining node.
    pub(crate) fn remove(&mut self, id: NodeId) -> Block<T> {
        assert!(self.nodes.len() > 1, "cannot remove the only block node");

        let mut target = id;
        if let (Some(_), Some(right)) = (self.left_child(id), self.right_child(id)) {
            let successor = self.min(right);
            if let Some((a, b)) = self.nodes.get2_mut(id, successor) {
                std::mem::swap(&mut a.block, &mut b.block);
            }
            target = successor;
        }

        let parent = self.nodes[target].parent;
        let left = self.nodes[target].left;
        let right = self.nodes[target].right;
        let replacement = match (left, right) {
            (Link::Child(child), _) => {
                let predecessor = self.max(child);
                self.nodes[predecessor].right = right;
                Some(child)
            }
            (_, Link::Child(child)) => {
                let successor = self.min(child);
                self.nodes[successor].left = left;
                Some(child)
            }
            _ => None,
        };

        match replacement {
            Some(child) => {
                self.nodes[child].parent = parent;
                self.replace_child(parent, target, child);
            }
            None => {
                let Some(parent) = parent else {
                    panic!("leaf node {} without parent in a multi-node tree", target);
                };
                let node = &mut self.nodes[parent];
                if node.left == Link::Child(target) {
                    node.left = left;
                } else {
                    node.right = right;
                }
            }
        }

        let node = self.nodes.remove(target);
        self.retrace(parent);
        return node.block;
    }

    /// Node keys in list order.
    pub(crate) fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut current = Some(self.first());
        while let Some(id) = current {
            out.push(id);
            current = self.next(id);
        }
        return out;
    }

    // --- Invariant checking ---

    /// Panic if parent links, threads, heights, balance or subtree counts
    /// are inconsistent.
    pub(crate) fn check_invariants(&self) {
        assert!(self.nodes.contains(self.root), "INVARIANT VIOLATED: root {} not in slab", self.root);
        assert_eq!(self.nodes[self.root].parent, None, "INVARIANT VIOLATED: root has a parent");

        let mut stack: SmallVec<[NodeId; 64]> = SmallVec::new();
        stack.push(self.root);
        let mut reached = 0usize;
        while let Some(id) = stack.pop() {
            reached += 1;
            let node = &self.nodes[id];
            let left = node.left.child();
            let right = node.right.child();
            for child in [left, right].into_iter().flatten() {
                assert_eq!(
                    self.nodes[child].parent,
                    Some(id),
                    "INVARIANT VIOLATED: child {} of {} has parent {:?}",
                    child, id, self.nodes[child].parent
                );
                stack.push(child);
            }
            let height = 1 + self.height(left).max(self.height(right));
            assert_eq!(node.height, height, "INVARIANT VIOLATED: height of {}", id);
            let skew = self.height(left) as i64 - self.height(right) as i64;
            assert!(skew.abs() <= 1, "INVARIANT VIOLATED: node {} skew {}", id, skew);
            let len = self.subtree_len(left) + self.subtree_len(right) + node.block.len();
            assert_eq!(node.len.get(), len, "INVARIANT VIOLATED: subtree count of {}", id);
        }
        assert_eq!(reached, self.nodes.len(), "INVARIANT VIOLATED: unreachable nodes in slab");

        let order = self.ids();
        let mut seen = FxHashSet::default();
        for (position, &id) in order.iter().enumerate() {
            assert!(seen.insert(id), "INVARIANT VIOLATED: node {} visited twice", id);
            let node = &self.nodes[id];
            let expected_left = match position {
                0 => Link::Absent,
                _ => Link::Thread(order[position - 1]),
            };
            if node.left.child().is_none() {
                assert_eq!(node.left, expected_left, "INVARIANT VIOLATED: left thread of {}", id);
            }
            let expected_right = match order.get(position + 1) {
                Some(&next) => Link::Thread(next),
                None => Link::Absent,
            };
            if node.right.child().is_none() {
                assert_eq!(node.right, expected_right, "INVARIANT VIOLATED: right thread of {}", id);
            }
        }
        assert_eq!(order.len(), self.nodes.len(), "INVARIANT VIOLATED: in-order walk missed nodes");
    }
}
