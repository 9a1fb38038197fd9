//! Node storage for the red-black tree.
//!
//! Nodes live in parallel arrays indexed by [`NodeId`]. Slot 0 is the nil
//! sentinel: it has no key, is always black, and stands in for both "no child"
//! and "no parent". It is never written.
//!
//! Slots are handed out from a free suffix (`next..len`). Removing a node from
//! the tree only tombstones its slot; tombstones are reclaimed wholesale by
//! compaction, which rewrites live nodes into a contiguous prefix.

use log::trace;

use crate::config::MAX_CAPACITY;

// =============================================================================
// Node ids and colors
// =============================================================================

/// Handle to a node slot. Only meaningful for the arena generation that issued it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const NIL: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= MAX_CAPACITY);
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child link of a parent a node hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct NodeArena {
    keys: Vec<i64>,
    left: Vec<NodeId>,
    right: Vec<NodeId>,
    parent: Vec<NodeId>,
    /// One bit per slot, set when the node is red.
    red: Vec<u64>,
    /// First slot of the free suffix.
    next: usize,
    tombstones: usize,
}

impl NodeArena {
    /// Create an arena able to hold `capacity` nodes before growing.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let len = capacity.clamp(1, MAX_CAPACITY) + 1;
        Self {
            keys: vec![0; len],
            left: vec![NodeId::NIL; len],
            right: vec![NodeId::NIL; len],
            parent: vec![NodeId::NIL; len],
            red: vec![0; len.div_ceil(64)],
            next: 1,
            tombstones: 0,
        }
    }

    /// Length of the backing arrays, sentinel slot included.
    #[inline]
    pub(crate) fn backing_len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Slots handed out so far, tombstones included.
    #[inline]
    pub(crate) fn allocated(&self) -> usize {
        self.next - 1
    }

    /// True when the next allocation has to grow the backing arrays.
    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.next == self.keys.len()
    }

    fn grow(&mut self) {
        let old_len = self.keys.len();
        assert!(old_len <= MAX_CAPACITY, "node arena exhausted");
        let new_len = old_len.saturating_mul(2).min(MAX_CAPACITY + 1);
        trace!("growing node arena from {old_len} to {new_len} slots");
        self.keys.resize(new_len, 0);
        self.left.resize(new_len, NodeId::NIL);
        self.right.resize(new_len, NodeId::NIL);
        self.parent.resize(new_len, NodeId::NIL);
        self.red.resize(new_len.div_ceil(64), 0);
    }

    /// Take a slot from the free suffix, growing by doubling if there is none.
    ///
    /// The new node is red with all links pointing at the sentinel.
    pub(crate) fn allocate(&mut self, key: i64) -> NodeId {
        if self.is_full() {
            self.grow();
        }
        let id = NodeId::from_index(self.next);
        self.next += 1;
        let i = id.index();
        self.keys[i] = key;
        self.left[i] = NodeId::NIL;
        self.right[i] = NodeId::NIL;
        self.parent[i] = NodeId::NIL;
        self.set_color(id, Color::Red);
        id
    }

    /// Tombstone a slot that has already been unlinked from the tree.
    pub(crate) fn free(&mut self, id: NodeId) {
        debug_assert!(!id.is_nil());
        debug_assert!(id.index() < self.next);
        let i = id.index();
        self.left[i] = NodeId::NIL;
        self.right[i] = NodeId::NIL;
        self.parent[i] = NodeId::NIL;
        self.set_color(id, Color::Black);
        self.tombstones += 1;
    }

    // -------------------------------------------------------------------------
    // Field access
    // -------------------------------------------------------------------------

    #[inline]
    pub(crate) fn key(&self, id: NodeId) -> i64 {
        debug_assert!(!id.is_nil(), "the sentinel has no key");
        self.keys[id.index()]
    }

    #[inline]
    pub(crate) fn left(&self, id: NodeId) -> NodeId {
        self.left[id.index()]
    }

    #[inline]
    pub(crate) fn right(&self, id: NodeId) -> NodeId {
        self.right[id.index()]
    }

    #[inline]
    pub(crate) fn parent(&self, id: NodeId) -> NodeId {
        self.parent[id.index()]
    }

    #[inline]
    pub(crate) fn child(&self, id: NodeId, side: Side) -> NodeId {
        match side {
            Side::Left => self.left(id),
            Side::Right => self.right(id),
        }
    }

    #[inline]
    pub(crate) fn color(&self, id: NodeId) -> Color {
        if id.is_nil() {
            return Color::Black;
        }
        let i = id.index();
        if self.red[i / 64] & (1u64 << (i % 64)) != 0 {
            Color::Red
        } else {
            Color::Black
        }
    }

    #[inline]
    pub(crate) fn is_red(&self, id: NodeId) -> bool {
        self.color(id) == Color::Red
    }

    #[inline]
    pub(crate) fn is_black(&self, id: NodeId) -> bool {
        self.color(id) == Color::Black
    }

    #[inline]
    pub(crate) fn set_key(&mut self, id: NodeId, key: i64) {
        debug_assert!(!id.is_nil());
        self.keys[id.index()] = key;
    }

    #[inline]
    pub(crate) fn set_left(&mut self, id: NodeId, child: NodeId) {
        debug_assert!(!id.is_nil());
        self.left[id.index()] = child;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, id: NodeId, child: NodeId) {
        debug_assert!(!id.is_nil());
        self.right[id.index()] = child;
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        debug_assert!(!id.is_nil());
        self.parent[id.index()] = parent;
    }

    #[inline]
    pub(crate) fn set_child(&mut self, id: NodeId, side: Side, child: NodeId) {
        match side {
            Side::Left => self.set_left(id, child),
            Side::Right => self.set_right(id, child),
        }
    }

    #[inline]
    pub(crate) fn set_color(&mut self, id: NodeId, color: Color) {
        debug_assert!(!id.is_nil(), "the sentinel is always black");
        if id.is_nil() {
            return;
        }
        let i = id.index();
        let bit = 1u64 << (i % 64);
        match color {
            Color::Red => self.red[i / 64] |= bit,
            Color::Black => self.red[i / 64] &= !bit,
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    #[inline]
    pub(crate) fn is_root(&self, id: NodeId) -> bool {
        !id.is_nil() && self.parent(id).is_nil()
    }

    /// Side of `parent` that `id` hangs from. `id` must not be the sentinel.
    #[inline]
    pub(crate) fn side_of(&self, id: NodeId, parent: NodeId) -> Side {
        debug_assert!(!id.is_nil());
        if self.left(parent) == id {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        if id.is_nil() {
            return id;
        }
        while !self.left(id).is_nil() {
            id = self.left(id);
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        if id.is_nil() {
            return id;
        }
        while !self.right(id).is_nil() {
            id = self.right(id);
        }
        id
    }

    /// In-order successor, or the sentinel after the last node.
    pub(crate) fn successor(&self, id: NodeId) -> NodeId {
        if id.is_nil() {
            return id;
        }
        let right = self.right(id);
        if !right.is_nil() {
            return self.leftmost(right);
        }
        let mut child = id;
        let mut parent = self.parent(id);
        while !parent.is_nil() && self.right(parent) == child {
            child = parent;
            parent = self.parent(parent);
        }
        parent
    }
}
