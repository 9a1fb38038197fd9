//! Red-black balancing over the node arena.
//!
//! Both fix-up loops walk upward through `parent` links instead of recursing,
//! and dispatch on small case enums ([`InsertFixup`], [`DeleteFixup`]) that are
//! classified separately from the rotations that act on them.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::arena::{Color, NodeArena, NodeId, Side};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique tag for a freshly laid out arena.
pub(crate) fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Insertion fix-up cases for a red node whose parent is also red.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum InsertFixup {
    /// Recolor parent and uncle black, grandparent red, continue at the grandparent.
    UncleRed,
    /// Node is the inner grandchild: rotate the parent to make it outer.
    UncleBlackInner,
    /// Node is the outer grandchild: recolor and rotate the grandparent.
    UncleBlackOuter,
}

/// Deletion fix-up cases for a node carrying an extra black.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum DeleteFixup {
    SiblingRed,
    SiblingBlackBothBlack,
    /// Sibling's child on the same side as the fixed node is red, the far one black.
    SiblingBlackNearRed,
    SiblingBlackFarRed,
}

/// Whether the node being removed had two children (so its successor was spliced).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Children {
    Two,
    AtMostOne,
}

/// Classification of one removal: what was spliced and how fix-up started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DeleteCase {
    pub(crate) children: Children,
    pub(crate) color: Color,
    /// `None` when the spliced node was the root.
    pub(crate) side: Option<Side>,
    /// First fix-up case taken, `None` if the loop never ran.
    pub(crate) fixup: Option<DeleteFixup>,
}

/// Where a key sits, or would sit, in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Locate {
    Found(NodeId),
    /// Parent (sentinel for an empty tree) and the side to hang the new leaf on.
    Vacant(NodeId, Side),
}

#[derive(Debug)]
pub(crate) struct Tree {
    pub(crate) nodes: NodeArena,
    pub(crate) root: NodeId,
    pub(crate) len: usize,
    /// Changes whenever node ids stop being comparable: a new arena, a clone,
    /// or a compaction.
    pub(crate) generation: u64,
}

impl Clone for Tree {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            generation: next_generation(),
        }
    }
}

impl Tree {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeArena::with_capacity(capacity),
            root: NodeId::NIL,
            len: 0,
            generation: next_generation(),
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub(crate) fn locate(&self, key: i64) -> Locate {
        let mut parent = NodeId::NIL;
        let mut side = Side::Left;
        let mut current = self.root;
        while !current.is_nil() {
            let k = self.nodes.key(current);
            if key == k {
                return Locate::Found(current);
            }
            parent = current;
            side = if key < k { Side::Left } else { Side::Right };
            current = self.nodes.child(current, side);
        }
        Locate::Vacant(parent, side)
    }

    pub(crate) fn find(&self, key: i64) -> NodeId {
        match self.locate(key) {
            Locate::Found(id) => id,
            Locate::Vacant(..) => NodeId::NIL,
        }
    }

    /// Node holding the smallest key `>= key`, or the sentinel.
    pub(crate) fn ceiling(&self, key: i64) -> NodeId {
        let mut best = NodeId::NIL;
        let mut current = self.root;
        while !current.is_nil() {
            let k = self.nodes.key(current);
            if k == key {
                return current;
            }
            if k > key {
                best = current;
                current = self.nodes.left(current);
            } else {
                current = self.nodes.right(current);
            }
        }
        best
    }

    #[inline]
    pub(crate) fn first(&self) -> NodeId {
        self.nodes.leftmost(self.root)
    }

    #[inline]
    pub(crate) fn last(&self) -> NodeId {
        self.nodes.rightmost(self.root)
    }

    // =========================================================================
    // Rotations
    // =========================================================================

    /// Rotate `node` down toward `dir`; its child on the other side takes its place.
    fn rotate(&mut self, node: NodeId, dir: Side) {
        let up = self.nodes.child(node, dir.opposite());
        debug_assert!(!up.is_nil(), "rotation needs a child to lift");

        let inner = self.nodes.child(up, dir);
        self.nodes.set_child(node, dir.opposite(), inner);
        if !inner.is_nil() {
            self.nodes.set_parent(inner, node);
        }

        let parent = self.nodes.parent(node);
        self.nodes.set_parent(up, parent);
        if self.nodes.is_root(node) {
            self.root = up;
        } else {
            let side = self.nodes.side_of(node, parent);
            self.nodes.set_child(parent, side, up);
        }

        self.nodes.set_child(up, dir, node);
        self.nodes.set_parent(node, up);
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Hang a new red leaf at a vacant slot and rebalance.
    pub(crate) fn insert_at(&mut self, key: i64, parent: NodeId, side: Side) -> NodeId {
        let node = self.nodes.allocate(key);
        self.nodes.set_parent(node, parent);
        if parent.is_nil() {
            self.root = node;
        } else {
            self.nodes.set_child(parent, side, node);
        }
        self.len += 1;
        self.insert_fixup(node);
        node
    }

    /// Returns `None` once `node`'s parent is black (or `node` is the root).
    /// Otherwise the case plus the side of the grandparent the parent hangs from.
    pub(crate) fn classify_insert(&self, node: NodeId) -> Option<(InsertFixup, Side)> {
        let parent = self.nodes.parent(node);
        if !self.nodes.is_red(parent) {
            return None;
        }
        // A red parent is never the root, so the grandparent is real.
        let grandparent = self.nodes.parent(parent);
        debug_assert!(!grandparent.is_nil());
        let parent_side = self.nodes.side_of(parent, grandparent);
        let uncle = self.nodes.child(grandparent, parent_side.opposite());
        let case = if self.nodes.is_red(uncle) {
            InsertFixup::UncleRed
        } else if self.nodes.side_of(node, parent) != parent_side {
            InsertFixup::UncleBlackInner
        } else {
            InsertFixup::UncleBlackOuter
        };
        Some((case, parent_side))
    }

    fn insert_fixup(&mut self, mut node: NodeId) {
        while let Some((case, side)) = self.classify_insert(node) {
            let parent = self.nodes.parent(node);
            let grandparent = self.nodes.parent(parent);
            match case {
                InsertFixup::UncleRed => {
                    let uncle = self.nodes.child(grandparent, side.opposite());
                    self.nodes.set_color(parent, Color::Black);
                    self.nodes.set_color(uncle, Color::Black);
                    self.nodes.set_color(grandparent, Color::Red);
                    node = grandparent;
                }
                InsertFixup::UncleBlackInner => {
                    // Next round classifies the old parent as the outer case.
                    self.rotate(parent, side);
                    node = parent;
                }
                InsertFixup::UncleBlackOuter => {
                    self.nodes.set_color(parent, Color::Black);
                    self.nodes.set_color(grandparent, Color::Red);
                    self.rotate(grandparent, side.opposite());
                }
            }
        }
        let root = self.root;
        if !root.is_nil() {
            self.nodes.set_color(root, Color::Black);
        }
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Unlink `node` (a live node) and rebalance.
    ///
    /// A node with two children takes its successor's key, and the successor's
    /// slot is the one spliced out and tombstoned.
    pub(crate) fn delete(&mut self, node: NodeId) -> DeleteCase {
        debug_assert!(!node.is_nil());
        let two_children =
            !self.nodes.left(node).is_nil() && !self.nodes.right(node).is_nil();
        let (children, spliced) = if two_children {
            let successor = self.nodes.leftmost(self.nodes.right(node));
            let key = self.nodes.key(successor);
            self.nodes.set_key(node, key);
            (Children::Two, successor)
        } else {
            (Children::AtMostOne, node)
        };

        let replacement = if self.nodes.left(spliced).is_nil() {
            self.nodes.right(spliced)
        } else {
            self.nodes.left(spliced)
        };
        let parent = self.nodes.parent(spliced);
        let color = self.nodes.color(spliced);

        if !replacement.is_nil() {
            self.nodes.set_parent(replacement, parent);
        }
        let side = if parent.is_nil() {
            self.root = replacement;
            None
        } else {
            let side = self.nodes.side_of(spliced, parent);
            self.nodes.set_child(parent, side, replacement);
            Some(side)
        };

        self.nodes.free(spliced);
        self.len -= 1;

        let fixup = match (color, side) {
            (Color::Black, Some(side)) => self.delete_fixup(replacement, parent, side),
            _ => {
                if !replacement.is_nil() {
                    self.nodes.set_color(replacement, Color::Black);
                }
                None
            }
        };

        DeleteCase {
            children,
            color,
            side,
            fixup,
        }
    }

    /// `node` (possibly the sentinel) hangs from `parent` on `side`.
    pub(crate) fn classify_delete(&self, parent: NodeId, side: Side) -> DeleteFixup {
        let sibling = self.nodes.child(parent, side.opposite());
        debug_assert!(!sibling.is_nil(), "black-height forces a real sibling");
        if self.nodes.is_red(sibling) {
            return DeleteFixup::SiblingRed;
        }
        let near = self.nodes.child(sibling, side);
        let far = self.nodes.child(sibling, side.opposite());
        if self.nodes.is_red(far) {
            DeleteFixup::SiblingBlackFarRed
        } else if self.nodes.is_red(near) {
            DeleteFixup::SiblingBlackNearRed
        } else {
            DeleteFixup::SiblingBlackBothBlack
        }
    }

    fn delete_fixup(
        &mut self,
        mut node: NodeId,
        mut parent: NodeId,
        mut side: Side,
    ) -> Option<DeleteFixup> {
        let mut first = None;
        while !parent.is_nil() && self.nodes.is_black(node) {
            let case = self.classify_delete(parent, side);
            first.get_or_insert(case);
            let sibling = self.nodes.child(parent, side.opposite());
            match case {
                DeleteFixup::SiblingRed => {
                    self.nodes.set_color(sibling, Color::Black);
                    self.nodes.set_color(parent, Color::Red);
                    self.rotate(parent, side);
                }
                DeleteFixup::SiblingBlackBothBlack => {
                    self.nodes.set_color(sibling, Color::Red);
                    node = parent;
                    parent = self.nodes.parent(node);
                    if !parent.is_nil() {
                        side = self.nodes.side_of(node, parent);
                    }
                }
                DeleteFixup::SiblingBlackNearRed => {
                    let near = self.nodes.child(sibling, side);
                    self.nodes.set_color(near, Color::Black);
                    self.nodes.set_color(sibling, Color::Red);
                    self.rotate(sibling, side.opposite());
                }
                DeleteFixup::SiblingBlackFarRed => {
                    let far = self.nodes.child(sibling, side.opposite());
                    let parent_color = self.nodes.color(parent);
                    self.nodes.set_color(sibling, parent_color);
                    self.nodes.set_color(parent, Color::Black);
                    self.nodes.set_color(far, Color::Black);
                    self.rotate(parent, side);
                    node = self.root;
                    parent = NodeId::NIL;
                }
            }
        }
        if !node.is_nil() {
            self.nodes.set_color(node, Color::Black);
        }
        first
    }
}
