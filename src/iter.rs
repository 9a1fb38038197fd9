//! In-order traversal.
//!
//! [`Iter`] borrows the set and is a plain [`Iterator`]; the borrow rules already
//! rule out mutation while it lives.
//!
//! [`Cursor`] holds no borrow. It remembers node ids together with the arena
//! generation they belong to and the set's modification stamp, takes the set as
//! an argument on every call, and refuses to touch the arena unless both match.
//! Ids from another set, a replaced set or an earlier compaction are never
//! dereferenced.

use std::iter::FusedIterator;

use log::debug;

use crate::arena::NodeId;
use crate::error::{Result, SetError};
use crate::set::LongTreeSet;
use crate::tree::Tree;

// =============================================================================
// Borrowing iterator
// =============================================================================

/// Ascending iterator over a [`LongTreeSet`], created by
/// [`LongTreeSet::iter`] or [`LongTreeSet::iter_from`].
#[derive(Clone)]
pub struct Iter<'a> {
    tree: &'a Tree,
    next: NodeId,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(tree: &'a Tree, start: NodeId) -> Self {
        Self { tree, next: start }
    }
}

impl Iterator for Iter<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.next.is_nil() {
            return None;
        }
        let key = self.tree.nodes.key(self.next);
        self.next = self.tree.nodes.successor(self.next);
        Some(key)
    }
}

impl FusedIterator for Iter<'_> {}

// =============================================================================
// Fail-fast cursor
// =============================================================================

/// A detached, fail-fast position in a [`LongTreeSet`].
///
/// Created by [`LongTreeSet::iterator`] or [`LongTreeSet::tail_iterator`]. Any
/// structural change made to the set other than through [`Cursor::remove`]
/// makes every later call fail with [`SetError::ConcurrentModification`]. So
/// does handing the cursor a set other than the one that created it.
///
/// ```rust
/// use primset::LongTreeSet;
///
/// let mut set: LongTreeSet = [3, 1, 2].into_iter().collect();
/// let mut cursor = set.iterator();
/// let mut seen = Vec::new();
/// while cursor.has_next(&set).unwrap() {
///     let key = cursor.advance(&set).unwrap();
///     if key == 2 {
///         cursor.remove(&mut set).unwrap();
///     }
///     seen.push(key);
/// }
/// assert_eq!(seen, vec![1, 2, 3]);
/// assert_eq!(set.to_vec(), vec![1, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct Cursor {
    next: NodeId,
    current: NodeId,
    generation: u64,
    stamp: u64,
}

impl Cursor {
    pub(crate) fn new(start: NodeId, generation: u64, stamp: u64) -> Self {
        Self {
            next: start,
            current: NodeId::NIL,
            generation,
            stamp,
        }
    }

    fn check(&self, set: &LongTreeSet) -> Result<()> {
        let actual = set.mod_count();
        let generation = set.tree.generation;
        if generation != self.generation || actual != self.stamp {
            debug!(
                "stale cursor: generation {} stamp {} but set is at generation {} stamp {}",
                self.generation, self.stamp, generation, actual
            );
            return Err(SetError::ConcurrentModification {
                expected: self.stamp,
                actual,
            });
        }
        Ok(())
    }

    pub fn has_next(&self, set: &LongTreeSet) -> Result<bool> {
        self.check(set)?;
        Ok(!self.next.is_nil())
    }

    /// Move to the next key and return it.
    pub fn advance(&mut self, set: &LongTreeSet) -> Result<i64> {
        self.check(set)?;
        if self.next.is_nil() {
            self.current = NodeId::NIL;
            return Err(SetError::NoCurrentElement);
        }
        let nodes = &set.tree.nodes;
        self.current = self.next;
        self.next = nodes.successor(self.next);
        Ok(nodes.key(self.current))
    }

    /// Key returned by the last successful [`advance`](Self::advance).
    pub fn value(&self, set: &LongTreeSet) -> Result<i64> {
        self.check(set)?;
        if self.current.is_nil() {
            return Err(SetError::NoCurrentElement);
        }
        Ok(set.tree.nodes.key(self.current))
    }

    /// Remove the current key from `set`. The cursor stays valid.
    pub fn remove(&mut self, set: &mut LongTreeSet) -> Result<()> {
        self.check(set)?;
        if self.current.is_nil() {
            return Err(SetError::NoCurrentElement);
        }
        let nodes = &set.tree.nodes;
        // With two children the successor's key moves into the current slot,
        // and the successor's own slot is the one unlinked.
        if !nodes.left(self.current).is_nil() && !nodes.right(self.current).is_nil() {
            self.next = self.current;
        }
        set.delete_node(self.current);
        self.current = NodeId::NIL;
        self.stamp = set.mod_count();
        Ok(())
    }
}
