//! One-pass construction of a balanced tree from sorted, duplicate-free keys.
//!
//! Keys are placed into slots `1..=n` in order, then linked by repeatedly taking
//! the median of each range. Sibling subtrees differ in size by at most one, so
//! every level above `full = floor(log2(n + 1))` is complete and only the level
//! at depth `full` may be partially filled. The coloring strategies pick which
//! levels are red; any choice that keeps the partial level red, never colors two
//! adjacent levels red, and leaves the root black satisfies the red-black rules.

use log::debug;

use crate::arena::{Color, NodeId, Side};
use crate::config::MAX_CAPACITY;
use crate::error::{Result, SetError};
use crate::tree::Tree;

/// Color bias for trees built by [`LongTreeSet::from_sorted_unique_with`].
///
/// All strategies produce the same membership and order.
///
/// [`LongTreeSet::from_sorted_unique_with`]: crate::LongTreeSet::from_sorted_unique_with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum ColoringStrategy {
    /// Red only on the bottom level.
    #[default]
    Balanced,
    /// As few red nodes as possible, so new leaves mostly land under black parents.
    ToAdd,
    /// Red on every other level counting up from the bottom, so most removals
    /// splice out red nodes or find a red node close by.
    ToRemove,
}

impl ColoringStrategy {
    fn color_at(self, depth: u32, full: u32, partial: bool) -> Color {
        let bottom = if partial { full } else { full - 1 };
        let red = depth > 0
            && match self {
                ColoringStrategy::ToAdd => partial && depth == full,
                ColoringStrategy::Balanced => depth == bottom,
                ColoringStrategy::ToRemove => depth <= bottom && (bottom - depth) % 2 == 0,
            };
        if red {
            Color::Red
        } else {
            Color::Black
        }
    }
}

pub(crate) fn check_sorted_unique(keys: &[i64]) -> Result<()> {
    if keys.len() > MAX_CAPACITY {
        return Err(SetError::InvalidArgument(format!(
            "{} keys exceed the maximum of {}",
            keys.len(),
            MAX_CAPACITY
        )));
    }
    if let Some(i) = keys.windows(2).position(|w| w[0] >= w[1]) {
        return Err(SetError::InvalidArgument(format!(
            "keys are not strictly ascending at index {}: {} then {}",
            i + 1,
            keys[i],
            keys[i + 1]
        )));
    }
    Ok(())
}

/// Build a tree from keys already checked by [`check_sorted_unique`].
pub(crate) fn build(keys: &[i64], strategy: ColoringStrategy, min_capacity: usize) -> Tree {
    let n = keys.len();
    let mut tree = Tree::with_capacity(n.max(min_capacity));
    if n == 0 {
        return tree;
    }

    for &key in keys {
        tree.nodes.allocate(key);
    }

    let full = (n + 1).ilog2();
    let partial = !(n + 1).is_power_of_two();

    struct Frame {
        lo: usize,
        hi: usize,
        parent: NodeId,
        side: Side,
        depth: u32,
    }

    let mut stack = vec![Frame {
        lo: 0,
        hi: n,
        parent: NodeId::NIL,
        side: Side::Left,
        depth: 0,
    }];
    while let Some(Frame {
        lo,
        hi,
        parent,
        side,
        depth,
    }) = stack.pop()
    {
        if lo == hi {
            continue;
        }
        let mid = lo + (hi - lo) / 2;
        let id = NodeId::from_index(mid + 1);
        tree.nodes.set_parent(id, parent);
        tree.nodes.set_color(id, strategy.color_at(depth, full, partial));
        if parent.is_nil() {
            tree.root = id;
        } else {
            tree.nodes.set_child(parent, side, id);
        }
        stack.push(Frame {
            lo,
            hi: mid,
            parent: id,
            side: Side::Left,
            depth: depth + 1,
        });
        stack.push(Frame {
            lo: mid + 1,
            hi,
            parent: id,
            side: Side::Right,
            depth: depth + 1,
        });
    }
    tree.len = n;

    debug!("bulk loaded {n} keys ({strategy:?}, {full} full levels, partial={partial})");
    tree
}
