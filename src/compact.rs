//! Reclaiming tombstoned slots.
//!
//! Live nodes are rewritten in key order into slots `1..=len` of a fresh arena,
//! keeping the tree's shape and colors. Everything past the prefix becomes the
//! free suffix. The fresh arena is smaller than the old one only when the set
//! has become sparse enough and the smaller arena would still be reasonably
//! sized.

use log::debug;

use crate::arena::{NodeArena, NodeId, Side};
use crate::config::SetConfig;
use crate::tree::{next_generation, Tree};

/// Outcome of one compaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CompactStats {
    pub(crate) live: usize,
    pub(crate) reclaimed: usize,
    pub(crate) old_backing_len: usize,
    pub(crate) new_backing_len: usize,
}

/// Backing length to compact into, given the live count.
///
/// A sparse arena shrinks to the smallest power of two that fits the live nodes
/// plus the sentinel, but never below `shrink_min_length`.
pub(crate) fn target_backing_len(live: usize, backing_len: usize, config: &SetConfig) -> usize {
    let sparse = (live as f64) / (backing_len as f64) <= config.shrink_factor;
    let shrunk = (live + 1)
        .next_power_of_two()
        .max(config.shrink_min_length)
        .max(2);
    if sparse && shrunk < backing_len {
        shrunk
    } else {
        backing_len
    }
}

pub(crate) fn compactify(tree: &mut Tree, config: &SetConfig) -> CompactStats {
    let old = &tree.nodes;
    let old_backing_len = old.backing_len();
    let reclaimed = old.tombstones();
    let new_backing_len = target_backing_len(tree.len, old_backing_len, config);

    let mut nodes = NodeArena::with_capacity(new_backing_len - 1);

    // Old slot -> new slot; entries for tombstones and unused slots stay nil.
    let mut remap = vec![NodeId::NIL; old_backing_len];
    let mut order = Vec::with_capacity(tree.len);
    let mut id = old.leftmost(tree.root);
    while !id.is_nil() {
        let new_id = nodes.allocate(old.key(id));
        nodes.set_color(new_id, old.color(id));
        remap[id.index()] = new_id;
        order.push(id);
        id = old.successor(id);
    }
    debug_assert_eq!(order.len(), tree.len);

    for &old_id in &order {
        let new_id = remap[old_id.index()];
        nodes.set_parent(new_id, remap[old.parent(old_id).index()]);
        for side in [Side::Left, Side::Right] {
            nodes.set_child(new_id, side, remap[old.child(old_id, side).index()]);
        }
    }

    debug_assert_eq!(nodes.allocated(), tree.len);
    tree.root = remap[tree.root.index()];
    tree.nodes = nodes;
    tree.generation = next_generation();

    let stats = CompactStats {
        live: tree.len,
        reclaimed,
        old_backing_len,
        new_backing_len,
    };
    debug!(
        "compacted {} live nodes, reclaimed {} tombstones, backing length {} -> {}",
        stats.live, stats.reclaimed, stats.old_backing_len, stats.new_backing_len
    );
    stats
}
