use std::fmt;
use std::hash::{Hash, Hasher};

use log::trace;

use crate::arena::NodeId;
use crate::bulk::{self, ColoringStrategy};
use crate::compact;
use crate::config::{SetConfig, DEFAULT_INITIAL_CAPACITY};
use crate::error::Result;
use crate::iter::{Cursor, Iter};
use crate::tree::{DeleteCase, Locate, Tree};
use crate::{KEY_MAX, KEY_MIN};

// =============================================================================
// LongTreeSet
// =============================================================================

/// An ordered set of `i64` keys stored as a red-black tree in flat arrays.
///
/// Removal unlinks nodes but leaves their slots behind as tombstones until
/// [`compactify`](Self::compactify) (or an automatic compaction on growth)
/// reclaims them.
///
/// The cached bounds follow an inverted convention on an empty set:
/// [`lower_bound`](Self::lower_bound) is [`KEY_MAX`] and
/// [`upper_bound`](Self::upper_bound) is [`KEY_MIN`], so `lower_bound() <= k`
/// and `k <= upper_bound()` are both false for every `k`.
#[derive(Clone)]
pub struct LongTreeSet {
    pub(crate) tree: Tree,
    mod_count: u64,
    lower: i64,
    upper: i64,
    config: SetConfig,
}

impl LongTreeSet {
    pub fn new() -> Self {
        Self::from_tree(Tree::with_capacity(DEFAULT_INITIAL_CAPACITY), SetConfig::default())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(SetConfig::default().with_initial_capacity(capacity))
    }

    pub fn with_config(config: SetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_tree(Tree::with_capacity(config.initial_capacity), config))
    }

    /// Build a set from strictly ascending keys in one pass, with
    /// [`ColoringStrategy::Balanced`].
    pub fn from_sorted_unique(keys: &[i64]) -> Result<Self> {
        Self::from_sorted_unique_with(keys, ColoringStrategy::Balanced)
    }

    /// Build a set from strictly ascending keys in one pass.
    ///
    /// Fails with [`SetError::InvalidArgument`](crate::SetError::InvalidArgument)
    /// if the keys are out of order or repeat.
    pub fn from_sorted_unique_with(keys: &[i64], strategy: ColoringStrategy) -> Result<Self> {
        bulk::check_sorted_unique(keys)?;
        let config = SetConfig::default();
        let tree = bulk::build(keys, strategy, config.initial_capacity);
        Ok(Self::from_tree(tree, config))
    }

    fn from_tree(tree: Tree, config: SetConfig) -> Self {
        let mut set = Self {
            tree,
            mod_count: 0,
            lower: KEY_MAX,
            upper: KEY_MIN,
            config,
        };
        set.reset_bounds();
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.len == 0
    }

    /// Number of keys the arena holds before it must grow or compact.
    pub fn capacity(&self) -> usize {
        self.tree.nodes.backing_len() - 1
    }

    /// Slots left behind by removals and not yet reclaimed.
    pub fn tombstones(&self) -> usize {
        self.tree.nodes.tombstones()
    }

    /// Counter bumped by every structural change.
    #[inline]
    pub fn mod_count(&self) -> u64 {
        self.mod_count
    }

    pub fn config(&self) -> &SetConfig {
        &self.config
    }

    /// Drop every key and start over with a fresh arena.
    pub fn clear(&mut self) {
        self.tree = Tree::with_capacity(self.config.initial_capacity);
        self.lower = KEY_MAX;
        self.upper = KEY_MIN;
        self.mod_count += 1;
    }

    pub fn contains(&self, key: i64) -> bool {
        !self.tree.find(key).is_nil()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Returns `true` if `key` was not already present.
    pub fn add(&mut self, key: i64) -> bool {
        let (mut parent, mut side) = match self.tree.locate(key) {
            Locate::Found(_) => return false,
            Locate::Vacant(parent, side) => (parent, side),
        };

        let nodes = &self.tree.nodes;
        if self.config.auto_compact && nodes.is_full() && nodes.tombstones() * 2 >= nodes.backing_len()
        {
            self.compactify();
            match self.tree.locate(key) {
                Locate::Vacant(p, s) => (parent, side) = (p, s),
                Locate::Found(_) => return false,
            }
        }

        self.tree.insert_at(key, parent, side);
        self.mod_count += 1;
        if key < self.lower {
            self.lower = key;
        }
        if key > self.upper {
            self.upper = key;
        }
        true
    }

    /// Returns `true` if any key was added.
    pub fn add_all(&mut self, keys: impl IntoIterator<Item = i64>) -> bool {
        keys.into_iter().fold(false, |changed, k| self.add(k) | changed)
    }

    /// Returns `true` if `key` was present.
    pub fn remove(&mut self, key: i64) -> bool {
        self.remove_traced(key).is_some()
    }

    /// Returns `true` if any key was removed.
    pub fn remove_all(&mut self, keys: impl IntoIterator<Item = i64>) -> bool {
        keys.into_iter().fold(false, |changed, k| self.remove(k) | changed)
    }

    pub(crate) fn remove_traced(&mut self, key: i64) -> Option<DeleteCase> {
        let node = self.tree.find(key);
        if node.is_nil() {
            return None;
        }
        Some(self.delete_node(node))
    }

    pub(crate) fn delete_node(&mut self, node: NodeId) -> DeleteCase {
        let key = self.tree.nodes.key(node);
        let case = self.tree.delete(node);
        self.mod_count += 1;
        trace!(
            "removed {key}: {:?} children, spliced {:?} node on {:?}, fix-up {:?}",
            case.children,
            case.color,
            case.side,
            case.fixup
        );
        if self.tree.len == 0 {
            self.lower = KEY_MAX;
            self.upper = KEY_MIN;
        } else {
            if key == self.lower {
                self.lower = self.tree.nodes.key(self.tree.first());
            }
            if key == self.upper {
                self.upper = self.tree.nodes.key(self.tree.last());
            }
        }
        case
    }

    /// Rewrite live nodes into a contiguous prefix of the arena, shrinking it
    /// when the set has become sparse. Invalidates outstanding cursors.
    pub fn compactify(&mut self) {
        compact::compactify(&mut self.tree, &self.config);
        self.mod_count += 1;
    }

    // =========================================================================
    // Bounds
    // =========================================================================

    /// Smallest key, or [`KEY_MAX`] when empty.
    #[inline]
    pub fn lower_bound(&self) -> i64 {
        self.lower
    }

    /// Largest key, or [`KEY_MIN`] when empty.
    #[inline]
    pub fn upper_bound(&self) -> i64 {
        self.upper
    }

    fn reset_bounds(&mut self) {
        if self.tree.len == 0 {
            self.lower = KEY_MAX;
            self.upper = KEY_MIN;
        } else {
            self.lower = self.tree.nodes.key(self.tree.first());
            self.upper = self.tree.nodes.key(self.tree.last());
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Fail-fast cursor positioned before the smallest key.
    pub fn iterator(&self) -> Cursor {
        Cursor::new(self.tree.first(), self.tree.generation, self.mod_count)
    }

    /// Fail-fast cursor positioned before the smallest key `>= value`.
    pub fn tail_iterator(&self, value: i64) -> Cursor {
        Cursor::new(self.tree.ceiling(value), self.tree.generation, self.mod_count)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.tree, self.tree.first())
    }

    /// Keys `>= value` in ascending order.
    pub fn iter_from(&self, value: i64) -> Iter<'_> {
        Iter::new(&self.tree, self.tree.ceiling(value))
    }

    /// Sorted snapshot of the keys.
    pub fn to_vec(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.iter());
        out
    }

    /// Sum of each key's 32-bit hash; independent of layout and coloring.
    pub fn content_hash(&self) -> i32 {
        self.iter()
            .fold(0i32, |acc, k| acc.wrapping_add(long_hash(k)))
    }
}

/// Folds the high half of a key into the low half.
#[inline]
fn long_hash(key: i64) -> i32 {
    (key ^ ((key as u64) >> 32) as i64) as i32
}

impl Default for LongTreeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for LongTreeSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for LongTreeSet {}

impl Hash for LongTreeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.content_hash());
    }
}

impl fmt::Debug for LongTreeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<i64> for LongTreeSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = Self::new();
        set.add_all(iter);
        set
    }
}

impl Extend<i64> for LongTreeSet {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<'a> IntoIterator for &'a LongTreeSet {
    type Item = i64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
