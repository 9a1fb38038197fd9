//! # primset
//!
//! Collections keyed by fixed-width integers, stored in flat primitive arrays
//! instead of boxed nodes.
//!
//! The centerpiece is [`LongTreeSet`], an ordered `i64` set implemented as a
//! red-black tree whose nodes live in parallel arrays addressed by 32-bit ids.
//! Id 0 is a black sentinel that doubles as "no child" and "no parent".
//!
//! ## Example
//!
//! ```rust
//! use primset::{ColoringStrategy, LongTreeSet};
//!
//! let mut set = LongTreeSet::new();
//! set.add_all([14, 7, 3, 12]);
//! assert!(set.contains(7));
//! assert!(set.remove(3));
//! assert_eq!(set.to_vec(), vec![7, 12, 14]);
//! assert_eq!((set.lower_bound(), set.upper_bound()), (7, 14));
//!
//! let bulk = LongTreeSet::from_sorted_unique_with(&[7, 12, 14], ColoringStrategy::ToAdd)?;
//! assert_eq!(bulk, set);
//! # Ok::<(), primset::SetError>(())
//! ```

mod arena;
mod bulk;
mod compact;
mod config;
mod error;
mod iter;
mod set;
mod tree;

pub use bulk::ColoringStrategy;
pub use config::{
    SetConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_SHRINK_FACTOR, DEFAULT_SHRINK_MIN_LENGTH,
    MAX_CAPACITY,
};
pub use error::{Result, SetError};
pub use iter::{Cursor, Iter};
pub use set::LongTreeSet;

/// Smallest key; the upper bound reported by an empty set.
pub const KEY_MIN: i64 = i64::MIN;
/// Largest key; the lower bound reported by an empty set.
pub const KEY_MAX: i64 = i64::MAX;

#[cfg(test)]
mod proptests;
