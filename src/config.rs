use crate::error::{Result, SetError};

// =============================================================================
// Configuration
// =============================================================================

/// Nodes a fresh arena holds before growing; the backing arrays get one more
/// slot for the sentinel.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
/// Live-to-backing ratio at or below which compaction may shrink the arena.
pub const DEFAULT_SHRINK_FACTOR: f64 = 0.25;
/// Compaction never shrinks the arena below this backing length (sentinel
/// slot included).
pub const DEFAULT_SHRINK_MIN_LENGTH: usize = 64;
/// Node ids are `u32`; slot 0 is the sentinel.
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// Construction-time tuning for a [`LongTreeSet`](crate::LongTreeSet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetConfig {
    pub initial_capacity: usize,
    pub shrink_factor: f64,
    pub shrink_min_length: usize,
    /// Compact instead of growing when an exhausted arena is at least half tombstones.
    pub auto_compact: bool,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
            shrink_min_length: DEFAULT_SHRINK_MIN_LENGTH,
            auto_compact: true,
        }
    }
}

impl SetConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_shrink_factor(mut self, factor: f64) -> Self {
        self.shrink_factor = factor;
        self
    }

    pub fn with_shrink_min_length(mut self, length: usize) -> Self {
        self.shrink_min_length = length;
        self
    }

    pub fn with_auto_compact(mut self, enabled: bool) -> Self {
        self.auto_compact = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity > MAX_CAPACITY {
            return Err(SetError::InvalidArgument(format!(
                "initial capacity {} exceeds {}",
                self.initial_capacity, MAX_CAPACITY
            )));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor <= 1.0) {
            return Err(SetError::InvalidArgument(format!(
                "shrink factor {} is outside (0, 1]",
                self.shrink_factor
            )));
        }
        if self.shrink_min_length > MAX_CAPACITY {
            return Err(SetError::InvalidArgument(format!(
                "shrink minimum length {} exceeds {}",
                self.shrink_min_length, MAX_CAPACITY
            )));
        }
        Ok(())
    }
}
