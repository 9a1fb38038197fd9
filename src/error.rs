use thiserror::Error;

/// Errors reported by [`LongTreeSet`](crate::LongTreeSet) and its cursors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    /// The set was structurally modified after the cursor captured its stamp.
    #[error("set was modified during iteration (expected stamp {expected}, found {actual})")]
    ConcurrentModification { expected: u64, actual: u64 },

    /// The cursor has not been advanced yet, is exhausted, or its element was removed.
    #[error("cursor has no current element")]
    NoCurrentElement,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, SetError>;
