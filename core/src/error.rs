//! Error types for table operations.

use std::fmt;

/// Errors that can occur while mutating the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The key is already present (inserts never overwrite).
    KeyExists,

    /// The random walk ran out of displacement steps before finding a
    /// free slot. The table is left unchanged; growing the table or
    /// raising the step budget makes room.
    DisplacementExhausted,

    /// The default key value is reserved to mark empty slots and cannot
    /// be stored.
    SentinelKey,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyExists => write!(f, "key already exists"),
            Self::DisplacementExhausted => write!(f, "displacement budget exhausted"),
            Self::SentinelKey => write!(f, "the default key is reserved for empty slots"),
        }
    }
}

impl std::error::Error for TableError {}

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;
