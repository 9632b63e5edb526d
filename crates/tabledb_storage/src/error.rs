//! Error types for storage backends.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read was requested beyond the end of the store.
    #[error("read past end of store: offset {offset}, len {len}, store is {size} bytes")]
    ReadPastEnd {
        /// Requested read offset.
        offset: u64,
        /// Requested read length.
        len: usize,
        /// Current store size.
        size: u64,
    },

    /// A truncation target exceeded the current store size.
    #[error("cannot truncate to {target} bytes, store is only {size} bytes")]
    TruncateBeyondEnd {
        /// Requested new size.
        target: u64,
        /// Current store size.
        size: u64,
    },
}
