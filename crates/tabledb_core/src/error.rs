//! Error types for the record store.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend failure.
    #[error("storage error: {0}")]
    Storage(#[from] tabledb_storage::StorageError),

    /// I/O error outside the storage backend (directory, lock file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The journal is corrupted and the store must not open.
    #[error("journal corruption: {message}")]
    JournalCorruption {
        /// Description of the corruption.
        message: String,
    },

    /// A frame checksum did not match its contents.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the frame.
        expected: u32,
        /// Checksum computed over the frame contents.
        actual: u32,
    },

    /// Encoding or decoding a batch payload failed.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the failure.
        message: String,
    },

    /// A mutation targeted a table that was never defined.
    #[error("table not found: {table}")]
    TableNotFound {
        /// Name of the missing table.
        table: String,
    },

    /// An update or destroy targeted an id absent from its table.
    #[error("record not found: {id} in table {table}")]
    RecordNotFound {
        /// Table that was searched.
        table: String,
        /// The id that was not found.
        id: String,
    },

    /// A create carried an id some table already holds.
    #[error("duplicate id: {id} already exists in table {table}")]
    DuplicateId {
        /// Table already holding the id.
        table: String,
        /// The colliding id.
        id: String,
    },

    /// Id allocation gave up after too many colliding tokens.
    #[error("id space exhausted after {attempts} attempts")]
    IdSpaceExhausted {
        /// Number of tokens tried.
        attempts: u32,
    },

    /// Another handle holds the store's advisory lock.
    #[error("store locked: another process has exclusive access")]
    StoreLocked,

    /// The store directory or its contents are not usable.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the problem.
        message: String,
    },
}

impl StoreError {
    /// Creates a journal corruption error.
    pub fn journal_corruption(message: impl Into<String>) -> Self {
        Self::JournalCorruption {
            message: message.into(),
        }
    }

    /// Creates a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Creates a table-not-found error.
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Creates a record-not-found error.
    pub fn record_not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            table: table.into(),
            id: id.into(),
        }
    }

    /// Creates a duplicate-id error.
    pub fn duplicate_id(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            table: table.into(),
            id: id.into(),
        }
    }

    /// Creates an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}
