//! Storage backend trait.

use crate::error::StorageResult;

/// An append-only byte store.
///
/// Backends are opaque: callers write framed data with [`append`] and read
/// it back with [`read_at`]. The only structural operation is [`truncate`],
/// used by the journal when discarding a torn tail or rewriting the log
/// after compaction.
///
/// # Invariants
///
/// - `append` returns the offset the data was written at, which equals the
///   store length before the call
/// - `read_at` returns exactly the bytes previously appended at that range
/// - after `sync` returns, all appended bytes survive process termination
///
/// [`append`]: StorageBackend::append
/// [`read_at`]: StorageBackend::read_at
/// [`truncate`]: StorageBackend::truncate
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadPastEnd`] if the range extends beyond
    /// the current store size, or an I/O error.
    ///
    /// [`StorageError::ReadPastEnd`]: crate::StorageError::ReadPastEnd
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends bytes to the end of the store, returning the write offset.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Pushes buffered writes to the operating system.
    fn flush(&mut self) -> StorageResult<()>;

    /// Makes all appended bytes durable (data and metadata).
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current store size in bytes.
    fn len(&self) -> StorageResult<u64>;

    /// Returns true if the store holds no bytes.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Discards all bytes at and after `new_len`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TruncateBeyondEnd`] if `new_len` exceeds the
    /// current size.
    ///
    /// [`StorageError::TruncateBeyondEnd`]: crate::StorageError::TruncateBeyondEnd
    fn truncate(&mut self, new_len: u64) -> StorageResult<()>;
}
