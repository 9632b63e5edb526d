//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;

/// Storage backend that keeps all bytes in memory.
///
/// Used for unit tests and for ephemeral stores opened with
/// `Database::open_in_memory`. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    bytes: Mutex<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with `bytes`.
    ///
    /// Useful for recovery tests that need a hand-crafted log.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(bytes),
        }
    }

    /// Returns a copy of the stored bytes.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let bytes = self.bytes.lock();
        let size = bytes.len() as u64;
        let start = offset as usize;
        let end = start.saturating_add(len);

        if offset > size || end > bytes.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }
        Ok(bytes[start..end].to_vec())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut bytes = self.bytes.lock();
        let offset = bytes.len() as u64;
        bytes.extend_from_slice(data);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn len(&self) -> StorageResult<u64> {
        Ok(self.bytes.lock().len() as u64)
    }

    fn truncate(&mut self, new_len: u64) -> StorageResult<()> {
        let mut bytes = self.bytes.lock();
        let size = bytes.len() as u64;
        if new_len > size {
            return Err(StorageError::TruncateBeyondEnd {
                target: new_len,
                size,
            });
        }
        bytes.truncate(new_len as usize);
        Ok(())
    }
}
