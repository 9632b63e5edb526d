//! File-based storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Persistent storage backend over a single file.
///
/// `flush` maps to [`File::flush`]; `sync` maps to [`File::sync_all`],
/// which is what the journal calls after each committed batch when
/// `sync_on_commit` is enabled.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    file: File,
    len: u64,
}

impl FileBackend {
    /// Opens or creates the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner { file, len }),
        })
    }

    /// Opens the file at `path`, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file
    /// cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut inner = self.inner.lock();
        let size = inner.len;
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }
        if len == 0 {
            return Ok(Vec::new());
        }

        inner.file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        inner.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut inner = self.inner.lock();
        let offset = inner.len;
        if data.is_empty() {
            return Ok(offset);
        }

        // Position from the tracked length, not the physical end: bytes
        // past `len` left by a failed write must not shift later appends.
        inner.file.seek(SeekFrom::Start(offset))?;
        if let Err(err) = inner.file.write_all(data) {
            let _ = inner.file.set_len(offset);
            return Err(err.into());
        }
        inner.len += data.len() as u64;
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.lock().file.flush()?;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.inner.lock().file.sync_all()?;
        Ok(())
    }

    fn len(&self) -> StorageResult<u64> {
        Ok(self.inner.lock().len)
    }

    fn truncate(&mut self, new_len: u64) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        if new_len > inner.len {
            return Err(StorageError::TruncateBeyondEnd {
                target: new_len,
                size: inner.len,
            });
        }

        inner.file.set_len(new_len)?;
        inner.file.sync_all()?;
        inner.len = new_len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.log");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.len().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn append_then_read() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("store.log")).unwrap();

        assert_eq!(backend.append(b"alpha").unwrap(), 0);
        assert_eq!(backend.append(b"beta").unwrap(), 5);
        assert_eq!(backend.len().unwrap(), 9);

        assert_eq!(backend.read_at(0, 5).unwrap(), b"alpha");
        assert_eq!(backend.read_at(5, 4).unwrap(), b"beta");
    }

    #[test]
    fn read_past_end_is_rejected() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("store.log")).unwrap();
        backend.append(b"abc").unwrap();

        let result = backend.read_at(2, 10);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.log");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"durable bytes").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.len().unwrap(), 13);
        assert_eq!(backend.read_at(0, 13).unwrap(), b"durable bytes");
    }

    #[test]
    fn truncate_discards_tail() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("store.log")).unwrap();
        backend.append(b"keep+drop").unwrap();

        backend.truncate(4).unwrap();
        assert_eq!(backend.len().unwrap(), 4);
        assert_eq!(backend.read_at(0, 4).unwrap(), b"keep");
    }

    #[test]
    fn truncate_beyond_end_is_rejected() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("store.log")).unwrap();
        backend.append(b"xy").unwrap();

        let result = backend.truncate(100);
        assert!(matches!(result, Err(StorageError::TruncateBeyondEnd { .. })));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("store.log");

        let backend = FileBackend::open_with_create_dirs(&path).unwrap();
        assert_eq!(backend.len().unwrap(), 0);
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn append_writes_at_tracked_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.log");
        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"head").unwrap();

        // Stray bytes past the tracked length, as a failed partial write
        // would leave behind.
        let mut raw = OpenOptions::new().append(true).open(&path).unwrap();
        raw.write_all(b"????").unwrap();
        drop(raw);

        assert_eq!(backend.append(b"tail").unwrap(), 4);
        assert_eq!(backend.read_at(0, 8).unwrap(), b"headtail");
    }

    #[test]
    fn empty_append_keeps_offset() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(&dir.path().join("store.log")).unwrap();
        backend.append(b"x").unwrap();

        assert_eq!(backend.append(b"").unwrap(), 1);
        assert_eq!(backend.len().unwrap(), 1);
    }
}
