//! Store directory layout and locking.
//!
//! A persistent store is a directory:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK           # advisory lock, one handle at a time
//! └─ journal.tdb    # batch-framed commit log
//! ```
//!
//! The LOCK file keeps a second process (or a second handle in the same
//! process) from opening the store while it is in use; the store is
//! strictly single-writer.

use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const JOURNAL_FILE: &str = "journal.tdb";

/// An opened store directory holding the advisory lock.
///
/// The lock is released when the `StoreDir` is dropped.
#[derive(Debug)]
pub struct StoreDir {
    path: PathBuf,
    fresh: bool,
    _lock_file: File,
}

impl StoreDir {
    /// Opens or creates a store directory and acquires its lock.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidState`] if the directory is missing and
    ///   `create_if_missing` is false, or the path is not a directory
    /// - [`StoreError::StoreLocked`] if another handle holds the lock
    /// - I/O errors
    pub fn open(path: &Path, create_if_missing: bool) -> StoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StoreError::invalid_state(format!(
                    "store directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(StoreError::invalid_state(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let fresh = !path.join(JOURNAL_FILE).exists();

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::StoreLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            fresh,
            _lock_file: lock_file,
        })
    }

    /// Returns the store directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if no journal existed when the directory was opened.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Returns the path of the journal file.
    #[must_use]
    pub fn journal_path(&self) -> PathBuf {
        self.path.join(JOURNAL_FILE)
    }
}
