//! Batch-framed commit log.
//!
//! The journal is the shipped [`PersistenceGateway`]: an append-only log
//! where each frame holds one whole committed batch.
//!
//! ## Frame format
//!
//! ```text
//! | magic (4) | version (2) | length (4) | payload (N) | crc32 (4) |
//! ```
//!
//! The payload is the batch as CBOR (`Vec<CommitMaterial>` via serde).
//! The CRC covers everything before it. Framing per batch, not per
//! mutation, is what makes batches all-or-nothing on disk: a frame either
//! replays completely or is not a frame.
//!
//! ## Recovery policy
//!
//! Rebuild distinguishes tolerated from fatal conditions:
//!
//! - **Tolerated** (clean end of log): a truncated header or truncated
//!   payload at the tail. This is a crash mid-write before sync; the
//!   partial frame is discarded and the log truncated back to the last
//!   complete frame.
//! - **Fatal** (open fails): CRC mismatch, bad magic, unsupported
//!   version, undecodable payload, or a replayed batch referencing a
//!   missing table or record. These indicate real corruption and the
//!   store must not open over them.

use crate::error::{StoreError, StoreResult};
use crate::gateway::PersistenceGateway;
use crate::mutation::CommitMaterial;
use crate::snapshot::TableSet;
use tabledb_storage::StorageBackend;
use tracing::{debug, warn};

/// Magic bytes opening every frame.
const FRAME_MAGIC: [u8; 4] = *b"TDBJ";

/// Current frame format version.
const FRAME_VERSION: u16 = 1;

/// Frame header size: magic (4) + version (2) + length (4).
const HEADER_LEN: usize = 10;

/// CRC trailer size.
const CRC_LEN: usize = 4;

/// Append-only commit log over a [`StorageBackend`].
pub struct Journal {
    backend: Box<dyn StorageBackend>,
    sync_on_commit: bool,
}

impl Journal {
    /// Creates a journal over `backend`.
    ///
    /// When `sync_on_commit` is set, every committed batch is synced to
    /// durable storage before `commit` returns.
    pub fn new(backend: Box<dyn StorageBackend>, sync_on_commit: bool) -> Self {
        Self {
            backend,
            sync_on_commit,
        }
    }

    /// Encodes one batch into a framed byte sequence.
    pub(crate) fn encode_frame(batch: &[CommitMaterial]) -> StoreResult<Vec<u8>> {
        let mut payload = Vec::new();
        ciborium::ser::into_writer(&batch, &mut payload)
            .map_err(|e| StoreError::codec(e.to_string()))?;

        let len = u32::try_from(payload.len())
            .map_err(|_| StoreError::codec("batch payload exceeds 4 GiB frame limit"))?;

        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
        frame.extend_from_slice(&FRAME_MAGIC);
        frame.extend_from_slice(&FRAME_VERSION.to_le_bytes());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&payload);

        let crc = crc32fast::hash(&frame);
        frame.extend_from_slice(&crc.to_le_bytes());
        Ok(frame)
    }

    /// Reads every complete frame, returning the decoded batches and the
    /// offset where the last complete frame ends.
    fn scan(&self) -> StoreResult<(Vec<Vec<CommitMaterial>>, u64)> {
        let size = self.backend.len()?;
        let mut offset = 0u64;
        let mut batches = Vec::new();

        while offset < size {
            let remaining = (size - offset) as usize;
            if remaining < HEADER_LEN {
                // Torn header at the tail: crash mid-write.
                break;
            }

            let header = self.backend.read_at(offset, HEADER_LEN)?;
            if header[0..4] != FRAME_MAGIC {
                return Err(StoreError::journal_corruption(format!(
                    "bad frame magic at offset {offset}"
                )));
            }
            let version = u16::from_le_bytes([header[4], header[5]]);
            if version != FRAME_VERSION {
                return Err(StoreError::journal_corruption(format!(
                    "unsupported frame version {version} at offset {offset}"
                )));
            }
            let payload_len =
                u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;

            let frame_len = HEADER_LEN + payload_len + CRC_LEN;
            if remaining < frame_len {
                // Torn payload at the tail: crash mid-write.
                break;
            }

            let body = self.backend.read_at(offset, frame_len)?;
            let (covered, trailer) = body.split_at(HEADER_LEN + payload_len);
            let expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
            let actual = crc32fast::hash(covered);
            if expected != actual {
                return Err(StoreError::ChecksumMismatch { expected, actual });
            }

            let batch: Vec<CommitMaterial> =
                ciborium::de::from_reader(&covered[HEADER_LEN..]).map_err(|e| {
                    StoreError::journal_corruption(format!(
                        "undecodable batch payload at offset {offset}: {e}"
                    ))
                })?;

            batches.push(batch);
            offset += frame_len as u64;
        }

        Ok((batches, offset))
    }

    /// Returns the current journal size in bytes.
    pub fn len(&self) -> StoreResult<u64> {
        Ok(self.backend.len()?)
    }

    /// Returns true if the journal holds no frames.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.backend.is_empty()?)
    }
}

impl PersistenceGateway for Journal {
    fn rebuild(&mut self) -> StoreResult<TableSet> {
        let (batches, clean_len) = self.scan()?;

        let size = self.backend.len()?;
        if clean_len < size {
            warn!(
                discarded = size - clean_len,
                "discarding torn tail frame left by interrupted write"
            );
            self.backend.truncate(clean_len)?;
        }

        let mut tables = TableSet::new();
        for batch in &batches {
            // A validated committer wrote these frames; a fold failure
            // means the log does not match anything it could have produced.
            tables.fold(batch).map_err(|e| {
                StoreError::journal_corruption(format!("replayed batch does not fold: {e}"))
            })?;
        }

        debug!(
            batches = batches.len(),
            records = tables.record_count(),
            "journal rebuild complete"
        );
        Ok(tables)
    }

    fn commit(&mut self, batch: &[CommitMaterial]) -> StoreResult<()> {
        let frame = Self::encode_frame(batch)?;
        let offset = self.backend.append(&frame)?;
        let flushed = if self.sync_on_commit {
            self.backend.sync()
        } else {
            self.backend.flush()
        };
        if let Err(err) = flushed {
            // A frame reported as failed must not replay on the next open.
            let _ = self.backend.truncate(offset);
            return Err(err.into());
        }
        Ok(())
    }

    fn compact(&mut self, tables: &TableSet) -> StoreResult<()> {
        let frame = Self::encode_frame(&tables.to_bootstrap_batch())?;
        self.backend.truncate(0)?;
        self.backend.append(&frame)?;
        self.backend.sync()?;
        debug!(bytes = frame.len(), "journal compacted");
        Ok(())
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("sync_on_commit", &self.sync_on_commit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;
    use crate::mutation::{create_with_id, define, update};
    use crate::value::{Fields, Value};
    use tabledb_storage::InMemoryBackend;

    fn sample_batch() -> Vec<CommitMaterial> {
        vec![
            define("actors"),
            create_with_id(
                "actors",
                RecordId::new("a1"),
                Fields::from([("cash".to_string(), Value::from(5000i64))]),
            ),
        ]
    }

    fn journal_over(bytes: Vec<u8>) -> Journal {
        Journal::new(Box::new(InMemoryBackend::with_bytes(bytes)), false)
    }

    #[test]
    fn empty_journal_rebuilds_empty_snapshot() {
        let mut journal = journal_over(Vec::new());
        assert!(journal.is_empty().unwrap());

        let tables = journal.rebuild().unwrap();
        assert!(tables.table_names().is_empty());
    }

    #[test]
    fn commit_then_rebuild_roundtrip() {
        let mut journal = journal_over(Vec::new());
        journal.commit(&sample_batch()).unwrap();
        journal
            .commit(&[update(
                "actors",
                RecordId::new("a1"),
                Fields::from([("cash".to_string(), Value::from(100i64))]),
            )])
            .unwrap();

        assert!(!journal.is_empty().unwrap());
        let tables = journal.rebuild().unwrap();
        let actors = tables.read_table("actors").unwrap();
        assert_eq!(
            actors[&RecordId::new("a1")],
            Fields::from([("cash".to_string(), Value::from(100i64))])
        );
    }

    #[test]
    fn torn_tail_frame_is_discarded() {
        let frame1 = Journal::encode_frame(&sample_batch()).unwrap();
        let frame2 = Journal::encode_frame(&[define("places")]).unwrap();

        let mut bytes = frame1.clone();
        bytes.extend_from_slice(&frame2[..frame2.len() / 2]);

        let mut journal = journal_over(bytes);
        let tables = journal.rebuild().unwrap();

        assert!(tables.contains_table("actors"));
        assert!(!tables.contains_table("places"));
        // Tail repaired: the log ends at the last complete frame.
        assert_eq!(journal.len().unwrap(), frame1.len() as u64);
    }

    #[test]
    fn torn_header_is_discarded() {
        let mut bytes = Journal::encode_frame(&sample_batch()).unwrap();
        bytes.extend_from_slice(b"TDB"); // fewer bytes than a header

        let mut journal = journal_over(bytes);
        let tables = journal.rebuild().unwrap();
        assert!(tables.contains_table("actors"));
    }

    #[test]
    fn appends_after_torn_tail_replay_cleanly() {
        let frame1 = Journal::encode_frame(&sample_batch()).unwrap();
        let mut bytes = frame1;
        bytes.extend_from_slice(&[0xAA]); // partial garbage at the tail

        let mut journal = journal_over(bytes);
        journal.rebuild().unwrap();
        journal.commit(&[define("places")]).unwrap();

        let tables = journal.rebuild().unwrap();
        assert!(tables.contains_table("actors"));
        assert!(tables.contains_table("places"));
    }

    #[test]
    fn crc_mismatch_is_fatal() {
        let mut bytes = Journal::encode_frame(&sample_batch()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;

        let mut journal = journal_over(bytes);
        assert!(matches!(
            journal.rebuild(),
            Err(StoreError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn bad_magic_is_fatal() {
        let mut bytes = Journal::encode_frame(&sample_batch()).unwrap();
        bytes[0] = b'X';

        let mut journal = journal_over(bytes);
        assert!(matches!(
            journal.rebuild(),
            Err(StoreError::JournalCorruption { .. })
        ));
    }

    #[test]
    fn unsupported_version_is_fatal() {
        let mut bytes = Journal::encode_frame(&sample_batch()).unwrap();
        bytes[4] = 0xFF;

        let mut journal = journal_over(bytes);
        assert!(matches!(
            journal.rebuild(),
            Err(StoreError::JournalCorruption { .. })
        ));
    }

    #[test]
    fn corrupt_non_tail_frame_is_fatal() {
        let mut frame1 = Journal::encode_frame(&sample_batch()).unwrap();
        let frame2 = Journal::encode_frame(&[define("places")]).unwrap();
        let mid = frame1.len() / 2;
        frame1[mid] ^= 0x01;
        frame1.extend_from_slice(&frame2);

        let mut journal = journal_over(frame1);
        assert!(journal.rebuild().is_err());
    }

    #[test]
    fn failed_sync_leaves_no_frame_behind() {
        use std::io;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use tabledb_storage::{StorageError, StorageResult};

        struct FlakySyncBackend {
            inner: InMemoryBackend,
            fail: Arc<AtomicBool>,
        }

        impl StorageBackend for FlakySyncBackend {
            fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
                self.inner.read_at(offset, len)
            }
            fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
                self.inner.append(data)
            }
            fn flush(&mut self) -> StorageResult<()> {
                self.inner.flush()
            }
            fn sync(&mut self) -> StorageResult<()> {
                if self.fail.load(Ordering::SeqCst) {
                    return Err(StorageError::Io(io::Error::other("sync failed")));
                }
                self.inner.sync()
            }
            fn len(&self) -> StorageResult<u64> {
                self.inner.len()
            }
            fn truncate(&mut self, new_len: u64) -> StorageResult<()> {
                self.inner.truncate(new_len)
            }
        }

        let fail = Arc::new(AtomicBool::new(false));
        let backend = FlakySyncBackend {
            inner: InMemoryBackend::new(),
            fail: Arc::clone(&fail),
        };
        let mut journal = Journal::new(Box::new(backend), true);
        journal.commit(&sample_batch()).unwrap();
        let len_before = journal.len().unwrap();

        fail.store(true, Ordering::SeqCst);
        assert!(journal.commit(&[define("places")]).is_err());
        assert_eq!(journal.len().unwrap(), len_before);

        fail.store(false, Ordering::SeqCst);
        let tables = journal.rebuild().unwrap();
        assert!(tables.contains_table("actors"));
        assert!(!tables.contains_table("places"));
    }

    #[test]
    fn compact_preserves_snapshot_and_shrinks_log() {
        let mut journal = journal_over(Vec::new());
        journal.commit(&sample_batch()).unwrap();
        for i in 0..20i64 {
            journal
                .commit(&[update(
                    "actors",
                    RecordId::new("a1"),
                    Fields::from([("cash".to_string(), Value::from(i))]),
                )])
                .unwrap();
        }

        let before = journal.rebuild().unwrap();
        let len_before = journal.len().unwrap();

        journal.compact(&before).unwrap();
        assert!(journal.len().unwrap() < len_before);

        let after = journal.rebuild().unwrap();
        assert_eq!(before, after);
    }
}
