//! Persistence gateway seam.

use crate::error::StoreResult;
use crate::mutation::CommitMaterial;
use crate::snapshot::TableSet;

/// Durably applies ordered mutation batches and reconstructs snapshots.
///
/// The database facade talks to persistence only through this trait:
/// [`rebuild`] once at open, [`commit`] once per batch. The shipped
/// implementation is [`crate::journal::Journal`]; tests substitute
/// doubles that fail on demand to exercise the all-or-nothing contract.
///
/// [`rebuild`]: PersistenceGateway::rebuild
/// [`commit`]: PersistenceGateway::commit
pub trait PersistenceGateway: Send {
    /// Reconstructs the full in-memory snapshot from persisted storage.
    ///
    /// Called once when the store is opened. May repair a torn tail left
    /// by a crash mid-write, which is why it takes `&mut self`.
    ///
    /// # Errors
    ///
    /// Any error here fails the open; no handle is produced.
    fn rebuild(&mut self) -> StoreResult<TableSet>;

    /// Durably applies one ordered batch.
    ///
    /// # Errors
    ///
    /// On error the caller treats the batch as never having happened; the
    /// gateway must not leave a half-applied batch visible to a later
    /// [`rebuild`].
    ///
    /// [`rebuild`]: PersistenceGateway::rebuild
    fn commit(&mut self, batch: &[CommitMaterial]) -> StoreResult<()>;

    /// Rewrites storage to the minimal form reproducing `tables`.
    ///
    /// Gateways without a rewritable log may leave this as the default
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewrite fails; the previous log contents
    /// may then be partially replaced.
    fn compact(&mut self, tables: &TableSet) -> StoreResult<()> {
        let _ = tables;
        Ok(())
    }
}
