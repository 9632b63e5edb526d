//! Database facade.

use crate::config::Config;
use crate::dir::StoreDir;
use crate::error::{StoreError, StoreResult};
use crate::gateway::PersistenceGateway;
use crate::id::{allocate_id, Base36Tokens, RecordId, TokenSource};
use crate::journal::Journal;
use crate::mutation::{self, CommitMaterial};
use crate::snapshot::{AffectedRecords, Located, Table, TableSet};
use crate::value::Fields;
use parking_lot::Mutex;
use std::path::Path;
use tabledb_storage::{FileBackend, InMemoryBackend};
use tracing::debug;

/// An opened record store.
///
/// The handle composes the id allocator, mutation builders, committer,
/// read view, and persistence gateway into one surface bound to one
/// snapshot. All access is serialized through a single internal lock:
/// the store itself is the lock domain, and nothing can observe the
/// snapshot between a batch being persisted and being folded in.
///
/// # Example
///
/// ```rust
/// use tabledb_core::{Database, Fields, Value};
///
/// let db = Database::open_in_memory().unwrap();
/// db.commit(&[db.define("actors")]).unwrap();
///
/// let fields = Fields::from([("cash".to_string(), Value::from(5000i64))]);
/// let create = db.create("actors", fields).unwrap();
/// let affected = db.commit(&[create]).unwrap();
/// assert_eq!(affected.len(), 1);
/// ```
pub struct Database {
    config: Config,
    /// Holds the directory lock for persistent stores.
    _dir: Option<StoreDir>,
    inner: Mutex<Inner>,
}

struct Inner {
    tables: TableSet,
    gateway: Box<dyn PersistenceGateway>,
    tokens: Box<dyn TokenSource>,
}

impl Database {
    /// Opens a store at `path` with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened or locked, or
    /// if rebuilding the snapshot from the journal fails; no handle is
    /// produced in either case.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a store at `path` with custom configuration.
    ///
    /// # Errors
    ///
    /// See [`Database::open`]; additionally fails when `error_if_exists`
    /// is set and a journal is already present.
    pub fn open_with_config(path: &Path, config: Config) -> StoreResult<Self> {
        let dir = StoreDir::open(path, config.create_if_missing)?;

        if config.error_if_exists && !dir.is_fresh() {
            return Err(StoreError::invalid_state(
                "store already exists and error_if_exists is set",
            ));
        }

        let backend = FileBackend::open_with_create_dirs(&dir.journal_path())?;
        let journal = Journal::new(Box::new(backend), config.sync_on_commit);
        Self::assemble(
            config,
            Some(dir),
            Box::new(journal),
            Box::new(Base36Tokens::new()),
        )
    }

    /// Opens an ephemeral store backed by memory.
    ///
    /// Contents are lost when the handle is dropped; intended for tests.
    ///
    /// # Errors
    ///
    /// Never fails in practice; kept fallible for surface symmetry with
    /// [`Database::open`].
    pub fn open_in_memory() -> StoreResult<Self> {
        let journal = Journal::new(Box::new(InMemoryBackend::new()), false);
        Self::assemble(
            Config::default(),
            None,
            Box::new(journal),
            Box::new(Base36Tokens::new()),
        )
    }

    /// Opens a store over a pre-built gateway and token source.
    ///
    /// This is the seam used by tests that substitute failing gateways
    /// or deterministic token sources.
    ///
    /// # Errors
    ///
    /// Fails if the gateway's rebuild fails.
    pub fn open_with_gateway(
        config: Config,
        gateway: Box<dyn PersistenceGateway>,
        tokens: Box<dyn TokenSource>,
    ) -> StoreResult<Self> {
        Self::assemble(config, None, gateway, tokens)
    }

    fn assemble(
        config: Config,
        dir: Option<StoreDir>,
        mut gateway: Box<dyn PersistenceGateway>,
        tokens: Box<dyn TokenSource>,
    ) -> StoreResult<Self> {
        let tables = gateway.rebuild()?;
        debug!(
            tables = tables.table_names().len(),
            records = tables.record_count(),
            "store opened"
        );

        Ok(Self {
            config,
            _dir: dir,
            inner: Mutex::new(Inner {
                tables,
                gateway,
                tokens,
            }),
        })
    }

    // ------------------------------------------------------------------
    // Read view
    // ------------------------------------------------------------------

    /// Returns a deep copy of `table`.
    ///
    /// The copy is a snapshot at call time: mutating it does not change
    /// the store, and later commits do not change it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the table was never
    /// defined.
    pub fn read(&self, table: &str) -> StoreResult<Table> {
        self.inner.lock().tables.read_table(table)
    }

    /// Finds the record stored under `id` in any table.
    #[must_use]
    pub fn lookup(&self, id: &RecordId) -> Option<Located> {
        self.inner.lock().tables.lookup(id)
    }

    /// Returns the names of all defined tables.
    #[must_use]
    pub fn tables(&self) -> Vec<String> {
        self.inner.lock().tables.table_names()
    }

    /// Returns true if `table` has been defined.
    #[must_use]
    pub fn contains(&self, table: &str) -> bool {
        self.inner.lock().tables.contains_table(table)
    }

    /// Returns the total number of records across all tables.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.inner.lock().tables.record_count()
    }

    // ------------------------------------------------------------------
    // Mutation builders
    // ------------------------------------------------------------------

    /// Builds a define intent for `table`.
    #[must_use]
    pub fn define(&self, table: impl Into<String>) -> CommitMaterial {
        mutation::define(table)
    }

    /// Builds a create intent, allocating an id unused by any table of
    /// the committed snapshot.
    ///
    /// The id is assigned now, at build time, and is not reserved: a
    /// token repeated across two still-pending creates is not caught
    /// here. The committer's staged fold rejects the later one with
    /// [`StoreError::DuplicateId`] before anything persists, so global
    /// id uniqueness holds after every successful commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdSpaceExhausted`] if every candidate token
    /// collided.
    pub fn create(
        &self,
        table: impl Into<String>,
        fields: Fields,
    ) -> StoreResult<CommitMaterial> {
        let mut inner = self.inner.lock();
        let Inner { tables, tokens, .. } = &mut *inner;
        let id = allocate_id(tables, tokens.as_mut(), self.config.max_id_attempts)?;
        Ok(mutation::create_with_id(table, id, fields))
    }

    /// Builds an update intent patching the record at `id`.
    #[must_use]
    pub fn update(&self, table: impl Into<String>, id: RecordId, patch: Fields) -> CommitMaterial {
        mutation::update(table, id, patch)
    }

    /// Builds a destroy intent for the record at `id`.
    #[must_use]
    pub fn destroy(&self, table: impl Into<String>, id: RecordId) -> CommitMaterial {
        mutation::destroy(table, id)
    }

    // ------------------------------------------------------------------
    // Committer
    // ------------------------------------------------------------------

    /// Commits a batch: durably persists it, then folds it into the
    /// snapshot, returning the records it touched.
    ///
    /// The fold is staged on a scratch copy first, so a batch that fails
    /// validation never reaches the gateway and a batch the gateway
    /// rejects never reaches the snapshot; either way, disk and memory
    /// are left exactly as they were. Mutations apply in batch order;
    /// a later write to an id overrides an earlier one.
    ///
    /// # Errors
    ///
    /// - [`StoreError::TableNotFound`] / [`StoreError::RecordNotFound`]
    ///   when a mutation's target does not exist at its point in the batch
    /// - [`StoreError::DuplicateId`] when a create's id is already held by
    ///   any table at its point in the batch
    /// - any gateway error, surfaced unchanged
    pub fn commit(&self, batch: &[CommitMaterial]) -> StoreResult<AffectedRecords> {
        if batch.is_empty() {
            return Ok(AffectedRecords::new());
        }

        let mut inner = self.inner.lock();
        let Inner {
            tables, gateway, ..
        } = &mut *inner;

        let mut staged = tables.clone();
        let affected = staged.fold(batch)?;

        gateway.commit(batch)?;
        *tables = staged;

        debug!(
            mutations = batch.len(),
            affected = affected.len(),
            "batch committed"
        );
        Ok(affected)
    }

    /// Rewrites the journal to the minimal form reproducing the current
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway's rewrite fails.
    pub fn compact(&self) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let Inner {
            tables, gateway, ..
        } = &mut *inner;
        gateway.compact(tables)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("tables", &self.tables())
            .field("record_count", &self.record_count())
            .finish_non_exhaustive()
    }
}
