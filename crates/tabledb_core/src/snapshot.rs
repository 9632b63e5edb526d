//! In-memory projection of all tables and records.

use crate::error::{StoreError, StoreResult};
use crate::id::RecordId;
use crate::mutation::CommitMaterial;
use crate::value::Fields;
use std::collections::BTreeMap;

/// One table: record id to field set.
pub type Table = BTreeMap<RecordId, Fields>;

/// Records touched by a committed batch: id to final field set.
///
/// Holds one entry per create/update in the batch; a later write to the
/// same id overrides an earlier entry, and a destroy removes it, so the
/// map always matches final in-memory state.
pub type AffectedRecords = BTreeMap<RecordId, Fields>;

/// A record found by cross-table id lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// Name of the table holding the record.
    pub table: String,
    /// Copy of the record's field set.
    pub record: Fields,
}

/// The full in-memory snapshot: table name to table.
///
/// A `TableSet` is rebuilt once from the journal at open time and then
/// mutated only by the committer's fold. Readers get deep copies, never
/// references into the live maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    tables: BTreeMap<String, Table>,
}

impl TableSet {
    /// Creates an empty snapshot with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of all defined tables.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Returns true if `table` has been defined.
    #[must_use]
    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Returns true if any table holds a record under `id`.
    #[must_use]
    pub fn contains_id(&self, id: &RecordId) -> bool {
        self.tables.values().any(|table| table.contains_key(id))
    }

    /// Returns the total number of records across all tables.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    /// Returns a deep copy of `table`.
    ///
    /// The copy shares nothing with the live snapshot: mutating it does
    /// not affect the store, and later commits do not affect it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the table was never
    /// defined.
    pub fn read_table(&self, table: &str) -> StoreResult<Table> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::table_not_found(table))
    }

    /// Finds the record stored under `id` in any table.
    ///
    /// Returns a copy together with the owning table's name, or `None` if
    /// no table holds the id. With global id uniqueness intact there is at
    /// most one match.
    #[must_use]
    pub fn lookup(&self, id: &RecordId) -> Option<Located> {
        self.tables.iter().find_map(|(name, table)| {
            table.get(id).map(|record| Located {
                table: name.clone(),
                record: record.clone(),
            })
        })
    }

    /// Returns the name of the table holding `id`, if any.
    fn owner_of(&self, id: &RecordId) -> Option<&str> {
        self.tables
            .iter()
            .find_map(|(name, table)| table.contains_key(id).then_some(name.as_str()))
    }

    /// Applies one mutation, tracking touched records in `affected`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] or
    /// [`StoreError::RecordNotFound`] when the mutation's target does not
    /// exist, and [`StoreError::DuplicateId`] when a create's id is
    /// already held by any table. The snapshot is unchanged on error.
    pub fn apply(
        &mut self,
        mutation: &CommitMaterial,
        affected: &mut AffectedRecords,
    ) -> StoreResult<()> {
        match mutation {
            CommitMaterial::Define { table } => {
                self.tables.insert(table.clone(), Table::new());
            }

            CommitMaterial::Create { table, id, fields } => {
                if let Some(owner) = self.owner_of(id) {
                    return Err(StoreError::duplicate_id(owner, id.as_str()));
                }
                let entries = self
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| StoreError::table_not_found(table))?;
                entries.insert(id.clone(), fields.clone());
                affected.insert(id.clone(), fields.clone());
            }

            CommitMaterial::Update { table, id, patch } => {
                let entries = self
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| StoreError::table_not_found(table))?;
                let record = entries
                    .get_mut(id)
                    .ok_or_else(|| StoreError::record_not_found(table, id.as_str()))?;
                for (field, value) in patch {
                    record.insert(field.clone(), value.clone());
                }
                affected.insert(id.clone(), record.clone());
            }

            CommitMaterial::Destroy { table, id } => {
                let entries = self
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| StoreError::table_not_found(table))?;
                entries
                    .remove(id)
                    .ok_or_else(|| StoreError::record_not_found(table, id.as_str()))?;
                affected.remove(id);
            }
        }
        Ok(())
    }

    /// Returns a batch that reproduces this snapshot from empty.
    ///
    /// Used by journal compaction: one define per table followed by one
    /// create per record, in table order. Folding the result over a fresh
    /// `TableSet` yields an equal snapshot.
    #[must_use]
    pub fn to_bootstrap_batch(&self) -> Vec<CommitMaterial> {
        let mut batch = Vec::with_capacity(self.tables.len() + self.record_count());
        for (name, table) in &self.tables {
            batch.push(CommitMaterial::Define {
                table: name.clone(),
            });
            for (id, fields) in table {
                batch.push(CommitMaterial::Create {
                    table: name.clone(),
                    id: id.clone(),
                    fields: fields.clone(),
                });
            }
        }
        batch
    }

    /// Applies a batch sequentially, in order.
    ///
    /// On error the snapshot may be partially folded, so callers fold a
    /// scratch clone and swap it in only when the whole batch succeeds;
    /// that is how the committer keeps batches all-or-nothing.
    pub fn fold(&mut self, batch: &[CommitMaterial]) -> StoreResult<AffectedRecords> {
        let mut affected = AffectedRecords::new();
        for mutation in batch {
            self.apply(mutation, &mut affected)?;
        }
        Ok(affected)
    }
}
