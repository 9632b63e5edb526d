//! Mutation intents and their builders.

use crate::id::RecordId;
use crate::value::Fields;
use serde::{Deserialize, Serialize};

/// One pending mutation, prior to being committed.
///
/// Builders construct these as plain values; nothing touches storage or
/// the in-memory snapshot until the batch is handed to `commit`. Batches
/// are encoded with the journal's CBOR codec, so the whole enum is
/// serde-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommitMaterial {
    /// Create an empty table, replacing any existing table of that name.
    Define {
        /// Table to define.
        table: String,
    },
    /// Insert a new record under a freshly allocated id.
    Create {
        /// Target table.
        table: String,
        /// Id assigned at build time.
        id: RecordId,
        /// Full field set of the new record.
        fields: Fields,
    },
    /// Overlay a partial patch onto an existing record.
    Update {
        /// Target table.
        table: String,
        /// Id of the record to patch.
        id: RecordId,
        /// Changed fields only; untouched fields are retained.
        patch: Fields,
    },
    /// Remove a record.
    Destroy {
        /// Target table.
        table: String,
        /// Id of the record to remove.
        id: RecordId,
    },
}

impl CommitMaterial {
    /// Returns the table this mutation targets.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Define { table }
            | Self::Create { table, .. }
            | Self::Update { table, .. }
            | Self::Destroy { table, .. } => table,
        }
    }

    /// Returns the record id this mutation targets, if any.
    #[must_use]
    pub fn id(&self) -> Option<&RecordId> {
        match self {
            Self::Define { .. } => None,
            Self::Create { id, .. } | Self::Update { id, .. } | Self::Destroy { id, .. } => {
                Some(id)
            }
        }
    }
}

/// Builds a define intent for `table`.
pub fn define(table: impl Into<String>) -> CommitMaterial {
    CommitMaterial::Define {
        table: table.into(),
    }
}

/// Builds a create intent with a pre-allocated id.
///
/// Callers normally use `Database::create`, which allocates the id from
/// the live snapshot; this constructor exists for replay and for callers
/// that manage ids themselves.
pub fn create_with_id(
    table: impl Into<String>,
    id: RecordId,
    fields: Fields,
) -> CommitMaterial {
    CommitMaterial::Create {
        table: table.into(),
        id,
        fields,
    }
}

/// Builds an update intent patching the record at `id`.
pub fn update(table: impl Into<String>, id: RecordId, patch: Fields) -> CommitMaterial {
    CommitMaterial::Update {
        table: table.into(),
        id,
        patch,
    }
}

/// Builds a destroy intent for the record at `id`.
pub fn destroy(table: impl Into<String>, id: RecordId) -> CommitMaterial {
    CommitMaterial::Destroy {
        table: table.into(),
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn builders_are_pure_intents() {
        let cm = define("actors");
        assert_eq!(cm.table(), "actors");
        assert_eq!(cm.id(), None);

        let id = RecordId::new("abc");
        let patch = Fields::from([("cash".to_string(), Value::from(10i64))]);
        let cm = update("actors", id.clone(), patch.clone());
        assert_eq!(
            cm,
            CommitMaterial::Update {
                table: "actors".to_string(),
                id: id.clone(),
                patch,
            }
        );
        assert_eq!(cm.id(), Some(&id));

        let cm = destroy("actors", id.clone());
        assert_eq!(
            cm,
            CommitMaterial::Destroy {
                table: "actors".to_string(),
                id,
            }
        );
    }

    #[test]
    fn create_keeps_given_id_and_fields() {
        let fields = Fields::from([("cash".to_string(), Value::from(5000i64))]);
        let cm = create_with_id("actors", RecordId::new("xyz"), fields.clone());

        match cm {
            CommitMaterial::Create {
                table,
                id,
                fields: f,
            } => {
                assert_eq!(table, "actors");
                assert_eq!(id.as_str(), "xyz");
                assert_eq!(f, fields);
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }
}
