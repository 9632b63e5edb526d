//! Embedded, file-persisted record store.
//!
//! `tabledb_core` keeps named tables of flexible records in memory and
//! makes them durable through a batch-framed journal. Mutations are
//! described as data ([`CommitMaterial`]), applied in all-or-nothing
//! batches, and every record carries a globally unique base36 id.
//!
//! The write path is persist-then-fold: a batch is staged on a scratch
//! copy of the snapshot (which validates it), appended durably to the
//! journal, and only then swapped into the live snapshot. A batch that
//! fails at any step leaves both disk and memory untouched.
//!
//! ```rust
//! use tabledb_core::{Database, Fields, Value};
//!
//! let db = Database::open_in_memory()?;
//! db.commit(&[db.define("actors")])?;
//!
//! let fields = Fields::from([("cash".to_string(), Value::from(5000i64))]);
//! let affected = db.commit(&[db.create("actors", fields)?])?;
//! assert_eq!(affected.len(), 1);
//! # Ok::<(), tabledb_core::StoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod dir;
mod error;
mod gateway;
mod id;
mod journal;
mod mutation;
pub mod schema;
mod snapshot;
mod value;

pub use config::Config;
pub use database::Database;
pub use dir::StoreDir;
pub use error::{StoreError, StoreResult};
pub use gateway::PersistenceGateway;
pub use id::{allocate_id, Base36Tokens, RecordId, TokenSource};
pub use journal::Journal;
pub use mutation::{create_with_id, define, destroy, update, CommitMaterial};
pub use schema::{FieldType, TableSchema};
pub use snapshot::{AffectedRecords, Located, Table, TableSet};
pub use value::{Fields, Value};
