//! # tabledb storage
//!
//! Append-only storage backends for tabledb.
//!
//! Backends are opaque byte stores: they append, read back, and make
//! bytes durable. The journal layer above owns all format interpretation;
//! a backend never understands frames, batches, or records.
//!
//! Two implementations are provided:
//!
//! - [`FileBackend`]: persistent storage over OS file APIs
//! - [`InMemoryBackend`]: for tests and ephemeral stores
//!
//! ```rust
//! use tabledb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"frame").unwrap();
//! assert_eq!(backend.read_at(offset, 5).unwrap(), b"frame");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
