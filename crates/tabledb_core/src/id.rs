//! Record identifiers and id allocation.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::TableSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a record.
///
/// Record ids are short random base36 tokens. Uniqueness is global: no two
/// records share an id, regardless of which table they live in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record id from an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for RecordId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// A source of candidate id tokens.
///
/// The default source is [`Base36Tokens`]. Tests substitute deterministic
/// sources to exercise collision and exhaustion paths.
pub trait TokenSource: Send {
    /// Produces the next candidate token.
    fn next_token(&mut self) -> String;
}

/// Alphabet used by [`Base36Tokens`].
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated base36 tokens.
const BASE36_TOKEN_LEN: usize = 8;

/// Random base36 token source.
///
/// Tokens are 8 characters drawn uniformly from `[0-9a-z]`, a space of
/// 36^8 (about 2.8e12) values. Collisions are rare, not absent, which is
/// why [`allocate_id`] retries against the live snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base36Tokens;

impl Base36Tokens {
    /// Creates a base36 token source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TokenSource for Base36Tokens {
    fn next_token(&mut self) -> String {
        let mut rng = rand::thread_rng();
        (0..BASE36_TOKEN_LEN)
            .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
            .collect()
    }
}

/// Allocates an id not present in any table of `tables`.
///
/// Candidates that collide with an existing id are discarded and a fresh
/// token is drawn, up to `max_attempts` times. The returned id is unique
/// with respect to the snapshot passed in; it is not reserved, so a token
/// repeated across still-pending batches slips past this check and is
/// rejected by the committer's fold instead.
///
/// # Errors
///
/// Returns [`StoreError::IdSpaceExhausted`] if every candidate collided.
pub fn allocate_id(
    tables: &TableSet,
    source: &mut dyn TokenSource,
    max_attempts: u32,
) -> StoreResult<RecordId> {
    for _ in 0..max_attempts {
        let candidate = RecordId::new(source.next_token());
        if !tables.contains_id(&candidate) {
            return Ok(candidate);
        }
    }
    Err(StoreError::IdSpaceExhausted {
        attempts: max_attempts,
    })
}
