//! Declarative field-type tags.
//!
//! Table definitions describe their fields with these tags. The tags are
//! markers consumed by validation and encoding layers; the core commit
//! path never inspects them, and records remain open field bags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A table schema: field name to declared type.
pub type TableSchema = BTreeMap<String, FieldType>;

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Floating-point number.
    Number,
    /// Signed integer.
    Integer,
    /// UTF-8 text.
    Text,
    /// One of a fixed set of tags.
    Enum(Vec<String>),
    /// Reference to a record in the named table.
    Ref(String),
    /// ISO-8601 timestamp.
    Timestamp,
}

/// Tags a field as a floating-point number.
#[must_use]
pub fn num() -> FieldType {
    FieldType::Number
}

/// Tags a field as a signed integer.
#[must_use]
pub fn int() -> FieldType {
    FieldType::Integer
}

/// Tags a field as UTF-8 text.
#[must_use]
pub fn text() -> FieldType {
    FieldType::Text
}

/// Tags a field as one of a fixed set of enum tags.
#[must_use]
pub fn one_of(variants: &[&str]) -> FieldType {
    FieldType::Enum(variants.iter().map(ToString::to_string).collect())
}

/// Tags a field as a reference into the named table.
#[must_use]
pub fn refer(table: &str) -> FieldType {
    FieldType::Ref(table.to_string())
}

/// Tags a field as an ISO-8601 timestamp.
#[must_use]
pub fn iso() -> FieldType {
    FieldType::Timestamp
}
