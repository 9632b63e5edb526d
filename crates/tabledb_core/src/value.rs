//! Typed field values.

use crate::id::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The field set of one record: field name to typed value.
///
/// The core treats a record as an opaque bag of fields; schema concerns
/// belong to the validation layer described in [`crate::schema`].
pub type Fields = BTreeMap<String, Value>;

/// A typed field value.
///
/// This is the tagged union stored inside records and carried through the
/// journal. `Symbol` is an enum tag, `Timestamp` is ISO-8601 text, and
/// `Ref` names a record id expected to exist in some table. None of
/// these are enforced by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Floating-point number.
    Number(f64),
    /// Signed integer.
    Integer(i64),
    /// UTF-8 text.
    Text(String),
    /// Enum tag.
    Symbol(String),
    /// ISO-8601 timestamp, kept as text.
    Timestamp(String),
    /// Reference to a record in some table.
    Ref(RecordId),
}

impl Value {
    /// Returns the number if this value is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the integer if this value is one.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text if this value is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the enum tag if this value is one.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp text if this value is one.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&str> {
        match self {
            Value::Timestamp(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the referenced record id if this value is a reference.
    #[must_use]
    pub fn as_ref_id(&self) -> Option<&RecordId> {
        match self {
            Value::Ref(id) => Some(id),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::Ref(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Value::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Value::Integer(7).as_integer(), Some(7));
        assert_eq!(Value::Text("hi".into()).as_text(), Some("hi"));
        assert_eq!(Value::Symbol("red".into()).as_symbol(), Some("red"));
        assert_eq!(
            Value::Timestamp("2024-01-01T00:00:00Z".into()).as_timestamp(),
            Some("2024-01-01T00:00:00Z")
        );

        let id = RecordId::new("abc123");
        assert_eq!(Value::Ref(id.clone()).as_ref_id(), Some(&id));
    }

    #[test]
    fn accessors_reject_other_variants() {
        assert_eq!(Value::Integer(1).as_number(), None);
        assert_eq!(Value::Number(1.0).as_integer(), None);
        assert_eq!(Value::Symbol("x".into()).as_text(), None);
        assert_eq!(Value::Text("x".into()).as_symbol(), None);
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(1.5), Value::Number(1.5));
        assert_eq!(Value::from(42i64), Value::Integer(42));
        assert_eq!(Value::from(42i32), Value::Integer(42));
        assert_eq!(Value::from("s"), Value::Text("s".to_string()));
        assert_eq!(
            Value::from(RecordId::new("id1")),
            Value::Ref(RecordId::new("id1"))
        );
    }
}
