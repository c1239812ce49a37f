//! Tri-state field value for nullable record fields.
//!
//! # Responsibility
//! - Keep "key absent" and "explicit null" distinguishable after validation.
//!
//! # Invariants
//! - `Field::Absent` is never serialized when paired with
//!   `#[serde(skip_serializing_if = "Field::is_absent")]`.
//! - `Field::Null` always serializes as JSON `null`.

use serde::{Serialize, Serializer};

/// Value of an optional, nullable record field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    /// The key was not supplied.
    #[default]
    Absent,
    /// The key was supplied with an explicit `null`.
    Null,
    /// The key was supplied with a value.
    Value(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the carried value, treating absent and null alike.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Maps a storage column value: SQL `NULL` reads back as explicit null.
    pub fn from_column(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl Field<String> {
    pub fn as_deref(&self) -> Option<&str> {
        self.value().map(String::as_str)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}
