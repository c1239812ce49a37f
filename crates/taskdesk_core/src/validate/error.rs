//! Validation failure types.

use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Pseudo-field name used when the input itself is not an object.
pub const ROOT_FIELD: &str = "$";

/// Reason a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Runtime JSON type differs from the declared type.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Required field is absent.
    MissingRequired,
    /// String is shorter than the declared minimum (in characters).
    TooShort { min: usize, actual: usize },
    /// Explicit `null` on a field that does not accept it.
    InvalidNull,
}

impl FieldErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::MissingRequired => "missing_required",
            Self::TooShort { .. } => "too_short",
            Self::InvalidNull => "invalid_null",
        }
    }
}

impl Display for FieldErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::MissingRequired => write!(f, "required"),
            Self::TooShort { min, .. } => write!(f, "minimum length is {min}"),
            Self::InvalidNull => write!(f, "must not be null"),
        }
    }
}

/// One named defect in a candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: &'static str, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// Human-readable reason without the field prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

impl Error for FieldError {}

/// Complete, ordered list of field defects for one input.
///
/// # Invariants
/// - Never empty.
/// - Errors follow the record kind's field declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
}

impl ValidationFailure {
    /// Client-error status the request boundary should answer with.
    pub const STATUS_CODE: u16 = 400;

    /// Builds a failure from collected errors.
    ///
    /// Returns `None` for an empty list so an empty failure cannot exist.
    pub fn from_errors(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the error reported for `field`, if any.
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }

    /// Field names in reported order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|error| error.field).collect()
    }

    /// Renders `{"errors":[{"field":..,"message":..}]}` for the boundary layer.
    pub fn to_response_body(&self) -> Value {
        let errors: Vec<Value> = self
            .errors
            .iter()
            .map(|error| {
                json!({
                    "field": error.field,
                    "message": error.message(),
                })
            })
            .collect();
        json!({ "errors": errors })
    }
}

impl From<FieldError> for ValidationFailure {
    fn from(value: FieldError) -> Self {
        Self {
            errors: vec![value],
        }
    }
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "record validation failed: ")?;
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl Error for ValidationFailure {}
