//! Generic rule evaluation over an untyped JSON object.
//!
//! # Invariants
//! - Every declared field is checked; defects are collected, never
//!   short-circuited across fields.
//! - One field contributes at most one defect (first failing rule).
//! - Defaults are substituted only after every field passed.
//! - Undeclared keys are ignored.

use crate::model::field::Field;
use crate::validate::error::{FieldError, FieldErrorKind, ValidationFailure, ROOT_FIELD};
use crate::validate::schema::{FieldSpec, FieldType};
use serde_json::{Map, Value};

/// Field value after type, presence and nullability checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Checked {
    Absent,
    Null,
    Integer(i64),
    Text(String),
}

/// Checked values of one input, in field declaration order.
#[derive(Debug)]
pub(crate) struct CheckedRecord {
    values: Vec<(&'static str, Checked)>,
}

impl CheckedRecord {
    fn take(&mut self, name: &'static str) -> Checked {
        self.values
            .iter_mut()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| std::mem::replace(value, Checked::Absent))
            .unwrap_or(Checked::Absent)
    }

    pub(crate) fn optional_integer(&mut self, name: &'static str) -> Option<i64> {
        match self.take(name) {
            Checked::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn required_integer(&mut self, name: &'static str) -> Result<i64, FieldError> {
        match self.take(name) {
            Checked::Integer(value) => Ok(value),
            _ => Err(FieldError::new(name, FieldErrorKind::MissingRequired)),
        }
    }

    pub(crate) fn nullable_integer(&mut self, name: &'static str) -> Field<i64> {
        match self.take(name) {
            Checked::Integer(value) => Field::Value(value),
            Checked::Null => Field::Null,
            _ => Field::Absent,
        }
    }

    pub(crate) fn required_text(&mut self, name: &'static str) -> Result<String, FieldError> {
        match self.take(name) {
            Checked::Text(value) => Ok(value),
            _ => Err(FieldError::new(name, FieldErrorKind::MissingRequired)),
        }
    }

    pub(crate) fn nullable_text(&mut self, name: &'static str) -> Field<String> {
        match self.take(name) {
            Checked::Text(value) => Field::Value(value),
            Checked::Null => Field::Null,
            _ => Field::Absent,
        }
    }
}

/// Checks `input` against `fields` and applies declared defaults.
pub(crate) fn check_fields(
    input: &Value,
    fields: &'static [FieldSpec],
) -> Result<CheckedRecord, ValidationFailure> {
    let object = match input {
        Value::Object(object) => object,
        other => {
            return Err(ValidationFailure::from(FieldError::new(
                ROOT_FIELD,
                FieldErrorKind::TypeMismatch {
                    expected: "object",
                    found: json_type_name(other),
                },
            )));
        }
    };

    let mut values = Vec::with_capacity(fields.len());
    let mut errors = Vec::new();
    for spec in fields {
        match check_field(spec, object) {
            Ok(value) => values.push((spec.name, value)),
            Err(kind) => errors.push(FieldError::new(spec.name, kind)),
        }
    }

    if let Some(failure) = ValidationFailure::from_errors(errors) {
        return Err(failure);
    }

    for ((_, value), spec) in values.iter_mut().zip(fields) {
        if let (true, Some(default)) = (matches!(value, Checked::Absent), spec.default) {
            *value = Checked::Text(default.to_string());
        }
    }

    Ok(CheckedRecord { values })
}

fn check_field(spec: &FieldSpec, object: &Map<String, Value>) -> Result<Checked, FieldErrorKind> {
    let value = match object.get(spec.name) {
        None if spec.required => return Err(FieldErrorKind::MissingRequired),
        None => return Ok(Checked::Absent),
        Some(Value::Null) if spec.nullable && !spec.required => return Ok(Checked::Null),
        Some(Value::Null) => return Err(FieldErrorKind::InvalidNull),
        Some(value) => value,
    };

    let mismatch = || FieldErrorKind::TypeMismatch {
        expected: spec.ty.as_str(),
        found: json_type_name(value),
    };

    match spec.ty {
        FieldType::Integer => value.as_i64().map(Checked::Integer).ok_or_else(mismatch),
        FieldType::String => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if let Some(min) = spec.min_chars {
                let actual = text.chars().count();
                if actual < min {
                    return Err(FieldErrorKind::TooShort { min, actual });
                }
            }
            Ok(Checked::Text(text.to_string()))
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_i64() => "integer",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "out-of-range integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
