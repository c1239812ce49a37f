//! Record validation and normalization.
//!
//! # Responsibility
//! - Turn untyped JSON input into normalized `Task`/`SubTask`/`Todo` records.
//! - Report every field defect of an input as one ordered failure.
//!
//! # Invariants
//! - Validation is pure: no I/O besides one diagnostic log event.
//! - No coercion: numeric-looking strings are not integers.
//! - Validating a normalized record's JSON again yields the same record.
//!
//! # See also
//! - `schema` for the per-kind field rules.

mod engine;
pub mod error;
pub mod schema;

use crate::model::record::{Record, RecordKind, SubTask, Task, Todo};
use engine::{check_fields, CheckedRecord};
use error::{FieldError, ValidationFailure};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

/// Normalized record kind that can be produced from untyped input.
pub trait RecordSchema: Serialize + Sized {
    const KIND: RecordKind;

    /// Validates `input` and builds the normalized record.
    fn validate(input: &Value) -> Result<Self, ValidationFailure>;
}

impl RecordSchema for Task {
    const KIND: RecordKind = RecordKind::Task;

    fn validate(input: &Value) -> Result<Self, ValidationFailure> {
        validate_task(input)
    }
}

impl RecordSchema for SubTask {
    const KIND: RecordKind = RecordKind::SubTask;

    fn validate(input: &Value) -> Result<Self, ValidationFailure> {
        validate_sub_task(input)
    }
}

impl RecordSchema for Todo {
    const KIND: RecordKind = RecordKind::Todo;

    fn validate(input: &Value) -> Result<Self, ValidationFailure> {
        validate_todo(input)
    }
}

/// Validates a candidate task.
pub fn validate_task(input: &Value) -> Result<Task, ValidationFailure> {
    run(RecordKind::Task, input, |mut record| {
        Ok(Task {
            id: record.optional_integer("id"),
            user_id: record.nullable_integer("user_id"),
            team_id: record.nullable_integer("team_id"),
            title: record.required_text("title")?,
            description: record.nullable_text("description"),
            status: record.required_text("status")?,
            due_date: record.nullable_text("due_date"),
        })
    })
}

/// Validates a candidate sub-task. `task_id` is mandatory.
pub fn validate_sub_task(input: &Value) -> Result<SubTask, ValidationFailure> {
    run(RecordKind::SubTask, input, |mut record| {
        Ok(SubTask {
            id: record.optional_integer("id"),
            task_id: record.required_integer("task_id")?,
            title: record.required_text("title")?,
            description: record.nullable_text("description"),
            status: record.required_text("status")?,
            due_date: record.nullable_text("due_date"),
        })
    })
}

/// Validates a candidate todo.
pub fn validate_todo(input: &Value) -> Result<Todo, ValidationFailure> {
    run(RecordKind::Todo, input, |mut record| {
        Ok(Todo {
            id: record.optional_integer("id"),
            user_id: record.nullable_integer("user_id"),
            team_id: record.nullable_integer("team_id"),
            title: record.required_text("title")?,
            description: record.nullable_text("description"),
            status: record.required_text("status")?,
            due_date: record.nullable_text("due_date"),
        })
    })
}

/// Validates `input` as a record of the given kind.
pub fn validate_record(kind: RecordKind, input: &Value) -> Result<Record, ValidationFailure> {
    match kind {
        RecordKind::Task => validate_task(input).map(Record::Task),
        RecordKind::SubTask => validate_sub_task(input).map(Record::SubTask),
        RecordKind::Todo => validate_todo(input).map(Record::Todo),
    }
}

fn run<T>(
    kind: RecordKind,
    input: &Value,
    build: impl FnOnce(CheckedRecord) -> Result<T, FieldError>,
) -> Result<T, ValidationFailure> {
    let result = check_fields(input, schema::fields_for(kind))
        .and_then(|record| build(record).map_err(ValidationFailure::from));

    // Only field names are logged; values are caller data.
    match &result {
        Ok(_) => debug!("event=record_validate module=validate status=ok kind={kind}"),
        Err(failure) => info!(
            "event=record_validate module=validate status=error kind={kind} error_count={} fields={}",
            failure.errors().len(),
            failure.fields().join(",")
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{validate_record, validate_sub_task, validate_task, validate_todo};
    use crate::model::field::Field;
    use crate::model::record::{Record, RecordKind};
    use crate::validate::error::FieldErrorKind;
    use serde_json::json;

    #[test]
    fn minimal_sub_task_gets_pending_status() {
        let sub_task = validate_sub_task(&json!({ "task_id": 1, "title": "Test Sub-Task" }))
            .expect("minimal sub-task is valid");
        assert_eq!(sub_task.task_id, 1);
        assert_eq!(sub_task.status, "PENDING");
        assert_eq!(sub_task.id, None);
        assert!(sub_task.description.is_absent());
    }

    #[test]
    fn explicit_status_is_kept_verbatim() {
        let task = validate_task(&json!({ "title": "Ship", "status": "whatever" }))
            .expect("any status string is accepted");
        assert_eq!(task.status, "whatever");

        let task = validate_task(&json!({ "title": "Ship", "status": "" }))
            .expect("empty status is not defaulted");
        assert_eq!(task.status, "");
    }

    #[test]
    fn null_status_is_rejected() {
        let failure =
            validate_todo(&json!({ "title": "Buy milk", "status": null })).expect_err("null status");
        assert_eq!(
            failure.error_for("status").map(|error| &error.kind),
            Some(&FieldErrorKind::InvalidNull)
        );
    }

    #[test]
    fn null_id_is_rejected() {
        let failure = validate_task(&json!({ "id": null, "title": "Ship" })).expect_err("null id");
        assert_eq!(failure.fields(), vec!["id"]);
    }

    #[test]
    fn nullable_owner_references_keep_null() {
        let todo = validate_todo(&json!({ "title": "Test Todo", "user_id": null, "team_id": 4 }))
            .expect("null owner is valid");
        assert_eq!(todo.user_id, Field::Null);
        assert_eq!(todo.team_id, Field::Value(4));
    }

    #[test]
    fn extraneous_keys_are_dropped() {
        let task = validate_task(&json!({ "title": "Ship", "priority": "high" }))
            .expect("extra keys are ignored");
        let json = serde_json::to_value(&task).expect("serialize task");
        assert!(json.get("priority").is_none());
    }

    #[test]
    fn validate_record_dispatches_on_kind() {
        let record = validate_record(RecordKind::SubTask, &json!({ "task_id": 2, "title": "ok" }))
            .expect("valid sub-task");
        assert!(matches!(record, Record::SubTask(_)));
        assert_eq!(record.kind(), RecordKind::SubTask);

        let failure = validate_record(RecordKind::Task, &json!("title"))
            .expect_err("string input is not a record");
        assert_eq!(failure.fields(), vec!["$"]);
    }
}
