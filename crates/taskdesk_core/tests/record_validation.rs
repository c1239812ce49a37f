use serde_json::{json, Value};
use taskdesk_core::{
    validate_record, validate_sub_task, validate_task, validate_todo, Field, FieldErrorKind,
    RecordKind, ValidationFailure,
};

/// Minimal valid body per kind.
fn minimal(kind: RecordKind) -> Value {
    match kind {
        RecordKind::Task => json!({ "title": "Test Task" }),
        RecordKind::SubTask => json!({ "task_id": 1, "title": "Test Sub-Task" }),
        RecordKind::Todo => json!({ "title": "Test Todo" }),
    }
}

fn with(mut body: Value, key: &str, value: Value) -> Value {
    body[key] = value;
    body
}

fn without(mut body: Value, key: &str) -> Value {
    if let Some(object) = body.as_object_mut() {
        object.remove(key);
    }
    body
}

fn kind_of(failure: &ValidationFailure, field: &str) -> FieldErrorKind {
    failure
        .error_for(field)
        .unwrap_or_else(|| panic!("expected an error on `{field}`, got {failure}"))
        .kind
        .clone()
}

#[test]
fn minimal_bodies_succeed_with_pending_status() {
    for kind in RecordKind::ALL {
        let record = validate_record(kind, &minimal(kind)).expect("minimal body is valid");
        assert_eq!(record.status(), "PENDING", "kind {kind}");
        assert_eq!(record.id(), None);
    }
}

#[test]
fn short_titles_fail_on_title_for_every_kind() {
    for kind in RecordKind::ALL {
        for title in ["", "A"] {
            let body = with(minimal(kind), "title", json!(title));
            let failure = validate_record(kind, &body).expect_err("short title must fail");
            assert!(
                matches!(kind_of(&failure, "title"), FieldErrorKind::TooShort { min: 2, .. }),
                "kind {kind}, title {title:?}"
            );
        }
    }
}

#[test]
fn short_title_is_reported_even_when_other_fields_are_invalid() {
    let failure = validate_task(&json!({ "title": "A", "user_id": "x", "due_date": 5 }))
        .expect_err("three defects");
    assert_eq!(failure.fields(), vec!["user_id", "title", "due_date"]);
    assert_eq!(
        failure.to_string(),
        "record validation failed: user_id: expected integer, found string; \
         title: minimum length is 2; due_date: expected string, found integer"
    );
}

#[test]
fn missing_title_is_missing_required() {
    for kind in RecordKind::ALL {
        let body = without(minimal(kind), "title");
        let failure = validate_record(kind, &body).expect_err("missing title must fail");
        assert_eq!(kind_of(&failure, "title"), FieldErrorKind::MissingRequired);
    }
}

#[test]
fn sub_task_without_parent_is_missing_required() {
    let failure = validate_sub_task(&json!({ "title": "Valid title" }))
        .expect_err("task_id is mandatory");
    assert_eq!(failure.fields(), vec!["task_id"]);
    assert_eq!(kind_of(&failure, "task_id"), FieldErrorKind::MissingRequired);
}

#[test]
fn sub_task_parent_rejects_null() {
    let failure = validate_sub_task(&json!({ "task_id": null, "title": "Valid title" }))
        .expect_err("task_id is not nullable");
    assert_eq!(kind_of(&failure, "task_id"), FieldErrorKind::InvalidNull);
}

#[test]
fn nullable_fields_preserve_explicit_null() {
    let nullable: &[(RecordKind, &[&str])] = &[
        (
            RecordKind::Task,
            &["user_id", "team_id", "description", "due_date"],
        ),
        (RecordKind::SubTask, &["description", "due_date"]),
        (
            RecordKind::Todo,
            &["user_id", "team_id", "description", "due_date"],
        ),
    ];

    for (kind, fields) in nullable {
        let mut body = minimal(*kind);
        for field in fields.iter() {
            body[*field] = Value::Null;
        }

        let record = validate_record(*kind, &body).expect("explicit nulls are valid");
        let output = serde_json::to_value(&record).expect("serialize record");
        for field in fields.iter() {
            assert_eq!(
                output.get(*field),
                Some(&Value::Null),
                "kind {kind}, field {field}"
            );
        }
    }
}

#[test]
fn integer_fields_reject_numeric_looking_strings() {
    let cases = [
        (RecordKind::Task, "user_id"),
        (RecordKind::Task, "team_id"),
        (RecordKind::Task, "id"),
        (RecordKind::SubTask, "task_id"),
        (RecordKind::Todo, "user_id"),
    ];

    for (kind, field) in cases {
        for raw in ["not-a-number", "42"] {
            let body = with(minimal(kind), field, json!(raw));
            let failure = validate_record(kind, &body).expect_err("string is not an integer");
            assert_eq!(
                kind_of(&failure, field),
                FieldErrorKind::TypeMismatch {
                    expected: "integer",
                    found: "string",
                },
                "kind {kind}, field {field}, value {raw:?}"
            );
        }
    }
}

#[test]
fn validating_normalized_output_is_idempotent() {
    let bodies = [
        (RecordKind::Task, json!({ "title": "Plan sprint", "team_id": 9, "due_date": null })),
        (
            RecordKind::SubTask,
            json!({ "id": 4, "task_id": 1, "title": "Draft", "status": "IN_PROGRESS" }),
        ),
        (RecordKind::Todo, json!({ "title": "Call vendor", "description": "" })),
    ];

    for (kind, body) in bodies {
        let first = validate_record(kind, &body).expect("valid body");
        let output = serde_json::to_value(&first).expect("serialize record");
        let second = validate_record(kind, &output).expect("normalized output is valid");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&second).expect("serialize record"),
            output
        );
    }
}

#[test]
fn scenario_minimal_sub_task() {
    let sub_task = validate_sub_task(&json!({ "task_id": 1, "title": "Test Sub-Task" }))
        .expect("scenario 1 succeeds");
    assert_eq!(sub_task.status, "PENDING");
}

#[test]
fn scenario_single_character_title() {
    let failure = validate_task(&json!({ "title": "A" })).expect_err("scenario 2 fails");
    assert_eq!(failure.errors().len(), 1);
    assert_eq!(failure.errors()[0].to_string(), "title: minimum length is 2");
}

#[test]
fn scenario_title_missing() {
    for failure in [
        validate_task(&json!({ "task_id": 1 })).expect_err("task without title"),
        validate_sub_task(&json!({ "task_id": 1 })).expect_err("sub-task without title"),
    ] {
        assert_eq!(failure.fields(), vec!["title"]);
        assert_eq!(failure.errors()[0].to_string(), "title: required");
    }
}

#[test]
fn scenario_owner_type_mismatch() {
    let failure = validate_task(&json!({ "title": "Test Task", "user_id": "not-a-number" }))
        .expect_err("scenario 4 fails");
    assert_eq!(failure.fields(), vec!["user_id"]);
    assert_eq!(
        failure.to_response_body(),
        json!({
            "errors": [{ "field": "user_id", "message": "expected integer, found string" }]
        })
    );
    assert_eq!(ValidationFailure::STATUS_CODE, 400);
}

#[test]
fn scenario_todo_with_nulls() {
    let todo = validate_todo(&json!({ "title": "Test Todo", "user_id": null, "description": null }))
        .expect("scenario 5 succeeds");
    assert_eq!(todo.user_id, Field::Null);
    assert_eq!(todo.description, Field::Null);
    assert_eq!(todo.team_id, Field::Absent);
    assert_eq!(todo.status, "PENDING");
}

#[test]
fn malformed_inputs_never_panic() {
    for input in [json!(null), json!(7), json!("task"), json!([]), json!({})] {
        for kind in RecordKind::ALL {
            assert!(validate_record(kind, &input).is_err());
        }
    }
}
