//! Normalized record shapes.
//!
//! # Responsibility
//! - Define the typed output of record validation for every record kind.
//! - Provide stable kind names shared by validation, storage and logs.
//!
//! # Invariants
//! - `status` is always resolved; absent input status becomes `"PENDING"`.
//! - Absent optional fields are skipped on serialization, explicit nulls are
//!   emitted as `null`.

use crate::model::field::Field;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Storage identifier of a persisted record.
pub type RecordId = i64;

/// Record kinds accepted by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Task,
    SubTask,
    Todo,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [Self::Task, Self::SubTask, Self::Todo];

    /// Stable identifier used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::SubTask => "sub_task",
            Self::Todo => "todo",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Absent on creation; present once persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub user_id: Field<i64>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub team_id: Field<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    pub status: String,
    /// Free-form date text; not parsed.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub due_date: Field<String>,
}

/// Normalized sub-task record. Always attached to a parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub task_id: RecordId,
    pub title: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub due_date: Field<String>,
}

/// Normalized todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub user_id: Field<i64>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub team_id: Field<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub due_date: Field<String>,
}

/// Any normalized record, tagged by kind in Rust but not on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Task(Task),
    SubTask(SubTask),
    Todo(Todo),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Task(_) => RecordKind::Task,
            Self::SubTask(_) => RecordKind::SubTask,
            Self::Todo(_) => RecordKind::Todo,
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        match self {
            Self::Task(task) => task.id,
            Self::SubTask(sub_task) => sub_task.id,
            Self::Todo(todo) => todo.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Task(task) => &task.title,
            Self::SubTask(sub_task) => &sub_task.title,
            Self::Todo(todo) => &todo.title,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Task(task) => &task.status,
            Self::SubTask(sub_task) => &sub_task.status,
            Self::Todo(todo) => &todo.status,
        }
    }
}

impl From<Task> for Record {
    fn from(value: Task) -> Self {
        Self::Task(value)
    }
}

impl From<SubTask> for Record {
    fn from(value: SubTask) -> Self {
        Self::SubTask(value)
    }
}

impl From<Todo> for Record {
    fn from(value: Todo) -> Self {
        Self::Todo(value)
    }
}
