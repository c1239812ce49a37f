//! Core record validation and storage for TaskDesk.
//! This crate is the single source of truth for record invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validate;

pub use auth::{Access, AuthError, Credential, CredentialCheck, LocalOperator};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::field::Field;
pub use model::record::{Record, RecordId, RecordKind, SubTask, Task, Todo};
pub use repo::record_repo::{
    OwnerRef, RecordListQuery, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
    StoredRecord,
};
pub use service::record_service::{RecordService, ServiceError};
pub use validate::error::{FieldError, FieldErrorKind, ValidationFailure};
pub use validate::schema::{FieldSpec, FieldType, DEFAULT_STATUS, MIN_TITLE_CHARS};
pub use validate::{
    validate_record, validate_sub_task, validate_task, validate_todo, RecordSchema,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
