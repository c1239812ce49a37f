//! Record use-case service.
//!
//! # Responsibility
//! - Accept raw request bodies, validate them and persist the result.
//! - Consult the credential check before any repository call.
//!
//! # Invariants
//! - Unauthorized callers never reach validation or storage.
//! - Only normalized records are handed to the repository.
//! - Returned records are read back from storage and carry their `id`.

use crate::auth::{Access, AuthError, Credential, CredentialCheck};
use crate::model::record::{Record, RecordId, RecordKind, SubTask, Task, Todo};
use crate::repo::record_repo::{
    OwnerRef, RecordListQuery, RecordRepository, RepoError, StoredRecord,
};
use crate::validate::error::ValidationFailure;
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for record use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Request body failed validation; maps to a client error.
    Validation(ValidationFailure),
    Unauthorized(AuthError),
    NotFound { kind: RecordKind, id: RecordId },
    Repo(RepoError),
    /// Write succeeded but the read-back did not find the row.
    InconsistentState(&'static str),
}

impl ServiceError {
    /// Status the request boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => ValidationFailure::STATUS_CODE,
            Self::Unauthorized(AuthError::MissingCredential) => 401,
            Self::Unauthorized(AuthError::Rejected { .. }) => 403,
            Self::NotFound { .. } => 404,
            Self::Repo(RepoError::MissingParent(_)) => 422,
            Self::Repo(
                RepoError::Validation(_)
                | RepoError::UnexpectedId { .. }
                | RepoError::InvalidQuery(_),
            ) => ValidationFailure::STATUS_CODE,
            Self::Repo(_) | Self::InconsistentState(_) => 500,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unauthorized(err) => write!(f, "unauthorized: {err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent record state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unauthorized(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound { .. } | Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationFailure> for ServiceError {
    fn from(value: ValidationFailure) -> Self {
        Self::Validation(value)
    }
}

impl From<AuthError> for ServiceError {
    fn from(value: AuthError) -> Self {
        Self::Unauthorized(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Repo(other),
        }
    }
}

/// Validate-then-persist facade over a repository and a credential check.
pub struct RecordService<R: RecordRepository, C: CredentialCheck> {
    repo: R,
    check: C,
}

impl<R: RecordRepository, C: CredentialCheck> RecordService<R, C> {
    pub fn new(repo: R, check: C) -> Self {
        Self { repo, check }
    }

    /// Validates a new record body and stores it.
    ///
    /// # Contract
    /// - An `id` in the body is rejected by the repository (`UnexpectedId`).
    /// - Returns the stored record as read back.
    pub fn submit<T: StoredRecord>(
        &self,
        credential: &Credential,
        input: &Value,
    ) -> Result<T, ServiceError> {
        self.authorize(credential, Access::Write, T::KIND)?;
        let record = T::validate(input)?;
        let id = self.repo.create(&record)?;
        info!(
            "event=record_create module=service status=ok kind={} id={id}",
            T::KIND
        );
        self.repo
            .get::<T>(id)?
            .ok_or(ServiceError::InconsistentState("created record not found in read-back"))
    }

    /// Kind-dispatched variant of `submit` for callers holding a kind name.
    pub fn submit_record(
        &self,
        credential: &Credential,
        kind: RecordKind,
        input: &Value,
    ) -> Result<Record, ServiceError> {
        match kind {
            RecordKind::Task => self.submit::<Task>(credential, input).map(Record::Task),
            RecordKind::SubTask => self
                .submit::<SubTask>(credential, input)
                .map(Record::SubTask),
            RecordKind::Todo => self.submit::<Todo>(credential, input).map(Record::Todo),
        }
    }

    /// Replaces the record `id` with a validated body.
    ///
    /// Absent optional fields in the body are cleared in storage.
    pub fn revise<T: StoredRecord>(
        &self,
        credential: &Credential,
        id: RecordId,
        input: &Value,
    ) -> Result<T, ServiceError> {
        self.authorize(credential, Access::Write, T::KIND)?;
        let mut record = T::validate(input)?;
        record.set_id(id);
        self.repo.update(&record)?;
        info!(
            "event=record_update module=service status=ok kind={} id={id}",
            T::KIND
        );
        self.repo
            .get::<T>(id)?
            .ok_or(ServiceError::InconsistentState("updated record not found in read-back"))
    }

    /// Loads one record by id.
    pub fn fetch<T: StoredRecord>(
        &self,
        credential: &Credential,
        id: RecordId,
    ) -> Result<T, ServiceError> {
        self.authorize(credential, Access::Read, T::KIND)?;
        self.repo.get::<T>(id)?.ok_or(ServiceError::NotFound { kind: T::KIND, id })
    }

    /// Kind-dispatched variant of `fetch`.
    pub fn fetch_record(
        &self,
        credential: &Credential,
        kind: RecordKind,
        id: RecordId,
    ) -> Result<Record, ServiceError> {
        match kind {
            RecordKind::Task => self.fetch::<Task>(credential, id).map(Record::Task),
            RecordKind::SubTask => self.fetch::<SubTask>(credential, id).map(Record::SubTask),
            RecordKind::Todo => self.fetch::<Todo>(credential, id).map(Record::Todo),
        }
    }

    /// Lists records of one kind.
    pub fn list<T: StoredRecord>(
        &self,
        credential: &Credential,
        query: &RecordListQuery,
    ) -> Result<Vec<T>, ServiceError> {
        self.authorize(credential, Access::Read, T::KIND)?;
        Ok(self.repo.list::<T>(query)?)
    }

    /// Lists the sub-tasks attached to `task_id`.
    pub fn sub_tasks_of(
        &self,
        credential: &Credential,
        task_id: RecordId,
    ) -> Result<Vec<SubTask>, ServiceError> {
        let query = RecordListQuery {
            owner: Some((OwnerRef::Task, task_id)),
            ..RecordListQuery::default()
        };
        self.list(credential, &query)
    }

    /// Deletes one record. Deleting a task removes its sub-tasks.
    pub fn remove<T: StoredRecord>(
        &self,
        credential: &Credential,
        id: RecordId,
    ) -> Result<(), ServiceError> {
        self.authorize(credential, Access::Write, T::KIND)?;
        self.repo.delete::<T>(id)?;
        info!(
            "event=record_delete module=service status=ok kind={} id={id}",
            T::KIND
        );
        Ok(())
    }

    fn authorize(
        &self,
        credential: &Credential,
        access: Access,
        kind: RecordKind,
    ) -> Result<(), ServiceError> {
        self.check.authorize(credential, access).map_err(|err| {
            warn!(
                "event=record_authorize module=service status=denied kind={kind} access={}",
                access.as_str()
            );
            ServiceError::from(err)
        })
    }
}
