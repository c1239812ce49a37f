//! Record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `tasks`, `sub_tasks` and `todos` tables.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths re-run record validation before SQL mutations.
//! - Read paths reject rows that no longer validate instead of masking them.
//! - `id` is assigned by SQLite; callers never choose it on create.

use crate::db::DbError;
use crate::model::field::Field;
use crate::model::record::{RecordId, RecordKind, SubTask, Task, Todo};
use crate::validate::error::ValidationFailure;
use crate::validate::RecordSchema;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationFailure),
    Db(DbError),
    NotFound { kind: RecordKind, id: RecordId },
    /// Create was called with a record that already carries an id.
    UnexpectedId { kind: RecordKind, id: RecordId },
    /// Update was called with a record without an id.
    MissingId(RecordKind),
    /// Sub-task references a task that does not exist.
    MissingParent(RecordId),
    InvalidQuery(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UnexpectedId { kind, id } => {
                write!(f, "new {kind} must not carry an id (got {id})")
            }
            Self::MissingId(kind) => write!(f, "{kind} update requires an id"),
            Self::MissingParent(task_id) => write!(f, "parent task not found: {task_id}"),
            Self::InvalidQuery(message) => write!(f, "invalid record query: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for RepoError {
    fn from(value: ValidationFailure) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Owner reference column usable as a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerRef {
    User,
    Team,
    Task,
}

impl OwnerRef {
    pub fn column(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Team => "team_id",
            Self::Task => "task_id",
        }
    }
}

/// Query options for listing records of one kind.
#[derive(Debug, Clone, Default)]
pub struct RecordListQuery {
    /// Only rows whose owner reference equals the given id.
    pub owner: Option<(OwnerRef, RecordId)>,
    /// Exact status match.
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Mapping between a normalized record and its table.
pub trait StoredRecord: RecordSchema {
    const TABLE: &'static str;
    /// Data columns in bind order, excluding `id`.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<RecordId>;
    fn set_id(&mut self, id: RecordId);
    /// Values for `COLUMNS`, in the same order.
    fn column_values(&self) -> Vec<SqlValue>;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Parent task referenced through a foreign key, if any.
    fn parent_id(&self) -> Option<RecordId> {
        None
    }
}

/// Repository interface for record CRUD operations.
pub trait RecordRepository {
    fn create<R: StoredRecord>(&self, record: &R) -> RepoResult<RecordId>;
    fn update<R: StoredRecord>(&self, record: &R) -> RepoResult<()>;
    fn get<R: StoredRecord>(&self, id: RecordId) -> RepoResult<Option<R>>;
    fn list<R: StoredRecord>(&self, query: &RecordListQuery) -> RepoResult<Vec<R>>;
    fn delete<R: StoredRecord>(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn create<R: StoredRecord>(&self, record: &R) -> RepoResult<RecordId> {
        if let Some(id) = record.id() {
            return Err(RepoError::UnexpectedId { kind: R::KIND, id });
        }
        ensure_normalized(record)?;

        let placeholders = (1..=R::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            R::TABLE,
            R::COLUMNS.join(", ")
        );

        self.conn
            .execute(&sql, params_from_iter(record.column_values()))
            .map_err(|err| map_write_error(record, err))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update<R: StoredRecord>(&self, record: &R) -> RepoResult<()> {
        let id = record.id().ok_or(RepoError::MissingId(R::KIND))?;
        ensure_normalized(record)?;

        let assignments = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {}
             SET {assignments}, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?{};",
            R::TABLE,
            R::COLUMNS.len() + 1
        );

        let mut values = record.column_values();
        values.push(SqlValue::Integer(id));
        let changed = self
            .conn
            .execute(&sql, params_from_iter(values))
            .map_err(|err| map_write_error(record, err))?;

        if changed == 0 {
            return Err(RepoError::NotFound { kind: R::KIND, id });
        }
        Ok(())
    }

    fn get<R: StoredRecord>(&self, id: RecordId) -> RepoResult<Option<R>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?1;", select_sql::<R>()))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_row(row)?)),
            None => Ok(None),
        }
    }

    fn list<R: StoredRecord>(&self, query: &RecordListQuery) -> RepoResult<Vec<R>> {
        let mut sql = format!("{} WHERE 1 = 1", select_sql::<R>());
        let mut bind_values: Vec<SqlValue> = Vec::new();

        if let Some((owner, owner_id)) = query.owner {
            let column = owner.column();
            if !R::COLUMNS.contains(&column) {
                return Err(RepoError::InvalidQuery(format!(
                    "{} has no `{column}` reference",
                    R::KIND
                )));
            }
            sql.push_str(&format!(" AND {column} = ?"));
            bind_values.push(SqlValue::Integer(owner_id));
        }

        if let Some(status) = &query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(SqlValue::Text(status.clone()));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(SqlValue::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(SqlValue::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(SqlValue::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_row(row)?);
        }
        Ok(records)
    }

    fn delete<R: StoredRecord>(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1;", R::TABLE), [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind: R::KIND, id });
        }
        Ok(())
    }
}

fn select_sql<R: StoredRecord>() -> String {
    format!("SELECT id, {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

fn parse_row<R: StoredRecord>(row: &Row<'_>) -> RepoResult<R> {
    let record = R::from_row(row)?;
    let value = serde_json::to_value(&record).map_err(|err| {
        RepoError::InvalidData(format!("{} row cannot be encoded: {err}", R::KIND))
    })?;
    R::validate(&value).map_err(|failure| {
        RepoError::InvalidData(format!(
            "{} row {:?} in {}: {failure}",
            R::KIND,
            record.id(),
            R::TABLE
        ))
    })
}

fn ensure_normalized<R: StoredRecord>(record: &R) -> RepoResult<()> {
    let value = serde_json::to_value(record).map_err(|err| {
        RepoError::InvalidData(format!("{} cannot be encoded: {err}", R::KIND))
    })?;
    R::validate(&value)?;
    Ok(())
}

fn map_write_error<R: StoredRecord>(record: &R, err: rusqlite::Error) -> RepoError {
    let err = DbError::Sqlite(err);
    match record.parent_id() {
        Some(task_id) if err.is_foreign_key_violation() => RepoError::MissingParent(task_id),
        _ => RepoError::Db(err),
    }
}

fn field_value<T: Clone + Into<SqlValue>>(field: &Field<T>) -> SqlValue {
    match field {
        Field::Value(value) => value.clone().into(),
        Field::Absent | Field::Null => SqlValue::Null,
    }
}

fn id_column(row: &Row<'_>) -> rusqlite::Result<Option<RecordId>> {
    row.get::<_, RecordId>("id").map(Some)
}

impl StoredRecord for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "team_id",
        "title",
        "description",
        "status",
        "due_date",
    ];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            field_value(&self.user_id),
            field_value(&self.team_id),
            SqlValue::Text(self.title.clone()),
            field_value(&self.description),
            SqlValue::Text(self.status.clone()),
            field_value(&self.due_date),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: id_column(row)?,
            user_id: Field::from_column(row.get("user_id")?),
            team_id: Field::from_column(row.get("team_id")?),
            title: row.get("title")?,
            description: Field::from_column(row.get("description")?),
            status: row.get("status")?,
            due_date: Field::from_column(row.get("due_date")?),
        })
    }
}

impl StoredRecord for SubTask {
    const TABLE: &'static str = "sub_tasks";
    const COLUMNS: &'static [&'static str] =
        &["task_id", "title", "description", "status", "due_date"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(self.task_id),
            SqlValue::Text(self.title.clone()),
            field_value(&self.description),
            SqlValue::Text(self.status.clone()),
            field_value(&self.due_date),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: id_column(row)?,
            task_id: row.get("task_id")?,
            title: row.get("title")?,
            description: Field::from_column(row.get("description")?),
            status: row.get("status")?,
            due_date: Field::from_column(row.get("due_date")?),
        })
    }

    fn parent_id(&self) -> Option<RecordId> {
        Some(self.task_id)
    }
}

impl StoredRecord for Todo {
    const TABLE: &'static str = "todos";
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "team_id",
        "title",
        "description",
        "status",
        "due_date",
    ];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            field_value(&self.user_id),
            field_value(&self.team_id),
            SqlValue::Text(self.title.clone()),
            field_value(&self.description),
            SqlValue::Text(self.status.clone()),
            field_value(&self.due_date),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: id_column(row)?,
            user_id: Field::from_column(row.get("user_id")?),
            team_id: Field::from_column(row.get("team_id")?),
            title: row.get("title")?,
            description: Field::from_column(row.get("description")?),
            status: row.get("status")?,
            due_date: Field::from_column(row.get("due_date")?),
        })
    }
}
