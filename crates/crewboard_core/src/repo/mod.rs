//! Repository contracts and SQLite implementations for the entity store.
//!
//! # Responsibility
//! - Provide independently addressable persistence per record kind.
//! - Keep SQL and JSON-column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Each repository write touches exactly one row of one table; cross-entity
//!   consistency is the service layer's problem, not the store's.
//! - Ticket write paths call `Ticket::validate()` before SQL mutations.
//! - Read paths reject unparseable persisted state instead of masking it.

use crate::db::DbError;
use crate::model::project::ProjectId;
use crate::model::ticket::{TicketId, TicketValidationError};
use crate::model::user::UserId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod project_repo;
pub mod ticket_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Structural ticket validation failed before the write.
    Validation(TicketValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Project row does not exist.
    ProjectNotFound(ProjectId),
    /// Project key already taken.
    ProjectExists(ProjectId),
    /// Ticket row does not exist.
    TicketNotFound(TicketId),
    /// User row does not exist.
    UserNotFound(UserId),
    /// User key already taken.
    UserExists(UserId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::ProjectExists(id) => write!(f, "project already exists: {id}"),
            Self::TicketNotFound(id) => write!(f, "ticket not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::UserExists(id) => write!(f, "user already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
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

impl From<TicketValidationError> for RepoError {
    fn from(value: TicketValidationError) -> Self {
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

/// Verifies the connection is migrated and carries the expected table shape.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &'static [&'static str],
) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns whether an execute error is a primary-key/uniqueness violation.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Encodes a string list as the JSON text stored in a list column.
pub(crate) fn encode_string_list(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode list column: {err}")))
}

/// Decodes a JSON list column into strings.
pub(crate) fn decode_string_list(raw: &str, column: &'static str) -> RepoResult<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|_| RepoError::InvalidData(format!("invalid JSON list `{raw}` in {column}")))
}

/// Encodes a ticket-id list as the JSON text stored in `projects.tickets`.
pub(crate) fn encode_ticket_ids(ids: &[TicketId]) -> RepoResult<String> {
    let as_text: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    encode_string_list(&as_text)
}

/// Decodes `projects.tickets` into ticket ids.
pub(crate) fn decode_ticket_ids(raw: &str, column: &'static str) -> RepoResult<Vec<TicketId>> {
    decode_string_list(raw, column)?
        .iter()
        .map(|value| parse_uuid(value, column))
        .collect()
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
