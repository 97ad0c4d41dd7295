//! User-reference repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist user rows and their denormalized project back-reference list.
//!
//! # Invariants
//! - `save_user` is a full-row replace: per-row last-write-wins.

use crate::model::user::User;
use crate::repo::{
    decode_string_list, encode_string_list, ensure_connection_ready, is_constraint_violation,
    RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    user_id,
    display_name,
    projects
FROM users";

const USER_COLUMNS: &[&str] = &[
    "user_id",
    "display_name",
    "projects",
    "created_at",
    "updated_at",
];

/// Repository interface for user-reference persistence.
pub trait UserRepository {
    /// Inserts a new user row; rejects duplicate identity keys.
    fn insert_user(&self, user: &User) -> RepoResult<()>;
    /// Loads one user by identity key.
    fn get_user(&self, user_id: &str) -> RepoResult<Option<User>>;
    /// Replaces the user row wholesale (last-write-wins).
    fn save_user(&self, user: &User) -> RepoResult<()>;
}

/// SQLite-backed user-reference repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        let result = self.conn.execute(
            "INSERT INTO users (
                user_id,
                display_name,
                projects
            ) VALUES (?1, ?2, ?3);",
            params![
                user.user_id.as_str(),
                user.display_name.as_str(),
                encode_string_list(&user.projects)?,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_constraint_violation(&err) => {
                Err(RepoError::UserExists(user.user_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, user_id: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE user_id = ?1;"))?;

        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn save_user(&self, user: &User) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                display_name = ?1,
                projects = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE user_id = ?3;",
            params![
                user.display_name.as_str(),
                encode_string_list(&user.projects)?,
                user.user_id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::UserNotFound(user.user_id.clone()));
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let projects_raw: String = row.get("projects")?;

    Ok(User {
        user_id: row.get("user_id")?,
        display_name: row.get("display_name")?,
        projects: decode_string_list(&projects_raw, "users.projects")?,
    })
}
