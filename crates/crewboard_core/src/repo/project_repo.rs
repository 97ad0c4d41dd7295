//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist project rows, including the denormalized member/column/ticket
//!   list columns.
//! - Provide the one atomic single-statement mutation the board relies on:
//!   ordered-set column addition on the project row.
//!
//! # Invariants
//! - `save_project` is a full-row replace: per-row last-write-wins.
//! - `add_column_to_set` never duplicates a column name.

use crate::model::project::Project;
use crate::repo::{
    decode_string_list, decode_ticket_ids, encode_string_list, encode_ticket_ids,
    ensure_connection_ready, is_constraint_violation, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    project_id,
    description,
    members,
    columns,
    tickets
FROM projects";

const PROJECT_COLUMNS: &[&str] = &[
    "project_id",
    "description",
    "members",
    "columns",
    "tickets",
    "created_at",
    "updated_at",
];

/// Repository interface for project persistence.
pub trait ProjectRepository {
    /// Inserts a new project row; rejects duplicate keys.
    fn insert_project(&self, project: &Project) -> RepoResult<()>;
    /// Loads one project by key.
    fn get_project(&self, project_id: &str) -> RepoResult<Option<Project>>;
    /// Replaces the project row wholesale (last-write-wins).
    fn save_project(&self, project: &Project) -> RepoResult<()>;
    /// Appends a column name to the project's column list with ordered-set
    /// semantics, in one atomic statement, and returns the updated project.
    fn add_column_to_set(&self, project_id: &str, name: &str) -> RepoResult<Project>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "projects", PROJECT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn insert_project(&self, project: &Project) -> RepoResult<()> {
        let result = self.conn.execute(
            "INSERT INTO projects (
                project_id,
                description,
                members,
                columns,
                tickets
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.project_id.as_str(),
                project.description.as_str(),
                encode_string_list(&project.members)?,
                encode_string_list(&project.columns)?,
                encode_ticket_ids(&project.tickets)?,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_constraint_violation(&err) => {
                Err(RepoError::ProjectExists(project.project_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_project(&self, project_id: &str) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE project_id = ?1;"))?;

        let mut rows = stmt.query([project_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn save_project(&self, project: &Project) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                description = ?1,
                members = ?2,
                columns = ?3,
                tickets = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE project_id = ?5;",
            params![
                project.description.as_str(),
                encode_string_list(&project.members)?,
                encode_string_list(&project.columns)?,
                encode_ticket_ids(&project.tickets)?,
                project.project_id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ProjectNotFound(project.project_id.clone()));
        }

        Ok(())
    }

    fn add_column_to_set(&self, project_id: &str, name: &str) -> RepoResult<Project> {
        // Single statement so concurrent adds cannot race a read-modify-write
        // of the column list; the duplicate check and the append happen on
        // the same row visit.
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                columns = CASE
                    WHEN EXISTS (
                        SELECT 1 FROM json_each(projects.columns)
                        WHERE json_each.value = ?2
                    ) THEN columns
                    ELSE json_insert(columns, '$[#]', ?2)
                END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE project_id = ?1;",
            params![project_id, name],
        )?;

        if changed == 0 {
            return Err(RepoError::ProjectNotFound(project_id.to_string()));
        }

        self.get_project(project_id)?
            .ok_or_else(|| RepoError::ProjectNotFound(project_id.to_string()))
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let members_raw: String = row.get("members")?;
    let columns_raw: String = row.get("columns")?;
    let tickets_raw: String = row.get("tickets")?;

    Ok(Project {
        project_id: row.get("project_id")?,
        description: row.get("description")?,
        members: decode_string_list(&members_raw, "projects.members")?,
        columns: decode_string_list(&columns_raw, "projects.columns")?,
        tickets: decode_ticket_ids(&tickets_raw, "projects.tickets")?,
    })
}
