//! Ticket repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist ticket rows independently of the owning project row.
//! - Keep board listing order deterministic inside the query.
//!
//! # Invariants
//! - Write paths call `Ticket::validate()` before SQL mutations.
//! - Column listing order: due date ascending, tickets without a due date
//!   last, ties broken by ticket id.

use crate::model::ticket::{Ticket, TicketId};
use crate::repo::{
    decode_string_list, encode_string_list, ensure_connection_ready, parse_uuid, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const TICKET_SELECT_SQL: &str = "SELECT
    ticket_id,
    project_id,
    column_name,
    title,
    description,
    due_date,
    assignee,
    watchers
FROM tickets";

const TICKET_COLUMNS: &[&str] = &[
    "ticket_id",
    "project_id",
    "column_name",
    "title",
    "description",
    "due_date",
    "assignee",
    "watchers",
    "created_at",
    "updated_at",
];

/// Repository interface for ticket persistence.
pub trait TicketRepository {
    /// Inserts a new ticket row.
    fn insert_ticket(&self, ticket: &Ticket) -> RepoResult<()>;
    /// Loads one ticket by id.
    fn get_ticket(&self, ticket_id: TicketId) -> RepoResult<Option<Ticket>>;
    /// Replaces the ticket row wholesale (last-write-wins).
    fn save_ticket(&self, ticket: &Ticket) -> RepoResult<()>;
    /// Deletes one ticket row. Returns `false` when the row was already
    /// gone, so retries of a failed dependent write stay idempotent.
    fn delete_ticket(&self, ticket_id: TicketId) -> RepoResult<bool>;
    /// Lists tickets of one project column in board order.
    fn list_by_column(&self, project_id: &str, column: &str) -> RepoResult<Vec<Ticket>>;
    /// Lists every ticket row referencing one project.
    fn list_by_project(&self, project_id: &str) -> RepoResult<Vec<Ticket>>;
}

/// SQLite-backed ticket repository.
pub struct SqliteTicketRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTicketRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tickets", TICKET_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TicketRepository for SqliteTicketRepository<'_> {
    fn insert_ticket(&self, ticket: &Ticket) -> RepoResult<()> {
        ticket.validate()?;

        self.conn.execute(
            "INSERT INTO tickets (
                ticket_id,
                project_id,
                column_name,
                title,
                description,
                due_date,
                assignee,
                watchers
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                ticket.ticket_id.to_string(),
                ticket.project.as_str(),
                ticket.column.as_str(),
                ticket.title.as_str(),
                ticket.description.as_str(),
                ticket.due_date,
                ticket.assignee.as_str(),
                encode_string_list(&ticket.watchers)?,
            ],
        )?;

        Ok(())
    }

    fn get_ticket(&self, ticket_id: TicketId) -> RepoResult<Option<Ticket>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TICKET_SELECT_SQL} WHERE ticket_id = ?1;"))?;

        let mut rows = stmt.query([ticket_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_ticket_row(row)?));
        }

        Ok(None)
    }

    fn save_ticket(&self, ticket: &Ticket) -> RepoResult<()> {
        ticket.validate()?;

        let changed = self.conn.execute(
            "UPDATE tickets
             SET
                column_name = ?1,
                title = ?2,
                description = ?3,
                due_date = ?4,
                assignee = ?5,
                watchers = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE ticket_id = ?7;",
            params![
                ticket.column.as_str(),
                ticket.title.as_str(),
                ticket.description.as_str(),
                ticket.due_date,
                ticket.assignee.as_str(),
                encode_string_list(&ticket.watchers)?,
                ticket.ticket_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::TicketNotFound(ticket.ticket_id));
        }

        Ok(())
    }

    fn delete_ticket(&self, ticket_id: TicketId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM tickets WHERE ticket_id = ?1;",
            [ticket_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_by_column(&self, project_id: &str, column: &str) -> RepoResult<Vec<Ticket>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TICKET_SELECT_SQL}
             WHERE project_id = ?1
               AND column_name = ?2
             ORDER BY (due_date IS NULL) ASC, due_date ASC, ticket_id ASC;"
        ))?;

        let mut rows = stmt.query(params![project_id, column])?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next()? {
            tickets.push(parse_ticket_row(row)?);
        }

        Ok(tickets)
    }

    fn list_by_project(&self, project_id: &str) -> RepoResult<Vec<Ticket>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TICKET_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY ticket_id ASC;"
        ))?;

        let mut rows = stmt.query([project_id])?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next()? {
            tickets.push(parse_ticket_row(row)?);
        }

        Ok(tickets)
    }
}

fn parse_ticket_row(row: &Row<'_>) -> RepoResult<Ticket> {
    let ticket_id_text: String = row.get("ticket_id")?;
    let watchers_raw: String = row.get("watchers")?;

    let ticket = Ticket {
        ticket_id: parse_uuid(&ticket_id_text, "tickets.ticket_id")?,
        project: row.get("project_id")?,
        column: row.get("column_name")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        assignee: row.get("assignee")?,
        watchers: decode_string_list(&watchers_raw, "tickets.watchers")?,
    };
    ticket.validate()?;
    Ok(ticket)
}
