//! Ticket lifecycle service.
//!
//! # Responsibility
//! - Orchestrate ticket create/list/update/delete, cross-checking membership
//!   and column existence, and keep the owning project's ticket set in step.
//!
//! # Invariants
//! - Precondition order on create: project exists, actor member, assignee
//!   member, watchers member, column exists. First failure wins.
//! - Create and delete perform two dependent single-row writes with no
//!   rollback; a failed second write is logged and surfaced as-is, leaving
//!   an orphan for the reconciliation sweep.
//! - Ticket existence is judged by relation: an id absent from the project's
//!   ticket set is not found, whatever rows physically exist.

use crate::model::project::Project;
use crate::model::ticket::{normalize_watchers, Ticket, TicketId};
use crate::model::user::UserId;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::ticket_repo::TicketRepository;
use crate::sanitize::{sanitize_description, sanitize_title};
use crate::service::membership::{first_non_member, is_member};
use crate::service::{BoardError, BoardResult, MemberRole};
use log::{info, warn};

/// Input for ticket creation, already type-checked by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    /// Optional due date, epoch milliseconds.
    pub due_date: Option<i64>,
    pub assignee: UserId,
    pub watchers: Vec<UserId>,
}

/// Partial update for a ticket; absent fields keep their stored value.
///
/// `due_date` is doubly optional so a patch can distinguish "leave as is"
/// (`None`) from "clear the due date" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub column: Option<String>,
    pub due_date: Option<Option<i64>>,
    pub assignee: Option<UserId>,
    pub watchers: Option<Vec<UserId>>,
}

/// Use-case service for the ticket lifecycle.
pub struct TicketService<P: ProjectRepository, T: TicketRepository> {
    projects: P,
    tickets: T,
}

impl<P: ProjectRepository, T: TicketRepository> TicketService<P, T> {
    /// Creates a service from the two entity repositories.
    pub fn new(projects: P, tickets: T) -> Self {
        Self { projects, tickets }
    }

    /// Creates a ticket in one column of one project.
    ///
    /// On success the ticket row is written first, then the id is appended
    /// to the project's ticket set and the project saved. If the second
    /// write fails the ticket row stands as an orphan and only the second
    /// failure is reported.
    pub fn create_ticket(
        &self,
        project_id: &str,
        column: &str,
        draft: &TicketDraft,
        actor: &str,
    ) -> BoardResult<Ticket> {
        let title = sanitize_title(&draft.title);
        if title.is_empty() {
            return Err(BoardError::Validation(
                "title must not be empty".to_string(),
            ));
        }
        let description = sanitize_description(&draft.description);

        let mut project = self.require_project(project_id)?;
        self.require_member(&project, actor)?;

        if !is_member(&project, &draft.assignee) {
            return Err(BoardError::MemberConflict {
                user_id: draft.assignee.clone(),
                role: MemberRole::Assignee,
            });
        }

        // The assignee is implicitly a watcher; drop it before the closure
        // check so listing yourself as a watcher of your own ticket is fine.
        let watchers = normalize_watchers(&draft.assignee, draft.watchers.clone());
        if let Some(outsider) = first_non_member(&project, &watchers) {
            return Err(BoardError::MemberConflict {
                user_id: outsider.clone(),
                role: MemberRole::Watcher,
            });
        }

        if !project.column_exists(column) {
            return Err(BoardError::ColumnNotFound {
                project_id: project_id.to_string(),
                column: column.to_string(),
            });
        }

        let ticket = Ticket::new(
            project_id,
            column,
            title,
            description,
            draft.due_date,
            draft.assignee.clone(),
            watchers,
        );
        self.tickets.insert_ticket(&ticket)?;

        project.add_ticket(ticket.ticket_id);
        if let Err(err) = self.projects.save_project(&project) {
            warn!(
                "event=ticket_create module=ticket status=partial project_id={project_id} \
                 ticket_id={} detail=orphan_ticket_row error={err}",
                ticket.ticket_id
            );
            return Err(err.into());
        }

        info!(
            "event=ticket_create module=ticket status=ok project_id={project_id} ticket_id={} column={column}",
            ticket.ticket_id
        );
        Ok(ticket)
    }

    /// Lists the tickets of one column, sorted by ascending due date with
    /// undated tickets last and ties broken by ticket id.
    pub fn list_tickets(
        &self,
        project_id: &str,
        column: &str,
        actor: &str,
    ) -> BoardResult<Vec<Ticket>> {
        let project = self.require_project(project_id)?;
        self.require_member(&project, actor)?;

        if !project.column_exists(column) {
            return Err(BoardError::ColumnNotFound {
                project_id: project_id.to_string(),
                column: column.to_string(),
            });
        }

        Ok(self.tickets.list_by_column(project_id, column)?)
    }

    /// Applies a partial update to one ticket.
    ///
    /// The project's ticket set is unchanged by an update, so this is a
    /// single write with no dependent-write exposure.
    pub fn update_ticket(
        &self,
        project_id: &str,
        ticket_id: TicketId,
        patch: &TicketPatch,
        actor: &str,
    ) -> BoardResult<Ticket> {
        let project = self.require_project(project_id)?;
        self.require_member(&project, actor)?;

        if let Some(column) = &patch.column {
            if !project.column_exists(column) {
                return Err(BoardError::ColumnNotFound {
                    project_id: project_id.to_string(),
                    column: column.clone(),
                });
            }
        }

        if !project.has_ticket(ticket_id) {
            return Err(BoardError::TicketNotFound(ticket_id));
        }

        if let Some(assignee) = &patch.assignee {
            if !is_member(&project, assignee) {
                return Err(BoardError::MemberConflict {
                    user_id: assignee.clone(),
                    role: MemberRole::Assignee,
                });
            }
        }
        if let Some(watchers) = &patch.watchers {
            if let Some(outsider) = first_non_member(&project, watchers) {
                return Err(BoardError::MemberConflict {
                    user_id: outsider.clone(),
                    role: MemberRole::Watcher,
                });
            }
        }

        // Referenced by the project but the row is gone: a dangling id the
        // sweep has not healed yet. Still not found from the caller's view.
        let mut ticket = self
            .tickets
            .get_ticket(ticket_id)?
            .ok_or(BoardError::TicketNotFound(ticket_id))?;

        if let Some(title) = &patch.title {
            let title = sanitize_title(title);
            if title.is_empty() {
                return Err(BoardError::Validation(
                    "title must not be empty".to_string(),
                ));
            }
            ticket.title = title;
        }
        if let Some(description) = &patch.description {
            ticket.description = sanitize_description(description);
        }
        if let Some(column) = &patch.column {
            ticket.column = column.clone();
        }
        if let Some(due_date) = patch.due_date {
            ticket.due_date = due_date;
        }
        if let Some(assignee) = &patch.assignee {
            ticket.assignee = assignee.clone();
        }
        if let Some(watchers) = &patch.watchers {
            ticket.watchers = watchers.clone();
        }
        // Re-normalize so the closure invariant holds whether the patch
        // changed the assignee, the watchers, or both.
        ticket.watchers = normalize_watchers(&ticket.assignee, std::mem::take(&mut ticket.watchers));

        self.tickets.save_ticket(&ticket)?;
        info!(
            "event=ticket_update module=ticket status=ok project_id={project_id} ticket_id={ticket_id}"
        );
        Ok(ticket)
    }

    /// Deletes one ticket.
    ///
    /// The id is removed from the project's ticket set first, then the
    /// ticket row is deleted. A failed second write leaks an unreachable
    /// row (no dangling reference); the sweep reattaches such rows.
    pub fn delete_ticket(
        &self,
        project_id: &str,
        ticket_id: TicketId,
        actor: &str,
    ) -> BoardResult<()> {
        let mut project = self.require_project(project_id)?;
        self.require_member(&project, actor)?;

        if !project.remove_ticket(ticket_id) {
            return Err(BoardError::TicketNotFound(ticket_id));
        }
        self.projects.save_project(&project)?;

        match self.tickets.delete_ticket(ticket_id) {
            Ok(_) => {
                info!(
                    "event=ticket_delete module=ticket status=ok project_id={project_id} ticket_id={ticket_id}"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=ticket_delete module=ticket status=partial project_id={project_id} \
                     ticket_id={ticket_id} detail=leaked_ticket_row error={err}"
                );
                Err(err.into())
            }
        }
    }

    fn require_project(&self, project_id: &str) -> BoardResult<Project> {
        self.projects
            .get_project(project_id)?
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))
    }

    fn require_member(&self, project: &Project, actor: &str) -> BoardResult<()> {
        if !is_member(project, actor) {
            return Err(BoardError::Unauthorized {
                user_id: actor.to_string(),
                project_id: project.project_id.clone(),
            });
        }
        Ok(())
    }
}
