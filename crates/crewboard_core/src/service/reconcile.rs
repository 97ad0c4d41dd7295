//! Consistency sweep over the project/ticket relation.
//!
//! # Responsibility
//! - Detect and heal the two orphan classes the non-atomic dependent writes
//!   can leave behind.
//!
//! # Invariants
//! - Dangling ids (in the project's set, no ticket row) are removed.
//! - Orphan rows (ticket references the project, id absent from the set)
//!   are reattached; the sweep never deletes ticket data.
//! - Running the sweep on a consistent project is a no-op.

use crate::model::ticket::TicketId;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::ticket_repo::TicketRepository;
use crate::service::{BoardError, BoardResult};
use log::info;
use std::collections::HashSet;

/// What one sweep of a project found and healed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Ids removed from the project's ticket set (no backing row).
    pub dangling_removed: Vec<TicketId>,
    /// Ticket rows re-added to the project's ticket set.
    pub orphans_reattached: Vec<TicketId>,
}

impl ConsistencyReport {
    /// Returns whether the sweep changed anything.
    pub fn is_clean(&self) -> bool {
        self.dangling_removed.is_empty() && self.orphans_reattached.is_empty()
    }
}

/// Maintenance sweep; runs without an actor, outside the membership gate.
pub struct ConsistencySweep<P: ProjectRepository, T: TicketRepository> {
    projects: P,
    tickets: T,
}

impl<P: ProjectRepository, T: TicketRepository> ConsistencySweep<P, T> {
    /// Creates a sweep from the two entity repositories.
    pub fn new(projects: P, tickets: T) -> Self {
        Self { projects, tickets }
    }

    /// Reconciles one project's ticket set against the ticket rows.
    ///
    /// The healing write is a single project save and is idempotent: a
    /// second sweep over the same state reports clean.
    pub fn reconcile_project(&self, project_id: &str) -> BoardResult<ConsistencyReport> {
        let mut project = self
            .projects
            .get_project(project_id)?
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?;

        let rows = self.tickets.list_by_project(project_id)?;
        let row_ids: HashSet<TicketId> = rows.iter().map(|ticket| ticket.ticket_id).collect();
        let referenced: HashSet<TicketId> = project.tickets.iter().copied().collect();

        let report = ConsistencyReport {
            dangling_removed: project
                .tickets
                .iter()
                .filter(|id| !row_ids.contains(id))
                .copied()
                .collect(),
            orphans_reattached: rows
                .iter()
                .map(|ticket| ticket.ticket_id)
                .filter(|id| !referenced.contains(id))
                .collect(),
        };

        if !report.is_clean() {
            project.tickets.retain(|id| row_ids.contains(id));
            for orphan in &report.orphans_reattached {
                project.add_ticket(*orphan);
            }
            self.projects.save_project(&project)?;
            info!(
                "event=reconcile module=sweep status=healed project_id={project_id} \
                 dangling={} orphans={}",
                report.dangling_removed.len(),
                report.orphans_reattached.len()
            );
        }

        Ok(report)
    }
}
