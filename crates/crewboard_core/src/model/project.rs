//! Project domain model.
//!
//! # Responsibility
//! - Define the project record: members, ordered column lanes, ticket set.
//! - Provide ordered-set mutation helpers for columns and tickets.
//!
//! # Invariants
//! - `columns` is an ordered set: unique names, order is the lane order.
//! - `tickets` has set semantics; ordering carries no meaning.
//! - Every id in `tickets` is meant to reference a ticket whose `project`
//!   field equals `project_id`; the writes maintaining this are not atomic,
//!   see `service::reconcile` for the healing pass.

use crate::model::ticket::TicketId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Project key, chosen by the creator and unique across the system.
pub type ProjectId = String;

/// A workspace with members, an ordered column list, and a ticket set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project key.
    pub project_id: ProjectId,
    /// Free-text description.
    pub description: String,
    /// Member user ids; membership is the sole unit of authorization.
    pub members: Vec<UserId>,
    /// Ordered column names (visual lane order).
    pub columns: Vec<String>,
    /// Ids of tickets belonging to this project.
    pub tickets: Vec<TicketId>,
}

impl Project {
    /// Creates a project with the creator as its first member.
    ///
    /// Initial columns are deduplicated while preserving first-seen order.
    pub fn new(
        project_id: impl Into<ProjectId>,
        description: impl Into<String>,
        creator: impl Into<UserId>,
        columns: &[String],
    ) -> Self {
        let mut project = Self {
            project_id: project_id.into(),
            description: description.into(),
            members: vec![creator.into()],
            columns: Vec::new(),
            tickets: Vec::new(),
        };
        for column in columns {
            project.add_column(column.clone());
        }
        project
    }

    /// Returns whether `name` is one of this project's columns.
    pub fn column_exists(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Appends a column with ordered-set semantics.
    ///
    /// Returns `false` when the name was already present (silent no-op).
    pub fn add_column(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.column_exists(&name) {
            return false;
        }
        self.columns.push(name);
        true
    }

    /// Returns whether `proposed` is an exact rearrangement of the current
    /// column set (same names, same multiplicities).
    pub fn is_column_permutation(&self, proposed: &[String]) -> bool {
        if proposed.len() != self.columns.len() {
            return false;
        }
        let mut current = self.columns.clone();
        let mut candidate = proposed.to_vec();
        current.sort_unstable();
        candidate.sort_unstable();
        current == candidate
    }

    /// Returns whether `ticket_id` is referenced by this project.
    ///
    /// This is the existence check the board uses: a ticket row that was
    /// never linked here (or already unlinked) counts as absent.
    pub fn has_ticket(&self, ticket_id: TicketId) -> bool {
        self.tickets.contains(&ticket_id)
    }

    /// Adds a ticket id with set semantics; `false` when already present.
    pub fn add_ticket(&mut self, ticket_id: TicketId) -> bool {
        if self.has_ticket(ticket_id) {
            return false;
        }
        self.tickets.push(ticket_id);
        true
    }

    /// Removes a ticket id; `false` when it was not referenced.
    pub fn remove_ticket(&mut self, ticket_id: TicketId) -> bool {
        let before = self.tickets.len();
        self.tickets.retain(|id| *id != ticket_id);
        self.tickets.len() != before
    }

    /// Adds a member with set semantics; `false` when already a member.
    pub fn add_member(&mut self, user_id: impl Into<UserId>) -> bool {
        let user_id = user_id.into();
        if self.members.contains(&user_id) {
            return false;
        }
        self.members.push(user_id);
        true
    }
}
