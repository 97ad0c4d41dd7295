//! Ticket domain model.
//!
//! # Responsibility
//! - Define the ticket record and its membership-closure invariant helpers.
//! - Validate structural ticket state before any persistence write.
//!
//! # Invariants
//! - `project` is immutable after creation; `column` changes implement moves.
//! - `watchers` is deduplicated and never contains `assignee` (the assignee
//!   is implicitly always a watcher).

use crate::model::project::ProjectId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable ticket identifier.
pub type TicketId = Uuid;

/// Structural validation failures for a ticket record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    /// Title is blank after sanitation.
    BlankTitle,
    /// Assignee id is blank.
    BlankAssignee,
    /// Project reference is blank.
    BlankProject,
    /// Column reference is blank.
    BlankColumn,
    /// Watcher set contains the assignee or a duplicate/blank entry.
    MalformedWatchers(String),
}

impl Display for TicketValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "ticket title must not be blank"),
            Self::BlankAssignee => write!(f, "ticket assignee must not be blank"),
            Self::BlankProject => write!(f, "ticket project must not be blank"),
            Self::BlankColumn => write!(f, "ticket column must not be blank"),
            Self::MalformedWatchers(details) => {
                write!(f, "malformed watcher set: {details}")
            }
        }
    }
}

impl Error for TicketValidationError {}

/// A unit of work in one project and one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Stable ticket id.
    pub ticket_id: TicketId,
    /// Owning project key. Never changes after creation.
    pub project: ProjectId,
    /// Current column name; mutated to move the ticket between lanes.
    pub column: String,
    /// Short summary line.
    pub title: String,
    /// Free-text body.
    pub description: String,
    /// Optional due date, epoch milliseconds.
    pub due_date: Option<i64>,
    /// Exactly one responsible member.
    pub assignee: UserId,
    /// Members watching the ticket, excluding the assignee.
    pub watchers: Vec<UserId>,
}

impl Ticket {
    /// Creates a ticket with a generated id.
    ///
    /// The watcher list is normalized: duplicates and the assignee are
    /// dropped while preserving first-seen order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project: impl Into<ProjectId>,
        column: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<i64>,
        assignee: impl Into<UserId>,
        watchers: Vec<UserId>,
    ) -> Self {
        let assignee = assignee.into();
        let watchers = normalize_watchers(&assignee, watchers);
        Self {
            ticket_id: Uuid::new_v4(),
            project: project.into(),
            column: column.into(),
            title: title.into(),
            description: description.into(),
            due_date,
            assignee,
            watchers,
        }
    }

    /// Checks structural invariants prior to persistence.
    pub fn validate(&self) -> Result<(), TicketValidationError> {
        if self.title.trim().is_empty() {
            return Err(TicketValidationError::BlankTitle);
        }
        if self.assignee.trim().is_empty() {
            return Err(TicketValidationError::BlankAssignee);
        }
        if self.project.trim().is_empty() {
            return Err(TicketValidationError::BlankProject);
        }
        if self.column.trim().is_empty() {
            return Err(TicketValidationError::BlankColumn);
        }
        let mut seen = Vec::with_capacity(self.watchers.len());
        for watcher in &self.watchers {
            if watcher.trim().is_empty() {
                return Err(TicketValidationError::MalformedWatchers(
                    "blank watcher id".to_string(),
                ));
            }
            if *watcher == self.assignee {
                return Err(TicketValidationError::MalformedWatchers(format!(
                    "watcher `{watcher}` is the assignee"
                )));
            }
            if seen.contains(&watcher) {
                return Err(TicketValidationError::MalformedWatchers(format!(
                    "duplicate watcher `{watcher}`"
                )));
            }
            seen.push(watcher);
        }
        Ok(())
    }
}

/// Drops duplicates and the assignee from a watcher list, keeping order.
///
/// The assignee is implicitly always a watcher, so listing them explicitly
/// would be redundant.
pub fn normalize_watchers(assignee: &str, watchers: Vec<UserId>) -> Vec<UserId> {
    let mut normalized: Vec<UserId> = Vec::with_capacity(watchers.len());
    for watcher in watchers {
        if watcher == assignee || normalized.contains(&watcher) {
            continue;
        }
        normalized.push(watcher);
    }
    normalized
}
