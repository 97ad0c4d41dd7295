//! Use-case services for the board core.
//!
//! # Responsibility
//! - Orchestrate membership authorization, referential checks, and entity
//!   writes above the repository layer.
//! - Define the single error taxonomy every operation reports through.
//!
//! # Invariants
//! - Every mutating operation authorizes the actor against project
//!   membership before touching storage.
//! - Checks are fail-fast: the first violation terminates the request.
//! - Dependent two-step writes have no compensating rollback; partial
//!   failures are logged and surfaced as `Storage`.

use crate::model::project::ProjectId;
use crate::model::ticket::TicketId;
use crate::model::user::UserId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod board_service;
pub mod membership;
pub mod project_service;
pub mod reconcile;
pub mod ticket_service;

pub type BoardResult<T> = Result<T, BoardError>;

/// Which ticket role failed the membership closure check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Assignee,
    Watcher,
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assignee => write!(f, "assignee"),
            Self::Watcher => write!(f, "watcher"),
        }
    }
}

/// Error taxonomy shared by every board operation.
#[derive(Debug)]
pub enum BoardError {
    /// Malformed input, rejected before business logic.
    Validation(String),
    /// Project key does not exist.
    ProjectNotFound(ProjectId),
    /// Column name is not in the project's column list.
    ColumnNotFound { project_id: ProjectId, column: String },
    /// Ticket id is not referenced by the project's ticket set.
    TicketNotFound(TicketId),
    /// User key does not exist.
    UserNotFound(UserId),
    /// Actor is not a member of the project.
    Unauthorized {
        user_id: UserId,
        project_id: ProjectId,
    },
    /// Assignee or watcher is not a member of the project.
    MemberConflict { user_id: UserId, role: MemberRole },
    /// Project key already taken.
    ProjectExists(ProjectId),
    /// Underlying persistence failure, surfaced verbatim, never retried.
    Storage(RepoError),
}

impl BoardError {
    /// Maps the error kind to the HTTP status the transport layer reports.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::ProjectNotFound(_)
            | Self::ColumnNotFound { .. }
            | Self::TicketNotFound(_)
            | Self::UserNotFound(_) => 404,
            Self::Unauthorized { .. } => 401,
            Self::MemberConflict { .. } | Self::ProjectExists(_) => 409,
            Self::Storage(_) => 500,
        }
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::ProjectNotFound(id) => write!(f, "project id {id} does not exist"),
            Self::ColumnNotFound { project_id, column } => {
                write!(f, "column {column} does not exist in project {project_id}")
            }
            Self::TicketNotFound(id) => write!(f, "ticket id {id} does not exist"),
            Self::UserNotFound(id) => write!(f, "user {id} does not exist"),
            Self::Unauthorized {
                user_id,
                project_id,
            } => write!(f, "access denied for {user_id} on project {project_id}"),
            Self::MemberConflict { user_id, role } => {
                write!(f, "{role} {user_id} not part of project")
            }
            Self::ProjectExists(id) => write!(f, "project id {id} already exists"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            RepoError::ProjectExists(id) => Self::ProjectExists(id),
            RepoError::TicketNotFound(id) => Self::TicketNotFound(id),
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            other => Self::Storage(other),
        }
    }
}
