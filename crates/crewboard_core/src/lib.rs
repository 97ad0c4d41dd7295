//! Core domain logic for the crewboard shared kanban tracker.
//! This crate is the single source of truth for board business invariants:
//! membership authorization, column registry rules, and the ticket/project
//! referential consistency maintained across independent entity writes.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sanitize;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Project, ProjectId};
pub use model::ticket::{Ticket, TicketId, TicketValidationError};
pub use model::user::{User, UserId};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::ticket_repo::{SqliteTicketRepository, TicketRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::board_service::BoardService;
pub use service::project_service::ProjectService;
pub use service::reconcile::{ConsistencyReport, ConsistencySweep};
pub use service::ticket_service::{TicketDraft, TicketPatch, TicketService};
pub use service::{BoardError, BoardResult, MemberRole};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
