//! User reference record.
//!
//! # Responsibility
//! - Hold the externally issued identity key plus the denormalized list of
//!   projects the user belongs to.
//!
//! # Invariants
//! - `user_id` is issued at signup by the auth subsystem and never changes.
//! - Credential material lives in the auth subsystem, not here.

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};

/// Externally issued identity key (the authenticated username).
pub type UserId = String;

/// User reference as seen by the board core.
///
/// Signup creates this record; the core only mutates the denormalized
/// `projects` back-reference when membership changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity key, unique across the system.
    pub user_id: UserId,
    /// Human-facing name.
    pub display_name: String,
    /// Projects this user is a member of (denormalized back-reference).
    pub projects: Vec<ProjectId>,
}

impl User {
    /// Creates a user reference with no project memberships.
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            projects: Vec::new(),
        }
    }

    /// Adds a project to the back-reference list with set semantics.
    ///
    /// Returns `false` when the project was already listed.
    pub fn add_project(&mut self, project_id: impl Into<ProjectId>) -> bool {
        let project_id = project_id.into();
        if self.projects.contains(&project_id) {
            return false;
        }
        self.projects.push(project_id);
        true
    }
}
