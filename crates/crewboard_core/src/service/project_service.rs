//! Project lifecycle and membership service.
//!
//! # Responsibility
//! - Create projects, manage membership, and keep the user-side project
//!   back-reference in step with the project member list.
//!
//! # Invariants
//! - The creator is always the first member of a new project.
//! - Membership mutations write the project row first, then the user row;
//!   the same dependent-write exposure as the ticket paths applies.

use crate::model::project::{Project, ProjectId};
use crate::model::user::User;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::user_repo::UserRepository;
use crate::sanitize::sanitize_description;
use crate::service::membership::is_member;
use crate::service::{BoardError, BoardResult};
use log::{info, warn};

/// Use-case service for project lifecycle and membership.
pub struct ProjectService<P: ProjectRepository, U: UserRepository> {
    projects: P,
    users: U,
}

impl<P: ProjectRepository, U: UserRepository> ProjectService<P, U> {
    /// Creates a service from the two entity repositories.
    pub fn new(projects: P, users: U) -> Self {
        Self { projects, users }
    }

    /// Creates a project with the creator as its first member.
    ///
    /// Initial columns are deduplicated preserving order. After the project
    /// row is written, the project id is appended to the creator's
    /// denormalized project list; a failure there leaves the project
    /// reachable but unlisted for the creator (logged, surfaced as-is).
    pub fn create_project(
        &self,
        project_id: &str,
        description: &str,
        columns: &[String],
        creator: &str,
    ) -> BoardResult<Project> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(BoardError::Validation(
                "project id must not be blank".to_string(),
            ));
        }

        let mut creator_user = self.require_user(creator)?;

        let project = Project::new(
            project_id,
            sanitize_description(description),
            creator,
            columns,
        );
        self.projects.insert_project(&project)?;

        if creator_user.add_project(project_id) {
            if let Err(err) = self.users.save_user(&creator_user) {
                warn!(
                    "event=project_create module=project status=partial project_id={project_id} \
                     user_id={creator} detail=missing_backref error={err}"
                );
                return Err(err.into());
            }
        }

        info!("event=project_create module=project status=ok project_id={project_id}");
        Ok(project)
    }

    /// Adds a user to the project's member list.
    ///
    /// Requires the actor to be a member; adding an existing member is a
    /// no-op. Returns the updated project.
    pub fn add_member(&self, project_id: &str, user_id: &str, actor: &str) -> BoardResult<Project> {
        let mut project = self.require_project(project_id)?;
        if !is_member(&project, actor) {
            return Err(BoardError::Unauthorized {
                user_id: actor.to_string(),
                project_id: project_id.to_string(),
            });
        }

        let mut user = self.require_user(user_id)?;

        if project.add_member(user_id) {
            self.projects.save_project(&project)?;
        }
        if user.add_project(project_id) {
            if let Err(err) = self.users.save_user(&user) {
                warn!(
                    "event=member_add module=project status=partial project_id={project_id} \
                     user_id={user_id} detail=missing_backref error={err}"
                );
                return Err(err.into());
            }
        }

        info!(
            "event=member_add module=project status=ok project_id={project_id} user_id={user_id}"
        );
        Ok(project)
    }

    /// Membership-gated read of one project record.
    pub fn get_project(&self, project_id: &str, actor: &str) -> BoardResult<Project> {
        let project = self.require_project(project_id)?;
        if !is_member(&project, actor) {
            return Err(BoardError::Unauthorized {
                user_id: actor.to_string(),
                project_id: project_id.to_string(),
            });
        }
        Ok(project)
    }

    /// Returns the user's denormalized project list.
    pub fn projects_for_user(&self, user_id: &str) -> BoardResult<Vec<ProjectId>> {
        Ok(self.require_user(user_id)?.projects)
    }

    fn require_project(&self, project_id: &str) -> BoardResult<Project> {
        self.projects
            .get_project(project_id)?
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))
    }

    fn require_user(&self, user_id: &str) -> BoardResult<User> {
        self.users
            .get_user(user_id)?
            .ok_or_else(|| BoardError::UserNotFound(user_id.to_string()))
    }
}
