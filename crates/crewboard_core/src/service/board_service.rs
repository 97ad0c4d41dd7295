//! Column registry service.
//!
//! # Responsibility
//! - Maintain each project's ordered column list: add and reorder.
//!
//! # Invariants
//! - Column operations require actor membership, the same rule as every
//!   other mutation on a project.
//! - The column list stays an ordered set; reorder accepts only an exact
//!   permutation of the current set.

use crate::model::project::Project;
use crate::repo::project_repo::ProjectRepository;
use crate::service::membership::is_member;
use crate::service::{BoardError, BoardResult};
use log::info;

/// Use-case service for project column management.
pub struct BoardService<P: ProjectRepository> {
    projects: P,
}

impl<P: ProjectRepository> BoardService<P> {
    /// Creates a service using the provided repository implementation.
    pub fn new(projects: P) -> Self {
        Self { projects }
    }

    /// Adds a column to the project's lane list.
    ///
    /// Duplicate names are a silent no-op; the persisted add is a single
    /// atomic statement on the project row. Returns the updated project.
    pub fn add_column(&self, project_id: &str, name: &str, actor: &str) -> BoardResult<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoardError::Validation(
                "column name must not be blank".to_string(),
            ));
        }

        let project = self.require_project_member(project_id, actor)?;
        let already_present = project.column_exists(name);

        let updated = self.projects.add_column_to_set(project_id, name)?;
        if !already_present {
            info!(
                "event=column_add module=board status=ok project_id={project_id} column={name}"
            );
        }
        Ok(updated)
    }

    /// Replaces the column order wholesale.
    ///
    /// `new_order` must be an exact permutation of the current column set;
    /// anything else is rejected before any write.
    pub fn reorder_columns(
        &self,
        project_id: &str,
        new_order: &[String],
        actor: &str,
    ) -> BoardResult<Project> {
        let mut project = self.require_project_member(project_id, actor)?;

        if !project.is_column_permutation(new_order) {
            return Err(BoardError::Validation(format!(
                "new column order must be a permutation of the existing {} columns",
                project.columns.len()
            )));
        }

        project.columns = new_order.to_vec();
        self.projects.save_project(&project)?;
        info!("event=column_reorder module=board status=ok project_id={project_id}");
        Ok(project)
    }

    fn require_project_member(&self, project_id: &str, actor: &str) -> BoardResult<Project> {
        let project = self
            .projects
            .get_project(project_id)?
            .ok_or_else(|| BoardError::ProjectNotFound(project_id.to_string()))?;
        if !is_member(&project, actor) {
            return Err(BoardError::Unauthorized {
                user_id: actor.to_string(),
                project_id: project_id.to_string(),
            });
        }
        Ok(project)
    }
}
