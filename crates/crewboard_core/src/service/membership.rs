//! Membership guard predicates.
//!
//! # Responsibility
//! - Answer membership questions over an already-loaded project.
//!
//! # Invariants
//! - Pure functions: no side effects, no I/O.
//! - Used both for actor authorization and for validating ticket
//!   assignee/watcher closure.

use crate::model::project::Project;
use crate::model::user::UserId;

/// Returns whether `user_id` appears in the project's member list.
pub fn is_member(project: &Project, user_id: &str) -> bool {
    project.members.iter().any(|member| member == user_id)
}

/// Returns the first id in `ids` that is not a project member.
///
/// First offender wins, matching the fail-fast policy of every board check.
pub fn first_non_member<'a>(project: &Project, ids: &'a [UserId]) -> Option<&'a UserId> {
    ids.iter().find(|id| !is_member(project, id))
}

#[cfg(test)]
mod tests {
    use super::{first_non_member, is_member};
    use crate::model::project::Project;

    fn project() -> Project {
        let mut project = Project::new("p1", "", "alice", &[]);
        project.add_member("bob");
        project
    }

    #[test]
    fn is_member_checks_exact_ids() {
        let project = project();
        assert!(is_member(&project, "alice"));
        assert!(is_member(&project, "bob"));
        assert!(!is_member(&project, "carol"));
        assert!(!is_member(&project, "ali"));
    }

    #[test]
    fn first_non_member_reports_first_offender() {
        let project = project();
        let ids = vec!["bob".to_string(), "carol".to_string(), "dave".to_string()];
        assert_eq!(first_non_member(&project, &ids).map(String::as_str), Some("carol"));
        assert_eq!(first_non_member(&project, &ids[..1]), None);
    }
}
