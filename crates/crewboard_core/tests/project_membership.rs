use crewboard_core::db::open_db_in_memory;
use crewboard_core::{
    BoardError, ProjectService, SqliteProjectRepository, SqliteUserRepository, User,
    UserRepository,
};
use rusqlite::Connection;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn seed_users(conn: &Connection) {
    let users = SqliteUserRepository::try_new(conn).unwrap();
    users.insert_user(&User::new("alice", "Alice")).unwrap();
    users.insert_user(&User::new("bob", "Bob")).unwrap();
    users.insert_user(&User::new("carol", "Carol")).unwrap();
}

fn service(conn: &Connection) -> ProjectService<SqliteProjectRepository<'_>, SqliteUserRepository<'_>> {
    ProjectService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn create_project_makes_creator_the_first_member() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = service(&conn);

    let project = service
        .create_project("p1", "demo", &columns(&["todo", "done", "todo"]), "alice")
        .unwrap();

    assert_eq!(project.members, vec!["alice"]);
    assert_eq!(project.columns, vec!["todo", "done"]);
    assert!(project.tickets.is_empty());

    // The denormalized back-reference is written too.
    assert_eq!(service.projects_for_user("alice").unwrap(), vec!["p1"]);
}

#[test]
fn create_project_rejects_duplicate_keys() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = service(&conn);

    service.create_project("p1", "", &[], "alice").unwrap();
    let err = service.create_project("p1", "", &[], "bob").unwrap_err();
    assert!(matches!(err, BoardError::ProjectExists(_)));
    assert_eq!(err.http_status(), 409);
}

#[test]
fn create_project_requires_a_known_creator() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);

    let err = service(&conn)
        .create_project("p1", "", &[], "mallory")
        .unwrap_err();
    assert!(matches!(err, BoardError::UserNotFound(_)));
}

#[test]
fn add_member_updates_both_sides_of_the_relation() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = service(&conn);

    service.create_project("p1", "", &[], "alice").unwrap();
    let project = service.add_member("p1", "bob", "alice").unwrap();

    assert_eq!(project.members, vec!["alice", "bob"]);
    assert_eq!(service.projects_for_user("bob").unwrap(), vec!["p1"]);
}

#[test]
fn add_member_twice_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = service(&conn);

    service.create_project("p1", "", &[], "alice").unwrap();
    service.add_member("p1", "bob", "alice").unwrap();
    let project = service.add_member("p1", "bob", "alice").unwrap();

    assert_eq!(project.members, vec!["alice", "bob"]);
    assert_eq!(service.projects_for_user("bob").unwrap(), vec!["p1"]);
}

#[test]
fn add_member_requires_actor_membership() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = service(&conn);

    service.create_project("p1", "", &[], "alice").unwrap();
    let err = service.add_member("p1", "bob", "carol").unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized { .. }));
}

#[test]
fn add_member_rejects_unknown_users() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = service(&conn);

    service.create_project("p1", "", &[], "alice").unwrap();
    let err = service.add_member("p1", "mallory", "alice").unwrap_err();
    assert!(matches!(err, BoardError::UserNotFound(_)));
    assert_eq!(err.http_status(), 404);
}

#[test]
fn get_project_is_membership_gated() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);
    let service = service(&conn);

    service.create_project("p1", "secret", &[], "alice").unwrap();

    let project = service.get_project("p1", "alice").unwrap();
    assert_eq!(project.description, "secret");

    let err = service.get_project("p1", "carol").unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized { .. }));

    let err = service.get_project("nope", "alice").unwrap_err();
    assert!(matches!(err, BoardError::ProjectNotFound(_)));
}

#[test]
fn duplicate_user_signup_is_rejected_at_the_store() {
    let conn = open_db_in_memory().unwrap();
    seed_users(&conn);

    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let err = users.insert_user(&User::new("alice", "Alice again")).unwrap_err();
    assert!(matches!(err, crewboard_core::RepoError::UserExists(_)));
}
