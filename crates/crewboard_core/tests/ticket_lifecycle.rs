use crewboard_core::db::open_db_in_memory;
use crewboard_core::{
    BoardError, MemberRole, ProjectService, SqliteProjectRepository, SqliteTicketRepository,
    SqliteUserRepository, TicketDraft, TicketPatch, TicketRepository, TicketService, User,
    UserRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Seeds users alice/bob/carol and project `p1` with members [alice, bob]
/// and columns [todo, done]. carol exists but is not a member.
fn seed_board(conn: &Connection) {
    let users = SqliteUserRepository::try_new(conn).unwrap();
    users.insert_user(&User::new("alice", "Alice")).unwrap();
    users.insert_user(&User::new("bob", "Bob")).unwrap();
    users.insert_user(&User::new("carol", "Carol")).unwrap();

    let projects = ProjectService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    );
    projects
        .create_project("p1", "demo board", &columns(&["todo", "done"]), "alice")
        .unwrap();
    projects.add_member("p1", "bob", "alice").unwrap();
}

fn ticket_service(conn: &Connection) -> TicketService<SqliteProjectRepository<'_>, SqliteTicketRepository<'_>> {
    TicketService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteTicketRepository::try_new(conn).unwrap(),
    )
}

fn draft(title: &str, assignee: &str, watchers: &[&str]) -> TicketDraft {
    TicketDraft {
        title: title.to_string(),
        description: "body".to_string(),
        due_date: None,
        assignee: assignee.to_string(),
        watchers: watchers.iter().map(|watcher| watcher.to_string()).collect(),
    }
}

fn load_project(conn: &Connection, project_id: &str) -> crewboard_core::Project {
    use crewboard_core::ProjectRepository;
    SqliteProjectRepository::try_new(conn)
        .unwrap()
        .get_project(project_id)
        .unwrap()
        .unwrap()
}

#[test]
fn create_links_ticket_into_project_set() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &["alice"]), "alice")
        .unwrap();

    assert_eq!(ticket.project, "p1");
    assert_eq!(ticket.column, "todo");
    assert_eq!(ticket.assignee, "bob");
    assert_eq!(ticket.watchers, vec!["alice"]);

    let project = load_project(&conn, "p1");
    assert_eq!(project.tickets, vec![ticket.ticket_id]);
}

#[test]
fn create_drops_assignee_from_watchers() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &["bob", "alice"]), "alice")
        .unwrap();
    assert_eq!(ticket.watchers, vec!["alice"]);
}

#[test]
fn create_by_non_member_is_unauthorized_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &[]), "carol")
        .unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized { .. }));
    assert_eq!(err.http_status(), 401);

    assert!(load_project(&conn, "p1").tickets.is_empty());
    let tickets = SqliteTicketRepository::try_new(&conn).unwrap();
    assert!(tickets.list_by_project("p1").unwrap().is_empty());
}

#[test]
fn create_with_outside_assignee_is_a_conflict_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service
        .create_ticket("p1", "todo", &draft("t1", "carol", &["alice"]), "alice")
        .unwrap_err();
    match err {
        BoardError::MemberConflict { user_id, role } => {
            assert_eq!(user_id, "carol");
            assert_eq!(role, MemberRole::Assignee);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(load_project(&conn, "p1").tickets.is_empty());
    let tickets = SqliteTicketRepository::try_new(&conn).unwrap();
    assert!(tickets.list_by_project("p1").unwrap().is_empty());
}

#[test]
fn create_with_outside_watcher_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &["carol"]), "alice")
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::MemberConflict {
            role: MemberRole::Watcher,
            ..
        }
    ));
    assert_eq!(err.http_status(), 409);
}

#[test]
fn create_in_missing_column_is_not_found_and_creates_no_ticket() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service
        .create_ticket("p1", "inbox", &draft("t1", "bob", &[]), "alice")
        .unwrap_err();
    assert!(matches!(err, BoardError::ColumnNotFound { .. }));
    assert_eq!(err.http_status(), 404);

    let tickets = SqliteTicketRepository::try_new(&conn).unwrap();
    assert!(tickets.list_by_project("p1").unwrap().is_empty());
}

#[test]
fn create_in_missing_project_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service
        .create_ticket("nope", "todo", &draft("t1", "bob", &[]), "alice")
        .unwrap_err();
    assert!(matches!(err, BoardError::ProjectNotFound(_)));
}

#[test]
fn create_with_blank_title_fails_validation_before_any_lookup() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service
        .create_ticket("nope", "todo", &draft("   ", "bob", &[]), "alice")
        .unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));
    assert_eq!(err.http_status(), 422);
}

#[test]
fn create_sanitizes_title_html() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("<b>t1</b>", "bob", &[]), "alice")
        .unwrap();
    assert_eq!(ticket.title, "&lt;b&gt;t1&lt;&#x2F;b&gt;");
}

#[test]
fn list_sorts_by_due_date_with_undated_last() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let mut later = draft("later", "bob", &[]);
    later.due_date = Some(2_000);
    let mut sooner = draft("sooner", "bob", &[]);
    sooner.due_date = Some(1_000);
    let undated_a = draft("undated a", "bob", &[]);
    let undated_b = draft("undated b", "bob", &[]);

    let later = service.create_ticket("p1", "todo", &later, "alice").unwrap();
    let sooner = service.create_ticket("p1", "todo", &sooner, "alice").unwrap();
    let undated_a = service.create_ticket("p1", "todo", &undated_a, "alice").unwrap();
    let undated_b = service.create_ticket("p1", "todo", &undated_b, "alice").unwrap();

    let listed = service.list_tickets("p1", "todo", "bob").unwrap();
    let ids: Vec<_> = listed.iter().map(|ticket| ticket.ticket_id).collect();

    let mut undated = vec![undated_a.ticket_id, undated_b.ticket_id];
    undated.sort_by_key(|id| id.to_string());
    assert_eq!(
        ids,
        vec![sooner.ticket_id, later.ticket_id, undated[0], undated[1]]
    );
}

#[test]
fn list_requires_membership_and_known_column() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service.list_tickets("p1", "todo", "carol").unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized { .. }));

    let err = service.list_tickets("p1", "inbox", "alice").unwrap_err();
    assert!(matches!(err, BoardError::ColumnNotFound { .. }));
}

#[test]
fn update_moves_ticket_between_columns() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &[]), "alice")
        .unwrap();

    let patch = TicketPatch {
        column: Some("done".to_string()),
        ..TicketPatch::default()
    };
    let updated = service
        .update_ticket("p1", ticket.ticket_id, &patch, "bob")
        .unwrap();
    assert_eq!(updated.column, "done");

    assert_eq!(service.list_tickets("p1", "todo", "bob").unwrap().len(), 0);
    assert_eq!(service.list_tickets("p1", "done", "bob").unwrap().len(), 1);
}

#[test]
fn update_to_missing_column_is_not_found_and_leaves_ticket_unchanged() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &[]), "alice")
        .unwrap();

    let patch = TicketPatch {
        column: Some("inbox".to_string()),
        ..TicketPatch::default()
    };
    let err = service
        .update_ticket("p1", ticket.ticket_id, &patch, "bob")
        .unwrap_err();
    assert!(matches!(err, BoardError::ColumnNotFound { .. }));

    let tickets = SqliteTicketRepository::try_new(&conn).unwrap();
    let stored = tickets.get_ticket(ticket.ticket_id).unwrap().unwrap();
    assert_eq!(stored.column, "todo");
}

#[test]
fn update_keeps_watcher_closure_when_assignee_changes() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &["alice"]), "alice")
        .unwrap();

    // alice takes over; she was a watcher and must drop out of the set.
    let patch = TicketPatch {
        assignee: Some("alice".to_string()),
        ..TicketPatch::default()
    };
    let updated = service
        .update_ticket("p1", ticket.ticket_id, &patch, "bob")
        .unwrap();
    assert_eq!(updated.assignee, "alice");
    assert!(updated.watchers.is_empty());
}

#[test]
fn update_rejects_outside_assignee_and_watchers() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &[]), "alice")
        .unwrap();

    let patch = TicketPatch {
        assignee: Some("carol".to_string()),
        ..TicketPatch::default()
    };
    let err = service
        .update_ticket("p1", ticket.ticket_id, &patch, "alice")
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::MemberConflict {
            role: MemberRole::Assignee,
            ..
        }
    ));

    let patch = TicketPatch {
        watchers: Some(vec!["carol".to_string()]),
        ..TicketPatch::default()
    };
    let err = service
        .update_ticket("p1", ticket.ticket_id, &patch, "alice")
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::MemberConflict {
            role: MemberRole::Watcher,
            ..
        }
    ));
}

#[test]
fn update_judges_ticket_existence_by_project_relation() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    // A ticket row that was never linked into the project's set is treated
    // as absent even though it physically exists.
    let tickets = SqliteTicketRepository::try_new(&conn).unwrap();
    let stray = crewboard_core::Ticket::new(
        "p1",
        "todo",
        "stray",
        "",
        None,
        "bob".to_string(),
        vec![],
    );
    tickets.insert_ticket(&stray).unwrap();

    let err = service
        .update_ticket("p1", stray.ticket_id, &TicketPatch::default(), "alice")
        .unwrap_err();
    assert!(matches!(err, BoardError::TicketNotFound(_)));

    let err = service
        .update_ticket("p1", Uuid::new_v4(), &TicketPatch::default(), "alice")
        .unwrap_err();
    assert!(matches!(err, BoardError::TicketNotFound(_)));
}

#[test]
fn update_can_clear_due_date() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let mut dated = draft("t1", "bob", &[]);
    dated.due_date = Some(5_000);
    let ticket = service.create_ticket("p1", "todo", &dated, "alice").unwrap();

    let patch = TicketPatch {
        due_date: Some(None),
        ..TicketPatch::default()
    };
    let updated = service
        .update_ticket("p1", ticket.ticket_id, &patch, "bob")
        .unwrap();
    assert_eq!(updated.due_date, None);
}

#[test]
fn delete_unlinks_and_removes_ticket() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &["alice"]), "alice")
        .unwrap();

    service.delete_ticket("p1", ticket.ticket_id, "bob").unwrap();

    assert!(load_project(&conn, "p1").tickets.is_empty());
    let tickets = SqliteTicketRepository::try_new(&conn).unwrap();
    assert!(tickets.get_ticket(ticket.ticket_id).unwrap().is_none());
}

#[test]
fn delete_by_non_member_is_unauthorized() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let ticket = service
        .create_ticket("p1", "todo", &draft("t1", "bob", &[]), "alice")
        .unwrap();

    let err = service
        .delete_ticket("p1", ticket.ticket_id, "carol")
        .unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized { .. }));
    assert_eq!(load_project(&conn, "p1").tickets, vec![ticket.ticket_id]);
}

#[test]
fn delete_of_unreferenced_ticket_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    seed_board(&conn);
    let service = ticket_service(&conn);

    let err = service
        .delete_ticket("p1", Uuid::new_v4(), "alice")
        .unwrap_err();
    assert!(matches!(err, BoardError::TicketNotFound(_)));
}
