use jayamesh_core::db::open_db_in_memory;
use jayamesh_core::repo::focus_repo::{FocusSessionRepository, SqliteFocusSessionRepository};
use jayamesh_core::repo::note_repo::SqliteNoteRepository;
use jayamesh_core::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use jayamesh_core::repo::section_repo::{SectionRepository, SqliteSectionRepository};
use jayamesh_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use jayamesh_core::service::note_service::NoteService;
use jayamesh_core::service::project_service::{ProjectDraft, ProjectService, ProjectServiceError};
use jayamesh_core::service::section_service::SectionService;
use jayamesh_core::{seed_if_empty, FocusMode, FocusSession, ListScope};
use rusqlite::Connection;

#[test]
fn seeding_inserts_sample_project_once() {
    let conn = open_db_in_memory().unwrap();

    assert!(seed_if_empty(&conn).unwrap());
    assert!(!seed_if_empty(&conn).unwrap());

    assert_eq!(row_count(&conn, "projects"), 1);
    assert_eq!(row_count(&conn, "sections"), 5);
    assert_eq!(row_count(&conn, "goals"), 6);
    assert_eq!(row_count(&conn, "tasks"), 16);

    let projects = SqliteProjectRepository::try_new(&conn).unwrap();
    let listed = projects.list_projects(false).unwrap();
    assert_eq!(listed[0].title, "Mobile Game - Boom Ball");

    let sections = SqliteSectionRepository::try_new(&conn).unwrap();
    let orders: Vec<i64> = sections
        .list_sections(Some(listed[0].id))
        .unwrap()
        .iter()
        .map(|section| section.order)
        .collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5]);
}

#[test]
fn seeding_skips_a_store_with_user_projects() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    service
        .create_project(ProjectDraft::titled("Mine"))
        .unwrap();

    assert!(!seed_if_empty(&conn).unwrap());
    assert_eq!(row_count(&conn, "projects"), 1);
    assert_eq!(row_count(&conn, "tasks"), 0);
}

#[test]
fn seeded_tasks_link_to_goals_of_their_section() {
    let conn = open_db_in_memory().unwrap();
    seed_if_empty(&conn).unwrap();

    let mismatched: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM tasks t JOIN goals g ON g.id = t.goal_id
             WHERE g.section_id <> t.section_id;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(mismatched, 0);
}

#[test]
fn deleting_a_project_removes_everything_it_owns() {
    let conn = open_db_in_memory().unwrap();
    seed_if_empty(&conn).unwrap();
    let project_id = first_project_id(&conn);

    let survivor = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap())
        .create_project(ProjectDraft::titled("Survivor"))
        .unwrap();

    let section_id = {
        let sections = SqliteSectionRepository::try_new(&conn).unwrap();
        sections.list_sections(Some(project_id)).unwrap()[0].id
    };
    let notes = NoteService::new(
        SqliteSectionRepository::try_new(&conn).unwrap(),
        SqliteNoteRepository::try_new(&conn).unwrap(),
    );
    notes
        .create_note(section_id, "Kickoff", "agenda", "meeting, Plan")
        .unwrap();

    let task_id = SqliteTaskRepository::try_new(&conn)
        .unwrap()
        .list_tasks(ListScope::Project(project_id))
        .unwrap()[0]
        .id;
    let sessions = SqliteFocusSessionRepository::try_new(&conn).unwrap();
    let mut linked = FocusSession::finished(FocusMode::Pomodoro, true, 4);
    linked.project_id = Some(project_id);
    linked.task_id = Some(task_id);
    sessions.create_session(&linked).unwrap();
    let mut other = FocusSession::finished(FocusMode::DeepWork, true, 3);
    other.project_id = Some(survivor.id);
    sessions.create_session(&other).unwrap();

    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    service.delete_project(project_id).unwrap();

    assert!(service.get_project(project_id).unwrap().is_none());
    assert_eq!(row_count(&conn, "sections"), 0);
    assert_eq!(row_count(&conn, "goals"), 0);
    assert_eq!(row_count(&conn, "tasks"), 0);
    assert_eq!(row_count(&conn, "notes"), 0);
    assert_eq!(row_count(&conn, "note_tags"), 0);
    assert_eq!(row_count(&conn, "focus_sessions"), 1);
    assert!(service.get_project(survivor.id).unwrap().is_some());
}

#[test]
fn deleting_a_missing_project_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    let missing = uuid::Uuid::new_v4();
    let err = service.delete_project(missing).unwrap_err();
    assert!(matches!(err, ProjectServiceError::ProjectNotFound(id) if id == missing));
}

#[test]
fn deleting_a_section_removes_its_records_and_detaches_sessions() {
    let conn = open_db_in_memory().unwrap();
    seed_if_empty(&conn).unwrap();
    let project_id = first_project_id(&conn);

    let service = SectionService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteSectionRepository::try_new(&conn).unwrap(),
    );
    let sections = service.list_sections(project_id).unwrap();
    let planning = sections
        .iter()
        .find(|section| section.label() == "Planning")
        .unwrap();
    let development = sections
        .iter()
        .find(|section| section.label() == "Development")
        .unwrap();

    let notes = NoteService::new(
        SqliteSectionRepository::try_new(&conn).unwrap(),
        SqliteNoteRepository::try_new(&conn).unwrap(),
    );
    notes
        .create_note(planning.id, "Scope", "core loop", "design, scope")
        .unwrap();
    let kept_note = notes
        .create_note(development.id, "Build log", "", "build")
        .unwrap();

    let planning_task = SqliteTaskRepository::try_new(&conn)
        .unwrap()
        .list_tasks(ListScope::Section(planning.id))
        .unwrap()[0]
        .id;
    let mut session = FocusSession::finished(FocusMode::Pomodoro, true, 4);
    session.project_id = Some(project_id);
    session.task_id = Some(planning_task);
    SqliteFocusSessionRepository::try_new(&conn)
        .unwrap()
        .create_session(&session)
        .unwrap();

    service.delete_section(planning.id).unwrap();

    assert_eq!(service.list_sections(project_id).unwrap().len(), 4);
    assert_eq!(row_count(&conn, "goals"), 4);
    assert_eq!(row_count(&conn, "tasks"), 12);
    assert_eq!(row_count(&conn, "notes"), 1);
    assert_eq!(row_count(&conn, "note_tags"), 1);
    assert!(notes.get_note(kept_note.id).unwrap().is_some());

    let remaining = SqliteFocusSessionRepository::try_new(&conn)
        .unwrap()
        .list_sessions(Some(project_id))
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, session.id);
    assert_eq!(remaining[0].task_id, None);
}

#[test]
fn failed_project_delete_rolls_back_every_step() {
    let conn = open_db_in_memory().unwrap();
    seed_if_empty(&conn).unwrap();
    let project_id = first_project_id(&conn);
    conn.execute_batch(
        "CREATE TEMP TRIGGER block_section_delete BEFORE DELETE ON sections
         BEGIN SELECT RAISE(ABORT, 'sections are locked'); END;",
    )
    .unwrap();

    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let err = service.delete_project(project_id).unwrap_err();
    assert!(matches!(err, ProjectServiceError::Repo(_)));

    assert!(conn.is_autocommit());
    assert_eq!(row_count(&conn, "projects"), 1);
    assert_eq!(row_count(&conn, "sections"), 5);
    assert_eq!(row_count(&conn, "goals"), 6);
    assert_eq!(row_count(&conn, "tasks"), 16);
}

fn first_project_id(conn: &Connection) -> uuid::Uuid {
    SqliteProjectRepository::try_new(conn)
        .unwrap()
        .list_projects(true)
        .unwrap()[0]
        .id
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
