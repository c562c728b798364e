use chrono::{Duration, Utc};
use jayamesh_core::db::open_db_in_memory;
use jayamesh_core::repo::focus_repo::SqliteFocusSessionRepository;
use jayamesh_core::repo::goal_repo::SqliteGoalRepository;
use jayamesh_core::repo::note_repo::SqliteNoteRepository;
use jayamesh_core::repo::project_repo::SqliteProjectRepository;
use jayamesh_core::repo::section_repo::SqliteSectionRepository;
use jayamesh_core::repo::task_repo::SqliteTaskRepository;
use jayamesh_core::service::focus_service::{FocusService, SessionRecord};
use jayamesh_core::service::goal_service::{GoalDraft, GoalService, GoalServiceError};
use jayamesh_core::service::note_service::{split_pinned, NoteService, NoteServiceError};
use jayamesh_core::service::project_service::{ProjectDraft, ProjectService};
use jayamesh_core::service::section_service::{SectionService, SectionServiceError};
use jayamesh_core::service::stats_service::StatsService;
use jayamesh_core::service::task_service::{TaskDraft, TaskService, TaskServiceError};
use jayamesh_core::{FocusMode, GoalStatus, ListScope, ProjectId, SectionId, TaskStatus};
use rusqlite::Connection;

/// Creates a project with two sections and returns their ids.
fn project_with_sections(conn: &Connection) -> (ProjectId, SectionId, SectionId) {
    let project = ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap())
        .create_project(ProjectDraft::titled("Website"))
        .unwrap();
    let sections = SectionService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteSectionRepository::try_new(conn).unwrap(),
    );
    let first = sections.create_section(project.id, "Build", None).unwrap();
    let second = sections
        .create_section(project.id, "Launch", Some("marketing"))
        .unwrap();
    (project.id, first.id, second.id)
}

fn goal_service(
    conn: &Connection,
) -> GoalService<SqliteSectionRepository<'_>, SqliteGoalRepository<'_>> {
    GoalService::new(
        SqliteSectionRepository::try_new(conn).unwrap(),
        SqliteGoalRepository::try_new(conn).unwrap(),
    )
}

fn task_service(
    conn: &Connection,
) -> TaskService<SqliteSectionRepository<'_>, SqliteGoalRepository<'_>, SqliteTaskRepository<'_>> {
    TaskService::new(
        SqliteSectionRepository::try_new(conn).unwrap(),
        SqliteGoalRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

fn note_service(
    conn: &Connection,
) -> NoteService<SqliteSectionRepository<'_>, SqliteNoteRepository<'_>> {
    NoteService::new(
        SqliteSectionRepository::try_new(conn).unwrap(),
        SqliteNoteRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn sections_are_appended_in_order() {
    let conn = open_db_in_memory().unwrap();
    let (project_id, first, second) = project_with_sections(&conn);

    let sections = SectionService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteSectionRepository::try_new(&conn).unwrap(),
    );
    let listed = sections.list_sections(project_id).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!((listed[0].id, listed[0].order), (first, 1));
    assert_eq!((listed[1].id, listed[1].order), (second, 2));
    assert_eq!(listed[0].kind, "custom");
    assert_eq!(listed[1].kind, "marketing");

    let err = sections
        .create_section(uuid::Uuid::new_v4(), "Orphan", None)
        .unwrap_err();
    assert!(matches!(err, SectionServiceError::ProjectNotFound(_)));
}

#[test]
fn goal_defaults_and_progress_clamping() {
    let conn = open_db_in_memory().unwrap();
    let (project_id, section_id, _) = project_with_sections(&conn);
    let goals = goal_service(&conn);

    let goal = goals
        .create_goal(section_id, GoalDraft::new("Ship beta", 10.0))
        .unwrap();
    assert_eq!(goal.project_id, project_id);
    assert_eq!(goal.status, GoalStatus::NotStarted);
    assert_eq!(goal.deadline, Some(goal.created_at + Duration::days(7)));

    let partial = goals.update_progress(goal.id, 4.0).unwrap();
    assert_eq!(partial.status, GoalStatus::InProgress);
    assert_eq!(partial.current, 4.0);

    let over = goals.update_progress(goal.id, 15.0).unwrap();
    assert_eq!(over.status, GoalStatus::Completed);
    assert_eq!(over.current, 10.0);

    let stored = goals.get_goal(goal.id).unwrap().unwrap();
    assert_eq!(stored.current, 10.0);
    assert_eq!(stored.status, GoalStatus::Completed);

    let reset = goals.update_progress(goal.id, -3.0).unwrap();
    assert_eq!(reset.status, GoalStatus::NotStarted);
    assert_eq!(reset.current, 0.0);
}

#[test]
fn goal_rejects_non_positive_target_and_unknown_section() {
    let conn = open_db_in_memory().unwrap();
    let (_, section_id, _) = project_with_sections(&conn);
    let goals = goal_service(&conn);

    let err = goals
        .create_goal(section_id, GoalDraft::new("Nothing", 0.0))
        .unwrap_err();
    assert!(matches!(err, GoalServiceError::Validation(_)));

    let err = goals
        .create_goal(uuid::Uuid::new_v4(), GoalDraft::new("Lost", 1.0))
        .unwrap_err();
    assert!(matches!(err, GoalServiceError::SectionNotFound(_)));
}

#[test]
fn deleting_a_goal_keeps_its_tasks() {
    let conn = open_db_in_memory().unwrap();
    let (_, section_id, _) = project_with_sections(&conn);
    let goal = goal_service(&conn)
        .create_goal(section_id, GoalDraft::new("Ship", 1.0))
        .unwrap();
    let tasks = task_service(&conn);
    let mut draft = TaskDraft::titled("Write changelog");
    draft.goal_id = Some(goal.id);
    let task = tasks.create_task(section_id, draft).unwrap();

    goal_service(&conn).delete_goal(goal.id).unwrap();

    let kept = tasks.get_task(task.id).unwrap().unwrap();
    assert_eq!(kept.goal_id, None);
}

#[test]
fn task_defaults_and_goal_section_check() {
    let conn = open_db_in_memory().unwrap();
    let (_, build, launch) = project_with_sections(&conn);
    let goal = goal_service(&conn)
        .create_goal(build, GoalDraft::new("Ship", 1.0))
        .unwrap();
    let tasks = task_service(&conn);

    let mut draft = TaskDraft::titled("  Set up CI  ");
    draft.kind = Some("devops".to_string());
    let task = tasks.create_task(build, draft).unwrap();
    assert_eq!(task.title, "Set up CI");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.tags, vec!["devops".to_string()]);
    assert_eq!(task.estimated_hours, 2.0);
    assert_eq!(task.due_date, Some(task.created_at + Duration::days(2)));

    let stored = tasks.get_task(task.id).unwrap().unwrap();
    assert_eq!(stored, task);

    let mut wrong = TaskDraft::titled("Misfiled");
    wrong.goal_id = Some(goal.id);
    let err = tasks.create_task(launch, wrong).unwrap_err();
    assert!(matches!(err, TaskServiceError::GoalSectionMismatch { .. }));
}

#[test]
fn quick_capture_uses_first_section_and_toggle_flips_status() {
    let conn = open_db_in_memory().unwrap();
    let (project_id, first, _) = project_with_sections(&conn);
    let tasks = task_service(&conn);

    let captured = tasks.quick_capture(project_id, "Call designer").unwrap();
    assert_eq!(captured.section_id, first);
    assert_eq!(captured.priority, 2);

    assert_eq!(tasks.toggle_done(captured.id).unwrap().status, TaskStatus::Done);
    assert_eq!(tasks.toggle_done(captured.id).unwrap().status, TaskStatus::Todo);
    let reviewing = tasks.set_status(captured.id, TaskStatus::Review).unwrap();
    assert_eq!(reviewing.status, TaskStatus::Review);

    let empty = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap())
        .create_project(ProjectDraft::titled("Empty"))
        .unwrap();
    let err = tasks.quick_capture(empty.id, "Nowhere").unwrap_err();
    assert!(matches!(err, TaskServiceError::NoSection(id) if id == empty.id));
}

#[test]
fn task_listing_respects_scope() {
    let conn = open_db_in_memory().unwrap();
    let (project_id, build, launch) = project_with_sections(&conn);
    let tasks = task_service(&conn);
    tasks.create_task(build, TaskDraft::titled("a")).unwrap();
    tasks.create_task(launch, TaskDraft::titled("b")).unwrap();

    assert_eq!(tasks.list_tasks(ListScope::All).unwrap().len(), 2);
    assert_eq!(tasks.list_tasks(ListScope::Project(project_id)).unwrap().len(), 2);
    let in_launch = tasks.list_tasks(ListScope::Section(launch)).unwrap();
    assert_eq!(in_launch.len(), 1);
    assert_eq!(in_launch[0].title, "b");
}

#[test]
fn notes_tags_pinning_and_search() {
    let conn = open_db_in_memory().unwrap();
    let (_, build, launch) = project_with_sections(&conn);
    let notes = note_service(&conn);

    let sketch = notes
        .create_note(build, "API sketch", "endpoints and **auth**", "Backend, api")
        .unwrap();
    let copy = notes
        .create_note(launch, "Press kit", "logo files", "")
        .unwrap();
    assert_eq!(sketch.tags, vec!["api".to_string(), "backend".to_string()]);

    let pinned = notes.toggle_pin(copy.id).unwrap();
    assert!(pinned.is_pinned);
    let split = split_pinned(notes.list_notes(ListScope::All).unwrap());
    assert_eq!(split.pinned.len(), 1);
    assert_eq!(split.pinned[0].id, copy.id);
    assert_eq!(split.others.len(), 1);

    let retagged = notes
        .set_note_tags(sketch.id, &["launch".to_string(), "API".to_string()])
        .unwrap();
    assert_eq!(retagged.tags, vec!["api".to_string(), "launch".to_string()]);
    assert_eq!(
        notes.list_tags().unwrap(),
        vec!["api".to_string(), "backend".to_string(), "launch".to_string()]
    );

    assert_eq!(notes.search_notes(ListScope::All, "AUTH").unwrap().len(), 1);
    assert_eq!(notes.search_notes(ListScope::All, "launch").unwrap().len(), 1);
    assert!(notes
        .search_notes(ListScope::Section(launch), "auth")
        .unwrap()
        .is_empty());

    let edited = notes
        .update_note(sketch.id, Some("API v2"), None)
        .unwrap();
    assert_eq!(edited.title, "API v2");
    assert_eq!(edited.content, "endpoints and **auth**");

    notes.delete_note(sketch.id).unwrap();
    assert!(notes.get_note(sketch.id).unwrap().is_none());
    let err = notes.toggle_pin(sketch.id).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(_)));
}

#[test]
fn dashboard_counts_open_work_and_overdue_items() {
    let conn = open_db_in_memory().unwrap();
    let (_, build, _) = project_with_sections(&conn);
    let tasks = task_service(&conn);
    let past = Utc::now() - Duration::days(3);

    let mut late = TaskDraft::titled("Late");
    late.due_date = Some(past);
    tasks.create_task(build, late).unwrap();
    let done = tasks.create_task(build, TaskDraft::titled("Done")).unwrap();
    tasks.toggle_done(done.id).unwrap();

    let mut late_goal = GoalDraft::new("Late goal", 1.0);
    late_goal.deadline = Some(past);
    goal_service(&conn).create_goal(build, late_goal).unwrap();

    let archived = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let old = archived
        .create_project(ProjectDraft::titled("Old"))
        .unwrap();
    archived.set_archived(old.id, true).unwrap();

    let stats = StatsService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteSectionRepository::try_new(&conn).unwrap(),
        SqliteGoalRepository::try_new(&conn).unwrap(),
        SqliteTaskRepository::try_new(&conn).unwrap(),
    )
    .dashboard(Utc::now())
    .unwrap();

    assert_eq!(stats.projects, 1);
    assert_eq!(stats.sections, 2);
    assert_eq!(stats.tasks, 2);
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.task_completion, 50);
    assert_eq!(stats.overdue_tasks, 1);
    assert_eq!(stats.overdue_goals, 1);
    assert_eq!(stats.goal_completion, 0);
}

#[test]
fn focus_sessions_are_recorded_and_counted() {
    let conn = open_db_in_memory().unwrap();
    let (project_id, _, _) = project_with_sections(&conn);
    let focus = FocusService::new(SqliteFocusSessionRepository::try_new(&conn).unwrap());
    let before = Utc::now() - Duration::minutes(1);

    let mut record = SessionRecord::new(FocusMode::Pomodoro, true, 4);
    record.project_id = Some(project_id);
    record.notes = "  deep in the parser  ".to_string();
    let session = focus.record_session(record).unwrap();
    assert_eq!(session.duration_minutes, 25);
    assert_eq!(session.notes, "deep in the parser");
    assert!(!session.interrupted);

    focus
        .record_session(SessionRecord::new(FocusMode::ShortBreak, false, 2))
        .unwrap();

    assert_eq!(focus.history(None).unwrap().len(), 2);
    assert_eq!(focus.history(Some(project_id)).unwrap().len(), 1);
    assert_eq!(focus.completed_since(before).unwrap(), 1);

    let err = focus
        .record_session(SessionRecord::new(FocusMode::DeepWork, true, 9))
        .unwrap_err();
    assert!(matches!(err, jayamesh_core::RepoError::Validation(_)));
}
