//! Whole-store backup, restore and maintenance operations.
//!
//! # Responsibility
//! - Export every collection into one JSON document.
//! - Import a document by replacing the store contents.
//! - Clear, reset and describe the store.
//!
//! # Invariants
//! - Import, clear and reset are all-or-nothing: on any failure the store is
//!   left exactly as it was.
//! - Any problem with the imported document surfaces as `InvalidFormat`.
//! - Record ids are preserved across export and import.

use crate::db::migrations::{current_user_version, list_user_tables, reset_schema};
use crate::db::DbError;
use crate::model::focus::FocusSession;
use crate::model::goal::Goal;
use crate::model::note::Note;
use crate::model::project::{Project, ProjectId};
use crate::model::section::{Section, SectionId};
use crate::model::task::Task;
use crate::repo::focus_repo::{FocusSessionRepository, SqliteFocusSessionRepository};
use crate::repo::goal_repo::{GoalRepository, SqliteGoalRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::section_repo::{SectionRepository, SqliteSectionRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::{count_rows, run_in_transaction, ListScope, RepoError, RepoResult};
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Tables cleared by [`clear_all`], children before parents.
const CLEAR_ORDER: [&str; 8] = [
    "note_tags",
    "tags",
    "notes",
    "focus_sessions",
    "tasks",
    "goals",
    "sections",
    "projects",
];

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug)]
pub enum TransferError {
    Io(std::io::Error),
    /// The document could not be parsed or its records could not be stored.
    InvalidFormat(String),
    Encode(serde_json::Error),
    Repo(RepoError),
    Db(DbError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidFormat(details) => write!(f, "invalid file format: {details}"),
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidFormat(_) => None,
            Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for TransferError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TransferError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Backup document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub projects: Vec<Project>,
    pub sections: Vec<Section>,
    pub goals: Vec<Goal>,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub focus_sessions: Vec<FocusSession>,
    pub export_date: DateTime<Utc>,
}

/// Row counts per collection plus the schema version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub schema_version: u32,
    pub projects: u64,
    pub sections: u64,
    pub goals: u64,
    pub tasks: u64,
    pub notes: u64,
    pub tags: u64,
    pub focus_sessions: u64,
}

/// `jayamesh-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("jayamesh-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Reads every collection into an export document stamped with `now`.
pub fn export_document(conn: &Connection, now: DateTime<Utc>) -> RepoResult<ExportDocument> {
    let projects = SqliteProjectRepository::try_new(conn)?.list_projects(true)?;
    let sections = SqliteSectionRepository::try_new(conn)?.list_sections(None)?;
    let goals = SqliteGoalRepository::try_new(conn)?.list_goals(ListScope::All)?;
    let tasks = SqliteTaskRepository::try_new(conn)?.list_tasks(ListScope::All)?;
    let notes = SqliteNoteRepository::try_new(conn)?.list_notes(ListScope::All)?;
    let focus_sessions = SqliteFocusSessionRepository::try_new(conn)?.list_sessions(None)?;

    Ok(ExportDocument {
        projects,
        sections,
        goals,
        tasks,
        notes,
        focus_sessions,
        export_date: now,
    })
}

/// Serializes the store as pretty JSON.
pub fn export_json(conn: &Connection, now: DateTime<Utc>) -> TransferResult<String> {
    let document = export_document(conn, now)?;
    serde_json::to_string_pretty(&document).map_err(TransferError::Encode)
}

/// Writes the export to `path`, returning the document that was written.
pub fn export_to_file(
    conn: &Connection,
    path: &Path,
    now: DateTime<Utc>,
) -> TransferResult<ExportDocument> {
    let document = export_document(conn, now)?;
    let json = serde_json::to_string_pretty(&document).map_err(TransferError::Encode)?;
    fs::write(path, json)?;
    info!(
        "event=data_export module=transfer status=ok projects={} tasks={} notes={}",
        document.projects.len(),
        document.tasks.len(),
        document.notes.len()
    );
    Ok(document)
}

/// Parses a backup document without touching storage.
pub fn parse_document(json: &str) -> TransferResult<ExportDocument> {
    serde_json::from_str(json).map_err(|err| TransferError::InvalidFormat(err.to_string()))
}

/// Replaces the whole store with the contents of `json`.
pub fn import_json(conn: &mut Connection, json: &str) -> TransferResult<StoreInfo> {
    let document = match parse_document(json) {
        Ok(document) => document,
        Err(err) => {
            error!("event=data_import module=transfer status=error stage=parse error={err}");
            return Err(err);
        }
    };

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    clear_tables(&tx)?;
    if let Err(err) = insert_document(&tx, &document) {
        error!("event=data_import module=transfer status=error stage=insert error={err}");
        return Err(TransferError::InvalidFormat(err.to_string()));
    }
    tx.commit()?;

    let info = store_info(conn)?;
    info!(
        "event=data_import module=transfer status=ok projects={} sections={} goals={} tasks={} notes={} focus_sessions={}",
        info.projects, info.sections, info.goals, info.tasks, info.notes, info.focus_sessions
    );
    Ok(info)
}

/// Reads and imports a backup file.
pub fn import_file(conn: &mut Connection, path: &Path) -> TransferResult<StoreInfo> {
    let json = fs::read_to_string(path)?;
    import_json(conn, &json)
}

/// Deletes every row of every collection, keeping the schema.
pub fn clear_all(conn: &Connection) -> RepoResult<()> {
    run_in_transaction(conn, clear_tables)?;
    info!("event=data_clear module=transfer status=ok");
    Ok(())
}

/// Drops and recreates the schema, then reinserts the sample dataset.
pub fn reset_store(conn: &mut Connection) -> TransferResult<StoreInfo> {
    let tables = list_user_tables(conn)?;
    reset_schema(conn, &tables)?;
    let info = store_info(conn)?;
    info!(
        "event=data_reset module=transfer status=ok projects={} goals={} tasks={}",
        info.projects, info.goals, info.tasks
    );
    Ok(info)
}

pub fn store_info(conn: &Connection) -> TransferResult<StoreInfo> {
    Ok(StoreInfo {
        schema_version: current_user_version(conn)?,
        projects: count_rows(conn, "projects")?,
        sections: count_rows(conn, "sections")?,
        goals: count_rows(conn, "goals")?,
        tasks: count_rows(conn, "tasks")?,
        notes: count_rows(conn, "notes")?,
        tags: count_rows(conn, "tags")?,
        focus_sessions: count_rows(conn, "focus_sessions")?,
    })
}

fn clear_tables(conn: &Connection) -> RepoResult<()> {
    for table in CLEAR_ORDER {
        conn.execute(&format!("DELETE FROM {table};"), [])?;
    }
    Ok(())
}

fn insert_document(conn: &Connection, document: &ExportDocument) -> RepoResult<()> {
    let projects = SqliteProjectRepository::try_new(conn)?;
    for project in &document.projects {
        projects.create_project(project)?;
    }
    let sections = SqliteSectionRepository::try_new(conn)?;
    let mut section_projects = HashMap::new();
    for section in &document.sections {
        sections.create_section(section)?;
        section_projects.insert(section.id, section.project_id);
    }
    let goals = SqliteGoalRepository::try_new(conn)?;
    let mut goal_sections = HashMap::new();
    for goal in &document.goals {
        ensure_owned_by(&section_projects, "goal", goal.id, goal.section_id, goal.project_id)?;
        goals.create_goal(goal)?;
        goal_sections.insert(goal.id, goal.section_id);
    }
    let tasks = SqliteTaskRepository::try_new(conn)?;
    for task in &document.tasks {
        ensure_owned_by(&section_projects, "task", task.id, task.section_id, task.project_id)?;
        if let Some(goal_id) = task.goal_id {
            if goal_sections.get(&goal_id) != Some(&task.section_id) {
                return Err(RepoError::InvalidData(format!(
                    "task {} links goal {goal_id} outside section {}",
                    task.id, task.section_id
                )));
            }
        }
        tasks.create_task(task)?;
    }
    let notes = SqliteNoteRepository::try_new(conn)?;
    for note in &document.notes {
        ensure_owned_by(&section_projects, "note", note.id, note.section_id, note.project_id)?;
        notes.create_note(note)?;
    }
    let sessions = SqliteFocusSessionRepository::try_new(conn)?;
    for session in &document.focus_sessions {
        sessions.create_session(session)?;
    }
    Ok(())
}

/// A record's project must be the project of the section it names.
fn ensure_owned_by(
    section_projects: &HashMap<SectionId, ProjectId>,
    entity: &str,
    id: Uuid,
    section_id: SectionId,
    project_id: ProjectId,
) -> RepoResult<()> {
    match section_projects.get(&section_id) {
        Some(owner) if *owner == project_id => Ok(()),
        Some(owner) => Err(RepoError::InvalidData(format!(
            "{entity} {id} names project {project_id} but section {section_id} belongs to {owner}"
        ))),
        None => Err(RepoError::InvalidData(format!(
            "{entity} {id} references unknown section {section_id}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{backup_file_name, parse_document, TransferError};
    use chrono::NaiveDate;

    #[test]
    fn backup_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(backup_file_name(date), "jayamesh-backup-2024-03-09.json");
    }

    #[test]
    fn notes_and_sessions_are_optional() {
        let json = r#"{
            "projects": [],
            "sections": [],
            "goals": [],
            "tasks": [],
            "exportDate": "2024-03-09T10:00:00Z"
        }"#;
        let document = parse_document(json).unwrap();
        assert!(document.notes.is_empty());
        assert!(document.focus_sessions.is_empty());
    }

    #[test]
    fn malformed_json_is_invalid_format() {
        assert!(matches!(
            parse_document("{not json"),
            Err(TransferError::InvalidFormat(_))
        ));
    }
}
