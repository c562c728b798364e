//! Focus session history repository.

use crate::model::focus::{FocusMode, FocusSession, FocusSessionId};
use crate::model::project::ProjectId;
use crate::repo::{
    bool_to_int, ensure_connection_ready, from_epoch_ms, parse_bool, parse_optional_uuid,
    parse_small_int, parse_uuid, to_epoch_ms, RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

const SESSION_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    task_id,
    mode,
    duration_minutes,
    completed,
    interrupted,
    notes,
    focus_level,
    started_at,
    ended_at
FROM focus_sessions";

/// Repository interface for recorded focus sessions.
pub trait FocusSessionRepository {
    fn create_session(&self, session: &FocusSession) -> RepoResult<FocusSessionId>;
    /// Lists sessions, newest first, optionally restricted to one project.
    fn list_sessions(&self, project_id: Option<ProjectId>) -> RepoResult<Vec<FocusSession>>;
    /// Counts completed sessions that ended at or after `since`.
    fn count_completed_since(&self, since: DateTime<Utc>) -> RepoResult<u64>;
}

/// SQLite-backed focus session repository.
pub struct SqliteFocusSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFocusSessionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl FocusSessionRepository for SqliteFocusSessionRepository<'_> {
    fn create_session(&self, session: &FocusSession) -> RepoResult<FocusSessionId> {
        session.validate()?;
        self.conn.execute(
            "INSERT INTO focus_sessions (
                id, project_id, task_id, mode, duration_minutes, completed,
                interrupted, notes, focus_level, started_at, ended_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                session.id.to_string(),
                session.project_id.map(|id| id.to_string()),
                session.task_id.map(|id| id.to_string()),
                session.mode.as_str(),
                i64::from(session.duration_minutes),
                bool_to_int(session.completed),
                bool_to_int(session.interrupted),
                session.notes,
                i64::from(session.focus_level),
                to_epoch_ms(session.start_time),
                to_epoch_ms(session.end_time),
            ],
        )?;
        Ok(session.id)
    }

    fn list_sessions(&self, project_id: Option<ProjectId>) -> RepoResult<Vec<FocusSession>> {
        let mut sessions = Vec::new();
        let order = "ORDER BY ended_at DESC, id ASC";
        match project_id {
            Some(project_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{SESSION_SELECT_SQL} WHERE project_id = ?1 {order};"
                ))?;
                let mut rows = stmt.query([project_id.to_string()])?;
                while let Some(row) = rows.next()? {
                    sessions.push(session_from_row(row)?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{SESSION_SELECT_SQL} {order};"))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    sessions.push(session_from_row(row)?);
                }
            }
        }
        Ok(sessions)
    }

    fn count_completed_since(&self, since: DateTime<Utc>) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM focus_sessions
             WHERE completed = 1 AND ended_at >= ?1;",
            [to_epoch_ms(since)],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData("negative focus session count".to_string()))
    }
}

fn session_from_row(row: &Row<'_>) -> RepoResult<FocusSession> {
    let id_text: String = row.get("id")?;
    let mode_text: String = row.get("mode")?;
    let mode = FocusMode::parse(&mode_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid focus mode `{mode_text}`")))?;
    let duration: i64 = row.get("duration_minutes")?;

    Ok(FocusSession {
        id: parse_uuid(&id_text, "focus_sessions.id")?,
        project_id: parse_optional_uuid(row.get("project_id")?, "focus_sessions.project_id")?,
        task_id: parse_optional_uuid(row.get("task_id")?, "focus_sessions.task_id")?,
        mode,
        duration_minutes: u32::try_from(duration).map_err(|_| {
            RepoError::InvalidData(format!("invalid focus_sessions.duration_minutes `{duration}`"))
        })?,
        completed: parse_bool(row.get("completed")?, "focus_sessions.completed")?,
        interrupted: parse_bool(row.get("interrupted")?, "focus_sessions.interrupted")?,
        notes: row.get("notes")?,
        focus_level: parse_small_int(row.get("focus_level")?, "focus_sessions.focus_level")?,
        start_time: from_epoch_ms(row.get("started_at")?, "focus_sessions.started_at")?,
        end_time: from_epoch_ms(row.get("ended_at")?, "focus_sessions.ended_at")?,
    })
}
