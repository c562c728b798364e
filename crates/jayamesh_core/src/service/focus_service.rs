//! Focus session recording and history.

use crate::model::focus::{FocusMode, FocusSession};
use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::repo::focus_repo::FocusSessionRepository;
use crate::repo::RepoResult;
use chrono::{DateTime, Utc};

/// Input for one finished timer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub mode: FocusMode,
    pub completed: bool,
    /// Self-assessed focus, 1..=5.
    pub focus_level: u8,
    pub project_id: Option<ProjectId>,
    pub task_id: Option<TaskId>,
    pub notes: String,
}

impl SessionRecord {
    pub fn new(mode: FocusMode, completed: bool, focus_level: u8) -> Self {
        Self {
            mode,
            completed,
            focus_level,
            project_id: None,
            task_id: None,
            notes: String::new(),
        }
    }
}

pub struct FocusService<R: FocusSessionRepository> {
    repo: R,
}

impl<R: FocusSessionRepository> FocusService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a session that ended now and lasted the mode's preset.
    pub fn record_session(&self, record: SessionRecord) -> RepoResult<FocusSession> {
        let mut session = FocusSession::finished(record.mode, record.completed, record.focus_level);
        session.project_id = record.project_id;
        session.task_id = record.task_id;
        session.notes = record.notes.trim().to_string();
        self.repo.create_session(&session)?;
        Ok(session)
    }

    pub fn history(&self, project_id: Option<ProjectId>) -> RepoResult<Vec<FocusSession>> {
        self.repo.list_sessions(project_id)
    }

    /// Completed sessions that ended at or after `since`.
    pub fn completed_since(&self, since: DateTime<Utc>) -> RepoResult<u64> {
        self.repo.count_completed_since(since)
    }
}
