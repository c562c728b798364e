//! Goal use-case service.
//!
//! # Invariants
//! - A goal belongs to the project of the section it is created in.
//! - Progress updates clamp `current` into `[0, target]` and derive status
//!   from the requested value.

use crate::model::goal::{Goal, GoalId};
use crate::model::section::SectionId;
use crate::model::{timestamp_now, ValidationError};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::section_repo::SectionRepository;
use crate::repo::{ListScope, RepoError};
use chrono::{DateTime, Duration, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Days until the deadline of a goal created without one.
pub const DEFAULT_GOAL_DEADLINE_DAYS: i64 = 7;

#[derive(Debug)]
pub enum GoalServiceError {
    SectionNotFound(SectionId),
    GoalNotFound(GoalId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for GoalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GoalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GoalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::GoalNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Creation input for a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub title: String,
    pub target: f64,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<u8>,
}

impl GoalDraft {
    pub fn new(title: impl Into<String>, target: f64) -> Self {
        Self {
            title: title.into(),
            target,
            deadline: None,
            priority: None,
        }
    }
}

pub struct GoalService<S: SectionRepository, G: GoalRepository> {
    sections: S,
    goals: G,
}

impl<S: SectionRepository, G: GoalRepository> GoalService<S, G> {
    pub fn new(sections: S, goals: G) -> Self {
        Self { sections, goals }
    }

    /// Creates a not-started goal in a section. The deadline defaults to
    /// one week from now.
    pub fn create_goal(
        &self,
        section_id: SectionId,
        draft: GoalDraft,
    ) -> Result<Goal, GoalServiceError> {
        let section = self
            .sections
            .get_section(section_id)?
            .ok_or(GoalServiceError::SectionNotFound(section_id))?;

        let mut goal = Goal::new(section.project_id, section.id, draft.title.trim(), draft.target);
        goal.deadline = Some(
            draft
                .deadline
                .unwrap_or_else(|| goal.created_at + Duration::days(DEFAULT_GOAL_DEADLINE_DAYS)),
        );
        if let Some(priority) = draft.priority {
            goal.priority = priority;
        }
        self.goals.create_goal(&goal)?;
        Ok(goal)
    }

    /// Records progress on a goal.
    pub fn update_progress(&self, id: GoalId, requested: f64) -> Result<Goal, GoalServiceError> {
        let mut goal = self.require(id)?;
        goal.apply_progress(requested);
        goal.updated_at = timestamp_now();
        self.goals.update_goal(&goal)?;
        Ok(goal)
    }

    pub fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, GoalServiceError> {
        Ok(self.goals.get_goal(id)?)
    }

    pub fn list_goals(&self, scope: ListScope) -> Result<Vec<Goal>, GoalServiceError> {
        Ok(self.goals.list_goals(scope)?)
    }

    /// Deletes a goal; its tasks are kept without a goal link.
    pub fn delete_goal(&self, id: GoalId) -> Result<(), GoalServiceError> {
        self.goals.delete_goal(id)?;
        Ok(())
    }

    fn require(&self, id: GoalId) -> Result<Goal, GoalServiceError> {
        self.goals
            .get_goal(id)?
            .ok_or(GoalServiceError::GoalNotFound(id))
    }
}
