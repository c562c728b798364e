//! Goal record: a measurable target inside a section.
//!
//! # Invariants
//! - `target` is strictly positive.
//! - `current <= target` is advisory only; progress updates clamp, imports
//!   and direct updates may carry any non-negative value.

use super::project::ProjectId;
use super::section::SectionId;
use super::{
    ensure_id, ensure_non_negative, ensure_not_blank, ensure_priority, timestamp_now,
    ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GoalId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not-started" => Some(Self::NotStarted),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Status implied by a requested progress value.
    pub fn for_progress(requested: f64, target: f64) -> Self {
        if requested >= target {
            Self::Completed
        } else if requested > 0.0 {
            Self::InProgress
        } else {
            Self::NotStarted
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub project_id: ProjectId,
    pub section_id: SectionId,
    pub title: String,
    pub target: f64,
    #[serde(default)]
    pub current: f64,
    pub deadline: Option<DateTime<Utc>>,
    pub status: GoalStatus,
    pub priority: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Creates a not-started goal with no progress.
    pub fn new(
        project_id: ProjectId,
        section_id: SectionId,
        title: impl Into<String>,
        target: f64,
    ) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            section_id,
            title: title.into(),
            target,
            current: 0.0,
            deadline: None,
            status: GoalStatus::NotStarted,
            priority: 2,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a progress update: clamps `current` into `[0, target]` and
    /// derives the status from the requested (unclamped) value.
    pub fn apply_progress(&mut self, requested: f64) {
        self.status = GoalStatus::for_progress(requested, self.target);
        self.current = requested.clamp(0.0, self.target);
    }

    /// Completion ratio in percent. Not capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        self.current / self.target * 100.0
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != GoalStatus::Completed && self.deadline.is_some_and(|deadline| deadline < now)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id(&self.id)?;
        ensure_id(&self.project_id)?;
        ensure_id(&self.section_id)?;
        ensure_not_blank("goal title", &self.title)?;
        if self.target.is_nan() || self.target <= 0.0 {
            return Err(ValidationError::NonPositiveTarget(self.target));
        }
        ensure_non_negative("goal current", self.current)?;
        ensure_priority(self.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::{Goal, GoalStatus};
    use uuid::Uuid;

    fn goal(target: f64) -> Goal {
        Goal::new(Uuid::new_v4(), Uuid::new_v4(), "ship", target)
    }

    #[test]
    fn progress_clamps_and_derives_status() {
        let mut goal = goal(10.0);

        goal.apply_progress(3.0);
        assert_eq!(goal.current, 3.0);
        assert_eq!(goal.status, GoalStatus::InProgress);

        goal.apply_progress(25.0);
        assert_eq!(goal.current, 10.0);
        assert_eq!(goal.status, GoalStatus::Completed);

        goal.apply_progress(-4.0);
        assert_eq!(goal.current, 0.0);
        assert_eq!(goal.status, GoalStatus::NotStarted);
    }

    #[test]
    fn progress_percent_handles_fractional_targets() {
        let mut goal = goal(1.0);
        goal.current = 0.5;
        assert_eq!(goal.progress_percent(), 50.0);
    }

    #[test]
    fn validate_rejects_zero_target() {
        assert!(goal(0.0).validate().is_err());
        assert!(goal(0.5).validate().is_ok());
    }
}
