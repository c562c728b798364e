//! Task record: actionable work item inside a section, optionally tied to a
//! goal of the same section.

use super::goal::GoalId;
use super::project::ProjectId;
use super::section::SectionId;
use super::{
    ensure_id, ensure_non_negative, ensure_not_blank, ensure_priority, timestamp_now,
    ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

pub const DEFAULT_TASK_TYPE: &str = "feature";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Board column order.
    pub const ALL: [TaskStatus; 4] = [Self::Todo, Self::InProgress, Self::Review, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub section_id: SectionId,
    #[serde(default)]
    pub goal_id: Option<GoalId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    /// Free-form kind label (`feature`, `bug`, `content`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: u8,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub actual_hours: f64,
    #[serde(default, deserialize_with = "tags_from_string_or_list")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(project_id: ProjectId, section_id: SectionId, title: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            section_id,
            goal_id: None,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            kind: DEFAULT_TASK_TYPE.to_string(),
            priority: 2,
            recurring: false,
            due_date: None,
            estimated_hours: 0.0,
            actual_hours: 0.0,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_done() && self.due_date.is_some_and(|due| due < now)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id(&self.id)?;
        ensure_id(&self.project_id)?;
        ensure_id(&self.section_id)?;
        if let Some(goal_id) = &self.goal_id {
            ensure_id(goal_id)?;
        }
        ensure_not_blank("task title", &self.title)?;
        ensure_not_blank("task type", &self.kind)?;
        ensure_priority(self.priority)?;
        ensure_non_negative("estimated hours", self.estimated_hours)?;
        ensure_non_negative("actual hours", self.actual_hours)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    One(String),
    Many(Vec<String>),
}

/// Accepts `"bug"` as well as `["bug", "ui"]`. The single-string form only
/// shows up in hand-edited documents.
fn tags_from_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<TagsRepr>::deserialize(deserializer)?;
    Ok(match repr {
        None => Vec::new(),
        Some(TagsRepr::One(tag)) if tag.trim().is_empty() => Vec::new(),
        Some(TagsRepr::One(tag)) => vec![tag],
        Some(TagsRepr::Many(tags)) => tags,
    })
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskStatus};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[test]
    fn status_serializes_with_dashes() {
        let json = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(json, "in-progress");
    }

    #[test]
    fn overdue_ignores_done_tasks() {
        let now = Utc::now();
        let mut task = Task::new(Uuid::new_v4(), Uuid::new_v4(), "fix physics");
        task.due_date = Some(now - Duration::days(1));
        assert!(task.is_overdue(now));

        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn tags_accept_single_string() {
        let task = Task::new(Uuid::new_v4(), Uuid::new_v4(), "reel");
        let mut value = serde_json::to_value(&task).unwrap();
        value["tags"] = serde_json::json!("content");

        let decoded: Task = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.tags, vec!["content".to_string()]);
    }
}
