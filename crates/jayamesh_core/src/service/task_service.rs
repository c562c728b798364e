//! Task use-case service.
//!
//! # Responsibility
//! - Create tasks under sections with creation defaults.
//! - Quick capture into a project's first section.
//! - Status transitions and board grouping.
//!
//! # Invariants
//! - A task belongs to the project of its section.
//! - A linked goal must live in the same section as the task.

use crate::model::goal::GoalId;
use crate::model::project::ProjectId;
use crate::model::section::SectionId;
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::model::{timestamp_now, ValidationError};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::section_repo::SectionRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::{ListScope, RepoError};
use chrono::{DateTime, Duration, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Days until the due date of a task created without one.
pub const DEFAULT_TASK_DUE_DAYS: i64 = 2;
pub const DEFAULT_ESTIMATED_HOURS: f64 = 2.0;
/// Priority given to quick-captured tasks.
pub const QUICK_CAPTURE_PRIORITY: u8 = 2;

#[derive(Debug)]
pub enum TaskServiceError {
    SectionNotFound(SectionId),
    TaskNotFound(TaskId),
    GoalNotFound(GoalId),
    /// Goal exists but lives in another section.
    GoalSectionMismatch { goal_id: GoalId, section_id: SectionId },
    /// Quick capture target project has no section yet.
    NoSection(ProjectId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::GoalSectionMismatch {
                goal_id,
                section_id,
            } => write!(f, "goal {goal_id} is not part of section {section_id}"),
            Self::NoSection(id) => write!(f, "project {id} has no section to capture into"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::TaskNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Creation input for a task. Unset fields take the task defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub kind: Option<String>,
    pub priority: Option<u8>,
    pub goal_id: Option<GoalId>,
    pub recurring: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            kind: None,
            priority: None,
            goal_id: None,
            recurring: false,
            due_date: None,
            estimated_hours: None,
        }
    }
}

/// One board column.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

pub struct TaskService<S: SectionRepository, G: GoalRepository, T: TaskRepository> {
    sections: S,
    goals: G,
    tasks: T,
}

impl<S: SectionRepository, G: GoalRepository, T: TaskRepository> TaskService<S, G, T> {
    pub fn new(sections: S, goals: G, tasks: T) -> Self {
        Self {
            sections,
            goals,
            tasks,
        }
    }

    /// Creates a `todo` task in a section. Tags are set to `[kind]`.
    pub fn create_task(
        &self,
        section_id: SectionId,
        draft: TaskDraft,
    ) -> Result<Task, TaskServiceError> {
        let section = self
            .sections
            .get_section(section_id)?
            .ok_or(TaskServiceError::SectionNotFound(section_id))?;

        if let Some(goal_id) = draft.goal_id {
            let goal = self
                .goals
                .get_goal(goal_id)?
                .ok_or(TaskServiceError::GoalNotFound(goal_id))?;
            if goal.section_id != section.id {
                return Err(TaskServiceError::GoalSectionMismatch {
                    goal_id,
                    section_id: section.id,
                });
            }
        }

        let mut task = Task::new(section.project_id, section.id, draft.title.trim());
        task.goal_id = draft.goal_id;
        task.description = draft.description;
        if let Some(kind) = draft.kind {
            task.kind = kind;
        }
        if let Some(priority) = draft.priority {
            task.priority = priority;
        }
        task.recurring = draft.recurring;
        task.due_date = Some(
            draft
                .due_date
                .unwrap_or_else(|| task.created_at + Duration::days(DEFAULT_TASK_DUE_DAYS)),
        );
        task.estimated_hours = draft.estimated_hours.unwrap_or(DEFAULT_ESTIMATED_HOURS);
        task.tags = vec![task.kind.clone()];

        self.tasks.create_task(&task)?;
        Ok(task)
    }

    /// Captures a bare task into the project's first section.
    pub fn quick_capture(
        &self,
        project_id: ProjectId,
        title: &str,
    ) -> Result<Task, TaskServiceError> {
        let first = self
            .sections
            .list_sections(Some(project_id))?
            .into_iter()
            .next()
            .ok_or(TaskServiceError::NoSection(project_id))?;

        let mut task = Task::new(project_id, first.id, title.trim());
        task.priority = QUICK_CAPTURE_PRIORITY;
        self.tasks.create_task(&task)?;
        Ok(task)
    }

    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, TaskServiceError> {
        let mut task = self.require(id)?;
        task.status = status;
        task.updated_at = timestamp_now();
        self.tasks.update_task(&task)?;
        Ok(task)
    }

    /// Flips between `done` and `todo`.
    pub fn toggle_done(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        let status = if self.require(id)?.is_done() {
            TaskStatus::Todo
        } else {
            TaskStatus::Done
        };
        self.set_status(id, status)
    }

    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.tasks.get_task(id)?)
    }

    pub fn list_tasks(&self, scope: ListScope) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.tasks.list_tasks(scope)?)
    }

    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.tasks.delete_task(id)?;
        Ok(())
    }

    fn require(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.tasks
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}

/// Groups tasks into board columns in [`TaskStatus::ALL`] order, keeping the
/// input order inside each column. Empty columns are included.
pub fn group_by_status(tasks: Vec<Task>) -> Vec<TaskColumn> {
    let mut columns: Vec<TaskColumn> = TaskStatus::ALL
        .iter()
        .map(|status| TaskColumn {
            status: *status,
            tasks: Vec::new(),
        })
        .collect();
    for task in tasks {
        if let Some(column) = columns.iter_mut().find(|column| column.status == task.status) {
            column.tasks.push(task);
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::group_by_status;
    use crate::model::task::{Task, TaskStatus};
    use uuid::Uuid;

    #[test]
    fn grouping_keeps_column_order_and_empty_columns() {
        let project = Uuid::new_v4();
        let section = Uuid::new_v4();
        let mut done = Task::new(project, section, "ship");
        done.status = TaskStatus::Done;
        let todo = Task::new(project, section, "plan");

        let columns = group_by_status(vec![done, todo]);
        let statuses: Vec<TaskStatus> = columns.iter().map(|column| column.status).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());
        assert_eq!(columns[0].tasks[0].title, "plan");
        assert!(columns[1].tasks.is_empty());
        assert_eq!(columns[3].tasks[0].title, "ship");
    }
}
