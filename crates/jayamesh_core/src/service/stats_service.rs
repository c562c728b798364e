//! Dashboard statistics across the whole store.

use crate::model::goal::{Goal, GoalStatus};
use crate::model::task::Task;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::section_repo::SectionRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::{ListScope, RepoResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Totals shown on the overview header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Unarchived projects.
    pub projects: usize,
    pub sections: usize,
    pub goals: usize,
    pub completed_goals: usize,
    pub tasks: usize,
    pub completed_tasks: usize,
    /// Rounded percentage, 0 when there are no goals.
    pub goal_completion: u8,
    /// Rounded percentage, 0 when there are no tasks.
    pub task_completion: u8,
    pub overdue_tasks: usize,
    pub overdue_goals: usize,
}

/// Rounded `part / total` in percent; 0 for an empty total.
pub fn completion_percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (part as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Computes stats from already loaded records.
pub fn summarize(
    projects: usize,
    sections: usize,
    goals: &[Goal],
    tasks: &[Task],
    now: DateTime<Utc>,
) -> DashboardStats {
    let completed_goals = goals
        .iter()
        .filter(|goal| goal.status == GoalStatus::Completed)
        .count();
    let completed_tasks = tasks.iter().filter(|task| task.is_done()).count();

    DashboardStats {
        projects,
        sections,
        goals: goals.len(),
        completed_goals,
        tasks: tasks.len(),
        completed_tasks,
        goal_completion: completion_percent(completed_goals, goals.len()),
        task_completion: completion_percent(completed_tasks, tasks.len()),
        overdue_tasks: tasks.iter().filter(|task| task.is_overdue(now)).count(),
        overdue_goals: goals.iter().filter(|goal| goal.is_overdue(now)).count(),
    }
}

pub struct StatsService<P, S, G, T>
where
    P: ProjectRepository,
    S: SectionRepository,
    G: GoalRepository,
    T: TaskRepository,
{
    projects: P,
    sections: S,
    goals: G,
    tasks: T,
}

impl<P, S, G, T> StatsService<P, S, G, T>
where
    P: ProjectRepository,
    S: SectionRepository,
    G: GoalRepository,
    T: TaskRepository,
{
    pub fn new(projects: P, sections: S, goals: G, tasks: T) -> Self {
        Self {
            projects,
            sections,
            goals,
            tasks,
        }
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> RepoResult<DashboardStats> {
        let projects = self.projects.list_projects(false)?.len();
        let sections = self.sections.list_sections(None)?.len();
        let goals = self.goals.list_goals(ListScope::All)?;
        let tasks = self.tasks.list_tasks(ListScope::All)?;
        Ok(summarize(projects, sections, &goals, &tasks, now))
    }
}

#[cfg(test)]
mod tests {
    use super::{completion_percent, summarize};
    use crate::model::goal::Goal;
    use crate::model::task::{Task, TaskStatus};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[test]
    fn completion_rounds_and_handles_empty() {
        assert_eq!(completion_percent(0, 0), 0);
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(1, 2), 50);
    }

    #[test]
    fn overdue_counts_exclude_finished_work() {
        let now = Utc::now();
        let project = Uuid::new_v4();
        let section = Uuid::new_v4();

        let mut late = Task::new(project, section, "late");
        late.due_date = Some(now - Duration::hours(1));
        let mut late_done = late.clone();
        late_done.id = Uuid::new_v4();
        late_done.status = TaskStatus::Done;

        let mut goal = Goal::new(project, section, "g", 2.0);
        goal.deadline = Some(now - Duration::days(1));
        let mut finished = Goal::new(project, section, "f", 1.0);
        finished.deadline = goal.deadline;
        finished.apply_progress(1.0);

        let stats = summarize(1, 1, &[goal, finished], &[late, late_done], now);
        assert_eq!(stats.overdue_tasks, 1);
        assert_eq!(stats.overdue_goals, 1);
        assert_eq!(stats.task_completion, 50);
        assert_eq!(stats.goal_completion, 50);
    }
}
