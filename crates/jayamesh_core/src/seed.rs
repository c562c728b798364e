//! Sample dataset inserted into an empty store.
//!
//! # Invariants
//! - Seeding only runs while the projects table is empty.
//! - Goals and tasks are keyed by the section label without its icon;
//!   sections without an entry receive nothing.
//! - Every goal of a section receives that section's full task list.

use crate::model::goal::{Goal, GoalStatus};
use crate::model::project::{Project, ProjectStatus};
use crate::model::section::Section;
use crate::model::task::{Task, TaskStatus};
use crate::repo::goal_repo::{GoalRepository, SqliteGoalRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::section_repo::{SectionRepository, SqliteSectionRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::{count_rows, run_in_transaction, RepoResult};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::info;
use rusqlite::Connection;

struct SectionSeed {
    name: &'static str,
    kind: &'static str,
    color: &'static str,
}

struct GoalSeed {
    title: &'static str,
    target: f64,
    current: f64,
    deadline_days: i64,
    status: GoalStatus,
    priority: u8,
}

struct TaskSeed {
    title: &'static str,
    kind: &'static str,
    recurring: bool,
    priority: u8,
}

const SECTIONS: [SectionSeed; 5] = [
    SectionSeed {
        name: "🎯 Planning",
        kind: "planning",
        color: "#3b82f6",
    },
    SectionSeed {
        name: "💻 Development",
        kind: "development",
        color: "#10b981",
    },
    SectionSeed {
        name: "🎨 Design",
        kind: "design",
        color: "#8b5cf6",
    },
    SectionSeed {
        name: "📱 Marketing",
        kind: "marketing",
        color: "#ef4444",
    },
    SectionSeed {
        name: "📊 Analytics",
        kind: "analytics",
        color: "#f59e0b",
    },
];

const TASK_DUE_DAYS: i64 = 2;
const TASK_ESTIMATED_HOURS: f64 = 2.0;

/// Row counts written by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub projects: u64,
    pub sections: u64,
    pub goals: u64,
    pub tasks: u64,
}

fn goals_for(label: &str) -> &'static [GoalSeed] {
    const PLANNING: &[GoalSeed] = &[
        GoalSeed {
            title: "Complete Game Design Document",
            target: 1.0,
            current: 0.5,
            deadline_days: 7,
            status: GoalStatus::InProgress,
            priority: 1,
        },
        GoalSeed {
            title: "Finalize Monetization Strategy",
            target: 1.0,
            current: 0.2,
            deadline_days: 5,
            status: GoalStatus::NotStarted,
            priority: 2,
        },
    ];
    const DEVELOPMENT: &[GoalSeed] = &[
        GoalSeed {
            title: "Release MVP Version",
            target: 1.0,
            current: 0.8,
            deadline_days: 14,
            status: GoalStatus::InProgress,
            priority: 1,
        },
        GoalSeed {
            title: "Fix Critical Bugs",
            target: 10.0,
            current: 3.0,
            deadline_days: 3,
            status: GoalStatus::InProgress,
            priority: 1,
        },
    ];
    const MARKETING: &[GoalSeed] = &[
        GoalSeed {
            title: "Reach 1K Followers",
            target: 1000.0,
            current: 250.0,
            deadline_days: 30,
            status: GoalStatus::InProgress,
            priority: 2,
        },
        GoalSeed {
            title: "Get 500 Downloads",
            target: 500.0,
            current: 75.0,
            deadline_days: 45,
            status: GoalStatus::NotStarted,
            priority: 1,
        },
    ];

    match label {
        "Planning" => PLANNING,
        "Development" => DEVELOPMENT,
        "Marketing" => MARKETING,
        _ => &[],
    }
}

fn tasks_for(label: &str) -> &'static [TaskSeed] {
    const PLANNING: &[TaskSeed] = &[
        TaskSeed {
            title: "Research competitor games",
            kind: "research",
            recurring: false,
            priority: 2,
        },
        TaskSeed {
            title: "Define core gameplay loop",
            kind: "design",
            recurring: false,
            priority: 1,
        },
    ];
    const DEVELOPMENT: &[TaskSeed] = &[
        TaskSeed {
            title: "Fix ball movement physics",
            kind: "bug",
            recurring: false,
            priority: 1,
        },
        TaskSeed {
            title: "Add particle effects",
            kind: "feature",
            recurring: false,
            priority: 2,
        },
        TaskSeed {
            title: "Weekly code review",
            kind: "maintenance",
            recurring: true,
            priority: 3,
        },
    ];
    const MARKETING: &[TaskSeed] = &[
        TaskSeed {
            title: "Post daily Instagram reel",
            kind: "content",
            recurring: true,
            priority: 2,
        },
        TaskSeed {
            title: "Engage with 15 comments",
            kind: "engagement",
            recurring: true,
            priority: 3,
        },
        TaskSeed {
            title: "Reach out to 5 influencers",
            kind: "outreach",
            recurring: false,
            priority: 1,
        },
    ];

    match label {
        "Planning" => PLANNING,
        "Development" => DEVELOPMENT,
        "Marketing" => MARKETING,
        _ => &[],
    }
}

/// Seeds the sample dataset when no project exists yet.
///
/// Returns `true` when rows were inserted.
pub fn seed_if_empty(conn: &Connection) -> RepoResult<bool> {
    run_in_transaction(conn, |conn| {
        if count_rows(conn, "projects")? > 0 {
            info!("event=db_seed module=seed status=skipped reason=not_empty");
            return Ok(false);
        }
        insert_seed_data(conn, Utc::now())?;
        Ok(true)
    })
}

/// Inserts the sample dataset unconditionally, relative to `now`.
///
/// Runs on the caller's connection; migrations call it inside their reset
/// transaction.
pub fn insert_seed_data(conn: &Connection, now: DateTime<Utc>) -> RepoResult<SeedSummary> {
    let now = now.trunc_subsecs(3);
    let projects = SqliteProjectRepository::try_new(conn)?;
    let sections = SqliteSectionRepository::try_new(conn)?;
    let goals = SqliteGoalRepository::try_new(conn)?;
    let tasks = SqliteTaskRepository::try_new(conn)?;
    let mut summary = SeedSummary::default();

    let mut project = Project::new("Mobile Game - Boom Ball");
    project.status = ProjectStatus::Active;
    project.priority = 1;
    project.color = "#f59e0b".to_string();
    project.description = "Hyper-casual mobile game development".to_string();
    project.created_at = now;
    project.updated_at = now;
    projects.create_project(&project)?;
    summary.projects += 1;

    for (index, seed) in SECTIONS.iter().enumerate() {
        let mut section = Section::new(project.id, seed.name, index as i64 + 1);
        section.kind = seed.kind.to_string();
        section.color = seed.color.to_string();
        section.created_at = now;
        sections.create_section(&section)?;
        summary.sections += 1;

        let label = section.label();
        for goal_seed in goals_for(label) {
            let mut goal = Goal::new(project.id, section.id, goal_seed.title, goal_seed.target);
            goal.current = goal_seed.current;
            goal.deadline = Some(now + Duration::days(goal_seed.deadline_days));
            goal.status = goal_seed.status;
            goal.priority = goal_seed.priority;
            goal.created_at = now;
            goal.updated_at = now;
            goals.create_goal(&goal)?;
            summary.goals += 1;

            for task_seed in tasks_for(label) {
                let mut task = Task::new(project.id, section.id, task_seed.title);
                task.goal_id = Some(goal.id);
                task.status = TaskStatus::Todo;
                task.kind = task_seed.kind.to_string();
                task.priority = task_seed.priority;
                task.recurring = task_seed.recurring;
                task.due_date = Some(now + Duration::days(TASK_DUE_DAYS));
                task.estimated_hours = TASK_ESTIMATED_HOURS;
                task.tags = vec![task_seed.kind.to_string()];
                task.created_at = now;
                task.updated_at = now;
                tasks.create_task(&task)?;
                summary.tasks += 1;
            }
        }
    }

    info!(
        "event=db_seed module=seed status=ok projects={} sections={} goals={} tasks={}",
        summary.projects, summary.sections, summary.goals, summary.tasks
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::{goals_for, tasks_for, SECTIONS};
    use crate::model::section::section_label;

    #[test]
    fn dataset_yields_six_goals_and_sixteen_tasks() {
        let mut goals = 0;
        let mut tasks = 0;
        for section in SECTIONS.iter() {
            let label = section_label(section.name);
            goals += goals_for(label).len();
            tasks += goals_for(label).len() * tasks_for(label).len();
        }
        assert_eq!(goals, 6);
        assert_eq!(tasks, 16);
    }

    #[test]
    fn design_and_analytics_have_no_entries() {
        assert!(goals_for("Design").is_empty());
        assert!(tasks_for("Analytics").is_empty());
    }
}
