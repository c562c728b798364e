//! Goal repository contracts and SQLite implementation.

use crate::model::goal::{Goal, GoalId, GoalStatus};
use crate::repo::{
    ensure_connection_ready, from_epoch_ms, from_optional_epoch_ms, parse_small_int, parse_uuid,
    run_in_transaction, to_epoch_ms, ListScope, RepoError, RepoResult,
};
use rusqlite::{params, params_from_iter, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    section_id,
    title,
    target,
    current,
    deadline,
    status,
    priority,
    created_at,
    updated_at
FROM goals";

/// Repository interface for goal persistence.
pub trait GoalRepository {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    fn update_goal(&self, goal: &Goal) -> RepoResult<()>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    /// Lists goals in scope ordered by creation time.
    fn list_goals(&self, scope: ListScope) -> RepoResult<Vec<Goal>>;
    /// Deletes one goal; tasks linked to it stay and lose the link.
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        goal.validate()?;
        self.conn.execute(
            "INSERT INTO goals (
                id, project_id, section_id, title, target, current, deadline,
                status, priority, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                goal.id.to_string(),
                goal.project_id.to_string(),
                goal.section_id.to_string(),
                goal.title,
                goal.target,
                goal.current,
                goal.deadline.map(to_epoch_ms),
                goal.status.as_str(),
                i64::from(goal.priority),
                to_epoch_ms(goal.created_at),
                to_epoch_ms(goal.updated_at),
            ],
        )?;
        Ok(goal.id)
    }

    fn update_goal(&self, goal: &Goal) -> RepoResult<()> {
        goal.validate()?;
        let changed = self.conn.execute(
            "UPDATE goals
             SET
                title = ?2,
                target = ?3,
                current = ?4,
                deadline = ?5,
                status = ?6,
                priority = ?7,
                updated_at = ?8
             WHERE id = ?1;",
            params![
                goal.id.to_string(),
                goal.title,
                goal.target,
                goal.current,
                goal.deadline.map(to_epoch_ms),
                goal.status.as_str(),
                i64::from(goal.priority),
                to_epoch_ms(goal.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "goal",
                id: goal.id,
            });
        }
        Ok(())
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(goal_from_row(row)?));
        }
        Ok(None)
    }

    fn list_goals(&self, scope: ListScope) -> RepoResult<Vec<Goal>> {
        let (filter, bound) = scope.filter();
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}{filter} ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bound.iter()))?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(goal_from_row(row)?);
        }
        Ok(goals)
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        run_in_transaction(self.conn, |conn| {
            let goal_id = id.to_string();
            conn.execute(
                "UPDATE tasks SET goal_id = NULL WHERE goal_id = ?1;",
                [goal_id.as_str()],
            )?;
            let changed = conn.execute("DELETE FROM goals WHERE id = ?1;", [goal_id.as_str()])?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "goal", id });
            }
            Ok(())
        })
    }
}

fn goal_from_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    let section_text: String = row.get("section_id")?;
    let status_text: String = row.get("status")?;
    let status = GoalStatus::parse(&status_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid goal status `{status_text}`")))?;

    Ok(Goal {
        id: parse_uuid(&id_text, "goals.id")?,
        project_id: parse_uuid(&project_text, "goals.project_id")?,
        section_id: parse_uuid(&section_text, "goals.section_id")?,
        title: row.get("title")?,
        target: row.get("target")?,
        current: row.get("current")?,
        deadline: from_optional_epoch_ms(row.get("deadline")?, "goals.deadline")?,
        status,
        priority: parse_small_int(row.get("priority")?, "goals.priority")?,
        created_at: from_epoch_ms(row.get("created_at")?, "goals.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "goals.updated_at")?,
    })
}
