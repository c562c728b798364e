//! Task repository contracts and SQLite implementation.
//!
//! Task tags are stored inline as a JSON array in `tasks.tags`; they are
//! labels copied from the task kind, not entries of the shared tag table.

use crate::model::task::{Task, TaskId, TaskStatus};
use crate::repo::{
    bool_to_int, ensure_connection_ready, from_epoch_ms, from_optional_epoch_ms, parse_bool,
    parse_optional_uuid, parse_small_int, parse_uuid, run_in_transaction, to_epoch_ms, ListScope,
    RepoError, RepoResult,
};
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    section_id,
    goal_id,
    title,
    description,
    status,
    type,
    priority,
    recurring,
    due_date,
    estimated_hours,
    actual_hours,
    tags,
    created_at,
    updated_at
FROM tasks";

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists tasks in scope ordered by creation time.
    fn list_tasks(&self, scope: ListScope) -> RepoResult<Vec<Task>>;
    /// Deletes one task; focus sessions linked to it stay and lose the link.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        self.conn.execute(
            "INSERT INTO tasks (
                id, project_id, section_id, goal_id, title, description, status,
                type, priority, recurring, due_date, estimated_hours, actual_hours,
                tags, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16);",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.section_id.to_string(),
                task.goal_id.map(|id| id.to_string()),
                task.title,
                task.description,
                task.status.as_str(),
                task.kind,
                i64::from(task.priority),
                bool_to_int(task.recurring),
                task.due_date.map(to_epoch_ms),
                task.estimated_hours,
                task.actual_hours,
                encode_tags(&task.tags)?,
                to_epoch_ms(task.created_at),
                to_epoch_ms(task.updated_at),
            ],
        )?;
        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                goal_id = ?2,
                title = ?3,
                description = ?4,
                status = ?5,
                type = ?6,
                priority = ?7,
                recurring = ?8,
                due_date = ?9,
                estimated_hours = ?10,
                actual_hours = ?11,
                tags = ?12,
                updated_at = ?13
             WHERE id = ?1;",
            params![
                task.id.to_string(),
                task.goal_id.map(|id| id.to_string()),
                task.title,
                task.description,
                task.status.as_str(),
                task.kind,
                i64::from(task.priority),
                bool_to_int(task.recurring),
                task.due_date.map(to_epoch_ms),
                task.estimated_hours,
                task.actual_hours,
                encode_tags(&task.tags)?,
                to_epoch_ms(task.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(task_from_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, scope: ListScope) -> RepoResult<Vec<Task>> {
        let (filter, bound) = scope.filter();
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}{filter} ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bound.iter()))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(task_from_row(row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        run_in_transaction(self.conn, |conn| {
            let task_id = id.to_string();
            conn.execute(
                "UPDATE focus_sessions SET task_id = NULL WHERE task_id = ?1;",
                [task_id.as_str()],
            )?;
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1;", [task_id.as_str()])?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "task", id });
            }
            Ok(())
        })
    }
}

fn encode_tags(tags: &[String]) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|err| RepoError::InvalidData(format!("unencodable task tags: {err}")))
}

fn decode_tags(raw: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("invalid tasks.tags `{raw}`: {err}")))
}

fn task_from_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    let section_text: String = row.get("section_id")?;
    let status_text: String = row.get("status")?;
    let tags_text: String = row.get("tags")?;
    let status = TaskStatus::parse(&status_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid task status `{status_text}`")))?;

    Ok(Task {
        id: parse_uuid(&id_text, "tasks.id")?,
        project_id: parse_uuid(&project_text, "tasks.project_id")?,
        section_id: parse_uuid(&section_text, "tasks.section_id")?,
        goal_id: parse_optional_uuid(row.get("goal_id")?, "tasks.goal_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        kind: row.get("type")?,
        priority: parse_small_int(row.get("priority")?, "tasks.priority")?,
        recurring: parse_bool(row.get("recurring")?, "tasks.recurring")?,
        due_date: from_optional_epoch_ms(row.get("due_date")?, "tasks.due_date")?,
        estimated_hours: row.get("estimated_hours")?,
        actual_hours: row.get("actual_hours")?,
        tags: decode_tags(&tags_text)?,
        created_at: from_epoch_ms(row.get("created_at")?, "tasks.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "tasks.updated_at")?,
    })
}
