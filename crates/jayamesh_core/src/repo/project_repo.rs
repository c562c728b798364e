//! Project repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a project removes every row it owns in one transaction:
//!   note tags, notes, focus sessions, tasks, goals and sections.
//! - Focus sessions of other projects that referenced a removed task keep
//!   their row and lose the task link.

use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::repo::{
    bool_to_int, ensure_connection_ready, from_epoch_ms, parse_bool, parse_small_int, parse_uuid,
    run_in_transaction, to_epoch_ms, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    title,
    type,
    status,
    priority,
    color,
    description,
    archived,
    created_at,
    updated_at
FROM projects";

/// Repository interface for project persistence.
pub trait ProjectRepository {
    /// Inserts one project and returns its id.
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    /// Replaces every mutable column of an existing project.
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    /// Gets one project by id.
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Lists projects, unarchived first, each group by creation time.
    fn list_projects(&self, include_archived: bool) -> RepoResult<Vec<Project>>;
    /// Deletes a project and everything it owns.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;
        self.conn.execute(
            "INSERT INTO projects (
                id, title, type, status, priority, color, description,
                archived, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                project.id.to_string(),
                project.title,
                project.kind,
                project.status.as_str(),
                i64::from(project.priority),
                project.color,
                project.description,
                bool_to_int(project.archived),
                to_epoch_ms(project.created_at),
                to_epoch_ms(project.updated_at),
            ],
        )?;
        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                title = ?2,
                type = ?3,
                status = ?4,
                priority = ?5,
                color = ?6,
                description = ?7,
                archived = ?8,
                updated_at = ?9
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.title,
                project.kind,
                project.status.as_str(),
                i64::from(project.priority),
                project.color,
                project.description,
                bool_to_int(project.archived),
                to_epoch_ms(project.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id: project.id,
            });
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(project_from_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, include_archived: bool) -> RepoResult<Vec<Project>> {
        let filter = if include_archived {
            ""
        } else {
            " WHERE archived = 0"
        };
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}{filter} ORDER BY archived ASC, created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(project_from_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        run_in_transaction(self.conn, |conn| {
            let project_id = id.to_string();
            conn.execute(
                "DELETE FROM note_tags
                 WHERE note_id IN (SELECT id FROM notes WHERE project_id = ?1);",
                [project_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM notes WHERE project_id = ?1;",
                [project_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM focus_sessions WHERE project_id = ?1;",
                [project_id.as_str()],
            )?;
            conn.execute(
                "UPDATE focus_sessions
                 SET task_id = NULL
                 WHERE task_id IN (SELECT id FROM tasks WHERE project_id = ?1);",
                [project_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM tasks WHERE project_id = ?1;",
                [project_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM goals WHERE project_id = ?1;",
                [project_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM sections WHERE project_id = ?1;",
                [project_id.as_str()],
            )?;
            let changed = conn.execute(
                "DELETE FROM projects WHERE id = ?1;",
                [project_id.as_str()],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "project",
                    id,
                });
            }
            Ok(())
        })
    }
}

fn project_from_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid project status `{status_text}`"))
    })?;

    Ok(Project {
        id: parse_uuid(&id_text, "projects.id")?,
        title: row.get("title")?,
        kind: row.get("type")?,
        status,
        priority: parse_small_int(row.get("priority")?, "projects.priority")?,
        color: row.get("color")?,
        description: row.get("description")?,
        archived: parse_bool(row.get("archived")?, "projects.archived")?,
        created_at: from_epoch_ms(row.get("created_at")?, "projects.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "projects.updated_at")?,
    })
}
