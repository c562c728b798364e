//! Section repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listings are ordered by `sort_order`, then creation time.
//! - Deleting a section removes its goals, tasks and notes in one
//!   transaction; focus sessions that pointed at a removed task are kept and
//!   detached.

use crate::model::project::ProjectId;
use crate::model::section::{Section, SectionId};
use crate::repo::{
    ensure_connection_ready, from_epoch_ms, parse_uuid, run_in_transaction, to_epoch_ms,
    RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const SECTION_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    name,
    type,
    color,
    sort_order,
    created_at
FROM sections";

/// Repository interface for section persistence.
pub trait SectionRepository {
    fn create_section(&self, section: &Section) -> RepoResult<SectionId>;
    fn update_section(&self, section: &Section) -> RepoResult<()>;
    fn get_section(&self, id: SectionId) -> RepoResult<Option<Section>>;
    /// Lists sections of one project, or of every project when `None`.
    fn list_sections(&self, project_id: Option<ProjectId>) -> RepoResult<Vec<Section>>;
    fn count_sections(&self, project_id: ProjectId) -> RepoResult<u64>;
    /// Deletes a section with its goals, tasks and notes.
    fn delete_section(&self, id: SectionId) -> RepoResult<()>;
}

/// SQLite-backed section repository.
pub struct SqliteSectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSectionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SectionRepository for SqliteSectionRepository<'_> {
    fn create_section(&self, section: &Section) -> RepoResult<SectionId> {
        section.validate()?;
        self.conn.execute(
            "INSERT INTO sections (
                id, project_id, name, type, color, sort_order, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                section.id.to_string(),
                section.project_id.to_string(),
                section.name,
                section.kind,
                section.color,
                section.order,
                to_epoch_ms(section.created_at),
            ],
        )?;
        Ok(section.id)
    }

    fn update_section(&self, section: &Section) -> RepoResult<()> {
        section.validate()?;
        let changed = self.conn.execute(
            "UPDATE sections
             SET name = ?2, type = ?3, color = ?4, sort_order = ?5
             WHERE id = ?1;",
            params![
                section.id.to_string(),
                section.name,
                section.kind,
                section.color,
                section.order,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "section",
                id: section.id,
            });
        }
        Ok(())
    }

    fn get_section(&self, id: SectionId) -> RepoResult<Option<Section>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SECTION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(section_from_row(row)?));
        }
        Ok(None)
    }

    fn list_sections(&self, project_id: Option<ProjectId>) -> RepoResult<Vec<Section>> {
        let mut sections = Vec::new();
        let order = "ORDER BY sort_order ASC, created_at ASC, id ASC";
        match project_id {
            Some(project_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{SECTION_SELECT_SQL} WHERE project_id = ?1 {order};"
                ))?;
                let mut rows = stmt.query([project_id.to_string()])?;
                while let Some(row) = rows.next()? {
                    sections.push(section_from_row(row)?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{SECTION_SELECT_SQL} {order};"))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    sections.push(section_from_row(row)?);
                }
            }
        }
        Ok(sections)
    }

    fn count_sections(&self, project_id: ProjectId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sections WHERE project_id = ?1;",
            [project_id.to_string()],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData("negative section count".to_string()))
    }

    fn delete_section(&self, id: SectionId) -> RepoResult<()> {
        run_in_transaction(self.conn, |conn| {
            let section_id = id.to_string();
            conn.execute(
                "DELETE FROM note_tags
                 WHERE note_id IN (SELECT id FROM notes WHERE section_id = ?1);",
                [section_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM notes WHERE section_id = ?1;",
                [section_id.as_str()],
            )?;
            conn.execute(
                "UPDATE focus_sessions
                 SET task_id = NULL
                 WHERE task_id IN (SELECT id FROM tasks WHERE section_id = ?1);",
                [section_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM tasks WHERE section_id = ?1;",
                [section_id.as_str()],
            )?;
            conn.execute(
                "UPDATE tasks
                 SET goal_id = NULL
                 WHERE goal_id IN (SELECT id FROM goals WHERE section_id = ?1);",
                [section_id.as_str()],
            )?;
            conn.execute(
                "DELETE FROM goals WHERE section_id = ?1;",
                [section_id.as_str()],
            )?;
            let changed = conn.execute(
                "DELETE FROM sections WHERE id = ?1;",
                [section_id.as_str()],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "section",
                    id,
                });
            }
            Ok(())
        })
    }
}

fn section_from_row(row: &Row<'_>) -> RepoResult<Section> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    Ok(Section {
        id: parse_uuid(&id_text, "sections.id")?,
        project_id: parse_uuid(&project_text, "sections.project_id")?,
        name: row.get("name")?,
        kind: row.get("type")?,
        color: row.get("color")?,
        order: row.get("sort_order")?,
        created_at: from_epoch_ms(row.get("created_at")?, "sections.created_at")?,
    })
}
