//! Note/tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes and their tag links.
//! - Own tag-link replacement logic (`set_note_tags`) with atomic semantics.
//!
//! # Invariants
//! - Note listings are ordered by `updated_at` descending.
//! - `set_note_tags` replaces the whole tag set in a single transaction.
//! - Tag names are normalized to lowercase before persistence.

use crate::model::note::{Note, NoteId};
use crate::repo::{
    bool_to_int, ensure_connection_ready, from_epoch_ms, parse_bool, parse_uuid,
    run_in_transaction, to_epoch_ms, ListScope, RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    section_id,
    title,
    content,
    is_pinned,
    created_at,
    updated_at
FROM notes";

/// Repository interface for notes/tags operations.
pub trait NoteRepository {
    /// Inserts one note with its tags.
    fn create_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces title, content and pin flag. Tags are left untouched.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes in scope, most recently updated first.
    fn list_notes(&self, scope: ListScope) -> RepoResult<Vec<Note>>;
    /// Replaces all tags for the given note in one transaction.
    fn set_note_tags(&self, id: NoteId, tags: &[String], now: DateTime<Utc>) -> RepoResult<()>;
    /// Returns all known tags sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed notes/tags repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;
        run_in_transaction(self.conn, |conn| {
            let note_id = note.id.to_string();
            conn.execute(
                "INSERT INTO notes (
                    id, project_id, section_id, title, content, is_pinned,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    note_id,
                    note.project_id.to_string(),
                    note.section_id.to_string(),
                    note.title,
                    note.content,
                    bool_to_int(note.is_pinned),
                    to_epoch_ms(note.created_at),
                    to_epoch_ms(note.updated_at),
                ],
            )?;
            link_tags(conn, &note_id, &normalize_tags(&note.tags))?;
            Ok(note.id)
        })
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;
        let changed = self.conn.execute(
            "UPDATE notes
             SET title = ?2, content = ?3, is_pinned = ?4, updated_at = ?5
             WHERE id = ?1;",
            params![
                note.id.to_string(),
                note.title,
                note.content,
                bool_to_int(note.is_pinned),
                to_epoch_ms(note.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "note",
                id: note.id,
            });
        }
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(note_from_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_notes(&self, scope: ListScope) -> RepoResult<Vec<Note>> {
        let (filter, bound) = scope.filter();
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}{filter} ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bound.iter()))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(note_from_row(self.conn, row)?);
        }
        Ok(notes)
    }

    fn set_note_tags(&self, id: NoteId, tags: &[String], now: DateTime<Utc>) -> RepoResult<()> {
        let normalized = normalize_tags(tags);
        run_in_transaction(self.conn, |conn| {
            let note_id = id.to_string();
            let changed = conn.execute(
                "UPDATE notes SET updated_at = ?2 WHERE id = ?1;",
                params![note_id, to_epoch_ms(now)],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "note", id });
            }
            conn.execute("DELETE FROM note_tags WHERE note_id = ?1;", [&note_id])?;
            link_tags(conn, &note_id, &normalized)
        })
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM tags ORDER BY name COLLATE NOCASE ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get("name")?;
            tags.push(value.to_lowercase());
        }
        Ok(tags)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        run_in_transaction(self.conn, |conn| {
            let note_id = id.to_string();
            conn.execute("DELETE FROM note_tags WHERE note_id = ?1;", [&note_id])?;
            let changed = conn.execute("DELETE FROM notes WHERE id = ?1;", [&note_id])?;
            if changed == 0 {
                return Err(RepoError::NotFound { entity: "note", id });
            }
            Ok(())
        })
    }
}

/// Normalizes one tag value: trimmed, lowercase, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values, sorted by name.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

fn link_tags(conn: &Connection, note_id: &str, tags: &[String]) -> RepoResult<()> {
    for tag in tags {
        conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [tag])?;
        conn.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id)
             SELECT ?1, id
             FROM tags
             WHERE name = ?2 COLLATE NOCASE;",
            params![note_id, tag],
        )?;
    }
    Ok(())
}

fn load_tags_for_note(conn: &Connection, note_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM note_tags nt
         INNER JOIN tags t ON t.id = nt.tag_id
         WHERE nt.note_id = ?1
         ORDER BY t.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        tags.push(value.to_lowercase());
    }
    Ok(tags)
}

fn note_from_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    let section_text: String = row.get("section_id")?;
    let tags = load_tags_for_note(conn, &id_text)?;

    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        project_id: parse_uuid(&project_text, "notes.project_id")?,
        section_id: parse_uuid(&section_text, "notes.section_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        tags,
        is_pinned: parse_bool(row.get("is_pinned")?, "notes.is_pinned")?,
        created_at: from_epoch_ms(row.get("created_at")?, "notes.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "notes.updated_at")?,
    })
}
