//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/pin/tag/delete APIs.
//! - Parse comma-separated tag input and search notes.
//!
//! # Invariants
//! - Note lists are sorted by `updated_at DESC`.
//! - Tag names are normalized to lowercase and deduplicated.
//! - Title must be non-blank.

use crate::model::note::{Note, NoteId};
use crate::model::section::SectionId;
use crate::model::{timestamp_now, ValidationError};
use crate::repo::note_repo::{normalize_tags, NoteRepository};
use crate::repo::section_repo::SectionRepository;
use crate::repo::{ListScope, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    SectionNotFound(SectionId),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    Validation(ValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Notes split for display: pinned first, then the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedSplit {
    pub pinned: Vec<Note>,
    pub others: Vec<Note>,
}

/// Note service facade over repository implementations.
pub struct NoteService<S: SectionRepository, R: NoteRepository> {
    sections: S,
    repo: R,
}

impl<S: SectionRepository, R: NoteRepository> NoteService<S, R> {
    pub fn new(sections: S, repo: R) -> Self {
        Self { sections, repo }
    }

    /// Creates a note in a section. `tags` is a comma-separated list.
    pub fn create_note(
        &self,
        section_id: SectionId,
        title: &str,
        content: impl Into<String>,
        tags: &str,
    ) -> Result<Note, NoteServiceError> {
        let section = self
            .sections
            .get_section(section_id)?
            .ok_or(NoteServiceError::SectionNotFound(section_id))?;

        let mut note = Note::new(section.project_id, section.id, title.trim());
        note.content = content.into();
        note.tags = parse_tag_list(tags);
        let id = self.repo.create_note(&note)?;
        self.read_back(id, "created note not found in read-back")
    }

    /// Replaces title and/or content; `None` keeps the stored value.
    pub fn update_note(
        &self,
        id: NoteId,
        title: Option<&str>,
        content: Option<String>,
    ) -> Result<Note, NoteServiceError> {
        let mut note = self.require(id)?;
        if let Some(title) = title {
            note.title = title.trim().to_string();
        }
        if let Some(content) = content {
            note.content = content;
        }
        note.updated_at = timestamp_now();
        self.repo.update_note(&note)?;
        self.read_back(id, "updated note not found in read-back")
    }

    pub fn toggle_pin(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        let mut note = self.require(id)?;
        note.is_pinned = !note.is_pinned;
        note.updated_at = timestamp_now();
        self.repo.update_note(&note)?;
        self.read_back(id, "pinned note not found in read-back")
    }

    /// Atomically replaces the full tag set for one note.
    pub fn set_note_tags(&self, id: NoteId, tags: &[String]) -> Result<Note, NoteServiceError> {
        self.repo
            .set_note_tags(id, &normalize_tags(tags), timestamp_now())?;
        self.read_back(id, "note missing after tag replacement")
    }

    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>, NoteServiceError> {
        Ok(self.repo.get_note(id)?)
    }

    pub fn list_notes(&self, scope: ListScope) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes(scope)?)
    }

    /// Case-insensitive search over title, content and tags.
    pub fn search_notes(
        &self,
        scope: ListScope,
        term: &str,
    ) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self.repo.list_notes(scope)?;
        Ok(notes.into_iter().filter(|note| note.matches(term)).collect())
    }

    /// Lists normalized tags known by storage.
    pub fn list_tags(&self) -> Result<Vec<String>, NoteServiceError> {
        Ok(self.repo.list_tags()?)
    }

    pub fn delete_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        self.repo.delete_note(id)?;
        Ok(())
    }

    fn require(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))
    }

    fn read_back(&self, id: NoteId, details: &'static str) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(details))
    }
}

/// Parses `"a, B ,,c"` into normalized tags `["a", "b", "c"]`.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    let raw: Vec<String> = input.split(',').map(str::to_string).collect();
    normalize_tags(&raw)
}

/// Splits notes into pinned and other, keeping relative order.
pub fn split_pinned(notes: Vec<Note>) -> PinnedSplit {
    let (pinned, others) = notes.into_iter().partition(|note| note.is_pinned);
    PinnedSplit { pinned, others }
}
