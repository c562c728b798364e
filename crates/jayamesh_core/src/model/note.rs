//! Note record: free text attached to a section.

use super::project::ProjectId;
use super::section::SectionId;
use super::{ensure_id, ensure_not_blank, timestamp_now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;

const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub project_id: ProjectId,
    pub section_id: SectionId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Normalized tag names (lowercase, deduplicated, sorted).
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(project_id: ProjectId, section_id: SectionId, title: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            section_id,
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            is_pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Short list preview: first 80 chars of content, `...` when cut.
    pub fn preview(&self) -> String {
        note_preview(&self.content)
    }

    /// Case-insensitive match against title, content and tags.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id(&self.id)?;
        ensure_id(&self.project_id)?;
        ensure_id(&self.section_id)?;
        ensure_not_blank("note title", &self.title)
    }
}

pub fn note_preview(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::{note_preview, Note};
    use uuid::Uuid;

    #[test]
    fn preview_truncates_long_content() {
        let long = "x".repeat(100);
        let preview = note_preview(&long);
        assert_eq!(preview.chars().count(), 83);
        assert!(preview.ends_with("..."));
        assert_eq!(note_preview("short"), "short");
    }

    #[test]
    fn matches_checks_title_content_and_tags() {
        let mut note = Note::new(Uuid::new_v4(), Uuid::new_v4(), "Launch Plan");
        note.content = "Reach out to influencers".to_string();
        note.tags = vec!["marketing".to_string()];

        assert!(note.matches("launch"));
        assert!(note.matches("INFLUENCERS"));
        assert!(note.matches("market"));
        assert!(!note.matches("physics"));
    }
}
