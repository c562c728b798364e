//! Section record: a sub-division of a project grouping goals, tasks and notes.

use super::project::ProjectId;
use super::{ensure_color, ensure_id, ensure_not_blank, timestamp_now, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SectionId = Uuid;

pub const DEFAULT_SECTION_TYPE: &str = "custom";
pub const DEFAULT_SECTION_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub project_id: ProjectId,
    /// Display name, optionally prefixed with an icon (`🎯 Planning`).
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    /// 1-based position within the project.
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

impl Section {
    pub fn new(project_id: ProjectId, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            name: name.into(),
            kind: DEFAULT_SECTION_TYPE.to_string(),
            color: DEFAULT_SECTION_COLOR.to_string(),
            order,
            created_at: timestamp_now(),
        }
    }

    /// Name with any leading icon or punctuation removed.
    ///
    /// `"🎯 Planning"` -> `"Planning"`.
    pub fn label(&self) -> &str {
        section_label(&self.name)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id(&self.id)?;
        ensure_id(&self.project_id)?;
        ensure_not_blank("section name", &self.name)?;
        ensure_not_blank("section type", &self.kind)?;
        ensure_color(&self.color)
    }
}

/// Strips a leading non-alphanumeric prefix (icons, spaces) from a name.
pub fn section_label(name: &str) -> &str {
    name.trim_start_matches(|ch: char| !ch.is_alphanumeric())
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::section_label;

    #[test]
    fn label_drops_leading_icon() {
        assert_eq!(section_label("🎯 Planning"), "Planning");
        assert_eq!(section_label("📱 Marketing "), "Marketing");
        assert_eq!(section_label("Design"), "Design");
    }
}
