//! Project record: the root of the ownership hierarchy.

use super::{
    ensure_color, ensure_id, ensure_not_blank, ensure_priority, timestamp_now, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

/// Default project kind for new projects.
pub const DEFAULT_PROJECT_TYPE: &str = "game";
/// Default project color for new projects.
pub const DEFAULT_PROJECT_COLOR: &str = "#3b82f6";

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planning,
    Active,
    Paused,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planning" => Some(Self::Planning),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    /// Free-form kind label (`game`, `web`, `desktop`, `mobile`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ProjectStatus,
    pub priority: u8,
    pub color: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
}

impl Project {
    /// Creates a project in `planning` state with default kind, color and
    /// priority 2.
    pub fn new(title: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind: DEFAULT_PROJECT_TYPE.to_string(),
            status: ProjectStatus::Planning,
            priority: 2,
            color: DEFAULT_PROJECT_COLOR.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            archived: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id(&self.id)?;
        ensure_not_blank("project title", &self.title)?;
        ensure_not_blank("project type", &self.kind)?;
        ensure_priority(self.priority)?;
        ensure_color(&self.color)
    }
}
