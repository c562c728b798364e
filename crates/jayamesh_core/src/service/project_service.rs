//! Project use-case service.
//!
//! # Responsibility
//! - Apply creation defaults and update rules for projects.
//! - Delegate persistence (including cascade delete) to the repository.

use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::{timestamp_now, ValidationError};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for project use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    ProjectNotFound(ProjectId),
    Validation(ValidationError),
    Repo(RepoError),
    /// Write succeeded but the read-back did not return the row.
    InconsistentState(&'static str),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent project state: {details}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::ProjectNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Creation input. Unset fields take the project defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub kind: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<u8>,
    pub color: Option<String>,
    pub description: String,
}

impl ProjectDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Project service facade over repository implementations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project; the title is trimmed.
    pub fn create_project(&self, draft: ProjectDraft) -> Result<Project, ProjectServiceError> {
        let mut project = Project::new(draft.title.trim());
        if let Some(kind) = draft.kind {
            project.kind = kind;
        }
        if let Some(status) = draft.status {
            project.status = status;
        }
        if let Some(priority) = draft.priority {
            project.priority = priority;
        }
        if let Some(color) = draft.color {
            project.color = color;
        }
        project.description = draft.description;

        let id = self.repo.create_project(&project)?;
        self.read_back(id, "created project not found in read-back")
    }

    /// Persists an edited project and refreshes `updated_at`.
    pub fn update_project(&self, mut project: Project) -> Result<Project, ProjectServiceError> {
        project.updated_at = timestamp_now();
        self.repo.update_project(&project)?;
        self.read_back(project.id, "updated project not found in read-back")
    }

    pub fn set_archived(
        &self,
        id: ProjectId,
        archived: bool,
    ) -> Result<Project, ProjectServiceError> {
        let mut project = self.require(id)?;
        project.archived = archived;
        self.update_project(project)
    }

    pub fn set_status(
        &self,
        id: ProjectId,
        status: ProjectStatus,
    ) -> Result<Project, ProjectServiceError> {
        let mut project = self.require(id)?;
        project.status = status;
        self.update_project(project)
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>, ProjectServiceError> {
        Ok(self.repo.get_project(id)?)
    }

    /// Lists projects; archived ones only when `include_archived`.
    pub fn list_projects(
        &self,
        include_archived: bool,
    ) -> Result<Vec<Project>, ProjectServiceError> {
        Ok(self.repo.list_projects(include_archived)?)
    }

    /// Deletes the project with all its sections, goals, tasks, notes and
    /// focus sessions.
    pub fn delete_project(&self, id: ProjectId) -> Result<(), ProjectServiceError> {
        self.repo.delete_project(id)?;
        Ok(())
    }

    fn require(&self, id: ProjectId) -> Result<Project, ProjectServiceError> {
        self.repo
            .get_project(id)?
            .ok_or(ProjectServiceError::ProjectNotFound(id))
    }

    fn read_back(
        &self,
        id: ProjectId,
        details: &'static str,
    ) -> Result<Project, ProjectServiceError> {
        self.repo
            .get_project(id)?
            .ok_or(ProjectServiceError::InconsistentState(details))
    }
}
