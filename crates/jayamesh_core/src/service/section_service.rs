//! Section use-case service.
//!
//! # Invariants
//! - New sections are appended: `order = existing count + 1`.
//! - A section can only be created under an existing project.

use crate::model::project::ProjectId;
use crate::model::section::{Section, SectionId};
use crate::model::ValidationError;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::section_repo::SectionRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for section use-cases.
#[derive(Debug)]
pub enum SectionServiceError {
    ProjectNotFound(ProjectId),
    SectionNotFound(SectionId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for SectionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SectionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SectionServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::SectionNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Section service over project and section repositories.
pub struct SectionService<P: ProjectRepository, S: SectionRepository> {
    projects: P,
    sections: S,
}

impl<P: ProjectRepository, S: SectionRepository> SectionService<P, S> {
    pub fn new(projects: P, sections: S) -> Self {
        Self { projects, sections }
    }

    /// Appends a section to a project. `kind` defaults to `custom`.
    pub fn create_section(
        &self,
        project_id: ProjectId,
        name: &str,
        kind: Option<&str>,
    ) -> Result<Section, SectionServiceError> {
        if self.projects.get_project(project_id)?.is_none() {
            return Err(SectionServiceError::ProjectNotFound(project_id));
        }

        let existing = self.sections.count_sections(project_id)?;
        let order = existing as i64 + 1;
        let mut section = Section::new(project_id, name.trim(), order);
        if let Some(kind) = kind {
            section.kind = kind.to_string();
        }
        self.sections.create_section(&section)?;
        Ok(section)
    }

    pub fn rename_section(
        &self,
        id: SectionId,
        name: &str,
    ) -> Result<Section, SectionServiceError> {
        let mut section = self.require(id)?;
        section.name = name.trim().to_string();
        self.sections.update_section(&section)?;
        Ok(section)
    }

    pub fn get_section(&self, id: SectionId) -> Result<Option<Section>, SectionServiceError> {
        Ok(self.sections.get_section(id)?)
    }

    /// Lists a project's sections by order.
    pub fn list_sections(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<Section>, SectionServiceError> {
        Ok(self.sections.list_sections(Some(project_id))?)
    }

    /// Deletes the section with its goals, tasks and notes.
    pub fn delete_section(&self, id: SectionId) -> Result<(), SectionServiceError> {
        self.sections.delete_section(id)?;
        Ok(())
    }

    fn require(&self, id: SectionId) -> Result<Section, SectionServiceError> {
        self.sections
            .get_section(id)?
            .ok_or(SectionServiceError::SectionNotFound(id))
    }
}
