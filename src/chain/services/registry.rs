//! Registry owning all live projects.

use crate::chain::domain::{Project, ProjectId};
use mockable::Clock;
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned by registry lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The project identity does not resolve.
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),
}

/// Identity-keyed registry of projects.
///
/// The registry is an explicitly constructed, explicitly owned object:
/// hosts create one at startup, hold it for the process lifetime, and
/// drop it with the process. Projects are never removed.
#[derive(Debug)]
pub struct ProjectRegistry {
    service_name: String,
    projects: HashMap<ProjectId, Project>,
}

impl ProjectRegistry {
    /// Creates an empty registry.
    ///
    /// The service name is the tool namespace embedded in completion
    /// prompts generated for every project in this registry.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            projects: HashMap::new(),
        }
    }

    /// Returns the tool namespace used in completion prompts.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Creates and registers a new project with an empty chain.
    pub fn add_project(&mut self, clock: &impl Clock) -> &mut Project {
        let project = Project::new(self.service_name.clone(), clock);
        self.projects.entry(project.id()).or_insert(project)
    }

    /// Looks up a project by identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProjectNotFound`] when the identity is
    /// absent.
    pub fn project(&self, id: ProjectId) -> Result<&Project, RegistryError> {
        self.projects
            .get(&id)
            .ok_or(RegistryError::ProjectNotFound(id))
    }

    /// Looks up a project by identity for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProjectNotFound`] when the identity is
    /// absent.
    pub fn project_mut(&mut self, id: ProjectId) -> Result<&mut Project, RegistryError> {
        self.projects
            .get_mut(&id)
            .ok_or(RegistryError::ProjectNotFound(id))
    }
}
