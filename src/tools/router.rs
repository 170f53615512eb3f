//! Router dispatching tool invocations to the chain engine.

use super::payloads::{
    NextTaskArgs, SetTaskFailureArgs, SetTaskSuccessArgs, StartProjectResponse, TaskResponse,
};
use crate::chain::domain::TaskChainError;
use crate::chain::services::{ProjectRegistry, RegistryError};
use mockable::{Clock, DefaultClock};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to tool callers.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The project identity does not resolve.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A chain operation was rejected.
    #[error(transparent)]
    Chain(#[from] TaskChainError),

    /// A previous caller panicked while holding the registry lock.
    #[error("task engine registry lock is poisoned")]
    LockPoisoned,
}

/// Synchronous dispatch surface for tool invocations.
///
/// The router owns the registry behind a mutex, so every mutating
/// operation on a project is serialized even when the host dispatches
/// tool calls concurrently. Handlers never block on anything but the
/// lock and return immediately.
pub struct ToolRouter<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    registry: Arc<Mutex<ProjectRegistry>>,
    clock: Arc<C>,
}

impl ToolRouter {
    /// Creates a router with an empty registry and the system clock.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self::with_clock(service_name, Arc::new(DefaultClock))
    }
}

impl<C> ToolRouter<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a router with an empty registry and the given clock.
    #[must_use]
    pub fn with_clock(service_name: impl Into<String>, clock: Arc<C>) -> Self {
        Self {
            registry: Arc::new(Mutex::new(ProjectRegistry::new(service_name))),
            clock,
        }
    }

    /// Returns a handle to the shared registry.
    ///
    /// Hosts use this to seed projects with tasks and completion
    /// callbacks before handing the chain to a worker.
    #[must_use]
    pub fn registry(&self) -> Arc<Mutex<ProjectRegistry>> {
        Arc::clone(&self.registry)
    }

    /// Creates a new project and returns its identity.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::LockPoisoned`] when the registry lock is
    /// poisoned.
    pub fn start_project(&self) -> Result<StartProjectResponse, ToolError> {
        let mut registry = self.lock()?;
        let project = registry.add_project(&*self.clock);
        debug!(project_id = %project.id(), "created project");
        Ok(StartProjectResponse {
            project_id: project.id(),
        })
    }

    /// Returns the next task of a project, transitioning it to running.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Registry`] when the project is unknown, or
    /// [`ToolError::LockPoisoned`] when the registry lock is poisoned.
    pub fn next_task(&self, args: &NextTaskArgs) -> Result<TaskResponse, ToolError> {
        let mut registry = self.lock()?;
        let project = registry.project_mut(args.project_id)?;
        let response = TaskResponse::from_task(project.next_task(&*self.clock));
        debug!(
            project_id = %args.project_id,
            has_next = response.next_task.is_some(),
            "fetched next task"
        );
        Ok(response)
    }

    /// Records a successful completion report and returns the next task.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Registry`] when the project is unknown, or
    /// [`ToolError::Chain`] when the task is unknown, already terminal,
    /// or its completion callback failed.
    pub fn set_task_success(&self, args: SetTaskSuccessArgs) -> Result<TaskResponse, ToolError> {
        let mut registry = self.lock()?;
        let project = registry.project_mut(args.project_id)?;
        debug!(
            project_id = %args.project_id,
            task_id = %args.task_id,
            "marking task successful"
        );
        let next = project.set_task_success(args.task_id, args.result, args.notes, &*self.clock)?;
        Ok(TaskResponse::from_task(next))
    }

    /// Records a failed completion report and returns the next task.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::set_task_success`].
    pub fn set_task_failure(&self, args: SetTaskFailureArgs) -> Result<TaskResponse, ToolError> {
        let mut registry = self.lock()?;
        let project = registry.project_mut(args.project_id)?;
        debug!(
            project_id = %args.project_id,
            task_id = %args.task_id,
            "marking task failed"
        );
        let next = project.set_task_failure(args.task_id, args.error, args.notes, &*self.clock)?;
        Ok(TaskResponse::from_task(next))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ProjectRegistry>, ToolError> {
        self.registry.lock().map_err(|_| ToolError::LockPoisoned)
    }
}

impl<C> Clone for ToolRouter<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            clock: Arc::clone(&self.clock),
        }
    }
}
