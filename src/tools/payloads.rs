//! Wire payloads for tool invocations.

use crate::chain::domain::{ProjectId, Task, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Arguments for fetching the next task of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTaskArgs {
    /// The project to poll.
    pub project_id: ProjectId,
}

/// Arguments for marking a task as successfully completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTaskSuccessArgs {
    /// The owning project.
    pub project_id: ProjectId,
    /// The task to mark as successful.
    pub task_id: TaskId,
    /// The result of the task execution.
    pub result: String,
    /// Additional notes about the completion.
    #[serde(default)]
    pub notes: String,
}

/// Arguments for marking a task as failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTaskFailureArgs {
    /// The owning project.
    pub project_id: ProjectId,
    /// The task to mark as failed.
    pub task_id: TaskId,
    /// The error message describing why the task failed.
    pub error: String,
    /// Additional notes about the failure.
    #[serde(default)]
    pub notes: String,
}

/// Response returned from a `start_project` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartProjectResponse {
    /// Identity of the newly created project.
    pub project_id: ProjectId,
}

/// Task view handed across the tool boundary.
///
/// Instructions are already expanded; state, outcome fields, and chain
/// linkage stay internal to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextTask {
    /// Task identity to report back with.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Instruction text for the worker.
    pub instructions: String,
    /// Auxiliary data carried alongside the task.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
}

impl NextTask {
    /// Builds the wire view of a task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_owned(),
            instructions: task.instructions().to_owned(),
            data: task.data().clone(),
        }
    }
}

/// Response returned from completion and polling invocations.
///
/// Serializes as `{"next_task": null}` when the chain is exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// The newly active task, or `None` when no tasks remain.
    pub next_task: Option<NextTask>,
}

impl TaskResponse {
    pub(crate) fn from_task(task: Option<&Task>) -> Self {
        Self {
            next_task: task.map(NextTask::from_task),
        }
    }
}

/// Error payload handed across the tool boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub error: String,
}

impl ErrorResponse {
    /// Builds an error payload from any displayable error.
    #[must_use]
    pub fn new(error: &impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
