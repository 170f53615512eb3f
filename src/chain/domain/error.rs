//! Error types for chain domain operations.

use super::ids::TaskId;
use super::task::{CompletionError, TaskState};
use crate::instructions::PromptRenderError;
use thiserror::Error;

/// Errors returned by project chain operations.
#[derive(Debug, Error)]
pub enum TaskChainError {
    /// The task identity does not resolve within the project.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// The requested state change is not permitted by the task lifecycle.
    #[error(
        "invalid state transition for task {task_id}: {} -> {}",
        from.as_str(),
        to.as_str()
    )]
    InvalidStateTransition {
        /// Identifier of the task whose transition was rejected.
        task_id: TaskId,
        /// State the task was observed in.
        from: TaskState,
        /// State the caller attempted to enter.
        to: TaskState,
    },

    /// The completion callback reported a failure.
    ///
    /// The task's terminal state and outcome fields remain as written;
    /// the chain head is not advanced, so the caller may retry the
    /// report.
    #[error("completion callback for task {task_id} failed")]
    CallbackFailed {
        /// Identifier of the task whose callback failed.
        task_id: TaskId,
        /// Error raised by the callback.
        #[source]
        source: CompletionError,
    },

    /// Completion prompt rendering failed during placeholder expansion.
    #[error(transparent)]
    Prompt(#[from] PromptRenderError),
}

/// Error returned while parsing task states from their string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);
