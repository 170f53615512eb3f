//! Domain model for task-chain execution.
//!
//! The chain domain models task identity, the task lifecycle state
//! machine, ordered linkage between tasks, and completion-callback
//! invocation, while keeping transport and storage concerns outside the
//! domain boundary.

mod error;
mod ids;
mod project;
mod task;

pub use error::{ParseTaskStateError, TaskChainError};
pub use ids::{ProjectId, TaskId};
pub use project::Project;
pub use task::{CompletionCallback, CompletionError, Task, TaskSpec, TaskState};
