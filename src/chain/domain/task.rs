//! Task aggregate and lifecycle state machine.

use super::{ParseTaskStateError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Error type returned by completion callbacks.
pub type CompletionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Caller-supplied callback invoked when a task reaches a terminal state.
///
/// The callback observes the task after its outcome fields have been
/// written. It is dropped after its first successful invocation; a failed
/// invocation stays armed so a retried completion report can re-run it.
pub type CompletionCallback = Box<dyn FnMut(&Task) -> Result<(), CompletionError> + Send>;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task has been created but not yet handed to a worker.
    Pending,
    /// Task has been handed to a worker and awaits its report.
    Running,
    /// Task completed successfully.
    Success,
    /// Task failed.
    Failure,
}

impl TaskState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Returns whether the lifecycle permits moving from `self` to `to`.
    ///
    /// A pending task may enter a terminal state directly: completion by
    /// identity does not require the task to have been polled first.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Running | Self::Success | Self::Failure)
                | (Self::Running, Self::Success | Self::Failure)
        )
    }

    /// Returns whether this state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Specification for a task to be inserted into a project chain.
///
/// Built with the `with_*` methods and consumed by
/// [`Project::insert_task_before`](super::Project::insert_task_before).
pub struct TaskSpec {
    title: String,
    instructions: String,
    data: BTreeMap<String, Value>,
    on_complete: Option<CompletionCallback>,
}

impl TaskSpec {
    /// Creates a specification with the given title and no instructions.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            instructions: String::new(),
            data: BTreeMap::new(),
            on_complete: None,
        }
    }

    /// Sets the instruction text handed to the worker.
    ///
    /// Occurrences of the reserved completion-prompt tokens are expanded
    /// at insertion time; see [`crate::instructions`].
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Attaches an auxiliary data entry carried alongside the task.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Sets the completion callback fired when the task reaches a
    /// terminal state.
    #[must_use]
    pub fn on_complete(
        mut self,
        callback: impl FnMut(&Task) -> Result<(), CompletionError> + Send + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the raw, unexpanded instruction text.
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("title", &self.title)
            .field("instructions", &self.instructions)
            .field("data", &self.data)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// A single unit of external work tracked by the engine.
pub struct Task {
    id: TaskId,
    title: String,
    instructions: String,
    data: BTreeMap<String, Value>,
    state: TaskState,
    result: Option<String>,
    error: Option<String>,
    notes: Option<String>,
    next: Option<TaskId>,
    on_complete: Option<CompletionCallback>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a pending task from a consumed spec and already-expanded
    /// instruction text.
    pub(crate) fn from_spec(
        id: TaskId,
        spec: TaskSpec,
        instructions: String,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            title: spec.title,
            instructions,
            data: spec.data,
            state: TaskState::Pending,
            result: None,
            error: None,
            notes: None,
            next: None,
            on_complete: spec.on_complete,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the instruction text with completion prompts expanded.
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Returns the auxiliary data entries.
    #[must_use]
    pub const fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    /// Returns the task lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the result reported on success.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Returns the error message reported on failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the notes attached to the completion report.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the identifier of the successor task in the chain.
    #[must_use]
    pub const fn next(&self) -> Option<TaskId> {
        self.next
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether a completion callback is still armed.
    #[must_use]
    pub const fn has_pending_callback(&self) -> bool {
        self.on_complete.is_some()
    }

    pub(crate) fn set_next(&mut self, next: Option<TaskId>) {
        self.next = next;
    }

    pub(crate) fn set_instructions(&mut self, instructions: String, clock: &impl Clock) {
        self.instructions = instructions;
        self.touch(clock);
    }

    pub(crate) fn mark_running(&mut self, clock: &impl Clock) {
        self.state = TaskState::Running;
        self.touch(clock);
    }

    pub(crate) fn record_success(&mut self, result: String, notes: String, clock: &impl Clock) {
        self.state = TaskState::Success;
        self.result = Some(result);
        self.notes = Some(notes);
        self.touch(clock);
    }

    pub(crate) fn record_failure(&mut self, error: String, notes: String, clock: &impl Clock) {
        self.state = TaskState::Failure;
        self.error = Some(error);
        self.notes = Some(notes);
        self.touch(clock);
    }

    pub(crate) fn take_callback(&mut self) -> Option<CompletionCallback> {
        self.on_complete.take()
    }

    pub(crate) fn restore_callback(&mut self, callback: CompletionCallback) {
        self.on_complete = Some(callback);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("instructions", &self.instructions)
            .field("data", &self.data)
            .field("state", &self.state)
            .field("result", &self.result)
            .field("error", &self.error)
            .field("notes", &self.notes)
            .field("next", &self.next)
            .field("on_complete", &self.on_complete.is_some())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
