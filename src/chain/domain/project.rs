//! Project aggregate: an arena of tasks linked into an execution chain.

use super::{ProjectId, Task, TaskChainError, TaskId, TaskSpec, TaskState};
use crate::instructions::{PromptContext, expand};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;

/// Where a newly created task lands in the chain.
enum Placement {
    /// The task becomes the new head, pointing at `next`.
    Head { next: Option<TaskId> },
    /// The task is spliced in after `predecessor`, pointing at `next`.
    After {
        predecessor: TaskId,
        next: Option<TaskId>,
    },
}

/// Outcome carried by a completion report.
enum Outcome {
    Success(String),
    Failure(String),
}

impl Outcome {
    const fn target_state(&self) -> TaskState {
        match self {
            Self::Success(_) => TaskState::Success,
            Self::Failure(_) => TaskState::Failure,
        }
    }
}

/// An ordered chain of tasks with one active head.
///
/// Tasks live in an identity-keyed arena and reference their successor by
/// identity, so following `next` from the head visits each task at most
/// once and terminates at the none sentinel. All mutating operations
/// assume a single logical caller; hosts exposing a project to concurrent
/// callers must serialize access (see [`crate::tools::ToolRouter`]).
#[derive(Debug)]
pub struct Project {
    id: ProjectId,
    service_name: String,
    tasks: HashMap<TaskId, Task>,
    head: Option<TaskId>,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Creates an empty project.
    ///
    /// The service name is embedded in generated completion prompts so an
    /// external worker knows which tool namespace to report back through.
    #[must_use]
    pub fn new(service_name: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: ProjectId::new(),
            service_name: service_name.into(),
            tasks: HashMap::new(),
            head: None,
            created_at: clock.utc(),
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the tool namespace used in completion prompts.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the identifier of the task at the front of the chain.
    #[must_use]
    pub const fn head(&self) -> Option<TaskId> {
        self.head
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Looks up a task by identity.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Walks the chain from the head to the tail.
    pub fn chain(&self) -> impl Iterator<Item = &Task> {
        std::iter::successors(
            self.head.and_then(|id| self.tasks.get(&id)),
            |task| task.next().and_then(|id| self.tasks.get(&id)),
        )
    }

    /// Creates a pending task and links it into the chain before
    /// `before`.
    ///
    /// With `before == None` the task is appended at the tail (or becomes
    /// the head of an empty chain). A `before` identity that resolves to
    /// the current head or to some task's successor splices the new task
    /// in front of it. A `before` identity that cannot be resolved makes
    /// the new task the head; the chain never acquires a dangling link.
    ///
    /// Completion-prompt tokens in the spec's instructions are expanded
    /// against this project and the new task's identity.
    ///
    /// # Errors
    ///
    /// Returns [`TaskChainError::Prompt`] if prompt rendering fails.
    pub fn insert_task_before(
        &mut self,
        before: Option<TaskId>,
        spec: TaskSpec,
        clock: &impl Clock,
    ) -> Result<&Task, TaskChainError> {
        let task_id = TaskId::new();
        let expanded = {
            let context = PromptContext::new(&self.service_name, self.id, task_id);
            expand(spec.instructions(), &context)?
        };
        let mut task = Task::from_spec(task_id, spec, expanded, clock);

        match self.placement_for(before) {
            Placement::Head { next } => {
                task.set_next(next);
                self.head = Some(task_id);
            }
            Placement::After { predecessor, next } => {
                task.set_next(next);
                if let Some(prev) = self.tasks.get_mut(&predecessor) {
                    prev.set_next(Some(task_id));
                }
            }
        }

        Ok(&*self.tasks.entry(task_id).or_insert(task))
    }

    /// Appends a task at the tail of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`TaskChainError::Prompt`] if prompt rendering fails.
    pub fn push_task(
        &mut self,
        spec: TaskSpec,
        clock: &impl Clock,
    ) -> Result<&Task, TaskChainError> {
        self.insert_task_before(None, spec, clock)
    }

    /// Returns the task at the head of the chain, marking it running.
    ///
    /// A pending head transitions to `Running` as a side effect. Repeated
    /// polling is idempotent: an already-running head is returned as-is,
    /// and a head left terminal by a failed completion callback is also
    /// returned unchanged. Returns `None` when the chain is exhausted.
    pub fn next_task(&mut self, clock: &impl Clock) -> Option<&Task> {
        let head_id = self.head?;
        let task = self.tasks.get_mut(&head_id)?;
        if task.state() == TaskState::Pending {
            task.mark_running(clock);
        }
        Some(&*task)
    }

    /// Records a successful completion report for the task with `id`.
    ///
    /// The task's state, result, and notes are written first; then the
    /// completion callback (if any) runs; only after a successful (or
    /// absent) callback does the head advance to the task's successor.
    /// Returns the newly active task, already transitioned to `Running`,
    /// or `None` when the chain is exhausted. The task does not need to
    /// be at the head: completion is by identity.
    ///
    /// # Errors
    ///
    /// - [`TaskChainError::TaskNotFound`] when `id` does not resolve.
    /// - [`TaskChainError::InvalidStateTransition`] when the task is
    ///   already terminal with no retry pending.
    /// - [`TaskChainError::CallbackFailed`] when the callback reports an
    ///   error; the outcome fields stay written and the head stays put,
    ///   so the report may be retried.
    pub fn set_task_success(
        &mut self,
        id: TaskId,
        result: impl Into<String>,
        notes: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Option<&Task>, TaskChainError> {
        self.complete_task(id, Outcome::Success(result.into()), notes.into(), clock)
    }

    /// Records a failed completion report for the task with `id`.
    ///
    /// Symmetric to [`Self::set_task_success`], storing the error message
    /// instead of a result.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::set_task_success`].
    pub fn set_task_failure(
        &mut self,
        id: TaskId,
        error: impl Into<String>,
        notes: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Option<&Task>, TaskChainError> {
        self.complete_task(id, Outcome::Failure(error.into()), notes.into(), clock)
    }

    /// Replaces a task's instruction text, re-expanding prompt tokens.
    ///
    /// # Errors
    ///
    /// Returns [`TaskChainError::TaskNotFound`] when `id` does not
    /// resolve, or [`TaskChainError::Prompt`] if rendering fails.
    pub fn update_task_instructions(
        &mut self,
        id: TaskId,
        instructions: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<&Task, TaskChainError> {
        let expanded = {
            let context = PromptContext::new(&self.service_name, self.id, id);
            expand(&instructions.into(), &context)?
        };
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or(TaskChainError::TaskNotFound(id))?;
        task.set_instructions(expanded, clock);
        Ok(&*task)
    }

    fn placement_for(&self, before: Option<TaskId>) -> Placement {
        match before {
            Some(before_id) if self.head == Some(before_id) => Placement::Head {
                next: Some(before_id),
            },
            Some(before_id) => self
                .chain()
                .find(|task| task.next() == Some(before_id))
                .map(Task::id)
                // Unresolvable references fall back to insert-at-head
                // rather than leaving a dangling link.
                .map_or(Placement::Head { next: self.head }, |predecessor| {
                    Placement::After {
                        predecessor,
                        next: Some(before_id),
                    }
                }),
            None => self
                .chain()
                .last()
                .map(Task::id)
                .map_or(Placement::Head { next: None }, |tail| Placement::After {
                    predecessor: tail,
                    next: None,
                }),
        }
    }

    fn complete_task(
        &mut self,
        id: TaskId,
        outcome: Outcome,
        notes: String,
        clock: &impl Clock,
    ) -> Result<Option<&Task>, TaskChainError> {
        let target = outcome.target_state();
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or(TaskChainError::TaskNotFound(id))?;

        // A report rejected by a failing callback may be retried: the
        // task is already terminal in the target state with its callback
        // still armed.
        let is_retry = task.state() == target && task.has_pending_callback();
        if !is_retry && !task.state().can_transition_to(target) {
            return Err(TaskChainError::InvalidStateTransition {
                task_id: id,
                from: task.state(),
                to: target,
            });
        }

        match outcome {
            Outcome::Success(result) => task.record_success(result, notes, clock),
            Outcome::Failure(error) => task.record_failure(error, notes, clock),
        }

        let successor = task.next();
        if let Some(mut callback) = task.take_callback() {
            if let Err(source) = callback(&*task) {
                task.restore_callback(callback);
                return Err(TaskChainError::CallbackFailed {
                    task_id: id,
                    source,
                });
            }
        }

        self.head = successor;
        Ok(self.next_task(clock))
    }
}
