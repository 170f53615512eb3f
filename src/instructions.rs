//! Completion-prompt expansion for task instructions.
//!
//! Task instruction text may carry two reserved placeholder tokens. At
//! insertion time (and whenever instructions are reassigned) each token
//! is replaced with rendered text telling the external worker how to
//! report success or failure for that specific task through the tool
//! interface. Substitution is literal: every occurrence is replaced, no
//! escaping is applied, the rendered text is not re-scanned for tokens,
//! and instructions without tokens pass through untouched.

use crate::chain::domain::{ProjectId, TaskId};
use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

/// Token expanded into the success-report prompt.
pub const SUCCESS_PROMPT_TOKEN: &str = "{SUCCESS_PROMPT}";

/// Token expanded into the failure-report prompt.
pub const FAILURE_PROMPT_TOKEN: &str = "{FAILURE_PROMPT}";

const SUCCESS_PROMPT_TEMPLATE: &str = "\
To mark this task as successful, call the {{ service }}.set_task_success tool with \
project_id=\"{{ project_id }}\", task_id=\"{{ task_id }}\", \
result=\"<your result>\" and optionally notes=\"<additional notes>\".";

const FAILURE_PROMPT_TEMPLATE: &str = "\
To mark this task as failed, call the {{ service }}.set_task_failure tool with \
project_id=\"{{ project_id }}\", task_id=\"{{ task_id }}\", \
error=\"<error message>\" and optionally notes=\"<additional notes>\".";

/// Error returned when a completion prompt fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render completion prompt: {0}")]
pub struct PromptRenderError(pub String);

/// Identity context rendered into completion prompts.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext<'a> {
    service: &'a str,
    project_id: ProjectId,
    task_id: TaskId,
}

impl<'a> PromptContext<'a> {
    /// Creates a context for the given service namespace and identities.
    #[must_use]
    pub const fn new(service: &'a str, project_id: ProjectId, task_id: TaskId) -> Self {
        Self {
            service,
            project_id,
            task_id,
        }
    }
}

/// Expands the reserved prompt tokens in `instructions`.
///
/// # Errors
///
/// Returns [`PromptRenderError`] if a prompt template fails to render.
pub fn expand(
    instructions: &str,
    context: &PromptContext<'_>,
) -> Result<String, PromptRenderError> {
    let mut expanded = instructions.to_owned();
    if expanded.contains(SUCCESS_PROMPT_TOKEN) {
        let prompt = render(SUCCESS_PROMPT_TEMPLATE, context)?;
        expanded = expanded.replace(SUCCESS_PROMPT_TOKEN, &prompt);
    }
    if expanded.contains(FAILURE_PROMPT_TOKEN) {
        let prompt = render(FAILURE_PROMPT_TEMPLATE, context)?;
        expanded = expanded.replace(FAILURE_PROMPT_TOKEN, &prompt);
    }
    Ok(expanded)
}

fn render(template: &str, context: &PromptContext<'_>) -> Result<String, PromptRenderError> {
    let environment = Environment::new();
    environment
        .render_str(template, context)
        .map_err(|error| PromptRenderError(error.to_string()))
}
