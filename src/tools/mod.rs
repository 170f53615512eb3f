//! Tool-invocation facade over the chain engine.
//!
//! Exposes the engine's operations as typed tool calls: argument and
//! response payloads with a stable wire shape, and a router that owns the
//! project registry behind a lock so concurrent tool invocations cannot
//! interleave mutations on a project. Protocol framing and transport stay
//! with the host.

mod payloads;
mod router;

pub use payloads::{
    ErrorResponse, NextTask, NextTaskArgs, SetTaskFailureArgs, SetTaskSuccessArgs,
    StartProjectResponse, TaskResponse,
};
pub use router::{ToolError, ToolRouter};
