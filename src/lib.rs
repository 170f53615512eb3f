//! Foreman: linear task-chain orchestration for automated workers.
//!
//! This crate models a project as an ordered chain of discrete work items
//! that an external worker (typically an LLM agent) executes one at a
//! time. The worker pulls the next task, performs the described work
//! out-of-band, and reports success or failure back to the engine, which
//! fires the task's completion callback and advances the chain.
//!
//! # Architecture
//!
//! - **Domain**: the task state machine and project chain, free of
//!   infrastructure concerns
//! - **Services**: the project registry that owns all live projects
//! - **Tools**: a transport-agnostic facade exposing the engine's
//!   operations as typed tool calls
//!
//! # Modules
//!
//! - [`chain`]: task and project aggregates, state transitions, registry
//! - [`instructions`]: placeholder expansion for completion prompts
//! - [`tools`]: typed request/response payloads and the tool router

pub mod chain;
pub mod instructions;
pub mod tools;
