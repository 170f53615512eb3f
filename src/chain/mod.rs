//! Task-chain management for Foreman.
//!
//! A project owns an arena of tasks linked into a singly-linked execution
//! chain. The chain has one active head; completing the head task (or any
//! task by identity) advances the head to the completed task's successor.
//! The module is split in the crate's usual shape:
//!
//! - Domain types in [`domain`]
//! - The project registry in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
