//! Unit tests for the chain module.

mod chain_tests;
mod registry_tests;
