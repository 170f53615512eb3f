//! Service layer for the chain module.

mod registry;

pub use registry::{ProjectRegistry, RegistryError};
