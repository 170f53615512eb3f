//! Unit tests for the project registry.

use crate::chain::domain::ProjectId;
use crate::chain::services::{ProjectRegistry, RegistryError};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[fixture]
fn registry() -> ProjectRegistry {
    ProjectRegistry::new("foreman")
}

#[rstest]
fn add_project_registers_an_empty_chain(mut registry: ProjectRegistry, clock: DefaultClock) {
    let project_id = registry.add_project(&clock).id();

    let project = registry
        .project(project_id)
        .expect("registered project should resolve");
    assert_eq!(project.id(), project_id);
    assert!(project.head().is_none());
    assert_eq!(project.service_name(), "foreman");
}

#[rstest]
fn add_project_generates_distinct_identities(mut registry: ProjectRegistry, clock: DefaultClock) {
    let first = registry.add_project(&clock).id();
    let second = registry.add_project(&clock).id();
    assert_ne!(first, second);
}

#[rstest]
fn unknown_project_is_not_found(registry: ProjectRegistry) {
    let missing = ProjectId::new();
    assert_eq!(
        registry.project(missing).map(|project| project.id()),
        Err(RegistryError::ProjectNotFound(missing))
    );
}
