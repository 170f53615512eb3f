//! Unit tests for chain insertion and link integrity.

use crate::chain::domain::{Project, TaskChainError, TaskId, TaskSpec};
use crate::instructions::SUCCESS_PROMPT_TOKEN;
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::collections::HashSet;

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[fixture]
fn project(clock: DefaultClock) -> Project {
    Project::new("foreman", &clock)
}

fn chain_titles(project: &Project) -> Vec<String> {
    project.chain().map(|task| task.title().to_owned()).collect()
}

#[rstest]
fn insert_into_empty_chain_becomes_head(mut project: Project, clock: DefaultClock) -> eyre::Result<()> {
    let task_id = project
        .insert_task_before(None, TaskSpec::new("only"), &clock)?
        .id();

    ensure!(project.head() == Some(task_id));
    ensure!(project.task(task_id).is_some_and(|task| task.next().is_none()));
    Ok(())
}

#[rstest]
fn push_task_appends_in_insertion_order(
    mut project: Project,
    clock: DefaultClock,
) -> eyre::Result<()> {
    project.push_task(TaskSpec::new("first"), &clock)?;
    project.push_task(TaskSpec::new("second"), &clock)?;
    project.push_task(TaskSpec::new("third"), &clock)?;

    ensure!(chain_titles(&project) == ["first", "second", "third"]);
    Ok(())
}

#[rstest]
fn insert_before_head_becomes_new_head(
    mut project: Project,
    clock: DefaultClock,
) -> eyre::Result<()> {
    let old_head = project.push_task(TaskSpec::new("original"), &clock)?.id();
    let new_head = project
        .insert_task_before(Some(old_head), TaskSpec::new("prepended"), &clock)?
        .id();

    ensure!(project.head() == Some(new_head));
    ensure!(project.task(new_head).is_some_and(|task| task.next() == Some(old_head)));
    ensure!(chain_titles(&project) == ["prepended", "original"]);
    Ok(())
}

#[rstest]
fn insert_before_mid_task_splices_link(
    mut project: Project,
    clock: DefaultClock,
) -> eyre::Result<()> {
    project.push_task(TaskSpec::new("first"), &clock)?;
    let second = project.push_task(TaskSpec::new("second"), &clock)?.id();
    project.insert_task_before(Some(second), TaskSpec::new("between"), &clock)?;

    ensure!(chain_titles(&project) == ["first", "between", "second"]);
    Ok(())
}

#[rstest]
fn insert_before_unknown_id_falls_back_to_head(
    mut project: Project,
    clock: DefaultClock,
) -> eyre::Result<()> {
    let existing = project.push_task(TaskSpec::new("existing"), &clock)?.id();
    let inserted = project
        .insert_task_before(Some(TaskId::new()), TaskSpec::new("orphan-ref"), &clock)?
        .id();

    // Documented policy: unresolvable references insert at the head, so
    // the chain stays fully linked with no dangling successor.
    ensure!(project.head() == Some(inserted));
    ensure!(project.task(inserted).is_some_and(|task| task.next() == Some(existing)));
    ensure!(chain_titles(&project) == ["orphan-ref", "existing"]);
    Ok(())
}

#[rstest]
fn chain_walk_visits_each_task_once_and_terminates(
    mut project: Project,
    clock: DefaultClock,
) -> eyre::Result<()> {
    let a = project.push_task(TaskSpec::new("a"), &clock)?.id();
    let b = project.push_task(TaskSpec::new("b"), &clock)?.id();
    let c = project
        .insert_task_before(Some(b), TaskSpec::new("c"), &clock)?
        .id();
    let d = project
        .insert_task_before(Some(TaskId::new()), TaskSpec::new("d"), &clock)?
        .id();
    let inserted = [a, b, c, d];

    let visited: Vec<TaskId> = project.chain().map(|task| task.id()).collect();
    let unique: HashSet<TaskId> = visited.iter().copied().collect();
    ensure!(visited.len() == inserted.len());
    ensure!(unique.len() == visited.len());
    ensure!(project.chain().last().is_some_and(|tail| tail.next().is_none()));
    Ok(())
}

#[rstest]
fn insert_expands_success_prompt_token(mut project: Project, clock: DefaultClock) {
    let project_id = project.id();
    let task = project
        .push_task(
            TaskSpec::new("templated").with_instructions("Do it. {SUCCESS_PROMPT}"),
            &clock,
        )
        .expect("insertion should succeed");

    assert!(!task.instructions().contains(SUCCESS_PROMPT_TOKEN));
    assert!(task.instructions().contains("foreman.set_task_success"));
    assert!(task.instructions().contains(&project_id.to_string()));
    assert!(task.instructions().contains(&task.id().to_string()));
}

#[rstest]
fn update_task_instructions_reexpands_tokens(
    mut project: Project,
    clock: DefaultClock,
) -> eyre::Result<()> {
    let task_id = project.push_task(TaskSpec::new("plain"), &clock)?.id();
    let updated = project.update_task_instructions(task_id, "{FAILURE_PROMPT}", &clock)?;

    ensure!(updated.instructions().contains("foreman.set_task_failure"));
    ensure!(updated.instructions().contains(&task_id.to_string()));
    Ok(())
}

#[rstest]
fn update_task_instructions_rejects_unknown_task(mut project: Project, clock: DefaultClock) {
    let result = project.update_task_instructions(TaskId::new(), "text", &clock);
    assert!(matches!(result, Err(TaskChainError::TaskNotFound(_))));
}
