//! End-to-end tests driving the chain engine through the tool facade.

use foreman::chain::domain::{ProjectId, TaskChainError, TaskSpec};
use foreman::tools::{
    ErrorResponse, NextTaskArgs, SetTaskFailureArgs, SetTaskSuccessArgs, TaskResponse, ToolError,
    ToolRouter,
};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn router() -> ToolRouter {
    ToolRouter::new("foreman")
}

/// Seeds a two-task project and returns its identity.
fn seed_project(router: &ToolRouter) -> ProjectId {
    let project_id = router
        .start_project()
        .expect("project creation should succeed")
        .project_id;
    let registry = router.registry();
    let mut guard = registry.lock().expect("registry lock");
    let project = guard
        .project_mut(project_id)
        .expect("freshly created project should resolve");
    project
        .push_task(
            TaskSpec::new("first").with_instructions("Compile the code. {SUCCESS_PROMPT}"),
            &mockable::DefaultClock,
        )
        .expect("task insertion should succeed");
    project
        .push_task(
            TaskSpec::new("second").with_instructions("Run the tests. {FAILURE_PROMPT}"),
            &mockable::DefaultClock,
        )
        .expect("task insertion should succeed");
    project_id
}

#[rstest]
fn tool_calls_drive_the_chain_to_exhaustion(router: ToolRouter) {
    let project_id = seed_project(&router);

    let first = router
        .next_task(&NextTaskArgs { project_id })
        .expect("polling should succeed")
        .next_task
        .expect("first task should be available");
    assert_eq!(first.title, "first");
    assert!(first.instructions.contains("foreman.set_task_success"));
    assert!(first.instructions.contains(&project_id.to_string()));
    assert!(!first.instructions.contains("{SUCCESS_PROMPT}"));

    let second = router
        .set_task_success(SetTaskSuccessArgs {
            project_id,
            task_id: first.id,
            result: "compiled".to_owned(),
            notes: String::new(),
        })
        .expect("success report should be accepted")
        .next_task
        .expect("second task should follow the first");
    assert_eq!(second.title, "second");
    assert!(second.instructions.contains("foreman.set_task_failure"));

    let exhausted = router
        .set_task_failure(SetTaskFailureArgs {
            project_id,
            task_id: second.id,
            error: "tests are red".to_owned(),
            notes: "flaky suite".to_owned(),
        })
        .expect("failure report should be accepted");
    assert_eq!(exhausted.next_task, None);
}

#[rstest]
fn unknown_project_reports_not_found(router: ToolRouter) {
    let result = router.next_task(&NextTaskArgs {
        project_id: ProjectId::new(),
    });
    assert!(matches!(result, Err(ToolError::Registry(_))));
}

#[rstest]
fn unknown_task_reports_not_found(router: ToolRouter) {
    let project_id = router
        .start_project()
        .expect("project creation should succeed")
        .project_id;

    let result = router.set_task_success(SetTaskSuccessArgs {
        project_id,
        task_id: foreman::chain::domain::TaskId::new(),
        result: "ok".to_owned(),
        notes: String::new(),
    });
    assert!(matches!(
        result,
        Err(ToolError::Chain(TaskChainError::TaskNotFound(_)))
    ));
}

#[rstest]
fn callback_failure_surfaces_through_the_facade(router: ToolRouter) {
    let project_id = router
        .start_project()
        .expect("project creation should succeed")
        .project_id;
    let task_id = {
        let registry = router.registry();
        let mut guard = registry.lock().expect("registry lock");
        let project = guard
            .project_mut(project_id)
            .expect("project should resolve");
        project
            .push_task(
                TaskSpec::new("guarded").on_complete(|_task| Err("verification failed".into())),
                &mockable::DefaultClock,
            )
            .expect("task insertion should succeed")
            .id()
    };

    let result = router.set_task_success(SetTaskSuccessArgs {
        project_id,
        task_id,
        result: "done".to_owned(),
        notes: String::new(),
    });
    let error = match result {
        Err(tool_error @ ToolError::Chain(TaskChainError::CallbackFailed { .. })) => tool_error,
        other => panic!("expected a callback failure, got {other:?}"),
    };

    let payload = serde_json::to_value(ErrorResponse::new(&error)).expect("serializable payload");
    assert!(
        payload["error"]
            .as_str()
            .is_some_and(|message| message.contains("callback"))
    );

    // The task stays at the head so the report can be retried.
    let retry_target = router
        .next_task(&NextTaskArgs { project_id })
        .expect("polling should succeed")
        .next_task
        .expect("task should still be at the head");
    assert_eq!(retry_target.id, task_id);
}

#[rstest]
fn task_response_wire_shape_matches_contract(router: ToolRouter) {
    let project_id = seed_project(&router);

    let response = router
        .next_task(&NextTaskArgs { project_id })
        .expect("polling should succeed");
    let value = serde_json::to_value(&response).expect("serializable response");
    let next = &value["next_task"];
    assert!(next["id"].is_string());
    assert_eq!(next["title"], json!("first"));
    assert!(next["instructions"].is_string());
    // Empty auxiliary data is omitted from the wire form.
    assert!(next.get("data").is_none());

    let empty = serde_json::to_value(TaskResponse { next_task: None }).expect("serializable");
    assert_eq!(empty, json!({ "next_task": null }));
}
