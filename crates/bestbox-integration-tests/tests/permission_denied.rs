//! A tool call against a permission the caller lacks resolves as a
//! recoverable tool-level error fed back to the model, not a hard failure
//! (spec §8 scenario 3).

use bestbox_core::model::{PermissionTag, UserContext};
use bestbox_integration_tests::{fully_permissioned_user, MockTurn, RuntimeTestHarness};
use bestbox_runtime::TurnOutcome;
use serde_json::json;

fn user_without_finance_read() -> UserContext {
    let mut user = fully_permissioned_user();
    user.permissions.remove(&PermissionTag::new("finance:read"));
    user
}

#[tokio::test]
async fn denied_tool_call_is_recoverable_not_fatal() {
    let harness = RuntimeTestHarness::new(
        vec![MockTurn::router_decision("erp")],
        vec![MockTurn::tool_call("erp_finance_summary", json!({"period": "q3"})), MockTurn::answer("I don't have permission to pull financial summaries for your account.")],
    )
    .await;

    let outcome = harness.run_turn_as("what was our revenue last quarter?", user_without_finance_read()).await.expect("turn completes despite the denied tool call");

    match outcome {
        TurnOutcome::Done { answer, .. } => assert!(answer.contains("permission")),
        other => panic!("expected Done (recoverable), got {other:?}"),
    }

    // the model got a second turn to respond to the denial instead of the
    // runtime failing the turn outright
    assert_eq!(harness.specialist_llm.call_count(), 2);
}
