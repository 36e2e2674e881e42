//! Restarting (or reconnecting) while a turn is `awaiting_human` replays the
//! same interrupt from its checkpoint instead of re-invoking the model or
//! the tool call a second time (spec §8 scenario 6).

use bestbox_integration_tests::{MockTurn, RuntimeTestHarness};
use bestbox_runtime::TurnOutcome;
use serde_json::json;

#[tokio::test]
async fn resuming_an_awaiting_human_turn_does_not_replay_the_model_call() {
    let harness = RuntimeTestHarness::new(
        vec![MockTurn::router_decision("oa")],
        vec![MockTurn::tool_call("oa_send_email", json!({"to": "ops@example.com", "subject": "urgent", "body": "please advise"}))],
    )
    .await;

    let outcome = harness.run_turn("send an urgent email to ops").await.expect("turn interrupts for approval");
    let (thread_id, turn_id, first_summary) = match outcome {
        TurnOutcome::AwaitingHuman { thread_id, turn_id, approval } => (thread_id, turn_id, approval.summary),
        other => panic!("expected AwaitingHuman, got {other:?}"),
    };

    assert_eq!(harness.router_llm.call_count(), 1);
    assert_eq!(harness.specialist_llm.call_count(), 1);

    // simulates the daemon restarting (or a second client polling) before
    // the approval decision is made: resuming must hand back the exact
    // same pending approval, consuming no further model calls.
    let resumed = harness.resume(thread_id, turn_id).await.expect("resume replays the checkpointed interrupt");
    match resumed {
        TurnOutcome::AwaitingHuman { approval, .. } => assert_eq!(approval.summary, first_summary),
        other => panic!("expected AwaitingHuman again, got {other:?}"),
    }

    assert_eq!(harness.router_llm.call_count(), 1);
    assert_eq!(harness.specialist_llm.call_count(), 1);
}
