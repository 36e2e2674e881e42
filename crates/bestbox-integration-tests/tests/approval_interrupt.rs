//! A write-class tool call interrupts the turn for human approval, then
//! resumes either way once a decision is made (spec §8 scenario 4).

use bestbox_integration_tests::{MockTurn, RuntimeTestHarness};
use bestbox_runtime::TurnOutcome;
use serde_json::json;

#[tokio::test]
async fn send_email_interrupts_then_resumes_on_approval() {
    let harness = RuntimeTestHarness::new(
        vec![MockTurn::router_decision("oa")],
        vec![
            MockTurn::tool_call("oa_send_email", json!({"to": "vendor@example.com", "subject": "PO-0001 follow-up", "body": "Checking on the status of PO-0001."})),
            MockTurn::answer("I've sent the follow-up email to the vendor."),
        ],
    )
    .await;

    let outcome = harness.run_turn("email the vendor asking about PO-0001").await.expect("turn reaches the approval interrupt");

    let (thread_id, turn_id) = match outcome {
        TurnOutcome::AwaitingHuman { thread_id, turn_id, approval } => {
            assert_eq!(approval.tool_name, "oa_send_email");
            (thread_id, turn_id)
        }
        other => panic!("expected AwaitingHuman, got {other:?}"),
    };

    // the specialist hasn't been asked to continue yet
    assert_eq!(harness.specialist_llm.call_count(), 1);

    let resumed = harness.approve(thread_id, turn_id, true).await.expect("approval resumes the turn");
    match resumed {
        TurnOutcome::Done { answer, .. } => assert_eq!(answer, "I've sent the follow-up email to the vendor."),
        other => panic!("expected Done after approval, got {other:?}"),
    }
    assert_eq!(harness.specialist_llm.call_count(), 2);
}

#[tokio::test]
async fn send_email_is_not_sent_when_declined() {
    let harness = RuntimeTestHarness::new(
        vec![MockTurn::router_decision("oa")],
        vec![
            MockTurn::tool_call("oa_send_email", json!({"to": "vendor@example.com", "subject": "PO-0001 follow-up", "body": "Checking on the status of PO-0001."})),
            MockTurn::answer("I did not send the email since you declined."),
        ],
    )
    .await;

    let outcome = harness.run_turn("email the vendor asking about PO-0001").await.expect("turn reaches the approval interrupt");
    let (thread_id, turn_id) = match outcome {
        TurnOutcome::AwaitingHuman { thread_id, turn_id, .. } => (thread_id, turn_id),
        other => panic!("expected AwaitingHuman, got {other:?}"),
    };

    let resumed = harness.approve(thread_id, turn_id, false).await.expect("decline resumes the turn too");
    match resumed {
        TurnOutcome::Done { answer, .. } => assert_eq!(answer, "I did not send the email since you declined."),
        other => panic!("expected Done after decline, got {other:?}"),
    }
}
