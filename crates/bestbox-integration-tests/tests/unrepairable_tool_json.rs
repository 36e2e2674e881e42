//! Unrepairable tool-call JSON degrades to a corrective re-prompt instead of
//! failing the turn (spec §4.4 point 2, §8).

use bestbox_integration_tests::{MockTurn, RuntimeTestHarness};
use bestbox_runtime::TurnOutcome;

#[tokio::test]
async fn unrepairable_json_gets_one_corrective_reprompt_then_answers() {
    let harness = RuntimeTestHarness::new(
        vec![MockTurn::router_decision("erp")],
        vec![MockTurn::UnrepairableToolCall, MockTurn::answer("There are 3 open purchase orders for V-001.")],
    )
    .await;

    let outcome = harness.run_turn("how many purchase orders do we have open for V-001?").await.expect("turn completes after the corrective re-prompt");

    match outcome {
        TurnOutcome::Done { answer, .. } => assert_eq!(answer, "There are 3 open purchase orders for V-001."),
        other => panic!("expected Done, got {other:?}"),
    }

    // one wasted turn for the unrepairable call, one more for the re-prompted answer
    assert_eq!(harness.specialist_llm.call_count(), 2);
}

#[tokio::test]
async fn a_second_unrepairable_response_falls_through_to_a_final_answer() {
    // only one corrective re-prompt is allowed per turn; a repeat failure
    // must not loop forever.
    let harness = RuntimeTestHarness::new(vec![MockTurn::router_decision("erp")], vec![MockTurn::UnrepairableToolCall, MockTurn::UnrepairableToolCall]).await;

    let outcome = harness.run_turn("how many purchase orders do we have open for V-001?").await.expect("turn completes instead of looping");

    match outcome {
        TurnOutcome::Done { .. } => {}
        other => panic!("expected Done, got {other:?}"),
    }
    assert_eq!(harness.specialist_llm.call_count(), 2);
}
