//! A single read-class tool call answered in one specialist round-trip
//! (spec §8 scenario 1).

use bestbox_integration_tests::{MockTurn, RuntimeTestHarness};
use bestbox_runtime::TurnOutcome;
use serde_json::json;

#[tokio::test]
async fn erp_purchase_order_count_completes_in_one_turn() {
    let harness = RuntimeTestHarness::new(
        vec![MockTurn::router_decision("erp")],
        vec![MockTurn::tool_call("erp_count_purchase_orders", json!({"vendor": "V-001"})), MockTurn::answer("There are 3 open purchase orders for V-001.")],
    )
    .await;

    let outcome = harness.run_turn("how many purchase orders do we have open for V-001?").await.expect("turn completes");

    match outcome {
        TurnOutcome::Done { answer, .. } => assert_eq!(answer, "There are 3 open purchase orders for V-001."),
        other => panic!("expected Done, got {other:?}"),
    }

    assert_eq!(harness.router_llm.call_count(), 1);
    assert_eq!(harness.specialist_llm.call_count(), 2);
}
