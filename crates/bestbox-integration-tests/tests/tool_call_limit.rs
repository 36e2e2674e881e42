//! Hitting `max_tool_calls_per_turn` forces a final answer instead of
//! failing the turn (spec §8 scenario 5).

use bestbox_config::LimitsSection;
use bestbox_integration_tests::{MockTurn, RuntimeTestHarness};
use bestbox_runtime::TurnOutcome;
use serde_json::json;

#[tokio::test]
async fn exhausting_the_tool_call_budget_forces_an_answer() {
    let limits = LimitsSection { max_tool_calls_per_turn: 2, ..LimitsSection::default() };

    // two tool calls exhaust the budget, then the forced re-prompt (with no
    // tools offered) is the third and final specialist turn.
    let harness = RuntimeTestHarness::with_limits(
        vec![MockTurn::router_decision("crm")],
        vec![
            MockTurn::tool_call("crm_lookup_account", json!({"account": "Acme"})),
            MockTurn::tool_call("crm_list_open_cases", json!({"account": "Acme"})),
            MockTurn::answer("Based on what I already looked up, Acme is a gold-tier account with no open cases."),
        ],
        limits,
    )
    .await;

    let outcome = harness.run_turn("give me a full account summary for Acme, checking every case history you can find").await.expect("turn completes via forced answer");

    match outcome {
        TurnOutcome::Done { answer, .. } => assert!(answer.contains("gold-tier")),
        other => panic!("expected Done via forced answer, got {other:?}"),
    }
    assert_eq!(harness.specialist_llm.call_count(), 3);
}
