//! A contended LLM GPU lease surfaces as `ResourceBusy` instead of letting
//! the call through unscheduled (spec §4.8 C8, §7).

use std::time::Duration;

use bestbox_gpu::GpuClass;
use bestbox_integration_tests::{MockTurn, RuntimeTestHarness};
use bestbox_runtime::RuntimeError;

#[tokio::test]
async fn contended_gpu_fails_the_turn_with_resource_busy() {
    let harness = RuntimeTestHarness::with_gpu(vec![MockTurn::router_decision("erp")], vec![], "gpu-0", Duration::from_millis(30)).await;

    // hold the device's only lease for the whole test so the runtime's own
    // acquire times out.
    let _held = harness.gpu.acquire("gpu-0", GpuClass::OcrVl, 0).await.expect("test can acquire the device first");

    let error = harness.run_turn("how many purchase orders do we have open for V-001?").await.expect_err("a contended GPU must fail the turn, not proceed unscheduled");

    assert!(matches!(error, RuntimeError::ResourceBusy { .. }), "expected ResourceBusy, got {error:?}");
    assert_eq!(harness.router_llm.call_count(), 0, "the router should never have been called while the lease was unavailable");
}
