//! Mold-defect knowledge-base lookup through the hybrid retriever, routed to
//! the `mold` specialist (spec §8 scenario 2).

use std::collections::HashMap;
use std::sync::Arc;

use bestbox_integration_tests::{MockTurn, RuntimeTestHarness};
use bestbox_retriever::{InMemoryVectorStore, KbChunk, VectorStore};
use bestbox_runtime::TurnOutcome;
use serde_json::json;

fn warping_chunk() -> KbChunk {
    let mut sparse_terms = HashMap::new();
    sparse_terms.insert("warping".to_owned(), 1.8);
    sparse_terms.insert("cooling".to_owned(), 1.2);

    KbChunk {
        chunk_id: "chunk-1".to_owned(),
        doc_id: "doc-warp-101".to_owned(),
        text: "Warping on thin-wall parts is usually caused by uneven cooling; balance the mold's cooling channels before adjusting hold pressure.".to_owned(),
        dense_vector: None,
        sparse_terms,
        domain: "mold".to_owned(),
        source: "doc-warp-101".to_owned(),
        org_id: None,
    }
}

#[tokio::test]
async fn mold_query_retrieves_and_cites_a_passage() {
    let store = Arc::new(InMemoryVectorStore::new());
    store.upsert(warping_chunk()).await.expect("seed chunk indexes");

    let harness = RuntimeTestHarness::with_vector_store(
        vec![MockTurn::router_decision("mold")],
        vec![
            MockTurn::tool_call("mold_search_kb", json!({"query": "part is warping after cooling"})),
            MockTurn::answer("Warping is usually an uneven-cooling issue; rebalance the cooling channels before raising hold pressure."),
        ],
        store,
    )
    .await;

    let outcome = harness.run_turn("why does this part keep warping after it cools?").await.expect("turn completes");

    match outcome {
        TurnOutcome::Done { answer, .. } => assert!(answer.contains("cooling")),
        other => panic!("expected Done, got {other:?}"),
    }
}
