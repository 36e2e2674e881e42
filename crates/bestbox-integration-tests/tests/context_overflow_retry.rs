//! A context-overflow response triggers one aggressive-compaction retry
//! before the turn is allowed to fail (spec §7).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bestbox_adapters::AdapterRegistry;
use bestbox_audit::{AuditLog, KvAuditStorage};
use bestbox_checkpoint::Checkpointer;
use bestbox_config::{ContextSection, IntegrationSection, LimitsSection};
use bestbox_context::ContextManager;
use bestbox_gpu::GpuScheduler;
use bestbox_integration_tests::{fully_permissioned_user, MockTurn};
use bestbox_llm::{LlmError, LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message, StopReason, StreamBox, Usage};
use bestbox_retriever::{HybridRetriever, InMemoryVectorStore, Lexicon};
use bestbox_runtime::{AgentRuntime, NullObserver, ThreadStore, TurnOutcome};
use bestbox_storage::{Database, MemoryKvStore};

/// Fails the first `complete()` call with `ContextOverflow`, then answers
/// normally — simulates a request that only fits once the retry compacts
/// more aggressively.
struct FlakyContextProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for FlakyContextProvider {
    fn name(&self) -> &str {
        "flaky-context"
    }
    fn model(&self) -> &str {
        "flaky-context-model"
    }
    fn max_context_length(&self) -> usize {
        32_000
    }
    async fn stream(&self, _messages: &[Message], _tools: &[LlmToolDefinition], _system: &str) -> LlmResult<StreamBox> {
        unimplemented!("not exercised by this test")
    }
    async fn complete(&self, _messages: &[Message], _tools: &[LlmToolDefinition], _system: &str) -> LlmResult<LlmResponse> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(LlmError::ContextOverflow { current: 40_000, max: 32_000 });
        }
        Ok(LlmResponse {
            message: Message::assistant("There are 3 open purchase orders for V-001."),
            has_tool_calls: false,
            stop_reason: StopReason::EndTurn,
            usage: Usage { input_tokens: 10, output_tokens: 10 },
            reasoning: None,
            tool_call_repair_failed: false,
        })
    }
}

async fn runtime_with_flaky_specialist() -> (AgentRuntime, Arc<FlakyContextProvider>) {
    let router_llm = Arc::new(bestbox_integration_tests::MockLlmProvider::new(vec![MockTurn::router_decision("erp")]));
    let specialist = Arc::new(FlakyContextProvider { calls: AtomicUsize::new(0) });

    let router_dyn: Arc<dyn LlmProvider> = router_llm;
    let specialist_dyn: Arc<dyn LlmProvider> = specialist.clone();

    let domains: HashMap<String, IntegrationSection> = [("erp".to_owned(), IntegrationSection { backend: "demo-stub".to_owned(), url: String::new(), auth_env: None, allowlist: Vec::new() })].into();
    let adapters = Arc::new(AdapterRegistry::build(&domains));
    let retriever = Arc::new(HybridRetriever::new(Arc::new(InMemoryVectorStore::new()), None, None, Lexicon::mold_defaults()));
    let context = Arc::new(ContextManager::new(specialist_dyn.clone(), ContextSection::default(), 32_000));

    let db = Database::connect_memory().await.expect("in-memory surrealdb connects");
    let checkpointer = Arc::new(Checkpointer::new(db.clone()));
    let threads = Arc::new(ThreadStore::new(db));
    let audit = AuditLog::spawn(Arc::new(KvAuditStorage::new(Arc::new(MemoryKvStore::new()))));
    let gpu = Arc::new(GpuScheduler::new());

    let runtime = AgentRuntime::new(
        specialist_dyn,
        router_dyn,
        adapters,
        retriever,
        context,
        checkpointer,
        audit,
        threads,
        gpu,
        Lexicon::mold_defaults(),
        LimitsSection::default(),
        None,
        Duration::from_secs(5),
    );

    (runtime, specialist)
}

#[tokio::test]
async fn context_overflow_recovers_via_aggressive_compaction_retry() {
    let (runtime, specialist) = runtime_with_flaky_specialist().await;

    let outcome = runtime
        .run_turn(None, "how many purchase orders do we have open for V-001?", fully_permissioned_user(), &NullObserver)
        .await
        .expect("the retry recovers the turn instead of failing it");

    match outcome {
        TurnOutcome::Done { answer, .. } => assert_eq!(answer, "There are 3 open purchase orders for V-001."),
        other => panic!("expected Done, got {other:?}"),
    }
    assert_eq!(specialist.calls.load(Ordering::SeqCst), 2, "expected exactly one retry after the context-overflow response");
}
