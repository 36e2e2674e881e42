//! [`RuntimeTestHarness`]: wires a complete in-memory [`AgentRuntime`] for
//! scenario tests, the way `RuntimeTestHarness` in the teacher's own
//! integration-test crate wires an in-memory runtime from a `TempDir` and a
//! scripted LLM.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bestbox_adapters::AdapterRegistry;
use bestbox_audit::{AuditLog, KvAuditStorage};
use bestbox_checkpoint::Checkpointer;
use bestbox_config::{ContextSection, IntegrationSection, LimitsSection};
use bestbox_context::ContextManager;
use bestbox_core::ids::{ThreadId, TurnId};
use bestbox_core::model::{PermissionTag, UserContext};
use bestbox_gpu::GpuScheduler;
use bestbox_llm::LlmProvider;
use bestbox_retriever::{HybridRetriever, InMemoryVectorStore, Lexicon};
use bestbox_runtime::{AgentRuntime, NullObserver, ThreadStore, TurnOutcome};
use bestbox_storage::{Database, MemoryKvStore};

use crate::mock_llm::{MockLlmProvider, MockTurn};

/// The domains BestBox's demo deployment wires every scenario test against.
const DOMAINS: &[&str] = &["erp", "crm", "it", "oa", "finance"];

fn demo_integrations() -> HashMap<String, IntegrationSection> {
    DOMAINS.iter().map(|domain| ((*domain).to_owned(), IntegrationSection { backend: "demo-stub".to_owned(), url: String::new(), auth_env: None, allowlist: Vec::new() })).collect()
}

/// Caller identity with every permission tag BestBox's tool catalog checks
/// for, so scenario tests opt a caller *out* of a permission explicitly
/// rather than having to opt every other one in.
#[must_use]
pub fn fully_permissioned_user() -> UserContext {
    let permissions = ["erp:read", "finance:read", "crm:read", "it:read", "oa:read", "oa:write"].into_iter().map(PermissionTag::new).collect();
    UserContext { user_id: "test-user".to_owned(), org_id: Some("test-org".to_owned()), roles: vec!["agent".to_owned()], permissions }
}

/// A fully wired, in-memory [`AgentRuntime`] plus the scripted router and
/// specialist providers backing it, so a test can assert on
/// [`MockLlmProvider::call_count`] after driving a turn.
pub struct RuntimeTestHarness {
    /// The runtime under test.
    pub runtime: AgentRuntime,
    /// The scripted router model.
    pub router_llm: Arc<MockLlmProvider>,
    /// The scripted specialist model (shared across every specialist node —
    /// the catalog restricts which tools each one sees, not which model
    /// answers for it).
    pub specialist_llm: Arc<MockLlmProvider>,
    /// The GPU scheduler backing the runtime's LLM lease, exposed so a test
    /// can hold a competing lease on the same device to force contention.
    pub gpu: Arc<GpuScheduler>,
}

impl RuntimeTestHarness {
    /// Build a harness whose router will replay `router_turns` and whose
    /// specialist will replay `specialist_turns`, over an empty in-memory KB
    /// vector store and the demo-stub backend for every declared domain.
    pub async fn new(router_turns: Vec<MockTurn>, specialist_turns: Vec<MockTurn>) -> Self {
        Self::build(router_turns, specialist_turns, Arc::new(InMemoryVectorStore::new()), LimitsSection::default(), None, Duration::from_secs(5)).await
    }

    /// Same as [`Self::new`] but lets the caller pre-seed the KB vector
    /// store (scenario 2, hybrid retrieval).
    pub async fn with_vector_store(router_turns: Vec<MockTurn>, specialist_turns: Vec<MockTurn>, vector_store: Arc<InMemoryVectorStore>) -> Self {
        Self::build(router_turns, specialist_turns, vector_store, LimitsSection::default(), None, Duration::from_secs(5)).await
    }

    /// Same as [`Self::new`] but overrides the per-turn safety limits
    /// (scenario 5, the tool-call-count ceiling).
    pub async fn with_limits(router_turns: Vec<MockTurn>, specialist_turns: Vec<MockTurn>, limits: LimitsSection) -> Self {
        Self::build(router_turns, specialist_turns, Arc::new(InMemoryVectorStore::new()), limits, None, Duration::from_secs(5)).await
    }

    /// Same as [`Self::new`] but gates every LLM call behind `gpu_id` on the
    /// returned [`GpuScheduler`], with a short acquire timeout so a test can
    /// hold a competing lease and force a [`bestbox_runtime::RuntimeError::ResourceBusy`].
    pub async fn with_gpu(router_turns: Vec<MockTurn>, specialist_turns: Vec<MockTurn>, gpu_id: impl Into<String>, acquire_timeout: Duration) -> Self {
        Self::build(router_turns, specialist_turns, Arc::new(InMemoryVectorStore::new()), LimitsSection::default(), Some(gpu_id.into()), acquire_timeout).await
    }

    async fn build(
        router_turns: Vec<MockTurn>,
        specialist_turns: Vec<MockTurn>,
        vector_store: Arc<InMemoryVectorStore>,
        limits: LimitsSection,
        llm_gpu_id: Option<String>,
        gpu_acquire_timeout: Duration,
    ) -> Self {
        let router_llm = Arc::new(MockLlmProvider::new(router_turns));
        let specialist_llm = Arc::new(MockLlmProvider::new(specialist_turns));

        let router_dyn: Arc<dyn LlmProvider> = router_llm.clone();
        let specialist_dyn: Arc<dyn LlmProvider> = specialist_llm.clone();

        let adapters = Arc::new(AdapterRegistry::build(&demo_integrations()));
        let retriever = Arc::new(HybridRetriever::new(vector_store, None, None, Lexicon::mold_defaults()));

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
            gpu.clone(),
            Lexicon::mold_defaults(),
            limits,
            llm_gpu_id,
            gpu_acquire_timeout,
        );

        Self { runtime, router_llm, specialist_llm, gpu }
    }

    /// Run a fresh turn as [`fully_permissioned_user`].
    pub async fn run_turn(&self, input: &str) -> bestbox_runtime::RuntimeResult<TurnOutcome> {
        self.runtime.run_turn(None, input, fully_permissioned_user(), &NullObserver).await
    }

    /// Run a fresh turn as a caller missing the given permission tags.
    pub async fn run_turn_as(&self, input: &str, user_context: UserContext) -> bestbox_runtime::RuntimeResult<TurnOutcome> {
        self.runtime.run_turn(None, input, user_context, &NullObserver).await
    }

    /// Resolve a pending approval (scenario 4).
    pub async fn approve(&self, thread_id: ThreadId, turn_id: TurnId, approved: bool) -> bestbox_runtime::RuntimeResult<TurnOutcome> {
        self.runtime.approve_turn(thread_id, turn_id, approved, &NullObserver).await
    }

    /// Resume a turn from its latest checkpoint (scenario 6).
    pub async fn resume(&self, thread_id: ThreadId, turn_id: TurnId) -> bestbox_runtime::RuntimeResult<TurnOutcome> {
        self.runtime.resume_turn(thread_id, turn_id, &NullObserver).await
    }
}
