//! `bestboxd` — the BestBox agent orchestration runtime's HTTP surface.
//!
//! Wires every collaborator crate (C1-C9) into one [`bestbox_runtime::AgentRuntime`]
//! and serves it over `axum` (spec §6).

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod auth;
mod error;
mod routes;
mod sse;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bestbox_adapters::AdapterRegistry;
use bestbox_audit::{AuditLog, KvAuditStorage};
use bestbox_checkpoint::Checkpointer;
use bestbox_config::Config;
use bestbox_context::ContextManager;
use bestbox_gpu::GpuScheduler;
use bestbox_llm::{OpenAiCompatProvider, ProviderConfig};
use bestbox_retriever::{EmbeddingClient, HybridRetriever, InMemoryVectorStore, Lexicon, RerankClient};
use bestbox_runtime::{AgentRuntime, ThreadStore};
use bestbox_storage::{Database, MemoryKvStore, SurrealKvStore};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

/// Command-line entry point for the `BestBox` HTTP surface. Configuration
/// is layered the same way [`Config::load`] layers it; these flags cover
/// the operational concerns (listen address, storage location) the
/// recognized config keys don't, since they're deployment topology rather
/// than business tuning.
#[derive(Parser)]
#[command(name = "bestboxd", about = "BestBox agent orchestration runtime")]
struct Cli {
    /// Path to a TOML configuration file. Falls back to built-in defaults
    /// if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP surface to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen_addr: SocketAddr,

    /// Directory for embedded `SurrealKV` persistence. Ignored if
    /// `--memory` is set.
    #[arg(long, default_value = "./data/bestbox")]
    data_dir: PathBuf,

    /// Use an in-memory store instead of persisting to `data_dir` (tests
    /// and local experimentation; spec §0.4).
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config);

    let db = if cli.memory {
        Database::connect_memory().await?
    } else {
        Database::connect_embedded(&cli.data_dir.join("db").display().to_string()).await?
    };

    let checkpointer = Arc::new(Checkpointer::new(db.clone()));
    let threads = Arc::new(ThreadStore::new(db));

    let audit_kv: Arc<dyn bestbox_storage::KvStore> = if cli.memory {
        Arc::new(MemoryKvStore::new())
    } else {
        Arc::new(SurrealKvStore::open(&cli.data_dir.join("audit").display().to_string()).await?)
    };
    let audit = AuditLog::spawn(Arc::new(KvAuditStorage::new(audit_kv)));

    let adapters = Arc::new(AdapterRegistry::build(&config.integrations));

    let embed = Some(Arc::new(EmbeddingClient::new(config.retriever.embed_url.clone(), "embed".to_owned(), None)));
    let rerank = Some(Arc::new(RerankClient::new(config.retriever.rerank_url.clone(), "rerank".to_owned(), None)));
    let retriever = Arc::new(
        HybridRetriever::new(Arc::new(InMemoryVectorStore::new()), embed, rerank, Lexicon::mold_defaults())
            .with_weights(bestbox_retriever::FusionWeights {
                dense: config.retriever.weights.dense as f32,
                sparse: config.retriever.weights.sparse as f32,
            }),
    );

    let llm_api_key = config.llm.auth_env.as_deref().and_then(|name| std::env::var(name).ok());
    let specialist_llm: Arc<dyn bestbox_llm::LlmProvider> = Arc::new(OpenAiCompatProvider::new(ProviderConfig {
        api_key: llm_api_key.clone(),
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
        base_url: config.llm.base_url.clone(),
        context_window: config.llm.context_tokens,
    }));
    let router_llm: Arc<dyn bestbox_llm::LlmProvider> = Arc::new(OpenAiCompatProvider::new(ProviderConfig {
        api_key: llm_api_key,
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.router_temperature,
        base_url: config.llm.base_url.clone(),
        context_window: config.llm.context_tokens,
    }));

    let context = Arc::new(ContextManager::new(specialist_llm.clone(), config.context.clone(), config.llm.context_tokens));
    let gpu = Arc::new(GpuScheduler::new());

    let runtime = Arc::new(AgentRuntime::new(
        specialist_llm,
        router_llm,
        adapters,
        retriever,
        context,
        checkpointer,
        audit,
        threads,
        gpu,
        Lexicon::mold_defaults(),
        config.limits.clone(),
        config.gpu.devices.first().map(|d| d.id.clone()),
        Duration::from_secs(config.gpu.acquire_timeout_seconds.max(1)),
    ));

    let api_key: Option<Arc<str>> = config.auth.api_key_env.as_deref().and_then(|name| std::env::var(name).ok()).map(Arc::from);
    if api_key.is_none() {
        tracing::warn!("auth.api_key_env is unset; the HTTP surface accepts unauthenticated requests");
    }

    let state = AppState { runtime, api_key };
    let app = routes::build(state.clone())
        .layer(axum::middleware::from_fn_with_state(state, auth::require_bearer_token))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    tracing::info!(addr = %cli.listen_addr, "bestboxd listening");
    let listener = tokio::net::TcpListener::bind(cli.listen_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    match config.logging.format {
        bestbox_config::LogFormat::Json => {
            tracing_subscriber::fmt().json().with_env_filter(filter).init();
        }
        bestbox_config::LogFormat::Text => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
