//! Configuration types for the `BestBox` runtime (spec §6).
//!
//! Every section implements [`Default`] so a bare `[section]` header (or an
//! entirely empty file) produces a working configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM endpoint selection and context budget (§4.4, §4.5).
    pub llm: LlmSection,
    /// Per-turn safety limits (§4.6).
    pub limits: LimitsSection,
    /// Hybrid retriever tuning (§4.3).
    pub retriever: RetrieverSection,
    /// Backend adapter registry, keyed by domain (§4.1).
    pub integrations: HashMap<String, IntegrationSection>,
    /// GPU work scheduler declared resources (§4.8).
    pub gpu: GpuSection,
    /// Checkpoint garbage collection (§4.7).
    pub checkpoint: CheckpointSection,
    /// Turn context window compaction (§4.5).
    pub context: ContextSection,
    /// Structured logging (§0.1).
    pub logging: LoggingSection,
    /// HTTP surface authentication (§6 401, added).
    pub auth: AuthSection,
}

/// LLM endpoint selection (spec §6 `llm.*`).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Base URL of the OpenAI-compatible chat completions endpoint.
    pub base_url: String,
    /// Model name sent with each request.
    pub model: String,
    /// Name of the environment variable holding the API key, if any.
    pub auth_env: Option<String>,
    /// Declared context window used by C5 to budget compaction.
    pub context_tokens: usize,
    /// Max tokens requested per completion.
    pub max_tokens: usize,
    /// Sampling temperature for specialist calls.
    pub temperature: f64,
    /// Sampling temperature for the low-temperature router call.
    pub router_temperature: f64,
}

impl std::fmt::Debug for LlmSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSection")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_auth_env", &self.auth_env.is_some())
            .field("context_tokens", &self.context_tokens)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("router_temperature", &self.router_temperature)
            .finish()
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1/chat/completions".to_owned(),
            model: "local-model".to_owned(),
            auth_env: None,
            context_tokens: 32_768,
            max_tokens: 4096,
            temperature: 0.7,
            router_temperature: 0.0,
        }
    }
}

/// Per-turn safety limits (spec §3, §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    /// Maximum tool calls a single turn may execute (spec default 10).
    pub max_tool_calls_per_turn: u32,
    /// Turn deadline for simple queries, in seconds.
    pub turn_deadline_seconds: u64,
    /// Turn deadline for queries classified as complex, in seconds.
    pub turn_deadline_seconds_complex: u64,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_tool_calls_per_turn: 10,
            turn_deadline_seconds: 60,
            turn_deadline_seconds_complex: 180,
        }
    }
}

/// Hybrid retriever tuning (spec §4.3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverSection {
    /// Candidates considered for rerank.
    pub top_k: usize,
    /// Passages returned after rerank.
    pub top_n: usize,
    /// Dense/sparse fusion weights and the vector/SQL fusion weight.
    pub weights: RetrieverWeights,
    /// Embeddings endpoint base URL.
    pub embed_url: String,
    /// Reranker endpoint base URL.
    pub rerank_url: String,
}

impl Default for RetrieverSection {
    fn default() -> Self {
        Self {
            top_k: 25,
            top_n: 5,
            weights: RetrieverWeights::default(),
            embed_url: "http://localhost:8081/embed".to_owned(),
            rerank_url: "http://localhost:8082/rerank".to_owned(),
        }
    }
}

/// Fusion weights used by C3 (spec §4.3, Open Question 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverWeights {
    /// Weight given to dense cosine similarity in the vector fusion step.
    pub dense: f64,
    /// Weight given to sparse BM25 in the vector fusion step.
    pub sparse: f64,
    /// Weight given to vector hits vs. structured SQL hits when both fire.
    pub vector_vs_structured: f64,
}

impl Default for RetrieverWeights {
    fn default() -> Self {
        Self {
            dense: 0.6,
            sparse: 0.4,
            vector_vs_structured: 0.5,
        }
    }
}

/// One backend adapter declaration (spec §4.1, §6 `integrations.<domain>`).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationSection {
    /// Adapter family (`erp-modern`, `erp-legacy`, `demo-stub`, ...).
    pub backend: String,
    /// Adapter endpoint URL.
    pub url: String,
    /// Name of the environment variable holding credentials, if any.
    pub auth_env: Option<String>,
    /// Operations this adapter is allowed to serve.
    pub allowlist: Vec<String>,
}

impl std::fmt::Debug for IntegrationSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationSection")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("has_auth_env", &self.auth_env.is_some())
            .field("allowlist", &self.allowlist)
            .finish()
    }
}

impl Default for IntegrationSection {
    fn default() -> Self {
        Self {
            backend: "demo-stub".to_owned(),
            url: String::new(),
            auth_env: None,
            allowlist: Vec::new(),
        }
    }
}

/// GPU work scheduler declared resources (spec §4.8, §6 `gpu.devices[]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuSection {
    /// Declared GPU devices and the resource classes each one serves.
    pub devices: Vec<GpuDeviceSection>,
    /// Default `acquire` timeout, in seconds (spec default 60s).
    pub acquire_timeout_seconds: u64,
}

/// One declared GPU device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuDeviceSection {
    /// Device identifier (matches `gpu_id` used at `acquire` call sites).
    pub id: String,
    /// Resource classes this device serves (`llm-primary`, `ocr-vl`).
    pub classes: Vec<String>,
}

/// Checkpoint garbage collection (spec §4.7, §6 `checkpoint.grace_seconds`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointSection {
    /// Grace period before superseded snapshots become GC-eligible.
    pub grace_seconds: u64,
}

impl Default for CheckpointSection {
    fn default() -> Self {
        Self {
            grace_seconds: 24 * 60 * 60,
        }
    }
}

/// Turn context window compaction (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSection {
    /// Verbatim-kept recent user+assistant turn pairs (spec default 6).
    pub k_recent: usize,
    /// Fraction of `llm.context_tokens` that triggers digest summarization
    /// of older turns (spec: `budget_tokens * 0.75`).
    pub summarize_threshold_ratio: f64,
    /// Tool results larger than this are truncated with an omission marker
    /// (spec default 2,000); the full result remains in the audit log.
    pub max_tool_result_tokens: usize,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            k_recent: 6,
            summarize_threshold_ratio: 0.75,
            max_tool_result_tokens: 2_000,
        }
    }
}

/// Structured logging (spec §0.1, added).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing-subscriber` `EnvFilter` directive (e.g. `"info"`, `"debug,bestbox_runtime=trace"`).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable text.
    Text,
    /// Newline-delimited JSON.
    Json,
}

/// HTTP surface authentication (spec §6 "secrets referenced by environment
/// variable name only"; issuing the token itself is out of scope — this
/// only validates a bearer token an upstream SSO-fronted gateway already
/// resolved).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Name of the environment variable holding the expected bearer token.
    /// When unset, the HTTP surface accepts every request unauthenticated
    /// (local/dev deployments only).
    pub api_key_env: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sum_to_one() {
        let w = RetrieverWeights::default();
        assert!((w.dense + w.sparse - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_config_parses() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.limits.max_tool_calls_per_turn, 10);
        assert_eq!(cfg.retriever.top_k, 25);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let cfg: Config = toml::from_str("[limits]\nmax_tool_calls_per_turn = 5\n").unwrap();
        assert_eq!(cfg.limits.max_tool_calls_per_turn, 5);
        assert_eq!(cfg.limits.turn_deadline_seconds, 60);
    }
}
