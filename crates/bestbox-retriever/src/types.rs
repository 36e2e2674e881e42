//! Shared retrieval types (spec §3 `RetrievedPassage`, §4.3).

use serde::{Deserialize, Serialize};

/// A chunk stored in the knowledge base's vector store, with both its
/// retrieval vectors and display payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbChunk {
    /// Stable chunk identifier.
    pub chunk_id: String,
    /// The document this chunk belongs to.
    pub doc_id: String,
    /// Chunk text.
    pub text: String,
    /// Dense embedding (1024-d, normalized), if computed.
    pub dense_vector: Option<Vec<f32>>,
    /// Sparse term weights (BM25-style), keyed by token.
    pub sparse_terms: std::collections::HashMap<String, f32>,
    /// Domain this chunk belongs to (`erp`, `crm`, `it`, `oa`, `mold`, ...).
    pub domain: String,
    /// Human-readable source label (file name, ticket id, ...).
    pub source: String,
    /// Owning organization, for multi-tenant isolation.
    pub org_id: Option<String>,
}

/// One passage returned to the caller, citation-tagged (spec §4.3 step 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Source document id.
    pub doc_id: String,
    /// Source chunk id.
    pub chunk_id: String,
    /// Passage text.
    pub text: String,
    /// Human-readable source label.
    pub source: String,
    /// Domain this passage belongs to.
    pub domain: String,
    /// Dense cosine similarity score, if dense search ran.
    pub dense_score: Option<f32>,
    /// Sparse BM25-style score, if sparse search ran.
    pub sparse_score: Option<f32>,
    /// Reranker score, if reranking ran.
    pub rerank_score: Option<f32>,
    /// Short stable citation token (e.g. `[C1]`) for the LLM to cite verbatim.
    pub citation_tag: String,
}

/// A single search request against the hybrid retriever.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    /// Raw user query text.
    pub text: String,
    /// Restrict results to this domain.
    pub domain: String,
    /// Restrict results to this org, if the deployment is multi-tenant.
    pub org_id: Option<String>,
}

/// Outcome of a single [`crate::retriever::HybridRetriever::retrieve`] call.
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    /// Passages in final rank order, numbered `[C1]`, `[C2]`, ...
    pub passages: Vec<RetrievedPassage>,
    /// Set when a stage degraded instead of hard-failing (spec §4.3 edge cases).
    pub degraded: Option<String>,
}
