//! Retriever error types (spec §4.3).

use thiserror::Error;

/// Errors from the hybrid retrieval pipeline.
///
/// Per spec §4.3's edge-case policy, most of these are absorbed into a
/// degraded result rather than surfaced to the caller — see
/// [`crate::retriever::HybridRetriever::retrieve`].
#[derive(Debug, Error, Clone)]
pub enum RetrieverError {
    /// The embeddings endpoint failed or timed out.
    #[error("embedding request failed: {0}")]
    EmbeddingUnavailable(String),

    /// The reranker endpoint failed or timed out.
    #[error("rerank request failed: {0}")]
    RerankUnavailable(String),

    /// The vector store itself failed (not a degraded-mode condition).
    #[error("vector store error: {0}")]
    StoreError(String),
}

/// Result alias over [`RetrieverError`].
pub type RetrieverResult<T> = Result<T, RetrieverError>;
