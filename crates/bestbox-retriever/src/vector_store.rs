//! [`VectorStore`]: trait over the dense+sparse chunk index, with an
//! in-process fallback implementation for tests and small deployments.
//!
//! Mirrors the embedder/vector-store trait split used elsewhere in the
//! example pack's retrieval-oriented crates.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::RetrieverResult;
use crate::types::KbChunk;

/// One candidate returned from a [`VectorStore`] search, still unranked
/// against the other retrieval path.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: KbChunk,
    /// Dense cosine similarity, if computed.
    pub dense_score: Option<f32>,
    /// Sparse BM25-style score, if computed.
    pub sparse_score: Option<f32>,
}

/// Storage and search over indexed knowledge-base chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Index (or re-index) a chunk.
    async fn upsert(&self, chunk: KbChunk) -> RetrieverResult<()>;

    /// Dense search: cosine similarity against `query_vector`, filtered by
    /// `domain` and optionally `org_id`, returning the top `limit` matches.
    async fn search_dense(&self, query_vector: &[f32], domain: &str, org_id: Option<&str>, limit: usize) -> RetrieverResult<Vec<ScoredChunk>>;

    /// Sparse search: BM25-style term overlap against `query_terms`.
    async fn search_sparse(&self, query_terms: &HashMap<String, f32>, domain: &str, org_id: Option<&str>, limit: usize) -> RetrieverResult<Vec<ScoredChunk>>;
}

/// Flat in-memory cosine + term-overlap scan. Adequate for tests and
/// small/demo deployments; production deployments back [`VectorStore`]
/// with a real ANN index.
#[derive(Default)]
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<KbChunk>>,
}

impl InMemoryVectorStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn visible(chunk: &KbChunk, domain: &str, org_id: Option<&str>) -> bool {
        if chunk.domain != domain {
            return false;
        }
        match (&chunk.org_id, org_id) {
            (Some(chunk_org), Some(requested)) => chunk_org == requested,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 { 0.0 } else { dot / (norm_a * norm_b) }
    }

    fn term_overlap(query_terms: &HashMap<String, f32>, chunk_terms: &HashMap<String, f32>) -> f32 {
        query_terms.iter().map(|(term, weight)| weight * chunk_terms.get(term).copied().unwrap_or(0.0)).sum()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, chunk: KbChunk) -> RetrieverResult<()> {
        let mut chunks = self.chunks.write().expect("vector store lock poisoned");
        if let Some(existing) = chunks.iter_mut().find(|c| c.chunk_id == chunk.chunk_id) {
            *existing = chunk;
        } else {
            chunks.push(chunk);
        }
        Ok(())
    }

    async fn search_dense(&self, query_vector: &[f32], domain: &str, org_id: Option<&str>, limit: usize) -> RetrieverResult<Vec<ScoredChunk>> {
        let chunks = self.chunks.read().expect("vector store lock poisoned");
        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|chunk| Self::visible(chunk, domain, org_id))
            .filter_map(|chunk| chunk.dense_vector.as_ref().map(|vector| ScoredChunk { chunk: chunk.clone(), dense_score: Some(Self::cosine(query_vector, vector)), sparse_score: None }))
            .collect();
        scored.sort_by(|a, b| b.dense_score.partial_cmp(&a.dense_score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.chunk.doc_id.cmp(&b.chunk.doc_id)).then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id)));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn search_sparse(&self, query_terms: &HashMap<String, f32>, domain: &str, org_id: Option<&str>, limit: usize) -> RetrieverResult<Vec<ScoredChunk>> {
        let chunks = self.chunks.read().expect("vector store lock poisoned");
        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|chunk| Self::visible(chunk, domain, org_id))
            .map(|chunk| ScoredChunk { chunk: chunk.clone(), dense_score: None, sparse_score: Some(Self::term_overlap(query_terms, &chunk.sparse_terms)) })
            .filter(|scored| scored.sparse_score.unwrap_or(0.0) > 0.0)
            .collect();
        scored.sort_by(|a, b| b.sparse_score.partial_cmp(&a.sparse_score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.chunk.doc_id.cmp(&b.chunk.doc_id)).then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id)));
        scored.truncate(limit);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, domain: &str, org: Option<&str>, vector: Vec<f32>) -> KbChunk {
        KbChunk { chunk_id: id.to_owned(), doc_id: format!("doc-{id}"), text: format!("text {id}"), dense_vector: Some(vector), sparse_terms: HashMap::new(), domain: domain.to_owned(), source: "test".to_owned(), org_id: org.map(str::to_owned) }
    }

    #[tokio::test]
    async fn org_isolation_hides_other_tenants_chunks() {
        let store = InMemoryVectorStore::new();
        store.upsert(chunk("a", "mold", Some("org-1"), vec![1.0, 0.0])).await.unwrap();
        store.upsert(chunk("b", "mold", Some("org-2"), vec![1.0, 0.0])).await.unwrap();

        let hits = store.search_dense(&[1.0, 0.0], "mold", Some("org-1"), 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.chunk_id, "a");
    }

    #[tokio::test]
    async fn dense_search_ranks_by_cosine_similarity() {
        let store = InMemoryVectorStore::new();
        store.upsert(chunk("close", "mold", None, vec![1.0, 0.1])).await.unwrap();
        store.upsert(chunk("far", "mold", None, vec![0.1, 1.0])).await.unwrap();

        let hits = store.search_dense(&[1.0, 0.0], "mold", None, 10).await.unwrap();
        assert_eq!(hits[0].chunk.chunk_id, "close");
    }
}
