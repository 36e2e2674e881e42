//! [`HybridRetriever`]: the C3 pipeline orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::embed::EmbeddingClient;
use crate::fusion::reciprocal_rank_fuse;
use crate::lexicon::Lexicon;
use crate::rerank::RerankClient;
use crate::structured::{classify, NullStructuredSource, StructuredSource};
use crate::types::{RetrievalOutcome, RetrievalQuery, RetrievedPassage};
use crate::vector_store::VectorStore;

/// Candidates considered for reranking (spec §4.3 step 5, `K=25`).
const RERANK_CANDIDATES: usize = 25;
/// Passages returned to the caller (spec §4.3 step 5, `N=5`).
const RESULT_COUNT: usize = 5;

/// Dense/sparse fusion weights (spec §4.3 step 3 defaults).
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    /// Weight applied to the dense ranking.
    pub dense: f32,
    /// Weight applied to the sparse ranking.
    pub sparse: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { dense: 0.6, sparse: 0.4 }
    }
}

/// The hybrid retrieval pipeline (spec §4.3).
pub struct HybridRetriever {
    store: Arc<dyn VectorStore>,
    embed: Option<Arc<EmbeddingClient>>,
    rerank: Option<Arc<RerankClient>>,
    structured: Arc<dyn StructuredSource>,
    lexicon: Lexicon,
    weights: FusionWeights,
}

impl HybridRetriever {
    /// Build a retriever over `store`. `embed`/`rerank` are optional —
    /// omitting either puts that stage in permanently-degraded mode,
    /// matching how a transient failure of either is handled at runtime.
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, embed: Option<Arc<EmbeddingClient>>, rerank: Option<Arc<RerankClient>>, lexicon: Lexicon) -> Self {
        Self { store, embed, rerank, structured: Arc::new(NullStructuredSource), lexicon, weights: FusionWeights::default() }
    }

    /// Wire in a real structured-query backend (defaults to
    /// [`NullStructuredSource`], which always returns zero rows).
    #[must_use]
    pub fn with_structured_source(mut self, source: Arc<dyn StructuredSource>) -> Self {
        self.structured = source;
        self
    }

    /// Override the dense/sparse fusion weights (defaults to the spec §4.3
    /// step 3 defaults). `bestbox-server` wires this from
    /// `bestbox_config::RetrieverWeights` at startup; `vector_vs_structured`
    /// has no counterpart here since structured rows are appended after
    /// fusion rather than blended into it (see `DESIGN.md`).
    #[must_use]
    pub fn with_weights(mut self, weights: FusionWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Run the full pipeline for `query` (spec §4.3 steps 1-6).
    ///
    /// Never returns an error: every stage failure degrades instead, per
    /// the spec's explicit edge-case policy, and an empty result set is a
    /// valid (non-degraded) outcome.
    pub async fn retrieve(&self, query: &RetrievalQuery) -> RetrievalOutcome {
        let expanded = self.lexicon.expand(&query.text);
        let query_terms = tokenize(&expanded);

        let mut degraded: Option<String> = None;

        let dense_vector = match &self.embed {
            Some(client) => match client.embed(&expanded).await {
                Ok(vector) => Some(vector),
                Err(error) => {
                    warn!(%error, "embedding failed, falling back to sparse-only");
                    degraded = Some("embeddings unavailable: sparse-only fallback".to_owned());
                    None
                }
            },
            None => {
                degraded = Some("embeddings unavailable: sparse-only fallback".to_owned());
                None
            }
        };

        let dense_hits = match &dense_vector {
            Some(vector) => self.store.search_dense(vector, &query.domain, query.org_id.as_deref(), RERANK_CANDIDATES).await.unwrap_or_default(),
            None => Vec::new(),
        };
        let sparse_hits = self.store.search_sparse(&query_terms, &query.domain, query.org_id.as_deref(), RERANK_CANDIDATES).await.unwrap_or_default();

        let fused = reciprocal_rank_fuse(&dense_hits, &sparse_hits, self.weights.dense, self.weights.sparse);
        let mut candidates: Vec<RetrievedPassage> = fused
            .into_iter()
            .take(RERANK_CANDIDATES)
            .map(|(scored, _rrf_score)| RetrievedPassage {
                doc_id: scored.chunk.doc_id,
                chunk_id: scored.chunk.chunk_id,
                text: scored.chunk.text,
                source: scored.chunk.source,
                domain: scored.chunk.domain,
                dense_score: scored.dense_score,
                sparse_score: scored.sparse_score,
                rerank_score: None,
                citation_tag: String::new(),
            })
            .collect();

        if let Some(structured_query) = classify(&query.text, &query.domain) {
            if let Ok(rows) = self.structured.execute(&structured_query).await {
                for (index, row) in rows.into_iter().enumerate() {
                    candidates.push(RetrievedPassage {
                        doc_id: format!("structured:{}", structured_query.query_text),
                        chunk_id: format!("structured:{index}"),
                        text: row.to_string(),
                        source: "structured catalog".to_owned(),
                        domain: query.domain.clone(),
                        dense_score: None,
                        sparse_score: None,
                        rerank_score: None,
                        citation_tag: String::new(),
                    });
                }
            }
        }

        if candidates.is_empty() {
            return RetrievalOutcome { passages: Vec::new(), degraded };
        }

        if let Some(client) = &self.rerank {
            let documents: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
            match client.rerank(&query.text, &documents).await {
                Ok(scores) => {
                    for (candidate, score) in candidates.iter_mut().zip(scores) {
                        candidate.rerank_score = Some(score);
                    }
                    candidates.sort_by(|a, b| {
                        b.rerank_score.partial_cmp(&a.rerank_score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.doc_id.cmp(&b.doc_id)).then_with(|| a.chunk_id.cmp(&b.chunk_id))
                    });
                }
                Err(error) => {
                    warn!(%error, "rerank failed, falling back to fused ranking");
                    degraded = Some(match degraded {
                        Some(existing) => format!("{existing}; reranker unavailable: fused-ranking fallback"),
                        None => "reranker unavailable: fused-ranking fallback".to_owned(),
                    });
                }
            }
        } else {
            degraded = Some(match degraded {
                Some(existing) => format!("{existing}; reranker unavailable: fused-ranking fallback"),
                None => "reranker unavailable: fused-ranking fallback".to_owned(),
            });
        }

        candidates.truncate(RESULT_COUNT);
        for (index, candidate) in candidates.iter_mut().enumerate() {
            candidate.citation_tag = format!("[C{}]", index + 1);
        }

        RetrievalOutcome { passages: candidates, degraded }
    }
}

/// Split `text` into unit-weighted terms: ASCII runs split on whitespace and
/// punctuation; CJK characters tokenized individually (no word boundaries
/// in written Chinese/Japanese).
fn tokenize(text: &str) -> HashMap<String, f32> {
    let mut terms = HashMap::new();
    let mut current = String::new();
    for ch in text.chars() {
        if is_cjk(ch) {
            if !current.is_empty() {
                *terms.entry(std::mem::take(&mut current)).or_insert(0.0) += 1.0;
            }
            *terms.entry(ch.to_string()).or_insert(0.0) += 1.0;
        } else if ch.is_alphanumeric() {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            *terms.entry(std::mem::take(&mut current)).or_insert(0.0) += 1.0;
        }
    }
    if !current.is_empty() {
        *terms.entry(current).or_insert(0.0) += 1.0;
    }
    terms
}

fn is_cjk(ch: char) -> bool {
    matches!(ch as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x3040..=0x309F | 0x30A0..=0x30FF | 0xAC00..=0xD7AF)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as Map;

    use crate::types::KbChunk;
    use crate::vector_store::InMemoryVectorStore;

    use super::*;

    fn chunk(id: &str, domain: &str, sparse_terms: Map<String, f32>) -> KbChunk {
        KbChunk { chunk_id: id.to_owned(), doc_id: format!("doc-{id}"), text: format!("passage {id}"), dense_vector: None, sparse_terms, domain: domain.to_owned(), source: "kb".to_owned(), org_id: None }
    }

    #[tokio::test]
    async fn sparse_only_degraded_mode_without_embedder() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let mut terms = Map::new();
        terms.insert("flow".to_owned(), 1.0);
        terms.insert("mark".to_owned(), 1.0);
        store.upsert(chunk("a", "mold", terms)).await.unwrap();

        let retriever = HybridRetriever::new(store, None, None, Lexicon::mold_defaults());
        let outcome = retriever.retrieve(&RetrievalQuery { text: "flow mark defect".to_owned(), domain: "mold".to_owned(), org_id: None }).await;

        assert!(!outcome.passages.is_empty());
        assert!(outcome.degraded.is_some());
        assert_eq!(outcome.passages[0].citation_tag, "[C1]");
    }

    #[tokio::test]
    async fn empty_corpus_returns_empty_not_error() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let retriever = HybridRetriever::new(store, None, None, Lexicon::mold_defaults());
        let outcome = retriever.retrieve(&RetrievalQuery { text: "anything".to_owned(), domain: "mold".to_owned(), org_id: None }).await;
        assert!(outcome.passages.is_empty());
    }

    #[tokio::test]
    async fn citation_tags_are_sequential_and_stable() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        for id in ["a", "b", "c"] {
            let mut terms = Map::new();
            terms.insert("mark".to_owned(), 1.0);
            store.upsert(chunk(id, "mold", terms)).await.unwrap();
        }
        let retriever = HybridRetriever::new(store, None, None, Lexicon::mold_defaults());
        let outcome = retriever.retrieve(&RetrievalQuery { text: "mark".to_owned(), domain: "mold".to_owned(), org_id: None }).await;
        let tags: Vec<&str> = outcome.passages.iter().map(|p| p.citation_tag.as_str()).collect();
        assert_eq!(tags, vec!["[C1]", "[C2]", "[C3]"]);
    }

    #[test]
    fn tokenize_splits_cjk_per_character() {
        let terms = tokenize("流痕 defect");
        assert!(terms.contains_key("流"));
        assert!(terms.contains_key("痕"));
        assert!(terms.contains_key("defect"));
    }
}
