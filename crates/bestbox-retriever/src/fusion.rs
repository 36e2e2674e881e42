//! Reciprocal-rank fusion of the dense and sparse candidate lists
//! (spec §4.3 step 3, default weights `w_dense=0.6, w_sparse=0.4`).

use std::collections::HashMap;

use crate::vector_store::ScoredChunk;

/// Standard RRF smoothing constant.
const RRF_K: f32 = 60.0;

/// Fuse two ranked candidate lists into a single ranking, keyed by
/// `(doc_id, chunk_id)` so the same chunk found by both paths merges into
/// one entry instead of appearing twice.
#[must_use]
pub fn reciprocal_rank_fuse(dense: &[ScoredChunk], sparse: &[ScoredChunk], w_dense: f32, w_sparse: f32) -> Vec<(ScoredChunk, f32)> {
    let mut fused: HashMap<(String, String), (ScoredChunk, f32)> = HashMap::new();

    for (rank, scored) in dense.iter().enumerate() {
        let key = (scored.chunk.doc_id.clone(), scored.chunk.chunk_id.clone());
        let contribution = w_dense / (RRF_K + rank as f32 + 1.0);
        fused.entry(key).and_modify(|(_, score)| *score += contribution).or_insert_with(|| (scored.clone(), contribution));
    }

    for (rank, scored) in sparse.iter().enumerate() {
        let key = (scored.chunk.doc_id.clone(), scored.chunk.chunk_id.clone());
        let contribution = w_sparse / (RRF_K + rank as f32 + 1.0);
        fused
            .entry(key)
            .and_modify(|(existing, score)| {
                existing.sparse_score = scored.sparse_score;
                *score += contribution;
            })
            .or_insert_with(|| (scored.clone(), contribution));
    }

    let mut ranked: Vec<(ScoredChunk, f32)> = fused.into_values().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.chunk.doc_id.cmp(&b.0.chunk.doc_id)).then_with(|| a.0.chunk.chunk_id.cmp(&b.0.chunk.chunk_id)));
    ranked
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::types::KbChunk;

    use super::*;

    fn scored(id: &str, dense: Option<f32>, sparse: Option<f32>) -> ScoredChunk {
        ScoredChunk { chunk: KbChunk { chunk_id: id.to_owned(), doc_id: format!("doc-{id}"), text: String::new(), dense_vector: None, sparse_terms: HashMap::new(), domain: "mold".to_owned(), source: "test".to_owned(), org_id: None }, dense_score: dense, sparse_score: sparse }
    }

    #[test]
    fn chunk_found_by_both_paths_outranks_single_path_hits() {
        let dense = vec![scored("a", Some(0.9), None), scored("shared", Some(0.8), None)];
        let sparse = vec![scored("shared", None, Some(5.0)), scored("b", None, Some(4.0))];

        let fused = reciprocal_rank_fuse(&dense, &sparse, 0.6, 0.4);
        assert_eq!(fused[0].0.chunk.chunk_id, "shared");
    }

    #[test]
    fn empty_inputs_produce_empty_fusion() {
        let fused = reciprocal_rank_fuse(&[], &[], 0.6, 0.4);
        assert!(fused.is_empty());
    }
}
