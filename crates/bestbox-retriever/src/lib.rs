#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` hybrid retriever (C3) — query preprocessing, dense+sparse
//! fused vector search, optional structured-catalog fusion, reranking, and
//! citation tagging over the knowledge base.

pub mod embed;
pub mod error;
pub mod fusion;
pub mod lexicon;
pub mod rerank;
pub mod retriever;
pub mod structured;
pub mod types;
pub mod vector_store;

pub use embed::EmbeddingClient;
pub use error::{RetrieverError, RetrieverResult};
pub use lexicon::Lexicon;
pub use rerank::RerankClient;
pub use retriever::{FusionWeights, HybridRetriever};
pub use structured::{classify as classify_structured, NullStructuredSource, StructuredQuery, StructuredSource};
pub use types::{KbChunk, RetrievalOutcome, RetrievalQuery, RetrievedPassage};
pub use vector_store::{InMemoryVectorStore, ScoredChunk, VectorStore};
