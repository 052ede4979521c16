//! # Embeddings
//!
//! This crate provides the similarity search engine behind the assistant's
//! retrieval layer: it compares embedding vectors, ranks candidate items
//! (emails, notes, contacts, conversation turns) and caches embeddings so
//! that previously seen text is not sent to the embedding model again.
//!
//! ## Features
//!
//! - **Similarity**: Cosine similarity and euclidean distance with
//!   sentinel scores for malformed input
//! - **Ranking**: Exact k-NN and hybrid (vector + keyword overlap) top-k
//! - **Caching**: Bounded embedding cache with bulk eviction
//! - **Batch Scoring**: Dense query x candidate similarity matrices
//! - **Storage Codec**: Fixed-width byte encoding for blob columns
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► CachedProvider ──► EmbeddingCache        │
//! │                              │                                  │
//! │                              ▼                                  │
//! │  kernel ──► similarity ──► ranking (knn / hybrid)               │
//! │                   │                                             │
//! │                   └──► batch          codec ◄──► blob storage   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod batch;
pub mod cache;
pub mod codec;
pub mod error;
pub mod kernel;
pub mod provider;
pub mod ranking;
pub mod similarity;

pub use batch::batch_similarity;
pub use cache::{CacheConfig, CacheStats, CachedProvider, EmbeddingCache, EvictionPolicy};
pub use codec::{from_bytes, from_bytes_with_dimension, to_bytes};
pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, OpenAIProvider};
pub use ranking::{Candidate, HybridOptions, KnnOptions, SearchResult, hybrid_search, knn_search};
pub use similarity::{cosine_similarity, l2_distance};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of embeddings produced by the default model configuration.
pub const DEFAULT_DIMENSION: usize = 768;
