//! # Retrieval
//!
//! Semantic retrieval for the assistant's record adapters (email, notes,
//! contacts, conversation history). An adapter hands over its records as
//! candidates and gets back a ranked list; this crate takes care of turning
//! query text into an embedding through the cache, decoding stored blobs,
//! and applying the configured ranking defaults.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Semantic Retriever                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  query text ──► CachedProvider ──► query embedding              │
//! │                       │                   │                     │
//! │                 EmbeddingCache            ▼                     │
//! │                                  knn_search / hybrid_search     │
//! │  stored rows ──► codec ──► candidates ────┘                     │
//! │                                           │                     │
//! │                                           ▼                     │
//! │                                    ranked results               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aide_retrieval::{RetrievalConfig, SemanticRetriever};
//!
//! let config = RetrievalConfig::default();
//! let retriever = SemanticRetriever::new(config.clone(), config.openai_provider())?;
//!
//! let candidates = retriever.decode(rows)?;
//! let results = retriever.search("dinner plans with Sam", candidates).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EmbeddingConfig, RetrievalConfig, SearchConfig};
pub use engine::{RetrieverStats, SemanticRetriever, StoredEmbedding};
pub use error::{Result, RetrievalError};

// Re-export from dependencies for convenience
pub use aide_embeddings::{
    Candidate, EmbeddingCache, EmbeddingProvider, HybridOptions, KnnOptions, SearchResult,
};
