//! Semantic retriever implementation.

use std::sync::Arc;

use aide_embeddings::{
    CacheStats, CachedProvider, Candidate, Embedding, EmbeddingCache, EmbeddingError,
    EmbeddingProvider, EmbeddingRequest, SearchResult, codec, hybrid_search, knn_search,
};
use tracing::{debug, info};

use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};

/// A persisted `(item, embedding bytes, text)` row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEmbedding<T> {
    /// Caller-defined item reference.
    pub item: T,

    /// Embedding in the storage byte layout.
    pub bytes: Vec<u8>,

    /// Text snippet for hybrid search.
    pub text: Option<String>,
}

/// Retriever used by record adapters to rank their items against a query.
///
/// The retriever coordinates:
/// - Query embedding through the embedding cache
/// - Decoding of stored embeddings into candidates
/// - Ranking with the configured k-NN or hybrid defaults
pub struct SemanticRetriever<P> {
    /// Configuration.
    config: RetrievalConfig,

    /// Provider fronted by the embedding cache.
    embedder: CachedProvider<P>,
}

impl<P> SemanticRetriever<P>
where
    P: EmbeddingProvider,
{
    /// Create a retriever with its own embedding cache.
    pub fn new(config: RetrievalConfig, provider: P) -> Result<Self> {
        let cache = Arc::new(EmbeddingCache::with_config(config.embedding.cache));
        Self::with_cache(config, provider, cache)
    }

    /// Create a retriever sharing an existing embedding cache.
    pub fn with_cache(
        config: RetrievalConfig,
        provider: P,
        cache: Arc<EmbeddingCache>,
    ) -> Result<Self> {
        config.validate()?;

        if provider.dimension() != config.dimension {
            return Err(RetrievalError::Config(format!(
                "provider {} produces {} dimensions, configured {}",
                provider.name(),
                provider.dimension(),
                config.dimension
            )));
        }

        info!(
            "Initialized semantic retriever (provider: {}, dimension: {})",
            provider.name(),
            config.dimension
        );

        Ok(Self {
            config,
            embedder: CachedProvider::new(provider, cache),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The embedding cache, for sharing with other retrievers.
    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        self.embedder.cache()
    }

    /// Embed text, consulting the cache before the provider.
    pub async fn embed_text(&self, text: &str) -> Result<Embedding> {
        let mut request = EmbeddingRequest::new(text).with_dimensions(self.config.dimension);
        if let Some(model) = &self.config.embedding.model {
            request = request.with_model(model);
        }

        let embedding = self.embedder.embed(request).await?.embedding;
        if embedding.len() != self.config.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dimension,
                actual: embedding.len(),
            }
            .into());
        }
        Ok(embedding)
    }

    /// Embed each item's text and keep the text as the snippet.
    pub async fn prepare<T>(&self, items: Vec<(T, String)>) -> Result<Vec<Candidate<T>>> {
        let mut candidates = Vec::with_capacity(items.len());
        for (item, text) in items {
            let embedding = self.embed_text(&text).await?;
            candidates.push(Candidate {
                item,
                embedding,
                text: Some(text),
            });
        }
        Ok(candidates)
    }

    /// Turn stored rows into candidates.
    ///
    /// A row whose bytes do not decode to the configured dimension means the
    /// stored data is corrupt, and fails the whole call.
    pub fn decode<T>(&self, rows: Vec<StoredEmbedding<T>>) -> Result<Vec<Candidate<T>>> {
        rows.into_iter()
            .map(|row| -> Result<Candidate<T>> {
                let embedding = codec::from_bytes_with_dimension(&row.bytes, self.config.dimension)?;
                Ok(Candidate {
                    item: row.item,
                    embedding,
                    text: row.text,
                })
            })
            .collect()
    }

    /// Rank candidates by similarity to the query text.
    pub async fn search<T>(
        &self,
        query_text: &str,
        candidates: Vec<Candidate<T>>,
    ) -> Result<Vec<SearchResult<T>>> {
        debug!("Searching {} candidates", candidates.len());
        let query = self.embed_text(query_text).await?;
        Ok(knn_search(&query, candidates, self.config.search.knn))
    }

    /// Rank candidates by blended similarity and keyword overlap.
    pub async fn hybrid_search<T>(
        &self,
        query_text: &str,
        candidates: Vec<Candidate<T>>,
    ) -> Result<Vec<SearchResult<T>>> {
        debug!("Hybrid searching {} candidates", candidates.len());
        let query = self.embed_text(query_text).await?;
        Ok(hybrid_search(
            &query,
            query_text,
            candidates,
            self.config.search.hybrid,
        ))
    }

    /// Get retriever statistics.
    pub fn stats(&self) -> RetrieverStats {
        RetrieverStats {
            provider: self.embedder.provider().name().to_string(),
            dimension: self.config.dimension,
            cache: self.embedder.cache().stats(),
        }
    }
}

/// Statistics about the retriever.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieverStats {
    /// Name of the embedding provider.
    pub provider: String,

    /// Configured embedding dimension.
    pub dimension: usize,

    /// Embedding cache statistics.
    pub cache: CacheStats,
}
