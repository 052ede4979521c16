//! Configuration for the semantic retriever.

use aide_embeddings::{CacheConfig, DEFAULT_DIMENSION, HybridOptions, KnnOptions, OpenAIProvider};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// Configuration for the semantic retriever.
///
/// Every field has a default, so a host application can embed this in its
/// own settings and only spell out what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Dimension shared by every embedding the provider produces.
    pub dimension: usize,

    /// Embedding provider and cache configuration.
    pub embedding: EmbeddingConfig,

    /// Ranking defaults.
    pub search: SearchConfig,
}

impl RetrievalConfig {
    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the embedding configuration.
    pub fn with_embedding(mut self, config: EmbeddingConfig) -> Self {
        self.embedding = config;
        self
    }

    /// Set the search configuration.
    pub fn with_search(mut self, config: SearchConfig) -> Self {
        self.search = config;
        self
    }

    /// Check the configuration for values the retriever cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(RetrievalError::Config(
                "dimension must be greater than zero".to_string(),
            ));
        }
        if self.search.knn.k == 0 || self.search.hybrid.k == 0 {
            return Err(RetrievalError::Config(
                "result count k must be greater than zero".to_string(),
            ));
        }
        if !self.search.knn.threshold.is_finite() {
            return Err(RetrievalError::Config(format!(
                "knn threshold must be finite, got {}",
                self.search.knn.threshold
            )));
        }
        let hybrid = &self.search.hybrid;
        if !hybrid.vector_weight.is_finite() || !hybrid.keyword_weight.is_finite() {
            return Err(RetrievalError::Config(format!(
                "hybrid weights must be finite, got {} and {}",
                hybrid.vector_weight, hybrid.keyword_weight
            )));
        }
        Ok(())
    }

    /// Build an OpenAI-compatible provider matching this configuration.
    ///
    /// The API key is read from `OPENAI_API_KEY`.
    pub fn openai_provider(&self) -> OpenAIProvider {
        let mut provider = OpenAIProvider::new().with_dimension(self.dimension);
        if let Some(model) = &self.embedding.model {
            provider = provider.with_model(model);
        }
        if let Some(base_url) = &self.embedding.base_url {
            provider = provider.with_base_url(base_url);
        }
        provider
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings. `None` uses the provider default.
    pub model: Option<String>,

    /// Base URL of the embeddings API. `None` uses the provider default.
    pub base_url: Option<String>,

    /// Embedding cache settings.
    pub cache: CacheConfig,
}

/// Default ranking options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Options for vector-only search.
    pub knn: KnnOptions,

    /// Options for hybrid search.
    pub hybrid: HybridOptions,
}
