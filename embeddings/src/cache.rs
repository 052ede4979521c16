//! Embedding cache for avoiding redundant generator calls.
//!
//! The cache is bounded. When a `set` finds it full, a fixed batch of entries
//! is evicted before the new entry goes in, so the size never exceeds
//! [`CacheConfig::max_entries`]. Which entries go depends on the
//! [`EvictionPolicy`].

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Embedding;
use crate::error::Result;
use crate::provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};

/// Which entries a full cache evicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Earliest inserted first. Overwriting a key keeps its position.
    #[default]
    Fifo,
    /// Least recently read or written first.
    Lru,
}

/// Configuration for [`EmbeddingCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries. Zero disables caching.
    pub max_entries: usize,

    /// Entries removed at once when the cache is full.
    pub eviction_batch: usize,

    /// Eviction order.
    pub policy: EvictionPolicy,
}

impl CacheConfig {
    /// Set the capacity.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the eviction batch size.
    pub fn with_eviction_batch(mut self, eviction_batch: usize) -> Self {
        self.eviction_batch = eviction_batch;
        self
    }

    /// Set the eviction policy.
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            eviction_batch: 100,
            policy: EvictionPolicy::Fifo,
        }
    }
}

/// Statistics about the embedding cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of entries in cache.
    pub entries: usize,

    /// Maximum cache size.
    pub max_entries: usize,

    /// Lookups that found an entry.
    pub hits: u64,

    /// Lookups that found nothing.
    pub misses: u64,

    /// Entries removed to make room.
    pub evictions: u64,
}

#[derive(Default)]
struct CacheState {
    /// Front is evicted first.
    entries: IndexMap<String, Embedding>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded key to embedding cache.
///
/// All operations take a short lock and never block on I/O, so the cache
/// can be shared across threads behind an [`Arc`].
pub struct EmbeddingCache {
    state: Mutex<CacheState>,
    config: CacheConfig,
}

impl EmbeddingCache {
    /// Create a FIFO cache holding at most `max_entries` embeddings.
    pub fn new(max_entries: usize) -> Self {
        Self::with_config(CacheConfig::default().with_max_entries(max_entries))
    }

    /// Create a cache from a full configuration.
    pub fn with_config(mut config: CacheConfig) -> Self {
        config.eviction_batch = config.eviction_batch.max(1);
        Self {
            state: Mutex::new(CacheState::default()),
            config,
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get an embedding from the cache.
    pub fn get(&self, key: &str) -> Option<Embedding> {
        let mut state = self.state.lock();
        let Some(index) = state.entries.get_index_of(key) else {
            state.misses += 1;
            return None;
        };

        state.hits += 1;
        let embedding = state.entries[index].clone();
        if self.config.policy == EvictionPolicy::Lru {
            let last = state.entries.len() - 1;
            state.entries.move_index(index, last);
        }
        Some(embedding)
    }

    /// Put an embedding in the cache, evicting a batch first if it is full.
    pub fn set(&self, key: impl Into<String>, embedding: Embedding) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut state = self.state.lock();

        if state.entries.len() >= self.config.max_entries {
            let count = self.config.eviction_batch.min(state.entries.len());
            state.entries.drain(..count);
            state.evictions += count as u64;
            debug!(
                "Evicted {count} cached embeddings ({:?} policy)",
                self.config.policy
            );
        }

        let (index, _) = state.entries.insert_full(key.into(), embedding);
        if self.config.policy == EvictionPolicy::Lru {
            let last = state.entries.len() - 1;
            state.entries.move_index(index, last);
        }
    }

    /// Check if a key is cached. Does not count as a use.
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Remove an embedding from the cache.
    pub fn remove(&self, key: &str) -> Option<Embedding> {
        self.state.lock().entries.shift_remove(key)
    }

    /// Clear the entire cache.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
        info!("Cleared embedding cache");
    }

    /// Number of cached embeddings.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            max_entries: self.config.max_entries,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        }
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::with_config(CacheConfig::default())
    }
}

/// A wrapper that provides cached embedding generation.
pub struct CachedProvider<P> {
    provider: P,
    cache: Arc<EmbeddingCache>,
}

impl<P> CachedProvider<P>
where
    P: EmbeddingProvider,
{
    /// Create a new cached provider.
    pub fn new(provider: P, cache: Arc<EmbeddingCache>) -> Self {
        Self { provider, cache }
    }

    /// Cache key for a text embedded by a model at a dimension.
    fn cache_key(text: &str, model: &str, dimension: usize) -> String {
        format!("{model}\u{0}{dimension}\u{0}{text}")
    }

    /// Generate an embedding, using cache if available.
    ///
    /// Surrounding whitespace is trimmed before the text is looked up or sent
    /// to the provider, so both spellings share one embedding.
    pub async fn embed(&self, mut request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        let trimmed = request.text.trim();
        if trimmed.len() != request.text.len() {
            request.text = trimmed.to_string();
        }

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string());
        let dimension = request
            .dimensions
            .unwrap_or_else(|| self.provider.dimension());
        let key = Self::cache_key(&request.text, &model, dimension);

        if let Some(embedding) = self.cache.get(&key) {
            debug!("Cache hit for embedding (model: {model}, dimension: {dimension})");
            return Ok(EmbeddingResponse {
                dimension: embedding.len(),
                embedding,
                model,
                tokens_used: None,
            });
        }

        let response = self.provider.embed(request).await?;
        self.cache.set(key, response.embedding.clone());

        Ok(response)
    }

    /// Embed a single text with the provider's default model.
    pub async fn embed_text(&self, text: &str) -> Result<Embedding> {
        Ok(self.embed(EmbeddingRequest::new(text)).await?.embedding)
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the underlying cache.
    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::EmbeddingError;

    #[test]
    fn test_cache_set_get() {
        let cache = EmbeddingCache::new(100);
        let embedding = vec![1.0, 2.0, 3.0];

        cache.set("hello", embedding.clone());

        assert_eq!(cache.get("hello"), Some(embedding));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_miss() {
        let cache = EmbeddingCache::new(100);
        assert_eq!(cache.get("not cached"), None);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (0, 1));
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let cache = EmbeddingCache::new(10);
        cache.set("k", vec![1.0]);
        cache.set("k", vec![2.0]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), Some(vec![2.0]));
    }

    #[test]
    fn test_capacity_evicts_one_batch() {
        let cache = EmbeddingCache::new(1000);

        for i in 0..=1000 {
            cache.set(format!("key-{i}"), vec![i as f32]);
            assert!(cache.len() <= 1000);
        }

        let stats = cache.stats();
        assert_eq!(stats.evictions, 100);
        assert_eq!(stats.entries, 901);
        assert!(!cache.contains("key-0"));
        assert!(!cache.contains("key-99"));
        assert!(cache.contains("key-100"));
        assert!(cache.contains("key-1000"));
    }

    #[test]
    fn test_small_capacity_evicts_everything_available() {
        let cache = EmbeddingCache::new(3);
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);
        cache.set("c", vec![3.0]);
        cache.set("d", vec![4.0]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("d"), Some(vec![4.0]));
        assert_eq!(cache.stats().evictions, 3);
    }

    #[test]
    fn test_fifo_ignores_reads() {
        let config = CacheConfig::default()
            .with_max_entries(3)
            .with_eviction_batch(1);
        let cache = EmbeddingCache::with_config(config);
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);
        cache.set("c", vec![3.0]);

        assert!(cache.get("a").is_some());
        cache.set("d", vec![4.0]);

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let config = CacheConfig::default()
            .with_max_entries(3)
            .with_eviction_batch(1)
            .with_policy(EvictionPolicy::Lru);
        let cache = EmbeddingCache::with_config(config);
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);
        cache.set("c", vec![3.0]);

        assert!(cache.get("a").is_some());
        cache.set("d", vec![4.0]);

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = EmbeddingCache::new(0);
        cache.set("a", vec![1.0]);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_zero_batch_is_clamped() {
        let cache = EmbeddingCache::with_config(
            CacheConfig::default()
                .with_max_entries(1)
                .with_eviction_batch(0),
        );
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);

        assert_eq!(cache.config().eviction_batch, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_clear_and_remove() {
        let cache = EmbeddingCache::new(10);
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);

        assert_eq!(cache.remove("a"), Some(vec![1.0]));
        assert_eq!(cache.remove("a"), None);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(EmbeddingCache::new(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.set(format!("{t}-{i}"), vec![i as f32]);
                        let _ = cache.get(&format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 50);
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn default_model(&self) -> &str {
            "test-model"
        }

        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.text.is_empty() {
                return Err(EmbeddingError::InvalidResponse("empty text".to_string()));
            }
            let embedding = vec![request.text.len() as f32, 1.0];
            Ok(EmbeddingResponse {
                dimension: embedding.len(),
                embedding,
                model: request.model.unwrap_or_else(|| "test-model".to_string()),
                tokens_used: Some(1),
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn counting() -> CachedProvider<CountingProvider> {
        CachedProvider::new(
            CountingProvider {
                calls: AtomicUsize::new(0),
            },
            Arc::new(EmbeddingCache::new(10)),
        )
    }

    #[tokio::test]
    async fn test_cached_provider_hits_cache() {
        let cached = counting();

        let first = cached.embed_text("hello").await.unwrap();
        let second = cached.embed_text("hello").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.provider().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.cache().stats().hits, 1);
    }

    #[tokio::test]
    async fn test_cached_provider_embeds_trimmed_text() {
        let cached = counting();

        // The provider encodes the text length, so untrimmed text would give 8.0.
        let padded = cached.embed_text("  hello ").await.unwrap();
        let plain = cached.embed_text("hello").await.unwrap();

        assert_eq!(padded, vec![5.0, 1.0]);
        assert_eq!(plain, padded);
        assert_eq!(cached.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_provider_keys_by_dimension() {
        let cached = counting();

        cached
            .embed(EmbeddingRequest::new("hello").with_dimensions(4))
            .await
            .unwrap();
        cached
            .embed(EmbeddingRequest::new("hello").with_dimensions(8))
            .await
            .unwrap();
        // No explicit dimension resolves to the provider's own, which is 2.
        cached.embed(EmbeddingRequest::new("hello")).await.unwrap();
        cached
            .embed(EmbeddingRequest::new("hello").with_dimensions(2))
            .await
            .unwrap();

        assert_eq!(cached.provider().calls.load(Ordering::SeqCst), 3);
        assert_eq!(cached.cache().len(), 3);
        assert_eq!(cached.cache().stats().hits, 1);
    }

    #[tokio::test]
    async fn test_cached_provider_keys_by_model() {
        let cached = counting();

        cached.embed(EmbeddingRequest::new("hello")).await.unwrap();
        let response = cached
            .embed(EmbeddingRequest::new("hello").with_model("other-model"))
            .await
            .unwrap();

        assert_eq!(response.model, "other-model");
        assert_eq!(cached.provider().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_cached_provider_does_not_cache_errors() {
        let cached = counting();

        tokio_test::assert_err!(cached.embed_text("").await);
        tokio_test::assert_err!(cached.embed_text("").await);

        assert_eq!(cached.provider().calls.load(Ordering::SeqCst), 2);
        assert!(cached.cache().is_empty());
    }
}
