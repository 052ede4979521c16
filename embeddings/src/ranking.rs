//! Exact top-k ranking over caller-supplied candidates.
//!
//! Two modes are provided:
//!
//! - [`knn_search`] ranks by cosine similarity alone and drops candidates
//!   below a threshold.
//! - [`hybrid_search`] blends cosine similarity with a keyword overlap ratio
//!   and ranks every candidate, with no threshold.
//!
//! Both are linear scans. Results are sorted by descending score and ties
//! keep the candidates' input order.

use std::cmp::Reverse;
use std::collections::HashSet;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Embedding;
use crate::similarity::cosine_similarity;

/// Candidate count at which scoring moves onto the rayon pool.
const PARALLEL_THRESHOLD: usize = 256;

/// An item to be ranked.
///
/// The item is opaque to the engine; it is moved into the matching
/// [`SearchResult`] untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    /// Caller-defined item reference.
    pub item: T,

    /// Embedding of the item.
    pub embedding: Embedding,

    /// Plain-text snippet used for keyword scoring in hybrid mode.
    pub text: Option<String>,
}

impl<T> Candidate<T> {
    /// Create a candidate without a text snippet.
    pub fn new(item: T, embedding: Embedding) -> Self {
        Self {
            item,
            embedding,
            text: None,
        }
    }

    /// Attach a text snippet.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A ranked item. Higher scores are always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    /// The candidate's item, carried through unchanged.
    pub item: T,

    /// Relevance score.
    pub score: f32,
}

/// Options for [`knn_search`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnOptions {
    /// Maximum number of results.
    pub k: usize,

    /// Minimum cosine similarity a candidate needs to be returned.
    pub threshold: f32,
}

impl KnnOptions {
    /// Set the number of results.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for KnnOptions {
    fn default() -> Self {
        Self {
            k: 10,
            threshold: 0.7,
        }
    }
}

/// Options for [`hybrid_search`].
///
/// The weights are applied as given; they need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridOptions {
    /// Maximum number of results.
    pub k: usize,

    /// Weight of the cosine similarity.
    pub vector_weight: f32,

    /// Weight of the keyword overlap ratio.
    pub keyword_weight: f32,
}

impl HybridOptions {
    /// Set the number of results.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set both weights.
    pub fn with_weights(mut self, vector_weight: f32, keyword_weight: f32) -> Self {
        self.vector_weight = vector_weight;
        self.keyword_weight = keyword_weight;
        self
    }
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            k: 10,
            vector_weight: 0.7,
            keyword_weight: 0.3,
        }
    }
}

/// Rank candidates by cosine similarity to `query`.
///
/// Candidates scoring strictly below `options.threshold` are dropped. If
/// fewer than `options.k` remain, all of them are returned.
pub fn knn_search<T>(
    query: &[f32],
    candidates: Vec<Candidate<T>>,
    options: KnnOptions,
) -> Vec<SearchResult<T>> {
    let embeddings: Vec<&[f32]> = candidates.iter().map(|c| c.embedding.as_slice()).collect();
    let scores = score_in_order(&embeddings, |embedding| {
        cosine_similarity(query, embedding)
    });

    let total = candidates.len();
    let results = top_k(candidates, scores, options.k, |score| {
        score >= options.threshold
    });
    debug!(
        "knn search kept {} of {total} candidates (k={}, threshold={})",
        results.len(),
        options.k,
        options.threshold
    );
    results
}

/// Rank candidates by a weighted blend of cosine similarity and keyword
/// overlap with `query_text`.
///
/// Every candidate is scored; there is no threshold. Candidates without a
/// text snippet get a keyword score of 0.
pub fn hybrid_search<T>(
    query: &[f32],
    query_text: &str,
    candidates: Vec<Candidate<T>>,
    options: HybridOptions,
) -> Vec<SearchResult<T>> {
    let query_terms = tokenize(query_text);
    let inputs: Vec<(&[f32], Option<&str>)> = candidates
        .iter()
        .map(|c| (c.embedding.as_slice(), c.text.as_deref()))
        .collect();
    let scores = score_in_order(&inputs, |(embedding, text)| {
        let vector_score = cosine_similarity(query, embedding);
        let keyword_score = keyword_score(&query_terms, text.unwrap_or_default());
        vector_score * options.vector_weight + keyword_score * options.keyword_weight
    });

    let total = candidates.len();
    let results = top_k(candidates, scores, options.k, |_| true);
    debug!(
        "hybrid search ranked {total} candidates against {} query terms (k={})",
        query_terms.len(),
        options.k
    );
    results
}

/// Split text on whitespace into a set of lower-cased terms.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Fraction of `query_terms` that also occur in `text`, in `[0, 1]`.
///
/// An empty query term set scores 0.
pub fn keyword_score(query_terms: &HashSet<String>, text: &str) -> f32 {
    let text_terms = tokenize(text);
    let overlap = query_terms.intersection(&text_terms).count();
    overlap as f32 / query_terms.len().max(1) as f32
}

/// Score every input, keeping input order in the output.
fn score_in_order<I, F>(inputs: &[I], score: F) -> Vec<f32>
where
    I: Sync,
    F: Fn(&I) -> f32 + Sync + Send,
{
    if inputs.len() >= PARALLEL_THRESHOLD {
        inputs.par_iter().map(&score).collect()
    } else {
        inputs.iter().map(score).collect()
    }
}

/// Pair candidates with their scores, filter, stable-sort descending and
/// truncate to `k`.
fn top_k<T>(
    candidates: Vec<Candidate<T>>,
    scores: Vec<f32>,
    k: usize,
    keep: impl Fn(f32) -> bool,
) -> Vec<SearchResult<T>> {
    let mut results: Vec<SearchResult<T>> = candidates
        .into_iter()
        .zip(scores)
        .filter(|(_, score)| keep(*score))
        .map(|(candidate, score)| SearchResult {
            item: candidate.item,
            score,
        })
        .collect();

    results.sort_by_key(|result| Reverse(OrderedFloat(result.score)));
    results.truncate(k);
    results
}
