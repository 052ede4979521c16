//! Bulk scoring of many queries against many embeddings.

use rayon::prelude::*;

use crate::Embedding;
use crate::similarity::cosine_similarity;

/// Number of matrix cells at which rows are computed on the rayon pool.
const PARALLEL_CELLS: usize = 256 * 768;

/// Cosine similarity of every query against every embedding.
///
/// `result[i][j]` is `cosine_similarity(&queries[i], &embeddings[j])`, so
/// mismatched dimensions show up as 0.0 cells.
pub fn batch_similarity(queries: &[Embedding], embeddings: &[Embedding]) -> Vec<Vec<f32>> {
    let row = |query: &Embedding| -> Vec<f32> {
        embeddings
            .iter()
            .map(|embedding| cosine_similarity(query, embedding))
            .collect()
    };

    if queries.len().saturating_mul(embeddings.len()) >= PARALLEL_CELLS {
        queries.par_iter().map(row).collect()
    } else {
        queries.iter().map(row).collect()
    }
}
