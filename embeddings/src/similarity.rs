//! Similarity computation for embeddings.
//!
//! Neither function fails. A dimension mismatch is a caller bug, but one bad
//! candidate must not abort the ranking of a whole batch, so it degrades to
//! the worst possible score instead.

use crate::kernel::{dot, magnitude, subtract};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// Returns 0.0 when the lengths differ or either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot(a, b) / (magnitude_a * magnitude_b)
}

/// Compute the euclidean (L2) distance between two embeddings.
///
/// Returns positive infinity when the lengths differ, so such pairs sort
/// after every real distance.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    magnitude(&subtract(b, a))
}
