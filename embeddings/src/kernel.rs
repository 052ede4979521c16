//! Scalar vector kernels.
//!
//! Every reduction sums left to right over the zipped elements, so identical
//! inputs always produce bit-identical results. Callers are expected to pass
//! equal-length slices; extra elements of the longer slice are ignored.

/// Dot product of two vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Sum of the squared elements of a vector.
pub fn sum_of_squares(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum()
}

/// Element-wise `a - b`.
pub fn subtract(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b.iter()).map(|(x, y)| x - y).collect()
}

/// Euclidean norm of a vector.
pub fn magnitude(v: &[f32]) -> f32 {
    sum_of_squares(v).sqrt()
}
