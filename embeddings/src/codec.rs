//! Byte encoding of embeddings for blob storage.
//!
//! Layout: each element as a little-endian IEEE-754 `f32`, back to back, with
//! no length prefix. The element count is the buffer length divided by
//! [`ELEMENT_WIDTH`]. Persisted rows depend on this layout, so changing it is
//! a schema change.

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Bytes per encoded element.
pub const ELEMENT_WIDTH: usize = std::mem::size_of::<f32>();

/// Encode an embedding.
pub fn to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * ELEMENT_WIDTH);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode an embedding produced by [`to_bytes`].
///
/// Fails with [`EmbeddingError::MalformedBytes`] when the buffer does not
/// hold a whole number of elements.
pub fn from_bytes(bytes: &[u8]) -> Result<Embedding> {
    if bytes.len() % ELEMENT_WIDTH != 0 {
        return Err(EmbeddingError::MalformedBytes {
            len: bytes.len(),
            width: ELEMENT_WIDTH,
        });
    }

    Ok(bytes
        .chunks_exact(ELEMENT_WIDTH)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Decode an embedding and check it has the expected dimension.
pub fn from_bytes_with_dimension(bytes: &[u8], dimension: usize) -> Result<Embedding> {
    let embedding = from_bytes(bytes)?;
    if embedding.len() != dimension {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimension,
            actual: embedding.len(),
        });
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_layout() {
        let bytes = to_bytes(&[1.0, -2.5]);
        assert_eq!(bytes, vec![0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x20, 0xc0]);
    }

    #[test]
    fn test_roundtrip_is_bit_exact() {
        let original: Embedding = (0..crate::DEFAULT_DIMENSION)
            .map(|i| (i as f32 * 0.731).sin() * 1e3)
            .chain([f32::MIN_POSITIVE, -0.0, f32::MAX, f32::EPSILON])
            .collect();

        let decoded = from_bytes(&to_bytes(&original)).unwrap();

        let original_bits: Vec<u32> = original.iter().copied().map(f32::to_bits).collect();
        let decoded_bits: Vec<u32> = decoded.iter().copied().map(f32::to_bits).collect();
        assert_eq!(original_bits, decoded_bits);
    }

    #[test]
    fn test_empty() {
        assert!(to_bytes(&[]).is_empty());
        assert_eq!(from_bytes(&[]).unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn test_malformed_length() {
        let err = from_bytes(&[0, 0, 128, 63, 1]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::MalformedBytes { len: 5, width: 4 }
        ));
    }

    #[test]
    fn test_dimension_check() {
        let bytes = to_bytes(&[1.0, 2.0, 3.0]);
        assert_eq!(from_bytes_with_dimension(&bytes, 3).unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            from_bytes_with_dimension(&bytes, 4),
            Err(EmbeddingError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }
}
