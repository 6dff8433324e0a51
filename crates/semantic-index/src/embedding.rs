//! Deterministic text embeddings and cosine similarity.
//!
//! Vectors are reproducible across processes and implementations:
//! SHA-256 of the UTF-8 text keys a ChaCha8 stream, and each of the
//! [`EMBEDDING_DIM`] components is the top 24 bits of one `u32` draw scaled
//! into `[0, 1)`. Components are held as `f64` so snapshots written with full
//! double precision load and re-save unchanged.

use crate::error::{Result, StoreError};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Fixed dimension of every stored vector.
pub const EMBEDDING_DIM: usize = 512;

pub type Embedding = Vec<f64>;

/// 2^-24: maps a 24-bit integer onto `[0, 1)` without rounding.
const UNIT_SCALE: f64 = 1.0 / (1u32 << 24) as f64;

/// Embed `text` into a fixed-length pseudo-random vector seeded by its content hash.
pub fn embed(text: &str) -> Embedding {
    let digest = Sha256::digest(text.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);

    let mut rng = ChaCha8Rng::from_seed(seed);
    (0..EMBEDDING_DIM)
        .map(|_| f64::from(rng.next_u32() >> 8) * UNIT_SCALE)
        .collect()
}

/// Euclidean norm.
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// `dot(a, b) / (|a| * |b|)`.
///
/// Fails with [`StoreError::UndefinedSimilarity`] if either vector has zero norm
/// instead of producing `NaN`.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(StoreError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let (na, nb) = (norm(a), norm(b));
    if na == 0.0 || nb == 0.0 {
        return Err(StoreError::UndefinedSimilarity { id: None });
    }
    Ok(dot(a, b) / (na * nb))
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_has_fixed_dimension_and_unit_range() {
        let v = embed("Ganges river near Delhi");
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert!(v.iter().all(|&x| (0.0..1.0).contains(&x)));
    }

    #[test]
    fn same_text_gives_identical_bits() {
        let a = embed("rivers near Delhi");
        let b = embed("rivers near Delhi");
        let bits_a: Vec<u64> = a.iter().map(|x| x.to_bits()).collect();
        let bits_b: Vec<u64> = b.iter().map(|x| x.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn different_text_gives_different_vectors() {
        assert_ne!(embed("Delhi"), embed("delhi"));
    }

    #[test]
    fn empty_text_still_embeds() {
        let v = embed("");
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert!(norm(&v) > 0.0);
    }

    #[test]
    fn cosine_of_vector_with_itself_is_one() {
        let v = embed("Yamuna");
        let s = cosine_similarity(&v, &v).unwrap();
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_is_scale_invariant() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-6);
        let c = [-1.0, -2.0, -3.0];
        assert!((cosine_similarity(&a, &c).unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_an_error_not_nan() {
        let err = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, StoreError::UndefinedSimilarity { id: None }));
        let err = cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, StoreError::UndefinedSimilarity { .. }));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }
}
