//! Deterministic pseudo-embedding fallback (§4.8), substituted for a real
//! embedding during a persistent outage of the external service so
//! indexing keeps moving. Hash-seeded: the same text always produces the
//! same unit vector of dimension `dim`.

use std::hash::Hasher;

/// Name reported as `embedding_model` for vectors produced this way, so
/// callers (and a later `revectorize`) can tell a fallback vector apart
/// from a real one.
pub const FALLBACK_MODEL_NAME: &str = "pseudo-embedding-fallback-v1";

/// Produce a stable unit-norm vector of `dim` floats from `text`.
///
/// Uses `text`'s bytes to seed a small splitmix64 generator; not
/// cryptographic, just stable and well-distributed enough to keep
/// semantic search from degenerating into ties.
pub fn pseudo_embed(text: &str, dim: usize) -> Vec<f32> {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    hasher.write(text.as_bytes());
    let mut state = hasher.finish();

    let mut vector = Vec::with_capacity(dim);
    for _ in 0..dim {
        state = splitmix64(state);
        // Map to [-1, 1).
        let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
        vector.push((unit * 2.0 - 1.0) as f32);
    }

    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_same_text_always_produces_the_same_vector() {
        let a = pseudo_embed("def foo(): pass", 16);
        let b = pseudo_embed("def foo(): pass", 16);
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_produces_a_different_vector() {
        let a = pseudo_embed("def foo(): pass", 16);
        let b = pseudo_embed("def bar(): pass", 16);
        assert_ne!(a, b);
    }

    #[test]
    fn the_vector_is_unit_normalized() {
        let vector = pseudo_embed("some docstring", 32);
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn the_vector_has_the_requested_dimension() {
        assert_eq!(pseudo_embed("x", 384).len(), 384);
    }
}
