//! Embedding similarity scoring.

/// Compute cosine similarity between two vectors.
///
/// `None` when the vectors cannot be compared: empty, different lengths,
/// a zero norm, or a non-finite result.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot_product = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let score = dot_product / (norm_a * norm_b);
    score.is_finite().then_some(score)
}

/// Cosine similarity clamped to `[0, 1]`, unrounded.
pub fn answer_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    cosine_similarity(a, b).map(|score| score.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let v = vec![0.3, 0.4, 0.5];
        assert!((answer_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors_clamp_to_zero() {
        assert_eq!(answer_similarity(&[1.0, 0.0], &[-1.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_incomparable_vectors() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn test_score_is_not_rounded() {
        // cos = 1/sqrt(2) = 0.70710678...
        let score = answer_similarity(&[1.0, 0.0], &[1.0, 1.0]).unwrap();
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!(score > 0.7071);
    }
}
