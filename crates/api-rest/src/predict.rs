//! Deterministic stand-in for the retinal image model.
//!
//! Scores are derived from the SHA-256 digest of the image, so the same file always ranks the
//! same way.

use clinic_core::models::{Prediction, PredictionResult};
use sha2::{Digest, Sha256};

pub const LABELS: [&str; 8] = [
    "normal",
    "diabetic_retinopathy",
    "glaucoma",
    "cataract",
    "amd",
    "hypertensive_retinopathy",
    "myopia",
    "other",
];

pub const MODEL_VERSION: &str = "dev-sha256";

/// Rank every label for `image` and keep the `top_k` most likely.
pub fn score(image: &[u8], top_k: usize) -> PredictionResult {
    let digest = Sha256::digest(image);
    let weights: Vec<f64> = LABELS
        .iter()
        .enumerate()
        .map(|(i, _)| f64::from(digest[i]) + 1.0)
        .collect();
    let total: f64 = weights.iter().sum();

    let mut predictions: Vec<Prediction> = LABELS
        .iter()
        .zip(&weights)
        .map(|(label, weight)| Prediction {
            label: (*label).to_owned(),
            probability: weight / total,
        })
        .collect();
    predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    predictions.truncate(top_k.clamp(1, LABELS.len()));

    PredictionResult {
        top1: predictions[0].clone(),
        predictions,
        model_version: Some(MODEL_VERSION.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_ranked_and_consistent() {
        let result = score(b"fundus image bytes", 3);
        assert_eq!(result.predictions.len(), 3);
        assert!(result.check(3).is_ok());
        assert_eq!(result.top1, result.predictions[0]);
        assert!(result
            .predictions
            .windows(2)
            .all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_score_is_deterministic() {
        assert_eq!(score(b"same", 5), score(b"same", 5));
    }

    #[test]
    fn test_top_k_larger_than_label_set() {
        let result = score(b"x", 20);
        assert_eq!(result.predictions.len(), LABELS.len());
        let total: f64 = result.predictions.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tied_top_scores_pass_response_check() {
        let mut ties = 0;
        for i in 0u32..2000 {
            let result = score(&i.to_le_bytes(), 3);
            if result.predictions[0].probability == result.predictions[1].probability {
                ties += 1;
            }
            assert!(result.check(3).is_ok(), "image {i}: {:?}", result.check(3));
        }
        assert!(ties > 0);
    }
}
