use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f64,
}

/// Ranked output of the retinal image model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub top1: Prediction,
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub model_version: Option<String>,
}

impl PredictionResult {
    /// Check the response contract for a request made with `top_k`.
    ///
    /// `predictions` must be non-empty, hold at most `top_k` entries with probabilities in
    /// `0..=1`, and `top1` must be one of the entries sharing the highest probability.
    pub fn check(&self, top_k: u32) -> Result<(), String> {
        if self.predictions.is_empty() {
            return Err("predictions must not be empty".into());
        }
        if self.predictions.len() > top_k as usize {
            return Err(format!(
                "expected at most {top_k} predictions, got {}",
                self.predictions.len()
            ));
        }
        if let Some(p) = self
            .predictions
            .iter()
            .find(|p| !(0.0..=1.0).contains(&p.probability))
        {
            return Err(format!(
                "probability {} for `{}` is outside 0..=1",
                p.probability, p.label
            ));
        }

        let best = self
            .predictions
            .iter()
            .map(|p| p.probability)
            .fold(f64::NEG_INFINITY, f64::max);
        if self.top1.probability != best {
            return Err(format!(
                "top1 `{}` has probability {} but the highest is {best}",
                self.top1.label, self.top1.probability
            ));
        }
        if !self.predictions.contains(&self.top1) {
            return Err(format!(
                "top1 `{}` is not among the predictions",
                self.top1.label
            ));
        }
        Ok(())
    }

    /// Sort predictions from most to least likely.
    pub fn ranked(mut self) -> Self {
        self.predictions
            .sort_by(|a, b| b.probability.total_cmp(&a.probability));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(label: &str, probability: f64) -> Prediction {
        Prediction {
            label: label.into(),
            probability,
        }
    }

    #[test]
    fn test_check_accepts_consistent_result() {
        let result = PredictionResult {
            top1: p("glaucoma", 0.7),
            predictions: vec![p("normal", 0.2), p("glaucoma", 0.7), p("cataract", 0.1)],
            model_version: None,
        };
        assert!(result.check(3).is_ok());
        let ranked = result.ranked();
        assert_eq!(ranked.predictions[0].label, "glaucoma");
    }

    #[test]
    fn test_check_rejects_too_many_predictions() {
        let result = PredictionResult {
            top1: p("glaucoma", 0.6),
            predictions: vec![p("glaucoma", 0.6), p("normal", 0.3), p("myopia", 0.1)],
            model_version: None,
        };
        assert!(result.check(2).unwrap_err().contains("at most 2"));
    }

    #[test]
    fn test_check_rejects_mismatched_top1() {
        let result = PredictionResult {
            top1: p("normal", 0.3),
            predictions: vec![p("glaucoma", 0.6), p("normal", 0.3)],
            model_version: None,
        };
        assert!(result.check(3).unwrap_err().contains("top1"));
    }

    #[test]
    fn test_check_accepts_either_tied_label_as_top1() {
        let predictions = vec![p("normal", 0.5), p("glaucoma", 0.5)];
        for top1 in [p("normal", 0.5), p("glaucoma", 0.5)] {
            let result = PredictionResult {
                top1,
                predictions: predictions.clone(),
                model_version: None,
            };
            assert!(result.check(3).is_ok());
        }
    }

    #[test]
    fn test_check_rejects_top1_missing_from_predictions() {
        let result = PredictionResult {
            top1: p("cataract", 0.5),
            predictions: vec![p("normal", 0.5), p("glaucoma", 0.5)],
            model_version: None,
        };
        assert!(result.check(3).unwrap_err().contains("not among"));
    }
}
