use tracing::trace;

use super::artifact::ArtifactBundle;
use super::domain::{FeatureVector, RiskLabel, ScoreResult};

/// Numeric pipeline rejected the assembled row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("{stage} expects {expected} features but received {actual}")]
    ArityMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("model produced an invalid probability {0}")]
    InvalidProbability(f64),
}

/// Threshold comparison, inclusive on the high-risk side.
pub fn classify(probability: f64, threshold: f64) -> RiskLabel {
    if probability >= threshold {
        RiskLabel::HighRisk
    } else {
        RiskLabel::LowRisk
    }
}

/// Scale `vector`, run the classifier and apply the bundle threshold.
pub fn score(vector: &FeatureVector, bundle: &ArtifactBundle) -> Result<ScoreResult, ScoringError> {
    let scaled = bundle.scaler().transform(vector.as_slice())?;
    let probability = bundle.model().predict_proba(&scaled)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(ScoringError::InvalidProbability(probability));
    }
    let label = classify(probability, bundle.threshold());

    trace!(probability, threshold = bundle.threshold(), ?label, "scored feature vector");

    Ok(ScoreResult { probability, label })
}
