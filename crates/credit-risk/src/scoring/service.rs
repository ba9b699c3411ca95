use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use super::artifact::ArtifactBundle;
use super::assembler::{assemble, encoder_drift, EncoderDrift};
use super::domain::{
    ApplicantRecord, Assessment, InvalidApplicantError, InvalidCategoryError, FEATURE_NAMES,
};
use super::scorer::{score, ScoringError};

/// Service composing validation, feature assembly, and scoring over one bundle.
pub struct CreditRiskService {
    bundle: Arc<ArtifactBundle>,
}

impl CreditRiskService {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        for drift in encoder_drift(&bundle) {
            warn!(
                encoder = drift.encoder,
                label = drift.label,
                fixed_code = drift.fixed_code,
                bundled_code = ?drift.bundled_code,
                "fixed category code disagrees with bundled encoder"
            );
        }

        Self { bundle }
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    /// Validate, assemble, and score a single applicant.
    pub fn assess(&self, record: &ApplicantRecord) -> Result<Assessment, AssessmentError> {
        record.validate()?;
        let features = assemble(record, &self.bundle)?;

        let result = score(&features, &self.bundle).map_err(|err| {
            error!(error = %err, features = ?features.as_slice(), "scoring contract violated");
            err
        })?;

        debug!(
            probability = result.probability,
            label = ?result.label,
            "applicant assessed"
        );

        Ok(Assessment { features, result })
    }

    /// Describe the loaded bundle for operators.
    pub fn model_info(&self) -> ModelInfo {
        let source = self.bundle.source();
        ModelInfo {
            model_kind: self.bundle.model().kind(),
            threshold: self.bundle.threshold(),
            feature_names: FEATURE_NAMES.to_vec(),
            loan_intent_categories: self.bundle.loan_intent_encoder().categories.clone(),
            artifact_path: source.path.clone(),
            loaded_at: source.loaded_at,
            encoder_drift: encoder_drift(&self.bundle),
        }
    }
}

/// Snapshot of the loaded bundle.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_kind: &'static str,
    pub threshold: f64,
    pub feature_names: Vec<&'static str>,
    pub loan_intent_categories: Vec<String>,
    pub artifact_path: Option<PathBuf>,
    pub loaded_at: DateTime<Utc>,
    pub encoder_drift: Vec<EncoderDrift>,
}

/// Error raised while assessing an applicant.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    InvalidApplicant(#[from] InvalidApplicantError),
    #[error(transparent)]
    InvalidCategory(#[from] InvalidCategoryError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl AssessmentError {
    /// Whether the caller supplied the bad input, as opposed to a broken bundle.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, AssessmentError::Scoring(_))
    }
}
