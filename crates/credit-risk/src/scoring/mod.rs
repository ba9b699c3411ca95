//! Applicant intake, feature assembly, and scoring against a pre-trained bundle.

pub mod artifact;
pub mod assembler;
pub mod domain;
pub mod router;
pub mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifact::{ArtifactBundle, ArtifactLoadError, Classifier};
pub use assembler::{assemble, encoder_drift, EncoderDrift};
pub use domain::{
    ApplicantRecord, Assessment, Categorical, FeatureVector, FeatureView, HomeOwnership,
    InvalidApplicantError, InvalidCategoryError, LoanGrade, LoanIntent, RiskLabel, ScoreResult,
    FEATURE_COUNT, FEATURE_NAMES,
};
pub use router::{credit_risk_router, ScoreResponse};
pub use scorer::{classify, score, ScoringError};
pub use service::{AssessmentError, CreditRiskService, ModelInfo};
