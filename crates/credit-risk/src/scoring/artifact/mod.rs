//! Externally trained scoring bundle: classifier, scaler, encoders and threshold.
//!
//! The bundle is a single JSON document produced by the training pipeline. It is
//! read once at startup and shared read-only for the rest of the process.

mod encoder;
mod model;
mod scaler;

pub use encoder::OrdinalEncoder;
pub use model::{
    Classifier, LogisticModel, ModelSpec, RegressionTree, TreeEnsemble, TreeNode,
};
pub use scaler::StandardScaler;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const MODEL_KEY: &str = "best_model";
pub const SCALER_KEY: &str = "scaler";
pub const HOME_OWNERSHIP_ENCODER_KEY: &str = "encoder";
pub const LOAN_INTENT_ENCODER_KEY: &str = "loanencoder";
pub const LOAN_GRADE_ENCODER_KEY: &str = "ohe";
pub const THRESHOLD_KEY: &str = "threshold";

pub const REQUIRED_KEYS: [&str; 6] = [
    MODEL_KEY,
    SCALER_KEY,
    HOME_OWNERSHIP_ENCODER_KEY,
    LOAN_INTENT_ENCODER_KEY,
    LOAN_GRADE_ENCODER_KEY,
    THRESHOLD_KEY,
];

/// Failure to read or validate the scoring bundle. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("unable to read artifact bundle {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("artifact bundle {} is not valid JSON: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("artifact bundle is missing the '{key}' entry")]
    MissingKey { key: &'static str },
    #[error("artifact bundle entry '{key}' is invalid: {source}")]
    InvalidEntry {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("decision threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("artifact bundle entry '{key}' is inconsistent: {detail}")]
    Inconsistent { key: &'static str, detail: String },
}

/// Where and when a bundle was loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSource {
    pub path: Option<PathBuf>,
    pub loaded_at: DateTime<Utc>,
}

/// Immutable scoring artifacts shared across requests.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    model: Arc<dyn Classifier>,
    scaler: StandardScaler,
    home_ownership_encoder: OrdinalEncoder,
    loan_intent_encoder: OrdinalEncoder,
    loan_grade_encoder: OrdinalEncoder,
    threshold: f64,
    source: ArtifactSource,
}

impl ArtifactBundle {
    /// Read and validate the bundle stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactLoadError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading artifact bundle");

        let raw = fs::read_to_string(path).map_err(|source| ArtifactLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|source| ArtifactLoadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let mut bundle = Self::from_document(document)?;
        bundle.source.path = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            model = bundle.model.kind(),
            threshold = bundle.threshold,
            "artifact bundle loaded"
        );
        Ok(bundle)
    }

    /// Build a bundle from an already-parsed JSON object.
    pub fn from_document(mut document: Map<String, Value>) -> Result<Self, ArtifactLoadError> {
        if let Some(key) = REQUIRED_KEYS
            .iter()
            .find(|key| !document.contains_key(**key))
        {
            return Err(ArtifactLoadError::MissingKey { key: *key });
        }

        let model: ModelSpec = take_entry(&mut document, MODEL_KEY)?;
        let model = model
            .into_classifier()
            .map_err(|detail| ArtifactLoadError::Inconsistent {
                key: MODEL_KEY,
                detail,
            })?;

        let bundle = Self::from_parts(
            model,
            take_entry(&mut document, SCALER_KEY)?,
            take_entry(&mut document, HOME_OWNERSHIP_ENCODER_KEY)?,
            take_entry(&mut document, LOAN_INTENT_ENCODER_KEY)?,
            take_entry(&mut document, LOAN_GRADE_ENCODER_KEY)?,
            take_entry(&mut document, THRESHOLD_KEY)?,
        )?;
        Ok(bundle)
    }

    /// Assemble a bundle from in-memory parts, validating them as a whole.
    pub fn from_parts(
        model: Arc<dyn Classifier>,
        scaler: StandardScaler,
        home_ownership_encoder: OrdinalEncoder,
        loan_intent_encoder: OrdinalEncoder,
        loan_grade_encoder: OrdinalEncoder,
        threshold: f64,
    ) -> Result<Self, ArtifactLoadError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ArtifactLoadError::InvalidThreshold(threshold));
        }

        scaler
            .check()
            .map_err(|detail| ArtifactLoadError::Inconsistent {
                key: SCALER_KEY,
                detail,
            })?;

        for (key, encoder) in [
            (HOME_OWNERSHIP_ENCODER_KEY, &home_ownership_encoder),
            (LOAN_INTENT_ENCODER_KEY, &loan_intent_encoder),
            (LOAN_GRADE_ENCODER_KEY, &loan_grade_encoder),
        ] {
            encoder
                .check()
                .map_err(|detail| ArtifactLoadError::Inconsistent { key, detail })?;
        }

        let width = scaler.n_features();
        if let Some(declared) = model.n_features() {
            if declared != width {
                return Err(ArtifactLoadError::Inconsistent {
                    key: MODEL_KEY,
                    detail: format!(
                        "model expects {declared} features but scaler produces {width}"
                    ),
                });
            }
        }
        if let Some(required) = model.min_features() {
            if required > width {
                return Err(ArtifactLoadError::Inconsistent {
                    key: MODEL_KEY,
                    detail: format!(
                        "model reads at least {required} features but scaler produces {width}"
                    ),
                });
            }
        }

        Ok(Self {
            model,
            scaler,
            home_ownership_encoder,
            loan_intent_encoder,
            loan_grade_encoder,
            threshold,
            source: ArtifactSource {
                path: None,
                loaded_at: Utc::now(),
            },
        })
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Bundled home-ownership encoder. Scoring uses the static table instead.
    pub fn home_ownership_encoder(&self) -> &OrdinalEncoder {
        &self.home_ownership_encoder
    }

    pub fn loan_intent_encoder(&self) -> &OrdinalEncoder {
        &self.loan_intent_encoder
    }

    /// Bundled grade encoder. Scoring uses the static table instead.
    pub fn loan_grade_encoder(&self) -> &OrdinalEncoder {
        &self.loan_grade_encoder
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }
}

fn take_entry<T: DeserializeOwned>(
    document: &mut Map<String, Value>,
    key: &'static str,
) -> Result<T, ArtifactLoadError> {
    let value = document
        .remove(key)
        .ok_or(ArtifactLoadError::MissingKey { key })?;
    serde_json::from_value(value).map_err(|source| ArtifactLoadError::InvalidEntry { key, source })
}
