use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::scoring::artifact::{ArtifactBundle, Classifier, OrdinalEncoder, StandardScaler};
use crate::scoring::domain::{ApplicantRecord, HomeOwnership, LoanGrade, LoanIntent};
use crate::scoring::scorer::ScoringError;
use crate::scoring::service::CreditRiskService;

pub(super) const INTENT_CATEGORIES: [&str; 6] = [
    "DEBTCONSOLIDATION",
    "EDUCATION",
    "HOMEIMPROVEMENT",
    "MEDICAL",
    "PERSONAL",
    "VENTURE",
];

/// Classifier that ignores its input and always answers the same probability.
#[derive(Debug)]
pub(super) struct ConstantModel {
    pub(super) probability: f64,
    pub(super) width: usize,
}

impl Classifier for ConstantModel {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.width)
    }

    fn predict_proba(&self, row: &[f64]) -> Result<f64, ScoringError> {
        if row.len() != self.width {
            return Err(ScoringError::ArityMismatch {
                stage: "model",
                expected: self.width,
                actual: row.len(),
            });
        }
        Ok(self.probability)
    }
}

pub(super) fn home_ownership_encoder() -> OrdinalEncoder {
    OrdinalEncoder::new(["MORTGAGE", "OTHER", "OWN", "RENT"])
}

pub(super) fn loan_intent_encoder() -> OrdinalEncoder {
    OrdinalEncoder::new(INTENT_CATEGORIES)
}

pub(super) fn loan_grade_encoder() -> OrdinalEncoder {
    OrdinalEncoder::new(["A", "B", "C", "D", "E", "F", "G"])
}

pub(super) fn stub_bundle(probability: f64, threshold: f64) -> ArtifactBundle {
    ArtifactBundle::from_parts(
        Arc::new(ConstantModel {
            probability,
            width: 10,
        }),
        StandardScaler::identity(10),
        home_ownership_encoder(),
        loan_intent_encoder(),
        loan_grade_encoder(),
        threshold,
    )
    .expect("stub bundle is consistent")
}

pub(super) fn stub_service(probability: f64, threshold: f64) -> CreditRiskService {
    CreditRiskService::new(Arc::new(stub_bundle(probability, threshold)))
}

pub(super) fn scenario_record() -> ApplicantRecord {
    ApplicantRecord {
        age: 30,
        annual_income: 50_000.0,
        employment_length_years: 5.0,
        credit_history_length_years: 5,
        home_ownership: HomeOwnership::Rent,
        loan_intent: LoanIntent::Personal,
        loan_grade: LoanGrade::B,
        loan_amount: 20_000.0,
        interest_rate_percent: 12.5,
        loan_percent_income: 0.3,
    }
}

/// Bundle document with a logistic model weighting only the interest rate.
pub(super) fn logistic_document() -> Value {
    json!({
        "best_model": {
            "kind": "logistic",
            "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            "intercept": 0.0
        },
        "scaler": {
            "mean": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 12.5, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.5, 1.0, 1.0]
        },
        "encoder": { "categories": ["MORTGAGE", "OTHER", "OWN", "RENT"] },
        "loanencoder": { "categories": INTENT_CATEGORIES },
        "ohe": { "categories": ["A", "B", "C", "D", "E", "F", "G"] },
        "threshold": 0.5
    })
}

pub(super) fn document_map(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
