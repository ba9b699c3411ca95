use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;

use super::domain::{ApplicantRecord, Assessment, FeatureView, RiskLabel};
use super::service::CreditRiskService;

const FORM_PAGE: &str = include_str!("form.html");

/// Router builder exposing the intake form and scoring endpoints.
pub fn credit_risk_router(service: Arc<CreditRiskService>) -> Router {
    Router::new()
        .route("/", get(form_handler))
        .route("/api/v1/credit-risk/score", post(score_handler))
        .route("/api/v1/credit-risk/model", get(model_handler))
        .with_state(service)
}

/// Body returned by the scoring endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub label: RiskLabel,
    pub high_risk: bool,
    pub headline: &'static str,
    pub probability: f64,
    pub probability_display: String,
    pub threshold: f64,
    pub features: Vec<FeatureView>,
}

impl ScoreResponse {
    pub fn new(assessment: &Assessment, threshold: f64) -> Self {
        let result = assessment.result;
        Self {
            label: result.label,
            high_risk: result.is_high_risk(),
            headline: result.label.headline(),
            probability: result.probability,
            probability_display: result.probability_display(),
            threshold,
            features: assessment.features.to_views(),
        }
    }
}

pub(crate) async fn form_handler() -> Html<&'static str> {
    Html(FORM_PAGE)
}

pub(crate) async fn score_handler(
    State(service): State<Arc<CreditRiskService>>,
    payload: Result<Json<ApplicantRecord>, JsonRejection>,
) -> Result<Json<ScoreResponse>, AppError> {
    let Json(record) = payload?;
    let assessment = service.assess(&record)?;
    Ok(Json(ScoreResponse::new(
        &assessment,
        service.bundle().threshold(),
    )))
}

pub(crate) async fn model_handler(State(service): State<Arc<CreditRiskService>>) -> Response {
    (StatusCode::OK, Json(service.model_info())).into_response()
}
