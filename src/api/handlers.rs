use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::ml::PredictorInfo;
use crate::models::{all_attributes, AttributeOptions, FraudAssessment, LoanApplication};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        model: state.predictor.metadata().name.clone(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: String,
}

/// Score a submitted application form
pub async fn predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let Json(body) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let application = LoanApplication::from_json(body)?;

    let assessment = state.predictor.assess(&application)?;
    let message = assessment.summary();

    Ok(Json(PredictResponse {
        assessment,
        message,
    }))
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub assessment: FraudAssessment,

    /// Human-readable verdict line
    pub message: String,
}

/// Loaded model, feature list and categorical coverage
pub async fn schema(State(state): State<AppState>) -> Json<PredictorInfo> {
    Json(state.predictor.info())
}

/// Categorical options accepted by the form
pub async fn options() -> Json<Vec<AttributeOptions>> {
    Json(all_attributes())
}
