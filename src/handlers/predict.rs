//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::inference::InferenceError;
use crate::models::PredictResponse;
use crate::normalizer::NormalizeError;
use crate::{AppResult, AppState};

/// Normalize, scale and score one record
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let request_id = Uuid::new_v4();

    let Json(body) = payload.map_err(|rejection| NormalizeError::MalformedRecord(rejection.body_text()))?;
    tracing::debug!(%request_id, "Prediction input: {}", body);

    let features = state.normalizer.normalize_value(&body).map_err(|err| {
        tracing::info!(%request_id, "Rejected prediction input: {}", err);
        err
    })?;
    tracing::debug!(%request_id, "Normalized {} features", features.len());

    let predictor = state.predictor.as_ref().ok_or(InferenceError::ModelNotLoaded)?;
    let prediction = predictor.score(&features)?;

    tracing::info!(
        %request_id,
        "Prediction made: class={} probability={:.4}",
        prediction.class,
        prediction.probability
    );

    Ok(Json(PredictResponse::from(prediction)))
}

/// CORS preflight for cross-origin callers
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
