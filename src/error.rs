//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::inference::InferenceError;
use crate::normalizer::NormalizeError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Caller input errors
    Validation(NormalizeError),

    // Collaborator errors
    ModelNotLoaded,
    Inference(InferenceError),
}

impl AppError {
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            _ => "server",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(err) => {
                tracing::debug!("Validation error: {}", err);
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::ModelNotLoaded => {
                tracing::error!("Prediction requested but no model is loaded");
                (StatusCode::INTERNAL_SERVER_ERROR, "Model not loaded".to_string())
            }
            AppError::Inference(err) => {
                tracing::error!("Inference error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error making prediction".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "error_type": self.error_type(),
        }));

        (status, body).into_response()
    }
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::Validation(err)
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelNotLoaded => AppError::ModelNotLoaded,
            other => AppError::Inference(other),
        }
    }
}
