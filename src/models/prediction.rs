//! Prediction response

use serde::Serialize;

use crate::inference::Prediction;

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub prediction: i64,
    pub probability: f64,
    pub message: String,
}

impl From<Prediction> for PredictResponse {
    fn from(p: Prediction) -> Self {
        let message = if p.class == 1 {
            "High risk of heart attack"
        } else {
            "Low risk of heart attack"
        };

        Self {
            prediction: p.class,
            probability: p.probability,
            message: message.to_string(),
        }
    }
}
