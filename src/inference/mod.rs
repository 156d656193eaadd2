//! Inference collaborators - scaler and classifier
//!
//! Both are opaque to the rest of the service: a scaler maps a feature vector
//! to a scaled vector, a classifier maps a scaled vector to class
//! probabilities. The JSON-artifact implementations live in submodules; tests
//! swap in their own.

mod artifacts;
mod classifier;
mod scaler;

use std::sync::Arc;

use serde::Serialize;

use crate::normalizer::FeatureVector;

pub use artifacts::{load_predictor, ArtifactError};
pub use classifier::ClassifierArtifact;
pub use scaler::ScalerArtifact;

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Per-request scoring failure. Never the caller's fault.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model not loaded")]
    ModelNotLoaded,

    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid model output: {0}")]
    InvalidOutput(String),
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

pub trait FeatureScaler: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Expected input width, when the scaler knows it.
    fn n_features(&self) -> Option<usize>;
}

pub trait Classifier: Send + Sync {
    /// Class probabilities, indexed by class label.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Human-readable model kind for `/model-info`.
    fn model_type(&self) -> &str;

    fn n_features(&self) -> Option<usize>;

    /// Most probable class and the positive-class probability.
    fn predict(&self, features: &[f64]) -> Result<Prediction, InferenceError> {
        let proba = self.predict_proba(features)?;

        let positive = *proba.get(1).ok_or_else(|| {
            InferenceError::InvalidOutput(format!("expected 2 class probabilities, got {}", proba.len()))
        })?;
        if !positive.is_finite() || !(0.0..=1.0).contains(&positive) {
            return Err(InferenceError::InvalidOutput(format!(
                "probability out of range: {}",
                positive
            )));
        }

        let mut class = 0;
        for (idx, p) in proba.iter().enumerate() {
            if *p > proba[class] {
                class = idx;
            }
        }

        Ok(Prediction {
            class: class as i64,
            probability: positive,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub class: i64,
    pub probability: f64,
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// Loaded scaler + classifier pair, shared read-only by all requests.
#[derive(Clone)]
pub struct Predictor {
    scaler: Arc<dyn FeatureScaler>,
    classifier: Arc<dyn Classifier>,
}

impl Predictor {
    pub fn new(scaler: Arc<dyn FeatureScaler>, classifier: Arc<dyn Classifier>) -> Self {
        Self { scaler, classifier }
    }

    pub fn model_type(&self) -> &str {
        self.classifier.model_type()
    }

    pub fn score(&self, features: &FeatureVector) -> Result<Prediction, InferenceError> {
        let scaled = self.scaler.transform(features.as_slice())?;
        self.classifier.predict(&scaled)
    }
}
