//! Artifact loading
//!
//! Model, scaler, schema and rules files are read once at startup. Every
//! failure here is a deployment problem, not a request problem.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use super::{Classifier, ClassifierArtifact, FeatureScaler, Predictor, ScalerArtifact};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: String, reason: String },

    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    #[error("{artifact} expects {actual} features but the schema has {expected}")]
    DimensionMismatch {
        artifact: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// SHA-256 of an artifact's bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(
        "Loading artifact {} ({} bytes, sha256 {})",
        path.display(),
        bytes.len(),
        fingerprint(&bytes)
    );

    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load and cross-check the scaler and classifier against the schema width.
pub fn load_predictor(
    model_path: &Path,
    scaler_path: &Path,
    n_features: usize,
) -> Result<Predictor, ArtifactError> {
    let scaler: ScalerArtifact = load_json(scaler_path)?;
    scaler.validate().map_err(|reason| ArtifactError::Invalid {
        path: scaler_path.display().to_string(),
        reason,
    })?;
    check_width("scaler", scaler.n_features(), n_features)?;

    let classifier: ClassifierArtifact = load_json(model_path)?;
    classifier.validate().map_err(|reason| ArtifactError::Invalid {
        path: model_path.display().to_string(),
        reason,
    })?;
    check_width("model", classifier.n_features(), n_features)?;

    tracing::info!("{} loaded successfully", classifier.model_type());

    Ok(Predictor::new(Arc::new(scaler), Arc::new(classifier)))
}

fn check_width(artifact: &'static str, actual: Option<usize>, expected: usize) -> Result<(), ArtifactError> {
    match actual {
        Some(actual) if actual != expected => Err(ArtifactError::DimensionMismatch {
            artifact,
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}
