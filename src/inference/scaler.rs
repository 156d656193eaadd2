//! Scaler artifacts exported from training

use serde::Deserialize;

use super::{FeatureScaler, InferenceError};

/// Fitted scaler parameters.
///
/// Zero spreads are treated as 1 so constant training columns pass through
/// centred instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },

    /// `(x - min) / (max - min)`
    MinMax { min: Vec<f64>, max: Vec<f64> },

    Identity,
}

impl ScalerArtifact {
    /// Check internal consistency after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        let (a, b, names) = match self {
            ScalerArtifact::Standard { mean, scale } => (mean, scale, ("mean", "scale")),
            ScalerArtifact::MinMax { min, max } => (min, max, ("min", "max")),
            ScalerArtifact::Identity => return Ok(()),
        };

        if a.len() != b.len() {
            return Err(format!(
                "{} has {} entries but {} has {}",
                names.0,
                a.len(),
                names.1,
                b.len()
            ));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }
}

impl FeatureScaler for ScalerArtifact {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if let Some(expected) = self.n_features() {
            if expected != features.len() {
                return Err(InferenceError::DimensionMismatch {
                    expected,
                    actual: features.len(),
                });
            }
        }

        let scaled = match self {
            ScalerArtifact::Standard { mean, scale } => features
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / nonzero(*s))
                .collect(),
            ScalerArtifact::MinMax { min, max } => features
                .iter()
                .zip(min.iter().zip(max))
                .map(|(x, (lo, hi))| (x - lo) / nonzero(hi - lo))
                .collect(),
            ScalerArtifact::Identity => features.to_vec(),
        };
        Ok(scaled)
    }

    fn n_features(&self) -> Option<usize> {
        match self {
            ScalerArtifact::Standard { mean, .. } => Some(mean.len()),
            ScalerArtifact::MinMax { min, .. } => Some(min.len()),
            ScalerArtifact::Identity => None,
        }
    }
}

fn nonzero(spread: f64) -> f64 {
    if spread == 0.0 {
        1.0
    } else {
        spread
    }
}
