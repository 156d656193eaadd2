//! Static model descriptor served by /model-info

use serde::Serialize;

use crate::normalizer::{InputMode, Normalizer};
use crate::schema::{self, FeatureDescriptor};

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub features: Vec<FeatureDescriptor>,
    pub version: String,
    pub input_mode: InputMode,
}

impl ModelInfo {
    /// Built once at startup; the schema and model never change afterwards.
    pub fn new(model_type: impl Into<String>, normalizer: &Normalizer, version: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            features: schema::describe(normalizer.schema()),
            version: version.into(),
            input_mode: normalizer.mode(),
        }
    }
}
