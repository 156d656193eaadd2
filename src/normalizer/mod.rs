//! Feature Normalizer
//!
//! Turns one caller-supplied JSON record into the ordered numeric vector the
//! scaler and classifier expect, or reports exactly which field is wrong.
//!
//! Two input shapes are supported by the same normalizer:
//!
//! - `Direct`: the record already uses backend feature names. Each schema
//!   slot is looked up and coerced to a number.
//! - `Friendly`: the record uses human field names and composite values
//!   (`"Blood Pressure": "120/80"`, `"Sex": "Male"`). Rules from
//!   [`FriendlyRules`] decode it into backend slots first.
//!
//! Schema order is authoritative. Input key order never matters.

mod coerce;
mod rules;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::FeatureSchema;

pub use rules::FriendlyRules;

// ============================================================================
// ERRORS
// ============================================================================

/// Caller input problems. Always reported back as a validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Missing required feature(s): {}", .0.join(", "))]
    MissingFeature(Vec<String>),

    #[error("Invalid format for field '{0}': expected \"<systolic>/<diastolic>\" with integer readings")]
    InvalidFormat(String),

    #[error("Invalid value for field '{field}': '{value}'")]
    InvalidCategory { field: String, value: String },

    #[error("Field '{0}' must be numeric")]
    TypeCoercionError(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Input record shape accepted by a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Direct,
    Friendly,
}

impl InputMode {
    /// Direct records tolerate extra keys, friendly records reject them.
    pub fn strict_by_default(self) -> bool {
        matches!(self, InputMode::Friendly)
    }

    pub fn default_schema(self) -> FeatureSchema {
        match self {
            InputMode::Direct => FeatureSchema::direct_default(),
            InputMode::Friendly => FeatureSchema::friendly_default(),
        }
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "raw" => Ok(InputMode::Direct),
            "friendly" => Ok(InputMode::Friendly),
            other => Err(format!("unknown input mode: {}", other)),
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Direct => write!(f, "direct"),
            InputMode::Friendly => write!(f, "friendly"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub mode: InputMode,
    /// Reject fields that no rule or schema slot accounts for.
    pub strict: bool,
    pub rules: FriendlyRules,
}

impl NormalizerConfig {
    /// Built-in rules with the mode's default strictness.
    pub fn for_mode(mode: InputMode) -> Self {
        Self {
            mode,
            strict: mode.strict_by_default(),
            rules: FriendlyRules::default(),
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Validated numeric values in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

pub struct Normalizer {
    schema: FeatureSchema,
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(schema: FeatureSchema, config: NormalizerConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn mode(&self) -> InputMode {
        self.config.mode
    }

    pub fn is_strict(&self) -> bool {
        self.config.strict
    }

    /// Normalize an arbitrary JSON value, which must be an object.
    pub fn normalize_value(&self, body: &Value) -> Result<FeatureVector, NormalizeError> {
        match body {
            Value::Object(record) => self.normalize(record),
            other => Err(NormalizeError::MalformedRecord(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn normalize(&self, record: &Map<String, Value>) -> Result<FeatureVector, NormalizeError> {
        match self.config.mode {
            InputMode::Direct => self.normalize_direct(record),
            InputMode::Friendly => self.normalize_friendly(record),
        }
    }

    /// Schema slots no friendly rule produces.
    ///
    /// Callers can only fill these by sending the backend name itself.
    /// Always empty in direct mode.
    pub fn unmapped_slots(&self) -> Vec<String> {
        if self.config.mode == InputMode::Direct {
            return Vec::new();
        }
        let produced = self.config.rules.produced_slots();
        self.schema
            .names()
            .iter()
            .filter(|name| !produced.contains(&name.as_str()))
            .cloned()
            .collect()
    }

    fn normalize_direct(&self, record: &Map<String, Value>) -> Result<FeatureVector, NormalizeError> {
        if self.config.strict {
            if let Some(extra) = record.keys().find(|key| !self.schema.contains(key)) {
                return Err(NormalizeError::UnknownField(extra.clone()));
            }
        }

        self.check_missing(|name| record.contains_key(name))?;

        let values = self
            .schema
            .names()
            .iter()
            .map(|name| {
                coerce::to_number(&record[name])
                    .ok_or_else(|| NormalizeError::TypeCoercionError(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector { values })
    }

    fn normalize_friendly(&self, record: &Map<String, Value>) -> Result<FeatureVector, NormalizeError> {
        let rules = &self.config.rules;
        let mut remaining = record.clone();
        let mut decoded: HashMap<String, f64> = HashMap::with_capacity(self.schema.len());

        // Composite blood pressure
        if let Some(bp) = &rules.blood_pressure {
            if let Some(value) = remaining.remove(&bp.field) {
                let (systolic, diastolic) = coerce::split_blood_pressure(&value)
                    .ok_or_else(|| NormalizeError::InvalidFormat(bp.field.clone()))?;
                decoded.insert(bp.systolic.clone(), f64::from(systolic));
                decoded.insert(bp.diastolic.clone(), f64::from(diastolic));
            }
        }

        // One-hot categoricals
        for rule in &rules.categorical {
            let Some(value) = remaining.remove(&rule.field) else {
                continue;
            };
            let slot = value
                .as_str()
                .and_then(|v| rule.slots.get(v))
                .ok_or_else(|| NormalizeError::InvalidCategory {
                    field: rule.field.clone(),
                    value: coerce::display_value(&value),
                })?;
            for indicator in rule.slots.values() {
                decoded.insert(indicator.clone(), 0.0);
            }
            decoded.insert(slot.clone(), 1.0);
        }

        // Numeric coercion, keyed by friendly name until translation
        let mut numeric: Vec<(String, f64)> = Vec::with_capacity(rules.numeric.len());
        for field in &rules.numeric {
            if let Some(value) = remaining.remove(field) {
                let n = coerce::to_number(&value)
                    .ok_or_else(|| NormalizeError::TypeCoercionError(field.clone()))?;
                numeric.push((field.clone(), n));
            }
        }

        // Name translation
        for (field, n) in numeric {
            match self.backend_name(&field) {
                Some(backend) => {
                    decoded.insert(backend.to_string(), n);
                }
                None if self.config.strict => return Err(NormalizeError::UnknownField(field)),
                None => {}
            }
        }
        let composite = rules.composite_slots();
        for (field, value) in remaining {
            let Some(backend) = self.backend_name(&field) else {
                if self.config.strict {
                    return Err(NormalizeError::UnknownField(field));
                }
                continue;
            };
            // Rule-owned or already decoded slots cannot be set a second time.
            if composite.contains(&backend) || decoded.contains_key(backend) {
                return Err(NormalizeError::UnknownField(field));
            }
            if !self.schema.contains(backend) {
                continue;
            }
            let n = coerce::to_number(&value)
                .ok_or_else(|| NormalizeError::TypeCoercionError(field.clone()))?;
            decoded.insert(backend.to_string(), n);
        }

        self.check_missing(|name| decoded.contains_key(name))?;

        let values = self.schema.names().iter().map(|name| decoded[name]).collect();
        Ok(FeatureVector { values })
    }

    /// Backend name for a friendly field, if any.
    ///
    /// Fields already spelled as a schema slot are accepted unchanged.
    fn backend_name<'a>(&'a self, field: &'a str) -> Option<&'a str> {
        self.config
            .rules
            .translations
            .get(field)
            .map(String::as_str)
            .or_else(|| self.schema.contains(field).then_some(field))
    }

    fn check_missing(&self, present: impl Fn(&str) -> bool) -> Result<(), NormalizeError> {
        let missing: Vec<String> = self
            .schema
            .names()
            .iter()
            .filter(|name| !present(name))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(NormalizeError::MissingFeature(missing))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
