//! Friendly-record decoding rules
//!
//! Everything the friendly decoder knows about field names lives here as
//! data, so a schema change only needs a new rules file.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::inference::ArtifactError;

/// Composite `"<systolic>/<diastolic>"` field split into two integer slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureRule {
    pub field: String,
    pub systolic: String,
    pub diastolic: String,
}

impl Default for BloodPressureRule {
    fn default() -> Self {
        Self {
            field: "Blood Pressure".to_string(),
            systolic: "BP_Systolic".to_string(),
            diastolic: "BP_Diastolic".to_string(),
        }
    }
}

/// One-hot encoding of a categorical field.
///
/// `slots` maps each accepted value (matched case-sensitively) to the
/// indicator slot it sets. Every other slot of the rule is set to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalRule {
    pub field: String,
    pub slots: BTreeMap<String, String>,
}

impl CategoricalRule {
    pub fn sex() -> Self {
        Self {
            field: "Sex".to_string(),
            slots: BTreeMap::from([
                ("Male".to_string(), "Sex_Male".to_string()),
                ("Female".to_string(), "Sex_Female".to_string()),
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendlyRules {
    #[serde(default)]
    pub blood_pressure: Option<BloodPressureRule>,

    #[serde(default)]
    pub categorical: Vec<CategoricalRule>,

    /// Friendly fields that must coerce to a number.
    #[serde(default)]
    pub numeric: Vec<String>,

    /// Friendly name -> backend schema name.
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

/// (friendly name, backend name) pairs for the plain numeric fields.
const NUMERIC_FIELDS: &[(&str, &str)] = &[
    ("Age", "Age"),
    ("Cholesterol", "Cholesterol"),
    ("Heart Rate", "Heart_Rate"),
    ("Diabetes", "Diabetes"),
    ("Family History", "Family_History"),
    ("Smoking", "Smoking"),
    ("Obesity", "Obesity"),
    ("Alcohol Consumption", "Alcohol_Consumption"),
    ("Exercise Hours Per Week", "Exercise_Hours_Per_Week"),
    ("Previous Heart Problems", "Previous_Heart_Problems"),
    ("Medication Use", "Medication_Use"),
    ("Stress Level", "Stress_Level"),
    ("Sedentary Hours Per Day", "Sedentary_Hours_Per_Day"),
    ("Income", "Income"),
    ("BMI", "BMI"),
    ("Triglycerides", "Triglycerides"),
    ("Physical Activity Days Per Week", "Physical_Activity_Days_Per_Week"),
    ("Sleep Hours Per Day", "Sleep_Hours_Per_Day"),
];

impl Default for FriendlyRules {
    fn default() -> Self {
        Self {
            blood_pressure: Some(BloodPressureRule::default()),
            categorical: vec![CategoricalRule::sex()],
            numeric: NUMERIC_FIELDS.iter().map(|(f, _)| f.to_string()).collect(),
            translations: NUMERIC_FIELDS
                .iter()
                .map(|(f, b)| (f.to_string(), b.to_string()))
                .collect(),
        }
    }
}

impl FriendlyRules {
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Backend names these rules can ever produce.
    pub fn produced_slots(&self) -> Vec<&str> {
        let mut slots: Vec<&str> = self.translations.values().map(String::as_str).collect();
        slots.extend(self.composite_slots());
        slots
    }

    /// Slots only the blood-pressure and categorical rules may set.
    pub fn composite_slots(&self) -> Vec<&str> {
        let mut slots = Vec::new();
        if let Some(bp) = &self.blood_pressure {
            slots.push(bp.systolic.as_str());
            slots.push(bp.diastolic.as_str());
        }
        for rule in &self.categorical {
            slots.extend(rule.slots.values().map(String::as_str));
        }
        slots
    }
}
