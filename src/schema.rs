//! Feature schema - ordered feature slots the model was trained on
//!
//! The schema is the single source of truth for vector layout. Slot order is
//! fixed at training time and every vector handed to the scaler follows it.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::inference::ArtifactError;

/// Backend feature names of the raw 24-feature record, in training order.
pub const DIRECT_FEATURES: &[&str] = &[
    "Age",
    "Sex",
    "Cholesterol",
    "Blood_Pressure",
    "Heart_Rate",
    "Diabetes",
    "Family_History",
    "Smoking",
    "Obesity",
    "Alcohol_Consumption",
    "Exercise_Hours_Per_Week",
    "Diet",
    "Previous_Heart_Problems",
    "Medication_Use",
    "Stress_Level",
    "Sedentary_Hours_Per_Day",
    "Income",
    "BMI",
    "Triglycerides",
    "Physical_Activity_Days_Per_Week",
    "Sleep_Hours_Per_Day",
    "Country",
    "Continent",
    "Hemisphere",
];

/// Backend feature names expected after friendly-record decoding.
pub const FRIENDLY_FEATURES: &[&str] = &[
    "Age",
    "Cholesterol",
    "Heart_Rate",
    "Diabetes",
    "Family_History",
    "Smoking",
    "Obesity",
    "Alcohol_Consumption",
    "Exercise_Hours_Per_Week",
    "Previous_Heart_Problems",
    "Medication_Use",
    "Stress_Level",
    "Sedentary_Hours_Per_Day",
    "Income",
    "BMI",
    "Triglycerides",
    "Physical_Activity_Days_Per_Week",
    "Sleep_Hours_Per_Day",
    "BP_Systolic",
    "BP_Diastolic",
    "Sex_Male",
    "Sex_Female",
];

/// Ordered, duplicate-free list of feature names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(ArtifactError::InvalidSchema("feature list is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::InvalidSchema(format!(
                    "duplicate feature name: {}",
                    name
                )));
            }
        }

        Ok(Self { names })
    }

    /// Load a schema from a JSON array of strings.
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let names: Vec<String> = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(names)
    }

    pub fn direct_default() -> Self {
        Self {
            names: DIRECT_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn friendly_default() -> Self {
        Self {
            names: FRIENDLY_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

// ============================================================================
// FEATURE DESCRIPTORS
// ============================================================================

/// Value kind shown to API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Numeric,
    Categorical,
    Boolean,
}

/// `/model-info` entry for one schema slot.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub description: String,
}

const CATALOGUE: &[(&str, FeatureKind, &str)] = &[
    ("Age", FeatureKind::Numeric, "Age of the patient"),
    ("Sex", FeatureKind::Categorical, "Gender of the patient"),
    ("Sex_Male", FeatureKind::Boolean, "Patient is male"),
    ("Sex_Female", FeatureKind::Boolean, "Patient is female"),
    ("Cholesterol", FeatureKind::Numeric, "Cholesterol level"),
    ("Blood_Pressure", FeatureKind::Numeric, "Blood pressure reading"),
    ("BP_Systolic", FeatureKind::Numeric, "Systolic blood pressure (mmHg)"),
    ("BP_Diastolic", FeatureKind::Numeric, "Diastolic blood pressure (mmHg)"),
    ("Heart_Rate", FeatureKind::Numeric, "Heart rate"),
    ("Diabetes", FeatureKind::Boolean, "Whether patient has diabetes"),
    ("Family_History", FeatureKind::Boolean, "Family history of heart disease"),
    ("Smoking", FeatureKind::Boolean, "Smoking status"),
    ("Obesity", FeatureKind::Boolean, "Obesity status"),
    ("Alcohol_Consumption", FeatureKind::Categorical, "Level of alcohol consumption"),
    ("Exercise_Hours_Per_Week", FeatureKind::Numeric, "Hours of exercise per week"),
    ("Diet", FeatureKind::Categorical, "Type of diet"),
    ("Previous_Heart_Problems", FeatureKind::Boolean, "History of heart problems"),
    ("Medication_Use", FeatureKind::Boolean, "Current medication use"),
    ("Stress_Level", FeatureKind::Numeric, "Stress level (1-10)"),
    ("Sedentary_Hours_Per_Day", FeatureKind::Numeric, "Hours of sedentary activity per day"),
    ("Income", FeatureKind::Numeric, "Income level"),
    ("BMI", FeatureKind::Numeric, "Body Mass Index"),
    ("Triglycerides", FeatureKind::Numeric, "Triglycerides level"),
    ("Physical_Activity_Days_Per_Week", FeatureKind::Numeric, "Days of physical activity per week"),
    ("Sleep_Hours_Per_Day", FeatureKind::Numeric, "Hours of sleep per day"),
    ("Country", FeatureKind::Categorical, "Country of residence"),
    ("Continent", FeatureKind::Categorical, "Continent of residence"),
    ("Hemisphere", FeatureKind::Categorical, "Hemisphere of residence"),
];

/// Describe every schema slot, in schema order.
///
/// Names outside the catalogue are reported as numeric with an empty
/// description.
pub fn describe(schema: &FeatureSchema) -> Vec<FeatureDescriptor> {
    schema
        .names()
        .iter()
        .map(|name| {
            let (kind, description) = CATALOGUE
                .iter()
                .find(|(n, _, _)| n == name)
                .map(|(_, kind, desc)| (*kind, desc.to_string()))
                .unwrap_or((FeatureKind::Numeric, String::new()));
            FeatureDescriptor {
                name: name.clone(),
                kind,
                description,
            }
        })
        .collect()
}
