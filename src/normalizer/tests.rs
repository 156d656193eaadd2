//! Normalizer behaviour for both input shapes

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::rules::CategoricalRule;
use super::*;
use crate::schema::{FeatureSchema, DIRECT_FEATURES, FRIENDLY_FEATURES};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn direct_record() -> Map<String, Value> {
    let mut record = Map::new();
    for (i, name) in DIRECT_FEATURES.iter().enumerate() {
        record.insert(name.to_string(), json!(i as f64 + 0.5));
    }
    record
}

fn friendly_record() -> Map<String, Value> {
    object(json!({
        "Age": 54,
        "Sex": "Male",
        "Blood Pressure": "140/90",
        "Cholesterol": 230,
        "Heart Rate": 72,
        "Diabetes": true,
        "Family History": false,
        "Smoking": 1,
        "Obesity": 0,
        "Alcohol Consumption": 1,
        "Exercise Hours Per Week": 4.5,
        "Previous Heart Problems": false,
        "Medication Use": true,
        "Stress Level": 6,
        "Sedentary Hours Per Day": 7.2,
        "Income": 52000,
        "BMI": 27.4,
        "Triglycerides": 180,
        "Physical Activity Days Per Week": 3,
        "Sleep Hours Per Day": 7
    }))
}

fn friendly() -> Normalizer {
    Normalizer::new(FeatureSchema::friendly_default(), NormalizerConfig::for_mode(InputMode::Friendly))
}

fn direct() -> Normalizer {
    Normalizer::new(FeatureSchema::direct_default(), NormalizerConfig::for_mode(InputMode::Direct))
}

fn slot(normalizer: &Normalizer, vector: &FeatureVector, name: &str) -> f64 {
    let idx = normalizer
        .schema()
        .names()
        .iter()
        .position(|n| n == name)
        .unwrap();
    vector.as_slice()[idx]
}

// ============================================================================
// DIRECT MODE
// ============================================================================

#[test]
fn test_direct_passes_values_through_in_schema_order() {
    let vector = direct().normalize(&direct_record()).unwrap();

    assert_eq!(vector.len(), DIRECT_FEATURES.len());
    for (i, value) in vector.as_slice().iter().enumerate() {
        assert_eq!(*value, i as f64 + 0.5);
    }
}

#[test]
fn test_direct_reports_every_missing_feature() {
    let mut record = direct_record();
    record.remove("Cholesterol");
    record.remove("BMI");

    let err = direct().normalize(&record).unwrap_err();
    assert_eq!(
        err,
        NormalizeError::MissingFeature(vec!["Cholesterol".to_string(), "BMI".to_string()])
    );
}

#[test]
fn test_direct_extra_field_permissive_vs_strict() {
    let mut record = direct_record();
    record.insert("Favourite_Colour".to_string(), json!("blue"));

    let permissive = direct().normalize(&record).unwrap();
    assert_eq!(permissive.len(), DIRECT_FEATURES.len());

    let strict = Normalizer::new(
        FeatureSchema::direct_default(),
        NormalizerConfig::for_mode(InputMode::Direct).with_strict(true),
    );
    assert_eq!(
        strict.normalize(&record).unwrap_err(),
        NormalizeError::UnknownField("Favourite_Colour".to_string())
    );
}

#[test]
fn test_direct_coerces_numeric_strings() {
    let normalizer = direct();
    let mut record = direct_record();
    record.insert("Age".to_string(), json!("45"));
    let vector = normalizer.normalize(&record).unwrap();
    assert_eq!(slot(&normalizer, &vector, "Age"), 45.0);

    record.insert("Age".to_string(), json!("forty-five"));
    assert_eq!(
        normalizer.normalize(&record).unwrap_err(),
        NormalizeError::TypeCoercionError("Age".to_string())
    );
}

#[test]
fn test_direct_rejects_unencoded_categorical() {
    let mut record = direct_record();
    record.insert("Sex".to_string(), json!("Male"));

    assert_eq!(
        direct().normalize(&record).unwrap_err(),
        NormalizeError::TypeCoercionError("Sex".to_string())
    );
}

// ============================================================================
// FRIENDLY MODE
// ============================================================================

#[test]
fn test_friendly_full_record() {
    let normalizer = friendly();
    let vector = normalizer.normalize(&friendly_record()).unwrap();

    assert_eq!(vector.len(), FRIENDLY_FEATURES.len());
    assert_eq!(slot(&normalizer, &vector, "Age"), 54.0);
    assert_eq!(slot(&normalizer, &vector, "Heart_Rate"), 72.0);
    assert_eq!(slot(&normalizer, &vector, "Diabetes"), 1.0);
    assert_eq!(slot(&normalizer, &vector, "Family_History"), 0.0);
    assert_eq!(slot(&normalizer, &vector, "BP_Systolic"), 140.0);
    assert_eq!(slot(&normalizer, &vector, "BP_Diastolic"), 90.0);
    assert_eq!(slot(&normalizer, &vector, "Sex_Male"), 1.0);
    assert_eq!(slot(&normalizer, &vector, "Sex_Female"), 0.0);
}

#[test]
fn test_friendly_splits_blood_pressure() {
    let normalizer = friendly();
    let mut record = friendly_record();
    record.insert("Blood Pressure".to_string(), json!("120/80"));

    let vector = normalizer.normalize(&record).unwrap();
    assert_eq!(slot(&normalizer, &vector, "BP_Systolic"), 120.0);
    assert_eq!(slot(&normalizer, &vector, "BP_Diastolic"), 80.0);
}

#[test]
fn test_friendly_rejects_malformed_blood_pressure() {
    let normalizer = friendly();

    for bad in [json!("130-85"), json!("120/"), json!("abc/80"), json!(120)] {
        let mut record = friendly_record();
        record.insert("Blood Pressure".to_string(), bad.clone());
        assert_eq!(
            normalizer.normalize(&record).unwrap_err(),
            NormalizeError::InvalidFormat("Blood Pressure".to_string()),
            "value {} should be rejected",
            bad
        );
    }
}

#[test]
fn test_friendly_encodes_sex() {
    let normalizer = friendly();
    let mut record = friendly_record();
    record.insert("Sex".to_string(), json!("Female"));

    let vector = normalizer.normalize(&record).unwrap();
    assert_eq!(slot(&normalizer, &vector, "Sex_Male"), 0.0);
    assert_eq!(slot(&normalizer, &vector, "Sex_Female"), 1.0);
}

#[test]
fn test_friendly_rejects_unknown_sex() {
    let normalizer = friendly();

    for bad in ["male", "Other"] {
        let mut record = friendly_record();
        record.insert("Sex".to_string(), json!(bad));
        assert_eq!(
            normalizer.normalize(&record).unwrap_err(),
            NormalizeError::InvalidCategory {
                field: "Sex".to_string(),
                value: bad.to_string(),
            }
        );
    }

    let mut record = friendly_record();
    record.insert("Sex".to_string(), json!(1));
    assert!(matches!(
        normalizer.normalize(&record),
        Err(NormalizeError::InvalidCategory { .. })
    ));
}

#[test]
fn test_friendly_coercion() {
    let normalizer = friendly();

    let mut record = friendly_record();
    record.insert("Age".to_string(), json!("45"));
    let vector = normalizer.normalize(&record).unwrap();
    assert_eq!(slot(&normalizer, &vector, "Age"), 45.0);

    for bad in [json!("forty-five"), json!(null), json!([45])] {
        let mut record = friendly_record();
        record.insert("Age".to_string(), bad);
        assert_eq!(
            normalizer.normalize(&record).unwrap_err(),
            NormalizeError::TypeCoercionError("Age".to_string())
        );
    }
}

#[test]
fn test_friendly_missing_names_every_absent_slot() {
    let mut record = friendly_record();
    record.remove("Cholesterol");
    record.remove("Blood Pressure");

    let err = friendly().normalize(&record).unwrap_err();
    assert_eq!(
        err,
        NormalizeError::MissingFeature(vec![
            "Cholesterol".to_string(),
            "BP_Systolic".to_string(),
            "BP_Diastolic".to_string(),
        ])
    );
    assert!(err.to_string().contains("Cholesterol"));
}

#[test]
fn test_friendly_extra_field_strict_vs_permissive() {
    let mut record = friendly_record();
    record.insert("Diet".to_string(), json!("Average"));

    assert_eq!(
        friendly().normalize(&record).unwrap_err(),
        NormalizeError::UnknownField("Diet".to_string())
    );

    let permissive = Normalizer::new(
        FeatureSchema::friendly_default(),
        NormalizerConfig::for_mode(InputMode::Friendly).with_strict(false),
    );
    let vector = permissive.normalize(&record).unwrap();
    assert_eq!(vector, friendly().normalize(&friendly_record()).unwrap());
}

#[test]
fn test_friendly_accepts_backend_names() {
    let normalizer = friendly();
    let mut record = friendly_record();
    let rate = record.remove("Heart Rate").unwrap();
    record.insert("Heart_Rate".to_string(), rate);

    let vector = normalizer.normalize(&record).unwrap();
    assert_eq!(slot(&normalizer, &vector, "Heart_Rate"), 72.0);
}

#[test]
fn test_friendly_rejects_backend_names_for_rule_slots() {
    let permissive = Normalizer::new(
        FeatureSchema::friendly_default(),
        NormalizerConfig::for_mode(InputMode::Friendly).with_strict(false),
    );

    for normalizer in [friendly(), permissive] {
        let mut record = friendly_record();
        record.insert("Sex".to_string(), json!("Female"));
        record.insert("Sex_Male".to_string(), json!(1));
        assert_eq!(
            normalizer.normalize(&record).unwrap_err(),
            NormalizeError::UnknownField("Sex_Male".to_string())
        );

        let mut record = friendly_record();
        record.insert("BP_Systolic".to_string(), json!(999));
        assert_eq!(
            normalizer.normalize(&record).unwrap_err(),
            NormalizeError::UnknownField("BP_Systolic".to_string())
        );
    }
}

#[test]
fn test_friendly_rejects_rule_slots_without_their_source_field() {
    let mut record = friendly_record();
    record.remove("Sex");
    record.insert("Sex_Male".to_string(), json!(1));
    record.insert("Sex_Female".to_string(), json!(1));

    assert!(matches!(
        friendly().normalize(&record),
        Err(NormalizeError::UnknownField(_))
    ));
}

#[test]
fn test_friendly_rejects_friendly_and_backend_spelling_together() {
    let mut record = friendly_record();
    record.insert("Heart_Rate".to_string(), json!(180));

    assert_eq!(
        friendly().normalize(&record).unwrap_err(),
        NormalizeError::UnknownField("Heart_Rate".to_string())
    );
}

#[test]
fn test_schema_order_is_authoritative() {
    let mut names: Vec<&str> = FRIENDLY_FEATURES.to_vec();
    names.reverse();
    let reversed = Normalizer::new(FeatureSchema::new(names).unwrap(), NormalizerConfig::for_mode(InputMode::Friendly));

    let forward = friendly().normalize(&friendly_record()).unwrap().as_slice().to_vec();
    let mut backward = reversed.normalize(&friendly_record()).unwrap().as_slice().to_vec();
    backward.reverse();

    assert_eq!(forward, backward);
}

#[test]
fn test_non_object_body_is_malformed() {
    for body in [json!([1, 2, 3]), json!("Age"), json!(null)] {
        assert!(matches!(
            friendly().normalize_value(&body),
            Err(NormalizeError::MalformedRecord(_))
        ));
    }
}

#[test]
fn test_custom_categorical_rule() {
    let mut config = NormalizerConfig::for_mode(InputMode::Friendly);
    config.rules.categorical.push(CategoricalRule {
        field: "Diet".to_string(),
        slots: BTreeMap::from([
            ("Healthy".to_string(), "Diet_Healthy".to_string()),
            ("Unhealthy".to_string(), "Diet_Unhealthy".to_string()),
        ]),
    });
    let mut names: Vec<&str> = FRIENDLY_FEATURES.to_vec();
    names.extend(["Diet_Healthy", "Diet_Unhealthy"]);
    let normalizer = Normalizer::new(FeatureSchema::new(names).unwrap(), config);

    let mut record = friendly_record();
    record.insert("Diet".to_string(), json!("Unhealthy"));
    let vector = normalizer.normalize(&record).unwrap();
    assert_eq!(slot(&normalizer, &vector, "Diet_Healthy"), 0.0);
    assert_eq!(slot(&normalizer, &vector, "Diet_Unhealthy"), 1.0);
}

#[test]
fn test_unmapped_slots() {
    assert!(friendly().unmapped_slots().is_empty());
    assert!(direct().unmapped_slots().is_empty());

    let mut names: Vec<&str> = FRIENDLY_FEATURES.to_vec();
    names.push("Country_Code");
    let normalizer = Normalizer::new(FeatureSchema::new(names).unwrap(), NormalizerConfig::for_mode(InputMode::Friendly));
    assert_eq!(normalizer.unmapped_slots(), vec!["Country_Code".to_string()]);
}

#[test]
fn test_input_mode_parsing() {
    assert_eq!("direct".parse::<InputMode>().unwrap(), InputMode::Direct);
    assert_eq!("Friendly".parse::<InputMode>().unwrap(), InputMode::Friendly);
    assert!("csv".parse::<InputMode>().is_err());
    assert!(InputMode::Friendly.strict_by_default());
    assert!(!InputMode::Direct.strict_by_default());
}
