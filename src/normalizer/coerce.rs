//! Value coercion helpers

use serde_json::Value;

/// Numeric view of a loosely typed JSON value.
///
/// Numbers pass through, booleans map to 1/0 and strings are parsed after
/// trimming. Non-finite results are rejected.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Split `"<systolic>/<diastolic>"` into its two integer readings.
pub fn split_blood_pressure(value: &Value) -> Option<(u32, u32)> {
    let raw = value.as_str()?;
    let (systolic, diastolic) = raw.split_once('/')?;
    if diastolic.contains('/') {
        return None;
    }
    Some((systolic.trim().parse().ok()?, diastolic.trim().parse().ok()?))
}

/// Human-readable rendering used in category errors.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
