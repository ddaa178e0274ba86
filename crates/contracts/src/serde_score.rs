//! Serde adapter for scores, which may be `+∞`.
//!
//! JSON has no infinity, so non-finite scores travel as strings. `null` reads
//! back as `+∞` because that is what a JavaScript producer emits for it.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if value.is_sign_positive() {
        serializer.serialize_str("Infinity")
    } else {
        serializer.serialize_str("-Infinity")
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScoreInput {
        Number(f64),
        String(String),
    }

    match Option::<ScoreInput>::deserialize(deserializer)? {
        None => Ok(f64::INFINITY),
        Some(ScoreInput::Number(value)) => Ok(value),
        Some(ScoreInput::String(raw)) => raw.trim().parse::<f64>().map_err(D::Error::custom),
    }
}
