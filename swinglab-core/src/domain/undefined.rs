//! Serde helpers for numeric fields that may be undefined (NaN).
//!
//! JSON has no NaN: `serde_json` writes it as `null`. These deserializers
//! read `null` back as NaN so results survive a JSON round trip.

use serde::{Deserialize, Deserializer};

/// `null` → NaN.
pub fn deserialize_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or(f64::NAN))
}

/// Element-wise `null` → NaN.
pub fn deserialize_vec<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<Option<f64>> = Deserialize::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}
