//! `#[serde(with = "nullable")]` for `f64` fields that may be non-finite.
//!
//! JSON has no NaN or infinity; serde_json writes them as `null`. This reads
//! `null` back as NaN so such records survive a round trip.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let value = value.is_finite().then_some(*value);
    value.serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// The same mapping for every element of a matrix's rows.
pub mod rows {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Option<f64>>> = rows
            .iter()
            .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect())
            .collect();
        rows.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let rows = Vec::<Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Score {
        #[serde(with = "super")]
        value: f64,
    }

    #[test]
    fn non_finite_values_round_trip_as_nan() {
        for value in [f64::NAN, f64::INFINITY] {
            let json = serde_json::to_string(&Score { value }).unwrap();
            assert_eq!(json, r#"{"value":null}"#);
            let back: Score = serde_json::from_str(&json).unwrap();
            assert!(back.value.is_nan());
        }
    }

    #[test]
    fn finite_values_are_untouched() {
        let json = serde_json::to_string(&Score { value: 0.25 }).unwrap();
        assert_eq!(json, r#"{"value":0.25}"#);
        let back: Score = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, 0.25);
    }
}
