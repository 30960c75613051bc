//! Serde adapters for the JSON payload contract.

/// JSON has no NaN or infinity: non-finite numeric fields serialize as
/// null and deserialize back to NaN.
pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super::nan_as_null")]
        value: f64,
    }

    #[test]
    fn test_nan_maps_to_null_and_back() {
        let json = serde_json::to_string(&Wrapper { value: f64::NAN }).unwrap();
        assert_eq!(json, r#"{"value":null}"#);
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_nan());
    }

    #[test]
    fn test_finite_value_untouched() {
        let json = serde_json::to_string(&Wrapper { value: 0.25 }).unwrap();
        assert_eq!(json, r#"{"value":0.25}"#);
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, 0.25);
    }

    #[test]
    fn test_infinity_maps_to_null() {
        let json = serde_json::to_string(&Wrapper {
            value: f64::INFINITY,
        })
        .unwrap();
        assert_eq!(json, r#"{"value":null}"#);
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_nan());
    }
}
