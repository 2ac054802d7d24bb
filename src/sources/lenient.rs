//! Field decoders that never fail.
//!
//! Used with `#[serde(default, deserialize_with = "...")]` on the leaf fields
//! of a response block: a `null` or wrongly typed value decodes as unknown
//! instead of rejecting the whole response. Only the enclosing block itself
//! is required to be an object.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A number, or `None` for anything else.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// A string, or `None` for anything else.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .map(String::from))
}

/// An array of numbers; non-numeric entries become `None`, a non-array is empty.
pub fn numbers<'de, D>(deserializer: D) -> Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(entries(Value::deserialize(deserializer)?)
        .iter()
        .map(Value::as_f64)
        .collect())
}

/// An array of strings; non-string entries become `None`, a non-array is empty.
pub fn texts<'de, D>(deserializer: D) -> Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(entries(Value::deserialize(deserializer)?)
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect())
}

/// An array of labels; only the string entries are kept.
pub fn labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(entries(Value::deserialize(deserializer)?)
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect())
}

fn entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Block {
        #[serde(default, deserialize_with = "number")]
        value: Option<f64>,
        #[serde(default, deserialize_with = "texts")]
        stamps: Vec<Option<String>>,
        #[serde(default, deserialize_with = "numbers")]
        series: Vec<Option<f64>>,
    }

    #[test]
    fn test_null_and_wrong_types_become_unknown() {
        let block: Block =
            serde_json::from_str(r#"{"value": "n/a", "stamps": null, "series": 3}"#).unwrap();
        assert_eq!(block.value, None);
        assert!(block.stamps.is_empty());
        assert!(block.series.is_empty());
    }

    #[test]
    fn test_mixed_entries_keep_positions() {
        let block: Block = serde_json::from_str(
            r#"{"value": 1.5, "stamps": ["2024-01-11T05:12", 7], "series": [0.4, "x", null, 2]}"#,
        )
        .unwrap();
        assert_eq!(block.value, Some(1.5));
        assert_eq!(block.stamps, vec![Some("2024-01-11T05:12".to_string()), None]);
        assert_eq!(block.series, vec![Some(0.4), None, None, Some(2.0)]);
    }

    #[test]
    fn test_missing_keys_default() {
        let block: Block = serde_json::from_str("{}").unwrap();
        assert_eq!(block.value, None);
        assert!(block.series.is_empty());
    }
}
