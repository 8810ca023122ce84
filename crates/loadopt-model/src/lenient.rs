//! Tolerant field decoders
//!
//! Other clients write the same document, so numeric fields may arrive as
//! null, as numeric strings or out of range. A bad value falls back to a
//! default instead of failing the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u32(n: f64) -> u32 {
    // float to int casts saturate
    n.trunc() as u32
}

/// Number, zero when null or unparseable
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| as_f64(&v).unwrap_or(0.0))
}

/// Optional number, `None` when null or unparseable
pub(crate) fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| as_f64(&v))
}

/// Unit count, at least one
pub(crate) fn qty<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| as_f64(&v).map_or(1, to_u32).max(1))
}

/// Optional non-negative count, `None` when negative or unparseable
pub(crate) fn opt_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| as_f64(&v).filter(|n| *n >= 0.0).map(to_u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "number")]
        n: f64,
        #[serde(default, deserialize_with = "opt_number")]
        o: Option<f64>,
        #[serde(default = "one", deserialize_with = "qty")]
        q: u32,
        #[serde(default, deserialize_with = "opt_count")]
        c: Option<u32>,
    }

    fn one() -> u32 {
        1
    }

    fn decode(value: Value) -> Fields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn numbers_accept_strings_and_null() {
        let p = decode(json!({"n": "12.5", "o": null}));
        assert_eq!(p.n, 12.5);
        assert_eq!(p.o, None);
        let p = decode(json!({"n": null, "o": "abc"}));
        assert_eq!(p.n, 0.0);
        assert_eq!(p.o, None);
        assert_eq!(decode(json!({"o": 3})).o, Some(3.0));
        assert_eq!(decode(json!({"n": [1]})).n, 0.0);
    }

    #[test]
    fn qty_is_clamped_to_one() {
        assert_eq!(decode(json!({"q": -3})).q, 1);
        assert_eq!(decode(json!({"q": 0})).q, 1);
        assert_eq!(decode(json!({"q": "4"})).q, 4);
        assert_eq!(decode(json!({"q": 2.9})).q, 2);
        assert_eq!(decode(json!({"q": null})).q, 1);
        assert_eq!(decode(json!({"q": 1e12})).q, u32::MAX);
        assert_eq!(decode(json!({})).q, 1);
    }

    #[test]
    fn counts_reject_negatives() {
        assert_eq!(decode(json!({"c": "3"})).c, Some(3));
        assert_eq!(decode(json!({"c": -1})).c, None);
        assert_eq!(decode(json!({"c": "x"})).c, None);
        assert_eq!(decode(json!({})).c, None);
    }
}
