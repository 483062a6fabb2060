//! Common serde helpers for panel input
//!
//! The panel posts whatever the form holds; numeric fields may arrive as
//! numbers, numeric strings, or junk. Junk coerces to `None` so creation
//! defaults apply instead of rejecting the request.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Deserialize an optional integer, treating non-numeric input as absent
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Deserialize an optional decimal, treating non-numeric input as absent
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::lenient_i64")]
        quantity: Option<i64>,
        #[serde(default, deserialize_with = "super::lenient_decimal")]
        price: Option<Decimal>,
    }

    #[test]
    fn test_numbers_and_numeric_strings_accepted() {
        let probe: Probe = serde_json::from_str(r#"{"quantity": 5, "price": "7.5"}"#).unwrap();
        assert_eq!(probe.quantity, Some(5));
        assert_eq!(probe.price, Some(Decimal::from_str("7.5").unwrap()));
    }

    #[test]
    fn test_junk_coerces_to_none() {
        let probe: Probe =
            serde_json::from_str(r#"{"quantity": "lots", "price": [1, 2]}"#).unwrap();
        assert_eq!(probe.quantity, None);
        assert_eq!(probe.price, None);
    }

    #[test]
    fn test_absent_fields_are_none() {
        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.quantity, None);
        assert_eq!(probe.price, None);
    }
}
