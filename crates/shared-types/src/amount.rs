//! # Decimal Amount Encoding
//!
//! JSON has no native big-integer type, so every `U256` that reaches disk is
//! written as its decimal string. `U256`'s own `FromStr` parses hex, which is
//! why the conversion lives here rather than going through `DisplayFromStr`.

use primitive_types::U256;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use serde_with::{DeserializeAs, SerializeAs};
use std::fmt;

use crate::errors::ParseError;

/// `serde_with` adapter: `U256` <-> decimal string.
///
/// Deserialization also accepts plain JSON integers so hand-edited caches load.
///
/// ```ignore
/// #[serde_as]
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde_as(as = "DecimalU256")]
///     amount: U256,
/// }
/// ```
pub struct DecimalU256;

impl SerializeAs<U256> for DecimalU256 {
    fn serialize_as<S>(source: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(source)
    }
}

impl<'de> DeserializeAs<'de, U256> for DecimalU256 {
    fn deserialize_as<D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
        u64::try_from(v)
            .map(U256::from)
            .map_err(|_| E::custom(format!("negative amount: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        parse_decimal(v).map_err(E::custom)
    }
}

/// Parse a decimal string into a `U256`.
pub fn parse_decimal(value: &str) -> Result<U256, ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParseError::InvalidAmount(value.to_string()));
    }
    U256::from_dec_str(trimmed).map_err(|_| ParseError::InvalidAmount(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_with::serde_as;
    use std::collections::BTreeMap;

    #[serde_as]
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        #[serde_as(as = "DecimalU256")]
        amount: U256,
        #[serde_as(as = "BTreeMap<_, DecimalU256>")]
        by_key: BTreeMap<String, U256>,
    }

    #[test]
    fn test_serializes_as_decimal_string() {
        let row = Row {
            amount: U256::from(1_000_000_000u64) * U256::from(1_000_000_000u64),
            by_key: BTreeMap::from([("a".to_string(), U256::from(42u64))]),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"amount":"1000000000000000000","by_key":{"a":"42"}}"#);
    }

    #[test]
    fn test_accepts_plain_integers() {
        let row: Row = serde_json::from_str(r#"{"amount":7,"by_key":{}}"#).unwrap();
        assert_eq!(row.amount, U256::from(7u64));
    }

    #[test]
    fn test_value_beyond_u128_survives() {
        let big = "340282366920938463463374607431768211456123";
        let json = format!(r#"{{"amount":"{big}","by_key":{{}}}}"#);
        let row: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(row.amount.to_string(), big);
    }

    #[test]
    fn test_rejects_hex_and_negative() {
        assert!(serde_json::from_str::<Row>(r#"{"amount":"0x10","by_key":{}}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"amount":-1,"by_key":{}}"#).is_err());
    }

    #[test]
    fn test_parse_decimal_rejects_empty() {
        assert!(parse_decimal("  ").is_err());
        assert_eq!(parse_decimal(" 12 ").unwrap(), U256::from(12u64));
    }
}
