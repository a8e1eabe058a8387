//! Serde support for [`ScaledAmount`] fields.
//!
//! Listing payloads carry big integers either as JSON strings or as plain
//! numbers; both are accepted. Amounts are always written back as strings so
//! values above 2^53 survive JavaScript consumers.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

use crate::types::ScaledAmount;

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = ScaledAmount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative integer or integer string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v as ScaledAmount)
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        ScaledAmount::try_from(v).map_err(|_| E::custom(format!("negative amount: {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(E::custom(format!(
            "amount {} is not an exact integer; send it as a string",
            v
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse::<ScaledAmount>()
            .map_err(|e| E::custom(format!("invalid amount {:?}: {}", v, e)))
    }
}

struct Amount(ScaledAmount);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor).map(Amount)
    }
}

pub fn serialize<S: Serializer>(value: &ScaledAmount, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ScaledAmount, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<ScaledAmount>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ScaledAmount>, D::Error> {
        Ok(Option::<Amount>::deserialize(deserializer)?.map(|a| a.0))
    }
}
