// hiveforge-core/src/core/payload.rs
// ============================================================================
// Module: Event Payload Value Grammar
// Description: The restricted, total value grammar events may carry (§3.1).
// Purpose: Guarantee every payload is deterministically canonicalizable.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! `payload` is an ordered mapping of string to a closed set of JSON-safe
//! value shapes. The canonicalizer rejects NaN/±Inf floats and any value
//! whose representation would not be deterministic; constructing an invalid
//! [`PayloadValue`] is rejected at the boundary (`PayloadValue::float`,
//! `PayloadValue::decimal`) rather than discovered later during hashing — a
//! violation here is a programming error, not a data error, per §3.1.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use thiserror::Error;

use crate::core::hashing::hex_encode;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when constructing a payload value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// A float was NaN or ±Infinity.
    #[error("non-finite float is not a valid payload value")]
    NonFiniteFloat,
    /// A decimal string did not represent a finite number.
    #[error("decimal value {0:?} is not finite")]
    NonFiniteDecimal(String),
}

// ============================================================================
// SECTION: Payload Value
// ============================================================================

/// A single payload value. This is the restricted grammar §3.1 requires:
/// every shape here canonicalizes to a deterministic JSON form.
///
/// # Invariants
/// - `Float` is always finite (construct via [`PayloadValue::float`]).
/// - `Decimal` stores a finite decimal's canonical string form.
/// - `Bytes` renders as lowercase hex on the wire.
/// - `Set` renders as a sorted sequence (duplicates removed at construction).
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    /// JSON null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Finite floating point value.
    Float(f64),
    /// Finite decimal value, stored in its canonical string form.
    Decimal(String),
    /// UTF-8 string value.
    String(String),
    /// Raw bytes, rendered as lowercase hex.
    Bytes(Vec<u8>),
    /// Ordered list of values.
    List(Vec<PayloadValue>),
    /// Set of values, rendered as a sorted sequence.
    Set(Vec<PayloadValue>),
    /// Nested map, recursively normalized.
    Map(BTreeMap<String, PayloadValue>),
}

impl PayloadValue {
    /// Constructs a finite float value.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::NonFiniteFloat`] for NaN or ±Infinity.
    pub fn float(value: f64) -> Result<Self, PayloadError> {
        if value.is_finite() {
            Ok(Self::Float(value))
        } else {
            Err(PayloadError::NonFiniteFloat)
        }
    }

    /// Constructs a decimal value from its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::NonFiniteDecimal`] when `value` is not a
    /// finite decimal (contains no digits, or is `"NaN"`/`"Infinity"`/
    /// `"-Infinity"`).
    pub fn decimal(value: impl Into<String>) -> Result<Self, PayloadError> {
        let value = value.into();
        let is_finite = value.bytes().any(|b| b.is_ascii_digit())
            && !value.eq_ignore_ascii_case("nan")
            && !value.eq_ignore_ascii_case("infinity")
            && !value.eq_ignore_ascii_case("-infinity");
        if is_finite {
            Ok(Self::Decimal(value))
        } else {
            Err(PayloadError::NonFiniteDecimal(value))
        }
    }

    /// Constructs a set value, de-duplicating and sorting by canonical
    /// string rendering so the wire form is deterministic (§3.1).
    #[must_use]
    pub fn set(mut values: Vec<PayloadValue>) -> Self {
        values.sort_by_key(PayloadValue::sort_key);
        values.dedup_by_key(|v| v.sort_key());
        Self::Set(values)
    }

    fn sort_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

impl Serialize for PayloadValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::Decimal(value) | Self::String(value) => serializer.serialize_str(value),
            Self::Bytes(bytes) => serializer.serialize_str(&hex_encode(bytes)),
            Self::List(items) | Self::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PayloadValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(from_json_value(raw))
    }
}

/// Converts an arbitrary `serde_json::Value` into a [`PayloadValue`],
/// recursively normalizing nested maps and lists per §3.1. Non-finite
/// floats cannot occur because `serde_json::Number` never represents them.
#[must_use]
pub fn from_json_value(value: serde_json::Value) -> PayloadValue {
    match value {
        serde_json::Value::Null => PayloadValue::Null,
        serde_json::Value::Bool(b) => PayloadValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                PayloadValue::Int(i)
            } else {
                PayloadValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => PayloadValue::String(s),
        serde_json::Value::Array(items) => {
            PayloadValue::List(items.into_iter().map(from_json_value).collect())
        }
        serde_json::Value::Object(map) => PayloadValue::Map(
            map.into_iter()
                .map(|(k, v)| (k, from_json_value(v)))
                .collect(),
        ),
    }
}

/// Ordered event payload: a string-keyed map of [`PayloadValue`]s.
/// `BTreeMap` keeps keys in lexicographic order, matching the JCS key
/// ordering the canonicalizer applies when hashing (§4.1).
pub type Payload = BTreeMap<String, PayloadValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_float() {
        assert_eq!(PayloadValue::float(f64::NAN), Err(PayloadError::NonFiniteFloat));
        assert_eq!(
            PayloadValue::float(f64::INFINITY),
            Err(PayloadError::NonFiniteFloat)
        );
        assert!(PayloadValue::float(1.5).is_ok());
    }

    #[test]
    fn rejects_non_finite_decimal() {
        assert!(PayloadValue::decimal("NaN").is_err());
        assert!(PayloadValue::decimal("12.50").is_ok());
    }

    #[test]
    fn bytes_render_as_lowercase_hex() {
        let value = PayloadValue::Bytes(vec![0xde, 0xad]);
        let json = serde_json::to_string(&value).expect("serialize");
        assert_eq!(json, "\"dead\"");
    }

    #[test]
    fn set_is_sorted_and_deduplicated() {
        let value = PayloadValue::set(vec![
            PayloadValue::from("b"),
            PayloadValue::from("a"),
            PayloadValue::from("a"),
        ]);
        let json = serde_json::to_string(&value).expect("serialize");
        assert_eq!(json, "[\"a\",\"b\"]");
    }
}
