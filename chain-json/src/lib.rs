//! A JSON value type independent of the CBOR codec.
//!
//! Used for transaction metadata rendered for human/off-chain consumption
//! and for the ancillary structures (pool metadata, governance anchors)
//! that ledger-adjacent tools already emit as JSON. Nothing here reads or
//! writes CBOR; [`Value`] neither produces a `chain_codec` type nor
//! consumes one. Large integers are represented exactly: parsing borrows
//! `serde_json`'s `arbitrary_precision` number mode purely to avoid
//! truncating a wire-sized integer into an `f64` while scanning the
//! structural JSON grammar, then hands the digits to [`BigInt`] rather
//! than keeping a `serde_json::Value` around as this crate's own type.

mod parse;
mod ser;

use chain_codec::BigInt;
use std::fmt;
use thiserror::Error;

pub use parse::parse;

/// Failures from parsing or constructing a [`Value`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("invalid json: {0}")]
    Syntax(String),
    #[error("invalid numeric literal: {0}")]
    InvalidNumber(String),
}

/// A JSON number. Integers that overflow `i64` are kept as an exact
/// [`BigInt`] rather than rounded into a `f64`; only numbers that were
/// written with a fractional part or exponent become [`Number::Float`].
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    BigInt(BigInt),
    Float(f64),
}

impl Number {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(n) => Some(*n),
            Number::BigInt(b) => b.to_i64(),
            Number::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Int(n) => Some(*n as f64),
            Number::BigInt(_) => None,
            Number::Float(f) => Some(*f),
        }
    }

    pub fn as_bigint(&self) -> BigInt {
        match self {
            Number::Int(n) => BigInt::from_i64(*n),
            Number::BigInt(b) => b.clone(),
            Number::Float(f) => BigInt::from_i64(*f as i64),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            Number::BigInt(b) => write!(f, "{b}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        match value.to_i64() {
            Some(n) => Number::Int(n),
            None => Number::BigInt(value),
        }
    }
}

/// A JSON value: object, array, string, number, boolean, or null.
///
/// `Object` and `Array` preserve insertion order rather than sorting keys
/// — the same no-canonical-reorder stance this workspace takes for CBOR
/// maps (`PlutusData::Map`, `AuxiliaryData`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn object() -> Self {
        Value::Object(Vec::new())
    }

    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a key in an object by linear scan, returning the first
    /// match. `None` for every other variant, including an object that
    /// doesn't contain `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array()?.get(index)
    }

    /// Inserts or replaces a key in an object. Panics if called on a
    /// non-object; build with [`Value::object`] first.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let Value::Object(entries) = self else {
            panic!("Value::insert called on a non-object value");
        };
        let key = key.into();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value.into(),
            None => entries.push((key, value.into())),
        }
    }

    /// Appends an element to an array. Panics if called on a non-array.
    pub fn push(&mut self, value: impl Into<Value>) {
        let Value::Array(items) = self else {
            panic!("Value::push called on a non-array value");
        };
        items.push(value.into());
    }

    pub fn parse(input: &str) -> Result<Value, JsonError> {
        parse::parse(input)
    }

    pub fn to_json_string(&self) -> String {
        ser::to_string(self, false)
    }

    pub fn to_json_string_pretty(&self) -> String {
        ser::to_string(self, true)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_insert_and_get_round_trip() {
        let mut obj = Value::object();
        obj.insert("name", "ada");
        obj.insert("active", true);
        assert_eq!(obj.get("name").and_then(Value::as_str), Some("ada"));
        assert_eq!(obj.get("active").and_then(Value::as_bool), Some(true));
        assert!(obj.get("missing").is_none());
    }

    #[test]
    fn insert_replaces_existing_key_in_place() {
        let mut obj = Value::object();
        obj.insert("count", 1i64);
        obj.insert("count", 2i64);
        let entries = obj.as_object().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(obj.get("count").and_then(|v| v.as_number()).and_then(Number::as_i64), Some(2));
    }

    #[test]
    fn array_push_and_index() {
        let mut arr = Value::array();
        arr.push(1i64);
        arr.push("two");
        assert_eq!(arr.get_index(0).and_then(|v| v.as_number()).and_then(Number::as_i64), Some(1));
        assert_eq!(arr.get_index(1).and_then(Value::as_str), Some("two"));
        assert!(arr.get_index(2).is_none());
    }

    #[test]
    fn bigint_values_round_trip_through_number() {
        let huge: BigInt = "123456789012345678901234567890".parse().unwrap();
        let value = Value::from(huge.clone());
        match value.as_number().unwrap() {
            Number::BigInt(b) => assert_eq!(b, &huge),
            other => panic!("expected BigInt, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Boolean),
            any::<i64>().prop_map(Value::from),
            ".*".prop_map(Value::from),
        ]
    }

    fn json_value() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                // Keys are synthesized from the element index rather than
                // generated independently, so every object is guaranteed
                // key-unique — a JSON object with duplicate keys collapses
                // to the last value during parsing, which this round-trip
                // property deliberately does not exercise.
                prop::collection::vec(inner, 0..4).prop_map(|values| {
                    Value::Object(
                        values
                            .into_iter()
                            .enumerate()
                            .map(|(i, v)| (format!("k{i}"), v))
                            .collect(),
                    )
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn any_value_round_trips_through_parse_and_serialize(value in json_value()) {
            let text = value.to_json_string();
            prop_assert_eq!(Value::parse(&text).unwrap(), value);
        }
    }
}
