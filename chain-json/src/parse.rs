//! Parses JSON text into [`crate::Value`].
//!
//! The structural grammar (object/array/string/bool/null nesting) is
//! delegated to `serde_json`, which already gets string escaping and
//! Unicode handling right. Numbers are re-read from `serde_json`'s
//! `arbitrary_precision` literal text rather than trusted as `f64`, so an
//! integer too big for `i64` survives the parse as an exact [`BigInt`]
//! instead of losing precision.

use crate::{BigInt, JsonError, Number, Value};

pub fn parse(input: &str) -> Result<Value, JsonError> {
    let raw: serde_json::Value =
        serde_json::from_str(input).map_err(|e| JsonError::Syntax(e.to_string()))?;
    convert(raw)
}

fn convert(value: serde_json::Value) -> Result<Value, JsonError> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(convert_number(&n)?),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(convert(item)?);
            }
            Value::Array(out)
        }
        serde_json::Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, val) in map {
                entries.push((key, convert(val)?));
            }
            Value::Object(entries)
        }
    })
}

fn convert_number(n: &serde_json::Number) -> Result<Number, JsonError> {
    let text = n.to_string();
    if text.contains(['.', 'e', 'E']) {
        return text
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| JsonError::InvalidNumber(text.clone()));
    }
    if let Ok(small) = text.parse::<i64>() {
        return Ok(Number::Int(small));
    }
    text.parse::<BigInt>()
        .map(Number::BigInt)
        .map_err(|_| JsonError::InvalidNumber(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structures() {
        let value = parse(r#"{"a": [1, 2, "three"], "b": null, "c": true}"#).unwrap();
        let a = value.get("a").unwrap().as_array().unwrap();
        assert_eq!(a.len(), 3);
        assert!(value.get("b").unwrap().is_null());
        assert_eq!(value.get("c").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn preserves_object_key_order() {
        let value = parse(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<_> = value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn integers_beyond_i64_parse_as_bigint() {
        let value = parse("99999999999999999999999999999").unwrap();
        match value.as_number().unwrap() {
            Number::BigInt(_) => {}
            other => panic!("expected BigInt, got {other:?}"),
        }
    }

    #[test]
    fn fractional_numbers_parse_as_float() {
        let value = parse("1.5").unwrap();
        assert_eq!(value.as_number().unwrap().as_f64(), Some(1.5));
    }

    #[test]
    fn malformed_input_is_a_syntax_error() {
        assert!(parse("{not json}").is_err());
    }
}
