//! Canonical JSON views of on-chain data, gated behind the `json` feature.
//!
//! Grounded in the same shapes `alonzo/json.rs`'s `ToCanonicalJson` impls
//! produce (`PlutusData`'s `{"constructor":..,"fields":..}` / `{"map":..}`
//! / `{"int":..}` / `{"bytes":..}` / `{"list":..}` tagging, `NativeScript`'s
//! `{"type":"sig","keyHash":..}` family), reimplemented over this crate's
//! own `chain_json::Value` instead of `serde_json::Value` so the JSON
//! mirror stays independent of this crate's CBOR codec.

use chain_json::Value;

use crate::plutus_data::{Constr, PlutusData};
use crate::scripts::NativeScript;

/// Produces the canonical JSON rendering of an on-chain value.
pub trait ToJson {
    fn to_json(&self) -> Value;
}

impl ToJson for PlutusData {
    fn to_json(&self) -> Value {
        match self {
            PlutusData::Constr(Constr { tag, fields }) => {
                let mut out = Value::object();
                out.insert("constructor", *tag as i64);
                out.insert(
                    "fields",
                    Value::Array(fields.iter().map(ToJson::to_json).collect()),
                );
                out
            }
            PlutusData::Map(entries) => {
                let map: Vec<Value> = entries
                    .iter()
                    .map(|(k, v)| {
                        let mut pair = Value::object();
                        pair.insert("k", k.to_json());
                        pair.insert("v", v.to_json());
                        pair
                    })
                    .collect();
                let mut out = Value::object();
                out.insert("map", Value::Array(map));
                out
            }
            PlutusData::Integer(n) => {
                let mut out = Value::object();
                out.insert("int", n.clone());
                out
            }
            PlutusData::ByteString(bytes) => {
                let mut out = Value::object();
                out.insert("bytes", hex::encode(bytes));
                out
            }
            PlutusData::List(items) => {
                let mut out = Value::object();
                out.insert(
                    "list",
                    Value::Array(items.iter().map(ToJson::to_json).collect()),
                );
                out
            }
        }
    }
}

impl ToJson for NativeScript {
    fn to_json(&self) -> Value {
        match self {
            NativeScript::ScriptPubkey(hash) => {
                let mut out = Value::object();
                out.insert("type", "sig");
                out.insert("keyHash", hex::encode(hash.as_ref()));
                out
            }
            NativeScript::ScriptAll(scripts) => wrap_scripts("all", scripts),
            NativeScript::ScriptAny(scripts) => wrap_scripts("any", scripts),
            NativeScript::ScriptNOfK(required, scripts) => {
                let mut out = wrap_scripts("atLeast", scripts);
                out.insert("required", *required as i64);
                out
            }
            NativeScript::InvalidBefore(slot) => {
                let mut out = Value::object();
                out.insert("type", "before");
                out.insert("slot", *slot as i64);
                out
            }
            NativeScript::InvalidHereafter(slot) => {
                let mut out = Value::object();
                out.insert("type", "after");
                out.insert("slot", *slot as i64);
                out
            }
        }
    }
}

fn wrap_scripts(kind: &str, scripts: &[NativeScript]) -> Value {
    let mut out = Value::object();
    out.insert("type", kind);
    out.insert(
        "scripts",
        Value::Array(scripts.iter().map(ToJson::to_json).collect()),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_codec::BigInt;
    use chain_crypto::Hash;

    #[test]
    fn plutus_constr_renders_as_constructor_fields() {
        let data = PlutusData::Constr(Constr {
            tag: 0,
            fields: vec![PlutusData::Integer(BigInt::from_i64(42))],
        });
        let json = data.to_json();
        assert_eq!(json.get("constructor").and_then(|v| v.as_number()).and_then(|n| n.as_i64()), Some(0));
        assert_eq!(json.get("fields").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn plutus_bytes_render_as_hex() {
        let data = PlutusData::ByteString(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(data.to_json().get("bytes").and_then(Value::as_str), Some("deadbeef"));
    }

    #[test]
    fn native_script_sig_renders_key_hash() {
        let script = NativeScript::ScriptPubkey(Hash::new([1u8; 28]));
        let json = script.to_json();
        assert_eq!(json.get("type").and_then(Value::as_str), Some("sig"));
        assert!(json.get("keyHash").and_then(Value::as_str).unwrap().starts_with("01"));
    }

    #[test]
    fn native_script_at_least_renders_required_count() {
        let script = NativeScript::ScriptNOfK(2, vec![NativeScript::InvalidBefore(100)]);
        let json = script.to_json();
        assert_eq!(json.get("type").and_then(Value::as_str), Some("atLeast"));
        assert_eq!(json.get("required").and_then(|v| v.as_number()).and_then(|n| n.as_i64()), Some(2));
        assert_eq!(json.get("scripts").unwrap().as_array().unwrap().len(), 1);
    }
}
