//! Transaction inputs, outputs and value, the primitives every certificate,
//! proposal and witness ultimately gets spent or paid through.
//!
//! Addresses are out of scope here (structured Bech32/Base58 address
//! parsing is explicitly excluded) — `TransactionOutput::address` is the
//! opaque payload bytes, grounded in `babbage/model.rs::PostAlonzoTransactionOutput`
//! and `alonzo/model.rs::TransactionOutput` for the legacy/post-Alonzo
//! split and `Value`'s coin-or-multiasset shape.

use chain_codec::reader::LengthExpectation;
use chain_codec::{DataType, Reader, Writer};
use chain_crypto::Hash;

use crate::entity::{Cached, CborEntity};
use crate::error::ChainError;
use crate::plutus_data::PlutusData;
use crate::scripts::{Language, NativeScript, PlutusScript};

const EMBEDDED_CBOR_TAG: u64 = 24;

/// A spendable output reference: the id of the transaction that produced it
/// and the output's index within that transaction. Ordered lexicographically
/// by `(transaction_id, index)`, matching the ledger's UTxO set ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionInput {
    pub transaction_id: Hash<32>,
    pub index: u64,
}

impl TransactionInput {
    pub fn new(transaction_id: Hash<32>, index: u64) -> Self {
        Self {
            transaction_id,
            index,
        }
    }
}

impl CborEntity for TransactionInput {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let transaction_id = Hash::<32>::from_cbor(r)?;
        let index = r.read_u64()?;
        r.read_end_array()?;
        Ok(Self {
            transaction_id,
            index,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        self.transaction_id.to_cbor(w)?;
        w.write_u64(self.index)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// Asset quantities under a single policy, keyed by asset name and kept in
/// the lexicographic key order the map was built in (policy/asset maps are
/// never re-sorted on encode — the CDDL doesn't require it and callers may
/// rely on original ordering for hashing/fidelity).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetBundle(Vec<(Vec<u8>, i64)>);

impl AssetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_name: Vec<u8>, quantity: i64) {
        self.0.push((asset_name, quantity));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Vec<u8>, i64)> {
        self.0.iter()
    }
}

impl CborEntity for AssetBundle {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let len = r.read_start_map(LengthExpectation::Either)?;
        let mut out = Vec::new();
        match len.as_definite() {
            Some(n) => {
                for _ in 0..n {
                    let name = r.read_bytes()?;
                    let amount = r.read_i64()?;
                    out.push((name, amount));
                }
            }
            None => {
                while !r.at_break()? {
                    let name = r.read_bytes()?;
                    let amount = r.read_i64()?;
                    out.push((name, amount));
                }
                r.consume_break()?;
            }
        }
        r.read_end_map()?;
        Ok(Self(out))
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_map(Some(self.0.len() as u64))?;
        for (name, amount) in &self.0 {
            w.write_bytes(name)?;
            w.write_i64(*amount)?;
        }
        w.write_end_map()?;
        Ok(())
    }
}

/// `PolicyId → (AssetName → quantity)`, the native-token side of a
/// transaction output's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiAsset(Vec<(Hash<28>, AssetBundle)>);

impl MultiAsset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, policy_id: Hash<28>, bundle: AssetBundle) {
        self.0.push((policy_id, bundle));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Hash<28>, AssetBundle)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CborEntity for MultiAsset {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let len = r.read_start_map(LengthExpectation::Either)?;
        let mut out = Vec::new();
        match len.as_definite() {
            Some(n) => {
                for _ in 0..n {
                    let policy = Hash::<28>::from_cbor(r)?;
                    let bundle = AssetBundle::from_cbor(r)?;
                    out.push((policy, bundle));
                }
            }
            None => {
                while !r.at_break()? {
                    let policy = Hash::<28>::from_cbor(r)?;
                    let bundle = AssetBundle::from_cbor(r)?;
                    out.push((policy, bundle));
                }
                r.consume_break()?;
            }
        }
        r.read_end_map()?;
        Ok(Self(out))
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_map(Some(self.0.len() as u64))?;
        for (policy, bundle) in &self.0 {
            policy.to_cbor(w)?;
            bundle.to_cbor(w)?;
        }
        w.write_end_map()?;
        Ok(())
    }
}

/// An output's value: lovelace plus any native-token assets. Encoded as a
/// bare coin integer when there are no assets, or `[coin, multiasset]`
/// otherwise, per `alonzo/model.rs::Value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub coin: u64,
    pub assets: MultiAsset,
}

impl Value {
    pub fn coin_only(coin: u64) -> Self {
        Self {
            coin,
            assets: MultiAsset::new(),
        }
    }
}

impl CborEntity for Value {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.peek()? {
            DataType::Array => {
                r.read_start_array(LengthExpectation::Definite)?;
                let coin = r.read_u64()?;
                let assets = MultiAsset::from_cbor(r)?;
                r.read_end_array()?;
                Ok(Self { coin, assets })
            }
            _ => Ok(Value::coin_only(r.read_u64()?)),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        if self.assets.is_empty() {
            w.write_u64(self.coin)?;
        } else {
            w.write_start_array(Some(2))?;
            w.write_u64(self.coin)?;
            self.assets.to_cbor(w)?;
            w.write_end_array()?;
        }
        Ok(())
    }
}

/// An inline datum or a reference to one by hash, attached to a
/// post-Alonzo transaction output. `[0, hash]` or `[1, #6.24(plutus_data)]`,
/// per `babbage/model.rs::DatumOption`.
///
/// The inline datum is `Cached<PlutusData>`: the embedded plutus data is
/// re-encoded by replaying its tag-24 payload bytes verbatim when the cache
/// is live, so a non-canonical but valid original encoding (e.g. a
/// definite-length list our own writer would otherwise always re-derive as
/// indefinite) round-trips byte-for-byte instead of silently changing the
/// bytes a datum hash was computed over.
#[derive(Debug, Clone, PartialEq)]
pub enum DatumOption {
    Hash(Hash<32>),
    Data(Cached<PlutusData>),
}

impl CborEntity for DatumOption {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let tag = r.read_u64()?;
        let value = match tag {
            0 => DatumOption::Hash(Hash::<32>::from_cbor(r)?),
            1 => {
                r.read_tag()?;
                let bytes = r.read_bytes()?;
                let mut inner = Reader::from_bytes(&bytes);
                DatumOption::Data(Cached::<PlutusData>::from_cbor(&mut inner)?)
            }
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown datum option tag {other}"
                )))
            }
        };
        r.read_end_array()?;
        Ok(value)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        match self {
            DatumOption::Hash(hash) => {
                w.write_u64(0)?;
                hash.to_cbor(w)?;
            }
            DatumOption::Data(data) => {
                w.write_u64(1)?;
                w.write_tag(EMBEDDED_CBOR_TAG)?;
                let mut inner = Writer::new();
                data.to_cbor(&mut inner)?;
                w.write_bytes(&inner.to_bytes())?;
            }
        }
        w.write_end_array()?;
        Ok(())
    }
}

/// A reference script attached to an output, embedded as tag-24 CBOR-in-CBOR,
/// per `babbage/model.rs::ScriptRef`/`Script`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptRef {
    NativeScript(NativeScript),
    PlutusScript(PlutusScript),
}

impl CborEntity for ScriptRef {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_tag()?;
        let bytes = r.read_bytes()?;
        let mut inner = Reader::from_bytes(&bytes);
        inner.read_start_array(LengthExpectation::Definite)?;
        let tag = inner.read_u64()?;
        let value = match tag {
            0 => ScriptRef::NativeScript(NativeScript::from_cbor(&mut inner)?),
            1 => ScriptRef::PlutusScript(PlutusScript::new(Language::PlutusV1, inner.read_bytes()?)),
            2 => ScriptRef::PlutusScript(PlutusScript::new(Language::PlutusV2, inner.read_bytes()?)),
            3 => ScriptRef::PlutusScript(PlutusScript::new(Language::PlutusV3, inner.read_bytes()?)),
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown script ref tag {other}"
                )))
            }
        };
        inner.read_end_array()?;
        Ok(value)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        let mut inner = Writer::new();
        inner.write_start_array(Some(2))?;
        match self {
            ScriptRef::NativeScript(script) => {
                inner.write_u64(0)?;
                script.to_cbor(&mut inner)?;
            }
            ScriptRef::PlutusScript(script) => {
                let tag = match script.language {
                    Language::PlutusV1 => 1,
                    Language::PlutusV2 => 2,
                    Language::PlutusV3 => 3,
                };
                inner.write_u64(tag)?;
                inner.write_bytes(&script.bytes)?;
            }
        }
        inner.write_end_array()?;
        w.write_tag(EMBEDDED_CBOR_TAG)?;
        w.write_bytes(&inner.to_bytes())?;
        Ok(())
    }
}

/// A pre-Alonzo output: `[address, value, datum_hash?]` as a plain array.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyTransactionOutput {
    pub address: Vec<u8>,
    pub value: Value,
    pub datum_hash: Option<Hash<32>>,
}

/// A post-Alonzo output: a CBOR map carrying an inline datum or script
/// reference alongside address/value.
#[derive(Debug, Clone, PartialEq)]
pub struct PostAlonzoTransactionOutput {
    pub address: Vec<u8>,
    pub value: Value,
    pub datum_option: Option<DatumOption>,
    pub script_ref: Option<ScriptRef>,
}

/// `TransactionOutput`. Decoding branches on the wire shape: a plain array
/// is the legacy form, a map is post-Alonzo — matching
/// `babbage/model.rs::TransactionOutput`'s dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutput {
    Legacy(LegacyTransactionOutput),
    PostAlonzo(PostAlonzoTransactionOutput),
}

impl CborEntity for TransactionOutput {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.peek()? {
            DataType::Array => {
                let len = r.read_start_array(LengthExpectation::Either)?;
                let address = r.read_bytes()?;
                let value = Value::from_cbor(r)?;
                let has_datum_hash = match len.as_definite() {
                    Some(n) => n > 2,
                    None => !r.at_break()?,
                };
                let datum_hash = if has_datum_hash {
                    Some(Hash::<32>::from_cbor(r)?)
                } else {
                    None
                };
                r.read_end_array()?;
                Ok(TransactionOutput::Legacy(LegacyTransactionOutput {
                    address,
                    value,
                    datum_hash,
                }))
            }
            DataType::Map => {
                let len = r.read_start_map(LengthExpectation::Either)?;
                let count = len.as_definite();
                let mut address = None;
                let mut value = None;
                let mut datum_option = None;
                let mut script_ref = None;
                let mut seen = 0u64;
                loop {
                    if let Some(n) = count {
                        if seen >= n {
                            break;
                        }
                    } else if r.at_break()? {
                        break;
                    }
                    match r.read_u64()? {
                        0 => address = Some(r.read_bytes()?),
                        1 => value = Some(Value::from_cbor(r)?),
                        2 => datum_option = Some(DatumOption::from_cbor(r)?),
                        3 => script_ref = Some(ScriptRef::from_cbor(r)?),
                        _ => r.skip_value()?,
                    }
                    seen += 1;
                }
                if count.is_none() {
                    r.consume_break()?;
                }
                r.read_end_map()?;
                Ok(TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
                    address: address.ok_or(ChainError::ElementNotFound)?,
                    value: value.ok_or(ChainError::ElementNotFound)?,
                    datum_option,
                    script_ref,
                }))
            }
            other => Err(ChainError::InvalidArgument(format!(
                "unexpected cbor type {other:?} for transaction output"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            TransactionOutput::Legacy(out) => {
                let len = if out.datum_hash.is_some() { 3 } else { 2 };
                w.write_start_array(Some(len))?;
                w.write_bytes(&out.address)?;
                out.value.to_cbor(w)?;
                if let Some(hash) = &out.datum_hash {
                    hash.to_cbor(w)?;
                }
                w.write_end_array()?;
                Ok(())
            }
            TransactionOutput::PostAlonzo(out) => {
                let mut count = 2;
                if out.datum_option.is_some() {
                    count += 1;
                }
                if out.script_ref.is_some() {
                    count += 1;
                }
                w.write_start_map(Some(count))?;
                w.write_u64(0)?;
                w.write_bytes(&out.address)?;
                w.write_u64(1)?;
                out.value.to_cbor(w)?;
                if let Some(datum) = &out.datum_option {
                    w.write_u64(2)?;
                    datum.to_cbor(w)?;
                }
                if let Some(script_ref) = &out.script_ref {
                    w.write_u64(3)?;
                    script_ref.to_cbor(w)?;
                }
                w.write_end_map()?;
                Ok(())
            }
        }
    }
}

/// The top-level handle for decoding a `TransactionOutput` off the wire.
/// `to_cbor` always re-derives post-Alonzo outputs as a map with keys in
/// the fixed order `0, 1, 2, 3`; an original encoding whose fields came in
/// a different order (still valid CBOR — map key order isn't mandated)
/// would otherwise silently re-encode into different bytes. Decoding
/// through `Cached<TransactionOutput>` preserves the original bytes
/// instead, as required by the cached-bytes invariant.
pub type CachedTransactionOutput = Cached<TransactionOutput>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_input_ordering_matches_scenario_f() {
        let a = TransactionInput::new(Hash::new([1u8; 32]), 0);
        let b = TransactionInput::new(Hash::new([1u8; 32]), 1);
        let c = TransactionInput::new(Hash::new([2u8; 32]), 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn transaction_input_round_trips() {
        let input = TransactionInput::new(Hash::new([7u8; 32]), 3);
        let mut w = Writer::new();
        input.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(TransactionInput::from_cbor(&mut r).unwrap(), input);
    }

    #[test]
    fn coin_only_value_encodes_as_bare_integer() {
        let value = Value::coin_only(42);
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let bytes = w.to_bytes();
        assert_eq!(bytes, vec![0x18, 42]);

        let mut r = Reader::from_bytes(&bytes);
        assert_eq!(Value::from_cbor(&mut r).unwrap(), value);
    }

    #[test]
    fn value_with_assets_round_trips() {
        let mut assets = MultiAsset::new();
        let mut bundle = AssetBundle::new();
        bundle.insert(b"token".to_vec(), 5);
        assets.insert(Hash::new([1u8; 28]), bundle);
        let value = Value { coin: 10, assets };

        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(Value::from_cbor(&mut r).unwrap(), value);
    }

    #[test]
    fn post_alonzo_output_round_trips_with_inline_datum() {
        let out = TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
            address: vec![0x61, 0x62, 0x63],
            value: Value::coin_only(1_000_000),
            datum_option: Some(DatumOption::Data(Cached::new(PlutusData::Integer(
                chain_codec::BigInt::from_i64(7),
            )))),
            script_ref: None,
        });

        let mut w = Writer::new();
        out.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(TransactionOutput::from_cbor(&mut r).unwrap(), out);
    }

    #[test]
    fn inline_datum_replays_cached_bytes_for_a_non_canonical_encoding() {
        // A definite-length two-element list: our own writer would always
        // re-derive a non-empty `PlutusData::List` as indefinite-length,
        // so without the cache this would re-encode as `9f0102ff` instead
        // of the original `820102`.
        let mut embedded = Writer::new();
        embedded.write_start_array(Some(2)).unwrap();
        embedded.write_i64(1).unwrap();
        embedded.write_i64(2).unwrap();
        embedded.write_end_array().unwrap();
        let embedded_bytes = embedded.to_bytes();
        assert_eq!(embedded_bytes, hex::decode("820102").unwrap());

        let mut outer = Writer::new();
        outer.write_start_array(Some(2)).unwrap();
        outer.write_u64(1).unwrap();
        outer.write_tag(EMBEDDED_CBOR_TAG).unwrap();
        outer.write_bytes(&embedded_bytes).unwrap();
        outer.write_end_array().unwrap();
        let bytes = outer.to_bytes();

        let mut r = Reader::from_bytes(&bytes);
        let datum = DatumOption::from_cbor(&mut r).unwrap();
        let DatumOption::Data(cached) = &datum else {
            panic!("expected inline datum");
        };
        assert!(cached.cache_is_present());

        let mut w = Writer::new();
        datum.to_cbor(&mut w).unwrap();
        assert_eq!(w.to_bytes(), bytes);

        // After a mutator clears the cache, re-encoding falls back to the
        // canonical (indefinite, non-empty list) form.
        let mut datum = datum;
        let DatumOption::Data(cached) = &mut datum else {
            unreachable!()
        };
        cached.clear_cbor_cache();
        let mut w = Writer::new();
        datum.to_cbor(&mut w).unwrap();
        assert_ne!(w.to_bytes(), bytes);
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(DatumOption::from_cbor(&mut r).unwrap(), datum);
    }

    #[test]
    fn cached_output_replays_a_non_default_map_key_order() {
        // `to_cbor` always emits post-Alonzo keys in order 0,1,2,3; this
        // input writes 1 (value) before 0 (address) — still valid CBOR,
        // but the field-by-field writer can't reproduce it.
        let mut w = Writer::new();
        w.write_start_map(Some(2)).unwrap();
        w.write_u64(1).unwrap();
        Value::coin_only(42).to_cbor(&mut w).unwrap();
        w.write_u64(0).unwrap();
        w.write_bytes(&[0xaa, 0xbb]).unwrap();
        w.write_end_map().unwrap();
        let bytes = w.to_bytes();

        let mut r = Reader::from_bytes(&bytes);
        let cached = CachedTransactionOutput::from_cbor(&mut r).unwrap();
        assert!(cached.cache_is_present());

        let mut w2 = Writer::new();
        cached.to_cbor(&mut w2).unwrap();
        assert_eq!(w2.to_bytes(), bytes);
    }

    #[test]
    fn legacy_output_round_trips_without_datum_hash() {
        let out = TransactionOutput::Legacy(LegacyTransactionOutput {
            address: vec![1, 2, 3],
            value: Value::coin_only(500),
            datum_hash: None,
        });
        let mut w = Writer::new();
        out.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(TransactionOutput::from_cbor(&mut r).unwrap(), out);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn transaction_input_round_trips_for_any_hash_and_index(
            bytes in prop::array::uniform32(any::<u8>()),
            index: u64,
        ) {
            let input = TransactionInput::new(Hash::new(bytes), index);
            let mut w = Writer::new();
            input.to_cbor(&mut w).unwrap();
            let mut r = Reader::from_bytes(&w.to_bytes());
            prop_assert_eq!(TransactionInput::from_cbor(&mut r).unwrap(), input);
        }

        #[test]
        fn ordering_is_consistent_with_equality(
            a_bytes in prop::array::uniform32(any::<u8>()),
            a_index: u64,
            b_bytes in prop::array::uniform32(any::<u8>()),
            b_index: u64,
        ) {
            let a = TransactionInput::new(Hash::new(a_bytes), a_index);
            let b = TransactionInput::new(Hash::new(b_bytes), b_index);
            prop_assert_eq!(a == b, a.cmp(&b) == std::cmp::Ordering::Equal);
            prop_assert_eq!(a.cmp(&b) == std::cmp::Ordering::Less, b.cmp(&a) == std::cmp::Ordering::Greater);
        }

        #[test]
        fn coin_only_value_round_trips_for_any_amount(coin: u64) {
            let value = Value::coin_only(coin);
            let mut w = Writer::new();
            value.to_cbor(&mut w).unwrap();
            let mut r = Reader::from_bytes(&w.to_bytes());
            prop_assert_eq!(Value::from_cbor(&mut r).unwrap(), value);
        }
    }
}
