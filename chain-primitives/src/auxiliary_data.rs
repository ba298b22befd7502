//! Transaction metadata: the user-defined payload attached to a transaction
//! outside the ledger rules, plus the auxiliary scripts that travelled
//! alongside it across the Shelley/Shelley-MA/post-Alonzo eras.
//!
//! `Metadatum`'s recursive int/bytes/text/array/map shape and the three
//! `AuxiliaryData` wire forms (bare map, 2-element array, tag-259-wrapped
//! map) are grounded in `alonzo/model.rs::Metadatum`/`AuxiliaryData`, with
//! the post-Alonzo per-language script buckets grounded in
//! `babbage/model.rs::PostAlonzoAuxiliaryData` and
//! `conway_model_ref.rs::PostAlonzoAuxiliaryData` (which adds the
//! `plutus_v3_scripts` bucket). Key structure mirrors
//! `original_source/lib/include/cardano/auxiliary_data/metadatum_map.h`'s
//! map/list/int/bytes/text metadatum union.

use chain_codec::reader::LengthExpectation;
use chain_codec::{BigInt, DataType, Reader, Writer};

use crate::entity::CborEntity;
use crate::error::ChainError;
use crate::scripts::{Language, NativeScript, PlutusScript};

const AUXILIARY_DATA_TAG: u64 = 259;

/// A single metadatum value. `Map` preserves insertion order and duplicate
/// keys, same discipline as `PlutusData::Map` — transaction metadata is
/// user-supplied and this crate doesn't canonicalize it.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadatum {
    Int(BigInt),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Metadatum>),
    Map(Vec<(Metadatum, Metadatum)>),
}

impl CborEntity for Metadatum {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.peek()? {
            DataType::UnsignedInt | DataType::NegativeInt => {
                Ok(Metadatum::Int(r.read_bigint()?))
            }
            DataType::ByteString => Ok(Metadatum::Bytes(r.read_bytes()?)),
            DataType::TextString => Ok(Metadatum::Text(r.read_text()?)),
            DataType::Array => {
                let len = r.read_start_array(LengthExpectation::Either)?;
                let mut items = Vec::new();
                match len.as_definite() {
                    Some(n) => {
                        for _ in 0..n {
                            items.push(Metadatum::from_cbor(r)?);
                        }
                    }
                    None => {
                        while !r.at_break()? {
                            items.push(Metadatum::from_cbor(r)?);
                        }
                        r.consume_break()?;
                    }
                }
                r.read_end_array()?;
                Ok(Metadatum::Array(items))
            }
            DataType::Map => {
                let len = r.read_start_map(LengthExpectation::Either)?;
                let mut pairs = Vec::new();
                match len.as_definite() {
                    Some(n) => {
                        for _ in 0..n {
                            let k = Metadatum::from_cbor(r)?;
                            let v = Metadatum::from_cbor(r)?;
                            pairs.push((k, v));
                        }
                    }
                    None => {
                        while !r.at_break()? {
                            let k = Metadatum::from_cbor(r)?;
                            let v = Metadatum::from_cbor(r)?;
                            pairs.push((k, v));
                        }
                        r.consume_break()?;
                    }
                }
                r.read_end_map()?;
                Ok(Metadatum::Map(pairs))
            }
            other => Err(ChainError::InvalidArgument(format!(
                "unsupported cbor type {other:?} for metadatum"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            Metadatum::Int(v) => {
                w.write_bigint(v)?;
            }
            Metadatum::Bytes(bytes) => {
                w.write_bytes(bytes)?;
            }
            Metadatum::Text(text) => {
                w.write_text(text)?;
            }
            Metadatum::Array(items) => {
                w.write_start_array(Some(items.len() as u64))?;
                for item in items {
                    item.to_cbor(w)?;
                }
                w.write_end_array()?;
            }
            Metadatum::Map(pairs) => {
                w.write_start_map(Some(pairs.len() as u64))?;
                for (k, v) in pairs {
                    k.to_cbor(w)?;
                    v.to_cbor(w)?;
                }
                w.write_end_map()?;
            }
        }
        Ok(())
    }
}

/// `label -> metadatum`, keyed by the small unsigned integer a dapp/wallet
/// picks to namespace its metadata (CIP-10 registers common labels).
pub type TransactionMetadata = Vec<(u64, Metadatum)>;

fn read_transaction_metadata(r: &mut Reader) -> Result<TransactionMetadata, ChainError> {
    let len = r.read_start_map(LengthExpectation::Either)?;
    let mut pairs = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                let label = r.read_u64()?;
                let value = Metadatum::from_cbor(r)?;
                pairs.push((label, value));
            }
        }
        None => {
            while !r.at_break()? {
                let label = r.read_u64()?;
                let value = Metadatum::from_cbor(r)?;
                pairs.push((label, value));
            }
            r.consume_break()?;
        }
    }
    r.read_end_map()?;
    Ok(pairs)
}

fn write_transaction_metadata(metadata: &TransactionMetadata, w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_map(Some(metadata.len() as u64))?;
    for (label, value) in metadata {
        w.write_u64(*label)?;
        value.to_cbor(w)?;
    }
    w.write_end_map()?;
    Ok(())
}

fn read_native_script_list(r: &mut Reader) -> Result<Vec<NativeScript>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut items = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                items.push(NativeScript::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                items.push(NativeScript::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(items)
}

fn write_native_script_list(scripts: &[NativeScript], w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_array(Some(scripts.len() as u64))?;
    for s in scripts {
        s.to_cbor(w)?;
    }
    w.write_end_array()?;
    Ok(())
}

fn read_plutus_script_bucket(r: &mut Reader, language: Language) -> Result<Vec<PlutusScript>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut items = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                items.push(PlutusScript::new(language, r.read_bytes()?));
            }
        }
        None => {
            while !r.at_break()? {
                items.push(PlutusScript::new(language, r.read_bytes()?));
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(items)
}

fn write_plutus_script_bucket(scripts: &[PlutusScript], w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_array(Some(scripts.len() as u64))?;
    for s in scripts {
        w.write_bytes(&s.bytes)?;
    }
    w.write_end_array()?;
    Ok(())
}

/// The post-Alonzo auxiliary data map: optional metadata plus per-language
/// script buckets, keyed 0-4.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostAlonzoAuxiliaryData {
    pub metadata: Option<TransactionMetadata>,
    pub native_scripts: Vec<NativeScript>,
    pub plutus_v1_scripts: Vec<PlutusScript>,
    pub plutus_v2_scripts: Vec<PlutusScript>,
    pub plutus_v3_scripts: Vec<PlutusScript>,
}

impl CborEntity for PostAlonzoAuxiliaryData {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let len = r.read_start_map(LengthExpectation::Either)?;
        let count = len.as_definite();
        let mut out = PostAlonzoAuxiliaryData::default();
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
                0 => out.metadata = Some(read_transaction_metadata(r)?),
                1 => out.native_scripts = read_native_script_list(r)?,
                2 => out.plutus_v1_scripts = read_plutus_script_bucket(r, Language::PlutusV1)?,
                3 => out.plutus_v2_scripts = read_plutus_script_bucket(r, Language::PlutusV2)?,
                4 => out.plutus_v3_scripts = read_plutus_script_bucket(r, Language::PlutusV3)?,
                _ => r.skip_value()?,
            }
            seen += 1;
        }
        if count.is_none() {
            r.consume_break()?;
        }
        r.read_end_map()?;
        Ok(out)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        let mut count = 0u64;
        if self.metadata.is_some() {
            count += 1;
        }
        if !self.native_scripts.is_empty() {
            count += 1;
        }
        if !self.plutus_v1_scripts.is_empty() {
            count += 1;
        }
        if !self.plutus_v2_scripts.is_empty() {
            count += 1;
        }
        if !self.plutus_v3_scripts.is_empty() {
            count += 1;
        }

        w.write_start_map(Some(count))?;
        if let Some(metadata) = &self.metadata {
            w.write_u64(0)?;
            write_transaction_metadata(metadata, w)?;
        }
        if !self.native_scripts.is_empty() {
            w.write_u64(1)?;
            write_native_script_list(&self.native_scripts, w)?;
        }
        if !self.plutus_v1_scripts.is_empty() {
            w.write_u64(2)?;
            write_plutus_script_bucket(&self.plutus_v1_scripts, w)?;
        }
        if !self.plutus_v2_scripts.is_empty() {
            w.write_u64(3)?;
            write_plutus_script_bucket(&self.plutus_v2_scripts, w)?;
        }
        if !self.plutus_v3_scripts.is_empty() {
            w.write_u64(4)?;
            write_plutus_script_bucket(&self.plutus_v3_scripts, w)?;
        }
        w.write_end_map()?;
        Ok(())
    }
}

/// Transaction-level auxiliary data across all three wire shapes it has
/// taken historically: a bare metadata map (Shelley), a 2-element array
/// adding auxiliary native scripts (Shelley-MA), or a tag-259-wrapped map
/// with per-language script buckets (post-Alonzo).
#[derive(Debug, Clone, PartialEq)]
pub enum AuxiliaryData {
    Shelley(TransactionMetadata),
    ShelleyMa {
        transaction_metadata: TransactionMetadata,
        auxiliary_scripts: Vec<NativeScript>,
    },
    PostAlonzo(PostAlonzoAuxiliaryData),
}

impl CborEntity for AuxiliaryData {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.peek()? {
            DataType::Map => Ok(AuxiliaryData::Shelley(read_transaction_metadata(r)?)),
            DataType::Array => {
                r.read_start_array(LengthExpectation::Definite)?;
                let transaction_metadata = read_transaction_metadata(r)?;
                let auxiliary_scripts = read_native_script_list(r)?;
                r.read_end_array()?;
                Ok(AuxiliaryData::ShelleyMa {
                    transaction_metadata,
                    auxiliary_scripts,
                })
            }
            DataType::Tag => {
                r.read_tag()?;
                Ok(AuxiliaryData::PostAlonzo(PostAlonzoAuxiliaryData::from_cbor(r)?))
            }
            other => Err(ChainError::InvalidArgument(format!(
                "unexpected cbor type {other:?} for auxiliary data"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            AuxiliaryData::Shelley(metadata) => write_transaction_metadata(metadata, w)?,
            AuxiliaryData::ShelleyMa {
                transaction_metadata,
                auxiliary_scripts,
            } => {
                w.write_start_array(Some(2))?;
                write_transaction_metadata(transaction_metadata, w)?;
                write_native_script_list(auxiliary_scripts, w)?;
                w.write_end_array()?;
            }
            AuxiliaryData::PostAlonzo(data) => {
                w.write_tag(AUXILIARY_DATA_TAG)?;
                data.to_cbor(w)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelley_metadata_round_trips() {
        let metadata = AuxiliaryData::Shelley(vec![(
            721,
            Metadatum::Map(vec![(
                Metadatum::Text("policy".into()),
                Metadatum::Int(BigInt::from_i64(1)),
            )]),
        )]);
        let mut w = Writer::new();
        metadata.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(AuxiliaryData::from_cbor(&mut r).unwrap(), metadata);
    }

    #[test]
    fn shelley_ma_round_trips_with_auxiliary_scripts() {
        let metadata = AuxiliaryData::ShelleyMa {
            transaction_metadata: vec![(0, Metadatum::Text("hello".into()))],
            auxiliary_scripts: vec![crate::scripts::NativeScript::InvalidBefore(100)],
        };
        let mut w = Writer::new();
        metadata.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(AuxiliaryData::from_cbor(&mut r).unwrap(), metadata);
    }

    #[test]
    fn post_alonzo_round_trips_with_tag_259() {
        let data = AuxiliaryData::PostAlonzo(PostAlonzoAuxiliaryData {
            metadata: Some(vec![(100, Metadatum::Bytes(vec![1, 2, 3]))]),
            native_scripts: vec![],
            plutus_v1_scripts: vec![PlutusScript::new(Language::PlutusV1, vec![0xca, 0xfe])],
            plutus_v2_scripts: vec![],
            plutus_v3_scripts: vec![],
        });
        let mut w = Writer::new();
        data.to_cbor(&mut w).unwrap();
        let bytes = w.to_bytes();
        assert_eq!(bytes[0], 0xd9); // two-byte tag prefix for 259
        let mut r = Reader::from_bytes(&bytes);
        let decoded = AuxiliaryData::from_cbor(&mut r).unwrap();
        match &decoded {
            AuxiliaryData::PostAlonzo(d) => {
                assert_eq!(d.plutus_v1_scripts[0].language, Language::PlutusV1);
            }
            other => panic!("expected post-alonzo, got {other:?}"),
        }
        assert_eq!(decoded, data);
    }

    #[test]
    fn metadatum_array_preserves_order() {
        let value = Metadatum::Array(vec![
            Metadatum::Int(BigInt::from_i64(3)),
            Metadatum::Int(BigInt::from_i64(1)),
            Metadatum::Int(BigInt::from_i64(2)),
        ]);
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(Metadatum::from_cbor(&mut r).unwrap(), value);
    }
}
