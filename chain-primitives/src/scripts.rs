//! Native and Plutus scripts: the two witness forms a transaction input or
//! certificate can be authorized by.
//!
//! `NativeScript` is grounded directly in `alonzo/model.rs::NativeScript`'s
//! `[tag, ...]` array encoding, reproduced by hand since this crate doesn't
//! derive codecs. `Language` follows `conway/model.rs::Language`.

use chain_codec::reader::LengthExpectation;
use chain_codec::{Reader, Writer};
use chain_crypto::Hash;

use crate::entity::CborEntity;
use crate::error::ChainError;

/// A multi-signature script evaluated natively by the ledger (no Plutus
/// interpreter involved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeScript {
    ScriptPubkey(Hash<28>),
    ScriptAll(Vec<NativeScript>),
    ScriptAny(Vec<NativeScript>),
    ScriptNOfK(u32, Vec<NativeScript>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

impl CborEntity for NativeScript {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Either)?;
        let tag = r.read_u64()?;
        let value = match tag {
            0 => NativeScript::ScriptPubkey(Hash::<28>::from_cbor(r)?),
            1 => NativeScript::ScriptAll(read_script_list(r)?),
            2 => NativeScript::ScriptAny(read_script_list(r)?),
            3 => {
                let n = r.read_u64()?;
                NativeScript::ScriptNOfK(n as u32, read_script_list(r)?)
            }
            4 => NativeScript::InvalidBefore(r.read_u64()?),
            5 => NativeScript::InvalidHereafter(r.read_u64()?),
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown native script tag {other}"
                )))
            }
        };
        r.read_end_array()?;
        Ok(value)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            NativeScript::ScriptPubkey(hash) => {
                w.write_start_array(Some(2))?;
                w.write_u64(0)?;
                hash.to_cbor(w)?;
            }
            NativeScript::ScriptAll(scripts) => {
                w.write_start_array(Some(2))?;
                w.write_u64(1)?;
                write_script_list(scripts, w)?;
            }
            NativeScript::ScriptAny(scripts) => {
                w.write_start_array(Some(2))?;
                w.write_u64(2)?;
                write_script_list(scripts, w)?;
            }
            NativeScript::ScriptNOfK(n, scripts) => {
                w.write_start_array(Some(3))?;
                w.write_u64(3)?;
                w.write_u64(*n as u64)?;
                write_script_list(scripts, w)?;
            }
            NativeScript::InvalidBefore(slot) => {
                w.write_start_array(Some(2))?;
                w.write_u64(4)?;
                w.write_u64(*slot)?;
            }
            NativeScript::InvalidHereafter(slot) => {
                w.write_start_array(Some(2))?;
                w.write_u64(5)?;
                w.write_u64(*slot)?;
            }
        }
        w.write_end_array()?;
        Ok(())
    }
}

fn read_script_list(r: &mut Reader) -> Result<Vec<NativeScript>, ChainError> {
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

fn write_script_list(scripts: &[NativeScript], w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_array(Some(scripts.len() as u64))?;
    for s in scripts {
        s.to_cbor(w)?;
    }
    w.write_end_array()?;
    Ok(())
}

/// A Plutus language version, tagging which interpreter a `PlutusScript`
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Language {
    PlutusV1,
    PlutusV2,
    PlutusV3,
}

impl CborEntity for Language {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.read_u64()? {
            0 => Ok(Language::PlutusV1),
            1 => Ok(Language::PlutusV2),
            2 => Ok(Language::PlutusV3),
            other => Err(ChainError::InvalidArgument(format!(
                "unknown plutus language {other}"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        let value = match self {
            Language::PlutusV1 => 0,
            Language::PlutusV2 => 1,
            Language::PlutusV3 => 2,
        };
        w.write_u64(value)?;
        Ok(())
    }
}

/// A Plutus script: a flat blob of compiled UPLC, tagged with the language
/// version it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlutusScript {
    pub language: Language,
    pub bytes: Vec<u8>,
}

impl PlutusScript {
    pub fn new(language: Language, bytes: Vec<u8>) -> Self {
        Self { language, bytes }
    }
}

impl CborEntity for PlutusScript {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        // The language tag isn't part of this entity's own encoding —
        // scripts are stored in per-language buckets in `WitnessSet` — so
        // decoding a bare `PlutusScript` assumes V1 unless a caller wraps
        // this with the bucket it was read from.
        let bytes = r.read_bytes()?;
        Ok(Self {
            language: Language::PlutusV1,
            bytes,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_bytes(&self.bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &NativeScript) -> NativeScript {
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        NativeScript::from_cbor(&mut r).unwrap()
    }

    #[test]
    fn script_pubkey_round_trips() {
        let value = NativeScript::ScriptPubkey(Hash::new([9u8; 28]));
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn nested_all_of_any_round_trips() {
        let value = NativeScript::ScriptAll(vec![
            NativeScript::ScriptPubkey(Hash::new([1u8; 28])),
            NativeScript::ScriptAny(vec![
                NativeScript::InvalidBefore(100),
                NativeScript::InvalidHereafter(200),
            ]),
        ]);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn n_of_k_round_trips() {
        let value = NativeScript::ScriptNOfK(
            2,
            vec![
                NativeScript::ScriptPubkey(Hash::new([1u8; 28])),
                NativeScript::ScriptPubkey(Hash::new([2u8; 28])),
                NativeScript::ScriptPubkey(Hash::new([3u8; 28])),
            ],
        );
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn language_round_trips() {
        for lang in [Language::PlutusV1, Language::PlutusV2, Language::PlutusV3] {
            let mut w = Writer::new();
            lang.to_cbor(&mut w).unwrap();
            let mut r = Reader::from_bytes(&w.to_bytes());
            assert_eq!(Language::from_cbor(&mut r).unwrap(), lang);
        }
    }
}
