//! The witness set: signatures and scripts a transaction carries to satisfy
//! its inputs' authorization requirements.
//!
//! `VKeyWitness`/`BootstrapWitness` are grounded in `alonzo/model.rs`.
//! `RedeemerTag` (Conway's 6-variant version, extending Alonzo's 4 with
//! `Vote`/`Propose`), `Redeemer`, and `Redeemers`' list-or-map dual encoding
//! are grounded in `conway_model_ref.rs`. `WitnessSet`'s 8-key map and its
//! per-language Plutus script buckets are grounded in
//! `conway_model_ref.rs::WitnessSet` (keys 0-7) — this is also where
//! `PlutusScript::language` gets its value filled in, since the language
//! isn't part of the script's own wire encoding.

use chain_codec::reader::LengthExpectation;
use chain_codec::{DataType, Reader, Writer};
use chain_crypto::Hash;

use crate::entity::CborEntity;
use crate::error::ChainError;
use crate::numeric::ExUnits;
use crate::plutus_data::PlutusData;
use crate::scripts::{Language, NativeScript, PlutusScript};

/// An Ed25519 key witness: the verification key and the signature it made
/// over the transaction body hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VKeyWitness {
    pub vkey: Vec<u8>,
    pub signature: Vec<u8>,
}

impl CborEntity for VKeyWitness {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let vkey = r.read_bytes()?;
        let signature = r.read_bytes()?;
        r.read_end_array()?;
        Ok(Self { vkey, signature })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        w.write_bytes(&self.vkey)?;
        w.write_bytes(&self.signature)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// A Byron-era bootstrap witness: a vkey, signature, chain code and
/// attributes blob, none of which may be omitted even when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapWitness {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub chain_code: Vec<u8>,
    pub attributes: Vec<u8>,
}

impl BootstrapWitness {
    pub fn new(
        public_key: Vec<u8>,
        signature: Vec<u8>,
        chain_code: Vec<u8>,
        attributes: Vec<u8>,
    ) -> Result<Self, ChainError> {
        if public_key.is_empty() {
            return Err(ChainError::InvalidArgument(
                "bootstrap witness public key must not be empty".into(),
            ));
        }
        if signature.is_empty() {
            return Err(ChainError::InvalidArgument(
                "bootstrap witness signature must not be empty".into(),
            ));
        }
        if chain_code.is_empty() {
            return Err(ChainError::InvalidArgument(
                "bootstrap witness chain code must not be empty".into(),
            ));
        }
        if attributes.is_empty() {
            return Err(ChainError::InvalidArgument(
                "bootstrap witness attributes must not be empty".into(),
            ));
        }
        Ok(Self {
            public_key,
            signature,
            chain_code,
            attributes,
        })
    }
}

impl CborEntity for BootstrapWitness {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let public_key = r.read_bytes()?;
        let signature = r.read_bytes()?;
        let chain_code = r.read_bytes()?;
        let attributes = r.read_bytes()?;
        r.read_end_array()?;
        BootstrapWitness::new(public_key, signature, chain_code, attributes)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(4))?;
        w.write_bytes(&self.public_key)?;
        w.write_bytes(&self.signature)?;
        w.write_bytes(&self.chain_code)?;
        w.write_bytes(&self.attributes)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// Which part of the transaction a redeemer authorizes execution for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RedeemerTag {
    Spend,
    Mint,
    Cert,
    Reward,
    Vote,
    Propose,
}

impl CborEntity for RedeemerTag {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.read_u64()? {
            0 => Ok(RedeemerTag::Spend),
            1 => Ok(RedeemerTag::Mint),
            2 => Ok(RedeemerTag::Cert),
            3 => Ok(RedeemerTag::Reward),
            4 => Ok(RedeemerTag::Vote),
            5 => Ok(RedeemerTag::Propose),
            other => Err(ChainError::InvalidArgument(format!(
                "unknown redeemer tag {other}"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        let value = match self {
            RedeemerTag::Spend => 0,
            RedeemerTag::Mint => 1,
            RedeemerTag::Cert => 2,
            RedeemerTag::Reward => 3,
            RedeemerTag::Vote => 4,
            RedeemerTag::Propose => 5,
        };
        w.write_u64(value)?;
        Ok(())
    }
}

/// A single redeemer: which input/mint/cert/etc this authorizes, the datum
/// passed to the script, and the execution budget it's allowed to spend.
#[derive(Debug, Clone, PartialEq)]
pub struct Redeemer {
    pub tag: RedeemerTag,
    pub index: u32,
    pub data: PlutusData,
    pub ex_units: ExUnits,
}

impl CborEntity for Redeemer {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let tag = RedeemerTag::from_cbor(r)?;
        let index = r.read_u64()? as u32;
        let data = PlutusData::from_cbor(r)?;
        let ex_units = ExUnits::from_cbor(r)?;
        r.read_end_array()?;
        Ok(Self {
            tag,
            index,
            data,
            ex_units,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(4))?;
        self.tag.to_cbor(w)?;
        w.write_u64(self.index as u64)?;
        self.data.to_cbor(w)?;
        self.ex_units.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// The key side of the map-form redeemer encoding: a tag/index pair without
/// the payload, used once redeemers are addressed by key rather than kept
/// as a flat list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RedeemerKey {
    pub tag: RedeemerTag,
    pub index: u32,
}

/// The value side of the map-form redeemer encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RedeemerValue {
    pub data: PlutusData,
    pub ex_units: ExUnits,
}

/// Post-Conway redeemers may be encoded either as a flat list (pre-Conway
/// shape) or as a `{tag,index} -> {data,ex_units}` map — decoding dispatches
/// on the wire's major type.
#[derive(Debug, Clone, PartialEq)]
pub enum Redeemers {
    List(Vec<Redeemer>),
    Map(Vec<(RedeemerKey, RedeemerValue)>),
}

impl CborEntity for Redeemers {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.peek()? {
            DataType::Array => {
                let len = r.read_start_array(LengthExpectation::Either)?;
                let mut items = Vec::new();
                match len.as_definite() {
                    Some(n) => {
                        for _ in 0..n {
                            items.push(Redeemer::from_cbor(r)?);
                        }
                    }
                    None => {
                        while !r.at_break()? {
                            items.push(Redeemer::from_cbor(r)?);
                        }
                        r.consume_break()?;
                    }
                }
                r.read_end_array()?;
                Ok(Redeemers::List(items))
            }
            DataType::Map => {
                let len = r.read_start_map(LengthExpectation::Either)?;
                let mut entries = Vec::new();
                match len.as_definite() {
                    Some(n) => {
                        for _ in 0..n {
                            entries.push(read_redeemer_entry(r)?);
                        }
                    }
                    None => {
                        while !r.at_break()? {
                            entries.push(read_redeemer_entry(r)?);
                        }
                        r.consume_break()?;
                    }
                }
                r.read_end_map()?;
                Ok(Redeemers::Map(entries))
            }
            other => Err(ChainError::InvalidArgument(format!(
                "unexpected cbor type {other:?} for redeemers"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            Redeemers::List(items) => {
                w.write_start_array(Some(items.len() as u64))?;
                for item in items {
                    item.to_cbor(w)?;
                }
                w.write_end_array()?;
            }
            Redeemers::Map(entries) => {
                w.write_start_map(Some(entries.len() as u64))?;
                for (key, value) in entries {
                    w.write_start_array(Some(2))?;
                    key.tag.to_cbor(w)?;
                    w.write_u64(key.index as u64)?;
                    w.write_end_array()?;
                    w.write_start_array(Some(2))?;
                    value.data.to_cbor(w)?;
                    value.ex_units.to_cbor(w)?;
                    w.write_end_array()?;
                }
                w.write_end_map()?;
            }
        }
        Ok(())
    }
}

fn read_redeemer_entry(r: &mut Reader) -> Result<(RedeemerKey, RedeemerValue), ChainError> {
    r.read_start_array(LengthExpectation::Definite)?;
    let tag = RedeemerTag::from_cbor(r)?;
    let index = r.read_u64()? as u32;
    r.read_end_array()?;
    r.read_start_array(LengthExpectation::Definite)?;
    let data = PlutusData::from_cbor(r)?;
    let ex_units = ExUnits::from_cbor(r)?;
    r.read_end_array()?;
    Ok((RedeemerKey { tag, index }, RedeemerValue { data, ex_units }))
}

fn read_list<T: CborEntity>(r: &mut Reader) -> Result<Vec<T>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut items = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                items.push(T::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                items.push(T::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(items)
}

fn write_list<T: CborEntity>(items: &[T], w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_array(Some(items.len() as u64))?;
    for item in items {
        item.to_cbor(w)?;
    }
    w.write_end_array()?;
    Ok(())
}

fn read_plutus_script_bucket(
    r: &mut Reader,
    language: Language,
) -> Result<Vec<PlutusScript>, ChainError> {
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
    for script in scripts {
        w.write_bytes(&script.bytes)?;
    }
    w.write_end_array()?;
    Ok(())
}

/// The complete witness bundle attached to a transaction, a CBOR map keyed
/// 0-7. Every Plutus script read through this entity carries the correct
/// [`Language`] for the bucket it was decoded from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WitnessSet {
    pub vkeywitness: Vec<VKeyWitness>,
    pub native_script: Vec<NativeScript>,
    pub bootstrap_witness: Vec<BootstrapWitness>,
    pub plutus_v1_script: Vec<PlutusScript>,
    pub plutus_data: Vec<PlutusData>,
    pub redeemer: Option<Redeemers>,
    pub plutus_v2_script: Vec<PlutusScript>,
    pub plutus_v3_script: Vec<PlutusScript>,
}

impl CborEntity for WitnessSet {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let len = r.read_start_map(LengthExpectation::Either)?;
        let count = len.as_definite();
        let mut out = WitnessSet::default();
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
                0 => out.vkeywitness = read_list(r)?,
                1 => out.native_script = read_list(r)?,
                2 => out.bootstrap_witness = read_list(r)?,
                3 => out.plutus_v1_script = read_plutus_script_bucket(r, Language::PlutusV1)?,
                4 => out.plutus_data = read_list(r)?,
                5 => out.redeemer = Some(Redeemers::from_cbor(r)?),
                6 => out.plutus_v2_script = read_plutus_script_bucket(r, Language::PlutusV2)?,
                7 => out.plutus_v3_script = read_plutus_script_bucket(r, Language::PlutusV3)?,
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
        if !self.vkeywitness.is_empty() {
            count += 1;
        }
        if !self.native_script.is_empty() {
            count += 1;
        }
        if !self.bootstrap_witness.is_empty() {
            count += 1;
        }
        if !self.plutus_v1_script.is_empty() {
            count += 1;
        }
        if !self.plutus_data.is_empty() {
            count += 1;
        }
        if self.redeemer.is_some() {
            count += 1;
        }
        if !self.plutus_v2_script.is_empty() {
            count += 1;
        }
        if !self.plutus_v3_script.is_empty() {
            count += 1;
        }

        w.write_start_map(Some(count))?;
        if !self.vkeywitness.is_empty() {
            w.write_u64(0)?;
            write_list(&self.vkeywitness, w)?;
        }
        if !self.native_script.is_empty() {
            w.write_u64(1)?;
            write_list(&self.native_script, w)?;
        }
        if !self.bootstrap_witness.is_empty() {
            w.write_u64(2)?;
            write_list(&self.bootstrap_witness, w)?;
        }
        if !self.plutus_v1_script.is_empty() {
            w.write_u64(3)?;
            write_plutus_script_bucket(&self.plutus_v1_script, w)?;
        }
        if !self.plutus_data.is_empty() {
            w.write_u64(4)?;
            write_list(&self.plutus_data, w)?;
        }
        if let Some(redeemer) = &self.redeemer {
            w.write_u64(5)?;
            redeemer.to_cbor(w)?;
        }
        if !self.plutus_v2_script.is_empty() {
            w.write_u64(6)?;
            write_plutus_script_bucket(&self.plutus_v2_script, w)?;
        }
        if !self.plutus_v3_script.is_empty() {
            w.write_u64(7)?;
            write_plutus_script_bucket(&self.plutus_v3_script, w)?;
        }
        w.write_end_map()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_codec::BigInt;

    #[test]
    fn vkey_witness_round_trips() {
        let witness = VKeyWitness {
            vkey: vec![1; 32],
            signature: vec![2; 64],
        };
        let mut w = Writer::new();
        witness.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(VKeyWitness::from_cbor(&mut r).unwrap(), witness);
    }

    #[test]
    fn bootstrap_witness_rejects_empty_components() {
        assert!(BootstrapWitness::new(vec![], vec![2; 64], vec![3; 32], vec![4]).is_err());
        assert!(BootstrapWitness::new(vec![1; 32], vec![], vec![3; 32], vec![4]).is_err());
        assert!(BootstrapWitness::new(vec![1; 32], vec![2; 64], vec![], vec![4]).is_err());
        assert!(BootstrapWitness::new(vec![1; 32], vec![2; 64], vec![3; 32], vec![]).is_err());
        assert!(BootstrapWitness::new(vec![1; 32], vec![2; 64], vec![3; 32], vec![4]).is_ok());
    }

    #[test]
    fn bootstrap_witness_round_trips() {
        let witness = BootstrapWitness::new(vec![1; 32], vec![2; 64], vec![3; 32], vec![4]).unwrap();
        let mut w = Writer::new();
        witness.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(BootstrapWitness::from_cbor(&mut r).unwrap(), witness);
    }

    #[test]
    fn redeemers_list_round_trips() {
        let redeemers = Redeemers::List(vec![Redeemer {
            tag: RedeemerTag::Spend,
            index: 0,
            data: PlutusData::Integer(BigInt::from_i64(1)),
            ex_units: ExUnits { mem: 100, steps: 200 },
        }]);
        let mut w = Writer::new();
        redeemers.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(Redeemers::from_cbor(&mut r).unwrap(), redeemers);
    }

    #[test]
    fn redeemers_map_round_trips() {
        let redeemers = Redeemers::Map(vec![(
            RedeemerKey {
                tag: RedeemerTag::Mint,
                index: 1,
            },
            RedeemerValue {
                data: PlutusData::Integer(BigInt::from_i64(2)),
                ex_units: ExUnits { mem: 1, steps: 2 },
            },
        )]);
        let mut w = Writer::new();
        redeemers.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(Redeemers::from_cbor(&mut r).unwrap(), redeemers);
    }

    #[test]
    fn witness_set_assigns_language_per_bucket() {
        let mut set = WitnessSet::default();
        set.plutus_v2_script.push(PlutusScript::new(Language::PlutusV2, vec![1, 2, 3]));
        let mut w = Writer::new();
        set.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        let decoded = WitnessSet::from_cbor(&mut r).unwrap();
        assert_eq!(decoded.plutus_v2_script[0].language, Language::PlutusV2);
        assert_eq!(decoded, set);
    }

    #[test]
    fn empty_witness_set_round_trips() {
        let set = WitnessSet::default();
        let mut w = Writer::new();
        set.to_cbor(&mut w).unwrap();
        assert_eq!(w.to_bytes(), vec![0xa0]);
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(WitnessSet::from_cbor(&mut r).unwrap(), set);
    }
}
