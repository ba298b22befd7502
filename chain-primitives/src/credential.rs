//! Stake credentials and delegated representatives.
//!
//! Both are encoded as a 2-element array `[tag, hash]` (or `[tag]` for the
//! credential-less DRep variants), following `conway/model.rs`'s
//! `StakeCredential`/`DRep` flat-enum encoding — reproduced here by hand
//! since this crate doesn't use the teacher's forked `#[cbor(flat)]`
//! derive.

use chain_codec::reader::LengthExpectation;
use chain_codec::{Reader, Writer};
use chain_crypto::Hash;

use crate::entity::CborEntity;
use crate::error::ChainError;

/// The constitutional committee's cold (offline, custody) credential.
pub type CommitteeColdCredential = Credential;

/// The constitutional committee's hot (online, voting) credential,
/// authorized by a cold credential via `Certificate::AuthCommitteeHot`.
pub type CommitteeHotCredential = Credential;

/// A 28-byte credential: either a key hash or a script hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Credential {
    KeyHash(Hash<28>),
    ScriptHash(Hash<28>),
}

impl Credential {
    pub fn hash(&self) -> &Hash<28> {
        match self {
            Credential::KeyHash(h) | Credential::ScriptHash(h) => h,
        }
    }
}

impl CborEntity for Credential {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let tag = r.read_u64()?;
        let hash = Hash::<28>::from_cbor(r)?;
        r.read_end_array()?;
        match tag {
            0 => Ok(Credential::KeyHash(hash)),
            1 => Ok(Credential::ScriptHash(hash)),
            other => Err(ChainError::InvalidArgument(format!(
                "unknown credential tag {other}"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        match self {
            Credential::KeyHash(hash) => {
                w.write_u64(0)?;
                hash.to_cbor(w)?;
            }
            Credential::ScriptHash(hash) => {
                w.write_u64(1)?;
                hash.to_cbor(w)?;
            }
        }
        w.write_end_array()?;
        Ok(())
    }
}

/// Delegated representative. `Abstain` and `NoConfidence` must not carry a
/// credential — enforced structurally by having no payload, per spec §3's
/// DRep invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DRep {
    KeyHashDRep(Credential),
    ScriptHashDRep(Credential),
    Abstain,
    NoConfidence,
}

impl DRep {
    /// Validates that `credential`'s variant matches `KeyHashDRep`/
    /// `ScriptHashDRep` as required (keyhash credential for a key-hash DRep,
    /// scripthash credential for a script-hash DRep).
    pub fn new_key_hash(credential: Credential) -> Result<Self, ChainError> {
        match credential {
            Credential::KeyHash(_) => Ok(DRep::KeyHashDRep(credential)),
            Credential::ScriptHash(_) => Err(ChainError::InvalidArgument(
                "KeyHashDRep requires a key-hash credential".into(),
            )),
        }
    }

    pub fn new_script_hash(credential: Credential) -> Result<Self, ChainError> {
        match credential {
            Credential::ScriptHash(_) => Ok(DRep::ScriptHashDRep(credential)),
            Credential::KeyHash(_) => Err(ChainError::InvalidArgument(
                "ScriptHashDRep requires a script-hash credential".into(),
            )),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            DRep::KeyHashDRep(c) | DRep::ScriptHashDRep(c) => Some(c),
            DRep::Abstain | DRep::NoConfidence => None,
        }
    }
}

impl CborEntity for DRep {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Either)?;
        let tag = r.read_u64()?;
        let value = match tag {
            0 => DRep::KeyHashDRep(Credential::KeyHash(Hash::<28>::from_cbor(r)?)),
            1 => DRep::ScriptHashDRep(Credential::ScriptHash(Hash::<28>::from_cbor(r)?)),
            2 => DRep::Abstain,
            3 => DRep::NoConfidence,
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown drep tag {other}"
                )))
            }
        };
        r.read_end_array()?;
        Ok(value)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            DRep::KeyHashDRep(Credential::KeyHash(hash)) => {
                w.write_start_array(Some(2))?;
                w.write_u64(0)?;
                hash.to_cbor(w)?;
            }
            DRep::ScriptHashDRep(Credential::ScriptHash(hash)) => {
                w.write_start_array(Some(2))?;
                w.write_u64(1)?;
                hash.to_cbor(w)?;
            }
            DRep::KeyHashDRep(_) | DRep::ScriptHashDRep(_) => {
                return Err(ChainError::InvalidArgument(
                    "DRep credential variant mismatch".into(),
                ))
            }
            DRep::Abstain => {
                w.write_start_array(Some(1))?;
                w.write_u64(2)?;
            }
            DRep::NoConfidence => {
                w.write_start_array(Some(1))?;
                w.write_u64(3)?;
            }
        }
        w.write_end_array()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drep_abstain_round_trips_from_scenario_a() {
        let bytes = hex::decode("8102").unwrap();
        let mut r = Reader::from_bytes(&bytes);
        let drep = DRep::from_cbor(&mut r).unwrap();
        assert_eq!(drep, DRep::Abstain);
        assert!(drep.credential().is_none());

        let mut w = Writer::new();
        drep.to_cbor(&mut w).unwrap();
        assert_eq!(w.to_bytes(), bytes);
    }

    #[test]
    fn drep_key_hash_round_trips_from_scenario_b() {
        let bytes = hex::decode(
            "8200581c00000000000000000000000000000000000000000000000000000000",
        )
        .unwrap();
        let mut r = Reader::from_bytes(&bytes);
        let drep = DRep::from_cbor(&mut r).unwrap();
        let credential = drep.credential().unwrap();
        assert_eq!(credential.hash().as_ref(), &[0u8; 28]);

        let mut w = Writer::new();
        drep.to_cbor(&mut w).unwrap();
        assert_eq!(w.to_bytes(), bytes);
    }

    #[test]
    fn new_key_hash_rejects_script_hash_credential() {
        let credential = Credential::ScriptHash(Hash::new([1; 28]));
        assert!(DRep::new_key_hash(credential).is_err());
    }
}
