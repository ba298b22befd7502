//! On-chain certificates: stake (de)registration, delegation, pool lifecycle
//! and the governance-era credential/delegation/committee certificates
//! introduced in Conway.
//!
//! The Shelley-era variants (tags 0-4) are grounded in
//! `alonzo/model.rs::Certificate`. The Conway-era additions (tags 7-18,
//! replacing the deprecated Shelley `GenesisKeyDelegation`/
//! `MoveInstantaneousRewardsCert` at tags 5-6) are grounded in
//! `conway_model_ref.rs::Certificate`. Tags 5 and 6 are intentionally absent:
//! the two certificates that occupied them were retired before Conway and no
//! longer appear on the chains this crate targets.

use chain_codec::reader::LengthExpectation;
use chain_codec::{DataType, Reader, Writer};
use chain_crypto::Hash;

use crate::credential::{Credential, DRep};
use crate::entity::CborEntity;
use crate::error::ChainError;
use crate::governance::Anchor;
use crate::numeric::UnitInterval;
use crate::pool::{PoolMetadata, Relay};

/// A certificate embedded in a transaction body.
#[derive(Debug, Clone, PartialEq)]
pub enum Certificate {
    StakeRegistration(Credential),
    StakeDeregistration(Credential),
    StakeDelegation(Credential, Hash<28>),
    PoolRegistration {
        operator: Hash<28>,
        vrf_keyhash: Hash<32>,
        pledge: u64,
        cost: u64,
        margin: UnitInterval,
        reward_account: Vec<u8>,
        pool_owners: Vec<Hash<28>>,
        relays: Vec<Relay>,
        pool_metadata: Option<PoolMetadata>,
    },
    PoolRetirement(Hash<28>, u64),
    /// Combined stake registration + deposit, replacing the plain
    /// `StakeRegistration` once a deposit amount accompanies it.
    Reg(Credential, u64),
    UnReg(Credential, u64),
    VoteDeleg(Credential, DRep),
    StakeVoteDeleg(Credential, Hash<28>, DRep),
    StakeRegDeleg(Credential, Hash<28>, u64),
    VoteRegDeleg(Credential, DRep, u64),
    StakeVoteRegDeleg(Credential, Hash<28>, DRep, u64),
    AuthCommitteeHot(Credential, Credential),
    ResignCommitteeCold(Credential, Option<Anchor>),
    RegDRepCert(Credential, u64, Option<Anchor>),
    UnRegDRepCert(Credential, u64),
    UpdateDRepCert(Credential, Option<Anchor>),
}

fn read_optional_anchor(r: &mut Reader) -> Result<Option<Anchor>, ChainError> {
    match r.peek()? {
        DataType::SimpleValue => {
            r.read_null()?;
            Ok(None)
        }
        _ => Ok(Some(Anchor::from_cbor(r)?)),
    }
}

fn write_optional_anchor(anchor: &Option<Anchor>, w: &mut Writer) -> Result<(), ChainError> {
    match anchor {
        Some(a) => a.to_cbor(w)?,
        None => w.write_null()?,
    }
    Ok(())
}

fn read_owner_list(r: &mut Reader) -> Result<Vec<Hash<28>>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut owners = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                owners.push(Hash::<28>::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                owners.push(Hash::<28>::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(owners)
}

fn read_relay_list(r: &mut Reader) -> Result<Vec<Relay>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut relays = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                relays.push(Relay::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                relays.push(Relay::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(relays)
}

impl CborEntity for Certificate {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Either)?;
        let tag = r.read_u64()?;
        let value = match tag {
            0 => Certificate::StakeRegistration(Credential::from_cbor(r)?),
            1 => Certificate::StakeDeregistration(Credential::from_cbor(r)?),
            2 => {
                let cred = Credential::from_cbor(r)?;
                let pool = Hash::<28>::from_cbor(r)?;
                Certificate::StakeDelegation(cred, pool)
            }
            3 => {
                let operator = Hash::<28>::from_cbor(r)?;
                let vrf_keyhash = Hash::<32>::from_cbor(r)?;
                let pledge = r.read_u64()?;
                let cost = r.read_u64()?;
                let margin = UnitInterval::from_cbor(r)?;
                let reward_account = r.read_bytes()?;
                let pool_owners = read_owner_list(r)?;
                let relays = read_relay_list(r)?;
                let pool_metadata = match r.peek()? {
                    DataType::SimpleValue => {
                        r.read_null()?;
                        None
                    }
                    _ => Some(PoolMetadata::from_cbor(r)?),
                };
                Certificate::PoolRegistration {
                    operator,
                    vrf_keyhash,
                    pledge,
                    cost,
                    margin,
                    reward_account,
                    pool_owners,
                    relays,
                    pool_metadata,
                }
            }
            4 => {
                let pool = Hash::<28>::from_cbor(r)?;
                let epoch = r.read_u64()?;
                Certificate::PoolRetirement(pool, epoch)
            }
            7 => Certificate::Reg(Credential::from_cbor(r)?, r.read_u64()?),
            8 => Certificate::UnReg(Credential::from_cbor(r)?, r.read_u64()?),
            9 => {
                let cred = Credential::from_cbor(r)?;
                let drep = DRep::from_cbor(r)?;
                Certificate::VoteDeleg(cred, drep)
            }
            10 => {
                let cred = Credential::from_cbor(r)?;
                let pool = Hash::<28>::from_cbor(r)?;
                let drep = DRep::from_cbor(r)?;
                Certificate::StakeVoteDeleg(cred, pool, drep)
            }
            11 => {
                let cred = Credential::from_cbor(r)?;
                let pool = Hash::<28>::from_cbor(r)?;
                let deposit = r.read_u64()?;
                Certificate::StakeRegDeleg(cred, pool, deposit)
            }
            12 => {
                let cred = Credential::from_cbor(r)?;
                let drep = DRep::from_cbor(r)?;
                let deposit = r.read_u64()?;
                Certificate::VoteRegDeleg(cred, drep, deposit)
            }
            13 => {
                let cred = Credential::from_cbor(r)?;
                let pool = Hash::<28>::from_cbor(r)?;
                let drep = DRep::from_cbor(r)?;
                let deposit = r.read_u64()?;
                Certificate::StakeVoteRegDeleg(cred, pool, drep, deposit)
            }
            14 => {
                let cold = Credential::from_cbor(r)?;
                let hot = Credential::from_cbor(r)?;
                Certificate::AuthCommitteeHot(cold, hot)
            }
            15 => {
                let cold = Credential::from_cbor(r)?;
                let anchor = read_optional_anchor(r)?;
                Certificate::ResignCommitteeCold(cold, anchor)
            }
            16 => {
                let cred = Credential::from_cbor(r)?;
                let deposit = r.read_u64()?;
                let anchor = read_optional_anchor(r)?;
                Certificate::RegDRepCert(cred, deposit, anchor)
            }
            17 => {
                let cred = Credential::from_cbor(r)?;
                let deposit = r.read_u64()?;
                Certificate::UnRegDRepCert(cred, deposit)
            }
            18 => {
                let cred = Credential::from_cbor(r)?;
                let anchor = read_optional_anchor(r)?;
                Certificate::UpdateDRepCert(cred, anchor)
            }
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown certificate tag {other}"
                )))
            }
        };
        r.read_end_array()?;
        Ok(value)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            Certificate::StakeRegistration(cred) => {
                w.write_start_array(Some(2))?;
                w.write_u64(0)?;
                cred.to_cbor(w)?;
            }
            Certificate::StakeDeregistration(cred) => {
                w.write_start_array(Some(2))?;
                w.write_u64(1)?;
                cred.to_cbor(w)?;
            }
            Certificate::StakeDelegation(cred, pool) => {
                w.write_start_array(Some(3))?;
                w.write_u64(2)?;
                cred.to_cbor(w)?;
                pool.to_cbor(w)?;
            }
            Certificate::PoolRegistration {
                operator,
                vrf_keyhash,
                pledge,
                cost,
                margin,
                reward_account,
                pool_owners,
                relays,
                pool_metadata,
            } => {
                w.write_start_array(Some(9))?;
                w.write_u64(3)?;
                operator.to_cbor(w)?;
                vrf_keyhash.to_cbor(w)?;
                w.write_u64(*pledge)?;
                w.write_u64(*cost)?;
                margin.to_cbor(w)?;
                w.write_bytes(reward_account)?;
                w.write_start_array(Some(pool_owners.len() as u64))?;
                for owner in pool_owners {
                    owner.to_cbor(w)?;
                }
                w.write_end_array()?;
                w.write_start_array(Some(relays.len() as u64))?;
                for relay in relays {
                    relay.to_cbor(w)?;
                }
                w.write_end_array()?;
                match pool_metadata {
                    Some(metadata) => metadata.to_cbor(w)?,
                    None => w.write_null()?,
                }
            }
            Certificate::PoolRetirement(pool, epoch) => {
                w.write_start_array(Some(3))?;
                w.write_u64(4)?;
                pool.to_cbor(w)?;
                w.write_u64(*epoch)?;
            }
            Certificate::Reg(cred, deposit) => {
                w.write_start_array(Some(3))?;
                w.write_u64(7)?;
                cred.to_cbor(w)?;
                w.write_u64(*deposit)?;
            }
            Certificate::UnReg(cred, deposit) => {
                w.write_start_array(Some(3))?;
                w.write_u64(8)?;
                cred.to_cbor(w)?;
                w.write_u64(*deposit)?;
            }
            Certificate::VoteDeleg(cred, drep) => {
                w.write_start_array(Some(3))?;
                w.write_u64(9)?;
                cred.to_cbor(w)?;
                drep.to_cbor(w)?;
            }
            Certificate::StakeVoteDeleg(cred, pool, drep) => {
                w.write_start_array(Some(4))?;
                w.write_u64(10)?;
                cred.to_cbor(w)?;
                pool.to_cbor(w)?;
                drep.to_cbor(w)?;
            }
            Certificate::StakeRegDeleg(cred, pool, deposit) => {
                w.write_start_array(Some(4))?;
                w.write_u64(11)?;
                cred.to_cbor(w)?;
                pool.to_cbor(w)?;
                w.write_u64(*deposit)?;
            }
            Certificate::VoteRegDeleg(cred, drep, deposit) => {
                w.write_start_array(Some(4))?;
                w.write_u64(12)?;
                cred.to_cbor(w)?;
                drep.to_cbor(w)?;
                w.write_u64(*deposit)?;
            }
            Certificate::StakeVoteRegDeleg(cred, pool, drep, deposit) => {
                w.write_start_array(Some(5))?;
                w.write_u64(13)?;
                cred.to_cbor(w)?;
                pool.to_cbor(w)?;
                drep.to_cbor(w)?;
                w.write_u64(*deposit)?;
            }
            Certificate::AuthCommitteeHot(cold, hot) => {
                w.write_start_array(Some(3))?;
                w.write_u64(14)?;
                cold.to_cbor(w)?;
                hot.to_cbor(w)?;
            }
            Certificate::ResignCommitteeCold(cold, anchor) => {
                w.write_start_array(Some(3))?;
                w.write_u64(15)?;
                cold.to_cbor(w)?;
                write_optional_anchor(anchor, w)?;
            }
            Certificate::RegDRepCert(cred, deposit, anchor) => {
                w.write_start_array(Some(4))?;
                w.write_u64(16)?;
                cred.to_cbor(w)?;
                w.write_u64(*deposit)?;
                write_optional_anchor(anchor, w)?;
            }
            Certificate::UnRegDRepCert(cred, deposit) => {
                w.write_start_array(Some(3))?;
                w.write_u64(17)?;
                cred.to_cbor(w)?;
                w.write_u64(*deposit)?;
            }
            Certificate::UpdateDRepCert(cred, anchor) => {
                w.write_start_array(Some(3))?;
                w.write_u64(18)?;
                cred.to_cbor(w)?;
                write_optional_anchor(anchor, w)?;
            }
        }
        w.write_end_array()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &Certificate) -> Certificate {
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        Certificate::from_cbor(&mut r).unwrap()
    }

    #[test]
    fn stake_registration_round_trips() {
        let cert = Certificate::StakeRegistration(Credential::KeyHash(Hash::new([1u8; 28])));
        assert_eq!(round_trip(&cert), cert);
    }

    #[test]
    fn vote_deleg_round_trips() {
        let cert = Certificate::VoteDeleg(
            Credential::KeyHash(Hash::new([2u8; 28])),
            DRep::Abstain,
        );
        assert_eq!(round_trip(&cert), cert);
    }

    #[test]
    fn stake_vote_reg_deleg_round_trips_with_all_fields() {
        let cert = Certificate::StakeVoteRegDeleg(
            Credential::ScriptHash(Hash::new([3u8; 28])),
            Hash::new([4u8; 28]),
            DRep::NoConfidence,
            2_000_000,
        );
        assert_eq!(round_trip(&cert), cert);
    }

    #[test]
    fn reg_drep_cert_round_trips_without_anchor() {
        let cert = Certificate::RegDRepCert(Credential::KeyHash(Hash::new([5u8; 28])), 500_000_000, None);
        assert_eq!(round_trip(&cert), cert);
    }

    #[test]
    fn reg_drep_cert_round_trips_with_anchor() {
        let cert = Certificate::RegDRepCert(
            Credential::KeyHash(Hash::new([5u8; 28])),
            500_000_000,
            Some(Anchor {
                url: "https://example.com/drep.json".into(),
                content_hash: Hash::new([6u8; 32]),
            }),
        );
        assert_eq!(round_trip(&cert), cert);
    }

    #[test]
    fn pool_retirement_round_trips() {
        let cert = Certificate::PoolRetirement(Hash::new([7u8; 28]), 350);
        assert_eq!(round_trip(&cert), cert);
    }
}
