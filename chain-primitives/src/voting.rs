//! Votes cast on governance actions: who voted, what they voted, and the
//! nested map a transaction's voting procedures are collected into.
//!
//! Grounded in `conway_model_ref.rs`'s `Voter`/`Vote`/`VotingProcedure`/
//! `VotingProcedures`. `Voter`'s CBOR tags are non-contiguous in the
//! teacher's own derive attributes (`ConstitutionalCommitteeKey` is tag 0
//! but declared after `ConstitutionalCommitteeScript`'s tag 1) — preserved
//! here exactly, since the tag values are the wire contract, not the
//! declaration order.

use chain_codec::reader::LengthExpectation;
use chain_codec::{Reader, Writer};
use chain_crypto::Hash;

use crate::entity::CborEntity;
use crate::error::ChainError;
use crate::governance::{Anchor, GovActionId};

/// The party casting a vote: a committee member (hot credential), a DRep, or
/// a stake pool operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Voter {
    ConstitutionalCommitteeKey(Hash<28>),
    ConstitutionalCommitteeScript(Hash<28>),
    DRepKey(Hash<28>),
    DRepScript(Hash<28>),
    StakePoolKey(Hash<28>),
}

impl CborEntity for Voter {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let tag = r.read_u64()?;
        let hash = Hash::<28>::from_cbor(r)?;
        r.read_end_array()?;
        match tag {
            0 => Ok(Voter::ConstitutionalCommitteeKey(hash)),
            1 => Ok(Voter::ConstitutionalCommitteeScript(hash)),
            2 => Ok(Voter::DRepKey(hash)),
            3 => Ok(Voter::DRepScript(hash)),
            4 => Ok(Voter::StakePoolKey(hash)),
            other => Err(ChainError::InvalidArgument(format!(
                "unknown voter tag {other}"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        let (tag, hash) = match self {
            Voter::ConstitutionalCommitteeKey(h) => (0, h),
            Voter::ConstitutionalCommitteeScript(h) => (1, h),
            Voter::DRepKey(h) => (2, h),
            Voter::DRepScript(h) => (3, h),
            Voter::StakePoolKey(h) => (4, h),
        };
        w.write_start_array(Some(2))?;
        w.write_u64(tag)?;
        hash.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// A cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    No,
    Yes,
    Abstain,
}

impl CborEntity for Vote {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.read_u64()? {
            0 => Ok(Vote::No),
            1 => Ok(Vote::Yes),
            2 => Ok(Vote::Abstain),
            other => Err(ChainError::InvalidArgument(format!(
                "unknown vote value {other}"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        let value = match self {
            Vote::No => 0,
            Vote::Yes => 1,
            Vote::Abstain => 2,
        };
        w.write_u64(value)?;
        Ok(())
    }
}

/// A vote plus an optional anchor to the voter's rationale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingProcedure {
    pub vote: Vote,
    pub anchor: Option<Anchor>,
}

impl CborEntity for VotingProcedure {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let vote = Vote::from_cbor(r)?;
        let anchor = match r.peek()? {
            chain_codec::DataType::SimpleValue => {
                r.read_null()?;
                None
            }
            _ => Some(Anchor::from_cbor(r)?),
        };
        r.read_end_array()?;
        Ok(Self { vote, anchor })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        self.vote.to_cbor(w)?;
        match &self.anchor {
            Some(a) => a.to_cbor(w)?,
            None => w.write_null()?,
        }
        w.write_end_array()?;
        Ok(())
    }
}

/// The full set of votes a transaction casts: `Voter -> (GovActionId ->
/// VotingProcedure)`, preserving insertion order of both map levels (no
/// canonical CBOR re-sort — matches how `PlutusData::Map` is handled
/// elsewhere in this crate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VotingProcedures(Vec<(Voter, Vec<(GovActionId, VotingProcedure)>)>);

impl VotingProcedures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, voter: Voter, votes: Vec<(GovActionId, VotingProcedure)>) {
        self.0.push((voter, votes));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Voter, Vec<(GovActionId, VotingProcedure)>)> {
        self.0.iter()
    }
}

impl CborEntity for VotingProcedures {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let len = r.read_start_map(LengthExpectation::Either)?;
        let mut out = Vec::new();
        match len.as_definite() {
            Some(n) => {
                for _ in 0..n {
                    let voter = Voter::from_cbor(r)?;
                    let votes = read_inner_map(r)?;
                    out.push((voter, votes));
                }
            }
            None => {
                while !r.at_break()? {
                    let voter = Voter::from_cbor(r)?;
                    let votes = read_inner_map(r)?;
                    out.push((voter, votes));
                }
                r.consume_break()?;
            }
        }
        r.read_end_map()?;
        Ok(Self(out))
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_map(Some(self.0.len() as u64))?;
        for (voter, votes) in &self.0 {
            voter.to_cbor(w)?;
            write_inner_map(votes, w)?;
        }
        w.write_end_map()?;
        Ok(())
    }
}

fn read_inner_map(r: &mut Reader) -> Result<Vec<(GovActionId, VotingProcedure)>, ChainError> {
    let len = r.read_start_map(LengthExpectation::Either)?;
    let mut out = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                let id = GovActionId::from_cbor(r)?;
                let procedure = VotingProcedure::from_cbor(r)?;
                out.push((id, procedure));
            }
        }
        None => {
            while !r.at_break()? {
                let id = GovActionId::from_cbor(r)?;
                let procedure = VotingProcedure::from_cbor(r)?;
                out.push((id, procedure));
            }
            r.consume_break()?;
        }
    }
    r.read_end_map()?;
    Ok(out)
}

fn write_inner_map(
    entries: &[(GovActionId, VotingProcedure)],
    w: &mut Writer,
) -> Result<(), ChainError> {
    w.write_start_map(Some(entries.len() as u64))?;
    for (id, procedure) in entries {
        id.to_cbor(w)?;
        procedure.to_cbor(w)?;
    }
    w.write_end_map()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voter_tags_round_trip() {
        let voters = vec![
            Voter::ConstitutionalCommitteeKey(Hash::new([1u8; 28])),
            Voter::ConstitutionalCommitteeScript(Hash::new([2u8; 28])),
            Voter::DRepKey(Hash::new([3u8; 28])),
            Voter::DRepScript(Hash::new([4u8; 28])),
            Voter::StakePoolKey(Hash::new([5u8; 28])),
        ];
        for voter in voters {
            let mut w = Writer::new();
            voter.to_cbor(&mut w).unwrap();
            let mut r = Reader::from_bytes(&w.to_bytes());
            assert_eq!(Voter::from_cbor(&mut r).unwrap(), voter);
        }
    }

    #[test]
    fn voting_procedures_round_trip_nested_map() {
        let mut procedures = VotingProcedures::new();
        procedures.insert(
            Voter::DRepKey(Hash::new([9u8; 28])),
            vec![(
                GovActionId {
                    transaction_id: Hash::new([1u8; 32]),
                    action_index: 0,
                },
                VotingProcedure {
                    vote: Vote::Yes,
                    anchor: None,
                },
            )],
        );
        let mut w = Writer::new();
        procedures.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(VotingProcedures::from_cbor(&mut r).unwrap(), procedures);
    }
}
