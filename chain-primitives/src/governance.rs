//! Governance actions: the Conway-era proposal/voting machinery — anchors,
//! governance action ids, the constitution, and the seven kinds of action a
//! proposal procedure can carry.
//!
//! Grounded in `conway_model_ref.rs`'s `Anchor`/`GovActionId`/`Constitution`/
//! `GovAction`/`ProposalProcedure`, reproduced by hand as a flat
//! `[tag, ...]` array per variant (the teacher's `#[cbor(flat)]` derive
//! this crate doesn't carry).

use chain_codec::reader::LengthExpectation;
use chain_codec::{DataType, Reader, Writer};
use chain_crypto::Hash;

use crate::credential::Credential;
use crate::entity::CborEntity;
use crate::error::ChainError;
use crate::numeric::{ProtocolParamUpdate, ProtocolVersion, UnitInterval};

/// A pointer to off-chain rationale: a URL plus the hash of the document it
/// resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub url: String,
    pub content_hash: Hash<32>,
}

impl CborEntity for Anchor {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let url = r.read_text()?;
        let content_hash = Hash::<32>::from_cbor(r)?;
        r.read_end_array()?;
        Ok(Self { url, content_hash })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        w.write_text(&self.url)?;
        self.content_hash.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// Identifies a governance action by the transaction that proposed it and
/// its index within that transaction's proposal procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GovActionId {
    pub transaction_id: Hash<32>,
    pub action_index: u32,
}

impl CborEntity for GovActionId {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let transaction_id = Hash::<32>::from_cbor(r)?;
        let action_index = r.read_u64()? as u32;
        r.read_end_array()?;
        Ok(Self {
            transaction_id,
            action_index,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        self.transaction_id.to_cbor(w)?;
        w.write_u64(self.action_index as u64)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// The on-chain constitution: an anchor plus an optional guardrail script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constitution {
    pub anchor: Anchor,
    pub guardrail_script: Option<Hash<28>>,
}

impl CborEntity for Constitution {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let anchor = Anchor::from_cbor(r)?;
        let guardrail_script = read_optional_hash28(r)?;
        r.read_end_array()?;
        Ok(Self {
            anchor,
            guardrail_script,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        self.anchor.to_cbor(w)?;
        write_optional_hash28(&self.guardrail_script, w)?;
        w.write_end_array()?;
        Ok(())
    }
}

fn read_optional_hash28(r: &mut Reader) -> Result<Option<Hash<28>>, ChainError> {
    match r.peek()? {
        DataType::SimpleValue => {
            r.read_null()?;
            Ok(None)
        }
        _ => Ok(Some(Hash::<28>::from_cbor(r)?)),
    }
}

fn write_optional_hash28(hash: &Option<Hash<28>>, w: &mut Writer) -> Result<(), ChainError> {
    match hash {
        Some(h) => h.to_cbor(w)?,
        None => w.write_null()?,
    }
    Ok(())
}

fn read_optional_gov_action_id(r: &mut Reader) -> Result<Option<GovActionId>, ChainError> {
    match r.peek()? {
        DataType::SimpleValue => {
            r.read_null()?;
            Ok(None)
        }
        _ => Ok(Some(GovActionId::from_cbor(r)?)),
    }
}

fn write_optional_gov_action_id(
    id: &Option<GovActionId>,
    w: &mut Writer,
) -> Result<(), ChainError> {
    match id {
        Some(i) => i.to_cbor(w)?,
        None => w.write_null()?,
    }
    Ok(())
}

fn read_cold_credential_set(r: &mut Reader) -> Result<Vec<Credential>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut out = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                out.push(Credential::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                out.push(Credential::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(out)
}

fn write_cold_credential_set(creds: &[Credential], w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_array(Some(creds.len() as u64))?;
    for c in creds {
        c.to_cbor(w)?;
    }
    w.write_end_array()?;
    Ok(())
}

fn read_epoch_map(r: &mut Reader) -> Result<Vec<(Credential, u64)>, ChainError> {
    let len = r.read_start_map(LengthExpectation::Either)?;
    let mut out = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                let cred = Credential::from_cbor(r)?;
                let epoch = r.read_u64()?;
                out.push((cred, epoch));
            }
        }
        None => {
            while !r.at_break()? {
                let cred = Credential::from_cbor(r)?;
                let epoch = r.read_u64()?;
                out.push((cred, epoch));
            }
            r.consume_break()?;
        }
    }
    r.read_end_map()?;
    Ok(out)
}

fn write_epoch_map(entries: &[(Credential, u64)], w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_map(Some(entries.len() as u64))?;
    for (cred, epoch) in entries {
        cred.to_cbor(w)?;
        w.write_u64(*epoch)?;
    }
    w.write_end_map()?;
    Ok(())
}

fn read_withdrawals_map(r: &mut Reader) -> Result<Vec<(Vec<u8>, u64)>, ChainError> {
    let len = r.read_start_map(LengthExpectation::Either)?;
    let mut out = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                let account = r.read_bytes()?;
                let coin = r.read_u64()?;
                out.push((account, coin));
            }
        }
        None => {
            while !r.at_break()? {
                let account = r.read_bytes()?;
                let coin = r.read_u64()?;
                out.push((account, coin));
            }
            r.consume_break()?;
        }
    }
    r.read_end_map()?;
    Ok(out)
}

fn write_withdrawals_map(entries: &[(Vec<u8>, u64)], w: &mut Writer) -> Result<(), ChainError> {
    w.write_start_map(Some(entries.len() as u64))?;
    for (account, coin) in entries {
        w.write_bytes(account)?;
        w.write_u64(*coin)?;
    }
    w.write_end_map()?;
    Ok(())
}

/// A governance action: the payload a `ProposalProcedure` carries and
/// voters vote on.
#[derive(Debug, Clone, PartialEq)]
pub enum GovAction {
    ParameterChange(
        Option<GovActionId>,
        Box<ProtocolParamUpdate>,
        Option<Hash<28>>,
    ),
    HardForkInitiation(Option<GovActionId>, ProtocolVersion),
    TreasuryWithdrawals(Vec<(Vec<u8>, u64)>, Option<Hash<28>>),
    NoConfidence(Option<GovActionId>),
    UpdateCommittee(
        Option<GovActionId>,
        Vec<Credential>,
        Vec<(Credential, u64)>,
        UnitInterval,
    ),
    NewConstitution(Option<GovActionId>, Constitution),
    Information,
}

impl CborEntity for GovAction {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Either)?;
        let tag = r.read_u64()?;
        let value = match tag {
            0 => {
                let gov_action_id = read_optional_gov_action_id(r)?;
                let update = Box::new(ProtocolParamUpdate::from_cbor(r)?);
                let policy = read_optional_hash28(r)?;
                GovAction::ParameterChange(gov_action_id, update, policy)
            }
            1 => {
                let gov_action_id = read_optional_gov_action_id(r)?;
                let version = ProtocolVersion::from_cbor(r)?;
                GovAction::HardForkInitiation(gov_action_id, version)
            }
            2 => {
                let withdrawals = read_withdrawals_map(r)?;
                let policy = read_optional_hash28(r)?;
                GovAction::TreasuryWithdrawals(withdrawals, policy)
            }
            3 => GovAction::NoConfidence(read_optional_gov_action_id(r)?),
            4 => {
                let gov_action_id = read_optional_gov_action_id(r)?;
                let members_to_remove = read_cold_credential_set(r)?;
                let members_to_add = read_epoch_map(r)?;
                let threshold = UnitInterval::from_cbor(r)?;
                GovAction::UpdateCommittee(
                    gov_action_id,
                    members_to_remove,
                    members_to_add,
                    threshold,
                )
            }
            5 => {
                let gov_action_id = read_optional_gov_action_id(r)?;
                let constitution = Constitution::from_cbor(r)?;
                GovAction::NewConstitution(gov_action_id, constitution)
            }
            6 => GovAction::Information,
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown governance action tag {other}"
                )))
            }
        };
        r.read_end_array()?;
        Ok(value)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            GovAction::ParameterChange(gov_action_id, update, policy) => {
                w.write_start_array(Some(4))?;
                w.write_u64(0)?;
                write_optional_gov_action_id(gov_action_id, w)?;
                update.to_cbor(w)?;
                write_optional_hash28(policy, w)?;
            }
            GovAction::HardForkInitiation(gov_action_id, version) => {
                w.write_start_array(Some(3))?;
                w.write_u64(1)?;
                write_optional_gov_action_id(gov_action_id, w)?;
                version.to_cbor(w)?;
            }
            GovAction::TreasuryWithdrawals(withdrawals, policy) => {
                w.write_start_array(Some(3))?;
                w.write_u64(2)?;
                write_withdrawals_map(withdrawals, w)?;
                write_optional_hash28(policy, w)?;
            }
            GovAction::NoConfidence(gov_action_id) => {
                w.write_start_array(Some(2))?;
                w.write_u64(3)?;
                write_optional_gov_action_id(gov_action_id, w)?;
            }
            GovAction::UpdateCommittee(gov_action_id, remove, add, threshold) => {
                w.write_start_array(Some(5))?;
                w.write_u64(4)?;
                write_optional_gov_action_id(gov_action_id, w)?;
                write_cold_credential_set(remove, w)?;
                write_epoch_map(add, w)?;
                threshold.to_cbor(w)?;
            }
            GovAction::NewConstitution(gov_action_id, constitution) => {
                w.write_start_array(Some(3))?;
                w.write_u64(5)?;
                write_optional_gov_action_id(gov_action_id, w)?;
                constitution.to_cbor(w)?;
            }
            GovAction::Information => {
                w.write_start_array(Some(1))?;
                w.write_u64(6)?;
            }
        }
        w.write_end_array()?;
        Ok(())
    }
}

/// A proposal procedure: a deposit, the reward account it's refunded to, the
/// action being proposed and an anchor to its rationale.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalProcedure {
    pub deposit: u64,
    pub reward_account: Vec<u8>,
    pub gov_action: GovAction,
    pub anchor: Anchor,
}

impl CborEntity for ProposalProcedure {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let deposit = r.read_u64()?;
        let reward_account = r.read_bytes()?;
        let gov_action = GovAction::from_cbor(r)?;
        let anchor = Anchor::from_cbor(r)?;
        r.read_end_array()?;
        Ok(Self {
            deposit,
            reward_account,
            gov_action,
            anchor,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(4))?;
        w.write_u64(self.deposit)?;
        w.write_bytes(&self.reward_account)?;
        self.gov_action.to_cbor(w)?;
        self.anchor.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_anchor() -> Anchor {
        Anchor {
            url: "https://example.com/rationale.json".into(),
            content_hash: Hash::new([1u8; 32]),
        }
    }

    #[test]
    fn information_action_round_trips() {
        let proposal = ProposalProcedure {
            deposit: 100_000_000_000,
            reward_account: vec![0xe1, 0x02],
            gov_action: GovAction::Information,
            anchor: sample_anchor(),
        };
        let mut w = Writer::new();
        proposal.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(ProposalProcedure::from_cbor(&mut r).unwrap(), proposal);
    }

    #[test]
    fn parameter_change_round_trips() {
        let action = GovAction::ParameterChange(
            Some(GovActionId {
                transaction_id: Hash::new([2u8; 32]),
                action_index: 0,
            }),
            Box::new(ProtocolParamUpdate::default()),
            None,
        );
        let mut w = Writer::new();
        action.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(GovAction::from_cbor(&mut r).unwrap(), action);
    }

    #[test]
    fn update_committee_round_trips() {
        let action = GovAction::UpdateCommittee(
            None,
            vec![Credential::KeyHash(Hash::new([3u8; 28]))],
            vec![(Credential::ScriptHash(Hash::new([4u8; 28])), 500)],
            UnitInterval::new(2, 3).unwrap(),
        );
        let mut w = Writer::new();
        action.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(GovAction::from_cbor(&mut r).unwrap(), action);
    }

    #[test]
    fn new_constitution_round_trips() {
        let action = GovAction::NewConstitution(
            None,
            Constitution {
                anchor: sample_anchor(),
                guardrail_script: Some(Hash::new([5u8; 28])),
            },
        );
        let mut w = Writer::new();
        action.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(GovAction::from_cbor(&mut r).unwrap(), action);
    }
}
