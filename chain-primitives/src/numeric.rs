//! Protocol-parameter numeric types: rationals, execution units, cost
//! models and the parameter-update bundle a `ParameterChangeAction`
//! carries, grounded in `conway/model.rs`'s `UnitInterval`/`ExUnits`/
//! `CostModels`/`ProtocolParamUpdate`.

use std::collections::BTreeMap;

use chain_codec::reader::LengthExpectation;
use chain_codec::{BigInt, Reader, Writer};

use crate::entity::CborEntity;
use crate::error::ChainError;

const RATIONAL_TAG: u64 = 30;

/// An exact rational `numerator / denominator`, encoded as CBOR tag 30
/// wrapping a 2-element array, per RFC 8610's rational-number extension
/// that Cardano's CDDL adopts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationalNumber {
    pub numerator: u64,
    pub denominator: u64,
}

impl RationalNumber {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ChainError> {
        if denominator == 0 {
            return Err(ChainError::InvalidArgument(
                "rational denominator must be non-zero".into(),
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

impl CborEntity for RationalNumber {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_tag()?;
        r.read_start_array(LengthExpectation::Definite)?;
        let numerator = r.read_u64()?;
        let denominator = r.read_u64()?;
        r.read_end_array()?;
        RationalNumber::new(numerator, denominator)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_tag(RATIONAL_TAG)?;
        w.write_start_array(Some(2))?;
        w.write_u64(self.numerator)?;
        w.write_u64(self.denominator)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// A rational number constrained to `[0, 1]`, used for margins, growth
/// rates and voting thresholds.
pub type UnitInterval = RationalNumber;

/// Execution unit budget: memory and CPU step counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExUnits {
    pub mem: u64,
    pub steps: u64,
}

impl CborEntity for ExUnits {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let mem = r.read_u64()?;
        let steps = r.read_u64()?;
        r.read_end_array()?;
        Ok(Self { mem, steps })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        w.write_u64(self.mem)?;
        w.write_u64(self.steps)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// Per-step-kind prices for converting [`ExUnits`] to lovelace fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExUnitPrices {
    pub mem_price: UnitInterval,
    pub step_price: UnitInterval,
}

impl CborEntity for ExUnitPrices {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let mem_price = UnitInterval::from_cbor(r)?;
        let step_price = UnitInterval::from_cbor(r)?;
        r.read_end_array()?;
        Ok(Self {
            mem_price,
            step_price,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        self.mem_price.to_cbor(w)?;
        self.step_price.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// Protocol version `(major, minor)`, as negotiated by hard forks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u64,
    pub minor: u64,
}

impl CborEntity for ProtocolVersion {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let major = r.read_u64()?;
        let minor = r.read_u64()?;
        r.read_end_array()?;
        Ok(Self { major, minor })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        w.write_u64(self.major)?;
        w.write_u64(self.minor)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// A Plutus cost model: a flat list of integer cost-function parameters,
/// order defined by the Plutus language version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostModel(pub Vec<i64>);

impl CborEntity for CostModel {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let len = r.read_start_array(LengthExpectation::Either)?;
        let mut values = Vec::new();
        match len.as_definite() {
            Some(n) => {
                for _ in 0..n {
                    values.push(r.read_i64()?);
                }
            }
            None => {
                while !r.at_break()? {
                    values.push(r.read_i64()?);
                }
                r.consume_break()?;
            }
        }
        r.read_end_array()?;
        Ok(Self(values))
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(self.0.len() as u64))?;
        for v in &self.0 {
            w.write_i64(*v)?;
        }
        w.write_end_array()?;
        Ok(())
    }
}

/// Cost models keyed by Plutus language version. Unrecognized keys (a
/// future language version this crate doesn't know the name of) are
/// preserved in `unknown` rather than dropped, matching
/// `conway/model.rs::CostModels`'s explicit `unknown` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostModels {
    pub plutus_v1: Option<CostModel>,
    pub plutus_v2: Option<CostModel>,
    pub plutus_v3: Option<CostModel>,
    pub unknown: BTreeMap<u64, CostModel>,
}

impl CborEntity for CostModels {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let mut out = CostModels::default();
        let len = r.read_start_map(LengthExpectation::Either)?;
        let count = len.as_definite();
        let mut seen = 0u64;
        loop {
            if let Some(n) = count {
                if seen >= n {
                    break;
                }
            } else if r.at_break()? {
                break;
            }
            let key = r.read_u64()?;
            let model = CostModel::from_cbor(r)?;
            match key {
                0 => out.plutus_v1 = Some(model),
                1 => out.plutus_v2 = Some(model),
                2 => out.plutus_v3 = Some(model),
                other => {
                    out.unknown.insert(other, model);
                }
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
        let mut entries: Vec<(u64, &CostModel)> = Vec::new();
        if let Some(m) = &self.plutus_v1 {
            entries.push((0, m));
        }
        if let Some(m) = &self.plutus_v2 {
            entries.push((1, m));
        }
        if let Some(m) = &self.plutus_v3 {
            entries.push((2, m));
        }
        for (k, m) in &self.unknown {
            entries.push((*k, m));
        }
        entries.sort_by_key(|(k, _)| *k);

        w.write_start_map(Some(entries.len() as u64))?;
        for (k, m) in entries {
            w.write_u64(k)?;
            m.to_cbor(w)?;
        }
        w.write_end_map()?;
        Ok(())
    }
}

/// Voting thresholds SPOs must clear for each governance-action class,
/// encoded as a fixed 5-element array in this field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolVotingThresholds {
    pub motion_no_confidence: UnitInterval,
    pub committee_normal: UnitInterval,
    pub committee_no_confidence: UnitInterval,
    pub hard_fork_initiation: UnitInterval,
    pub security_voting_threshold: UnitInterval,
}

impl CborEntity for PoolVotingThresholds {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let out = Self {
            motion_no_confidence: UnitInterval::from_cbor(r)?,
            committee_normal: UnitInterval::from_cbor(r)?,
            committee_no_confidence: UnitInterval::from_cbor(r)?,
            hard_fork_initiation: UnitInterval::from_cbor(r)?,
            security_voting_threshold: UnitInterval::from_cbor(r)?,
        };
        r.read_end_array()?;
        Ok(out)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(5))?;
        self.motion_no_confidence.to_cbor(w)?;
        self.committee_normal.to_cbor(w)?;
        self.committee_no_confidence.to_cbor(w)?;
        self.hard_fork_initiation.to_cbor(w)?;
        self.security_voting_threshold.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// Voting thresholds DReps must clear for each governance-action class,
/// encoded as a fixed 10-element array in this field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DRepVotingThresholds {
    pub motion_no_confidence: UnitInterval,
    pub committee_normal: UnitInterval,
    pub committee_no_confidence: UnitInterval,
    pub update_constitution: UnitInterval,
    pub hard_fork_initiation: UnitInterval,
    pub pp_network_group: UnitInterval,
    pub pp_economic_group: UnitInterval,
    pub pp_technical_group: UnitInterval,
    pub pp_governance_group: UnitInterval,
    pub treasury_withdrawal: UnitInterval,
}

impl CborEntity for DRepVotingThresholds {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let out = Self {
            motion_no_confidence: UnitInterval::from_cbor(r)?,
            committee_normal: UnitInterval::from_cbor(r)?,
            committee_no_confidence: UnitInterval::from_cbor(r)?,
            update_constitution: UnitInterval::from_cbor(r)?,
            hard_fork_initiation: UnitInterval::from_cbor(r)?,
            pp_network_group: UnitInterval::from_cbor(r)?,
            pp_economic_group: UnitInterval::from_cbor(r)?,
            pp_technical_group: UnitInterval::from_cbor(r)?,
            pp_governance_group: UnitInterval::from_cbor(r)?,
            treasury_withdrawal: UnitInterval::from_cbor(r)?,
        };
        r.read_end_array()?;
        Ok(out)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(10))?;
        self.motion_no_confidence.to_cbor(w)?;
        self.committee_normal.to_cbor(w)?;
        self.committee_no_confidence.to_cbor(w)?;
        self.update_constitution.to_cbor(w)?;
        self.hard_fork_initiation.to_cbor(w)?;
        self.pp_network_group.to_cbor(w)?;
        self.pp_economic_group.to_cbor(w)?;
        self.pp_technical_group.to_cbor(w)?;
        self.pp_governance_group.to_cbor(w)?;
        self.treasury_withdrawal.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// The full protocol-parameter update bundle carried by
/// `GovAction::ParameterChange`, a CBOR map keyed by small integers (each
/// field independently optional) per `conway/model.rs::ProtocolParamUpdate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolParamUpdate {
    pub minfee_a: Option<u64>,
    pub minfee_b: Option<u64>,
    pub max_block_body_size: Option<u64>,
    pub max_transaction_size: Option<u64>,
    pub max_block_header_size: Option<u64>,
    pub key_deposit: Option<u64>,
    pub pool_deposit: Option<u64>,
    pub maximum_epoch: Option<u64>,
    pub desired_number_of_stake_pools: Option<u64>,
    pub pool_pledge_influence: Option<RationalNumber>,
    pub expansion_rate: Option<UnitInterval>,
    pub treasury_growth_rate: Option<UnitInterval>,
    pub min_pool_cost: Option<u64>,
    pub ada_per_utxo_byte: Option<u64>,
    pub cost_models_for_script_languages: Option<CostModels>,
    pub execution_costs: Option<ExUnitPrices>,
    pub max_tx_ex_units: Option<ExUnits>,
    pub max_block_ex_units: Option<ExUnits>,
    pub max_value_size: Option<u64>,
    pub collateral_percentage: Option<u64>,
    pub max_collateral_inputs: Option<u64>,
    pub pool_voting_thresholds: Option<PoolVotingThresholds>,
    pub drep_voting_thresholds: Option<DRepVotingThresholds>,
    pub min_committee_size: Option<u64>,
    pub committee_term_limit: Option<u64>,
    pub governance_action_validity_period: Option<u64>,
    pub governance_action_deposit: Option<u64>,
    pub drep_deposit: Option<u64>,
    pub drep_inactivity_period: Option<u64>,
    pub minfee_refscript_cost_per_byte: Option<UnitInterval>,
}

impl CborEntity for ProtocolParamUpdate {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let mut out = ProtocolParamUpdate::default();
        let len = r.read_start_map(LengthExpectation::Either)?;
        let count = len.as_definite();
        let mut seen = 0u64;
        loop {
            if let Some(n) = count {
                if seen >= n {
                    break;
                }
            } else if r.at_break()? {
                break;
            }
            let key = r.read_u64()?;
            match key {
                0 => out.minfee_a = Some(r.read_u64()?),
                1 => out.minfee_b = Some(r.read_u64()?),
                2 => out.max_block_body_size = Some(r.read_u64()?),
                3 => out.max_transaction_size = Some(r.read_u64()?),
                4 => out.max_block_header_size = Some(r.read_u64()?),
                5 => out.key_deposit = Some(r.read_u64()?),
                6 => out.pool_deposit = Some(r.read_u64()?),
                7 => out.maximum_epoch = Some(r.read_u64()?),
                8 => out.desired_number_of_stake_pools = Some(r.read_u64()?),
                9 => out.pool_pledge_influence = Some(RationalNumber::from_cbor(r)?),
                10 => out.expansion_rate = Some(UnitInterval::from_cbor(r)?),
                11 => out.treasury_growth_rate = Some(UnitInterval::from_cbor(r)?),
                16 => out.min_pool_cost = Some(r.read_u64()?),
                17 => out.ada_per_utxo_byte = Some(r.read_u64()?),
                18 => out.cost_models_for_script_languages = Some(CostModels::from_cbor(r)?),
                19 => out.execution_costs = Some(ExUnitPrices::from_cbor(r)?),
                20 => out.max_tx_ex_units = Some(ExUnits::from_cbor(r)?),
                21 => out.max_block_ex_units = Some(ExUnits::from_cbor(r)?),
                22 => out.max_value_size = Some(r.read_u64()?),
                23 => out.collateral_percentage = Some(r.read_u64()?),
                24 => out.max_collateral_inputs = Some(r.read_u64()?),
                25 => out.pool_voting_thresholds = Some(PoolVotingThresholds::from_cbor(r)?),
                26 => out.drep_voting_thresholds = Some(DRepVotingThresholds::from_cbor(r)?),
                27 => out.min_committee_size = Some(r.read_u64()?),
                28 => out.committee_term_limit = Some(r.read_u64()?),
                29 => out.governance_action_validity_period = Some(r.read_u64()?),
                30 => out.governance_action_deposit = Some(r.read_u64()?),
                31 => out.drep_deposit = Some(r.read_u64()?),
                32 => out.drep_inactivity_period = Some(r.read_u64()?),
                33 => out.minfee_refscript_cost_per_byte = Some(UnitInterval::from_cbor(r)?),
                _ => {
                    r.skip_value()?;
                }
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
        let mut entries: Vec<(u64, Box<dyn Fn(&mut Writer) -> Result<(), ChainError> + '_>)> =
            Vec::new();

        macro_rules! push_u64 {
            ($key:literal, $field:expr) => {
                if let Some(v) = $field {
                    let v = *v;
                    entries.push(($key, Box::new(move |w: &mut Writer| {
                        w.write_u64(v)?;
                        Ok(())
                    })));
                }
            };
        }
        macro_rules! push_entity {
            ($key:literal, $field:expr) => {
                if let Some(v) = &$field {
                    entries.push(($key, Box::new(move |w: &mut Writer| v.to_cbor(w))));
                }
            };
        }

        push_u64!(0, &self.minfee_a);
        push_u64!(1, &self.minfee_b);
        push_u64!(2, &self.max_block_body_size);
        push_u64!(3, &self.max_transaction_size);
        push_u64!(4, &self.max_block_header_size);
        push_u64!(5, &self.key_deposit);
        push_u64!(6, &self.pool_deposit);
        push_u64!(7, &self.maximum_epoch);
        push_u64!(8, &self.desired_number_of_stake_pools);
        push_entity!(9, self.pool_pledge_influence);
        push_entity!(10, self.expansion_rate);
        push_entity!(11, self.treasury_growth_rate);
        push_u64!(16, &self.min_pool_cost);
        push_u64!(17, &self.ada_per_utxo_byte);
        push_entity!(18, self.cost_models_for_script_languages);
        push_entity!(19, self.execution_costs);
        push_entity!(20, self.max_tx_ex_units);
        push_entity!(21, self.max_block_ex_units);
        push_u64!(22, &self.max_value_size);
        push_u64!(23, &self.collateral_percentage);
        push_u64!(24, &self.max_collateral_inputs);
        push_entity!(25, self.pool_voting_thresholds);
        push_entity!(26, self.drep_voting_thresholds);
        push_u64!(27, &self.min_committee_size);
        push_u64!(28, &self.committee_term_limit);
        push_u64!(29, &self.governance_action_validity_period);
        push_u64!(30, &self.governance_action_deposit);
        push_u64!(31, &self.drep_deposit);
        push_u64!(32, &self.drep_inactivity_period);
        push_entity!(33, self.minfee_refscript_cost_per_byte);

        entries.sort_by_key(|(k, _)| *k);
        w.write_start_map(Some(entries.len() as u64))?;
        for (k, write_value) in &entries {
            w.write_u64(*k)?;
            write_value(w)?;
        }
        w.write_end_map()?;
        Ok(())
    }
}

/// A coin-or-multiasset quantity that may exceed `u64` when the source is
/// a CBOR bignum (e.g. `PlutusData::Integer`); re-exported for callers that
/// need the underlying arbitrary-precision type without depending on
/// `chain-codec` directly.
pub type Quantity = BigInt;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_round_trips() {
        let r = RationalNumber::new(3, 5).unwrap();
        let mut w = Writer::new();
        r.to_cbor(&mut w).unwrap();
        let mut reader = Reader::from_bytes(&w.to_bytes());
        let decoded = RationalNumber::from_cbor(&mut reader).unwrap();
        assert_eq!(decoded, r);
    }

    #[test]
    fn rational_rejects_zero_denominator() {
        assert!(RationalNumber::new(1, 0).is_err());
    }

    #[test]
    fn ex_units_round_trip() {
        let u = ExUnits {
            mem: 1_000_000,
            steps: 500_000_000,
        };
        let mut w = Writer::new();
        u.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(ExUnits::from_cbor(&mut r).unwrap(), u);
    }

    #[test]
    fn protocol_param_update_round_trips_sparse_fields() {
        let mut update = ProtocolParamUpdate::default();
        update.minfee_a = Some(44);
        update.max_tx_ex_units = Some(ExUnits {
            mem: 10,
            steps: 20,
        });

        let mut w = Writer::new();
        update.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        let decoded = ProtocolParamUpdate::from_cbor(&mut r).unwrap();
        assert_eq!(decoded, update);
    }

    #[test]
    fn cost_models_preserve_unknown_language_keys() {
        let mut models = CostModels::default();
        models.plutus_v1 = Some(CostModel(vec![1, 2, 3]));
        models.unknown.insert(9, CostModel(vec![4]));

        let mut w = Writer::new();
        models.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        let decoded = CostModels::from_cbor(&mut r).unwrap();
        assert_eq!(decoded, models);
    }
}
