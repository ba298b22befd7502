//! The Cardano on-chain data model: certificates, governance actions,
//! transaction bodies, witnesses and the scalar/container types they're
//! built from, all implementing [`entity::CborEntity`] over
//! [`chain_codec::Reader`]/[`chain_codec::Writer`].

pub mod auxiliary_data;
pub mod certs;
pub mod containers;
pub mod credential;
pub mod entity;
pub mod error;
pub mod governance;
#[cfg(feature = "json")]
pub mod json;
pub mod numeric;
pub mod plutus_data;
pub mod pool;
pub mod scripts;
pub mod transaction;
pub mod voting;
pub mod witness_set;

pub use auxiliary_data::{AuxiliaryData, Metadatum, PostAlonzoAuxiliaryData, TransactionMetadata};
pub use certs::Certificate;
pub use containers::{OrderedList, Set};
pub use credential::{CommitteeColdCredential, CommitteeHotCredential, Credential, DRep};
pub use entity::{Cached, CborEntity};
pub use error::{ChainError, Diagnostic};
pub use governance::{Anchor, Constitution, GovAction, GovActionId, ProposalProcedure};
#[cfg(feature = "json")]
pub use json::ToJson;
pub use numeric::{
    CostModel, CostModels, DRepVotingThresholds, ExUnitPrices, ExUnits, PoolVotingThresholds,
    ProtocolParamUpdate, ProtocolVersion, Quantity, RationalNumber, UnitInterval,
};
pub use plutus_data::{Constr, PlutusData};
pub use pool::{PoolMetadata, PoolParams, Relay};
pub use scripts::{Language, NativeScript, PlutusScript};
pub use transaction::{
    AssetBundle, CachedTransactionOutput, DatumOption, LegacyTransactionOutput, MultiAsset,
    PostAlonzoTransactionOutput, ScriptRef, TransactionInput, TransactionOutput, Value,
};
pub use voting::{Vote, Voter, VotingProcedure, VotingProcedures};
pub use witness_set::{
    BootstrapWitness, Redeemer, RedeemerKey, RedeemerTag, RedeemerValue, Redeemers, VKeyWitness,
    WitnessSet,
};
