//! Rust-native building blocks for the Cardano on-chain data model.
//!
//! This crate doesn't provide any particular application; it re-exports
//! the codec, crypto, entity model and JSON mirror crates as a single
//! entry point for higher-level tooling (explorers, wallets, indexers)
//! to depend on.

#[doc(inline)]
pub use chain_crypto as crypto;

#[doc(inline)]
pub use chain_codec as codec;

pub mod ledger {
    //! On-chain entities and their CBOR codecs: certificates, governance
    //! actions, transaction parts, witnesses, Plutus data and scripts.

    #[doc(inline)]
    pub use chain_primitives as primitives;
}

#[cfg(feature = "json")]
#[doc(inline)]
pub use chain_json as json;
