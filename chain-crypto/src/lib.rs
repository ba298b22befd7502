//! Hashing, Ed25519 keys/signatures and BIP32 derivation for the chain
//! entity model.

pub mod bip32;
pub mod ed25519;
pub mod error;
pub mod hash;
pub mod memsec;

pub use bip32::{Bip32PrivateKey, Bip32PublicKey};
pub use ed25519::{PublicKey, SecretKey, SecretKeyExtended, Signature};
pub use error::CryptoError;
pub use hash::{blake2b, BlakeHash, Hash, Hasher};
