//! Ed25519-BIP32 hierarchical key derivation.
//!
//! Wraps the `ed25519-bip32` crate's `XPrv`/`XPub` so derivation paths can
//! be walked without re-deriving the whole tree: [`Bip32PrivateKey::derive`]
//! is the private-parent-to-private-child step (CKDpriv), and
//! [`Bip32PublicKey::derive`] is the public-parent-to-public-child step
//! (CKDpub) used when only a watch-only public key is available.

use ed25519_bip32::{self, DerivationScheme, XPrv, XPub, XPRV_SIZE};
use rand_core::{CryptoRng, RngCore};

use crate::ed25519::{self, SecretKeyExtended};
use crate::error::CryptoError;

/// Ed25519-BIP32 hierarchical-deterministic private key.
#[derive(Clone, PartialEq, Eq)]
pub struct Bip32PrivateKey(XPrv);

impl Bip32PrivateKey {
    pub fn generate<T: RngCore + CryptoRng>(mut rng: T) -> Self {
        let mut buf = [0u8; XPRV_SIZE];
        rng.fill_bytes(&mut buf);
        Self(XPrv::normalize_bytes_force3rd(buf))
    }

    pub fn from_bytes(bytes: [u8; XPRV_SIZE]) -> Result<Self, CryptoError> {
        XPrv::from_bytes_verified(bytes)
            .map(Self)
            .map_err(|e| CryptoError::DerivationFailed {
                reason: format!("{e:?}"),
            })
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        self.0.as_ref().to_vec()
    }

    /// Private-parent-to-private-child derivation at the given index.
    pub fn derive(&self, index: u32) -> Self {
        Self(self.0.derive(DerivationScheme::V2, index))
    }

    pub fn to_ed25519_extended(&self) -> SecretKeyExtended {
        // SAFETY: `XPrv` guarantees the extended-key bit structure already
        // validated by `from_bytes_verified`/`normalize_bytes_force3rd`.
        unsafe { SecretKeyExtended::from_bytes_unchecked(self.0.extended_secret_key()) }
    }

    pub fn to_public(&self) -> Bip32PublicKey {
        Bip32PublicKey(self.0.public())
    }

    pub fn chain_code(&self) -> [u8; 32] {
        *self.0.chain_code()
    }
}

/// Ed25519-BIP32 hierarchical-deterministic public key.
#[derive(Clone, PartialEq, Eq)]
pub struct Bip32PublicKey(XPub);

impl Bip32PublicKey {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(XPub::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        self.0.as_ref().to_vec()
    }

    /// Public-parent-to-public-child derivation (CKDpub). Unlike
    /// `Bip32PrivateKey::derive`, this can fail: not every index yields a
    /// valid child point without the private half of the key pair.
    pub fn derive(&self, index: u32) -> Result<Self, CryptoError> {
        self.0
            .derive(DerivationScheme::V2, index)
            .map(Self)
            .map_err(|e| CryptoError::DerivationFailed {
                reason: format!("{e:?}"),
            })
    }

    pub fn to_ed25519_public_key(&self) -> ed25519::PublicKey {
        ed25519::PublicKey::from(self.0.public_key())
    }

    pub fn chain_code(&self) -> [u8; 32] {
        *self.0.chain_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn private_derivation_is_deterministic() {
        let root = Bip32PrivateKey::generate(OsRng);
        let a = root.derive(0);
        let b = root.derive(0);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn public_derivation_matches_private_derivation_public_key() {
        let root = Bip32PrivateKey::generate(OsRng);
        let child_priv = root.derive(5);
        let child_pub_via_priv = child_priv.to_public();

        let root_pub = root.to_public();
        let child_pub_via_pub = root_pub.derive(5).unwrap();

        assert_eq!(child_pub_via_priv.as_bytes(), child_pub_via_pub.as_bytes());
    }

    #[test]
    fn signatures_made_with_derived_extended_key_verify() {
        let root = Bip32PrivateKey::generate(OsRng);
        let child = root.derive(7);
        let secret = child.to_ed25519_extended();
        let public = secret.public_key();
        let signature = secret.sign(b"derived key signing");
        assert!(public.verify(b"derived key signing", &signature));
    }
}
