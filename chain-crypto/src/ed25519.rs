//! Ed25519 and Ed25519-Extended asymmetric keys.
//!
//! [`SecretKey`] is a plain Ed25519 signing key. [`SecretKeyExtended`] is the
//! 64-byte expanded form BIP32 derivation produces and consumes (see
//! [`crate::bip32`]); only the extended form can be derived.

use std::{any::type_name, fmt, str::FromStr};

use cryptoxide::ed25519::{
    self, EXTENDED_KEY_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};
use rand_core::{CryptoRng, RngCore};

use crate::error::CryptoError;
use crate::memsec::Scrubbed as _;

/// Ed25519 secret key.
#[derive(Clone)]
pub struct SecretKey([u8; Self::SIZE]);

/// Ed25519 extended secret key, as produced by BIP32 derivation.
#[derive(Clone)]
pub struct SecretKeyExtended([u8; Self::SIZE]);

/// Ed25519 public key, verifies signatures produced by the matching secret key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; Self::SIZE]);

/// Ed25519 signature over an arbitrary message.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; Self::SIZE]);

macro_rules! impl_size_zero {
    ($Type:ty, $Size:expr) => {
        impl $Type {
            pub const SIZE: usize = $Size;

            #[inline]
            fn zero() -> Self {
                Self([0; Self::SIZE])
            }
        }
    };
}

impl_size_zero!(SecretKey, PRIVATE_KEY_LENGTH);
impl_size_zero!(SecretKeyExtended, EXTENDED_KEY_LENGTH);
impl_size_zero!(PublicKey, PUBLIC_KEY_LENGTH);
impl_size_zero!(Signature, SIGNATURE_LENGTH);

impl SecretKey {
    pub fn new<Rng>(mut rng: Rng) -> Self
    where
        Rng: RngCore + CryptoRng,
    {
        let mut s = Self::zero();
        rng.fill_bytes(&mut s.0);
        s
    }

    pub fn public_key(&self) -> PublicKey {
        let (mut sk, pk) = ed25519::keypair(&self.0);
        sk.scrub();
        PublicKey(pk)
    }

    pub fn sign<T: AsRef<[u8]>>(&self, msg: T) -> Signature {
        let (mut sk, _) = ed25519::keypair(&self.0);
        let signature = ed25519::signature(msg.as_ref(), &sk);
        sk.scrub();
        Signature(signature)
    }

    /// Returns the raw key bytes. Marked unsafe to flag that the caller
    /// takes over responsibility for keeping the key material private.
    ///
    /// # Safety
    /// The returned bytes are no longer protected by this type's `Drop`
    /// scrubbing; the caller must not let them outlive their need.
    #[inline]
    pub unsafe fn leak_into_bytes(Self(bytes): Self) -> [u8; Self::SIZE] {
        bytes
    }
}

impl SecretKeyExtended {
    pub fn new<Rng>(mut rng: Rng) -> Self
    where
        Rng: RngCore + CryptoRng,
    {
        let mut s = Self::zero();
        rng.fill_bytes(&mut s.0);
        s.0[0] &= 0b1111_1000;
        s.0[31] &= 0b0011_1111;
        s.0[31] |= 0b0100_0000;
        s
    }

    #[inline]
    #[allow(clippy::verbose_bit_mask)]
    fn check_structure(&self) -> bool {
        (self.0[0] & 0b0000_0111) == 0
            && (self.0[31] & 0b0100_0000) == 0b0100_0000
            && (self.0[31] & 0b1000_0000) == 0
    }

    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Result<Self, CryptoError> {
        let candidate = Self(bytes);
        if candidate.check_structure() {
            Ok(candidate)
        } else {
            Err(CryptoError::InvalidExtendedSecretKey)
        }
    }

    /// Builds a [`SecretKeyExtended`] without checking the bit tweaks.
    ///
    /// # Safety
    /// `bytes` must already satisfy the Ed25519-extended bit structure
    /// (as guaranteed by a BIP32 derivation path); otherwise signatures
    /// produced from the result are not meaningful.
    pub unsafe fn from_bytes_unchecked(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(ed25519::extended_to_public(&self.0))
    }

    pub fn sign<T: AsRef<[u8]>>(&self, msg: T) -> Signature {
        Signature::from(ed25519::signature_extended(msg.as_ref(), &self.0))
    }

    /// # Safety
    /// See [`SecretKey::leak_into_bytes`].
    #[inline]
    pub unsafe fn leak_into_bytes(Self(bytes): Self) -> [u8; Self::SIZE] {
        bytes
    }
}

impl PublicKey {
    #[inline]
    pub fn verify<T: AsRef<[u8]>>(&self, message: T, signature: &Signature) -> bool {
        ed25519::verify(message.as_ref(), &self.0, &signature.0)
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.scrub()
    }
}

impl Drop for SecretKeyExtended {
    fn drop(&mut self) {
        self.0.scrub()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_ref()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_ref()))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&hex::encode(self.as_ref())).finish()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&hex::encode(self.as_ref())).finish()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(&format!("SecretKey<{}>", type_name::<Self>()))
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for SecretKeyExtended {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(&format!("SecretKeyExtended<{}>", type_name::<Self>()))
            .finish_non_exhaustive()
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<[u8; Self::SIZE]> for PublicKey {
    fn from(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<PublicKey> for [u8; PublicKey::SIZE] {
    fn from(pk: PublicKey) -> Self {
        pk.0
    }
}

impl From<[u8; Self::SIZE]> for Signature {
    fn from(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<[u8; Self::SIZE]> for SecretKey {
    fn from(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<[u8; Self::SIZE]> for SecretKeyExtended {
    type Error = CryptoError;
    fn try_from(bytes: [u8; Self::SIZE]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl<'a> TryFrom<&'a [u8]> for PublicKey {
    type Error = CryptoError;
    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        if value.len() != Self::SIZE {
            let err = CryptoError::InvalidPublicKeySize {
                expected: Self::SIZE,
                actual: value.len(),
            };
            tracing::debug!(error = %err, "public key size mismatch");
            Err(err)
        } else {
            let mut s = Self::zero();
            s.0.copy_from_slice(value);
            Ok(s)
        }
    }
}

impl<'a> TryFrom<&'a [u8]> for Signature {
    type Error = CryptoError;
    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        if value.len() != Self::SIZE {
            let err = CryptoError::InvalidSignatureSize {
                expected: Self::SIZE,
                actual: value.len(),
            };
            tracing::debug!(error = %err, "signature size mismatch");
            Err(err)
        } else {
            let mut s = Self::zero();
            s.0.copy_from_slice(value);
            Ok(s)
        }
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut r = Self::zero();
        hex::decode_to_slice(s, &mut r.0).map_err(CryptoError::from)?;
        Ok(r)
    }
}

impl FromStr for Signature {
    type Err = CryptoError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut r = Self::zero();
        hex::decode_to_slice(s, &mut r.0).map_err(CryptoError::from)?;
        Ok(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn signing_verify_works() {
        let signing_key = SecretKey::new(OsRng);
        let public_key = signing_key.public_key();
        let signature = signing_key.sign(b"hello world");
        assert!(public_key.verify(b"hello world", &signature));
    }

    #[test]
    fn signing_verify_works_extended() {
        let signing_key = SecretKeyExtended::new(OsRng);
        let public_key = signing_key.public_key();
        let signature = signing_key.sign(b"hello world");
        assert!(public_key.verify(b"hello world", &signature));
    }

    #[test]
    fn tampered_message_fails_verification() {
        let signing_key = SecretKey::new(OsRng);
        let public_key = signing_key.public_key();
        let signature = signing_key.sign(b"hello world");
        assert!(!public_key.verify(b"hello world!", &signature));
    }

    #[test]
    fn public_key_try_from_rejects_wrong_size() {
        let err = PublicKey::try_from([0u8; 10].as_slice()).unwrap_err();
        assert_eq!(
            err,
            CryptoError::InvalidPublicKeySize {
                expected: PublicKey::SIZE,
                actual: 10
            }
        );
    }

    #[test]
    fn public_key_display_round_trips_via_from_str() {
        let signing_key = SecretKey::new(OsRng);
        let public_key = signing_key.public_key();
        let s = public_key.to_string();
        let decoded: PublicKey = s.parse().unwrap();
        assert_eq!(decoded, public_key);
    }
}
