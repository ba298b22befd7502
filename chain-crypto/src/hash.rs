//! BLAKE2b hashing.
//!
//! Cardano hashes things at three fixed digest sizes: 224 bits (28 bytes,
//! credentials and pool/script hashes), 256 bits (32 bytes, transaction and
//! block body hashes) and 512 bits (64 bytes, bootstrap witness chaincode
//! material). [`Hash<BYTES>`] is the typed, compile-time-sized digest used
//! throughout `chain-primitives` — generalized from the teacher's
//! `pallas_crypto::hash::Hash`. [`BlakeHash`] is the runtime-checked
//! counterpart for call sites that only know the expected size at runtime
//! (the entry point callers reach when a hash length arrives from decoded
//! data rather than from a type parameter); it rejects anything outside
//! {28, 32, 64} with [`CryptoError::InvalidBlake2bHashSize`].

use std::{fmt, ops::Deref, str::FromStr};

use cryptoxide::digest::Digest as _;
use cryptoxide::blake2b::Blake2b;

use crate::error::CryptoError;

/// A cryptographic digest of exactly `BYTES` bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

impl<const BYTES: usize> Hash<BYTES> {
    #[inline]
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }
}

impl<const BYTES: usize> From<[u8; BYTES]> for Hash<BYTES> {
    #[inline]
    fn from(bytes: [u8; BYTES]) -> Self {
        Self::new(bytes)
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Hash<BYTES> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> Deref for Hash<BYTES> {
    type Target = [u8; BYTES];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const BYTES: usize> PartialEq<[u8]> for Hash<BYTES> {
    fn eq(&self, other: &[u8]) -> bool {
        self.0.eq(other)
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Hash<BYTES> {
    type Error = CryptoError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() != BYTES {
            let err = CryptoError::InvalidBlake2bHashSize {
                actual: value.len(),
            };
            tracing::debug!(error = %err, expected = BYTES, "hash size mismatch");
            return Err(err);
        }
        let mut bytes = [0u8; BYTES];
        bytes.copy_from_slice(value);
        Ok(Self(bytes))
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Hash<{BYTES}>"))
            .field(&hex::encode(self))
            .finish()
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self))
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; BYTES];
        hex::decode_to_slice(s, &mut bytes).map_err(CryptoError::from)?;
        Ok(Self::new(bytes))
    }
}

/// A BLAKE2b digest whose size (28, 32 or 64 bytes) is only known at
/// runtime, such as a hash length threaded through from decoded field data.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlakeHash(Vec<u8>);

impl BlakeHash {
    const VALID_SIZES: [usize; 3] = [28, 32, 64];

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if !Self::VALID_SIZES.contains(&bytes.len()) {
            return Err(CryptoError::InvalidBlake2bHashSize {
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for BlakeHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BlakeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlakeHash").field(&hex::encode(&self.0)).finish()
    }
}

impl fmt::Display for BlakeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Computes a BLAKE2b digest of `size_bytes` (28, 32 or 64) over `data`.
///
/// This is the runtime-sized entry point; callers who know the size at
/// compile time should prefer [`Hasher`].
pub fn blake2b(data: &[u8], size_bytes: usize) -> Result<BlakeHash, CryptoError> {
    if !BlakeHash::VALID_SIZES.contains(&size_bytes) {
        return Err(CryptoError::InvalidBlake2bHashSize { actual: size_bytes });
    }
    let mut hasher = Blake2b::new(size_bytes);
    hasher.input(data);
    let mut out = vec![0u8; size_bytes];
    hasher.result(&mut out);
    Ok(BlakeHash(out))
}

/// A typed BLAKE2b hasher for a fixed digest size known at compile time.
///
/// `BITS` is the digest size in bits (224, 256 or 512); `hash`/`finalize`
/// return a [`Hash`] of the matching byte length.
pub struct Hasher<const BITS: usize>(Blake2b);

impl<const BITS: usize> Hasher<BITS> {
    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        self.0.input(bytes);
    }
}

macro_rules! common_hasher {
    ($size:literal) => {
        impl Hasher<$size> {
            #[inline]
            pub fn new() -> Self {
                Self(Blake2b::new($size / 8))
            }

            #[inline]
            pub fn hash(bytes: &[u8]) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                hasher.input(bytes);
                hasher.finalize()
            }

            #[inline]
            pub fn hash_tagged(bytes: &[u8], tag: u8) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                hasher.input(&[tag]);
                hasher.input(bytes);
                hasher.finalize()
            }

            pub fn finalize(mut self) -> Hash<{ $size / 8 }> {
                let mut hash = [0; $size / 8];
                self.0.result(&mut hash);
                Hash::new(hash)
            }
        }

        impl Default for Hasher<$size> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

common_hasher!(224);
common_hasher!(256);
common_hasher!(512);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_224_produces_28_bytes() {
        let digest = Hasher::<224>::hash(b"My Public Key");
        assert_eq!(
            hex::encode(digest),
            "c123c9bc0e9e31a20a4aa23518836ec5fb54bdc85735c56b38eb79a5"
        );
    }

    #[test]
    fn hash_256_produces_32_bytes() {
        let digest = Hasher::<256>::hash(b"My transaction");
        assert_eq!(
            hex::encode(digest),
            "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21"
        );
    }

    #[test]
    fn runtime_blake2b_rejects_unsupported_size() {
        let err = blake2b(b"data", 20).unwrap_err();
        assert_eq!(err, CryptoError::InvalidBlake2bHashSize { actual: 20 });
    }

    #[test]
    fn runtime_blake2b_matches_typed_hasher() {
        let typed = Hasher::<256>::hash(b"same input");
        let dynamic = blake2b(b"same input", 32).unwrap();
        assert_eq!(typed.as_ref(), dynamic.as_ref());
    }

    #[test]
    fn from_str_round_trips() {
        let digest: Hash<32> = "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21"
            .parse()
            .unwrap();
        assert_eq!(digest.to_string(), "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21");
    }
}
