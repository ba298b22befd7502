use thiserror::Error;

/// Errors raised by hashing, key and signature operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid blake2b hash size {actual}, expected one of 28, 32, 64 bytes")]
    InvalidBlake2bHashSize { actual: usize },

    #[error("invalid public key size, expecting {expected} bytes, found {actual}")]
    InvalidPublicKeySize { expected: usize, actual: usize },

    #[error("invalid signature size, expecting {expected} bytes, found {actual}")]
    InvalidSignatureSize { expected: usize, actual: usize },

    #[error("invalid extended secret key: required bit tweaks are not present")]
    InvalidExtendedSecretKey,

    #[error("invalid hex encoding")]
    InvalidHex,

    #[error("bip32 derivation failed: {reason}")]
    DerivationFailed { reason: String },
}

impl From<hex::FromHexError> for CryptoError {
    fn from(_: hex::FromHexError) -> Self {
        CryptoError::InvalidHex
    }
}
