use thiserror::Error;

use chain_codec::CodecError;
use chain_crypto::CryptoError;

/// Errors raised while constructing, decoding or encoding an entity in the
/// on-chain data model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("element not found")]
    ElementNotFound,

    #[error("numeric overflow")]
    Overflow,
}

/// A bounded, per-entity diagnostic echo of the most recent failure on that
/// object — distinct from the typed `Result` every operation also returns.
/// Capped at 1023 bytes, as spec'd; longer messages are truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic(Option<String>);

impl Diagnostic {
    const MAX_LEN: usize = 1023;

    pub fn new() -> Self {
        Self(None)
    }

    pub fn get(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn set(&mut self, message: impl Into<String>) {
        let mut message = message.into();
        if message.len() > Self::MAX_LEN {
            message.truncate(Self::MAX_LEN);
        }
        self.0 = Some(message);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_overlong_messages() {
        let mut d = Diagnostic::new();
        d.set("x".repeat(2000));
        assert_eq!(d.get().len(), Diagnostic::MAX_LEN);
    }

    #[test]
    fn empty_by_default() {
        assert_eq!(Diagnostic::new().get(), "");
    }
}
