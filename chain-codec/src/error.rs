use thiserror::Error;

/// Errors surfaced by the [`crate::reader::Reader`] and
/// [`crate::writer::Writer`].
///
/// Mirrors the error taxonomy in the core's external interface: every
/// failure that a structural CBOR operation can produce gets its own
/// variant instead of a single opaque string, so callers (and an entity's
/// `last_error` echo) can distinguish them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid cbor")]
    InvalidCbor,

    #[error("unexpected cbor type: expected {expected}, found {actual}")]
    UnexpectedType { expected: String, actual: String },

    #[error("invalid array size: expected {expected}, found {actual}")]
    InvalidArraySize { expected: String, actual: u64 },

    #[error("invalid cbor tag: {tag}")]
    InvalidTag { tag: u64 },

    #[error("truncated cbor input")]
    Truncated,

    #[error("invalid utf-8 in cbor text string")]
    InvalidUtf8,

    #[error("integer overflow while decoding")]
    IntegerOverflow,

    #[error("decoding failed: {inner}")]
    DecodingFailed { inner: String },
}

impl From<minicbor::decode::Error> for CodecError {
    fn from(e: minicbor::decode::Error) -> Self {
        if e.is_end_of_input() {
            CodecError::Truncated
        } else {
            CodecError::DecodingFailed {
                inner: e.to_string(),
            }
        }
    }
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for CodecError {
    fn from(e: minicbor::encode::Error<E>) -> Self {
        CodecError::DecodingFailed {
            inner: e.to_string(),
        }
    }
}
