//! The contract every domain entity satisfies: a bidirectional CBOR codec.
//!
//! Entities additionally carry a [`crate::error::Diagnostic`] and, where
//! `from_cbor` built them, a [`chain_codec::CborCache`] — those live on the
//! concrete type rather than in this trait, since not every `CborEntity`
//! (e.g. a bare hash) needs a cache slot. [`Cached<T>`] is how an entity
//! module opts into carrying both: it composes around any `CborEntity`
//! rather than duplicating cache/diagnostic fields into each entity's own
//! struct, the same way `pallas-codec`'s `KeepRaw<T>` wraps a decoded value
//! instead of baking byte-range tracking into it.

use chain_codec::{CborCache, Reader, Writer};

use crate::error::{ChainError, Diagnostic};

pub trait CborEntity: Sized {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError>;
    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError>;
}

/// Wraps a [`CborEntity`] with the codec cache and per-object diagnostic
/// the universal entity contract calls for, without requiring the wrapped
/// type to carry those fields itself.
///
/// `from_cbor` captures the exact byte range it decoded `T` from; as long
/// as no mutator runs afterwards (`get_mut`, which clears the cache, is the
/// only way to reach `T` mutably), `to_cbor` replays those bytes verbatim
/// instead of re-deriving them from `T`'s own `to_cbor`. This is what keeps
/// a decoded-then-re-encoded value byte-identical to its input even when
/// `T`'s canonical encoding could otherwise diverge from a non-canonical
/// but valid original (e.g. a map whose fields were written in a different
/// order, or an indefinite-length form where the canonical writer would
/// choose definite).
#[derive(Debug, Clone)]
pub struct Cached<T> {
    inner: T,
    cache: CborCache,
    diagnostic: Diagnostic,
}

impl<T> Cached<T> {
    /// Wraps a value with no cache and no diagnostic, as used by `new`-style
    /// constructors that didn't come from a decode.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: CborCache::empty(),
            diagnostic: Diagnostic::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.inner
    }

    /// Mutable access to the wrapped entity. Invalidates the cache: per the
    /// cached-bytes invariant, any mutation means `to_cbor` can no longer
    /// replay the original bytes and must fall back to re-deriving them.
    pub fn get_mut(&mut self) -> &mut T {
        self.cache.clear();
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The most recent decode/encode failure recorded against this object,
    /// or an empty string if none.
    pub fn last_error(&self) -> &str {
        self.diagnostic.get()
    }

    pub fn set_last_error(&mut self, message: impl Into<String>) {
        self.diagnostic.set(message);
    }

    /// Forces `to_cbor` to re-derive bytes field-by-field even though a
    /// cache hit would otherwise apply — for callers who changed `T`
    /// through a path this wrapper couldn't observe (e.g. a shared child).
    pub fn clear_cbor_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_is_present(&self) -> bool {
        self.cache.is_present()
    }
}

impl<T: CborEntity> CborEntity for Cached<T> {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let token = r.begin_capture();
        let inner = T::from_cbor(r).map_err(|e| {
            tracing::debug!(error = %e, "failed to decode cached entity");
            e
        })?;
        let raw = r.end_capture(token);
        Ok(Self {
            inner,
            cache: CborCache::captured(raw),
            diagnostic: Diagnostic::new(),
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        if self.cache.try_write(w)? {
            return Ok(());
        }
        self.inner.to_cbor(w)
    }
}

impl<T: PartialEq> PartialEq for Cached<T> {
    /// Structural equality over the wrapped entity only — cache presence
    /// and the diagnostic message aren't part of an entity's identity.
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Eq> Eq for Cached<T> {}

impl<T> std::ops::Deref for Cached<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<const BYTES: usize> CborEntity for chain_crypto::Hash<BYTES> {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let bytes = r.read_bytes()?;
        chain_crypto::Hash::try_from(bytes.as_slice()).map_err(ChainError::from)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_bytes(self.as_ref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_crypto::Hash;

    #[test]
    fn new_has_no_cache_and_clean_diagnostic() {
        let cached = Cached::new(Hash::<28>::new([1u8; 28]));
        assert!(!cached.cache_is_present());
        assert_eq!(cached.last_error(), "");
    }

    #[test]
    fn from_cbor_captures_then_replays_the_original_bytes() {
        let mut w = Writer::new();
        Hash::<28>::new([9u8; 28]).to_cbor(&mut w).unwrap();
        let encoded = w.to_bytes();

        let mut r = Reader::from_bytes(&encoded);
        let cached = Cached::<Hash<28>>::from_cbor(&mut r).unwrap();
        assert!(cached.cache_is_present());

        let mut w2 = Writer::new();
        cached.to_cbor(&mut w2).unwrap();
        assert_eq!(w2.to_bytes(), encoded);
    }

    #[test]
    fn get_mut_invalidates_the_cache() {
        let mut w = Writer::new();
        Hash::<28>::new([2u8; 28]).to_cbor(&mut w).unwrap();
        let encoded = w.to_bytes();

        let mut r = Reader::from_bytes(&encoded);
        let mut cached = Cached::<Hash<28>>::from_cbor(&mut r).unwrap();
        assert!(cached.cache_is_present());

        *cached.get_mut() = Hash::<28>::new([3u8; 28]);
        assert!(!cached.cache_is_present());
    }

    #[test]
    fn equality_ignores_cache_and_diagnostic() {
        let a = Cached::new(Hash::<28>::new([4u8; 28]));
        let mut b = Cached::new(Hash::<28>::new([4u8; 28]));
        b.set_last_error("some failure");
        assert_eq!(a, b);
    }

    #[test]
    fn set_last_error_is_readable_back() {
        let mut cached = Cached::new(Hash::<28>::new([5u8; 28]));
        cached.set_last_error("decode failed: truncated input");
        assert_eq!(cached.last_error(), "decode failed: truncated input");
    }
}
