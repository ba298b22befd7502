//! Per-entity original-CBOR cache for signature-preserving re-encoding.
//!
//! An entity built by `from_cbor` captures the exact byte range it was
//! decoded from (via [`crate::reader::Reader::begin_capture`]/`end_capture`)
//! into a [`CborCache`]. As long as no mutator runs afterwards, `to_cbor`
//! replays those bytes verbatim with [`crate::writer::Writer::write_raw_bytes`]
//! instead of walking the entity's fields — the mechanism that keeps a
//! decoded-then-re-encoded transaction byte-identical to its input, which
//! in turn keeps hashes and signatures valid.
//!
//! The cache owns a clone of the captured slice rather than borrowing it
//! (see Design Notes in `SPEC_FULL.md`), so cached entities are `'static`
//! and free to outlive the buffer they were parsed from.

use crate::error::CodecError;
use crate::writer::Writer;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CborCache {
    bytes: Option<Vec<u8>>,
}

impl CborCache {
    /// An empty cache, as used by `new`-style constructors that did not
    /// come from a decode.
    pub fn empty() -> Self {
        Self { bytes: None }
    }

    /// Captures `raw` as the cache payload. Called by `from_cbor` with the
    /// slice returned from `Reader::end_capture`.
    pub fn captured(raw: &[u8]) -> Self {
        Self {
            bytes: Some(raw.to_vec()),
        }
    }

    pub fn is_present(&self) -> bool {
        self.bytes.is_some()
    }

    /// Drops the cached bytes. Called by every mutator (setter, insert,
    /// remove, clear) per the cached-bytes invariant, and by
    /// `clear_cbor_cache` for callers forcing re-encoding after an
    /// interior mutation the library couldn't detect on its own.
    pub fn clear(&mut self) {
        self.bytes = None;
    }

    /// If a cache hit is available, replays it onto `writer` and returns
    /// `true`. Returns `false` (writing nothing) on a miss, leaving the
    /// caller to fall back to field-by-field encoding.
    pub fn try_write(&self, writer: &mut Writer) -> Result<bool, CodecError> {
        match &self.bytes {
            Some(raw) => {
                writer.write_raw_bytes(raw)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_misses() {
        let cache = CborCache::empty();
        let mut w = Writer::new();
        assert!(!cache.try_write(&mut w).unwrap());
        assert!(w.to_bytes().is_empty());
    }

    #[test]
    fn captured_cache_replays_bytes() {
        let cache = CborCache::captured(&[0x81, 0x02]);
        let mut w = Writer::new();
        assert!(cache.try_write(&mut w).unwrap());
        assert_eq!(w.to_bytes(), vec![0x81, 0x02]);
    }

    #[test]
    fn clear_forces_a_miss() {
        let mut cache = CborCache::captured(&[0x01]);
        cache.clear();
        let mut w = Writer::new();
        assert!(!cache.try_write(&mut w).unwrap());
    }
}
