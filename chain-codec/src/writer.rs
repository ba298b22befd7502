//! Append-only CBOR writer.
//!
//! Wraps a [`minicbor::Encoder<Vec<u8>>`]; every emitter writes the
//! shortest-form encoding minicbor already produces by default, which
//! matches Cardano's deterministic-CBOR requirement (shortest-form
//! integers, definite-length strings). `write_raw_bytes` is the escape
//! hatch the codec cache (`crate::cache`) uses to replay an entity's
//! original bytes verbatim instead of re-deriving them field by field.

use crate::error::CodecError;

pub struct Writer {
    encoder: minicbor::Encoder<Vec<u8>>,
    /// One entry per currently open array/map, `true` when it was opened
    /// indefinite-length and still needs a break byte on close.
    open_indefinite: Vec<bool>,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Self {
            encoder: minicbor::Encoder::new(Vec::new()),
            open_indefinite: Vec::new(),
        }
    }

    pub fn write_u64(&mut self, value: u64) -> Result<&mut Self, CodecError> {
        self.encoder.u64(value)?;
        Ok(self)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<&mut Self, CodecError> {
        self.encoder.i64(value)?;
        Ok(self)
    }

    pub fn write_bigint(&mut self, value: &crate::bigint::BigInt) -> Result<&mut Self, CodecError> {
        crate::bigint::encode_bigint(value, &mut self.encoder)?;
        Ok(self)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CodecError> {
        self.encoder.bytes(bytes)?;
        Ok(self)
    }

    /// Writes a byte string longer than 64 bytes as an indefinite-length
    /// byte string chunked into ≤64-byte pieces, the node's convention for
    /// `PlutusData::ByteString`. Shorter inputs use the plain definite form.
    pub fn write_chunked_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CodecError> {
        const CHUNK_SIZE: usize = 64;
        if bytes.len() <= CHUNK_SIZE {
            self.encoder.bytes(bytes)?;
        } else {
            self.encoder.begin_bytes()?;
            for chunk in bytes.chunks(CHUNK_SIZE) {
                self.encoder.bytes(chunk)?;
            }
            self.encoder.end()?;
        }
        Ok(self)
    }

    pub fn write_text(&mut self, text: &str) -> Result<&mut Self, CodecError> {
        self.encoder.str(text)?;
        Ok(self)
    }

    pub fn write_tag(&mut self, tag: u64) -> Result<&mut Self, CodecError> {
        self.encoder.tag(minicbor::data::Tag::new(tag))?;
        Ok(self)
    }

    pub fn write_start_array(&mut self, len: Option<u64>) -> Result<&mut Self, CodecError> {
        match len {
            Some(n) => {
                self.encoder.array(n)?;
                self.open_indefinite.push(false);
            }
            None => {
                self.encoder.begin_array()?;
                self.open_indefinite.push(true);
            }
        }
        Ok(self)
    }

    /// Closes the most recently opened array. A no-op for a definite-length
    /// array, which needs no break byte; emits the CBOR break (`0xFF`) only
    /// when the matching start was indefinite.
    pub fn write_end_array(&mut self) -> Result<&mut Self, CodecError> {
        if self.open_indefinite.pop().unwrap_or(false) {
            self.encoder.end()?;
        }
        Ok(self)
    }

    pub fn write_start_map(&mut self, len: Option<u64>) -> Result<&mut Self, CodecError> {
        match len {
            Some(n) => {
                self.encoder.map(n)?;
                self.open_indefinite.push(false);
            }
            None => {
                self.encoder.begin_map()?;
                self.open_indefinite.push(true);
            }
        }
        Ok(self)
    }

    /// Closes the most recently opened map. A no-op for a definite-length
    /// map; emits the CBOR break only when the matching start was
    /// indefinite.
    pub fn write_end_map(&mut self) -> Result<&mut Self, CodecError> {
        if self.open_indefinite.pop().unwrap_or(false) {
            self.encoder.end()?;
        }
        Ok(self)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<&mut Self, CodecError> {
        self.encoder.bool(value)?;
        Ok(self)
    }

    pub fn write_null(&mut self) -> Result<&mut Self, CodecError> {
        self.encoder.null()?;
        Ok(self)
    }

    /// Appends `bytes` verbatim with no structural accounting. Used to
    /// replay a cached original encoding so re-serialized entities preserve
    /// the exact byte sequence a signature or hash was computed over.
    pub fn write_raw_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CodecError> {
        use minicbor::encode::Write as _;
        self.encoder
            .writer_mut()
            .write_all(bytes)
            .map_err(|_| CodecError::InvalidCbor)?;
        Ok(self)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encoder.writer().clone()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}
