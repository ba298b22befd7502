//! Streaming CBOR reader with peek semantics and byte-range capture.
//!
//! Wraps a [`minicbor::Decoder`] (the wire engine every `pallas-*` sibling
//! crate already relies on) behind the explicit contract the core
//! specifies: a forward cursor with a `peek` that never advances, typed
//! consumers for each CBOR major type, and `begin_capture`/`end_capture`
//! for recording the exact bytes an entity was built from (the foundation
//! of the codec cache in [`crate::cache`]).

use minicbor::data::Type;

use crate::bigint::{self, BigInt};
use crate::error::CodecError;

/// The state `peek` reports without consuming any input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    UnsignedInt,
    NegativeInt,
    ByteString,
    TextString,
    Array,
    Map,
    Tag,
    SimpleValue,
    Float,
    Break,
    EndOfData,
}

/// How a caller expects an array/map length to be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthExpectation {
    Definite,
    Indefinite,
    Either,
}

/// Declared length of an array/map start: `Definite(n)` for a known count,
/// `Indefinite` when the caller must iterate until a `Break`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredLength {
    Definite(u64),
    Indefinite,
}

impl DeclaredLength {
    pub fn as_definite(self) -> Option<u64> {
        match self {
            DeclaredLength::Definite(n) => Some(n),
            DeclaredLength::Indefinite => None,
        }
    }
}

/// An opaque marker returned by [`Reader::begin_capture`] and consumed by
/// [`Reader::end_capture`]. Captures may nest: each token simply remembers
/// the cursor position at the time it was issued.
#[derive(Debug, Clone, Copy)]
pub struct CaptureToken(usize);

pub struct Reader<'b> {
    decoder: minicbor::Decoder<'b>,
    last_error: Option<String>,
}

impl<'b> Reader<'b> {
    pub fn from_bytes(bytes: &'b [u8]) -> Self {
        Self {
            decoder: minicbor::Decoder::new(bytes),
            last_error: None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn fail<T>(&mut self, err: CodecError) -> Result<T, CodecError> {
        tracing::debug!(error = %err, "cbor reader error");
        self.last_error = Some(err.to_string());
        Err(err)
    }

    /// Current byte offset of the cursor, used for byte-range capture.
    pub fn position(&self) -> usize {
        self.decoder.position()
    }

    /// Returns the next token's type without consuming it.
    pub fn peek(&mut self) -> Result<DataType, CodecError> {
        if self.decoder.position() >= self.decoder.input().len() {
            return Ok(DataType::EndOfData);
        }

        let ty = match self.decoder.datatype() {
            Ok(t) => t,
            Err(e) => return self.fail(e.into()),
        };

        Ok(match ty {
            Type::U8 | Type::U16 | Type::U32 | Type::U64 => DataType::UnsignedInt,
            Type::I8 | Type::I16 | Type::I32 | Type::I64 => DataType::NegativeInt,
            Type::Int => {
                let probed: i128 = self
                    .decoder
                    .probe()
                    .int()
                    .map_err(CodecError::from)?
                    .into();
                if probed < 0 {
                    DataType::NegativeInt
                } else {
                    DataType::UnsignedInt
                }
            }
            Type::Bytes | Type::BytesIndef => DataType::ByteString,
            Type::String | Type::StringIndef => DataType::TextString,
            Type::Array | Type::ArrayIndef => DataType::Array,
            Type::Map | Type::MapIndef => DataType::Map,
            Type::Tag => DataType::Tag,
            Type::Bool | Type::Null | Type::Undefined | Type::Simple => DataType::SimpleValue,
            Type::F16 | Type::F32 | Type::F64 => DataType::Float,
            Type::Break => DataType::Break,
            Type::Unknown(_) => return self.fail(CodecError::InvalidCbor),
        })
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        match self.decoder.u64() {
            Ok(v) => Ok(v),
            Err(e) => self.fail(e.into()),
        }
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        match self.decoder.int() {
            Ok(i) => i64::try_from(i).map_err(|_| CodecError::IntegerOverflow),
            Err(e) => self.fail(e.into()),
        }
    }

    pub fn read_bigint(&mut self) -> Result<BigInt, CodecError> {
        match bigint::decode_bigint(&mut self.decoder) {
            Ok(v) => Ok(v),
            Err(e) => self.fail(e),
        }
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        match self.peek()? {
            DataType::ByteString => {}
            other => {
                return self.fail(CodecError::UnexpectedType {
                    expected: "bytes".into(),
                    actual: format!("{other:?}"),
                })
            }
        }

        if self.decoder.datatype().map_err(CodecError::from)? == Type::BytesIndef {
            let mut out = Vec::new();
            let iter = self.decoder.bytes_iter().map_err(CodecError::from)?;
            for chunk in iter {
                out.extend_from_slice(chunk.map_err(CodecError::from)?);
            }
            Ok(out)
        } else {
            match self.decoder.bytes() {
                Ok(b) => Ok(b.to_vec()),
                Err(e) => self.fail(e.into()),
            }
        }
    }

    pub fn read_text(&mut self) -> Result<String, CodecError> {
        if self.decoder.datatype().map_err(CodecError::from)? == Type::StringIndef {
            let mut out = String::new();
            let iter = self.decoder.str_iter().map_err(CodecError::from)?;
            for chunk in iter {
                out.push_str(chunk.map_err(CodecError::from)?);
            }
            Ok(out)
        } else {
            self.decoder
                .str()
                .map(|s| s.to_owned())
                .map_err(CodecError::from)
        }
    }

    pub fn read_tag(&mut self) -> Result<u64, CodecError> {
        match self.decoder.tag() {
            Ok(t) => Ok(t.as_u64()),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Returns the upcoming tag's value without consuming it. Callers that
    /// need to branch on a tag before deciding how to read the tagged value
    /// (e.g. distinguishing a Plutus `Constr` tag from a bignum tag) use
    /// this instead of `read_tag` followed by a rewind, which the
    /// underlying streaming decoder doesn't support.
    pub fn peek_tag(&mut self) -> Result<u64, CodecError> {
        match self.decoder.probe().tag() {
            Ok(t) => Ok(t.as_u64()),
            Err(e) => self.fail(e.into()),
        }
    }

    pub fn read_start_array(
        &mut self,
        expect: LengthExpectation,
    ) -> Result<DeclaredLength, CodecError> {
        let len = self.decoder.array().map_err(CodecError::from)?;
        let declared = match len {
            Some(n) => DeclaredLength::Definite(n),
            None => DeclaredLength::Indefinite,
        };
        self.check_length_expectation(expect, declared)?;
        Ok(declared)
    }

    /// Callers have already consumed exactly the declared elements (definite
    /// case) or the break byte (indefinite case, inside their read loop)
    /// before calling this, so there's nothing left to do.
    pub fn read_end_array(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    pub fn read_start_map(
        &mut self,
        expect: LengthExpectation,
    ) -> Result<DeclaredLength, CodecError> {
        let len = self.decoder.map().map_err(CodecError::from)?;
        let declared = match len {
            Some(n) => DeclaredLength::Definite(n),
            None => DeclaredLength::Indefinite,
        };
        self.check_length_expectation(expect, declared)?;
        Ok(declared)
    }

    pub fn read_end_map(&mut self) -> Result<(), CodecError> {
        Ok(())
    }

    fn check_length_expectation(
        &mut self,
        expect: LengthExpectation,
        declared: DeclaredLength,
    ) -> Result<(), CodecError> {
        match (expect, declared) {
            (LengthExpectation::Either, _) => Ok(()),
            (LengthExpectation::Definite, DeclaredLength::Definite(_)) => Ok(()),
            (LengthExpectation::Indefinite, DeclaredLength::Indefinite) => Ok(()),
            _ => self.fail(CodecError::InvalidArraySize {
                expected: format!("{expect:?}"),
                actual: 0,
            }),
        }
    }

    pub fn at_break(&mut self) -> Result<bool, CodecError> {
        Ok(self.peek()? == DataType::Break)
    }

    pub fn consume_break(&mut self) -> Result<(), CodecError> {
        self.decoder.skip().map_err(CodecError::from)
    }

    pub fn read_simple(&mut self) -> Result<u8, CodecError> {
        self.decoder.simple().map_err(CodecError::from)
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        self.decoder.bool().map_err(CodecError::from)
    }

    pub fn read_null(&mut self) -> Result<(), CodecError> {
        self.decoder.null().map_err(CodecError::from)
    }

    /// Skips exactly one well-formed CBOR value, for callers that need to
    /// ignore a field without decoding its full structure.
    pub fn skip_value(&mut self) -> Result<(), CodecError> {
        self.decoder.skip().map_err(CodecError::from)
    }

    /// Marks the current cursor position as the start of a byte range to
    /// capture. Pair with [`Reader::end_capture`].
    pub fn begin_capture(&mut self) -> CaptureToken {
        CaptureToken(self.decoder.position())
    }

    /// Returns the exact bytes consumed since `token` was issued.
    pub fn end_capture(&self, token: CaptureToken) -> &'b [u8] {
        &self.decoder.input()[token.0..self.decoder.position()]
    }

    /// The full input buffer backing this reader.
    pub fn input(&self) -> &'b [u8] {
        self.decoder.input()
    }
}
