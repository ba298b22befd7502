//! Arbitrary-precision integers for coin/asset quantities.
//!
//! Cardano's CBOR dialect represents integers outside the `u64`/`i64` range
//! as a CBOR bignum: tag 2 (`#6.2`) wraps a big-endian byte string for a
//! non-negative value, tag 3 (`#6.3`) the same for a negative value encoded
//! as `-1 - n`. Everything that fits in an `i64`/`u64` uses the shortest
//! plain-integer encoding instead. This mirrors the `BigInt` enum the
//! teacher uses for `PlutusData::BigInt` (`pallas-primitives::plutus_data`),
//! generalized here into a single arbitrary-precision value backed by
//! `num-bigint` so callers don't have to match on the wire representation.

use minicbor::data::{IanaTag, Type};
use num_bigint::{BigInt as NumBigInt, Sign};
use std::fmt;

use crate::error::CodecError;

/// An arbitrary-precision signed integer, as used for lovelace/asset
/// quantities that may exceed 64 bits on the wire.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigInt(NumBigInt);

impl BigInt {
    pub fn from_i64(value: i64) -> Self {
        Self(NumBigInt::from(value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(NumBigInt::from(value))
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    pub fn to_i64(&self) -> Option<i64> {
        use num_bigint::ToBigInt;
        let max = i64::MAX.to_bigint().unwrap();
        let min = i64::MIN.to_bigint().unwrap();
        if self.0 > max || self.0 < min {
            None
        } else {
            let (_, digits) = self.0.to_u64_digits();
            let magnitude = digits.first().copied().unwrap_or(0);
            Some(if self.is_negative() {
                -(magnitude as i64)
            } else {
                magnitude as i64
            })
        }
    }

    pub fn to_bytes_be_magnitude(&self) -> Vec<u8> {
        self.0.to_bytes_be().1
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({})", self.0)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl std::str::FromStr for BigInt {
    type Err = CodecError;

    /// Parses a decimal integer literal, as produced by `serde_json`'s
    /// `arbitrary_precision` number representation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NumBigInt>().map(BigInt).map_err(|_| CodecError::DecodingFailed {
            inner: format!("invalid integer literal {s:?}"),
        })
    }
}

/// Reads a big_int value (`int / big_uint / big_nint`) from the decoder at
/// the current position, producing the error taxonomy this crate surfaces
/// rather than a raw minicbor error.
pub(crate) fn decode_bigint(d: &mut minicbor::Decoder<'_>) -> Result<BigInt, CodecError> {
    match d.datatype()? {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => {
            let v = d.u64()?;
            Ok(BigInt(NumBigInt::from(v)))
        }
        Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::Int => {
            let v: i128 = d.int()?.into();
            Ok(BigInt(NumBigInt::from(v)))
        }
        Type::Tag => {
            let tag = d.tag()?;
            if tag == IanaTag::PosBignum.tag() {
                let bytes = d.bytes()?;
                Ok(BigInt(NumBigInt::from_bytes_be(Sign::Plus, bytes)))
            } else if tag == IanaTag::NegBignum.tag() {
                let bytes = d.bytes()?;
                let magnitude = NumBigInt::from_bytes_be(Sign::Plus, bytes);
                Ok(BigInt(-(magnitude + NumBigInt::from(1u8))))
            } else {
                Err(CodecError::InvalidTag { tag: tag.as_u64() })
            }
        }
        other => Err(CodecError::UnexpectedType {
            expected: "integer or bignum tag".into(),
            actual: format!("{other:?}"),
        }),
    }
}

/// Writes a big_int value using the shortest applicable wire form: plain
/// integer when it fits in `i64`/`u64`, tag 2/3 bignum otherwise.
pub(crate) fn encode_bigint<W: minicbor::encode::Write>(
    value: &BigInt,
    e: &mut minicbor::Encoder<W>,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    if let Some(small) = value.to_i64() {
        e.i64(small)?;
        return Ok(());
    }

    if value.is_negative() {
        let magnitude = (-&value.0) - NumBigInt::from(1u8);
        e.tag(IanaTag::NegBignum)?;
        e.bytes(&magnitude.to_bytes_be().1)?;
    } else {
        e.tag(IanaTag::PosBignum)?;
        e.bytes(&value.0.to_bytes_be().1)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_round_trip_as_plain_int() {
        let v = BigInt::from_i64(-42);
        assert_eq!(v.to_i64(), Some(-42));
        assert!(v.is_negative());
    }

    #[test]
    fn decimal_literal_parses_values_beyond_i64() {
        let parsed: BigInt = "999999999999999999999999999999".parse().unwrap();
        assert_eq!(parsed.to_i64(), None);
        assert_eq!(parsed.to_string(), "999999999999999999999999999999");

        let negative: BigInt = "-5".parse().unwrap();
        assert_eq!(negative, BigInt::from_i64(-5));
    }

    #[test]
    fn decimal_literal_rejects_garbage() {
        assert!("not a number".parse::<BigInt>().is_err());
    }

    #[test]
    fn large_positive_round_trips_through_bignum() {
        let mut buf = Vec::new();
        let big = BigInt(NumBigInt::from(u64::MAX) * NumBigInt::from(4u8));
        {
            let mut e = minicbor::Encoder::new(&mut buf);
            encode_bigint(&big, &mut e).unwrap();
        }
        let mut d = minicbor::Decoder::new(&buf);
        let decoded = decode_bigint(&mut d).unwrap();
        assert_eq!(decoded, big);
        assert_eq!(buf[0], 0xc2); // tag 2, positive bignum
    }

    #[test]
    fn large_negative_round_trips_through_bignum() {
        let mut buf = Vec::new();
        let big = BigInt(-(NumBigInt::from(u64::MAX) * NumBigInt::from(4u8)));
        {
            let mut e = minicbor::Encoder::new(&mut buf);
            encode_bigint(&big, &mut e).unwrap();
        }
        let mut d = minicbor::Decoder::new(&buf);
        let decoded = decode_bigint(&mut d).unwrap();
        assert_eq!(decoded, big);
        assert_eq!(buf[0], 0xc3); // tag 3, negative bignum
    }
}

#[cfg(test)]
mod proptests {
    use crate::reader::Reader;
    use crate::writer::Writer;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_i64_round_trips_through_the_wire_form(value: i64) {
            let big = super::BigInt::from_i64(value);
            let mut w = Writer::new();
            w.write_bigint(&big).unwrap();
            let mut r = Reader::from_bytes(&w.to_bytes());
            prop_assert_eq!(r.read_bigint().unwrap(), big);
        }

        #[test]
        fn arbitrary_decimal_literals_round_trip_through_bignum(
            digits in "[1-9][0-9]{20,40}"
        ) {
            let big: super::BigInt = digits.parse().unwrap();
            let mut w = Writer::new();
            w.write_bigint(&big).unwrap();
            let mut r = Reader::from_bytes(&w.to_bytes());
            prop_assert_eq!(r.read_bigint().unwrap(), big);
        }
    }
}
