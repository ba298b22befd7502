//! Plutus data: the recursive on-chain value Plutus scripts consume.
//!
//! Grounded in `plutus_data_ref.rs`'s hand-written `Decode`/`Encode` for
//! `Constr`/`BigInt`/`BoundedBytes`, collapsed here to this crate's own
//! shapes: a single [`chain_codec::BigInt`] (no `Int`/`BigUInt`/`BigNInt`
//! split — the codec layer already unifies that) and a `Vec<u8>` byte
//! string chunked through [`chain_codec::Writer::write_chunked_bytes`].

use chain_codec::reader::LengthExpectation;
use chain_codec::{BigInt, DataType, Reader, Writer};

use crate::entity::CborEntity;
use crate::error::ChainError;

const CONSTR_TAG_SMALL_START: u64 = 121;
const CONSTR_TAG_SMALL_END: u64 = 127;
const CONSTR_TAG_WIDE_START: u64 = 1280;
const CONSTR_TAG_WIDE_END: u64 = 1400;
const CONSTR_TAG_WRAPPED: u64 = 102;

/// `Constr(tag, fields)`: the Alternative-indexed sum Plutus uses for ADT
/// values. `tag` is the logical Plutus constructor index (not the raw CBOR
/// tag byte — that's recomputed from `tag` on encode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constr {
    pub tag: u64,
    pub fields: Vec<PlutusData>,
}

/// The recursive Plutus data value.
///
/// `Map` never deduplicates or reorders keys: it faithfully preserves
/// on-chain maps that may carry duplicate keys, per spec. `List` preserves
/// order and is encoded as a definite 0-length array when empty, an
/// indefinite array otherwise, matching the Haskell `cborg`/Plutus reference
/// convention `plutus_data_ref.rs::encode_list` follows.
#[derive(Debug, Clone, PartialEq)]
pub enum PlutusData {
    Constr(Constr),
    Map(Vec<(PlutusData, PlutusData)>),
    Integer(BigInt),
    ByteString(Vec<u8>),
    List(Vec<PlutusData>),
}

impl CborEntity for PlutusData {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        match r.peek()? {
            DataType::Tag => {
                let tag = r.peek_tag()?;
                if is_bignum_tag(tag) {
                    Ok(PlutusData::Integer(r.read_bigint()?))
                } else {
                    Ok(PlutusData::Constr(read_constr(r, tag)?))
                }
            }
            DataType::UnsignedInt | DataType::NegativeInt => {
                Ok(PlutusData::Integer(r.read_bigint()?))
            }
            DataType::Map => Ok(PlutusData::Map(read_map(r)?)),
            DataType::ByteString => Ok(PlutusData::ByteString(r.read_bytes()?)),
            DataType::Array => Ok(PlutusData::List(read_list(r)?)),
            other => Err(ChainError::InvalidArgument(format!(
                "unsupported cbor type {other:?} for plutus data"
            ))),
        }
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            PlutusData::Constr(c) => write_constr(c, w),
            PlutusData::Map(pairs) => {
                w.write_start_map(Some(pairs.len() as u64))?;
                for (k, v) in pairs {
                    k.to_cbor(w)?;
                    v.to_cbor(w)?;
                }
                w.write_end_map()?;
                Ok(())
            }
            PlutusData::Integer(v) => {
                w.write_bigint(v)?;
                Ok(())
            }
            PlutusData::ByteString(bytes) => {
                w.write_chunked_bytes(bytes)?;
                Ok(())
            }
            PlutusData::List(items) => write_list(items, w),
        }
    }
}

fn is_bignum_tag(tag: u64) -> bool {
    tag == 2 || tag == 3
}

/// `peeked_tag` is the raw CBOR tag already observed via `peek_tag`;
/// consumes it for real via `read_tag` and decodes the constructor index
/// and fields that follow.
fn read_constr(r: &mut Reader, peeked_tag: u64) -> Result<Constr, ChainError> {
    let raw_tag = r.read_tag()?;
    debug_assert_eq!(raw_tag, peeked_tag);

    match raw_tag {
        CONSTR_TAG_SMALL_START..=CONSTR_TAG_SMALL_END => Ok(Constr {
            tag: raw_tag - CONSTR_TAG_SMALL_START,
            fields: read_list(r)?,
        }),
        CONSTR_TAG_WIDE_START..=CONSTR_TAG_WIDE_END => Ok(Constr {
            tag: raw_tag - CONSTR_TAG_WIDE_START + 7,
            fields: read_list(r)?,
        }),
        CONSTR_TAG_WRAPPED => {
            r.read_start_array(LengthExpectation::Definite)?;
            let constructor_id = r.read_u64()?;
            let fields = read_list(r)?;
            r.read_end_array()?;
            Ok(Constr {
                tag: constructor_id,
                fields,
            })
        }
        other => Err(ChainError::InvalidArgument(format!(
            "unrecognized plutus constr tag {other}"
        ))),
    }
}

fn read_map(r: &mut Reader) -> Result<Vec<(PlutusData, PlutusData)>, ChainError> {
    let len = r.read_start_map(LengthExpectation::Either)?;
    let mut pairs = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                let k = PlutusData::from_cbor(r)?;
                let v = PlutusData::from_cbor(r)?;
                pairs.push((k, v));
            }
        }
        None => {
            while !r.at_break()? {
                let k = PlutusData::from_cbor(r)?;
                let v = PlutusData::from_cbor(r)?;
                pairs.push((k, v));
            }
            r.consume_break()?;
        }
    }
    r.read_end_map()?;
    Ok(pairs)
}

fn read_list(r: &mut Reader) -> Result<Vec<PlutusData>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut items = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                items.push(PlutusData::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                items.push(PlutusData::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(items)
}

fn write_list(items: &[PlutusData], w: &mut Writer) -> Result<(), ChainError> {
    if items.is_empty() {
        w.write_start_array(Some(0))?;
        w.write_end_array()?;
    } else {
        w.write_start_array(None)?;
        for item in items {
            item.to_cbor(w)?;
        }
        w.write_end_array()?;
    }
    Ok(())
}

fn write_constr(c: &Constr, w: &mut Writer) -> Result<(), ChainError> {
    if c.tag < 7 {
        w.write_tag(CONSTR_TAG_SMALL_START + c.tag)?;
        write_list(&c.fields, w)?;
    } else if c.tag < 128 {
        w.write_tag(CONSTR_TAG_WIDE_START + (c.tag - 7))?;
        write_list(&c.fields, w)?;
    } else {
        w.write_tag(CONSTR_TAG_WRAPPED)?;
        w.write_start_array(Some(2))?;
        w.write_u64(c.tag)?;
        write_list(&c.fields, w)?;
        w.write_end_array()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &PlutusData) -> PlutusData {
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        PlutusData::from_cbor(&mut r).unwrap()
    }

    #[test]
    fn indefinite_list_round_trips_from_scenario_c() {
        let bytes = hex::decode("9f0102ff").unwrap();
        let mut r = Reader::from_bytes(&bytes);
        let decoded = PlutusData::from_cbor(&mut r).unwrap();
        assert_eq!(
            decoded,
            PlutusData::List(vec![
                PlutusData::Integer(BigInt::from_i64(1)),
                PlutusData::Integer(BigInt::from_i64(2)),
            ])
        );

        let mut w = Writer::new();
        decoded.to_cbor(&mut w).unwrap();
        assert_eq!(w.to_bytes(), bytes);
    }

    #[test]
    fn empty_list_encodes_as_definite_zero_length() {
        let value = PlutusData::List(vec![]);
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        assert_eq!(w.to_bytes(), vec![0x80]);
    }

    #[test]
    fn small_constr_round_trips() {
        let value = PlutusData::Constr(Constr {
            tag: 0,
            fields: vec![PlutusData::Integer(BigInt::from_i64(42))],
        });
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn wide_constr_round_trips() {
        let value = PlutusData::Constr(Constr {
            tag: 50,
            fields: vec![],
        });
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let bytes = w.to_bytes();
        // tag 1280 + (50 - 7) = 1323 -> two-byte tag prefix 0xd9
        assert_eq!(bytes[0], 0xd9);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn wrapped_constr_round_trips_beyond_127() {
        let value = PlutusData::Constr(Constr {
            tag: 200,
            fields: vec![PlutusData::ByteString(vec![1, 2, 3])],
        });
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let bytes = w.to_bytes();
        assert_eq!(bytes[0], 0xd8); // single-byte-extended tag prefix
        assert_eq!(bytes[1], CONSTR_TAG_WRAPPED as u8);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn map_preserves_duplicate_keys_and_order() {
        let key = PlutusData::Integer(BigInt::from_i64(1));
        let value = PlutusData::Map(vec![
            (key.clone(), PlutusData::Integer(BigInt::from_i64(10))),
            (key, PlutusData::Integer(BigInt::from_i64(20))),
        ]);
        let decoded = round_trip(&value);
        match decoded {
            PlutusData::Map(pairs) => assert_eq!(pairs.len(), 2),
            other => panic!("expected map, got {other:?}"),
        }
        assert_eq!(decoded, value);
    }

    #[test]
    fn byte_string_over_64_bytes_chunks_indefinite() {
        let value = PlutusData::ByteString(vec![7u8; 100]);
        let mut w = Writer::new();
        value.to_cbor(&mut w).unwrap();
        let bytes = w.to_bytes();
        assert_eq!(bytes[0], 0x5f); // indefinite byte string marker
        assert_eq!(round_trip(&value), value);
    }
}

#[cfg(test)]
mod proptests {
    use super::tests::round_trip;
    use super::*;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = PlutusData> {
        prop_oneof![
            any::<i64>().prop_map(|n| PlutusData::Integer(chain_codec::BigInt::from_i64(n))),
            prop::collection::vec(any::<u8>(), 0..128).prop_map(PlutusData::ByteString),
        ]
    }

    proptest! {
        #[test]
        fn integers_and_bytestrings_round_trip(value in leaf()) {
            prop_assert_eq!(round_trip(&value), value);
        }

        #[test]
        fn lists_of_leaves_round_trip(items in prop::collection::vec(leaf(), 0..8)) {
            let value = PlutusData::List(items);
            prop_assert_eq!(round_trip(&value), value);
        }

        #[test]
        fn constr_round_trips_for_any_tag_and_fields(
            tag: u64,
            fields in prop::collection::vec(leaf(), 0..4),
        ) {
            let value = PlutusData::Constr(Constr { tag, fields });
            prop_assert_eq!(round_trip(&value), value);
        }
    }
}
