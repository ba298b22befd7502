//! Ordered list and set containers over any entity with a CBOR codec.
//!
//! `Set<T>` is the CIP-129 tagged-set container: it tracks a `use_tag` flag
//! recording (or driving) whether CBOR tag 258 wraps the element array, per
//! `conway/model.rs`'s `NonEmptySet`/`Set` wrapping convention in the
//! teacher, generalized here into an explicit struct since this crate hand-
//! writes codecs rather than deriving them.

use chain_codec::reader::{DeclaredLength, LengthExpectation};
use chain_codec::{DataType, Reader, Writer};

use crate::entity::CborEntity;
use crate::error::ChainError;

const SET_TAG: u64 = 258;

/// A list of entities that preserves insertion order without deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedList<T>(Vec<T>);

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for OrderedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T: CborEntity> CborEntity for OrderedList<T> {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let len = r.read_start_array(LengthExpectation::Either)?;
        let items = read_elements(r, len)?;
        r.read_end_array()?;
        Ok(Self(items))
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(self.0.len() as u64))?;
        for item in &self.0 {
            item.to_cbor(w)?;
        }
        w.write_end_array()?;
        Ok(())
    }
}

/// An insertion-ordered set with duplicate suppression by `T`'s equality
/// and a per-container CIP-129 `use_tag` policy (see spec §4.1/§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set<T> {
    items: Vec<T>,
    use_tag: bool,
}

impl<T: PartialEq> Set<T> {
    /// A newly-constructed set defaults `use_tag` to `true`, per spec §3.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            use_tag: true,
        }
    }

    pub fn use_tag(&self) -> bool {
        self.use_tag
    }

    pub fn set_use_tag(&mut self, value: bool) {
        self.use_tag = value;
    }

    pub fn insert(&mut self, item: T) {
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<T: PartialEq> IntoIterator for Set<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: CborEntity + PartialEq> CborEntity for Set<T> {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let use_tag = if r.peek()? == DataType::Tag {
            let tag = r.read_tag()?;
            if tag != SET_TAG {
                return Err(ChainError::Codec(chain_codec::CodecError::InvalidTag {
                    tag,
                }));
            }
            true
        } else {
            false
        };

        let len = r.read_start_array(LengthExpectation::Either)?;
        let raw = read_elements(r, len)?;
        r.read_end_array()?;

        let mut set = Self {
            items: Vec::new(),
            use_tag,
        };
        for item in raw {
            set.insert(item);
        }
        Ok(set)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        if self.use_tag {
            w.write_tag(SET_TAG)?;
        }
        w.write_start_array(Some(self.items.len() as u64))?;
        for item in &self.items {
            item.to_cbor(w)?;
        }
        w.write_end_array()?;
        Ok(())
    }
}

fn read_elements<T: CborEntity>(
    r: &mut Reader,
    len: DeclaredLength,
) -> Result<Vec<T>, ChainError> {
    match len.as_definite() {
        Some(n) => {
            let mut items = Vec::with_capacity(n as usize);
            for _ in 0..n {
                items.push(T::from_cbor(r)?);
            }
            Ok(items)
        }
        None => {
            let mut items = Vec::new();
            while !r.at_break()? {
                items.push(T::from_cbor(r)?);
            }
            r.consume_break()?;
            Ok(items)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_crypto::Hash;

    impl CborEntity for u64 {
        fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
            Ok(r.read_u64()?)
        }

        fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
            w.write_u64(*self)?;
            Ok(())
        }
    }

    #[test]
    fn set_deduplicates_on_insert() {
        let mut set: Set<u64> = Set::new();
        set.insert(1);
        set.insert(1);
        set.insert(2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn set_round_trips_with_tag() {
        let mut set: Set<u64> = Set::new();
        set.insert(1);
        set.insert(2);
        let mut w = Writer::new();
        set.to_cbor(&mut w).unwrap();
        let bytes = w.to_bytes();
        assert_eq!(bytes[0], 0xd9); // tag 258 prefix (2-byte tag)

        let mut r = Reader::from_bytes(&bytes);
        let decoded: Set<u64> = Set::from_cbor(&mut r).unwrap();
        assert!(decoded.use_tag());
        assert_eq!(decoded.as_slice(), &[1, 2]);
    }

    #[test]
    fn set_round_trips_without_tag() {
        let mut set: Set<u64> = Set::new();
        set.set_use_tag(false);
        set.insert(1);
        let mut w = Writer::new();
        set.to_cbor(&mut w).unwrap();
        let bytes = w.to_bytes();
        assert_eq!(bytes[0] & 0xe0, 0x80); // bare array major type

        let mut r = Reader::from_bytes(&bytes);
        let decoded: Set<u64> = Set::from_cbor(&mut r).unwrap();
        assert!(!decoded.use_tag());
    }

    #[test]
    fn ordered_list_preserves_duplicates_and_order() {
        let list: OrderedList<u64> = vec![3, 1, 3].into_iter().collect();
        assert_eq!(list.as_slice(), &[3, 1, 3]);
    }

    #[test]
    fn hash_entity_round_trips() {
        let hash = Hash::<28>::new([7u8; 28]);
        let mut w = Writer::new();
        hash.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        let decoded = Hash::<28>::from_cbor(&mut r).unwrap();
        assert_eq!(decoded, hash);
    }
}
