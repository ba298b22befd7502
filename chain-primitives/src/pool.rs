//! Stake pool registration parameters: the operator-facing bundle attached
//! to a `PoolRegistration` certificate.
//!
//! Grounded in `alonzo/model.rs::Certificate::PoolRegistration`'s field list
//! and `alonzo/model.rs::Relay`'s hand-written array-tag encoding, plus
//! `original_source/lib/include/cardano/pool_params/pool_metadata.h` for the
//! metadata URL length boundary (the on-chain CDDL bounds pool metadata URLs
//! to 64 characters).

use chain_codec::reader::LengthExpectation;
use chain_codec::{DataType, Reader, Writer};
use chain_crypto::Hash;

use crate::entity::CborEntity;
use crate::error::ChainError;
use crate::numeric::UnitInterval;

/// Maximum byte length of a pool metadata URL, per the Shelley CDDL's
/// `url .size (0..64)`.
pub const POOL_METADATA_URL_MAX_LEN: usize = 64;

/// A network address a stake pool's relay node can be reached at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relay {
    SingleHostAddr {
        port: Option<u32>,
        ipv4: Option<[u8; 4]>,
        ipv6: Option<[u8; 16]>,
    },
    SingleHostName {
        port: Option<u32>,
        dns_name: String,
    },
    MultiHostName {
        dns_name: String,
    },
}

impl CborEntity for Relay {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Either)?;
        let variant = r.read_u64()?;
        let value = match variant {
            0 => {
                let port = read_optional_u32(r)?;
                let ipv4 = read_optional_fixed::<4>(r)?;
                let ipv6 = read_optional_fixed::<16>(r)?;
                Relay::SingleHostAddr { port, ipv4, ipv6 }
            }
            1 => {
                let port = read_optional_u32(r)?;
                let dns_name = r.read_text()?;
                Relay::SingleHostName { port, dns_name }
            }
            2 => Relay::MultiHostName {
                dns_name: r.read_text()?,
            },
            other => {
                return Err(ChainError::InvalidArgument(format!(
                    "unknown relay variant {other}"
                )))
            }
        };
        r.read_end_array()?;
        Ok(value)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        match self {
            Relay::SingleHostAddr { port, ipv4, ipv6 } => {
                w.write_start_array(Some(4))?;
                w.write_u64(0)?;
                write_optional_u32(*port, w)?;
                write_optional_fixed(ipv4.as_ref(), w)?;
                write_optional_fixed(ipv6.as_ref(), w)?;
            }
            Relay::SingleHostName { port, dns_name } => {
                w.write_start_array(Some(3))?;
                w.write_u64(1)?;
                write_optional_u32(*port, w)?;
                w.write_text(dns_name)?;
            }
            Relay::MultiHostName { dns_name } => {
                w.write_start_array(Some(2))?;
                w.write_u64(2)?;
                w.write_text(dns_name)?;
            }
        }
        w.write_end_array()?;
        Ok(())
    }
}

fn read_optional_u32(r: &mut Reader) -> Result<Option<u32>, ChainError> {
    match r.peek()? {
        DataType::SimpleValue => {
            r.read_null()?;
            Ok(None)
        }
        _ => Ok(Some(r.read_u64()? as u32)),
    }
}

fn write_optional_u32(value: Option<u32>, w: &mut Writer) -> Result<(), ChainError> {
    match value {
        Some(v) => w.write_u64(v as u64)?,
        None => w.write_null()?,
    };
    Ok(())
}

fn read_optional_fixed<const N: usize>(r: &mut Reader) -> Result<Option<[u8; N]>, ChainError> {
    match r.peek()? {
        DataType::SimpleValue => {
            r.read_null()?;
            Ok(None)
        }
        _ => {
            let bytes = r.read_bytes()?;
            let array: [u8; N] = bytes.as_slice().try_into().map_err(|_| {
                ChainError::InvalidArgument(format!("expected {N}-byte address"))
            })?;
            Ok(Some(array))
        }
    }
}

fn write_optional_fixed<const N: usize>(
    value: Option<&[u8; N]>,
    w: &mut Writer,
) -> Result<(), ChainError> {
    match value {
        Some(bytes) => w.write_bytes(bytes)?,
        None => w.write_null()?,
    };
    Ok(())
}

/// A pool's off-chain metadata pointer: a URL (at most 64 bytes) plus the
/// hash of the document it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetadata {
    pub url: String,
    pub hash: Hash<32>,
}

impl PoolMetadata {
    pub fn new(url: String, hash: Hash<32>) -> Result<Self, ChainError> {
        if url.len() > POOL_METADATA_URL_MAX_LEN {
            return Err(ChainError::InvalidArgument(format!(
                "pool metadata url exceeds {POOL_METADATA_URL_MAX_LEN} bytes"
            )));
        }
        Ok(Self { url, hash })
    }
}

impl CborEntity for PoolMetadata {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        r.read_start_array(LengthExpectation::Definite)?;
        let url = r.read_text()?;
        let hash = Hash::<32>::from_cbor(r)?;
        r.read_end_array()?;
        PoolMetadata::new(url, hash)
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        w.write_start_array(Some(2))?;
        w.write_text(&self.url)?;
        self.hash.to_cbor(w)?;
        w.write_end_array()?;
        Ok(())
    }
}

/// The full parameter bundle carried by a pool registration certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub operator: Hash<28>,
    pub vrf_keyhash: Hash<32>,
    pub pledge: u64,
    pub cost: u64,
    pub margin: UnitInterval,
    pub reward_account: Vec<u8>,
    pub pool_owners: Vec<Hash<28>>,
    pub relays: Vec<Relay>,
    pub pool_metadata: Option<PoolMetadata>,
}

impl CborEntity for PoolParams {
    fn from_cbor(r: &mut Reader) -> Result<Self, ChainError> {
        let operator = Hash::<28>::from_cbor(r)?;
        let vrf_keyhash = Hash::<32>::from_cbor(r)?;
        let pledge = r.read_u64()?;
        let cost = r.read_u64()?;
        let margin = UnitInterval::from_cbor(r)?;
        let reward_account = r.read_bytes()?;
        let pool_owners = read_owner_list(r)?;
        let relays = read_relay_list(r)?;
        let pool_metadata = match r.peek()? {
            DataType::SimpleValue => {
                r.read_null()?;
                None
            }
            _ => Some(PoolMetadata::from_cbor(r)?),
        };
        Ok(Self {
            operator,
            vrf_keyhash,
            pledge,
            cost,
            margin,
            reward_account,
            pool_owners,
            relays,
            pool_metadata,
        })
    }

    fn to_cbor(&self, w: &mut Writer) -> Result<(), ChainError> {
        self.operator.to_cbor(w)?;
        self.vrf_keyhash.to_cbor(w)?;
        w.write_u64(self.pledge)?;
        w.write_u64(self.cost)?;
        self.margin.to_cbor(w)?;
        w.write_bytes(&self.reward_account)?;
        w.write_start_array(Some(self.pool_owners.len() as u64))?;
        for owner in &self.pool_owners {
            owner.to_cbor(w)?;
        }
        w.write_end_array()?;
        w.write_start_array(Some(self.relays.len() as u64))?;
        for relay in &self.relays {
            relay.to_cbor(w)?;
        }
        w.write_end_array()?;
        match &self.pool_metadata {
            Some(metadata) => metadata.to_cbor(w)?,
            None => w.write_null()?,
        }
        Ok(())
    }
}

fn read_owner_list(r: &mut Reader) -> Result<Vec<Hash<28>>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut owners = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                owners.push(Hash::<28>::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                owners.push(Hash::<28>::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(owners)
}

fn read_relay_list(r: &mut Reader) -> Result<Vec<Relay>, ChainError> {
    let len = r.read_start_array(LengthExpectation::Either)?;
    let mut relays = Vec::new();
    match len.as_definite() {
        Some(n) => {
            for _ in 0..n {
                relays.push(Relay::from_cbor(r)?);
            }
        }
        None => {
            while !r.at_break()? {
                relays.push(Relay::from_cbor(r)?);
            }
            r.consume_break()?;
        }
    }
    r.read_end_array()?;
    Ok(relays)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_metadata_rejects_oversized_url() {
        let url = "x".repeat(65);
        let result = PoolMetadata::new(url, Hash::new([0u8; 32]));
        assert!(result.is_err());
    }

    #[test]
    fn relay_variants_round_trip() {
        let variants = vec![
            Relay::SingleHostAddr {
                port: Some(3001),
                ipv4: Some([127, 0, 0, 1]),
                ipv6: None,
            },
            Relay::SingleHostName {
                port: None,
                dns_name: "relay.example".into(),
            },
            Relay::MultiHostName {
                dns_name: "pool.example".into(),
            },
        ];
        for relay in variants {
            let mut w = Writer::new();
            relay.to_cbor(&mut w).unwrap();
            let mut r = Reader::from_bytes(&w.to_bytes());
            assert_eq!(Relay::from_cbor(&mut r).unwrap(), relay);
        }
    }

    #[test]
    fn pool_params_round_trip_with_metadata() {
        let params = PoolParams {
            operator: Hash::new([1u8; 28]),
            vrf_keyhash: Hash::new([2u8; 32]),
            pledge: 1_000_000_000,
            cost: 340_000_000,
            margin: UnitInterval::new(3, 100).unwrap(),
            reward_account: vec![0xe1, 0x01, 0x02],
            pool_owners: vec![Hash::new([3u8; 28])],
            relays: vec![Relay::MultiHostName {
                dns_name: "pool.example".into(),
            }],
            pool_metadata: Some(
                PoolMetadata::new("https://pool.example/metadata.json".into(), Hash::new([4u8; 32]))
                    .unwrap(),
            ),
        };
        let mut w = Writer::new();
        params.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(PoolParams::from_cbor(&mut r).unwrap(), params);
    }

    #[test]
    fn pool_params_round_trip_without_metadata() {
        let params = PoolParams {
            operator: Hash::new([1u8; 28]),
            vrf_keyhash: Hash::new([2u8; 32]),
            pledge: 0,
            cost: 0,
            margin: UnitInterval::new(0, 1).unwrap(),
            reward_account: vec![],
            pool_owners: vec![],
            relays: vec![],
            pool_metadata: None,
        };
        let mut w = Writer::new();
        params.to_cbor(&mut w).unwrap();
        let mut r = Reader::from_bytes(&w.to_bytes());
        assert_eq!(PoolParams::from_cbor(&mut r).unwrap(), params);
    }
}
