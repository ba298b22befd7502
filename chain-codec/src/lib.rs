//! Streaming CBOR codec primitives shared across the chain crates.
//!
//! This crate is the wire layer: a peekable [`reader::Reader`], an
//! append-only [`writer::Writer`], the [`bigint::BigInt`] type for
//! integers that outgrow `i64`/`u64`, the [`cache::CborCache`] that lets an
//! entity replay its original bytes, and the [`error::CodecError`]
//! taxonomy all of the above raise. Entity types in `chain-primitives`
//! build `from_cbor`/`to_cbor` on top of these.

pub mod bigint;
pub mod cache;
pub mod error;
pub mod reader;
pub mod writer;

pub use bigint::BigInt;
pub use cache::CborCache;
pub use error::CodecError;
pub use reader::{CaptureToken, DataType, DeclaredLength, LengthExpectation, Reader};
pub use writer::Writer;
