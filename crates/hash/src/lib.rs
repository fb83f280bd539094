//! A minimal crate containing the protocol's [`hash`] function and the
//! canonical CBOR [`serialize`] implementation every signed payload goes
//! through, plus [`address`] derivation.
//!
//! Canonical here means RFC 8949 core deterministic encoding: shortest
//! integer and length forms, definite lengths, and map entries ordered by
//! the length of their encoded key, then bytewise. Two logically equal values
//! always serialize to the same bytes regardless of field declaration order.

#![deny(missing_docs)]
#![deny(unsafe_code)]

use paratime_types::Hash;
use serde::{de::DeserializeOwned, Serialize};
use sha2::Digest;
use thiserror::Error;

pub mod address;
mod address_impl;
mod canonical;

#[doc(inline)]
pub use address::AddressError;
pub use ciborium::Value;

/// Standardized trait for deriving the account address authenticated by a
/// credential.
pub trait DeriveAddress {
    /// Produce the address for self.
    fn address(&self) -> Result<paratime_types::Address, AddressError>;
}

/// Failure to decode canonical CBOR.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input is not well-formed CBOR.
    #[error("malformed CBOR: {0}")]
    Malformed(#[from] ciborium::de::Error<std::io::Error>),
    /// A complete item was followed by more bytes.
    #[error("{0} trailing bytes after CBOR item")]
    TrailingBytes(usize),
    /// The CBOR item does not have the expected shape.
    #[error("unexpected CBOR shape: {0}")]
    Shape(#[from] ciborium::value::Error),
}

/// Convert a serializable value into a canonical [`Value`] tree.
pub fn to_value<T: Serialize + ?Sized>(t: &T) -> Value {
    let value = Value::serialized(t)
        .expect("`ciborium`'s value `Serializer` implementation should never fail");
    canonical::canonicalize(value)
}

/// Serialize data for signing, hashing and transmission.
///
/// This serialization format is standardized across every client
/// implementation. A unit or `None` value serializes to zero bytes.
pub fn serialize<T: Serialize + ?Sized>(t: &T) -> Vec<u8> {
    let value = to_value(t);
    if value.is_null() {
        return Vec::new();
    }
    canonical::encode(&value)
}

/// Deserialize data produced by [`serialize`].
///
/// Zero bytes deserialize as if they were a CBOR `null`, so `Option<T>`
/// yields `None`. Trailing bytes after the first item are rejected.
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    if bytes.is_empty() {
        return from_value(Value::Null);
    }
    let mut reader = bytes;
    let value: Value = ciborium::from_reader(&mut reader)?;
    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes(reader.len()));
    }
    from_value(value)
}

/// Deserialize a typed value from a [`Value`] tree.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    Ok(value.deserialized()?)
}

/// Hash data using SHA-512/256.
///
/// Internally, this first serializes the given type using [`serialize`] then
/// hashes the resulting slice of bytes.
pub fn hash<T: Serialize + ?Sized>(t: &T) -> Hash {
    hash_bytes(&serialize(t))
}

/// Hash a byte slice using SHA-512/256.
pub fn hash_bytes(bytes: &[u8]) -> Hash {
    hash_parts(&[bytes])
}

/// Hash the concatenation of `parts` using SHA-512/256.
pub fn hash_parts(parts: &[&[u8]]) -> Hash {
    let mut hasher = <sha2::Sha512_256 as sha2::Digest>::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Hash a byte slice using Keccak-256.
pub fn keccak256(bytes: &[u8]) -> Hash {
    sha3::Keccak256::digest(bytes).into()
}
