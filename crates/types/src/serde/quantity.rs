//! Arbitrary precision unsigned quantities encoded as minimal big-endian byte strings.
//!
//! Zero is the empty byte string. Leading zero bytes are rejected on decode so
//! every quantity has exactly one encoding.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serializer};

/// Minimal big-endian bytes of `q`. Zero maps to an empty vector.
pub fn to_bytes(q: &BigUint) -> Vec<u8> {
    if q.bits() == 0 {
        return Vec::new();
    }
    q.to_bytes_be()
}

/// Parse minimal big-endian bytes. Returns `None` for non-canonical input.
pub fn from_bytes(bytes: &[u8]) -> Option<BigUint> {
    if bytes.first() == Some(&0) {
        return None;
    }
    Some(BigUint::from_bytes_be(bytes))
}

/// Serialize a quantity.
pub fn serialize<S>(q: &BigUint, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_bytes(&to_bytes(q))
}

/// Deserialize a quantity.
pub fn deserialize<'de, D>(d: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    let bytes = serde_bytes::ByteBuf::deserialize(d)?;
    from_bytes(&bytes).ok_or_else(|| serde::de::Error::custom("quantity has leading zero bytes"))
}
