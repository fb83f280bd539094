//! Custom fixed-size byte array serialization to better support human-readable formats.
//!
//! Binary formats (CBOR) receive a byte string, never an array of integers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialize a fixed-size byte array (public keys, nonces, hashes).
pub fn serialize<const N: usize, S>(bytes: &[u8; N], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if s.is_human_readable() {
        let string = hex::encode(bytes);
        string.serialize(s)
    } else {
        s.serialize_bytes(&bytes[..])
    }
}

/// Deserialize a fixed-size byte array (public keys, nonces, hashes).
pub fn deserialize<'de, const N: usize, D>(d: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let bytes: Vec<u8> = if d.is_human_readable() {
        let string = String::deserialize(d)?;
        hex::decode(string).map_err(serde::de::Error::custom)?
    } else {
        serde_bytes::ByteBuf::deserialize(d)?.into_vec()
    };
    let len = bytes.len();
    bytes.try_into().map_err(|_err| {
        let msg = format!("failed to convert `Vec<u8>` with length {len} to `[u8; {N}]`");
        serde::de::Error::custom(msg)
    })
}
