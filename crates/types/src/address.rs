//! Account addresses and their bech32 text form.
//!
//! An address is a one byte version followed by a truncated hash of the
//! authentication credential. See `paratime_hash::address` for derivation.

use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Size of an address in bytes, including the version byte.
pub const ADDRESS_SIZE: usize = 21;

/// Size of the version prefix of an address in bytes.
pub const ADDRESS_VERSION_SIZE: usize = 1;

/// Human readable part used in the bech32 text form.
pub const ADDRESS_BECH32_HRP: &str = "oasis";

/// Size of an Ethereum-style address in bytes.
pub const ETH_ADDRESS_SIZE: usize = 20;

/// An account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

/// The address of a transaction caller, used when estimating gas for a
/// caller other than the transaction's first signer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallerAddress {
    /// A native address.
    #[serde(rename = "address")]
    Address(Address),
    /// An Ethereum-style address.
    #[serde(rename = "eth_address")]
    EthAddress(#[serde(with = "crate::serde::bytes")] [u8; ETH_ADDRESS_SIZE]),
}

/// Failure to parse an address from text or bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAddressError {
    /// The bech32 string itself was malformed.
    #[error("malformed bech32: {0}")]
    Bech32(#[from] bech32::Error),
    /// The human readable part differs from the expected prefix.
    #[error("unexpected address prefix `{found}`, expected `oasis`")]
    Prefix {
        /// The prefix found in the input.
        found: String,
    },
    /// The string used the bech32m checksum variant.
    #[error("unexpected bech32m checksum variant")]
    Variant,
    /// The decoded payload has the wrong length.
    #[error("address must be 21 bytes, found {0}")]
    Length(usize),
}

impl Address {
    /// The version byte of this address.
    pub fn version(&self) -> u8 {
        self.0[0]
    }

    /// Construct an address from a raw byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseAddressError> {
        let arr: [u8; ADDRESS_SIZE] = bytes
            .try_into()
            .map_err(|_| ParseAddressError::Length(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Parse an address from its bech32 text form.
    ///
    /// Rejects any human readable part other than [`ADDRESS_BECH32_HRP`].
    pub fn from_bech32(s: &str) -> Result<Self, ParseAddressError> {
        let (hrp, data, variant) = bech32::decode(s)?;
        if hrp != ADDRESS_BECH32_HRP {
            return Err(ParseAddressError::Prefix { found: hrp });
        }
        if variant != Variant::Bech32 {
            return Err(ParseAddressError::Variant);
        }
        let bytes = Vec::<u8>::from_base32(&data)?;
        Self::from_bytes(&bytes)
    }

    /// Encode this address in its bech32 text form.
    pub fn to_bech32(&self) -> String {
        // The fixed prefix is valid, so encoding cannot fail.
        bech32::encode(ADDRESS_BECH32_HRP, self.0.to_base32(), Variant::Bech32)
            .expect("the address prefix is a valid bech32 human readable part")
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; ADDRESS_SIZE] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            self.to_bech32().serialize(s)
        } else {
            s.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        if d.is_human_readable() {
            let string = String::deserialize(d)?;
            Self::from_bech32(&string).map_err(serde::de::Error::custom)
        } else {
            let bytes = serde_bytes::ByteBuf::deserialize(d)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
