//! Public keys, signatures and the single-key address specs built from them.

use serde::{Deserialize, Serialize};

/// Size of an Ed25519 public key.
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;
/// Size of a compressed Secp256k1 public key.
pub const SECP256K1_PUBLIC_KEY_SIZE: usize = 33;
/// Size of an Sr25519 public key.
pub const SR25519_PUBLIC_KEY_SIZE: usize = 32;

/// A public key of one of the supported signature schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PublicKey {
    /// An Ed25519 public key.
    #[serde(rename = "ed25519")]
    Ed25519(#[serde(with = "crate::serde::bytes")] [u8; ED25519_PUBLIC_KEY_SIZE]),
    /// A compressed Secp256k1 public key.
    #[serde(rename = "secp256k1")]
    Secp256k1(#[serde(with = "crate::serde::bytes")] [u8; SECP256K1_PUBLIC_KEY_SIZE]),
    /// An Sr25519 public key.
    #[serde(rename = "sr25519")]
    Sr25519(#[serde(with = "crate::serde::bytes")] [u8; SR25519_PUBLIC_KEY_SIZE]),
}

/// A raw signature. The layout depends on the signature scheme of the key
/// that produced it: 64 bytes for Ed25519 and Sr25519, DER for Secp256k1.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(#[serde(with = "serde_bytes")] pub Vec<u8>);

/// The public key part of a single-signature address spec.
///
/// The variant determines which address derivation context applies. Note
/// that Secp256k1 keys always derive Ethereum-compatible addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAddressSpec {
    /// Ed25519 address derivation from the public key.
    #[serde(rename = "ed25519")]
    Ed25519(#[serde(with = "crate::serde::bytes")] [u8; ED25519_PUBLIC_KEY_SIZE]),
    /// Ethereum-compatible address derivation from a Secp256k1 public key.
    #[serde(rename = "secp256k1eth")]
    Secp256k1Eth(#[serde(with = "crate::serde::bytes")] [u8; SECP256K1_PUBLIC_KEY_SIZE]),
    /// Sr25519 address derivation from the public key.
    #[serde(rename = "sr25519")]
    Sr25519(#[serde(with = "crate::serde::bytes")] [u8; SR25519_PUBLIC_KEY_SIZE]),
}

impl PublicKey {
    /// Short name of the signature scheme.
    pub fn key_type(&self) -> &'static str {
        match self {
            Self::Ed25519(_) => "ed25519",
            Self::Secp256k1(_) => "secp256k1",
            Self::Sr25519(_) => "sr25519",
        }
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Ed25519(pk) => pk,
            Self::Secp256k1(pk) => pk,
            Self::Sr25519(pk) => pk,
        }
    }
}

impl Signature {
    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Signature {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl SignatureAddressSpec {
    /// The public key this spec authenticates with.
    pub fn public_key(&self) -> PublicKey {
        match *self {
            Self::Ed25519(pk) => PublicKey::Ed25519(pk),
            Self::Secp256k1Eth(pk) => PublicKey::Secp256k1(pk),
            Self::Sr25519(pk) => PublicKey::Sr25519(pk),
        }
    }
}

impl From<PublicKey> for SignatureAddressSpec {
    fn from(pk: PublicKey) -> Self {
        match pk {
            PublicKey::Ed25519(pk) => Self::Ed25519(pk),
            PublicKey::Secp256k1(pk) => Self::Secp256k1Eth(pk),
            PublicKey::Sr25519(pk) => Self::Sr25519(pk),
        }
    }
}
