//! Envelopes for encrypted call data and results, and the runtime's
//! published call data public key.

use serde::{Deserialize, Serialize};

/// Size of the Deoxys-II nonce.
pub const NONCE_SIZE: usize = 15;

/// Size of an X25519 public key.
pub const X25519_PUBLIC_KEY_SIZE: usize = 32;

/// Body of a call in the `EncryptedX25519DeoxysII` format.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEnvelopeX25519DeoxysII {
    /// The caller's ephemeral X25519 public key.
    #[serde(with = "crate::serde::bytes")]
    pub pk: [u8; X25519_PUBLIC_KEY_SIZE],
    /// The sealing nonce.
    #[serde(with = "crate::serde::bytes")]
    pub nonce: [u8; NONCE_SIZE],
    /// Epoch of the runtime key the call was sealed against.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub epoch: u64,
    /// The sealed plain call.
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

/// The `unknown` result of a call in the `EncryptedX25519DeoxysII` format.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelopeX25519DeoxysII {
    /// The sealing nonce.
    #[serde(with = "crate::serde::bytes")]
    pub nonce: [u8; NONCE_SIZE],
    /// The sealed plain result.
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

/// A runtime X25519 public key as signed by the key manager.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPublicKey {
    /// The X25519 public key.
    #[serde(with = "crate::serde::bytes")]
    pub key: [u8; X25519_PUBLIC_KEY_SIZE],
    /// Key manager checksum.
    #[serde(default, with = "serde_bytes")]
    pub checksum: Vec<u8>,
    /// Key manager signature over the key.
    #[serde(default, with = "serde_bytes")]
    pub signature: Vec<u8>,
    /// Epoch after which the key is no longer valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,
}

/// Response of the `core.CallDataPublicKey` query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDataPublicKey {
    /// The signed public key.
    pub public_key: SignedPublicKey,
    /// Epoch the key belongs to.
    #[serde(default)]
    pub epoch: u64,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}
